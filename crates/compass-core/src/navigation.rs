//! Navigation seam between the coordinator and the front end.

use crate::session::Route;

/// Receives navigation requests issued by the workflow coordinator.
///
/// Implementations must not block: the coordinator calls `navigate` after
/// its state update has been published.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}
