use std::sync::{PoisonError, RwLock};

use compass_core::navigation::Navigator;
use compass_core::session::Route;

/// Tracks the screen the terminal front end is showing.
#[derive(Debug)]
pub struct TerminalNavigator {
    current: RwLock<Route>,
}

impl Default for TerminalNavigator {
    fn default() -> Self {
        Self {
            current: RwLock::new(Route::Landing),
        }
    }
}

impl TerminalNavigator {
    pub fn current(&self) -> Route {
        *self.current.read().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Navigator for TerminalNavigator {
    fn navigate(&self, route: Route) {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        tracing::debug!("[Navigator] {} -> {}", current.path(), route.path());
        *current = route;
    }
}
