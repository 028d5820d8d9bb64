use anyhow::Result;

use crate::app::App;
use crate::display;

pub async fn execute(app: &App) -> Result<()> {
    let entries = app.ledger.refresh().await?;
    display::history(&entries);
    Ok(())
}
