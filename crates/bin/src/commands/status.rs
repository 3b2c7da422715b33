//! Status command - prints the current session.

use std::sync::Arc;

use tillpoint::navigator::NoopNavigator;

use crate::app::open_app;
use crate::cli::GlobalArgs;
use crate::output::print_session;

/// Run the status command
pub async fn run(global: &GlobalArgs) -> Result<(), Box<dyn std::error::Error>> {
    let app = open_app(global, None, Arc::new(NoopNavigator))?;
    let session = app.session().await?;
    print_session(&session.current(), global.format)
}
