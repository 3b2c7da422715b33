//! Switch-store command - makes another linked store current.

use std::sync::Arc;

use tillpoint::navigator::NoopNavigator;

use crate::app::open_app;
use crate::cli::{GlobalArgs, SwitchStoreArgs};
use crate::output::print_session;

/// Run the switch-store command
pub async fn run(
    global: &GlobalArgs,
    args: &SwitchStoreArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = open_app(global, None, Arc::new(NoopNavigator))?;
    let session = app.session().await?;
    let ctx = app.context().await?;
    let user_db = ctx.user_db.as_ref().ok_or("user database not initialized")?;

    let store = user_db
        .stores()
        .find_by_id(&args.local_id)
        .await?
        .ok_or_else(|| format!("Unknown store: {}", args.local_id))?;

    app.actions().await?.switch_store(&store).await?;
    let snapshot = session
        .wait_for(|s| s.store.as_ref().is_some_and(|st| st.local_id == store.local_id))
        .await?;
    app.flush().await?;

    print_session(&snapshot, global.format)
}
