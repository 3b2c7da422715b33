//! Stores command - lists the stores linked to the current credentials.

use std::sync::Arc;

use tillpoint::navigator::NoopNavigator;

use crate::app::open_app;
use crate::cli::GlobalArgs;
use crate::output::{OutputFormat, print_table};

/// Run the stores command
pub async fn run(global: &GlobalArgs) -> Result<(), Box<dyn std::error::Error>> {
    let app = open_app(global, None, Arc::new(NoopNavigator))?;
    let session = app.session().await?.current();
    let ctx = app.context().await?;
    let user_db = ctx.user_db.as_ref().ok_or("user database not initialized")?;

    let stores = match &session.wp_credentials {
        Some(credentials) => user_db.stores().find_many(&credentials.stores).await?,
        None => Vec::new(),
    };
    let current = session.store.as_ref().map(|s| s.local_id.clone());

    match global.format {
        OutputFormat::Human => {
            if stores.is_empty() {
                println!("No linked stores");
                return Ok(());
            }
            let rows: Vec<Vec<String>> = stores
                .iter()
                .map(|store| {
                    let marker = if current.as_ref() == Some(&store.local_id) {
                        "*"
                    } else {
                        ""
                    };
                    vec![
                        marker.to_string(),
                        store.local_id.to_string(),
                        store.id.to_string(),
                        store.name.clone(),
                    ]
                })
                .collect();
            print_table(&["", "LOCAL ID", "REMOTE ID", "NAME"], &rows);
        }
        OutputFormat::Json => {
            let value = serde_json::json!({
                "current": current,
                "stores": stores,
            });
            println!("{}", serde_json::to_string(&value)?);
        }
    }
    Ok(())
}
