//! Logout command - clears the current session.

use std::sync::Arc;

use crate::app::{CliNavigator, open_app};
use crate::cli::GlobalArgs;
use crate::output::OutputFormat;

/// Run the logout command
pub async fn run(global: &GlobalArgs) -> Result<(), Box<dyn std::error::Error>> {
    let navigator = Arc::new(CliNavigator::default());
    let app = open_app(global, None, navigator.clone())?;

    app.actions().await?.logout().await?;
    app.flush().await?;

    let redirect = navigator.navigated();
    match global.format {
        OutputFormat::Human => {
            println!("Logged out");
            if let Some(url) = &redirect {
                println!("Continue at {url}");
            }
        }
        OutputFormat::Json => {
            let value = serde_json::json!({
                "logged_out": true,
                "redirect": redirect.as_ref().map(|u| u.as_str()),
            });
            println!("{}", serde_json::to_string(&value)?);
        }
    }
    Ok(())
}
