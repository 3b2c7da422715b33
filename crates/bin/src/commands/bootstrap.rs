//! Bootstrap command - runs hydration and prints the resolved session.

use std::sync::Arc;

use crate::app::{CliNavigator, open_app, read_props};
use crate::cli::{BootstrapArgs, GlobalArgs};
use crate::output::{OutputFormat, print_session};

/// Run the bootstrap command
pub async fn run(
    global: &GlobalArgs,
    args: &BootstrapArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let props = match &args.props {
        Some(path) => Some(read_props(path).await?),
        None => None,
    };
    let navigator = Arc::new(CliNavigator::new(args.url.clone()));
    let app = open_app(global, props, navigator.clone())?;

    // Progress goes to stderr so JSON output stays parseable.
    let mut progress = app.hydration_progress();
    let printer = tokio::spawn(async move {
        while progress.changed().await.is_ok() {
            let update = progress.borrow_and_update().clone();
            eprintln!("[{:>3}] {}", update.progress, update.message);
            if update.state.is_finished() {
                break;
            }
        }
    });

    let hydrated = app.context().await;
    let _ = printer.await;
    let ctx = hydrated?;

    let session = app.session().await?;
    app.flush().await?;

    let snapshot = session.current();
    print_session(&snapshot, global.format)?;
    if global.format == OutputFormat::Human {
        if let (Some(before), Some(after)) = (&args.url, navigator.url()) {
            if before != &after {
                println!("URL:          {after}");
            }
        }
        if let Some(stores) = &ctx.stores {
            println!("Linked:       {} store(s)", stores.len());
        }
    }
    Ok(())
}
