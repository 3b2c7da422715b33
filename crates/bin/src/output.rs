//! Output formatting helpers for human-readable and JSON output.

use clap::ValueEnum;
use tillpoint::session::SessionSnapshot;

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
}

/// Print a table with aligned columns in human-readable format.
///
/// `headers` and each row in `rows` must have the same length.
pub fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    if rows.is_empty() {
        return;
    }

    let col_count = headers.len();
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(col_count) {
            widths[i] = widths[i].max(cell.len());
        }
    }

    let pad = |cells: Vec<&str>| -> String {
        cells
            .iter()
            .enumerate()
            .map(|(i, cell)| format!("{:<width$}", cell, width = widths[i]))
            .collect::<Vec<_>>()
            .join("  ")
    };

    println!("{}", pad(headers.to_vec()));
    for row in rows {
        println!(
            "{}",
            pad(row.iter().take(col_count).map(String::as_str).collect())
        );
    }
}

/// Print a session snapshot.
pub fn print_session(
    snapshot: &SessionSnapshot,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Human => {
            if snapshot.pointer.is_empty() {
                println!("Not logged in");
                return Ok(());
            }
            let site = snapshot
                .site
                .as_ref()
                .map(|s| format!("{} ({})", s.uuid, s.url))
                .unwrap_or_else(|| "-".to_string());
            let credentials = snapshot
                .wp_credentials
                .as_ref()
                .map(|c| format!("{} ({} stores)", c.uuid, c.stores.len()))
                .unwrap_or_else(|| "-".to_string());
            let store = snapshot
                .store
                .as_ref()
                .map(|s| format!("{} (#{} {})", s.local_id, s.id, s.name))
                .unwrap_or_else(|| "-".to_string());
            let store_db = snapshot
                .store_db
                .as_ref()
                .map(|db| db.name().to_string())
                .unwrap_or_else(|| "-".to_string());

            println!("Site:         {site}");
            println!("Credentials:  {credentials}");
            println!("Store:        {store}");
            println!("Store DB:     {store_db}");
        }
        OutputFormat::Json => {
            let value = serde_json::json!({
                "pointer": snapshot.pointer,
                "site": snapshot.site,
                "wp_credentials": snapshot.wp_credentials.as_ref().map(|c| &c.uuid),
                "store": snapshot.store,
                "store_db": snapshot.store_db.as_ref().map(|db| db.name()),
                "fast_store_db": snapshot.fast_store_db.as_ref().map(|db| db.name()),
            });
            println!("{}", serde_json::to_string(&value)?);
        }
    }
    Ok(())
}
