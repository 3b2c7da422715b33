//! App construction for CLI commands.

use std::{
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use tillpoint::{
    App, AppConfig, Platform,
    backend::JsonFileFactory,
    hydration::InitialProps,
    navigator::Navigator,
};
use url::Url;

use crate::cli::GlobalArgs;

/// Navigator over the `--url` argument.
///
/// The CLI has no browser; replacements and navigations are recorded so
/// commands can report them.
#[derive(Default)]
pub struct CliNavigator {
    url: Mutex<Option<Url>>,
    navigated: Mutex<Option<Url>>,
}

impl CliNavigator {
    pub fn new(url: Option<Url>) -> Self {
        Self {
            url: Mutex::new(url),
            navigated: Mutex::new(None),
        }
    }

    /// The URL after any replacement.
    pub fn url(&self) -> Option<Url> {
        self.url.lock().unwrap().clone()
    }

    /// The last URL the app navigated to.
    pub fn navigated(&self) -> Option<Url> {
        self.navigated.lock().unwrap().clone()
    }
}

impl Navigator for CliNavigator {
    fn current_url(&self) -> Option<Url> {
        self.url()
    }

    fn replace_url(&self, url: Url) {
        tracing::debug!(%url, "Replacing page URL");
        *self.url.lock().unwrap() = Some(url);
    }

    fn navigate(&self, url: Url) {
        *self.navigated.lock().unwrap() = Some(url);
    }
}

/// Load the config file, if one was given.
pub fn load_config(global: &GlobalArgs) -> Result<AppConfig, Box<dyn std::error::Error>> {
    match &global.config {
        Some(path) => {
            tracing::info!("Using config at {}", path.display());
            Ok(AppConfig::load(path)?)
        }
        None => Ok(AppConfig::default()),
    }
}

/// Read server-injected props from a JSON file.
pub async fn read_props(path: &Path) -> Result<InitialProps, Box<dyn std::error::Error>> {
    let json = tokio::fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&json)?)
}

/// Build the app over JSON files in the data directory.
///
/// Giving props switches the deployment to web, since only a web page is
/// served with them.
pub fn open_app(
    global: &GlobalArgs,
    props: Option<InitialProps>,
    navigator: Arc<dyn Navigator>,
) -> Result<App, Box<dyn std::error::Error>> {
    let mut config = load_config(global)?;
    if props.is_some() {
        config = config.with_platform(Platform::Web);
    }

    let data_dir = global
        .data_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from("."));
    tracing::info!("Using data directory {}", data_dir.display());

    let mut builder =
        App::builder(config, Arc::new(JsonFileFactory::new(data_dir))).navigator(navigator);
    if let Some(props) = props {
        builder = builder.initial_props(props);
    }
    Ok(builder.build())
}
