//! Access to the host's URL bar.
//!
//! Web deployments read the bootstrap `store` query parameter from the
//! current location and need a logout redirect. Native deployments have
//! neither and use [`NoopNavigator`].

use url::Url;

use crate::constants::STORE_QUERY_PARAM;

/// The browser location, as far as the session engine cares.
pub trait Navigator: Send + Sync {
    /// The current location, if there is one.
    fn current_url(&self) -> Option<Url>;

    /// Replace the current history entry without navigating.
    fn replace_url(&self, url: Url);

    /// Leave the app for `url`.
    fn navigate(&self, url: Url);
}

/// Navigator for deployments without a URL bar.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNavigator;

impl Navigator for NoopNavigator {
    fn current_url(&self) -> Option<Url> {
        None
    }

    fn replace_url(&self, _url: Url) {}

    fn navigate(&self, _url: Url) {}
}

/// Read the `store` query parameter once and strip it from the location.
///
/// The parameter is removed even when it does not parse, so a reload never
/// applies it again. Returns the remote store id when present and numeric.
pub fn take_store_param(navigator: &dyn Navigator) -> Option<i64> {
    let url = navigator.current_url()?;
    let raw = url
        .query_pairs()
        .find(|(key, _)| key == STORE_QUERY_PARAM)
        .map(|(_, value)| value.into_owned())?;

    navigator.replace_url(strip_query_param(&url, STORE_QUERY_PARAM));

    match raw.trim().parse() {
        Ok(id) => Some(id),
        Err(_) => {
            tracing::warn!(value = %raw, "Ignoring non-numeric store query parameter");
            None
        }
    }
}

/// `url` without any `name=` pairs. Other pairs keep their order.
pub fn strip_query_param(url: &Url, name: &str) -> Url {
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != name)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let mut stripped = url.clone();
    if kept.is_empty() {
        stripped.set_query(None);
    } else {
        stripped.query_pairs_mut().clear().extend_pairs(kept);
    }
    stripped
}
