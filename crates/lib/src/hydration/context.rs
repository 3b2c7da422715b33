use std::fmt;

use crate::{
    Result,
    database::{Database, State},
    models::{SessionPointer, Site, Store, User, WpCredentials},
};

use super::HydrationError;

/// Names of the entries in a [`HydrationContext`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContextKey {
    UserDb,
    AppState,
    User,
    Site,
    WpCredentials,
    Stores,
    OldPointer,
    SessionPointer,
}

impl ContextKey {
    pub fn as_str(self) -> &'static str {
        match self {
            ContextKey::UserDb => "user_db",
            ContextKey::AppState => "app_state",
            ContextKey::User => "user",
            ContextKey::Site => "site",
            ContextKey::WpCredentials => "wp_credentials",
            ContextKey::Stores => "stores",
            ContextKey::OldPointer => "old_pointer",
            ContextKey::SessionPointer => "session_pointer",
        }
    }
}

impl fmt::Display for ContextKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the bootstrap pipeline has produced so far.
///
/// Steps return a partial context holding only what they produced; the
/// engine folds it in with [`merge`](Self::merge). Later steps overwrite
/// entries set by earlier ones.
#[derive(Clone, Debug, Default)]
pub struct HydrationContext {
    pub user_db: Option<Database>,
    pub app_state: Option<State>,
    pub user: Option<User>,
    pub site: Option<Site>,
    pub wp_credentials: Option<WpCredentials>,
    pub stores: Option<Vec<Store>>,
    /// The session pointer as it was before bootstrap touched it.
    pub old_pointer: Option<SessionPointer>,
    pub session_pointer: Option<SessionPointer>,
}

macro_rules! merge_fields {
    ($target:ident, $update:ident, $($field:ident),+ $(,)?) => {
        $(
            if $update.$field.is_some() {
                $target.$field = $update.$field;
            }
        )+
    };
}

impl HydrationContext {
    /// Shallow merge: every entry set in `update` replaces the current one.
    pub fn merge(&mut self, update: HydrationContext) {
        merge_fields!(
            self,
            update,
            user_db,
            app_state,
            user,
            site,
            wp_credentials,
            stores,
            old_pointer,
            session_pointer,
        );
    }

    pub fn has(&self, key: ContextKey) -> bool {
        match key {
            ContextKey::UserDb => self.user_db.is_some(),
            ContextKey::AppState => self.app_state.is_some(),
            ContextKey::User => self.user.is_some(),
            ContextKey::Site => self.site.is_some(),
            ContextKey::WpCredentials => self.wp_credentials.is_some(),
            ContextKey::Stores => self.stores.is_some(),
            ContextKey::OldPointer => self.old_pointer.is_some(),
            ContextKey::SessionPointer => self.session_pointer.is_some(),
        }
    }

    /// The first of `keys` not yet present.
    pub fn first_missing(&self, keys: &[ContextKey]) -> Option<ContextKey> {
        keys.iter().copied().find(|key| !self.has(*key))
    }

    pub fn require_user_db(&self, step: &str) -> Result<&Database> {
        self.user_db
            .as_ref()
            .ok_or_else(|| missing(step, ContextKey::UserDb))
    }

    pub fn require_app_state(&self, step: &str) -> Result<&State> {
        self.app_state
            .as_ref()
            .ok_or_else(|| missing(step, ContextKey::AppState))
    }

    pub fn require_user(&self, step: &str) -> Result<&User> {
        self.user
            .as_ref()
            .ok_or_else(|| missing(step, ContextKey::User))
    }
}

fn missing(step: &str, key: ContextKey) -> crate::Error {
    HydrationError::ContextMissing {
        step: step.to_string(),
        key,
    }
    .into()
}
