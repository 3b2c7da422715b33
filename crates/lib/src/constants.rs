//! Constants used throughout the tillpoint library.
//!
//! Central definitions for collection names, state names and other reserved
//! strings shared between the bootstrap pipeline and the session layer.

/// Collection holding the singleton local user record.
pub const USERS: &str = "users";

/// Collection holding remote backends (sites).
pub const SITES: &str = "sites";

/// Collection holding per user-site login credentials.
pub const WP_CREDENTIALS: &str = "wp_credentials";

/// Collection holding stores keyed by their local ID.
pub const STORES: &str = "stores";

/// Application-state store inside the user database.
pub const APP_STATE: &str = "app_state";

/// Key of the session pointer inside [`APP_STATE`].
pub const CURRENT: &str = "current";

/// Auxiliary state created inside each per-store database.
pub const EXTRA_DATA: &str = "extra_data";

/// URL query parameter carrying a remote store id on web deployments.
pub const STORE_QUERY_PARAM: &str = "store";

/// Number of hex characters kept from the local ID digest.
pub const LOCAL_ID_LEN: usize = 10;

/// Default name of the user database.
pub const DEFAULT_USER_DB_NAME: &str = "tillpoint_users";

/// Default prefix of per-store database names.
pub const DEFAULT_STORE_DB_PREFIX: &str = "store_v2";

/// Default prefix of per-store fast database names.
pub const DEFAULT_FAST_STORE_DB_PREFIX: &str = "fast_store_v2";
