//! Deterministic local identifiers for remote stores.
//!
//! A remote store is only unique per `(user, site, credentials)`: the same
//! numeric store id can exist on two sites, and the same site can be linked
//! through two logins. The local primary key therefore hashes the whole
//! tuple. No central authority hands out IDs, so the hash must be
//! reproducible across runs for merges to stay idempotent.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::{constants::LOCAL_ID_LEN, models::User};

mod id;

pub use id::LocalID;

/// The serialized form that gets hashed.
///
/// Field order is part of the hash input. Never reorder or rename these
/// fields: every previously stored localID would stop matching.
#[derive(Serialize)]
struct LocalIdSeed<'a> {
    #[serde(rename = "userID")]
    user_id: &'a str,
    #[serde(rename = "siteID")]
    site_id: &'a str,
    #[serde(rename = "wpCredentialsID")]
    wp_credentials_id: &'a str,
    #[serde(rename = "storeID")]
    store_id: i64,
}

/// Compute the local ID of a remote store.
///
/// SHA-256 over the compact JSON of the seed tuple, hex-encoded and cut to
/// [`LOCAL_ID_LEN`] characters. 40 bits are not collision-proof at large
/// scale and nothing here detects collisions.
pub fn resolve_local_id(
    user: &User,
    site_id: &str,
    wp_credentials_id: &str,
    remote_store_id: i64,
) -> LocalID {
    local_id_from_parts(&user.uuid, site_id, wp_credentials_id, remote_store_id)
}

/// Same as [`resolve_local_id`] when only the user's uuid is at hand.
pub fn local_id_from_parts(
    user_uuid: &str,
    site_id: &str,
    wp_credentials_id: &str,
    remote_store_id: i64,
) -> LocalID {
    let seed = LocalIdSeed {
        user_id: user_uuid,
        site_id,
        wp_credentials_id,
        store_id: remote_store_id,
    };
    // Serializing a struct of strings and an integer cannot fail.
    let json = serde_json::to_vec(&seed).unwrap_or_default();

    let digest = Sha256::digest(&json);
    let mut hex = hex::encode(digest);
    hex.truncate(LOCAL_ID_LEN);
    LocalID::from(hex)
}
