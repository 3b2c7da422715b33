//! Store reconciliation.
//!
//! Brings the stores linked to one set of credentials in line with the list
//! the server returned. Local IDs come from [`crate::identity`], so running
//! the same merge twice is a no-op the second time: removals find nothing
//! stale and inserts find every key already present.
//!
//! Steps run in a fixed order: load linked stores, remove stale ones, insert
//! the remote list (insert-if-absent), then replace the credentials' store
//! list. A failure aborts the remaining steps. Completed steps are not
//! rolled back; [`MergeError`] reports what was already done.

use std::collections::HashSet;

use serde_json::{Map, Value};
use tracing::{debug, info, instrument, warn};

use crate::{
    Result,
    database::Database,
    identity::{LocalID, resolve_local_id},
    models::{RemoteStore, Store, User, WpCredentials},
};

pub mod errors;

pub use errors::MergeError;

/// What a reconciliation changed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    /// The new store list of the credentials, in remote order.
    pub local_ids: Vec<LocalID>,
    /// Stale stores that were removed.
    pub removed: Vec<LocalID>,
    /// Stores that did not exist locally and were inserted.
    pub inserted: Vec<LocalID>,
}

impl MergeOutcome {
    /// True if the merge neither removed nor inserted anything.
    pub fn is_noop(&self) -> bool {
        self.removed.is_empty() && self.inserted.is_empty()
    }
}

/// Compute the storable records for a remote store list.
pub fn compute_stores(
    remote_stores: &[RemoteStore],
    user: &User,
    site_id: &str,
    credentials_id: &str,
) -> Vec<Store> {
    remote_stores
        .iter()
        .map(|remote| {
            let local_id = resolve_local_id(user, site_id, credentials_id, remote.id);
            remote.clone().into_store(local_id)
        })
        .collect()
}

/// Reconcile and return the new list of local IDs.
pub async fn merge_stores(
    user_db: &Database,
    credentials: &WpCredentials,
    remote_stores: &[RemoteStore],
    user: &User,
    site_id: &str,
) -> Result<Vec<LocalID>> {
    let outcome = reconcile_stores(user_db, credentials, remote_stores, user, site_id).await?;
    Ok(outcome.local_ids)
}

/// Reconcile and report every change made.
#[instrument(
    skip_all,
    fields(credentials = %credentials.uuid, site = site_id, remote = remote_stores.len())
)]
pub async fn reconcile_stores(
    user_db: &Database,
    credentials: &WpCredentials,
    remote_stores: &[RemoteStore],
    user: &User,
    site_id: &str,
) -> Result<MergeOutcome> {
    let stores = user_db.stores();

    let linked = stores
        .find_many(&credentials.stores)
        .await
        .map_err(|e| MergeError::LoadFailed {
            credentials_id: credentials.uuid.clone(),
            source: Box::new(e),
        })?;

    let computed = compute_stores(remote_stores, user, site_id, &credentials.uuid);
    let remote_ids: HashSet<i64> = remote_stores.iter().map(|s| s.id).collect();

    let stale: Vec<String> = linked
        .iter()
        .filter(|store| !remote_ids.contains(&store.id))
        .map(|store| store.local_id.to_string())
        .collect();

    let mut removed = Vec::new();
    if !stale.is_empty() {
        warn!(stale = ?stale, "Removing stores no longer returned by the server");
        removed = stores
            .bulk_remove(&stale)
            .await
            .map_err(|e| MergeError::RemoveFailed {
                attempted: stale.iter().map(|id| LocalID::from(id.as_str())).collect(),
                source: Box::new(e),
            })?
            .into_iter()
            .map(LocalID::from)
            .collect();
    }

    let inserted: Vec<LocalID> = stores
        .bulk_insert(&computed)
        .await
        .map_err(|e| MergeError::InsertFailed {
            removed: removed.clone(),
            source: Box::new(e),
        })?
        .into_iter()
        .map(LocalID::from)
        .collect();

    let local_ids: Vec<LocalID> = computed.into_iter().map(|s| s.local_id).collect();

    let mut fields = Map::new();
    fields.insert(
        "stores".to_string(),
        Value::Array(
            local_ids
                .iter()
                .map(|id| Value::String(id.to_string()))
                .collect(),
        ),
    );
    if let Err(e) = user_db.wp_credentials().patch(&credentials.uuid, fields).await {
        return Err(MergeError::CredentialsUpdateFailed {
            credentials_id: credentials.uuid.clone(),
            removed,
            inserted,
            source: Box::new(e),
        }
        .into());
    }

    if removed.is_empty() && inserted.is_empty() {
        debug!(stores = local_ids.len(), "Stores already up to date");
    } else {
        info!(
            removed = removed.len(),
            inserted = inserted.len(),
            stores = local_ids.len(),
            "Reconciled stores"
        );
    }

    Ok(MergeOutcome {
        local_ids,
        removed,
        inserted,
    })
}
