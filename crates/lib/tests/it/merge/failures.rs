//! Merge failures are reported with what already happened

use tillpoint::{
    Error,
    identity::resolve_local_id,
    merge::{MergeError, merge_stores},
};

use crate::helpers::*;

#[tokio::test]
async fn test_insert_failure_keeps_completed_removals() {
    let (db, backend, user) = seeded_user_db().await;
    merge_stores(&db, &sample_credentials(), &remote_stores(&[1, 2]), &user, SITE_ID)
        .await
        .unwrap();
    let credentials = db.wp_credentials().find_by_id(CREDENTIALS_ID).await.unwrap().unwrap();

    backend.fail_on(FailOn::BulkInsert);
    let err = merge_stores(&db, &credentials, &remote_stores(&[1, 3]), &user, SITE_ID)
        .await
        .unwrap_err();

    let stale = resolve_local_id(&user, SITE_ID, CREDENTIALS_ID, 2);
    match &err {
        Error::Merge(merge_err @ MergeError::InsertFailed { .. }) => {
            assert!(merge_err.is_partial());
            assert_eq!(merge_err.removed(), &[stale.clone()]);
            assert!(merge_err.cause().is_database_error());
        }
        other => panic!("expected InsertFailed, got {other:?}"),
    }

    // No rollback: the removal stands and the credentials still list it.
    assert!(db.stores().find_by_id(&stale).await.unwrap().is_none());
    let credentials = db.wp_credentials().find_by_id(CREDENTIALS_ID).await.unwrap().unwrap();
    assert!(credentials.stores.contains(&stale));
}

#[tokio::test]
async fn test_remove_failure_stops_before_insert() {
    let (db, backend, user) = seeded_user_db().await;
    merge_stores(&db, &sample_credentials(), &remote_stores(&[1]), &user, SITE_ID)
        .await
        .unwrap();
    let credentials = db.wp_credentials().find_by_id(CREDENTIALS_ID).await.unwrap().unwrap();
    backend.reset_counts();

    backend.fail_on(FailOn::BulkRemove);
    let err = merge_stores(&db, &credentials, &remote_stores(&[2]), &user, SITE_ID)
        .await
        .unwrap_err();

    assert!(err.is_merge_error());
    assert!(matches!(err, Error::Merge(MergeError::RemoveFailed { .. })));
    assert!(backend.inserted().is_empty());
    assert_eq!(backend.count("stores").await, 1);
}

#[tokio::test]
async fn test_credentials_update_failure_reports_inserts() {
    let (db, backend, user) = seeded_user_db().await;
    backend.fail_on(FailOn::Patch);

    let err = merge_stores(&db, &sample_credentials(), &remote_stores(&[1]), &user, SITE_ID)
        .await
        .unwrap_err();

    match err {
        Error::Merge(MergeError::CredentialsUpdateFailed {
            credentials_id,
            removed,
            inserted,
            ..
        }) => {
            assert_eq!(credentials_id, CREDENTIALS_ID);
            assert!(removed.is_empty());
            assert_eq!(
                inserted,
                vec![resolve_local_id(&user, SITE_ID, CREDENTIALS_ID, 1)]
            );
        }
        other => panic!("expected CredentialsUpdateFailed, got {other:?}"),
    }
}
