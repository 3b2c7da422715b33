//! Reconciliation behavior on a healthy backend

use tillpoint::{
    identity::resolve_local_id,
    merge::{merge_stores, reconcile_stores},
};

use crate::helpers::*;

#[tokio::test]
async fn test_first_merge_inserts_and_links() {
    let (db, backend, user) = seeded_user_db().await;

    let ids = merge_stores(&db, &sample_credentials(), &remote_stores(&[1, 2]), &user, SITE_ID)
        .await
        .unwrap();

    let expected = vec![
        resolve_local_id(&user, SITE_ID, CREDENTIALS_ID, 1),
        resolve_local_id(&user, SITE_ID, CREDENTIALS_ID, 2),
    ];
    assert_eq!(ids, expected);
    assert_eq!(backend.count("stores").await, 2);

    let credentials = db.wp_credentials().find_by_id(CREDENTIALS_ID).await.unwrap().unwrap();
    assert_eq!(credentials.stores, expected);
}

#[tokio::test]
async fn test_second_merge_is_a_noop() {
    let (db, backend, user) = seeded_user_db().await;
    let remote = remote_stores(&[1, 2]);

    merge_stores(&db, &sample_credentials(), &remote, &user, SITE_ID)
        .await
        .unwrap();
    let credentials = db.wp_credentials().find_by_id(CREDENTIALS_ID).await.unwrap().unwrap();
    backend.reset_counts();

    let outcome = reconcile_stores(&db, &credentials, &remote, &user, SITE_ID)
        .await
        .unwrap();
    assert!(outcome.is_noop());
    assert!(backend.inserted().is_empty());
    assert!(backend.removed().is_empty());
    assert_eq!(backend.count("stores").await, 2);
}

#[tokio::test]
async fn test_removes_exactly_the_stale_store() {
    let (db, backend, user) = seeded_user_db().await;
    merge_stores(&db, &sample_credentials(), &remote_stores(&[1, 99]), &user, SITE_ID)
        .await
        .unwrap();
    let credentials = db.wp_credentials().find_by_id(CREDENTIALS_ID).await.unwrap().unwrap();

    // A local edit to A must survive the next merge.
    let a = resolve_local_id(&user, SITE_ID, CREDENTIALS_ID, 1);
    let b = resolve_local_id(&user, SITE_ID, CREDENTIALS_ID, 99);
    let mut fields = serde_json::Map::new();
    fields.insert("name".to_string(), "Renamed locally".into());
    db.stores().patch(&a, fields).await.unwrap();
    backend.reset_counts();

    let outcome = reconcile_stores(&db, &credentials, &remote_stores(&[1]), &user, SITE_ID)
        .await
        .unwrap();

    assert_eq!(outcome.removed, vec![b.clone()]);
    assert!(outcome.inserted.is_empty());
    assert_eq!(outcome.local_ids, vec![a.clone()]);
    assert_eq!(backend.removed(), vec![b.to_string()]);
    assert!(backend.inserted().is_empty());

    let kept = db.stores().find_by_id(&a).await.unwrap().unwrap();
    assert_eq!(kept.name, "Renamed locally");
    assert!(db.stores().find_by_id(&b).await.unwrap().is_none());
}

#[tokio::test]
async fn test_empty_remote_list_unlinks_everything() {
    let (db, backend, user) = seeded_user_db().await;
    merge_stores(&db, &sample_credentials(), &remote_stores(&[1]), &user, SITE_ID)
        .await
        .unwrap();
    let credentials = db.wp_credentials().find_by_id(CREDENTIALS_ID).await.unwrap().unwrap();
    backend.reset_counts();

    let outcome = reconcile_stores(&db, &credentials, &[], &user, SITE_ID)
        .await
        .unwrap();

    let x = resolve_local_id(&user, SITE_ID, CREDENTIALS_ID, 1);
    assert_eq!(outcome.removed, vec![x]);
    assert!(outcome.inserted.is_empty());
    assert!(outcome.local_ids.is_empty());
    assert_eq!(backend.count("stores").await, 0);

    let credentials = db.wp_credentials().find_by_id(CREDENTIALS_ID).await.unwrap().unwrap();
    assert!(credentials.stores.is_empty());
}

#[tokio::test]
async fn test_stores_of_other_credentials_are_untouched() {
    let (db, _backend, user) = seeded_user_db().await;
    let other = tillpoint::models::WpCredentials::new("cred-2");
    db.wp_credentials().upsert(&other).await.unwrap();

    merge_stores(&db, &other, &remote_stores(&[5]), &user, SITE_ID)
        .await
        .unwrap();
    merge_stores(&db, &sample_credentials(), &remote_stores(&[1]), &user, SITE_ID)
        .await
        .unwrap();
    let credentials = db.wp_credentials().find_by_id(CREDENTIALS_ID).await.unwrap().unwrap();
    reconcile_stores(&db, &credentials, &[], &user, SITE_ID)
        .await
        .unwrap();

    let other_store = resolve_local_id(&user, SITE_ID, "cred-2", 5);
    assert!(db.stores().find_by_id(&other_store).await.unwrap().is_some());
}
