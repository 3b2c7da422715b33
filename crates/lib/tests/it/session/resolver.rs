//! Snapshot resolution and the background resolver

use std::{sync::Arc, time::Duration};

use tillpoint::{
    AppConfig,
    backend::InMemoryFactory,
    constants::{APP_STATE, CURRENT, EXTRA_DATA},
    identity::resolve_local_id,
    merge::merge_stores,
    models::SessionPointer,
    session::{SessionResolver, StoreDatabaseCache, resolve},
};

use crate::helpers::*;

fn cache(factory: &Arc<InMemoryFactory>) -> StoreDatabaseCache {
    StoreDatabaseCache::new(factory.clone(), AppConfig::default())
}

#[tokio::test]
async fn test_empty_store_id_resolves_to_nothing() {
    let (db, backend, user) = seeded_user_db().await;
    merge_stores(&db, &sample_credentials(), &remote_stores(&[1]), &user, SITE_ID)
        .await
        .unwrap();
    let factory = Arc::new(InMemoryFactory::new());
    backend.reset_counts();

    let pointer = SessionPointer::new(SITE_ID, CREDENTIALS_ID, "");
    let snapshot = resolve(&db, &cache(&factory), pointer).await.unwrap();

    assert!(snapshot.site.is_some());
    assert!(snapshot.wp_credentials.is_some());
    assert!(snapshot.store.is_none());
    assert!(snapshot.store_db.is_none());
    assert!(!backend.lookups().iter().any(String::is_empty));
    assert!(factory.opened_names().await.is_empty());
}

#[tokio::test]
async fn test_empty_site_and_credentials_ids_resolve_to_nothing() {
    let (db, backend, user) = seeded_user_db().await;
    let ids = merge_stores(&db, &sample_credentials(), &remote_stores(&[1]), &user, SITE_ID)
        .await
        .unwrap();
    let factory = Arc::new(InMemoryFactory::new());
    let cache = cache(&factory);
    backend.reset_counts();

    let pointer = SessionPointer::new("", CREDENTIALS_ID, ids[0].as_str());
    let snapshot = resolve(&db, &cache, pointer).await.unwrap();
    assert!(snapshot.site.is_none());
    assert!(snapshot.wp_credentials.is_some());
    assert!(snapshot.store.is_some());

    let pointer = SessionPointer::new(SITE_ID, "", ids[0].as_str());
    let snapshot = resolve(&db, &cache, pointer).await.unwrap();
    assert!(snapshot.site.is_some());
    assert!(snapshot.wp_credentials.is_none());
    assert!(!snapshot.is_complete());

    assert!(!backend.lookups().iter().any(String::is_empty));
}

#[tokio::test]
async fn test_partial_pointer_is_not_an_error() {
    let (db, _backend, _user) = seeded_user_db().await;
    let factory = Arc::new(InMemoryFactory::new());

    let pointer = SessionPointer {
        site_id: Some(SITE_ID.to_string()),
        ..Default::default()
    };
    let snapshot = resolve(&db, &cache(&factory), pointer).await.unwrap();
    assert!(snapshot.site.is_some());
    assert!(snapshot.wp_credentials.is_none());
    assert!(!snapshot.is_complete());

    let snapshot = resolve(&db, &cache(&factory), SessionPointer::default())
        .await
        .unwrap();
    assert!(snapshot.site.is_none());
}

#[tokio::test]
async fn test_only_the_current_store_gets_databases() {
    let (db, _backend, user) = seeded_user_db().await;
    let ids = merge_stores(&db, &sample_credentials(), &remote_stores(&[1, 2]), &user, SITE_ID)
        .await
        .unwrap();
    let factory = Arc::new(InMemoryFactory::new());
    let cache = cache(&factory);

    let pointer = SessionPointer::new(SITE_ID, CREDENTIALS_ID, ids[0].as_str());
    let snapshot = resolve(&db, &cache, pointer.clone()).await.unwrap();
    assert!(snapshot.is_complete());
    assert_eq!(snapshot.store_db.as_ref().unwrap().name(), format!("store_v2_{}", ids[0]));
    assert_eq!(
        snapshot.fast_store_db.as_ref().unwrap().name(),
        format!("fast_store_v2_{}", ids[0])
    );
    assert_eq!(snapshot.extra_data.as_ref().unwrap().name(), EXTRA_DATA);
    assert_eq!(cache.opened().await, vec![ids[0].clone()]);

    // Resolving again reuses the cached handles.
    let again = resolve(&db, &cache, pointer).await.unwrap();
    assert!(
        again
            .store_db
            .as_ref()
            .unwrap()
            .ptr_eq(snapshot.store_db.as_ref().unwrap())
    );
    assert_eq!(factory.opened_names().await.len(), 2);
}

#[tokio::test]
async fn test_resolver_follows_pointer_writes() -> tillpoint::Result<()> {
    let (app, _factory) = native_app();
    let session = app.session().await?;
    assert!(session.current().store.is_none());

    let actions = app.actions().await?;
    let ids = actions
        .link_credentials(&sample_site(), &sample_credentials(), &remote_stores(&[1, 2]))
        .await?;
    actions.login(SITE_ID, CREDENTIALS_ID, &ids[0]).await?;

    let first = session
        .wait_for(|s| s.store.as_ref().is_some_and(|st| st.local_id == ids[0]))
        .await?;
    assert!(first.is_complete());
    assert!(first.store_db.is_some() && first.fast_store_db.is_some());

    let second_store = first
        .wp_credentials
        .as_ref()
        .map(|c| c.stores[1].clone())
        .unwrap();
    let store = app
        .context()
        .await?
        .user_db
        .as_ref()
        .unwrap()
        .stores()
        .find_by_id(&second_store)
        .await?
        .unwrap();
    actions.switch_store(&store).await?;

    let second = session
        .wait_for(|s| s.store.as_ref().is_some_and(|st| st.id == 2))
        .await?;
    assert_eq!(second.pointer.site_id.as_deref(), Some(SITE_ID));
    assert!(
        !second
            .store_db
            .as_ref()
            .unwrap()
            .ptr_eq(first.store_db.as_ref().unwrap())
    );

    actions.logout().await?;
    let logged_out = session.wait_for(|s| s.pointer.is_empty()).await?;
    assert!(logged_out.store.is_none());
    assert!(logged_out.store_db.is_none());
    Ok(())
}

#[tokio::test]
async fn test_snapshots_are_never_half_resolved() -> tillpoint::Result<()> {
    let (app, _factory) = native_app();
    let session = app.session().await?;
    let actions = app.actions().await?;
    let ids = actions
        .link_credentials(&sample_site(), &sample_credentials(), &remote_stores(&[1, 2, 3]))
        .await?;

    let mut rx = session.subscribe();
    let watcher = tokio::spawn(async move {
        let mut seen = 0;
        while rx.changed().await.is_ok() {
            let snapshot = rx.borrow_and_update().clone();
            if snapshot.store.is_some() {
                assert!(snapshot.store_db.is_some());
                assert!(snapshot.extra_data.is_some());
            }
            seen += 1;
            if snapshot.store.as_ref().is_some_and(|s| s.id == 3) {
                break;
            }
        }
        seen
    });

    for id in &ids {
        actions.login(SITE_ID, CREDENTIALS_ID, id).await?;
    }
    assert!(watcher.await.unwrap() >= 1);

    let user = app.context().await?.user.clone().unwrap();
    let expected = resolve_local_id(&user, SITE_ID, CREDENTIALS_ID, 3);
    let last = session
        .wait_for(|s| s.store.as_ref().is_some_and(|st| st.id == 3))
        .await?;
    assert_eq!(last.store.as_ref().unwrap().local_id, expected);
    Ok(())
}

#[tokio::test]
async fn test_failed_re_resolution_keeps_the_last_snapshot() {
    let (db, backend, user) = seeded_user_db().await;
    let ids = merge_stores(&db, &sample_credentials(), &remote_stores(&[1, 2]), &user, SITE_ID)
        .await
        .unwrap();
    let factory = Arc::new(InMemoryFactory::new());
    let app_state = db.add_state(APP_STATE);
    let pointer_to = |id: &str| SessionPointer::new(SITE_ID, CREDENTIALS_ID, id);
    app_state.set(CURRENT, &pointer_to(ids[0].as_str())).await.unwrap();

    let session = SessionResolver::new(db.clone(), app_state.clone(), Arc::new(cache(&factory)))
        .start()
        .await
        .unwrap();
    let before = session.current();
    assert_eq!(before.store.as_ref().unwrap().local_id, ids[0]);

    backend.reset_counts();
    backend.fail_on(FailOn::FindOne);
    app_state.set(CURRENT, &pointer_to(ids[1].as_str())).await.unwrap();

    tokio::time::timeout(Duration::from_secs(5), async {
        while backend.lookups().is_empty() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("resolver never looked up the new pointer");
    tokio::time::sleep(Duration::from_millis(50)).await;

    // One failed lookup, no retry, and the old snapshot stays published.
    assert_eq!(backend.lookups(), vec![SITE_ID.to_string()]);
    assert!(Arc::ptr_eq(&session.current(), &before));

    // The resolver is still running and picks up the next write.
    backend.clear_failure();
    app_state.set(CURRENT, &pointer_to(ids[1].as_str())).await.unwrap();
    let after = tokio::time::timeout(
        Duration::from_secs(5),
        session.wait_for(|s| s.store.as_ref().is_some_and(|st| st.local_id == ids[1])),
    )
    .await
    .expect("resolver stopped after a failure")
    .unwrap();
    assert!(after.is_complete());
}
