//! Login, logout, store switching and credential linking

use std::sync::Arc;

use tillpoint::{
    App, AppConfig,
    backend::InMemoryFactory,
    constants::APP_STATE,
    identity::LocalID,
    models::{RemoteStore, SessionPointer, WpCredentials},
    session::SessionActions,
};

use crate::helpers::*;

/// Actions over a [`CountingBackend`], navigating from a recorded page.
async fn counting_actions(
    config: AppConfig,
) -> (SessionActions, Arc<CountingBackend>, Arc<RecordingNavigator>) {
    let (db, backend, user) = seeded_user_db().await;
    let app_state = db.add_state(APP_STATE);
    let navigator = RecordingNavigator::at("https://pos.test/");
    let actions = SessionActions::new(db, app_state, user, config, navigator.clone());
    (actions, backend, navigator)
}

#[tokio::test]
async fn test_login_replaces_the_whole_pointer() -> tillpoint::Result<()> {
    let (app, _factory) = native_app();
    let actions = app.actions().await?;

    actions.login("site-a", "cred-a", "aaaaaaaaaa").await?;
    actions.login("site-b", "cred-b", "bbbbbbbbbb").await?;

    assert_eq!(
        actions.current_pointer().await?,
        Some(SessionPointer::new("site-b", "cred-b", "bbbbbbbbbb"))
    );
    Ok(())
}

#[tokio::test]
async fn test_switch_store_keeps_site_and_credentials() -> tillpoint::Result<()> {
    let (app, _factory) = native_app();
    let actions = app.actions().await?;
    let ids = actions
        .link_credentials(&sample_site(), &sample_credentials(), &remote_stores(&[1, 2]))
        .await?;
    actions.login(SITE_ID, CREDENTIALS_ID, &ids[0]).await?;

    let ctx = app.context().await?;
    let store = ctx
        .user_db
        .as_ref()
        .unwrap()
        .stores()
        .find_by_id(&ids[1])
        .await?
        .unwrap();
    actions.switch_store(&store).await?;

    assert_eq!(
        actions.current_pointer().await?,
        Some(SessionPointer::new(SITE_ID, CREDENTIALS_ID, ids[1].as_str()))
    );
    Ok(())
}

#[tokio::test]
async fn test_native_logout_clears_without_navigating() -> tillpoint::Result<()> {
    let navigator = RecordingNavigator::at("https://pos.test/");
    let app = App::builder(AppConfig::default(), Arc::new(InMemoryFactory::new()))
        .navigator(navigator.clone())
        .build();
    let actions = app.actions().await?;

    actions.login(SITE_ID, CREDENTIALS_ID, "aaaaaaaaaa").await?;
    actions.logout().await?;

    assert_eq!(actions.current_pointer().await?, None);
    assert!(navigator.navigated().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_web_logout_navigates_to_logout_url() -> tillpoint::Result<()> {
    let (app, navigator) = web_app(
        Arc::new(InMemoryFactory::new()),
        sample_props(&[1]),
        "https://pos.test/",
    );
    let session = app.session().await?;
    assert!(session.current().is_complete());

    app.actions().await?.logout().await?;

    let navigated = navigator.navigated();
    assert_eq!(navigated.len(), 1);
    assert_eq!(navigated[0].as_str(), LOGOUT_URL);
    let snapshot = session.wait_for(|s| s.store.is_none()).await?;
    assert!(snapshot.pointer.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_relinking_drops_stores_the_server_no_longer_returns() -> tillpoint::Result<()> {
    let (app, _factory) = native_app();
    let actions = app.actions().await?;

    let first = actions
        .link_credentials(&sample_site(), &sample_credentials(), &remote_stores(&[1, 2]))
        .await?;
    // A fresh login payload carries no local store list.
    let second = actions
        .link_credentials(
            &sample_site(),
            &WpCredentials::new(CREDENTIALS_ID),
            &remote_stores(&[2]),
        )
        .await?;

    assert_eq!(second, vec![first[1].clone()]);
    let db = app.context().await?.user_db.clone().unwrap();
    assert!(db.stores().find_by_id(&first[0]).await?.is_none());
    assert!(db.stores().find_by_id(&first[1]).await?.is_some());
    Ok(())
}

#[tokio::test]
async fn test_failed_login_write_is_returned() {
    let (actions, backend, _navigator) = counting_actions(AppConfig::default()).await;
    backend.fail_on(FailOn::SetState);

    let err = actions
        .login(SITE_ID, CREDENTIALS_ID, "aaaaaaaaaa")
        .await
        .unwrap_err();
    assert!(err.is_database_error());

    backend.clear_failure();
    assert_eq!(actions.current_pointer().await.unwrap(), None);
}

#[tokio::test]
async fn test_failed_switch_keeps_the_old_pointer() {
    let (actions, backend, _navigator) = counting_actions(AppConfig::default()).await;
    actions
        .login(SITE_ID, CREDENTIALS_ID, "aaaaaaaaaa")
        .await
        .unwrap();

    backend.fail_on(FailOn::SetState);
    let store = RemoteStore::new(2, "Store 2").into_store(LocalID::from("bbbbbbbbbb"));
    let err = actions.switch_store(&store).await.unwrap_err();
    assert!(err.is_database_error());

    backend.clear_failure();
    assert_eq!(
        actions.current_pointer().await.unwrap(),
        Some(SessionPointer::new(SITE_ID, CREDENTIALS_ID, "aaaaaaaaaa"))
    );
}

#[tokio::test]
async fn test_failed_logout_does_not_navigate() {
    let (actions, backend, navigator) = counting_actions(web_config()).await;
    actions
        .login(SITE_ID, CREDENTIALS_ID, "aaaaaaaaaa")
        .await
        .unwrap();

    backend.fail_on(FailOn::RemoveState);
    let err = actions.logout().await.unwrap_err();
    assert!(err.is_database_error());
    assert!(navigator.navigated().is_empty());

    backend.clear_failure();
    assert!(actions.current_pointer().await.unwrap().is_some());
}
