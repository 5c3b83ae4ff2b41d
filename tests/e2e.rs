use std::time::Duration;

use base64::prelude::*;
use serde_json::json;
use steam_user_info::{
    store::{CredentialStore, MemoryStore},
    CacheConfig, State, StoredCredentials, UserInfoCache,
};


#[test]
fn incremental_login() {
    let cache = UserInfoCache::new();

    cache.set_account_username(Some("alice".into()));
    assert!(!cache.is_initialized());
    assert!(!cache.changed());

    cache.set_persona_name(Some("Alice A".into()));
    cache.set_refresh_token(Some("tok1".into()));
    assert!(!cache.is_initialized());
    assert!(!cache.changed());

    cache.set_steam_id(Some(12345));
    assert!(cache.is_initialized());
    assert!(cache.changed());
    assert!(!cache.changed());

    let stored = cache.export();
    assert_eq!(stored.len(), 4);
    let steam_id = stored.raw("steam_id").unwrap().as_str().unwrap();
    assert_eq!(BASE64_STANDARD.decode(steam_id).unwrap(), b"12345");
}

#[test]
fn export_import_round_trip() {
    let cache = login::logged_in(UserInfoCache::new());
    cache.set_access_token(Some("session".into()));

    let stored = cache.export();
    let restored = UserInfoCache::new();
    restored.import(&stored).unwrap();

    assert!(restored.is_initialized());
    assert_eq!(restored.steam_id(), cache.steam_id());
    assert_eq!(restored.account_username(), cache.account_username());
    assert_eq!(restored.persona_name(), cache.persona_name());
    assert_eq!(restored.refresh_token(), cache.refresh_token());
    assert_eq!(restored.access_token(), None);
    assert_eq!(restored.export(), stored);
}

#[test]
fn stored_form_survives_json() {
    let cache = login::logged_in(UserInfoCache::new());
    let text = serde_json::to_string(&cache.export()).unwrap();

    let stored: StoredCredentials = serde_json::from_str(&text).unwrap();
    let restored = UserInfoCache::new();
    restored.import(&stored).unwrap();
    assert_eq!(restored.persona_name().as_deref(), Some(login::PERSONA_NAME));
}

#[test]
fn stored_values_are_base64_of_utf8() {
    let cache = UserInfoCache::new();
    cache.set_steam_id(Some(0));
    cache.set_account_username(Some("zoë".into()));
    cache.set_persona_name(Some("Zoë 🎮".into()));
    cache.set_refresh_token(Some("eyJhbGciOiJFZERTQSJ9.e30.sig".into()));
    assert!(cache.is_initialized());

    assert_eq!(
        serde_json::to_value(cache.export()).unwrap(),
        json!({
            "steam_id": "MA==",
            "refresh_token": "ZXlKaGJHY2lPaUpGWkVSVFFTSjkuZTMwLnNpZw==",
            "account_username": "em/Dqw==",
            "persona_name": "Wm/DqyDwn46u",
        })
    );
}

#[test]
fn clear_then_reimport() {
    let cache = login::logged_in(UserInfoCache::new());
    let stored = cache.export();
    assert!(cache.changed());

    cache.clear();
    assert!(!cache.is_initialized());
    assert!(cache.export().is_empty());

    cache.import(&stored).unwrap();
    assert!(cache.is_initialized());
    assert!(cache.changed());
    assert_eq!(cache.export(), stored);
}

#[tokio::test]
async fn restart_cycle() {
    let store = MemoryStore::default();

    // First run: log in and persist.
    let first = UserInfoCache::new();
    assert!(!first.restore_from(&store).await.unwrap());
    let first = login::logged_in(first);
    assert!(first.persist_if_changed(&store).await.unwrap());

    // The persona name changes during the session.
    first.set_persona_name(Some("Alice the Great".into()));
    assert!(first.persist_if_changed(&store).await.unwrap());
    assert!(!first.persist_if_changed(&store).await.unwrap());

    // Second run: restore without logging in.
    let second = UserInfoCache::new();
    let waiter = {
        let second = second.clone();
        tokio::spawn(async move { second.wait_initialized().await })
    };
    assert!(second.restore_from(&store).await.unwrap());
    tokio::time::timeout(Duration::from_secs(5), waiter)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(second.state(), State::Initialized);
    assert_eq!(second.persona_name().as_deref(), Some("Alice the Great"));

    // Logging out forgets everything.
    second.clear();
    store.clear().await.unwrap();
    assert!(!second.is_initialized());
    assert!(store.load().await.unwrap().is_none());
}

#[tokio::test]
async fn relogin_with_rearming_clear() {
    let config: CacheConfig = serde_json::from_value(json!({ "rearm_on_clear": true })).unwrap();
    let cache = login::logged_in(UserInfoCache::with_config(config));
    cache.wait_initialized().await;
    assert!(cache.changed());

    cache.clear();
    assert_eq!(cache.state(), State::Uninitialized);

    let waiter = {
        let cache = cache.clone();
        tokio::spawn(async move { cache.wait_initialized().await })
    };
    tokio::task::yield_now().await;
    assert!(!waiter.is_finished());

    let cache = login::logged_in(cache);
    tokio::time::timeout(Duration::from_secs(5), waiter)
        .await
        .unwrap()
        .unwrap();
    assert!(cache.changed());
    assert!(!cache.changed());
}
