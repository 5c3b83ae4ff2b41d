//! Login state of a single Steam account, for integrations that need to
//! persist it across restarts.
//!
//! # Usage
//!
//! The login flow fills in a [`UserInfoCache`] as it learns the account's
//! details. Once the steam id, account username, persona name and refresh
//! token are all known, the cache is *initialized*:
//!
//! ```ignore
//! use steam_user_info::UserInfoCache;
//!
//! let cache = UserInfoCache::new();
//!
//! // Somewhere else, wait for the login to complete.
//! let waiter = cache.clone();
//! tokio::spawn(async move {
//!     waiter.wait_initialized().await;
//!     // Proceed with the logged in account.
//! });
//!
//! cache.set_steam_id(Some(steam_id));
//! cache.set_account_username(Some(account_name));
//! cache.set_persona_name(Some(persona_name));
//! cache.set_refresh_token(Some(refresh_token));
//! assert!(cache.is_initialized());
//! ```
//!
//! After initialization, every write that changes a value raises the
//! [`changed`](UserInfoCache::changed) flag. The host polls it and persists
//! the [exported](UserInfoCache::export) credentials:
//!
//! ```ignore
//! if cache.changed() {
//!     storage.write(serde_json::to_string(&cache.export())?)?;
//! }
//! ```
//!
//! On the next start, the stored credentials are
//! [imported](UserInfoCache::import) back, which initializes the cache
//! without going through the login flow again:
//!
//! ```ignore
//! let stored: StoredCredentials = serde_json::from_str(&storage.read()?)?;
//! cache.import(&stored)?;
//! ```
//!
//! Hosts may instead implement [`CredentialStore`] and use
//! [`UserInfoCache::restore_from`] and [`UserInfoCache::persist_if_changed`].
//!
//! # Stored Form
//!
//! [`StoredCredentials`] is a string-keyed object with the entries
//! `steam_id`, `refresh_token`, `account_username` and `persona_name`. Each
//! value is the base64 of the field's UTF-8 text, the steam id being written
//! in decimal. This keeps values safe for text-only storage but is **not**
//! encryption. The access token is session scoped and never stored.
//!
//! [`CredentialStore`]: crate::store::CredentialStore

pub mod cache;
pub mod config;
pub mod credentials;
pub mod encoding;
pub mod error;
pub mod store;

pub use cache::{State, UserInfoCache};
pub use config::CacheConfig;
pub use credentials::StoredCredentials;
pub use error::CredentialError;
