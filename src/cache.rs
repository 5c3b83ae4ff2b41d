use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::config::CacheConfig;
use crate::credentials::{
    AccountUsername, CredentialKey, PersonaName, RefreshToken, SteamId, StoredCredentials,
};
use crate::error::CredentialError;

/// Initialization transition of a [`UserInfoCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Not enough identity data has been collected yet.
    Uninitialized,
    /// The initialization predicate has held at least once.
    Initialized,
}

/// Login state of a single Steam account.
///
/// Tracks whether enough identity data is known to consider the user logged
/// in, flags changes made after that point so the host knows when to persist,
/// and converts the persistable fields to and from [`StoredCredentials`].
///
/// The handle is cheap to clone; clones share the same state.
#[derive(Clone)]
pub struct UserInfoCache {
    inner: Arc<Inner>,
}

struct Inner {
    config: CacheConfig,
    state: Mutex<CacheState>,
    initialized: watch::Sender<bool>,
}

struct CacheState {
    fields: Fields,
    status: State,
    changed: bool,
}

#[derive(Default)]
struct Fields {
    steam_id: Option<u64>,
    account_username: Option<String>,
    persona_name: Option<String>,
    refresh_token: Option<String>,
    access_token: Option<String>,
}

impl Fields {
    /// Zero is a valid steam id, but an empty string is not a valid name or
    /// token.
    fn is_complete(&self) -> bool {
        self.steam_id.is_some()
            && is_filled(&self.account_username)
            && is_filled(&self.persona_name)
            && is_filled(&self.refresh_token)
    }
}

fn is_filled(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|s| !s.is_empty())
}

enum Update {
    SteamId(Option<u64>),
    AccountUsername(Option<String>),
    PersonaName(Option<String>),
    RefreshToken(Option<String>),
    AccessToken(Option<String>),
}

impl Update {
    fn field(&self) -> &'static str {
        match self {
            Update::SteamId(_) => SteamId::KEY,
            Update::AccountUsername(_) => AccountUsername::KEY,
            Update::PersonaName(_) => PersonaName::KEY,
            Update::RefreshToken(_) => RefreshToken::KEY,
            Update::AccessToken(_) => "access_token",
        }
    }

    /// Stores the value, returning whether it differs from the previous one.
    fn apply(self, fields: &mut Fields) -> bool {
        match self {
            Update::SteamId(v) => replace(&mut fields.steam_id, v),
            Update::AccountUsername(v) => replace(&mut fields.account_username, v),
            Update::PersonaName(v) => replace(&mut fields.persona_name, v),
            Update::RefreshToken(v) => replace(&mut fields.refresh_token, v),
            Update::AccessToken(v) => replace(&mut fields.access_token, v),
        }
    }
}

fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}

impl UserInfoCache {
    pub fn new() -> Self {
        Self::with_config(CacheConfig::default())
    }

    pub fn with_config(config: CacheConfig) -> Self {
        let (initialized, _) = watch::channel(false);
        Self {
            inner: Arc::new(Inner {
                config,
                state: Mutex::new(CacheState {
                    fields: Fields::default(),
                    status: State::Uninitialized,
                    changed: false,
                }),
                initialized,
            }),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.inner.config
    }

    /// Every critical section leaves the state consistent, so a poisoned lock
    /// is still safe to use.
    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn update(&self, updates: impl IntoIterator<Item = Update>) {
        let mut state = self.lock();
        for update in updates {
            self.apply(&mut state, update);
        }
    }

    fn apply(&self, state: &mut CacheState, update: Update) {
        let field = update.field();
        let differs = update.apply(&mut state.fields);

        match state.status {
            State::Initialized => {
                if differs {
                    debug!(field, "user info changed");
                    state.changed = true;
                }
            }
            State::Uninitialized => {
                if state.fields.is_complete() {
                    info!("user info cache initialized");
                    state.status = State::Initialized;
                    state.changed = true;
                    self.inner.initialized.send_replace(true);
                }
            }
        }
    }

    pub fn set_steam_id(&self, steam_id: Option<u64>) {
        self.update([Update::SteamId(steam_id)]);
    }

    pub fn set_account_username(&self, account_username: Option<String>) {
        self.update([Update::AccountUsername(account_username)]);
    }

    pub fn set_persona_name(&self, persona_name: Option<String>) {
        self.update([Update::PersonaName(persona_name)]);
    }

    pub fn set_refresh_token(&self, refresh_token: Option<String>) {
        self.update([Update::RefreshToken(refresh_token)]);
    }

    /// The access token never counts towards initialization and is never
    /// exported, but changing it after initialization still sets the changed
    /// flag.
    pub fn set_access_token(&self, access_token: Option<String>) {
        self.update([Update::AccessToken(access_token)]);
    }

    pub fn steam_id(&self) -> Option<u64> {
        self.lock().fields.steam_id
    }

    pub fn account_username(&self) -> Option<String> {
        self.lock().fields.account_username.clone()
    }

    /// Friendly name shown to the user.
    pub fn persona_name(&self) -> Option<String> {
        self.lock().fields.persona_name.clone()
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.lock().fields.refresh_token.clone()
    }

    pub fn access_token(&self) -> Option<String> {
        self.lock().fields.access_token.clone()
    }

    /// Whether the steam id, account username, persona name and refresh token
    /// are all currently present.
    pub fn is_initialized(&self) -> bool {
        self.lock().fields.is_complete()
    }

    /// The initialization transition. Unlike [`is_initialized`](Self::is_initialized)
    /// this never goes back to [`State::Uninitialized`], unless
    /// [`CacheConfig::rearm_on_clear`] is set and the cache is cleared.
    pub fn state(&self) -> State {
        self.lock().status
    }

    /// Returns whether a tracked field changed since the last call, and resets
    /// the flag.
    ///
    /// Reading the flag consumes it, so only one party should poll it.
    pub fn changed(&self) -> bool {
        std::mem::take(&mut self.lock().changed)
    }

    /// Waits until the cache has been initialized.
    ///
    /// Returns immediately if the initialization transition already happened.
    pub async fn wait_initialized(&self) {
        let mut initialized = self.inner.initialized.subscribe();
        // The sender lives in `self`, so the channel cannot close while waiting.
        let _ = initialized.wait_for(|ready| *ready).await;
    }

    /// Exports the persistable fields.
    ///
    /// Empty if the cache is not initialized. The access token is never
    /// exported.
    pub fn export(&self) -> StoredCredentials {
        let state = self.lock();
        let mut stored = StoredCredentials::new();
        if !state.fields.is_complete() {
            return stored;
        }

        let Fields {
            steam_id: Some(steam_id),
            account_username: Some(account_username),
            persona_name: Some(persona_name),
            refresh_token: Some(refresh_token),
            ..
        } = &state.fields
        else {
            return stored;
        };

        stored.insert(SteamId(*steam_id));
        stored.insert(RefreshToken(refresh_token.clone()));
        stored.insert(AccountUsername(account_username.clone()));
        stored.insert(PersonaName(persona_name.clone()));
        stored
    }

    /// Imports previously exported credentials.
    ///
    /// Keys that are absent or `null` leave their field untouched. Imported
    /// values go through the same change tracking as the setters, so
    /// importing a complete set initializes the cache.
    ///
    /// # Errors
    /// Every present entry is decoded before any field is written. If one of
    /// them is malformed, the import is rejected and the cache is unchanged.
    pub fn import(&self, stored: &StoredCredentials) -> Result<(), CredentialError> {
        let updates = decode_updates(stored).map_err(|e| {
            warn!(key = e.key(), "rejected stored credentials: {e}");
            e
        })?;

        for update in &updates {
            info!(key = update.field(), "loaded from stored credentials");
        }
        self.update(updates);
        Ok(())
    }

    /// Resets every field, the access token included, to absent.
    ///
    /// Does not set the changed flag. See [`CacheConfig::rearm_on_clear`] for
    /// what happens to the initialization state.
    pub fn clear(&self) {
        let mut state = self.lock();
        state.fields = Fields::default();
        if self.inner.config.rearm_on_clear {
            state.status = State::Uninitialized;
            self.inner.initialized.send_replace(false);
        }
        debug!("user info cache cleared");
    }
}

fn decode_updates(stored: &StoredCredentials) -> Result<Vec<Update>, CredentialError> {
    let mut updates = Vec::new();
    if let Some(steam_id) = stored.get::<SteamId>() {
        updates.push(Update::SteamId(Some(steam_id?.0)));
    }
    if let Some(account_username) = stored.get::<AccountUsername>() {
        updates.push(Update::AccountUsername(Some(account_username?.0)));
    }
    if let Some(persona_name) = stored.get::<PersonaName>() {
        updates.push(Update::PersonaName(Some(persona_name?.0)));
    }
    if let Some(refresh_token) = stored.get::<RefreshToken>() {
        updates.push(Update::RefreshToken(Some(refresh_token?.0)));
    }
    Ok(updates)
}

impl Default for UserInfoCache {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for UserInfoCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("UserInfoCache")
            .field("steam_id", &state.fields.steam_id)
            .field("account_username", &state.fields.account_username)
            .field("persona_name", &state.fields.persona_name)
            .field("has_refresh_token", &state.fields.refresh_token.is_some())
            .field("has_access_token", &state.fields.access_token.is_some())
            .field("state", &state.status)
            .finish()
    }
}
