use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};

use crate::encoding;
use crate::error::CredentialError;

/// Persistable credentials in their stored form.
///
/// A string-keyed object whose values are encoded strings (see
/// [`encoding`](crate::encoding)) or `null`. Produced by
/// [`UserInfoCache::export`](crate::cache::UserInfoCache::export) and consumed
/// by [`UserInfoCache::import`](crate::cache::UserInfoCache::import).
/// Serializes as a plain JSON object, so hosts can keep it as one document or
/// as individual key/value rows.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoredCredentials(pub(crate) Map<String, Json>);

/// A strongly typed entry of [`StoredCredentials`].
pub trait CredentialKey: Sized {
    const KEY: &'static str;

    /// Plain text form, before encoding.
    fn to_plain(&self) -> String;

    fn from_plain(plain: String) -> Result<Self, CredentialError>;
}

/// Numeric account identifier, stored as its decimal string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SteamId(pub u64);

impl CredentialKey for SteamId {
    const KEY: &'static str = "steam_id";

    fn to_plain(&self) -> String {
        self.0.to_string()
    }

    fn from_plain(plain: String) -> Result<Self, CredentialError> {
        plain
            .parse()
            .map(Self)
            .map_err(|source| CredentialError::InvalidSteamId {
                value: plain,
                source,
            })
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct RefreshToken(pub String);

impl CredentialKey for RefreshToken {
    const KEY: &'static str = "refresh_token";

    fn to_plain(&self) -> String {
        self.0.clone()
    }

    fn from_plain(plain: String) -> Result<Self, CredentialError> {
        Ok(Self(plain))
    }
}

impl fmt::Debug for RefreshToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RefreshToken(<redacted>)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountUsername(pub String);

impl CredentialKey for AccountUsername {
    const KEY: &'static str = "account_username";

    fn to_plain(&self) -> String {
        self.0.clone()
    }

    fn from_plain(plain: String) -> Result<Self, CredentialError> {
        Ok(Self(plain))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonaName(pub String);

impl CredentialKey for PersonaName {
    const KEY: &'static str = "persona_name";

    fn to_plain(&self) -> String {
        self.0.clone()
    }

    fn from_plain(plain: String) -> Result<Self, CredentialError> {
        Ok(Self(plain))
    }
}

/// Keys written by an export, in export order.
pub const PERSISTABLE_KEYS: [&str; 4] = [
    SteamId::KEY,
    RefreshToken::KEY,
    AccountUsername::KEY,
    PersonaName::KEY,
];

impl StoredCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get and decode a typed entry.
    ///
    /// Returns `None` if the key is absent or `null`.
    pub fn get<T: CredentialKey>(&self) -> Option<Result<T, CredentialError>> {
        match self.0.get(T::KEY)? {
            Json::Null => None,
            Json::String(s) => Some(encoding::decode(T::KEY, s).and_then(T::from_plain)),
            _ => Some(Err(CredentialError::NotAString { key: T::KEY })),
        }
    }

    /// Encode and insert a typed entry, replacing any previous value.
    pub fn insert<T: CredentialKey>(&mut self, t: T) {
        self.0
            .insert(T::KEY.to_owned(), Json::String(encoding::encode(&t.to_plain())));
    }

    /// Remove an entry by key, e.g. to drop one the host failed to import.
    pub fn remove(&mut self, key: &str) -> Option<Json> {
        self.0.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// The raw (still encoded) value of an entry.
    pub fn raw(&self, key: &str) -> Option<&Json> {
        self.0.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Json>> for StoredCredentials {
    fn from(value: Map<String, Json>) -> Self {
        Self(value)
    }
}

impl From<StoredCredentials> for Json {
    fn from(value: StoredCredentials) -> Self {
        value.0.into()
    }
}

/// Builds stored credentials from already encoded key/value pairs, as read
/// back from a text key/value store.
impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for StoredCredentials {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), Json::String(v.into())))
                .collect(),
        )
    }
}

impl fmt::Debug for StoredCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredCredentials")
            .field("keys", &self.0.keys().collect::<Vec<_>>())
            .finish()
    }
}
