use crate::credentials::{CredentialKey, SteamId};

/// Stored credentials could not be decoded.
///
/// Returned by [`UserInfoCache::import`](crate::cache::UserInfoCache::import)
/// when an entry is not a validly encoded value. The host decides whether
/// this discards every stored credential or only the offending entry.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    /// Entry is not valid base64.
    #[error("`{key}` is not validly encoded: {source}")]
    InvalidEncoding {
        key: &'static str,
        #[source]
        source: base64::DecodeError,
    },

    /// Entry decodes to bytes that are not UTF-8.
    #[error("`{key}` does not decode to UTF-8: {source}")]
    InvalidUtf8 {
        key: &'static str,
        #[source]
        source: std::string::FromUtf8Error,
    },

    /// Stored steam id is not a base-10 integer.
    #[error("invalid steam id `{value}`: {source}")]
    InvalidSteamId {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },

    /// Entry holds a JSON value other than a string or `null`.
    #[error("`{key}` must be a string")]
    NotAString { key: &'static str },
}

impl CredentialError {
    pub fn key(&self) -> &'static str {
        match self {
            Self::InvalidEncoding { key, .. }
            | Self::InvalidUtf8 { key, .. }
            | Self::NotAString { key } => key,
            Self::InvalidSteamId { .. } => SteamId::KEY,
        }
    }
}
