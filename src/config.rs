use serde::Deserialize;

/// Behaviour switches for [`UserInfoCache`](crate::cache::UserInfoCache).
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct CacheConfig {
    /// Whether [`clear`](crate::cache::UserInfoCache::clear) returns the cache
    /// to the uninitialized state.
    ///
    /// When `false`, the initialization signal stays fired across a clear:
    /// [`wait_initialized`](crate::cache::UserInfoCache::wait_initialized)
    /// keeps returning immediately, and repopulating the cleared fields is
    /// reported through [`changed`](crate::cache::UserInfoCache::changed) one
    /// write at a time.
    ///
    /// When `true`, a clear re-arms the signal. Waiters suspend again until
    /// the fields are repopulated, at which point the initialization
    /// transition fires a second time.
    pub rearm_on_clear: bool,
}
