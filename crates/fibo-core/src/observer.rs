//! Observer hooks for cache traffic inside the generator.
//!
//! Observers are handed to a `Generator` explicitly; nothing here relies on
//! process-wide state.

/// One interaction between the generator and its cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheEvent {
    /// The value for this ordinal was found in the cache.
    Hit(u64),
    /// The value was absent and had to be computed.
    Miss(u64),
    /// The backend failed on read; treated as a miss.
    ReadFailed(u64),
    /// A computed value was written back.
    Stored(u64),
    /// Writing a computed value back failed; the value is still returned.
    WriteFailed(u64),
}

impl CacheEvent {
    /// The ordinal this event refers to.
    #[must_use]
    pub fn ordinal(&self) -> u64 {
        match *self {
            Self::Hit(n)
            | Self::Miss(n)
            | Self::ReadFailed(n)
            | Self::Stored(n)
            | Self::WriteFailed(n) => n,
        }
    }
}

/// Receives cache events from a generator.
pub trait ComputeObserver: Send + Sync {
    /// Called synchronously for every cache interaction.
    fn on_event(&self, event: &CacheEvent);
}
