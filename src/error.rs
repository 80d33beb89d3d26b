use crate::event::UserSpec;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Boxed error returned by [`Authenticator`](crate::Authenticator) implementations.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors surfaced by [`EventStore`](crate::EventStore).
///
/// The store never retries. A failed append leaves the in-memory mirror
/// untouched; a failure while loading aborts construction.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The event's timestamp carries a non-zero UTC offset.
    #[error("event time must be UTC, got offset {offset}")]
    NonUtcTime { offset: chrono::FixedOffset },

    /// The authenticated caller does not own the history being written.
    #[error("user {authenticated} may not log events for {owner}")]
    PermissionDenied {
        authenticated: UserSpec,
        owner: UserSpec,
    },

    /// The authenticator could not resolve the caller.
    #[error("failed to resolve authenticated user: {0}")]
    Authentication(#[source] BoxError),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to encode {}: {source}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A persisted record could not be parsed.
    #[error("failed to decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The persisted ring position does not fit the configured capacity.
    #[error(
        "ring at {} is out of range for capacity {capacity}: start {start}, length {length}",
        path.display()
    )]
    CorruptRing {
        path: PathBuf,
        start: usize,
        length: usize,
        capacity: usize,
    },
}

impl StoreError {
    /// Whether this is a caller-correctable validation failure.
    pub fn is_validation(&self) -> bool {
        matches!(self, StoreError::NonUtcTime { .. })
    }

    pub fn is_permission_denied(&self) -> bool {
        matches!(self, StoreError::PermissionDenied { .. })
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }
}
