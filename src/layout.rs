//! Paths of a user's history within a [`FileSystem`](crate::FileSystem).
//!
//! ```text
//! root
//! └── {id}@{domain}
//!     ├── ring
//!     ├── event-0
//!     ├── event-1
//!     ├── ...
//!     └── event-{N-1}
//! ```

use crate::event::UserSpec;
use std::path::PathBuf;

pub fn events_dir(user: &UserSpec) -> PathBuf {
    PathBuf::from(user.to_string())
}

pub fn ring_path(user: &UserSpec) -> PathBuf {
    events_dir(user).join("ring")
}

pub fn event_path(user: &UserSpec, idx: usize) -> PathBuf {
    events_dir(user).join(format!("event-{idx}"))
}
