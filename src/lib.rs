pub mod codec;
mod error;
mod event;
mod fsutil;
pub mod layout;
mod ring;
mod store;
pub mod vfs;

pub use error::{BoxError, StoreError};
pub use event::{
    Change, ChangeComment, ChangeState, Commit, CommitComment, Create, Delete, Event, Fork, Issue,
    IssueComment, IssueState, Page, Payload, Push, Star, UnknownState, User, UserSpec, Wiki,
};
pub use ring::{RING_SIZE, Ring};
pub use store::{Authenticator, EventService, EventStore, EventStoreBuilder};
pub use vfs::{DiskFs, FileSystem, MemFs};
