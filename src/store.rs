use crate::codec;
use crate::error::{BoxError, StoreError};
use crate::event::{Event, User, UserSpec};
use crate::fsutil;
use crate::layout;
use crate::ring::{RING_SIZE, Ring};
use crate::vfs::FileSystem;
use parking_lot::Mutex;
use std::fmt;
use std::io;

/// Resolves who is calling, for the permission-checked store.
///
/// Implemented for any `Fn() -> Result<UserSpec, BoxError>`.
pub trait Authenticator: Send + Sync {
    fn authenticated_spec(&self) -> Result<UserSpec, BoxError>;
}

impl<T> Authenticator for T
where
    T: Fn() -> Result<UserSpec, BoxError> + Send + Sync,
{
    fn authenticated_spec(&self) -> Result<UserSpec, BoxError> {
        self()
    }
}

/// The contract offered to event producers and readers.
pub trait EventService {
    /// Recent events, most recent first.
    fn list(&self) -> Result<Vec<Event>, StoreError>;

    /// Record an event. `event.time` must be UTC.
    fn append(&self, event: Event) -> Result<(), StoreError>;
}

struct Mirror<const N: usize> {
    ring: Ring<N>,
    /// Indexed by physical slot; only slots inside `ring` are live.
    events: Box<[Event]>,
}

/// A bounded, per-user event history persisted through a [`FileSystem`].
///
/// At most `N` events are kept. Reads are served from memory; every
/// [`append`](EventStore::append) writes the event slot, then the ring
/// position, and only then updates memory. A crash between the two writes
/// leaves an orphaned slot that the old ring never points at.
///
/// One store is the only writer for its owner's directory. Two stores over
/// the same directory are not coordinated.
///
/// # Examples
///
/// ```
/// use activity_ring::{Event, EventStore, MemFs, Payload, Star, User, UserSpec};
/// use chrono::{TimeZone, Utc};
///
/// let owner = User::new(UserSpec::new(1, "example.org"), "gopher");
/// let store = EventStore::open(MemFs::new(), owner.clone()).unwrap();
///
/// let time = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
/// let event = Event::new(time, owner, "example.org/app").with_payload(Payload::Star(Star {}));
/// store.append(event.clone()).unwrap();
///
/// assert_eq!(store.list(), vec![event]);
/// ```
pub struct EventStore<F, const N: usize = RING_SIZE> {
    fs: F,
    owner: User,
    authenticator: Option<Box<dyn Authenticator>>,
    state: Mutex<Mirror<N>>,
}

/// Configures and opens an [`EventStore`].
pub struct EventStoreBuilder<F, const N: usize = RING_SIZE> {
    fs: F,
    owner: User,
    authenticator: Option<Box<dyn Authenticator>>,
}

impl<F: FileSystem> EventStore<F> {
    /// Start configuring a store for `owner`'s history, with the default
    /// capacity of [`RING_SIZE`].
    pub fn builder(fs: F, owner: User) -> EventStoreBuilder<F> {
        EventStoreBuilder {
            fs,
            owner,
            authenticator: None,
        }
    }

    /// Open `owner`'s history with default settings and no authorization
    /// check.
    pub fn open(fs: F, owner: User) -> Result<Self, StoreError> {
        Self::builder(fs, owner).open()
    }
}

impl<F: FileSystem, const N: usize> EventStoreBuilder<F, N> {
    /// Require every append to come from the owner, as reported by
    /// `authenticator`.
    pub fn authenticator(mut self, authenticator: impl Authenticator + 'static) -> Self {
        self.authenticator = Some(Box::new(authenticator));
        self
    }

    /// Keep `M` events instead of `N`.
    pub fn capacity<const M: usize>(self) -> EventStoreBuilder<F, M> {
        EventStoreBuilder {
            fs: self.fs,
            owner: self.owner,
            authenticator: self.authenticator,
        }
    }

    /// Load the persisted history and return a ready store.
    ///
    /// A missing ring record means an empty history. Any other read or
    /// decode failure aborts.
    ///
    /// # Errors
    ///
    /// [`StoreError::Io`], [`StoreError::Decode`] or
    /// [`StoreError::CorruptRing`] if durable state cannot be read in full.
    pub fn open(self) -> Result<EventStore<F, N>, StoreError> {
        let mirror = load::<F, N>(&self.fs, &self.owner)?;
        log::debug!(
            "activity-ring: loaded {} event(s) for {}",
            mirror.ring.len(),
            self.owner.spec
        );
        Ok(EventStore {
            fs: self.fs,
            owner: self.owner,
            authenticator: self.authenticator,
            state: Mutex::new(mirror),
        })
    }
}

fn load<F: FileSystem, const N: usize>(fs: &F, owner: &User) -> Result<Mirror<N>, StoreError> {
    let ring_path = layout::ring_path(&owner.spec);
    let ring = match fsutil::read_file(fs, &ring_path) {
        Ok(bytes) => {
            let record = codec::decode_ring(&bytes).map_err(|source| StoreError::Decode {
                path: ring_path.clone(),
                source,
            })?;
            Ring::<N>::from_parts(record.start, record.length).ok_or_else(|| {
                StoreError::CorruptRing {
                    path: ring_path.clone(),
                    start: record.start,
                    length: record.length,
                    capacity: N,
                }
            })?
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ring::default(),
        Err(e) => return Err(StoreError::io(ring_path, e)),
    };

    let mut events = vec![Event::default(); N].into_boxed_slice();
    for idx in ring.slots() {
        let path = layout::event_path(&owner.spec, idx);
        let bytes = fsutil::read_file(fs, &path).map_err(|e| StoreError::io(&path, e))?;
        events[idx] = codec::decode_event(&bytes, owner)
            .map_err(|source| StoreError::Decode { path, source })?;
    }

    Ok(Mirror { ring, events })
}

impl<F: FileSystem, const N: usize> EventStore<F, N> {
    /// Events currently retained, most recent first.
    ///
    /// Served from memory; never touches the filesystem.
    pub fn list(&self) -> Vec<Event> {
        let state = self.state.lock();
        state
            .ring
            .slots()
            .rev()
            .map(|idx| state.events[idx].clone())
            .collect()
    }

    /// Persist `event` and make it the most recent entry.
    ///
    /// Events whose actor is not the owner are skipped without error. Only
    /// the actor's [`UserSpec`] is checked; the event is kept in memory as
    /// given, while a reload reattaches the owner's display fields.
    ///
    /// # Errors
    ///
    /// - [`StoreError::NonUtcTime`] if `event.time` has a non-zero offset.
    /// - [`StoreError::Authentication`] or [`StoreError::PermissionDenied`]
    ///   if an authenticator is configured and the caller is not the owner.
    /// - [`StoreError::Io`] or [`StoreError::Encode`] if either write fails.
    ///   Memory is left as it was; the new slot may have been written.
    pub fn append(&self, event: Event) -> Result<(), StoreError> {
        if !event.is_utc() {
            return Err(StoreError::NonUtcTime {
                offset: *event.time.offset(),
            });
        }

        if event.actor.spec != self.owner.spec {
            log::debug!(
                "activity-ring: skipping event by {} in store for {}",
                event.actor.spec,
                self.owner.spec
            );
            return Ok(());
        }

        if let Some(authenticator) = &self.authenticator {
            let authenticated = authenticator
                .authenticated_spec()
                .map_err(StoreError::Authentication)?;
            if authenticated != self.owner.spec {
                log::warn!(
                    "activity-ring: {} denied logging events for {}",
                    authenticated,
                    self.owner.spec
                );
                return Err(StoreError::PermissionDenied {
                    authenticated,
                    owner: self.owner.spec.clone(),
                });
            }
        }

        let mut state = self.state.lock();
        let (ring, idx) = state.ring.advance();

        // Slot first, then ring: until the ring is written it still
        // describes the previous, fully durable history.
        let slot_path = layout::event_path(&self.owner.spec, idx);
        let slot = codec::encode_event(&event).map_err(|source| StoreError::Encode {
            path: slot_path.clone(),
            source,
        })?;
        fsutil::write_file_with_parents(&self.fs, &slot_path, &slot)
            .map_err(|e| StoreError::io(&slot_path, e))?;

        let ring_path = layout::ring_path(&self.owner.spec);
        let ring_bytes = codec::encode_ring(ring).map_err(|source| StoreError::Encode {
            path: ring_path.clone(),
            source,
        })?;
        fsutil::write_file(&self.fs, &ring_path, &ring_bytes)
            .map_err(|e| StoreError::io(&ring_path, e))?;

        state.events[idx] = event;
        state.ring = ring;
        log::trace!(
            "activity-ring: committed slot {} for {} ({}/{})",
            idx,
            self.owner.spec,
            ring.len(),
            N
        );
        Ok(())
    }

    /// The user whose history this store holds.
    pub fn owner(&self) -> &User {
        &self.owner
    }

    /// Current ring position.
    pub fn ring(&self) -> Ring<N> {
        self.state.lock().ring
    }

    pub fn len(&self) -> usize {
        self.state.lock().ring.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        N
    }
}

impl<F: FileSystem, const N: usize> EventService for EventStore<F, N> {
    fn list(&self) -> Result<Vec<Event>, StoreError> {
        Ok(EventStore::list(self))
    }

    fn append(&self, event: Event) -> Result<(), StoreError> {
        EventStore::append(self, event)
    }
}

impl<F: fmt::Debug, const N: usize> fmt::Debug for EventStore<F, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("EventStore")
            .field("fs", &self.fs)
            .field("owner", &self.owner.spec)
            .field("ring", &state.ring)
            .field("authenticated", &self.authenticator.is_some())
            .finish()
    }
}
