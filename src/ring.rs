//! Fixed-capacity circular position tracker.

/// Default number of slots retained per user.
pub const RING_SIZE: usize = 100;

/// Position of the live window within `N` physical slots.
///
/// The zero value is an empty ring. `start` is the physical slot of the
/// oldest retained event and is only meaningful while `length > 0`.
///
/// # Examples
///
/// ```
/// use activity_ring::Ring;
///
/// let ring = Ring::<3>::default();
/// let (ring, idx) = ring.advance();
/// assert_eq!(idx, 0);
/// let (ring, _) = ring.advance();
/// let (ring, _) = ring.advance();
///
/// // Full: the next advance evicts slot 0 and reuses it.
/// let (ring, idx) = ring.advance();
/// assert_eq!(idx, 0);
/// assert_eq!((ring.start(), ring.len()), (1, 3));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Ring<const N: usize> {
    start: usize,
    length: usize,
}

impl<const N: usize> Ring<N> {
    /// Build a ring from persisted values, rejecting positions that cannot
    /// occur for capacity `N`.
    pub fn from_parts(start: usize, length: usize) -> Option<Self> {
        if length > N || (N > 0 && start >= N) {
            return None;
        }
        Some(Ring { start, length })
    }

    /// Return the ring with one more element, and the physical slot that
    /// element occupies. Once full, the oldest slot is reclaimed.
    pub fn advance(self) -> (Self, usize) {
        const { assert!(N > 0, "ring capacity must be non-zero") };
        let mut ring = self;
        if ring.length < N {
            ring.length += 1;
        } else {
            ring.start = (ring.start + 1) % N;
        }
        let idx = (ring.start + ring.length - 1) % N;
        (ring, idx)
    }

    /// Physical slot of the `i`-th element counting from the oldest.
    ///
    /// Only meaningful for `i < self.len()`.
    pub fn at(&self, i: usize) -> usize {
        (self.start + i) % N
    }

    /// Physical slots of the live elements, oldest first.
    pub fn slots(&self) -> impl DoubleEndedIterator<Item = usize> + ExactSizeIterator + '_ {
        (0..self.length).map(move |i| self.at(i))
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub const fn capacity(&self) -> usize {
        N
    }
}
