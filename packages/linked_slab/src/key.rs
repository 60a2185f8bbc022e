use std::fmt;

/// A generation-checked handle to an entry in a [`LinkedSlab`][crate::LinkedSlab].
///
/// A key stays valid until the entry it refers to is removed from the slab. After that, the slot
/// may be reused for a different entry but the key will not match it: every reuse bumps the
/// generation of the slot, so lookups through an old key fail instead of aliasing the newcomer.
///
/// # Example
///
/// ```rust
/// use linked_slab::LinkedSlab;
///
/// let mut slab = LinkedSlab::<&str>::new();
///
/// let key = slab.insert("first");
/// slab.remove(key);
///
/// // The slot is reused but the old key no longer matches it.
/// let reused = slab.insert("second");
/// assert!(slab.get(key).is_none());
/// assert_eq!(slab.get(reused), Some(&"second"));
/// ```
#[derive(Clone, Copy, Eq, Hash, PartialEq)]
pub struct Key {
    index: u32,
    generation: u32,
}

impl Key {
    pub(crate) fn new(index: usize, generation: u32) -> Self {
        Self {
            index: u32::try_from(index)
                .expect("slab cannot hold more than u32::MAX entries - we do not intend to support that"),
            generation,
        }
    }

    #[must_use]
    pub(crate) fn index(self) -> usize {
        self.index as usize
    }

    #[must_use]
    pub(crate) fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for Key {
    #[cfg_attr(test, mutants::skip)] // No API contract for debug output.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key({}v{})", self.index, self.generation)
    }
}

/// Identifies one list stored in a [`LinkedSlab`][crate::LinkedSlab].
///
/// A list is represented by a sentinel root entry that lives in the same slab as the elements.
/// The root is never a real element; it marks both ends of the circular list, which is what
/// [`LinkedSlab::end()`][crate::LinkedSlab::end] returns.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct ListId {
    root: Key,
}

impl ListId {
    pub(crate) fn new(root: Key) -> Self {
        Self { root }
    }

    #[must_use]
    pub(crate) fn root(self) -> Key {
        self.root
    }
}

/// A cursor into a list, pointing either at an element or at the end sentinel of a list.
///
/// Positions compare by node identity. A position remains valid while its node stays in the slab,
/// regardless of what happens to other nodes of the list. Once the element it points at is
/// removed from the slab, the position is stale and any operation that uses it panics.
///
/// A position can be made from an element key via [`From<Key>`], which is how a caller that knows
/// an element obtains a cursor to it.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Position {
    key: Key,
}

impl Position {
    /// The key of the node this position points at.
    ///
    /// For the end position of a list, this is the key of the list root, which never resolves
    /// to an element via [`LinkedSlab::get()`][crate::LinkedSlab::get].
    #[must_use]
    pub fn key(self) -> Key {
        self.key
    }
}

impl From<Key> for Position {
    fn from(key: Key) -> Self {
        Self { key }
    }
}

impl From<ListId> for Position {
    fn from(list: ListId) -> Self {
        Self { key: list.root }
    }
}
