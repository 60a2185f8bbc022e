use thiserror::Error;

use crate::Key;

/// Errors reported by the checked (`try_*`) operations of a [`LinkedSlab`][crate::LinkedSlab].
///
/// The unchecked variants of the same operations panic with the same message.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The key does not refer to a live entry. The entry was removed (possibly with the slot
    /// reused by a newer entry) or the key comes from a different slab.
    #[error("{key:?} does not refer to a live entry of the slab")]
    StaleKey {
        /// The offending key.
        key: Key,
    },

    /// The key refers to the root of a list where an element was required.
    #[error("{key:?} is a list root, not an element")]
    NotAnElement {
        /// The offending key.
        key: Key,
    },

    /// The element is already a member of a list and must be unlinked first.
    #[error("element {key:?} is already linked into a list")]
    AlreadyLinked {
        /// The offending key.
        key: Key,
    },

    /// The position refers to an element that is not a member of any list, so there is no
    /// neighbor to link against.
    #[error("{key:?} is not linked into any list")]
    NotLinked {
        /// The offending key.
        key: Key,
    },
}

/// A specialized `Result` type for slab operations, returning the crate's
/// [`Error`] type as the error value.
pub type Result<T> = std::result::Result<T, Error>;
