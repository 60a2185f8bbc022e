#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Slab storage for values that are members of doubly-linked lists.
//!
//! A [`LinkedSlab`] stores values together with the links that make them members of a list, so
//! the lists themselves own no storage. Any number of lists can live in one slab. Elements are
//! addressed by generation-checked [`Key`]s instead of pointers, so a handle to a removed element
//! is detected on use rather than aliasing whatever took its place.
//!
//! Each list is circular and anchored by a sentinel root entry in the same slab, so the list
//! operations are all O(1):
//!
//! * insert before any position ([`LinkedSlab::link_before()`]), at either end
//!   ([`LinkedSlab::push_front()`], [`LinkedSlab::push_back()`]);
//! * detach any element ([`LinkedSlab::unlink()`], [`LinkedSlab::erase()`]), which reports
//!   the position that followed it;
//! * move a range of elements from one list to another ([`LinkedSlab::splice()`]).
//!
//! Cursors ([`Position`]) stay valid while the nodes around them are inserted and removed.
//!
//! This is part of the [Folo project](https://github.com/folo-rs/folo) that provides mechanisms
//! for high-performance hardware-aware programming in Rust.
//!
//! # Example
//!
//! ```rust
//! use linked_slab::LinkedSlab;
//!
//! let mut slab = LinkedSlab::<u32>::new();
//! let pending = slab.create_list();
//! let done = slab.create_list();
//!
//! for value in 1..=4 {
//!     let key = slab.insert(value);
//!     slab.push_back(pending, key);
//! }
//!
//! // Move the first two elements to the other list without touching the values.
//! let first = slab.begin(pending);
//! let last = slab.next(slab.next(first));
//! let at = slab.end(done);
//! slab.splice(at, first, last);
//!
//! let pending_values: Vec<_> = slab.iter(pending).map(|(_, value)| *value).collect();
//! let done_values: Vec<_> = slab.iter(done).map(|(_, value)| *value).collect();
//!
//! assert_eq!(pending_values, [3, 4]);
//! assert_eq!(done_values, [1, 2]);
//! ```

mod builder;
mod error;
mod key;
mod linked_slab;

pub use builder::*;
pub use error::*;
pub use key::*;
pub use linked_slab::*;
