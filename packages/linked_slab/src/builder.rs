use std::any::type_name;
use std::fmt;
use std::marker::PhantomData;

use crate::LinkedSlab;

/// Builder for creating an instance of [`LinkedSlab`].
///
/// You only need to use this builder if you want to customize the slab configuration.
/// The default configuration used by [`LinkedSlab::new()`][1] is sufficient for most use cases.
///
/// # Examples
///
/// ```
/// use linked_slab::LinkedSlab;
///
/// let slab = LinkedSlab::<u32>::builder().capacity(64).build();
/// assert!(slab.capacity() >= 64);
/// ```
///
/// [1]: LinkedSlab::new
#[must_use]
pub struct LinkedSlabBuilder<T> {
    capacity: usize,

    _item: PhantomData<T>,
}

impl<T> fmt::Debug for LinkedSlabBuilder<T> {
    #[cfg_attr(test, mutants::skip)] // No API contract for debug output.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(type_name::<Self>())
            .field("capacity", &self.capacity)
            .finish()
    }
}

impl<T> LinkedSlabBuilder<T> {
    pub(crate) fn new() -> Self {
        Self {
            capacity: 0,
            _item: PhantomData,
        }
    }

    /// Sets the number of entries (elements and list roots together) to reserve storage for
    /// up front. The slab still grows on demand beyond this.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Builds the slab with the specified configuration.
    #[must_use]
    pub fn build(self) -> LinkedSlab<T> {
        LinkedSlab::new_inner(self.capacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_builder_creates_empty_slab() {
        let slab = LinkedSlab::<u8>::builder().build();

        assert!(slab.is_empty());
        assert_eq!(slab.list_count(), 0);
    }

    #[test]
    fn capacity_is_reserved() {
        let slab = LinkedSlab::<u8>::builder().capacity(100).build();

        assert!(slab.capacity() >= 100);
        assert!(slab.is_empty());
    }
}
