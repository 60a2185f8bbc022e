use std::any::type_name;
use std::fmt;
use std::iter::FusedIterator;
use std::mem;

use crate::{Error, Key, LinkedSlabBuilder, ListId, Position, Result};

/// Slab storage for values that are members of doubly-linked lists, with the links stored next to
/// each value inside the slab.
///
/// Values are inserted detached and addressed by a generation-checked [`Key`]. Any number of
/// lists can be created in the same slab; each one is a circular list anchored by a sentinel root
/// entry. Detached elements can be linked into any list of the slab, and elements (or whole
/// ranges of them) can be moved between lists without touching the values.
///
/// All list operations are O(1) except [`clear()`][1] and [`remove_list()`][2], which visit every
/// element of the list in order to leave each one in the detached state.
///
/// # Positions
///
/// A [`Position`] is a cursor pointing either at an element or at the end of a list. Positions
/// stay valid across insertions and removals of other nodes. A position whose element has been
/// removed from the slab is stale and using it panics; a position whose element was merely
/// unlinked cannot be advanced because it no longer has neighbors.
///
/// Operations that take several positions expect them to belong to the same list. This is only
/// checked to the extent that every position must be live in this slab.
///
/// # Example
///
/// ```rust
/// use linked_slab::LinkedSlab;
///
/// let mut slab = LinkedSlab::<&str>::new();
/// let list = slab.create_list();
///
/// let a = slab.insert("a");
/// let b = slab.insert("b");
/// slab.push_back(list, a);
/// slab.push_front(list, b);
///
/// let values: Vec<_> = slab.iter(list).map(|(_, value)| *value).collect();
/// assert_eq!(values, ["b", "a"]);
/// ```
///
/// [1]: Self::clear
/// [2]: Self::remove_list
pub struct LinkedSlab<T> {
    entries: Vec<Entry<T>>,

    /// Index of the most recently vacated entry, if any. The vacant entries form a stack
    /// threaded through the entries themselves (an intrusive freelist).
    free_head: Option<usize>,

    element_count: usize,
    list_count: usize,
}

/// The neighbors of a linked node, by entry index.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct Links {
    next: usize,
    prev: usize,
}

#[derive(Debug)]
struct Entry<T> {
    /// Bumped whenever the entry becomes vacant, invalidating every key issued for it.
    generation: u32,
    state: State<T>,
}

#[derive(Debug)]
enum State<T> {
    Vacant { next_free: Option<usize> },

    /// The sentinel of a list. Always linked; points at itself while the list is empty.
    Root { links: Links },

    Element { value: T, links: Option<Links> },
}

impl<T> LinkedSlab<T> {
    /// Creates an empty slab with the default configuration.
    ///
    /// # Example
    ///
    /// ```rust
    /// use linked_slab::LinkedSlab;
    ///
    /// let slab = LinkedSlab::<String>::new();
    /// assert!(slab.is_empty());
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Creates an empty slab with room for `capacity` entries before it needs to grow.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::builder().capacity(capacity).build()
    }

    /// Starts building a slab with a custom configuration.
    pub fn builder() -> LinkedSlabBuilder<T> {
        LinkedSlabBuilder::new()
    }

    pub(crate) fn new_inner(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            free_head: None,
            element_count: 0,
            list_count: 0,
        }
    }

    /// The number of elements in the slab, linked or not. List roots are not counted.
    #[must_use]
    #[cfg_attr(test, mutants::skip)] // Can be mutated to infinitely growing memory use.
    pub fn len(&self) -> usize {
        self.element_count
    }

    /// Whether the slab holds no elements. It may still hold (empty) lists.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.element_count == 0
    }

    /// The number of lists currently created in the slab.
    #[must_use]
    pub fn list_count(&self) -> usize {
        self.list_count
    }

    /// The number of entries the slab can hold without reallocating.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.entries.capacity()
    }

    /// Inserts a detached element and returns its key.
    #[must_use]
    pub fn insert(&mut self, value: T) -> Key {
        let key = self.allocate(State::Element { value, links: None });

        self.element_count = self
            .element_count
            .checked_add(1)
            .expect("element count is bounded by the number of entries, which fits in u32");

        key
    }

    /// Removes an element from the slab, unlinking it from its list first if it is linked.
    ///
    /// # Panics
    ///
    /// Panics if the key is stale or refers to a list root.
    pub fn remove(&mut self, key: Key) -> T {
        self.try_remove(key)
            .unwrap_or_else(|error| panic!("{error} in slab of {}", type_name::<T>()))
    }

    /// Removes an element from the slab, unlinking it from its list first if it is linked.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is stale or refers to a list root.
    pub fn try_remove(&mut self, key: Key) -> Result<T> {
        let index = self.element_index(key)?;

        _ = self.unlink_index(index);

        let State::Element { value, .. } = self.vacate(index) else {
            panic!(
                "entry {index} was validated as an element but was something else in slab of {}",
                type_name::<T>()
            );
        };

        self.element_count = self
            .element_count
            .checked_sub(1)
            .expect("we just removed an element so the count must be non-zero");

        Ok(value)
    }

    /// Returns the value of an element, or `None` if the key is stale or refers to a list root.
    #[must_use]
    pub fn get(&self, key: Key) -> Option<&T> {
        match self.entry(key).ok()? {
            Entry {
                state: State::Element { value, .. },
                ..
            } => Some(value),
            _ => None,
        }
    }

    /// Returns the value of an element for modification, or `None` if the key is stale or refers
    /// to a list root.
    #[must_use]
    pub fn get_mut(&mut self, key: Key) -> Option<&mut T> {
        match self.entry_mut(key).ok()? {
            Entry {
                state: State::Element { value, .. },
                ..
            } => Some(value),
            _ => None,
        }
    }

    /// Whether the key refers to a live element.
    #[must_use]
    pub fn contains(&self, key: Key) -> bool {
        self.get(key).is_some()
    }

    /// Whether the key refers to a live element that is currently a member of a list.
    #[must_use]
    pub fn is_linked(&self, key: Key) -> bool {
        matches!(
            self.entry(key),
            Ok(Entry {
                state: State::Element { links: Some(_), .. },
                ..
            })
        )
    }

    /// Creates a new empty list in this slab.
    #[must_use]
    pub fn create_list(&mut self) -> ListId {
        let root = self.allocate(State::Root {
            links: Links { next: 0, prev: 0 },
        });

        // The root index is only known after allocation, so the self-links are written afterwards.
        *self.links_at_mut(root.index()) = Links {
            next: root.index(),
            prev: root.index(),
        };

        self.list_count = self
            .list_count
            .checked_add(1)
            .expect("list count is bounded by the number of entries, which fits in u32");

        ListId::new(root)
    }

    /// Detaches all elements of the list and then removes the list itself.
    ///
    /// The elements stay in the slab and may be linked into other lists.
    ///
    /// # Panics
    ///
    /// Panics if the list has already been removed.
    pub fn remove_list(&mut self, list: ListId) {
        self.clear(list);

        let root = self.root_index(list);
        _ = self.vacate(root);

        self.list_count = self
            .list_count
            .checked_sub(1)
            .expect("we just removed a list so the count must be non-zero");
    }

    /// Whether the list has no elements.
    ///
    /// # Panics
    ///
    /// Panics if the list has been removed.
    #[must_use]
    pub fn is_list_empty(&self, list: ListId) -> bool {
        let root = self.root_index(list);
        self.links_at(root).next == root
    }

    /// Position of the first element of the list, or the end position if the list is empty.
    ///
    /// # Panics
    ///
    /// Panics if the list has been removed.
    #[must_use]
    pub fn begin(&self, list: ListId) -> Position {
        let root = self.root_index(list);
        Position::from(self.key_at(self.links_at(root).next))
    }

    /// The end position of the list: one past the last element, which is also where iteration
    /// from the back starts.
    ///
    /// # Panics
    ///
    /// Panics if the list has been removed.
    #[must_use]
    pub fn end(&self, list: ListId) -> Position {
        _ = self.root_index(list);
        Position::from(list)
    }

    /// Whether the position is the end position of some list.
    ///
    /// # Panics
    ///
    /// Panics if the position is stale.
    #[must_use]
    pub fn is_end(&self, position: Position) -> bool {
        let entry = self
            .entry(position.key())
            .unwrap_or_else(|error| panic!("{error} in slab of {}", type_name::<T>()));

        matches!(entry.state, State::Root { .. })
    }

    /// Key of the first element of the list, if any.
    #[must_use]
    pub fn front(&self, list: ListId) -> Option<Key> {
        let root = self.root_index(list);
        let first = self.links_at(root).next;

        (first != root).then(|| self.key_at(first))
    }

    /// Key of the last element of the list, if any.
    #[must_use]
    pub fn back(&self, list: ListId) -> Option<Key> {
        let root = self.root_index(list);
        let last = self.links_at(root).prev;

        (last != root).then(|| self.key_at(last))
    }

    /// The position after `position`. The position after the last element is the end position
    /// and the position after the end position is the first element (the list is circular).
    ///
    /// # Panics
    ///
    /// Panics if the position is stale or points at an element that is not linked.
    #[must_use]
    pub fn next(&self, position: Position) -> Position {
        let index = self.linked_index_or_panic(position);
        Position::from(self.key_at(self.links_at(index).next))
    }

    /// The position before `position`. The position before the first element is the end
    /// position and the position before the end position is the last element.
    ///
    /// # Panics
    ///
    /// Panics if the position is stale or points at an element that is not linked.
    #[must_use]
    pub fn prev(&self, position: Position) -> Position {
        let index = self.linked_index_or_panic(position);
        Position::from(self.key_at(self.links_at(index).prev))
    }

    /// Links a detached element at the front of the list.
    ///
    /// # Panics
    ///
    /// Panics if the list has been removed or if the key is not a live, detached element.
    pub fn push_front(&mut self, list: ListId, key: Key) {
        let begin = self.begin(list);
        _ = self.link_before(begin, key);
    }

    /// Links a detached element at the back of the list.
    ///
    /// # Panics
    ///
    /// Panics if the list has been removed or if the key is not a live, detached element.
    pub fn push_back(&mut self, list: ListId, key: Key) {
        let end = self.end(list);
        _ = self.link_before(end, key);
    }

    /// Links a detached element into a list right before `position` and returns the position of
    /// the newly linked element.
    ///
    /// # Panics
    ///
    /// Panics under the same conditions as [`try_link_before()`][Self::try_link_before] returns
    /// an error.
    pub fn link_before(&mut self, position: Position, key: Key) -> Position {
        self.try_link_before(position, key)
            .unwrap_or_else(|error| panic!("{error} in slab of {}", type_name::<T>()))
    }

    /// Links a detached element into a list right before `position` and returns the position of
    /// the newly linked element.
    ///
    /// # Errors
    ///
    /// Returns an error if the position is stale or not linked, or if the key is not a live,
    /// detached element.
    pub fn try_link_before(&mut self, position: Position, key: Key) -> Result<Position> {
        let at = self.linked_index(position)?;
        let index = self.detached_element_index(key)?;

        let prev = self.links_at(at).prev;

        self.set_element_links(index, Some(Links { next: at, prev }));
        self.links_at_mut(prev).next = index;
        self.links_at_mut(at).prev = index;

        Ok(Position::from(key))
    }

    /// Detaches an element from its list, keeping it in the slab.
    ///
    /// Returns the position that followed the element (possibly the end position of its list),
    /// or `None` if the element was not linked.
    ///
    /// # Panics
    ///
    /// Panics if the key is stale or refers to a list root.
    pub fn unlink(&mut self, key: Key) -> Option<Position> {
        let index = self
            .element_index(key)
            .unwrap_or_else(|error| panic!("{error} in slab of {}", type_name::<T>()));

        self.unlink_index(index)
            .map(|next| Position::from(self.key_at(next)))
    }

    /// Detaches the element at `position` from its list and returns the position that followed
    /// it. The element stays in the slab.
    ///
    /// # Panics
    ///
    /// Panics if the position is stale, is an end position or points at a detached element.
    pub fn erase(&mut self, position: Position) -> Position {
        self.unlink(position.key()).unwrap_or_else(|| {
            panic!(
                "cannot erase {:?} because it is not linked into any list in slab of {}",
                position.key(),
                type_name::<T>()
            )
        })
    }

    /// Detaches the first element of the list and returns its key.
    pub fn pop_front(&mut self, list: ListId) -> Option<Key> {
        let key = self.front(list)?;
        _ = self.unlink(key);
        Some(key)
    }

    /// Detaches the last element of the list and returns its key.
    pub fn pop_back(&mut self, list: ListId) -> Option<Key> {
        let key = self.back(list)?;
        _ = self.unlink(key);
        Some(key)
    }

    /// Moves the elements in the half-open range `[first, last)` so that they are linked right
    /// before `position`. The range may come from a different list than `position`, as long as
    /// both lists live in this slab. No values are moved in memory.
    ///
    /// Does nothing if the range is empty or if `position == first`.
    ///
    /// `first` and `last` must delimit a range of one list and `position` must not be inside the
    /// range; violating this corrupts the lists involved (though never the slab itself).
    ///
    /// # Panics
    ///
    /// Panics if any of the positions is stale or points at a detached element.
    pub fn splice(&mut self, position: Position, first: Position, last: Position) {
        if position == first || first == last {
            return;
        }

        let at = self.linked_index_or_panic(position);
        let first = self.linked_index_or_panic(first);
        let last = self.linked_index_or_panic(last);

        let before_first = self.links_at(first).prev;
        let true_last = self.links_at(last).prev;

        // Close the gap in the source list.
        self.links_at_mut(before_first).next = last;
        self.links_at_mut(last).prev = before_first;

        // Open a gap before `at` and hang the range into it.
        let before_at = self.links_at(at).prev;
        self.links_at_mut(before_at).next = first;
        self.links_at_mut(first).prev = before_at;
        self.links_at_mut(at).prev = true_last;
        self.links_at_mut(true_last).next = at;
    }

    /// Moves all elements of `other` to the back of `list`, leaving `other` empty.
    ///
    /// # Panics
    ///
    /// Panics if either list has been removed.
    pub fn append(&mut self, list: ListId, other: ListId) {
        let end = self.end(list);
        let first = self.begin(other);
        let last = self.end(other);

        self.splice(end, first, last);
    }

    /// Detaches every element of the list. The elements stay in the slab.
    ///
    /// # Panics
    ///
    /// Panics if the list has been removed.
    pub fn clear(&mut self, list: ListId) {
        let root = self.root_index(list);

        let mut index = self.links_at(root).next;

        while index != root {
            let next = self.links_at(index).next;
            self.set_element_links(index, None);
            index = next;
        }

        *self.links_at_mut(root) = Links {
            next: root,
            prev: root,
        };
    }

    /// Iterates over the elements of the list, front to back (or back to front via
    /// [`DoubleEndedIterator`]).
    ///
    /// # Panics
    ///
    /// Panics if the list has been removed.
    pub fn iter(&self, list: ListId) -> Iter<'_, T> {
        let root = self.root_index(list);
        let links = self.links_at(root);

        Iter {
            slab: self,
            front: links.next,
            back: links.prev,
            root,
            finished: false,
        }
    }

    /// Calls `f` with every element of the list, front to back, allowing the values to be
    /// modified. The list structure itself cannot change during the walk.
    ///
    /// # Panics
    ///
    /// Panics if the list has been removed.
    pub fn for_each_mut(&mut self, list: ListId, mut f: impl FnMut(Key, &mut T)) {
        let root = self.root_index(list);

        let mut index = self.links_at(root).next;

        while index != root {
            let next = self.links_at(index).next;

            let entry = self
                .entries
                .get_mut(index)
                .expect("linked indexes always refer to existing entries");

            if let State::Element { value, .. } = &mut entry.state {
                f(Key::new(index, entry.generation), value);
            }

            index = next;
        }
    }

    fn allocate(&mut self, state: State<T>) -> Key {
        let Some(index) = self.free_head else {
            let index = self.entries.len();
            let key = Key::new(index, 0);

            self.entries.push(Entry {
                generation: 0,
                state,
            });

            return key;
        };

        let entry = self
            .entries
            .get_mut(index)
            .expect("the freelist only holds indexes of existing entries");

        let State::Vacant { next_free } = entry.state else {
            panic!(
                "freelist pointed at occupied entry {index} in slab of {}",
                type_name::<T>()
            );
        };

        self.free_head = next_free;
        entry.state = state;

        Key::new(index, entry.generation)
    }

    fn vacate(&mut self, index: usize) -> State<T> {
        let entry = self
            .entries
            .get_mut(index)
            .expect("callers only vacate validated indexes");

        entry.generation = entry.generation.wrapping_add(1);

        let previous = mem::replace(
            &mut entry.state,
            State::Vacant {
                next_free: self.free_head,
            },
        );

        self.free_head = Some(index);

        previous
    }

    fn entry(&self, key: Key) -> Result<&Entry<T>> {
        match self.entries.get(key.index()) {
            Some(entry)
                if entry.generation == key.generation()
                    && !matches!(entry.state, State::Vacant { .. }) =>
            {
                Ok(entry)
            }
            _ => Err(Error::StaleKey { key }),
        }
    }

    fn entry_mut(&mut self, key: Key) -> Result<&mut Entry<T>> {
        match self.entries.get_mut(key.index()) {
            Some(entry)
                if entry.generation == key.generation()
                    && !matches!(entry.state, State::Vacant { .. }) =>
            {
                Ok(entry)
            }
            _ => Err(Error::StaleKey { key }),
        }
    }

    fn element_index(&self, key: Key) -> Result<usize> {
        match self.entry(key)?.state {
            State::Element { .. } => Ok(key.index()),
            State::Root { .. } => Err(Error::NotAnElement { key }),
            State::Vacant { .. } => Err(Error::StaleKey { key }),
        }
    }

    fn detached_element_index(&self, key: Key) -> Result<usize> {
        match self.entry(key)?.state {
            State::Element { links: None, .. } => Ok(key.index()),
            State::Element { links: Some(_), .. } => Err(Error::AlreadyLinked { key }),
            State::Root { .. } => Err(Error::NotAnElement { key }),
            State::Vacant { .. } => Err(Error::StaleKey { key }),
        }
    }

    fn linked_index(&self, position: Position) -> Result<usize> {
        let key = position.key();

        match self.entry(key)?.state {
            State::Root { .. } | State::Element { links: Some(_), .. } => Ok(key.index()),
            State::Element { links: None, .. } => Err(Error::NotLinked { key }),
            State::Vacant { .. } => Err(Error::StaleKey { key }),
        }
    }

    fn linked_index_or_panic(&self, position: Position) -> usize {
        self.linked_index(position)
            .unwrap_or_else(|error| panic!("{error} in slab of {}", type_name::<T>()))
    }

    fn root_index(&self, list: ListId) -> usize {
        match self.entry(list.root()) {
            Ok(Entry {
                state: State::Root { .. },
                ..
            }) => list.root().index(),
            _ => panic!(
                "{list:?} is not a live list in slab of {}",
                type_name::<T>()
            ),
        }
    }

    fn key_at(&self, index: usize) -> Key {
        let entry = self
            .entries
            .get(index)
            .expect("linked indexes always refer to existing entries");

        Key::new(index, entry.generation)
    }

    fn links_at(&self, index: usize) -> Links {
        match self.entries.get(index).map(|entry| &entry.state) {
            Some(State::Root { links } | State::Element { links: Some(links), .. }) => *links,
            _ => panic!(
                "entry {index} is not a linked node in slab of {}",
                type_name::<T>()
            ),
        }
    }

    fn links_at_mut(&mut self, index: usize) -> &mut Links {
        match self.entries.get_mut(index).map(|entry| &mut entry.state) {
            Some(State::Root { links } | State::Element { links: Some(links), .. }) => links,
            _ => panic!(
                "entry {index} is not a linked node in slab of {}",
                type_name::<T>()
            ),
        }
    }

    fn set_element_links(&mut self, index: usize, new_links: Option<Links>) {
        match self.entries.get_mut(index).map(|entry| &mut entry.state) {
            Some(State::Element { links, .. }) => *links = new_links,
            _ => panic!(
                "entry {index} is not an element in slab of {}",
                type_name::<T>()
            ),
        }
    }

    /// Detaches the element at `index` if it is linked, returning the index of its former
    /// successor.
    fn unlink_index(&mut self, index: usize) -> Option<usize> {
        let links = match self.entries.get(index).map(|entry| &entry.state) {
            Some(State::Element { links, .. }) => (*links)?,
            _ => panic!(
                "entry {index} is not an element in slab of {}",
                type_name::<T>()
            ),
        };

        self.links_at_mut(links.prev).next = links.next;
        self.links_at_mut(links.next).prev = links.prev;
        self.set_element_links(index, None);

        Some(links.next)
    }

    fn value_at(&self, index: usize) -> (Key, &T) {
        match self.entries.get(index) {
            Some(Entry {
                generation,
                state: State::Element { value, .. },
            }) => (Key::new(index, *generation), value),
            _ => panic!(
                "entry {index} is not an element in slab of {}",
                type_name::<T>()
            ),
        }
    }

    #[cfg(test)]
    #[cfg_attr(test, mutants::skip)] // This is test logic, mutation is meaningless.
    pub(crate) fn integrity_check(&self) {
        let mut observed_elements: usize = 0;
        let mut observed_roots: usize = 0;

        for (index, entry) in self.entries.iter().enumerate() {
            let links = match &entry.state {
                State::Vacant { .. } => continue,
                State::Root { links } => {
                    observed_roots = observed_roots
                        .checked_add(1)
                        .expect("bounded by the number of entries");
                    *links
                }
                State::Element { links, .. } => {
                    observed_elements = observed_elements
                        .checked_add(1)
                        .expect("bounded by the number of entries");

                    let Some(links) = links else {
                        continue;
                    };

                    *links
                }
            };

            assert_eq!(
                self.links_at(links.next).prev,
                index,
                "successor of entry {index} does not point back at it"
            );
            assert_eq!(
                self.links_at(links.prev).next,
                index,
                "predecessor of entry {index} does not point back at it"
            );
        }

        assert_eq!(observed_elements, self.element_count);
        assert_eq!(observed_roots, self.list_count);

        let mut free = self.free_head;
        let mut observed_vacant: usize = 0;

        while let Some(index) = free {
            match self.entries.get(index).map(|entry| &entry.state) {
                Some(State::Vacant { next_free }) => free = *next_free,
                _ => panic!("freelist entry {index} is not vacant"),
            }

            observed_vacant = observed_vacant
                .checked_add(1)
                .expect("bounded by the number of entries");
        }

        assert_eq!(
            observed_vacant
                .checked_add(observed_elements)
                .and_then(|count| count.checked_add(observed_roots)),
            Some(self.entries.len())
        );
    }
}

impl<T> Default for LinkedSlab<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for LinkedSlab<T> {
    #[cfg_attr(test, mutants::skip)] // No API contract for debug output.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(type_name::<Self>())
            .field("element_count", &self.element_count)
            .field("list_count", &self.list_count)
            .field("entries", &self.entries.len())
            .finish_non_exhaustive()
    }
}

/// Iterator over the elements of one list of a [`LinkedSlab`], returned by
/// [`LinkedSlab::iter()`].
pub struct Iter<'a, T> {
    slab: &'a LinkedSlab<T>,
    front: usize,
    back: usize,
    root: usize,

    /// Set once the front and back cursors have met.
    finished: bool,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (Key, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished || self.front == self.root {
            return None;
        }

        let index = self.front;

        if index == self.back {
            self.finished = true;
        } else {
            self.front = self.slab.links_at(index).next;
        }

        Some(self.slab.value_at(index))
    }
}

impl<T> DoubleEndedIterator for Iter<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.finished || self.back == self.root {
            return None;
        }

        let index = self.back;

        if index == self.front {
            self.finished = true;
        } else {
            self.back = self.slab.links_at(index).prev;
        }

        Some(self.slab.value_at(index))
    }
}

impl<T> FusedIterator for Iter<'_, T> {}

impl<T> fmt::Debug for Iter<'_, T> {
    #[cfg_attr(test, mutants::skip)] // No API contract for debug output.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(type_name::<Self>())
            .field("front", &self.front)
            .field("back", &self.back)
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    #![allow(
        clippy::indexing_slicing,
        clippy::arithmetic_side_effects,
        reason = "we do not need to worry about these things when writing test code"
    )]

    use std::cell::Cell;
    use std::rc::Rc;

    use static_assertions::{assert_impl_all, assert_not_impl_any};

    use super::*;

    assert_impl_all!(LinkedSlab<u32>: Send, Sync);
    assert_not_impl_any!(LinkedSlab<Rc<u32>>: Send, Sync);

    fn values(slab: &LinkedSlab<u32>, list: ListId) -> Vec<u32> {
        slab.iter(list).map(|(_, value)| *value).collect()
    }

    #[test]
    fn smoke_test() {
        let mut slab = LinkedSlab::<u32>::new();
        let list = slab.create_list();

        assert!(slab.is_list_empty(list));
        assert_eq!(slab.begin(list), slab.end(list));

        let a = slab.insert(1);
        let b = slab.insert(2);
        let c = slab.insert(3);

        slab.push_back(list, a);
        slab.push_back(list, b);
        slab.push_front(list, c);

        assert_eq!(values(&slab, list), [3, 1, 2]);
        assert_eq!(slab.len(), 3);
        assert!(!slab.is_list_empty(list));

        slab.integrity_check();
    }

    #[test]
    fn empty_list_root_points_at_itself() {
        let mut slab = LinkedSlab::<u32>::new();
        let list = slab.create_list();

        let end = slab.end(list);

        assert!(slab.is_end(end));
        assert_eq!(slab.next(end), end);
        assert_eq!(slab.prev(end), end);
        assert_eq!(slab.front(list), None);
        assert_eq!(slab.back(list), None);
    }

    #[test]
    fn link_before_inserts_in_place() {
        let mut slab = LinkedSlab::<u32>::new();
        let list = slab.create_list();

        let a = slab.insert(1);
        let c = slab.insert(3);
        slab.push_back(list, a);
        slab.push_back(list, c);

        let b = slab.insert(2);
        let position = slab.link_before(Position::from(c), b);

        assert_eq!(position, Position::from(b));
        assert_eq!(values(&slab, list), [1, 2, 3]);

        slab.integrity_check();
    }

    #[test]
    fn erase_returns_successor() {
        let mut slab = LinkedSlab::<u32>::new();
        let list = slab.create_list();

        let a = slab.insert(1);
        let b = slab.insert(2);
        slab.push_back(list, a);
        slab.push_back(list, b);

        let next = slab.erase(Position::from(a));
        assert_eq!(next, Position::from(b));

        let next = slab.erase(Position::from(b));
        assert_eq!(next, slab.end(list));

        assert!(slab.is_list_empty(list));

        // Erasing only unlinks; the values remain.
        assert_eq!(slab.get(a), Some(&1));
        assert!(!slab.is_linked(a));

        slab.integrity_check();
    }

    #[test]
    fn unlink_detached_is_none() {
        let mut slab = LinkedSlab::<u32>::new();

        let a = slab.insert(1);

        assert_eq!(slab.unlink(a), None);
    }

    #[test]
    #[should_panic]
    fn erase_end_panics() {
        let mut slab = LinkedSlab::<u32>::new();
        let list = slab.create_list();

        let end = slab.end(list);
        _ = slab.erase(end);
    }

    #[test]
    fn positions_survive_removal_of_neighbors() {
        let mut slab = LinkedSlab::<u32>::new();
        let list = slab.create_list();

        let keys: Vec<_> = (0..5).map(|value| slab.insert(value)).collect();

        for key in &keys {
            slab.push_back(list, *key);
        }

        let middle = Position::from(keys[2]);

        slab.remove(keys[1]);
        slab.remove(keys[3]);

        assert_eq!(slab.prev(middle), Position::from(keys[0]));
        assert_eq!(slab.next(middle), Position::from(keys[4]));
        assert_eq!(values(&slab, list), [0, 2, 4]);

        slab.integrity_check();
    }

    #[test]
    fn stale_key_is_rejected_after_reuse() {
        let mut slab = LinkedSlab::<u32>::new();

        let old = slab.insert(1);
        assert_eq!(slab.remove(old), 1);

        let new = slab.insert(2);

        assert_eq!(old.index(), new.index());
        assert_ne!(old, new);
        assert_eq!(slab.get(old), None);
        assert!(matches!(
            slab.try_remove(old),
            Err(Error::StaleKey { key }) if key == old
        ));
        assert_eq!(slab.get(new), Some(&2));
    }

    #[test]
    #[should_panic]
    fn stale_position_panics() {
        let mut slab = LinkedSlab::<u32>::new();
        let list = slab.create_list();

        let a = slab.insert(1);
        slab.push_back(list, a);
        slab.remove(a);

        _ = slab.next(Position::from(a));
    }

    #[test]
    fn try_link_before_reports_misuse() {
        let mut slab = LinkedSlab::<u32>::new();
        let list = slab.create_list();

        let a = slab.insert(1);
        let b = slab.insert(2);
        slab.push_back(list, a);

        let end = slab.end(list);

        assert!(matches!(
            slab.try_link_before(end, a),
            Err(Error::AlreadyLinked { .. })
        ));
        assert!(matches!(
            slab.try_link_before(Position::from(b), a),
            Err(Error::NotLinked { .. })
        ));
        assert!(matches!(
            slab.try_link_before(end, end.key()),
            Err(Error::NotAnElement { .. })
        ));

        // Nothing changed.
        assert_eq!(values(&slab, list), [1]);
        slab.integrity_check();
    }

    #[test]
    fn remove_linked_element_unlinks_it() {
        let mut slab = LinkedSlab::<u32>::new();
        let list = slab.create_list();

        let a = slab.insert(1);
        let b = slab.insert(2);
        let c = slab.insert(3);
        slab.push_back(list, a);
        slab.push_back(list, b);
        slab.push_back(list, c);

        assert_eq!(slab.remove(b), 2);

        assert_eq!(values(&slab, list), [1, 3]);
        assert_eq!(slab.len(), 2);

        slab.integrity_check();
    }

    #[test]
    fn pop_front_and_back() {
        let mut slab = LinkedSlab::<u32>::new();
        let list = slab.create_list();

        let a = slab.insert(1);
        let b = slab.insert(2);
        let c = slab.insert(3);
        slab.push_back(list, a);
        slab.push_back(list, b);
        slab.push_back(list, c);

        assert_eq!(slab.pop_front(list), Some(a));
        assert_eq!(slab.pop_back(list), Some(c));
        assert_eq!(slab.pop_back(list), Some(b));
        assert_eq!(slab.pop_front(list), None);

        // Popped elements are detached, not removed.
        assert_eq!(slab.len(), 3);
        assert!(!slab.is_linked(b));
    }

    #[test]
    fn splice_moves_range_between_lists() {
        let mut slab = LinkedSlab::<u32>::new();
        let source = slab.create_list();
        let target = slab.create_list();

        let keys: Vec<_> = (0..4).map(|value| slab.insert(value)).collect();
        for key in &keys {
            slab.push_back(source, *key);
        }

        let x = slab.insert(100);
        let y = slab.insert(200);
        slab.push_back(target, x);
        slab.push_back(target, y);

        // Move [1, 3) before y.
        slab.splice(
            Position::from(y),
            Position::from(keys[1]),
            Position::from(keys[3]),
        );

        assert_eq!(values(&slab, source), [0, 3]);
        assert_eq!(values(&slab, target), [100, 1, 2, 200]);

        slab.integrity_check();
    }

    #[test]
    fn splice_whole_list_to_front() {
        let mut slab = LinkedSlab::<u32>::new();
        let source = slab.create_list();
        let target = slab.create_list();

        for value in 0..3 {
            let key = slab.insert(value);
            slab.push_back(source, key);
        }

        let existing = slab.insert(9);
        slab.push_back(target, existing);

        let at = slab.begin(target);
        let first = slab.begin(source);
        let last = slab.end(source);
        slab.splice(at, first, last);

        assert!(slab.is_list_empty(source));
        assert_eq!(values(&slab, target), [0, 1, 2, 9]);

        slab.integrity_check();
    }

    #[test]
    fn splice_empty_range_is_noop() {
        let mut slab = LinkedSlab::<u32>::new();
        let source = slab.create_list();
        let target = slab.create_list();

        let a = slab.insert(1);
        slab.push_back(target, a);

        let at = slab.begin(target);
        let first = slab.begin(source);
        let last = slab.end(source);
        slab.splice(at, first, last);

        assert_eq!(values(&slab, target), [1]);
        assert!(slab.is_list_empty(source));

        slab.integrity_check();
    }

    #[test]
    fn splice_into_own_place_is_noop() {
        let mut slab = LinkedSlab::<u32>::new();
        let list = slab.create_list();

        let keys: Vec<_> = (0..3).map(|value| slab.insert(value)).collect();
        for key in &keys {
            slab.push_back(list, *key);
        }

        // Moving [0, 2) right before 2, where it already is.
        slab.splice(
            Position::from(keys[2]),
            Position::from(keys[0]),
            Position::from(keys[2]),
        );

        assert_eq!(values(&slab, list), [0, 1, 2]);

        slab.integrity_check();
    }

    #[test]
    fn append_moves_everything() {
        let mut slab = LinkedSlab::<u32>::new();
        let first = slab.create_list();
        let second = slab.create_list();

        let a = slab.insert(1);
        let b = slab.insert(2);
        slab.push_back(first, a);
        slab.push_back(second, b);

        slab.append(first, second);

        assert_eq!(values(&slab, first), [1, 2]);
        assert!(slab.is_list_empty(second));

        slab.integrity_check();
    }

    #[test]
    fn clear_leaves_elements_detached_and_relinkable() {
        let mut slab = LinkedSlab::<u32>::new();
        let list = slab.create_list();
        let other = slab.create_list();

        let keys: Vec<_> = (0..3).map(|value| slab.insert(value)).collect();
        for key in &keys {
            slab.push_back(list, *key);
        }

        slab.clear(list);

        assert!(slab.is_list_empty(list));
        assert_eq!(slab.len(), 3);

        for key in &keys {
            assert!(!slab.is_linked(*key));
            slab.push_front(other, *key);
        }

        assert_eq!(values(&slab, other), [2, 1, 0]);

        slab.integrity_check();
    }

    #[test]
    fn remove_list_keeps_elements() {
        let mut slab = LinkedSlab::<u32>::new();
        let list = slab.create_list();

        let a = slab.insert(1);
        slab.push_back(list, a);

        slab.remove_list(list);

        assert_eq!(slab.list_count(), 0);
        assert_eq!(slab.get(a), Some(&1));
        assert!(!slab.is_linked(a));

        slab.integrity_check();
    }

    #[test]
    #[should_panic]
    fn removed_list_panics_on_use() {
        let mut slab = LinkedSlab::<u32>::new();
        let list = slab.create_list();

        slab.remove_list(list);

        _ = slab.is_list_empty(list);
    }

    #[test]
    fn iterates_both_ways() {
        let mut slab = LinkedSlab::<u32>::new();
        let list = slab.create_list();

        for value in 0..5 {
            let key = slab.insert(value);
            slab.push_back(list, key);
        }

        let reversed: Vec<_> = slab.iter(list).rev().map(|(_, value)| *value).collect();
        assert_eq!(reversed, [4, 3, 2, 1, 0]);

        let mut iter = slab.iter(list);
        assert_eq!(iter.next().map(|(_, value)| *value), Some(0));
        assert_eq!(iter.next_back().map(|(_, value)| *value), Some(4));
        assert_eq!(iter.next().map(|(_, value)| *value), Some(1));
        assert_eq!(iter.next_back().map(|(_, value)| *value), Some(3));
        assert_eq!(iter.next().map(|(_, value)| *value), Some(2));
        assert!(iter.next().is_none());
        assert!(iter.next_back().is_none());
    }

    #[test]
    fn cursor_walks_both_ways() {
        let mut slab = LinkedSlab::<u32>::new();
        let list = slab.create_list();

        let a = slab.insert(1);
        let b = slab.insert(2);
        slab.push_back(list, a);
        slab.push_back(list, b);

        let mut position = slab.begin(list);
        assert_eq!(slab.get(position.key()), Some(&1));

        position = slab.next(position);
        assert_eq!(slab.get(position.key()), Some(&2));

        position = slab.next(position);
        assert!(slab.is_end(position));
        assert_eq!(slab.get(position.key()), None);

        position = slab.prev(position);
        assert_eq!(position, Position::from(b));
    }

    #[test]
    fn for_each_mut_modifies_in_order() {
        let mut slab = LinkedSlab::<u32>::new();
        let list = slab.create_list();

        for value in 1..=3 {
            let key = slab.insert(value);
            slab.push_back(list, key);
        }

        let mut visited = Vec::new();
        slab.for_each_mut(list, |_, value| {
            visited.push(*value);
            *value *= 10;
        });

        assert_eq!(visited, [1, 2, 3]);
        assert_eq!(values(&slab, list), [10, 20, 30]);
    }

    #[test]
    fn elements_are_dropped_with_slab() {
        struct Droppable {
            dropped: Rc<Cell<usize>>,
        }

        impl Drop for Droppable {
            fn drop(&mut self) {
                self.dropped.set(self.dropped.get() + 1);
            }
        }

        let dropped = Rc::new(Cell::new(0));

        {
            let mut slab = LinkedSlab::<Droppable>::new();
            let list = slab.create_list();

            let a = slab.insert(Droppable {
                dropped: Rc::clone(&dropped),
            });
            slab.push_back(list, a);

            _ = slab.insert(Droppable {
                dropped: Rc::clone(&dropped),
            });
        }

        assert_eq!(dropped.get(), 2);
    }

    #[test]
    fn vacated_entries_are_reused() {
        let mut slab = LinkedSlab::<u32>::with_capacity(4);

        let a = slab.insert(1);
        let b = slab.insert(2);
        slab.remove(a);
        slab.remove(b);

        let c = slab.insert(3);
        let d = slab.insert(4);

        // Most recently vacated first.
        assert_eq!(c.index(), b.index());
        assert_eq!(d.index(), a.index());

        slab.integrity_check();
    }
}
