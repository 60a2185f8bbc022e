use std::any::type_name;
use std::borrow::Cow;
use std::fmt;
use std::rc::Rc;

use linked_slab::{Key, LinkedSlab, ListId, Position};
use tracing::{debug, trace};

/// The callable of one subscription.
///
/// Reference-counted so that dispatch can hold on to the slot while it runs without keeping the
/// registry borrowed, which is what allows slots to mutate the signal they are called from.
pub(crate) type Slot<A> = Rc<dyn Fn(A)>;

/// Everything a signal owns: the subscribers, the order they are called in and the bookkeeping of
/// every dispatch currently in progress.
///
/// Connections refer to the registry weakly and address their subscriber by key, so nothing in
/// here ever needs to be re-pointed when a handle moves.
pub(crate) struct Registry<A> {
    name: Cow<'static, str>,

    subscribers: LinkedSlab<Subscriber<A>>,

    /// The subscribers in dispatch order, most recently connected first.
    order: ListId,

    walkers: LinkedSlab<Walker>,
}

struct Subscriber<A> {
    slot: Slot<A>,

    /// Walkers of the dispatch cursors that are currently calling this subscriber's slot.
    walkers: ListId,
}

/// Bookkeeping for one in-flight dispatch cursor.
///
/// While the cursor calls a slot, its walker is a member of that subscriber's walker list. If the
/// subscriber is disconnected meanwhile, the walker is marked deleted, told where to resume and
/// handed over to the subscriber that followed, so that it keeps being redirected if that one is
/// disconnected too.
#[derive(Debug)]
struct Walker {
    deleted: bool,
    held: Position,
}

impl<A> Registry<A> {
    pub(crate) fn new(
        name: Cow<'static, str>,
        connection_capacity: usize,
        walker_capacity: usize,
    ) -> Self {
        // One extra entry for the root of the dispatch order list.
        let mut subscribers = LinkedSlab::with_capacity(connection_capacity.saturating_add(1));
        let order = subscribers.create_list();

        Self {
            name,
            subscribers,
            order,
            // Every subscriber also keeps the root of its walker list in the walker slab.
            walkers: LinkedSlab::with_capacity(
                walker_capacity.saturating_add(connection_capacity),
            ),
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    #[cfg(test)]
    fn walker_slab_capacity(&self) -> usize {
        self.walkers.capacity()
    }

    pub(crate) fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.subscribers.is_list_empty(self.order)
    }

    pub(crate) fn contains(&self, key: Key) -> bool {
        self.subscribers.contains(key)
    }

    pub(crate) fn begin(&self) -> Position {
        self.subscribers.begin(self.order)
    }

    /// Registers a slot at the front of the dispatch order.
    ///
    /// A dispatch cursor only ever moves towards the back, so a subscriber connected while a
    /// dispatch is in progress is never reached by that dispatch.
    pub(crate) fn connect(&mut self, slot: Slot<A>) -> Key {
        let walkers = self.walkers.create_list();
        let key = self.subscribers.insert(Subscriber { slot, walkers });
        self.subscribers.push_front(self.order, key);

        debug!(
            signal = %self.name,
            connection = ?key,
            connections = self.subscribers.len(),
            "connected"
        );

        key
    }

    /// Removes a subscriber, redirecting every dispatch cursor that is currently calling it.
    ///
    /// Returns the slot of the removed subscriber, or `None` if the key was already disconnected.
    /// The caller must drop the slot only after releasing its borrow of the registry, as dropping
    /// the slot may drop connections to this same signal.
    pub(crate) fn disconnect(&mut self, key: Key) -> Option<Slot<A>> {
        if !self.subscribers.contains(key) {
            return None;
        }

        let successor = self
            .subscribers
            .unlink(key)
            .expect("live subscribers are always linked into the dispatch order");

        let walkers = self
            .subscribers
            .get(key)
            .expect("presence was checked above")
            .walkers;

        let mut redirected: usize = 0;

        self.walkers.for_each_mut(walkers, |_, walker| {
            walker.deleted = true;
            walker.held = successor;
            redirected = redirected.saturating_add(1);
        });

        if self.subscribers.is_end(successor) {
            // Nobody left to visit; the cursors will stop when their slots return.
            self.walkers.clear(walkers);
        } else {
            let target = self
                .subscribers
                .get(successor.key())
                .expect("a successor that is not the end of the list is a live subscriber")
                .walkers;

            let at = self.walkers.begin(target);
            let first = self.walkers.begin(walkers);
            let last = self.walkers.end(walkers);
            self.walkers.splice(at, first, last);
        }

        self.walkers.remove_list(walkers);

        let subscriber = self.subscribers.remove(key);

        debug!(
            signal = %self.name,
            connection = ?key,
            connections = self.subscribers.len(),
            "disconnected"
        );

        if redirected > 0 {
            trace!(
                signal = %self.name,
                connection = ?key,
                walkers = redirected,
                resume_at = ?successor.key(),
                "redirected dispatch cursors of disconnected subscriber"
            );
        }

        Some(subscriber.slot)
    }

    /// Starts calling the subscriber at `cursor`, registering a walker on it.
    ///
    /// Returns `None` if the cursor is at the end of the dispatch order.
    pub(crate) fn enter(&mut self, cursor: Position) -> Option<(Key, Slot<A>)> {
        if self.subscribers.is_end(cursor) {
            return None;
        }

        let subscriber = self
            .subscribers
            .get(cursor.key())
            .expect("dispatch cursors only ever rest on live subscribers or on the end");

        let walkers = subscriber.walkers;
        let slot = Rc::clone(&subscriber.slot);

        let walker = self.walkers.insert(Walker {
            deleted: false,
            held: cursor,
        });
        self.walkers.push_front(walkers, walker);

        Some((walker, slot))
    }

    /// Finishes calling the subscriber at `cursor` and returns where the cursor goes next.
    pub(crate) fn leave(&mut self, cursor: Position, walker: Key) -> Position {
        let walker = self.walkers.remove(walker);

        if walker.deleted {
            walker.held
        } else {
            self.subscribers.next(cursor)
        }
    }

    /// Drops the walker of a dispatch that is unwinding out of a slot.
    pub(crate) fn abandon(&mut self, walker: Key) {
        if self.walkers.try_remove(walker).is_ok() {
            debug!(signal = %self.name, "dispatch abandoned by a panicking slot");
        }
    }

    #[cfg(test)]
    fn walker_count(&self) -> usize {
        self.walkers.len()
    }
}

impl<A> fmt::Debug for Registry<A> {
    #[cfg_attr(test, mutants::skip)] // No API contract for debug output.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(type_name::<Self>())
            .field("name", &self.name)
            .field("connections", &self.subscribers.len())
            .field("active_walkers", &self.walkers.len())
            .finish_non_exhaustive()
    }
}
