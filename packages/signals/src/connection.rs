use std::any::type_name;
use std::cell::RefCell;
use std::fmt;
use std::rc::Weak;

use linked_slab::Key;

use crate::registry::Registry;

/// A subscription of one slot to one [`Signal`][crate::Signal].
///
/// The slot stays subscribed until the connection is disconnected, either explicitly via
/// [`disconnect()`][Self::disconnect] or by dropping the connection. Disconnecting is safe at any
/// time, including from within a slot while the signal is being invoked - the slot of a
/// connection disconnected before its turn in an ongoing invocation is not called.
///
/// A connection can be moved freely without affecting the subscription. It refers to its signal
/// weakly: if the signal is dropped first, the connection becomes inert.
///
/// A default-constructed connection is not connected to anything.
///
/// # Example
///
/// ```rust
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// use signals::Signal;
///
/// let signal = Signal::<()>::new();
/// let calls = Rc::new(Cell::new(0));
///
/// let mut connection = signal.connect({
///     let calls = Rc::clone(&calls);
///     move |()| calls.set(calls.get() + 1)
/// });
///
/// signal.invoke(());
/// connection.disconnect();
/// signal.invoke(());
///
/// assert_eq!(calls.get(), 1);
/// assert!(!connection.is_connected());
/// ```
pub struct Connection<A> {
    registry: Weak<RefCell<Registry<A>>>,

    /// `None` once disconnected (or if never connected).
    key: Option<Key>,
}

impl<A> Connection<A> {
    pub(crate) fn new(registry: Weak<RefCell<Registry<A>>>, key: Key) -> Self {
        Self {
            registry,
            key: Some(key),
        }
    }

    /// Unsubscribes the slot from the signal. Does nothing if already disconnected.
    ///
    /// Any invocation of the signal that is currently calling this slot finishes the call and
    /// then continues with the connection that followed this one.
    pub fn disconnect(&mut self) {
        let Some(key) = self.key.take() else {
            return;
        };

        let Some(registry) = self.registry.upgrade() else {
            return;
        };

        let slot = registry.borrow_mut().disconnect(key);

        // The slot may own connections to this same signal, so it is dropped only after the
        // registry borrow above has ended.
        drop(slot);
    }

    /// Whether the slot is still subscribed to a live signal.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        let Some(key) = self.key else {
            return false;
        };

        self.registry
            .upgrade()
            .is_some_and(|registry| registry.borrow().contains(key))
    }
}

impl<A> Default for Connection<A> {
    fn default() -> Self {
        Self {
            registry: Weak::new(),
            key: None,
        }
    }
}

impl<A> Drop for Connection<A> {
    fn drop(&mut self) {
        self.disconnect();
    }
}

impl<A> fmt::Debug for Connection<A> {
    #[cfg_attr(test, mutants::skip)] // No API contract for debug output.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(type_name::<Self>())
            .field("key", &self.key)
            .field("connected", &self.is_connected())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use static_assertions::assert_not_impl_any;
    use testing::CallLog;

    use super::*;
    use crate::Signal;

    assert_not_impl_any!(Connection<u32>: Send, Sync, Clone);

    #[test]
    fn default_is_not_connected() {
        let mut connection = Connection::<u32>::default();

        assert!(!connection.is_connected());

        // Harmless.
        connection.disconnect();
    }

    #[test]
    fn disconnect_is_idempotent() {
        let signal = Signal::<u32>::new();
        let log = CallLog::new();

        let mut a = signal.connect(log.recorder("a"));
        let _b = signal.connect(log.recorder("b"));

        assert!(a.is_connected());

        a.disconnect();
        a.disconnect();

        assert!(!a.is_connected());
        assert_eq!(signal.len(), 1);

        signal.invoke(1);
        assert_eq!(log.take(), [("b", 1)]);
    }

    #[test]
    fn connect_then_disconnect_is_never_called() {
        let signal = Signal::<u32>::new();
        let log = CallLog::new();

        let mut a = signal.connect(log.recorder("a"));
        a.disconnect();

        signal.invoke(1);
        signal.invoke(2);

        assert!(log.is_empty());
    }

    #[test]
    fn drop_disconnects() {
        let signal = Signal::<u32>::new();
        let log = CallLog::new();

        {
            let _a = signal.connect(log.recorder("a"));
            signal.invoke(1);
        }

        signal.invoke(2);

        assert_eq!(log.take(), [("a", 1)]);
        assert!(signal.is_empty());
    }

    #[test]
    fn move_keeps_subscription_and_order() {
        let signal = Signal::<u32>::new();
        let log = CallLog::new();

        let a = signal.connect(log.recorder("a"));
        let b = signal.connect(log.recorder("b"));
        let c = signal.connect(log.recorder("c"));

        // Move the handles around; the dispatch order is unaffected.
        let mut handles = vec![c, a];
        let b = Box::new(b);
        handles.reverse();

        signal.invoke(1);

        assert_eq!(log.take(), [("c", 1), ("b", 1), ("a", 1)]);
        assert!(handles.iter().all(Connection::is_connected));
        assert!(b.is_connected());
    }

    #[test]
    fn assignment_disconnects_the_previous_subscription() {
        let signal = Signal::<u32>::new();
        let log = CallLog::new();

        let mut slot = signal.connect(log.recorder("a"));
        assert!(slot.is_connected());

        slot = signal.connect(log.recorder("b"));

        signal.invoke(1);

        assert_eq!(log.take(), [("b", 1)]);
        assert!(slot.is_connected());
        assert_eq!(signal.len(), 1);
    }

    #[test]
    fn connection_outliving_signal_is_inert() {
        let signal = Signal::<u32>::new();

        let mut connection = signal.connect(|_| {});
        drop(signal);

        assert!(!connection.is_connected());
        connection.disconnect();
    }
}
