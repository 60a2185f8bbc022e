use std::any::type_name;
use std::borrow::Cow;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use scopeguard::ScopeGuard;
use tracing::{debug, trace};

use crate::registry::Registry;
use crate::{Connection, SignalBuilder};

/// A multicast event source that calls every connected slot when invoked.
///
/// Slots are connected with [`connect()`][Self::connect], which returns a [`Connection`] that
/// keeps the slot subscribed for as long as it is alive. [`invoke()`][Self::invoke] calls every
/// connected slot once, most recently connected first, passing each one a clone of the
/// arguments. Use a tuple for multiple arguments and `()` for none.
///
/// # Reentrancy
///
/// Slots may do anything to the signal they are called from: disconnect themselves or any other
/// connection (visited or not), drop or move their connection handle, connect new slots or invoke
/// the signal again. An invocation always calls exactly the slots that were connected when it
/// started and are still connected when their turn comes, each exactly once:
///
/// * A slot disconnected before its turn is skipped.
/// * A slot connected during an invocation is not called by that invocation.
/// * A nested invocation starts from the connections present at that moment; once it returns,
///   the outer invocation continues where it left off.
///
/// # Thread safety
///
/// This type is single-threaded. It is neither [`Send`] nor [`Sync`].
///
/// # Example
///
/// ```rust
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// use signals::Signal;
///
/// let signal = Signal::<u32>::new();
/// let total = Rc::new(Cell::new(0));
///
/// let connection = signal.connect({
///     let total = Rc::clone(&total);
///     move |value| total.set(total.get() + value)
/// });
///
/// signal.invoke(5);
/// signal.invoke(6);
/// assert_eq!(total.get(), 11);
///
/// // Dropping the connection unsubscribes the slot.
/// drop(connection);
/// signal.invoke(100);
/// assert_eq!(total.get(), 11);
/// ```
pub struct Signal<A> {
    registry: Rc<RefCell<Registry<A>>>,

    /// Same as the registry's name, kept here so it can be handed out without a borrow.
    name: Cow<'static, str>,
}

impl<A> Signal<A> {
    /// Creates a signal with no connections and the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Starts building a signal with a custom configuration.
    pub fn builder() -> SignalBuilder<A> {
        SignalBuilder::new()
    }

    pub(crate) fn new_inner(name: Cow<'static, str>, registry: Registry<A>) -> Self {
        Self {
            registry: Rc::new(RefCell::new(registry)),
            name,
        }
    }

    /// Subscribes a slot to the signal.
    ///
    /// The slot stays subscribed until the returned [`Connection`] is disconnected or dropped.
    /// It is called before every slot that was connected earlier. If called from a slot during
    /// an invocation, the new slot is first called by the next invocation.
    ///
    /// # Example
    ///
    /// ```rust
    /// use signals::Signal;
    ///
    /// let signal = Signal::<&str>::new();
    /// let _connection = signal.connect(|message| println!("received: {message}"));
    ///
    /// signal.invoke("hello");
    /// ```
    #[must_use = "dropping the connection immediately disconnects the slot"]
    pub fn connect<F>(&self, slot: F) -> Connection<A>
    where
        F: Fn(A) + 'static,
    {
        let key = self.registry.borrow_mut().connect(Rc::new(slot));

        Connection::new(Rc::downgrade(&self.registry), key)
    }

    /// The number of connected slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.registry.borrow().len()
    }

    /// Whether no slots are connected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registry.borrow().is_empty()
    }

    /// The name of the signal, as used in log records.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<A: Clone> Signal<A> {
    /// Calls every connected slot once with a clone of `args`, most recently connected first.
    ///
    /// See the [type-level documentation][Signal#reentrancy] for what slots may do to the signal
    /// while it is being invoked.
    ///
    /// If a slot panics, the panic propagates to the caller and the remaining slots are not
    /// called. The signal itself remains fully usable.
    pub fn invoke(&self, args: A) {
        let mut cursor = {
            let registry = self.registry.borrow();

            if registry.is_empty() {
                return;
            }

            trace!(
                signal = registry.name(),
                connections = registry.len(),
                "dispatch started"
            );

            registry.begin()
        };

        let mut called: usize = 0;

        loop {
            let Some((walker, slot)) = self.registry.borrow_mut().enter(cursor) else {
                break;
            };

            // Disarmed once the slot returns; only runs when unwinding out of the slot.
            let walker = scopeguard::guard(walker, |walker| {
                if let Ok(mut registry) = self.registry.try_borrow_mut() {
                    registry.abandon(walker);
                }
            });

            slot(args.clone());

            let walker = ScopeGuard::into_inner(walker);

            // The slot may have been disconnected while it ran, making this the last reference.
            // Dropping it may drop connections to this signal, so no borrow may be active here
            // and the walker must still be registered to be redirected by those disconnects.
            drop(slot);

            cursor = self.registry.borrow_mut().leave(cursor, walker);
            called = called.saturating_add(1);
        }

        trace!(
            signal = %self.name,
            called,
            "dispatch finished"
        );
    }
}

impl<A> Default for Signal<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> Drop for Signal<A> {
    fn drop(&mut self) {
        // Outstanding connections only hold weak references, so they turn inert once the
        // registry is gone.
        if let Ok(registry) = self.registry.try_borrow() {
            debug!(
                signal = registry.name(),
                connections = registry.len(),
                "signal dropped"
            );
        }
    }
}

impl<A> fmt::Debug for Signal<A> {
    #[cfg_attr(test, mutants::skip)] // No API contract for debug output.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(type_name::<Self>())
            .field("name", &self.name)
            .field("registry", &self.registry)
            .finish()
    }
}
