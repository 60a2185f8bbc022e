use std::any::type_name;
use std::borrow::Cow;
use std::fmt;
use std::marker::PhantomData;

use crate::Signal;
use crate::registry::Registry;

const DEFAULT_NAME: &str = "unnamed";

/// Builder for creating an instance of [`Signal`].
///
/// You only need to use this builder if you want to customize the signal configuration.
/// The default configuration used by [`Signal::new()`][1] is sufficient for most use cases.
///
/// # Examples
///
/// ```
/// use signals::Signal;
///
/// let window_resized = Signal::<(u32, u32)>::builder()
///     .name("window_resized")
///     .connection_capacity(8)
///     .build();
/// ```
///
/// [1]: Signal::new
#[must_use]
pub struct SignalBuilder<A> {
    name: Cow<'static, str>,
    connection_capacity: usize,
    walker_capacity: usize,

    _args: PhantomData<fn(A)>,
}

impl<A> fmt::Debug for SignalBuilder<A> {
    #[cfg_attr(test, mutants::skip)] // No API contract for debug output.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(type_name::<Self>())
            .field("name", &self.name)
            .field("connection_capacity", &self.connection_capacity)
            .field("walker_capacity", &self.walker_capacity)
            .finish()
    }
}

impl<A> SignalBuilder<A> {
    pub(crate) fn new() -> Self {
        Self {
            name: Cow::Borrowed(DEFAULT_NAME),
            connection_capacity: 0,
            walker_capacity: 0,
            _args: PhantomData,
        }
    }

    /// Sets the name that identifies the signal in log records and debug output.
    pub fn name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = name.into();
        self
    }

    /// Reserves room for this many connections up front. The signal still grows on demand.
    pub fn connection_capacity(mut self, capacity: usize) -> Self {
        self.connection_capacity = capacity;
        self
    }

    /// Reserves room for this many simultaneously active dispatches (including nested ones) up
    /// front, in addition to the bookkeeping reserved for each connection. The signal still
    /// grows on demand.
    pub fn walker_capacity(mut self, capacity: usize) -> Self {
        self.walker_capacity = capacity;
        self
    }

    /// Builds the signal with the specified configuration.
    #[must_use]
    pub fn build(self) -> Signal<A> {
        let registry = Registry::new(
            self.name.clone(),
            self.connection_capacity,
            self.walker_capacity,
        );

        Signal::new_inner(self.name, registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_builder_creates_empty_signal() {
        let signal = Signal::<u32>::builder().build();

        assert!(signal.is_empty());
        assert_eq!(signal.name(), DEFAULT_NAME);
    }

    #[test]
    fn name_is_applied() {
        let signal = Signal::<u32>::builder()
            .name(format!("signal-{}", 7))
            .connection_capacity(4)
            .walker_capacity(2)
            .build();

        assert_eq!(signal.name(), "signal-7");
        assert!(signal.is_empty());
    }
}
