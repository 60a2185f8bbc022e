#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Single-threaded multicast signals whose slots may freely modify the signal they are called
//! from.
//!
//! A [`Signal<A>`] holds any number of subscribed slots (callables taking `A`). Subscribing with
//! [`Signal::connect()`] returns a [`Connection`] handle that keeps the slot subscribed until it
//! is disconnected or dropped. [`Signal::invoke()`] calls every subscribed slot once, most
//! recently connected first.
//!
//! The point of this crate is reentrancy. While being called, a slot may:
//!
//! * disconnect itself or any other connection of the signal, whether already called, not yet
//!   called or currently running;
//! * drop or move its own connection handle;
//! * connect new slots;
//! * invoke the same signal again, to any depth.
//!
//! Every invocation still calls each slot that was connected when it started, and is still
//! connected when its turn comes, exactly once. Slots connected during an invocation are first
//! called by the next one.
//!
//! This is part of the [Folo project](https://github.com/folo-rs/folo) that provides mechanisms
//! for high-performance hardware-aware programming in Rust.
//!
//! # Example
//!
//! ```rust
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use signals::Signal;
//!
//! let signal = Signal::<u32>::new();
//! let received = Rc::new(RefCell::new(Vec::new()));
//!
//! let _first = signal.connect({
//!     let received = Rc::clone(&received);
//!     move |value| received.borrow_mut().push(("first", value))
//! });
//!
//! let _second = signal.connect({
//!     let received = Rc::clone(&received);
//!     move |value| received.borrow_mut().push(("second", value))
//! });
//!
//! signal.invoke(42);
//!
//! assert_eq!(*received.borrow(), [("second", 42), ("first", 42)]);
//! ```
//!
//! # Disconnecting from a slot
//!
//! ```rust
//! use std::cell::{Cell, RefCell};
//! use std::rc::Rc;
//!
//! use signals::{Connection, Signal};
//!
//! let signal = Signal::<()>::new();
//! let calls = Rc::new(Cell::new(0));
//!
//! // A slot that unsubscribes itself after its first call.
//! let handle = Rc::new(RefCell::new(Connection::default()));
//!
//! *handle.borrow_mut() = signal.connect({
//!     let calls = Rc::clone(&calls);
//!     let handle = Rc::clone(&handle);
//!     move |()| {
//!         calls.set(calls.get() + 1);
//!         handle.borrow_mut().disconnect();
//!     }
//! });
//!
//! signal.invoke(());
//! signal.invoke(());
//!
//! assert_eq!(calls.get(), 1);
//! ```
//!
//! # Logging
//!
//! Connects, disconnects and dispatches are reported via [`tracing`](https://docs.rs/tracing)
//! at `debug` and `trace` level, labeled with the signal name set via [`SignalBuilder::name()`].

mod builder;
mod connection;
mod registry;
mod signal;

pub use builder::*;
pub use connection::*;
pub use signal::*;
