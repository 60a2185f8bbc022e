//! Slots that modify the signal they are called from:
//!
//! * A one-shot slot that disconnects itself.
//! * A slot that connects another slot, which is first called by the next invocation.
//! * A slot that invokes the signal again.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use signals::{Connection, Signal};

fn main() {
    let signal = Rc::new(Signal::<u32>::new());

    let _logger = signal.connect(|value| println!("logger saw {value}"));

    // One-shot: disconnects itself on its first call.
    let one_shot = Rc::new(RefCell::new(Connection::default()));
    *one_shot.borrow_mut() = signal.connect({
        let one_shot = Rc::clone(&one_shot);
        move |value| {
            println!("one-shot saw {value} and is leaving");
            one_shot.borrow_mut().disconnect();
        }
    });

    // Connects a late subscriber on its first call.
    let late = Rc::new(RefCell::new(Vec::new()));
    let _recruiter = signal.connect({
        let signal = Rc::downgrade(&signal);
        let late = Rc::clone(&late);
        move |value| {
            let Some(signal) = signal.upgrade() else {
                return;
            };

            if late.borrow().is_empty() {
                println!("recruiter saw {value} and connects a late subscriber");
                late.borrow_mut()
                    .push(signal.connect(|value| println!("late subscriber saw {value}")));
            }
        }
    });

    // Invokes the signal once more from within, with a different value.
    let echoed = Rc::new(Cell::new(false));
    let _echo = signal.connect({
        let signal = Rc::downgrade(&signal);
        move |value| {
            if echoed.replace(true) {
                return;
            }

            println!("echo saw {value} and invokes again");
            if let Some(signal) = signal.upgrade() {
                signal.invoke(value * 10);
            }
        }
    });

    println!("--- first invocation ---");
    signal.invoke(1);

    println!("--- second invocation ---");
    signal.invoke(2);
}
