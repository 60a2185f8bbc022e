//! Basic usage of the `signals` crate:
//!
//! * Connecting slots to a signal.
//! * Invoking the signal with tuple arguments.
//! * Disconnecting explicitly and by dropping the connection.

use signals::Signal;

fn main() {
    let temperature_changed = Signal::<(&'static str, f32)>::builder()
        .name("temperature_changed")
        .build();

    let mut display = temperature_changed.connect(|(room, celsius)| {
        println!("[display] {room}: {celsius:.1} °C");
    });

    let alarm = temperature_changed.connect(|(room, celsius)| {
        if celsius > 30.0 {
            println!("[alarm] {room} is overheating!");
        }
    });

    println!(
        "Signal '{}' has {} connections",
        temperature_changed.name(),
        temperature_changed.len()
    );

    // The alarm was connected last, so it is called first.
    temperature_changed.invoke(("kitchen", 21.5));
    temperature_changed.invoke(("server room", 34.0));

    display.disconnect();
    println!("Display disconnected: {}", !display.is_connected());
    temperature_changed.invoke(("kitchen", 22.0));

    drop(alarm);
    println!(
        "After dropping the alarm connection, {} connections remain",
        temperature_changed.len()
    );
    temperature_changed.invoke(("kitchen", 99.0));
}
