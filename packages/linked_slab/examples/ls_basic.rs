//! Basic usage of the `linked_slab` crate:
//!
//! * Creating lists in a slab.
//! * Inserting and linking elements.
//! * Walking a list with positions.
//! * Moving elements between lists.

use linked_slab::LinkedSlab;

fn main() {
    let mut slab = LinkedSlab::<String>::new();

    let waiting = slab.create_list();
    let served = slab.create_list();

    // Inserting gives you a key; the element is not a member of any list until you link it.
    for name in ["Alice", "Bob", "Charlie"] {
        let key = slab.insert(name.to_string());
        slab.push_back(waiting, key);
    }

    println!(
        "Slab contains {} elements in {} lists",
        slab.len(),
        slab.list_count()
    );

    // Positions are cursors that survive changes elsewhere in the list.
    let mut position = slab.begin(waiting);
    while !slab.is_end(position) {
        println!("Waiting: {}", slab.get(position.key()).unwrap());
        position = slab.next(position);
    }

    // Move the first element to the other list. No values move in memory.
    let first = slab.begin(waiting);
    let second = slab.next(first);
    let at = slab.end(served);
    slab.splice(at, first, second);

    for (_, name) in slab.iter(served) {
        println!("Served: {name}");
    }

    // Erasing returns the position that followed the erased element.
    let first = slab.begin(waiting);
    let after = slab.erase(first);
    println!(
        "Erased {}, next up is {}",
        slab.get(first.key()).unwrap(),
        slab.get(after.key()).unwrap()
    );

    // Removing a list leaves its elements in the slab, detached.
    slab.remove_list(waiting);
    println!(
        "After removing a list the slab still contains {} elements",
        slab.len()
    );
}
