//! Simple example demonstrating interval-store functionality
//!
//! This example shows range assignment, point lookups and how the store keeps
//! only the boundaries where the value changes.

use interval_store::{IntervalStore, SharedIntervalStore};

fn main() {
    // Every key starts out as 'A'
    let mut store = IntervalStore::new('A');

    println!("=== Basic Operations ===");

    store.assign(1, 10, 'B');
    store.assign(3, 7, 'C');

    for key in [0, 2, 5, 8, 10] {
        println!("  lookup({}) = {}", key, store.lookup(&key));
    }

    println!("\n=== Boundaries ===");
    for (key, value) in store.segments() {
        println!("  {} -> {}", key, value);
    }
    println!("Size: {}, canonical: {}", store.size(), store.is_canonical());

    println!("\n=== Merging ===");

    // Same value over the middle run folds the three runs into one
    store.assign(3, 7, 'B');
    println!("After assign(3, 7, 'B'): size {}", store.size());

    // Restoring the default empties the map
    store.assign(0, 20, 'A');
    println!("After assign(0, 20, 'A'): size {}", store.size());

    println!("\n=== Shared Store ===");
    let shared = SharedIntervalStore::new(0u32);
    let handles: Vec<_> = (0..4u32)
        .map(|worker| {
            let shared = shared.clone();
            std::thread::spawn(move || {
                let begin = worker as i64 * 100;
                shared.assign(begin, begin + 50, worker + 1);
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("worker panicked");
    }
    println!("Shared store: size {}, canonical: {}", shared.size(), shared.is_canonical());
}
