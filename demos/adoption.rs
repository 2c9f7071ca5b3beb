//! Thenable adoption: resolving a future with another future chains them,
//! and a handler may return a future to splice it into the chain.
//!
//! Run with: `cargo run --example adoption`

use std::rc::Rc;

use microfuture::{Future, Resolution, TaskQueue};

fn main() {
    let queue = Rc::new(TaskQueue::new());

    // An "inner" result that some other part of the host settles later.
    let (inner, inner_resolver) = Future::<&'static str, String>::with_resolver(queue.clone());

    // The outer future adopts the inner one instead of settling directly.
    let outer: Future<&'static str, String> = Future::new(queue.clone(), |resolver| {
        resolver.resolve(Resolution::from(inner));
        Ok(())
    });

    outer.then(|v| {
        println!("outer settled to the inner value: {v}");
        Ok(Resolution::Value(v))
    });

    println!("draining before the inner settles: {} jobs", queue.run());
    inner_resolver.fulfill("adopted");
    println!("draining after the inner settles: {} jobs", queue.run());
}
