//! `race` and `all` over resolvers settled in scrambled order.
//!
//! Run with: `cargo run --example combinators`

use std::rc::Rc;

use microfuture::{Future, Resolution, TaskQueue};

fn main() {
    let queue = Rc::new(TaskQueue::new());

    let (a, a_resolver) = Future::<i32, String>::with_resolver(queue.clone());
    let (b, b_resolver) = Future::<i32, String>::with_resolver(queue.clone());
    let (c, c_resolver) = Future::<i32, String>::with_resolver(queue.clone());

    Future::race(queue.clone(), [a.clone(), b.clone()]).then(|v| {
        println!("race winner: {v}");
        Ok(Resolution::Value(v))
    });

    Future::all(queue.clone(), [a, b, c]).then(|values| {
        println!("all gathered (input order): {values:?}");
        Ok(Resolution::Value(values))
    });

    // Settle out of input order: b first, then c, then a.
    b_resolver.fulfill(2);
    c_resolver.fulfill(3);
    a_resolver.fulfill(1);

    queue.run();
}
