//! Basic chaining: each handler feeds the next, rejections skip to `catch`.
//!
//! Run with: `cargo run --example chain`

use std::rc::Rc;

use microfuture::{Future, Resolution, TaskQueue};

fn main() {
    let queue = Rc::new(TaskQueue::new());

    let start: Future<i32, String> = Future::new(queue.clone(), |resolver| {
        resolver.fulfill(1);
        Ok(())
    });

    start
        .then(|v| {
            println!("first handler saw {v}");
            Ok(Resolution::Value(v + 1))
        })
        .then(|v| {
            println!("second handler saw {v}");
            Err(format!("giving up at {v}"))
        })
        .then(|v: i32| {
            println!("never printed: {v}");
            Ok(Resolution::Value(v))
        })
        .catch(|reason| {
            println!("caught: {reason}");
            Ok(Resolution::Value(0))
        })
        .finally(|| {
            println!("finally ran");
            Ok(())
        });

    println!("registered, draining...");
    let ran = queue.run();
    println!("drained {ran} jobs");
}
