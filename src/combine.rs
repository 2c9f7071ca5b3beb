//! # Fan-in combinators.
//!
//! `race` and `all` fold several futures into one. Both are built purely on
//! callback registration and the idempotent settle-once rule; they never
//! reach into another future's state.
//!
//! ## Rules
//! - **`race`**: the first input settlement in wall/turn order (not input
//!   order) settles the output; later settlements on the other inputs hit an
//!   already-settled core and vanish. Racing no inputs yields a future that
//!   never settles — composing a timeout is the caller's job, via `race`
//!   against a future that rejects after a delay.
//! - **`all`**: output fulfills with the values in **input order**, however
//!   the inputs interleave in real time. The first rejection rejects the
//!   output verbatim; everything after it is a no-op and no partial values
//!   leak. No inputs fulfills with an empty vector.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tracing::trace;

use crate::defer::Defer;
use crate::error::SettleError;
use crate::future::Future;

impl<T, E> Future<T, E>
where
    T: Clone + 'static,
    E: Clone + From<SettleError> + 'static,
{
    /// Settles to whichever input settles first, fulfillment or rejection.
    ///
    /// # Example
    /// ```rust
    /// use std::rc::Rc;
    /// use microfuture::{Future, TaskQueue};
    ///
    /// let queue = Rc::new(TaskQueue::new());
    /// let (fast, fast_resolver) = Future::<i32, String>::with_resolver(queue.clone());
    /// let (slow, slow_resolver) = Future::<i32, String>::with_resolver(queue.clone());
    ///
    /// let winner = Future::race(queue.clone(), [fast, slow]);
    /// fast_resolver.fulfill(1);
    /// slow_resolver.fulfill(2); // already settled, vanishes
    /// queue.run();
    /// assert_eq!(winner.settled(), Some(Ok(1)));
    /// ```
    pub fn race(
        queue: Rc<dyn Defer>,
        futures: impl IntoIterator<Item = Future<T, E>>,
    ) -> Future<T, E> {
        let (output, resolver) = Future::with_resolver(queue);
        for future in futures {
            let fulfill = {
                let resolver = resolver.clone();
                Box::new(move |value: T| resolver.fulfill(value))
            };
            let reject = {
                let resolver = resolver.clone();
                Box::new(move |reason: E| resolver.reject(reason))
            };
            future.register(fulfill, reject);
        }
        output
    }

    /// Fulfills with every input's value, in input order, or rejects with the
    /// first rejection.
    pub fn all(
        queue: Rc<dyn Defer>,
        futures: impl IntoIterator<Item = Future<T, E>>,
    ) -> Future<Vec<T>, E> {
        let futures: Vec<Future<T, E>> = futures.into_iter().collect();
        let count = futures.len();
        let (output, resolver) = Future::with_resolver(queue);

        if count == 0 {
            resolver.fulfill(Vec::new());
            return output;
        }

        // Slots keep input order regardless of completion order.
        let slots: Rc<RefCell<Vec<Option<T>>>> = Rc::new(RefCell::new(vec![None; count]));
        let remaining = Rc::new(Cell::new(count));

        for (index, future) in futures.into_iter().enumerate() {
            let fulfill = {
                let slots = Rc::clone(&slots);
                let remaining = Rc::clone(&remaining);
                let resolver = resolver.clone();
                Box::new(move |value: T| {
                    slots.borrow_mut()[index] = Some(value);
                    remaining.set(remaining.get() - 1);
                    if remaining.get() == 0 {
                        trace!(inputs = count, "all inputs fulfilled");
                        let gathered: Vec<T> = slots.borrow_mut().drain(..).flatten().collect();
                        resolver.fulfill(gathered);
                    }
                })
            };
            let reject = {
                let resolver = resolver.clone();
                Box::new(move |reason: E| resolver.reject(reason))
            };
            future.register(fulfill, reject);
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defer::TaskQueue;
    use crate::future::{Resolution, Resolver, Status};

    fn queue() -> Rc<TaskQueue> {
        Rc::new(TaskQueue::new())
    }

    fn pair(queue: &Rc<TaskQueue>) -> (Future<i32, String>, Resolver<i32, String>) {
        Future::with_resolver(queue.clone())
    }

    #[test]
    fn test_race_first_fulfillment_wins() {
        let queue = queue();
        let (fast, fast_resolver) = pair(&queue);
        let (slow, slow_resolver) = pair(&queue);

        let winner = Future::race(queue.clone(), [fast, slow]);
        fast_resolver.fulfill(1);
        queue.run();
        slow_resolver.fulfill(2);
        queue.run();
        assert_eq!(winner.settled(), Some(Ok(1)), "later settlement must not show");
    }

    #[test]
    fn test_race_first_rejection_wins_over_later_fulfillment() {
        let queue = queue();
        let (a, a_resolver) = pair(&queue);
        let (b, b_resolver) = pair(&queue);

        let winner = Future::race(queue.clone(), [a, b]);
        a_resolver.reject("early failure".into());
        queue.run();
        b_resolver.fulfill(42);
        queue.run();
        assert_eq!(winner.settled(), Some(Err("early failure".into())));
    }

    #[test]
    fn test_race_turn_order_beats_input_order() {
        let queue = queue();
        let (first_listed, first_resolver) = pair(&queue);
        let (second_listed, second_resolver) = pair(&queue);

        let winner = Future::race(queue.clone(), [first_listed, second_listed]);
        // The later-listed input settles first in turn order.
        second_resolver.fulfill(20);
        first_resolver.fulfill(10);
        queue.run();
        assert_eq!(winner.settled(), Some(Ok(20)));
    }

    #[test]
    fn test_race_of_nothing_never_settles() {
        let queue = queue();
        let winner: Future<i32, String> = Future::race(queue.clone(), []);
        assert_eq!(queue.run(), 0);
        assert_eq!(winner.status(), Status::Pending);
    }

    #[test]
    fn test_all_preserves_input_order_under_scrambled_completion() {
        let queue = queue();
        let (a, a_resolver) = pair(&queue);
        let (b, b_resolver) = pair(&queue);
        let (c, c_resolver) = pair(&queue);

        let gathered = Future::all(queue.clone(), [a, b, c]);
        // Completion order: c, a, b.
        c_resolver.fulfill(3);
        queue.run();
        a_resolver.fulfill(1);
        queue.run();
        b_resolver.fulfill(2);
        queue.run();
        assert_eq!(gathered.settled(), Some(Ok(vec![1, 2, 3])));
    }

    #[test]
    fn test_all_rejects_with_the_first_rejection() {
        let queue = queue();
        let (a, a_resolver) = pair(&queue);
        let (b, b_resolver) = pair(&queue);
        let (c, c_resolver) = pair(&queue);

        let gathered = Future::all(queue.clone(), [a, b, c]);
        a_resolver.fulfill(1);
        b_resolver.reject("b failed".into());
        queue.run();
        c_resolver.fulfill(3);
        queue.run();
        assert_eq!(
            gathered.settled(),
            Some(Err("b failed".into())),
            "c's value must never appear anywhere"
        );
    }

    #[test]
    fn test_all_of_nothing_fulfills_with_an_empty_vector() {
        let queue = queue();
        let gathered: Future<Vec<i32>, String> = Future::all(queue.clone(), []);
        assert_eq!(gathered.settled(), Some(Ok(Vec::new())));
    }

    #[test]
    fn test_all_with_already_settled_inputs() {
        let queue = queue();
        let a = Future::resolved(queue.clone(), 1);
        let b = Future::<i32, String>::resolved(queue.clone(), 2);

        let gathered = Future::all(queue.clone(), [a, b]);
        assert_eq!(gathered.status(), Status::Pending, "late registrations defer");
        queue.run();
        assert_eq!(gathered.settled(), Some(Ok(vec![1, 2])));
    }

    #[test]
    fn test_race_composes_with_chaining() {
        let queue = queue();
        let (fast, fast_resolver) = pair(&queue);
        let (slow, _slow_resolver) = pair(&queue);

        let doubled = Future::race(queue.clone(), [fast, slow])
            .then(|v| Ok(Resolution::Value(v * 2)));
        fast_resolver.fulfill(21);
        queue.run();
        assert_eq!(doubled.settled(), Some(Ok(42)));
    }
}
