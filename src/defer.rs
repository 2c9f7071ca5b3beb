//! # Deferred invocation.
//!
//! The settlement machinery never runs user callbacks synchronously inside
//! `resolve`, `reject`, a chaining operator, or a combinator call. Instead it
//! hands each callback to a [`Defer`] capability, which schedules it to run
//! after the current synchronous context completes. This is the only thing the
//! core asks of its host environment, so the rest of the crate stays
//! host-agnostic.
//!
//! ## Rules
//! - **FIFO per queue**: jobs run in the order they were deferred.
//! - **Same-drain nesting**: jobs deferred while [`TaskQueue::run`] is
//!   draining are appended and run within that same drain.
//! - **No implicit arguments**: a [`Job`] is a plain `FnOnce()`; whatever the
//!   callback needs is captured at deferral time.
//!
//! ## Example
//! ```rust
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use microfuture::{Defer, TaskQueue};
//!
//! let queue = TaskQueue::new();
//! let seen = Rc::new(RefCell::new(Vec::new()));
//!
//! for i in 0..3 {
//!     let seen = seen.clone();
//!     queue.defer(Box::new(move || seen.borrow_mut().push(i)));
//! }
//!
//! assert_eq!(queue.run(), 3);
//! assert_eq!(*seen.borrow(), vec![0, 1, 2]);
//! ```

use std::cell::RefCell;
use std::collections::VecDeque;

/// A unit of deferred work: runs once, takes nothing, returns nothing.
pub type Job = Box<dyn FnOnce()>;

/// The deferral capability injected into every future.
///
/// Implementations must preserve the order in which `defer` calls were made:
/// all jobs issued while draining one settlement run in issue order. That is
/// the only ordering guarantee the settlement core relies on.
pub trait Defer {
    /// Schedules `job` to run after the current synchronous context completes.
    fn defer(&self, job: Job);
}

/// A FIFO microtask queue.
///
/// This is the in-crate [`Defer`] implementation: a plain `VecDeque` of jobs
/// drained explicitly by the host via [`TaskQueue::run`]. Embedders with their
/// own event loop implement [`Defer`] over it instead.
///
/// ### Properties
/// - **Single-threaded**: interior mutability via `RefCell`, no locking.
/// - **Re-entrant enqueue**: a running job may defer further jobs; they join
///   the same drain.
#[derive(Default)]
pub struct TaskQueue {
    jobs: RefCell<VecDeque<Job>>,
}

impl TaskQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drains the queue until it is idle, running each job in FIFO order.
    ///
    /// Jobs deferred by running jobs are picked up by the same call. Returns
    /// the number of jobs run.
    pub fn run(&self) -> usize {
        let mut ran = 0;
        loop {
            // Release the borrow before running the job: jobs re-enter defer().
            let job = self.jobs.borrow_mut().pop_front();
            match job {
                Some(job) => {
                    job();
                    ran += 1;
                }
                None => return ran,
            }
        }
    }

    /// Number of jobs currently waiting.
    pub fn len(&self) -> usize {
        self.jobs.borrow().len()
    }

    /// True when no jobs are waiting.
    pub fn is_empty(&self) -> bool {
        self.jobs.borrow().is_empty()
    }
}

impl Defer for TaskQueue {
    fn defer(&self, job: Job) {
        self.jobs.borrow_mut().push_back(job);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn test_jobs_run_in_fifo_order() {
        let queue = TaskQueue::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        for i in 0..5 {
            let seen = seen.clone();
            queue.defer(Box::new(move || seen.borrow_mut().push(i)));
        }
        assert_eq!(queue.run(), 5);
        assert_eq!(*seen.borrow(), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_nothing_runs_before_drain() {
        let queue = TaskQueue::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let out = seen.clone();
        queue.defer(Box::new(move || out.borrow_mut().push(1)));
        assert!(seen.borrow().is_empty(), "job ran before run() was called");
        assert_eq!(queue.len(), 1);
        queue.run();
        assert_eq!(*seen.borrow(), vec![1]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_nested_defers_join_the_same_drain() {
        let queue = Rc::new(TaskQueue::new());
        let seen = Rc::new(RefCell::new(Vec::new()));

        let q = queue.clone();
        let out = seen.clone();
        queue.defer(Box::new(move || {
            out.borrow_mut().push("outer");
            let inner_out = out.clone();
            q.defer(Box::new(move || inner_out.borrow_mut().push("inner")));
        }));

        assert_eq!(queue.run(), 2, "nested job should run in the same drain");
        assert_eq!(*seen.borrow(), vec!["outer", "inner"]);
    }

    #[test]
    fn test_run_on_empty_queue_is_a_noop() {
        let queue = TaskQueue::new();
        assert_eq!(queue.run(), 0);
    }
}
