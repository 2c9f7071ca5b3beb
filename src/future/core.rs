//! # Settlement core.
//!
//! The state machine behind every [`Future`](crate::Future): status,
//! value/reason slot, and the pending-callback queues.
//!
//! ## Rules
//! - **Settle once**: exactly one transition, `Pending → Fulfilled` or
//!   `Pending → Rejected`. Every later `fulfill`/`reject` call is a no-op,
//!   which is what makes `race` and malformed multi-callback sources safe
//!   without any locking.
//! - **Drain once**: the callback queues are populated only while `Pending`
//!   and drained exactly once at the moment of settlement, in insertion
//!   order. Each entry becomes its own deferred job, so per-entry deferral is
//!   preserved alongside FIFO relative order.
//! - **Never synchronous**: callbacks registered on an already-settled core
//!   are scheduled immediately-but-deferred, never run inline. A registration
//!   always returns before its callback can run.

use std::cell::RefCell;
use std::mem;
use std::rc::Rc;

use tracing::trace;

use crate::defer::Defer;

/// A settlement continuation: consumes the (cloned) value or reason.
pub(crate) type Callback<A> = Box<dyn FnOnce(A)>;

/// Observable lifecycle stage of a future.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    /// Not settled yet; callbacks are being queued.
    Pending,
    /// Settled with a value.
    Fulfilled,
    /// Settled with a reason.
    Rejected,
}

/// Internal state. Exactly one of the three holds at any time: `Pending`
/// carries no value/reason, the settled variants carry theirs immutably.
enum State<T, E> {
    Pending {
        on_fulfill: Vec<Callback<T>>,
        on_reject: Vec<Callback<E>>,
    },
    Fulfilled(T),
    Rejected(E),
}

/// The shared heart of one future. Handles (`Future`, `Resolver`) are `Rc`
/// clones pointing here; the core owns its queue handle so late registrations
/// can still be deferred.
pub(crate) struct Core<T, E> {
    state: RefCell<State<T, E>>,
    queue: Rc<dyn Defer>,
}

impl<T: Clone + 'static, E: Clone + 'static> Core<T, E> {
    pub(crate) fn new(queue: Rc<dyn Defer>) -> Self {
        Self {
            state: RefCell::new(State::Pending {
                on_fulfill: Vec::new(),
                on_reject: Vec::new(),
            }),
            queue,
        }
    }

    pub(crate) fn queue(&self) -> Rc<dyn Defer> {
        Rc::clone(&self.queue)
    }

    pub(crate) fn status(&self) -> Status {
        match &*self.state.borrow() {
            State::Pending { .. } => Status::Pending,
            State::Fulfilled(_) => Status::Fulfilled,
            State::Rejected(_) => Status::Rejected,
        }
    }

    /// Clones the settled outcome out, if any.
    pub(crate) fn settled(&self) -> Option<Result<T, E>> {
        match &*self.state.borrow() {
            State::Pending { .. } => None,
            State::Fulfilled(value) => Some(Ok(value.clone())),
            State::Rejected(reason) => Some(Err(reason.clone())),
        }
    }

    /// Direct fulfillment: no thenable inspection (that happens upstream in
    /// the resolution procedure). No-op unless `Pending`.
    pub(crate) fn fulfill(&self, value: T) {
        let drained = {
            let mut state = self.state.borrow_mut();
            if !matches!(*state, State::Pending { .. }) {
                return;
            }
            mem::replace(&mut *state, State::Fulfilled(value.clone()))
        };
        if let State::Pending { on_fulfill, .. } = drained {
            trace!(callbacks = on_fulfill.len(), "future fulfilled");
            for callback in on_fulfill {
                let value = value.clone();
                self.queue.defer(Box::new(move || callback(value)));
            }
        }
    }

    /// Direct rejection. Rejection never adopts a thenable. No-op unless
    /// `Pending`.
    pub(crate) fn reject(&self, reason: E) {
        let drained = {
            let mut state = self.state.borrow_mut();
            if !matches!(*state, State::Pending { .. }) {
                return;
            }
            mem::replace(&mut *state, State::Rejected(reason.clone()))
        };
        if let State::Pending { on_reject, .. } = drained {
            trace!(callbacks = on_reject.len(), "future rejected");
            for callback in on_reject {
                let reason = reason.clone();
                self.queue.defer(Box::new(move || callback(reason)));
            }
        }
    }

    /// Registers a continuation pair.
    ///
    /// While `Pending`, both are queued. On a settled core the matching
    /// callback is scheduled right away (deferred, never inline) and the
    /// other is dropped.
    pub(crate) fn register(&self, on_fulfill: Callback<T>, on_reject: Callback<E>) {
        {
            let mut state = self.state.borrow_mut();
            if let State::Pending {
                on_fulfill: fulfill_queue,
                on_reject: reject_queue,
            } = &mut *state
            {
                fulfill_queue.push(on_fulfill);
                reject_queue.push(on_reject);
                return;
            }
        }
        // Late registration: settle already happened, schedule immediately.
        match self.settled() {
            Some(Ok(value)) => {
                trace!("registration after fulfillment, scheduling now");
                self.queue.defer(Box::new(move || on_fulfill(value)));
            }
            Some(Err(reason)) => {
                trace!("registration after rejection, scheduling now");
                self.queue.defer(Box::new(move || on_reject(reason)));
            }
            None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defer::TaskQueue;
    use std::rc::Rc;

    fn core(queue: &Rc<TaskQueue>) -> Core<i32, String> {
        Core::new(queue.clone())
    }

    fn record(log: &Rc<RefCell<Vec<i32>>>) -> Callback<i32> {
        let log = log.clone();
        Box::new(move |v| log.borrow_mut().push(v))
    }

    fn ignore_reason() -> Callback<String> {
        Box::new(|_| {})
    }

    #[test]
    fn test_first_settlement_wins() {
        let queue = Rc::new(TaskQueue::new());
        let core = core(&queue);
        let log = Rc::new(RefCell::new(Vec::new()));

        core.register(record(&log), ignore_reason());
        core.fulfill(1);
        core.fulfill(2);
        core.reject("late".into());

        assert_eq!(core.status(), Status::Fulfilled);
        queue.run();
        assert_eq!(*log.borrow(), vec![1], "only the first settlement may land");
        assert_eq!(core.settled(), Some(Ok(1)));
    }

    #[test]
    fn test_reject_is_terminal_too() {
        let queue = Rc::new(TaskQueue::new());
        let core = core(&queue);
        core.reject("boom".into());
        core.fulfill(7);
        assert_eq!(core.status(), Status::Rejected);
        assert_eq!(core.settled(), Some(Err("boom".into())));
    }

    #[test]
    fn test_callbacks_drain_in_insertion_order() {
        let queue = Rc::new(TaskQueue::new());
        let core = core(&queue);
        let log = Rc::new(RefCell::new(Vec::new()));

        for i in 0..4 {
            let log = log.clone();
            core.register(
                Box::new(move |v| log.borrow_mut().push(v + i)),
                ignore_reason(),
            );
        }
        core.fulfill(10);
        queue.run();
        assert_eq!(*log.borrow(), vec![10, 11, 12, 13]);
    }

    #[test]
    fn test_settlement_never_runs_callbacks_synchronously() {
        let queue = Rc::new(TaskQueue::new());
        let core = core(&queue);
        let log = Rc::new(RefCell::new(Vec::new()));

        core.register(record(&log), ignore_reason());
        core.fulfill(5);
        assert!(
            log.borrow().is_empty(),
            "callback ran inside fulfill() instead of being deferred"
        );
        queue.run();
        assert_eq!(*log.borrow(), vec![5]);
    }

    #[test]
    fn test_late_registration_is_deferred_not_inline() {
        let queue = Rc::new(TaskQueue::new());
        let core = core(&queue);
        core.fulfill(9);
        queue.run();

        let log = Rc::new(RefCell::new(Vec::new()));
        core.register(record(&log), ignore_reason());
        assert!(log.borrow().is_empty(), "late registration must still defer");
        queue.run();
        assert_eq!(*log.borrow(), vec![9]);
    }

    #[test]
    fn test_rejection_routes_to_reject_callbacks_only() {
        let queue = Rc::new(TaskQueue::new());
        let core = core(&queue);
        let values = Rc::new(RefCell::new(Vec::new()));
        let reasons = Rc::new(RefCell::new(Vec::new()));

        let r = reasons.clone();
        core.register(
            record(&values),
            Box::new(move |reason| r.borrow_mut().push(reason)),
        );
        core.reject("nope".into());
        queue.run();
        assert!(values.borrow().is_empty());
        assert_eq!(*reasons.borrow(), vec!["nope".to_string()]);
    }
}
