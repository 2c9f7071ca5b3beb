//! # Resolution procedure.
//!
//! Decides what happens to a value handed to `resolve`: settle directly, or
//! adopt another asynchronous result ("thenable") and wait for it instead.
//!
//! ## Rules
//! - **Self-adoption is a cycle**: resolving a future with itself would wait
//!   forever, so it rejects with [`SettleError::Cycle`] instead.
//! - **Recursive unwrap**: a thenable that settles with *another* thenable is
//!   unwrapped again through the same procedure, until a plain value or a
//!   rejection is reached.
//! - **First inner callback wins**: a malformed thenable may invoke both
//!   continuations, or one of them repeatedly. A one-shot flag per adoption
//!   attempt lets only the first invocation through.
//! - **Rejection never adopts**: a reason settles the core as-is even when it
//!   happens to implement [`Thenable`].

use std::cell::Cell;
use std::rc::Rc;

use tracing::{debug, trace};

use crate::error::SettleError;
use crate::future::core::{Core, Status};

/// What a `resolve` call carries: either a plain fulfillment value, or a
/// foreign asynchronous result to adopt.
///
/// This is the static rendering of the duck-typed "does the value have a
/// callable `then`?" check: the caller states which side it is on, and the
/// procedure dispatches on the variant.
pub enum Resolution<T, E> {
    /// An ordinary value; the core settles to `Fulfilled` with it.
    Value(T),
    /// An asynchronous result; the core settles to whatever it settles to.
    Thenable(Box<dyn Thenable<T, E>>),
}

/// Outcome of a user-supplied handler: `Ok` feeds the resolution procedure of
/// the downstream future, `Err` rejects it (the moral equivalent of a thrown
/// exception in a handler).
pub type Step<T, E> = Result<Resolution<T, E>, E>;

/// The capability a foreign asynchronous result implements to be adopted.
///
/// [`Future`](crate::Future) implements this itself, so resolving one future
/// with another chains them. `subscribe` consumes the thenable and must
/// eventually invoke at most one of the two continuations; the procedure
/// tolerates sources that invoke both or either more than once.
pub trait Thenable<T, E> {
    /// Registers the adopting continuations.
    ///
    /// Returning `Err` models a source whose registration itself fails: the
    /// adoption rejects with that reason unless a continuation already fired,
    /// in which case the error is discarded (first settlement wins).
    fn subscribe(
        self: Box<Self>,
        settle: Box<dyn FnOnce(Resolution<T, E>)>,
        reject: Box<dyn FnOnce(E)>,
    ) -> Result<(), E>;

    /// Stable identity used to detect self-adoption cycles. Foreign sources
    /// keep the default; only in-crate futures can form a cycle.
    fn identity(&self) -> Option<*const ()> {
        None
    }
}

/// Entry point: the full resolution procedure for `core`.
///
/// No-op when the core already left `Pending`.
pub(crate) fn resolve_core<T, E>(core: &Rc<Core<T, E>>, resolution: Resolution<T, E>)
where
    T: Clone + 'static,
    E: Clone + From<SettleError> + 'static,
{
    if core.status() != Status::Pending {
        return;
    }
    match resolution {
        Resolution::Value(value) => core.fulfill(value),
        Resolution::Thenable(thenable) => adopt(core, thenable),
    }
}

/// Adopts `thenable`: the core settles to whatever the thenable settles to,
/// unwrapping nested thenables along the way.
fn adopt<T, E>(core: &Rc<Core<T, E>>, thenable: Box<dyn Thenable<T, E>>)
where
    T: Clone + 'static,
    E: Clone + From<SettleError> + 'static,
{
    if thenable.identity() == Some(core_identity(core)) {
        debug!(label = SettleError::Cycle.as_label(), "self-adoption detected");
        core.reject(E::from(SettleError::Cycle));
        return;
    }

    trace!("adopting thenable");
    // One flag per adoption attempt; checked before either branch acts.
    let fired = Rc::new(Cell::new(false));

    let settle = {
        let core = Rc::clone(core);
        let fired = Rc::clone(&fired);
        Box::new(move |resolution: Resolution<T, E>| {
            if fired.replace(true) {
                return;
            }
            resolve_core(&core, resolution);
        })
    };
    let reject = {
        let core = Rc::clone(core);
        let fired = Rc::clone(&fired);
        Box::new(move |reason: E| {
            if fired.replace(true) {
                return;
            }
            core.reject(reason);
        })
    };

    if let Err(reason) = thenable.subscribe(settle, reject) {
        // A registration failure only counts if nothing fired first.
        if !fired.replace(true) {
            core.reject(reason);
        }
    }
}

/// Address of the core, used as the cycle-detection identity.
pub(crate) fn core_identity<T, E>(core: &Rc<Core<T, E>>) -> *const () {
    Rc::as_ptr(core).cast()
}
