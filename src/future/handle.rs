//! # Future and resolver handles.
//!
//! [`Future`] is the read/chain side of a settlement core; [`Resolver`] is
//! the write side. Both are cheap `Rc` clones of the same core, produced
//! together by [`Future::with_resolver`] or wired up by the executor passed
//! to [`Future::new`].
//!
//! ## Chaining
//! Every operator builds a fresh downstream future immediately and wires it
//! to the parent through callback registration only; operators never touch
//! the parent's state directly. Handlers return a [`Step`]:
//! - `Ok(Resolution::Value(x))` fulfills the downstream future with `x`;
//! - `Ok(Resolution::Thenable(t))` makes it adopt `t` (chaining);
//! - `Err(e)` rejects it — the handler-failure boundary.
//!
//! Omitted handlers penetrate: [`Future::then`] has no rejection handler, so
//! a parent rejection passes through unchanged (this is how `catch` further
//! down a chain still sees it); [`Future::catch`] has no fulfillment handler,
//! so a parent value passes through unchanged.
//!
//! ## Example
//! ```rust
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use microfuture::{Future, Resolution, TaskQueue};
//!
//! let queue = Rc::new(TaskQueue::new());
//! let future: Future<i32, String> = Future::new(queue.clone(), |resolver| {
//!     resolver.fulfill(1);
//!     Ok(())
//! });
//!
//! let seen = Rc::new(RefCell::new(Vec::new()));
//! let out = seen.clone();
//! future
//!     .then(|v| Ok(Resolution::Value(v + 1)))
//!     .then(move |v| {
//!         out.borrow_mut().push(v);
//!         Ok(Resolution::Value(v))
//!     });
//!
//! assert!(seen.borrow().is_empty()); // nothing runs before the drain
//! queue.run();
//! assert_eq!(*seen.borrow(), vec![2]);
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use crate::defer::Defer;
use crate::error::SettleError;
use crate::future::core::{Callback, Core, Status};
use crate::future::resolution::{core_identity, resolve_core, Resolution, Step, Thenable};

/// Single-assignment asynchronous result container.
///
/// ### Properties
/// - **Cloneable**: clones share the same core; settling through any resolver
///   is observed by all clones.
/// - **Single-threaded**: `Rc`-based, meant to live on one thread alongside
///   its [`Defer`] queue.
pub struct Future<T, E> {
    core: Rc<Core<T, E>>,
}

impl<T, E> Clone for Future<T, E> {
    fn clone(&self) -> Self {
        Self {
            core: Rc::clone(&self.core),
        }
    }
}

/// Write side of a future. The only way to settle a core.
///
/// Cloneable so an executor can hand it to several sources; the first
/// settlement wins and the rest are no-ops.
pub struct Resolver<T, E> {
    core: Rc<Core<T, E>>,
}

impl<T, E> Clone for Resolver<T, E> {
    fn clone(&self) -> Self {
        Self {
            core: Rc::clone(&self.core),
        }
    }
}

impl<T, E> Resolver<T, E>
where
    T: Clone + 'static,
    E: Clone + From<SettleError> + 'static,
{
    /// Runs the full resolution procedure: settle with a value, or adopt a
    /// thenable. No-op once the future settled.
    pub fn resolve(&self, resolution: Resolution<T, E>) {
        resolve_core(&self.core, resolution);
    }

    /// Shorthand for `resolve(Resolution::Value(value))`.
    pub fn fulfill(&self, value: T) {
        resolve_core(&self.core, Resolution::Value(value));
    }

    /// Settles to `Rejected` with `reason`. Never adopts. No-op once settled.
    pub fn reject(&self, reason: E) {
        self.core.reject(reason);
    }
}

impl<T, E> Future<T, E>
where
    T: Clone + 'static,
    E: Clone + From<SettleError> + 'static,
{
    /// Creates a pending future together with its resolver.
    pub fn with_resolver(queue: Rc<dyn Defer>) -> (Self, Resolver<T, E>) {
        let core = Rc::new(Core::new(queue));
        (
            Self {
                core: Rc::clone(&core),
            },
            Resolver { core },
        )
    }

    /// Creates a future and synchronously runs `executor` with its resolver.
    ///
    /// An `Err` from the executor rejects the future with that reason;
    /// construction itself never propagates the failure. If the executor
    /// already settled the future, the error is a no-op like any late
    /// settlement.
    pub fn new(
        queue: Rc<dyn Defer>,
        executor: impl FnOnce(Resolver<T, E>) -> Result<(), E>,
    ) -> Self {
        let (future, resolver) = Self::with_resolver(queue);
        if let Err(reason) = executor(resolver.clone()) {
            resolver.reject(reason);
        }
        future
    }

    /// An already-fulfilled future.
    pub fn resolved(queue: Rc<dyn Defer>, value: T) -> Self {
        let (future, resolver) = Self::with_resolver(queue);
        resolver.fulfill(value);
        future
    }

    /// An already-rejected future.
    pub fn rejected(queue: Rc<dyn Defer>, reason: E) -> Self {
        let (future, resolver) = Self::with_resolver(queue);
        resolver.reject(reason);
        future
    }

    /// Current lifecycle stage. Settlement is visible here as soon as it
    /// happens, even though callbacks only run on the next drain.
    pub fn status(&self) -> Status {
        self.core.status()
    }

    /// Clones the settled outcome out, `None` while pending.
    pub fn settled(&self) -> Option<Result<T, E>> {
        self.core.settled()
    }

    /// Chains a fulfillment handler; rejections penetrate unchanged.
    ///
    /// The downstream future is created immediately, before the parent
    /// settles. The handler never runs before the current call stack unwinds.
    pub fn then<U, F>(&self, on_fulfilled: F) -> Future<U, E>
    where
        U: Clone + 'static,
        F: FnOnce(T) -> Step<U, E> + 'static,
    {
        let (next, resolver) = Future::with_resolver(self.core.queue());
        let on_reject = {
            let resolver = resolver.clone();
            Box::new(move |reason: E| resolver.reject(reason))
        };
        self.core.register(
            Box::new(move |value: T| apply(&resolver, on_fulfilled(value))),
            on_reject,
        );
        next
    }

    /// Chains both handlers, the two-argument form of `then`.
    pub fn then_or_else<U, F, G>(&self, on_fulfilled: F, on_rejected: G) -> Future<U, E>
    where
        U: Clone + 'static,
        F: FnOnce(T) -> Step<U, E> + 'static,
        G: FnOnce(E) -> Step<U, E> + 'static,
    {
        let (next, resolver) = Future::with_resolver(self.core.queue());
        let on_reject = {
            let resolver = resolver.clone();
            Box::new(move |reason: E| apply(&resolver, on_rejected(reason)))
        };
        self.core.register(
            Box::new(move |value: T| apply(&resolver, on_fulfilled(value))),
            on_reject,
        );
        next
    }

    /// Chains a rejection handler; fulfillment values penetrate unchanged.
    /// This is how a `catch` at the end of a chain of `then`s sees an early
    /// rejection.
    pub fn catch<G>(&self, on_rejected: G) -> Future<T, E>
    where
        G: FnOnce(E) -> Step<T, E> + 'static,
    {
        let (next, resolver) = Future::with_resolver(self.core.queue());
        let on_fulfill = {
            let resolver = resolver.clone();
            Box::new(move |value: T| resolver.fulfill(value))
        };
        self.core.register(
            on_fulfill,
            Box::new(move |reason: E| apply(&resolver, on_rejected(reason))),
        );
        next
    }

    /// Runs `on_finally` on either outcome, passing the outcome through
    /// unchanged: a value stays a value, a reason keeps rejecting downstream.
    ///
    /// An `Err` from the hook supersedes the original outcome on both paths.
    pub fn finally<F>(&self, on_finally: F) -> Future<T, E>
    where
        F: FnOnce() -> Result<(), E> + 'static,
    {
        let (next, resolver) = Future::with_resolver(self.core.queue());
        // One FnOnce hook shared by two registered continuations; the core
        // invokes at most one of them, exactly once.
        let hook = Rc::new(RefCell::new(Some(on_finally)));

        let on_fulfill: Callback<T> = {
            let hook = Rc::clone(&hook);
            let resolver = resolver.clone();
            Box::new(move |value: T| match run_hook(&hook) {
                Ok(()) => resolver.fulfill(value),
                Err(superseding) => resolver.reject(superseding),
            })
        };
        let on_reject: Callback<E> = Box::new(move |reason: E| match run_hook(&hook) {
            Ok(()) => resolver.reject(reason),
            Err(superseding) => resolver.reject(superseding),
        });
        self.core.register(on_fulfill, on_reject);
        next
    }

    pub(crate) fn register(&self, on_fulfill: Callback<T>, on_reject: Callback<E>) {
        self.core.register(on_fulfill, on_reject);
    }
}

/// Feeds a handler outcome into a downstream resolver.
fn apply<U, E>(resolver: &Resolver<U, E>, step: Step<U, E>)
where
    U: Clone + 'static,
    E: Clone + From<SettleError> + 'static,
{
    match step {
        Ok(resolution) => resolver.resolve(resolution),
        Err(reason) => resolver.reject(reason),
    }
}

/// Takes and runs a one-shot hook. The `None` arm is unreachable under the
/// register() contract but degrades to a pass-through rather than panicking.
fn run_hook<F, E>(hook: &Rc<RefCell<Option<F>>>) -> Result<(), E>
where
    F: FnOnce() -> Result<(), E>,
{
    match hook.borrow_mut().take() {
        Some(hook) => hook(),
        None => Ok(()),
    }
}

/// Resolving one future with another chains them: the adopting core settles
/// to whatever this future settles to.
impl<T, E> Thenable<T, E> for Future<T, E>
where
    T: Clone + 'static,
    E: Clone + From<SettleError> + 'static,
{
    fn subscribe(
        self: Box<Self>,
        settle: Box<dyn FnOnce(Resolution<T, E>)>,
        reject: Box<dyn FnOnce(E)>,
    ) -> Result<(), E> {
        // A settled future's own value is already unwrapped, so it re-enters
        // the adopter's resolution procedure as a plain value.
        self.core
            .register(Box::new(move |value| settle(Resolution::Value(value))), reject);
        Ok(())
    }

    fn identity(&self) -> Option<*const ()> {
        Some(core_identity(&self.core))
    }
}

impl<T, E> From<Future<T, E>> for Resolution<T, E>
where
    T: Clone + 'static,
    E: Clone + From<SettleError> + 'static,
{
    fn from(future: Future<T, E>) -> Self {
        Resolution::Thenable(Box::new(future))
    }
}
