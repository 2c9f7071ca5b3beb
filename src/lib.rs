//! # microfuture
//!
//! **microfuture** is a single-threaded, promise-style future library for Rust.
//!
//! It provides a single-assignment asynchronous result container
//! ([`Future<T, E>`]) with chaining (`then` / `catch` / `finally`), adoption of
//! foreign asynchronous results ([`Thenable`]), and the [`Future::race`] /
//! [`Future::all`] combinators. The crate is designed as a building block for
//! cooperative, single-threaded hosts: embedded interpreters, UI event loops,
//! simulations, tests that need deterministic asynchrony.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   caller                         settlement core (one per Future)
//! ┌──────────────┐   fulfill/    ┌──────────────────────────────────┐
//! │  executor /  │───reject────► │ status: Pending→Fulfilled        │
//! │  Resolver    │               │               └──► Rejected      │
//! └──────────────┘               │ on_fulfill: [cb, cb, ...]        │
//!        │ resolve(Thenable)     │ on_reject:  [cb, cb, ...]        │
//!        ▼                       └───────────────┬──────────────────┘
//! ┌──────────────┐ inner settle/reject           │ drain on settle
//! │  resolution  │◄───(one-shot, first wins)     ▼ (one job per cb)
//! │  procedure   │                     ┌──────────────────┐
//! └──────────────┘                     │  Defer capability │
//!   unwraps nested thenables,          │  (TaskQueue FIFO) │
//!   detects self-adoption cycles       └────────┬─────────┘
//!                                               ▼
//!                                      host calls queue.run()
//! ```
//!
//! ### Turn discipline
//! Handlers registered through `then`/`catch`/`finally` never run before the
//! registering call returns, even when the source future is already settled:
//! every callback goes through the injected [`Defer`] capability. Relative
//! order of callbacks registered on the *same* future is preserved; nothing is
//! guaranteed *across* futures.
//!
//! ## Features
//! | Area             | Description                                                  | Key types / traits                 |
//! |------------------|--------------------------------------------------------------|------------------------------------|
//! | **Settlement**   | One-shot `Pending → Fulfilled/Rejected`, idempotent after.   | [`Future`], [`Resolver`], [`Status`] |
//! | **Chaining**     | `then`/`then_or_else`/`catch`/`finally`, penetration rules.  | [`Step`], [`Resolution`]           |
//! | **Adoption**     | Resolve with another asynchronous result; cycles rejected.   | [`Thenable`], [`SettleError`]      |
//! | **Combinators**  | Fan several futures into one.                                | [`Future::race`], [`Future::all`]  |
//! | **Scheduling**   | Injected deferral; in-crate FIFO microtask queue.            | [`Defer`], [`TaskQueue`]           |
//!
//! ## Example
//! ```rust
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use microfuture::{Future, Resolution, TaskQueue};
//!
//! let queue = Rc::new(TaskQueue::new());
//!
//! // An executor settles the future through its resolver; an Err return
//! // auto-rejects instead of propagating.
//! let reading: Future<String, String> = Future::new(queue.clone(), |resolver| {
//!     resolver.fulfill("contents".to_string());
//!     Ok(())
//! });
//!
//! let seen = Rc::new(RefCell::new(None));
//! let out = seen.clone();
//! reading
//!     .then(|text| Ok(Resolution::Value(text.len())))
//!     .then(move |len| {
//!         *out.borrow_mut() = Some(len);
//!         Ok(Resolution::Value(len))
//!     });
//!
//! // Nothing runs until the host drains the queue.
//! assert_eq!(*seen.borrow(), None);
//! queue.run();
//! assert_eq!(*seen.borrow(), Some(8));
//! ```
//!
//! ## What this crate is not
//! No cancellation, no timeouts, no priorities, no threads. A caller wanting a
//! timeout composes one externally: `race` the work against a future some
//! timer facility rejects after a delay.

mod combine;
mod defer;
mod error;
mod future;

// ---- Public re-exports ----

pub use defer::{Defer, Job, TaskQueue};
pub use error::SettleError;
pub use future::{Future, Resolution, Resolver, Status, Step, Thenable};
