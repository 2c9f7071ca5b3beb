//! The settlement primitive: core state machine, resolution procedure, and
//! the public `Future`/`Resolver` handles.
//!
//! ## Contents
//! - [`Future`] / [`Resolver`] — read/chain side and write side of one core
//! - [`Status`] — observable lifecycle stage
//! - [`Resolution`] / [`Step`] — what `resolve` and handlers feed back in
//! - [`Thenable`] — the adoption capability for foreign asynchronous results
//!
//! ## Quick wiring
//! ```text
//! executor ──► Resolver::resolve ──► resolution procedure ──┬─► fulfill
//!                                        │ (thenable?)      └─► adopt ──┐
//!                                        └◄─── inner settle/reject ◄────┘
//! settle ──► drain callback queues ──► Defer::defer ──► host drains later
//! ```

mod core;
mod handle;
mod resolution;

pub use self::core::Status;
pub use self::handle::{Future, Resolver};
pub use self::resolution::{Resolution, Step, Thenable};
