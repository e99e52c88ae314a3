//! Per-workflow state machines.
//!
//! Each workflow owns at most one upload and its derived state. Every
//! asynchronous job handed out carries a [`Ticket`]; completing a job with
//! a ticket that is no longer current is a no-op, so late results from a
//! superseded upload or request never reach visible state.

mod generation;
mod remover;
mod resizer;

pub use generation::{Completion, Ticket};
pub use remover::{RemovalJob, RemoverPhase, RemoverSession};
pub use resizer::{NativeDimensions, ProbeJob, ResizeJob, ResizeStep, ResizerSession};
