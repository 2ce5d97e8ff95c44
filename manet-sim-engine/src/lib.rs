#![deny(missing_debug_implementations)]
//! Single-threaded, cooperative discrete-event scheduler.
//!
//! This crate is deliberately model-agnostic, the same way the teacher
//! repo splits `rustasim-engine` (scheduling) from `rustasim-models` (the
//! datacenter network domain). Nothing in here knows about nodes, packets,
//! or routing protocols; it only knows how to advance a virtual clock by
//! running whichever registered [`Process`] wants to wake up next.

mod error;
mod process;
mod scheduler;
mod stop;
mod time;

pub use error::SimError;
pub use process::{Poll, Process, Spawner};
pub use scheduler::Scheduler;
pub use stop::StopFlag;
pub use time::SimTime;
