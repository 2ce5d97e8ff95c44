#![deny(missing_debug_implementations)]
//! Node mobility, packet queues, the neighbor oracle, and the four
//! routing protocols (AODV, DSDV, DSR, OLSR) that run on top of
//! `manet-sim-engine`'s scheduler.
//!
//! Splits the same way the teacher splits `rustasim-engine` (scheduling)
//! from `rustasim-models` (the network domain the scheduler runs).

mod context;
mod metrics;
mod mobility;
mod neighbors;
mod node;
mod packet;
mod protocols;
mod queue;
mod traffic;
mod world;

pub use context::SimContext;
pub use metrics::{Metrics, MetricsSnapshot};
pub use mobility::Mobility;
pub use neighbors::{refresh_all, refresh_one};
pub use node::{Node, NodeBuilder};
pub use packet::Packet;
pub use protocols::{Protocol, ProtocolKind};
pub use traffic::TrafficGenerator;
pub use world::{WorldBuilder, spawn_all};
