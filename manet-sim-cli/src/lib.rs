#![deny(missing_debug_implementations)]
//! Run controller, configuration, and emission stream for the MANET
//! routing simulator CLI.

mod config;
mod controller;
mod emission;
mod history;

pub use config::RunConfig;
pub use controller::RunController;
pub use emission::{EmissionRecord, NodeSnapshot};
pub use history::write_final_record;
