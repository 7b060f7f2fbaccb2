//! Game server host boundary.
//!
//! Events flow in over an mpsc channel; actions flow back through a
//! queue drained once per tick, so the core never mutates game state
//! off-tick. The console module is a stdin harness standing in for a
//! real server hook.

pub mod console;
pub mod host;

pub use host::{run_tick_loop, GameBackend, ServerInfo};
