//! The message routing and transformation core.
//!
//! ## Module structure
//!
//! - `color`: palette mapping between chat color codes and RGB
//! - `template`: placeholder substitution for chat lines and cards
//! - `segment`: multi-line normalization for in-game chat delivery
//! - `classify`: inbound event classification
//! - `policy`: per-direction relay filtering
//! - `routing`: channel id to role mapping
//! - `router`: orchestration of the above, plus delivery

pub mod classify;
pub mod color;
pub mod policy;
pub mod router;
pub mod routing;
pub mod segment;
pub mod template;

pub use router::{PlatformSink, Router, Snapshot};
