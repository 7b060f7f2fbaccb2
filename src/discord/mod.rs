//! Discord side of the bridge: client lifecycle, event handling, and the
//! outbound delivery sink.

pub mod client;
pub mod handler;
pub mod sink;

pub use client::{build_client, run_client};
pub use handler::process_events;
pub use sink::{DisabledSink, DiscordSink};
