//! # telemetry-probe
//!
//! A terminal peer for the telemetry relay.  It is an ordinary relay client:
//! the relay treats it exactly like a browser dashboard or a producer.
//!
//! - [`render`] turns received frames into one human-readable line each.
//! - [`synth`] generates plausible packets for exercising a relay without
//!   real hardware.

pub mod render;
pub mod synth;

pub use render::{describe_binary, describe_text};
pub use synth::synthetic_packet;
