//! Hardware identity probing and fingerprinting for Hostlock.
//!
//! This crate answers one question: "which machine am I running on?"
//! It collects machine-identifying attributes (MAC address, CPU
//! identifier, disk serial, OS descriptors, hostname) and condenses them
//! into a single stable fingerprint that licenses can be bound to.
//!
//! # Design Principles
//!
//! - **Never crash the host**: hardware commands are fragile (missing
//!   utilities, locked-down permissions, virtualized environments), so
//!   every probe degrades to a fallback value instead of erroring.
//! - **Strategy chains**: each attribute is read through an ordered list
//!   of platform-specific strategies; the first success wins.
//! - **Determinism within a process**: repeated fingerprint computations
//!   in the same process always agree, even when a probe had to fall
//!   back to a randomly generated value.

mod fingerprint;
mod info;
mod probe;

pub use fingerprint::{validate_hardware_id, HardwareId};
pub use info::SystemInfo;
