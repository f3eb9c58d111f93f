//! zero-patch-core
//!
//! Core library for verifying, patching, and table-editing Mega Man Zero
//! series ROM images.
//!
//! The pieces, leaf first:
//! - `fingerprint`: size / header / MD5 checks against the known-good table.
//! - `ips`: decoding IPS patch files into write and fill operations.
//! - `chain`: applying an ordered list of patches to a copy of an image.
//! - `fields`: reading and validated writing of fixed-offset integer tables.
//! - `transform` and `session`: scaling, randomizing, shuffling, and resetting
//!   field values during an edit.
//! - `config` and `plan`: serializable value snapshots and whole-job plans.
//!
//! All substantive logic lives here so it is testable without a frontend.
//! The core performs no logging; frontends report outcomes themselves.

pub mod chain;
pub mod config;
pub mod error;
pub mod fields;
pub mod fingerprint;
pub mod ips;
pub mod plan;
pub mod rom;
pub mod session;
pub mod transform;
pub mod variant;

pub use error::{MalformedReason, PatchError, Result, ValidationError};
pub use variant::Variant;

/// Returns the library version as encoded at compile time.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
