//! Error types shared by every core operation.

use std::path::PathBuf;

use thiserror::Error;

use crate::fingerprint::Discrepancy;

/// Error type for verification, patching, and field editing.
#[derive(Debug, Error)]
pub enum PatchError {
    /// The image did not match its variant's fingerprint and the caller asked
    /// for strict verification.
    #[error(
        "ROM does not look like an unmodified {variant}: {}",
        join_discrepancies(.discrepancies)
    )]
    Unverified { variant: String, discrepancies: Vec<Discrepancy> },

    /// A patch file could not be decoded. Fatal for the whole chain.
    #[error("Malformed patch {patch}: {reason}")]
    MalformedPatch { patch: String, reason: MalformedReason },

    /// A write would run past the end of the image.
    #[error(
        "Write of {len} byte(s) at offset {offset:#08X} exceeds image length {image_len:#08X}"
    )]
    OffsetOutOfRange { offset: usize, len: usize, image_len: usize },

    /// Caller-supplied values were rejected before anything was written.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Underlying filesystem failure.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unknown game: {0} (expected one of zero1, zero2, zero3, zero4)")]
    UnknownVariant(String),

    #[error("Unknown patch: {0}")]
    UnknownPatch(String),

    #[error("Patch {patch} is not available for {variant}")]
    IneligiblePatch { patch: String, variant: String },

    #[error("Unknown table: {0} (expected cyber-elf-costs or weapon-exp)")]
    UnknownTableKind(String),

    #[error("{variant} has no {table} table")]
    UnknownTable { table: String, variant: String },

    /// A config or plan file could not be decoded.
    #[error("Failed to parse {what}: {reason}")]
    Config { what: String, reason: String },
}

/// Why a patch file was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedReason {
    #[error("missing PATCH header")]
    MissingMagic,
    #[error("record at byte {at} is truncated")]
    TruncatedRecord { at: usize },
    #[error("no EOF marker before end of file")]
    MissingEof,
}

/// Rejections raised while checking field values or scale factors.
///
/// Indices are slot indices within the field (0-based).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Value {value} for {field} entry {index} is out of range (1-{max})")]
    OutOfRange { field: String, index: usize, value: u32, max: u32 },

    #[error(
        "{field} must not decrease: entry {index} is {value} but the previous entry is {previous}"
    )]
    Decreasing { field: String, index: usize, value: u32, previous: u32 },

    #[error("Invalid scale factor {input:?}: {reason}")]
    InvalidScaleFactor { input: String, reason: String },

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("{field} has no editable entry {index}")]
    UnknownSlot { field: String, index: usize },

    #[error("{field} expects {expected} value(s), got {found}")]
    CountMismatch { field: String, expected: usize, found: usize },

    #[error("This config is for {found}, not {expected}")]
    WrongGame { expected: String, found: String },

    #[error("This config holds {found} values, not {expected}")]
    WrongTable { expected: String, found: String },
}

/// Convenience result type for core operations.
pub type Result<T> = std::result::Result<T, PatchError>;

impl PatchError {
    /// Build an `Io` error for the given path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PatchError::Io { path: path.into(), source }
    }
}

fn join_discrepancies(discrepancies: &[Discrepancy]) -> String {
    discrepancies.iter().map(|d| d.to_string()).collect::<Vec<_>>().join("; ")
}
