//! ROM identity verification: size, cartridge header, and content hash.

use std::fmt;
use std::ops::Range;

use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};

use crate::error::{PatchError, Result};
use crate::variant::Variant;

/// Byte window holding the GBA game title, game code, and maker code.
pub const HEADER_RANGE: Range<usize> = 0xA0..0xB2;

pub const HEADER_LEN: usize = HEADER_RANGE.end - HEADER_RANGE.start;

/// Size, header bytes, and MD5 of an image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fingerprint {
    pub size: usize,
    /// Bytes found in `HEADER_RANGE`; shorter than `HEADER_LEN` for truncated images.
    pub header: Vec<u8>,
    /// Lowercase hex MD5 digest.
    pub md5: String,
}

impl Fingerprint {
    /// Compute the fingerprint of an in-memory image.
    pub fn of(image: &[u8]) -> Self {
        let start = HEADER_RANGE.start.min(image.len());
        let end = HEADER_RANGE.end.min(image.len());
        Self { size: image.len(), header: image[start..end].to_vec(), md5: md5_hex(image) }
    }
}

/// A single soft verification failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Discrepancy {
    SizeMismatch { expected: usize, actual: usize },
    HeaderMismatch { expected: String, actual: String },
    HashMismatch { expected: String, actual: String },
}

impl fmt::Display for Discrepancy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Discrepancy::SizeMismatch { expected, actual } => {
                write!(f, "size is {actual} bytes, expected {expected}")
            }
            Discrepancy::HeaderMismatch { expected, actual } => {
                write!(f, "header is \"{actual}\", expected \"{expected}\"")
            }
            Discrepancy::HashMismatch { expected, actual } => {
                write!(f, "MD5 is {actual}, expected {expected}")
            }
        }
    }
}

/// Whether verification failures stop the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationPolicy {
    /// Any discrepancy is an error.
    #[default]
    Strict,
    /// Discrepancies are reported but the caller proceeds.
    AllowMismatch,
}

/// Outcome of checking one image against one variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub variant: Variant,
    pub actual: Fingerprint,
    pub discrepancies: Vec<Discrepancy>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.discrepancies.is_empty()
    }

    /// Turn the report into an error unless it is clean or the policy allows mismatches.
    pub fn enforce(&self, policy: ValidationPolicy) -> Result<()> {
        if self.is_valid() || policy == ValidationPolicy::AllowMismatch {
            return Ok(());
        }
        Err(PatchError::Unverified {
            variant: self.variant.display_name().to_string(),
            discrepancies: self.discrepancies.clone(),
        })
    }
}

/// Check `image` against the compiled-in fingerprint for `variant`.
pub fn validate(image: &[u8], variant: Variant) -> ValidationReport {
    validate_against(image, variant, &variant.fingerprint())
}

/// Check `image` against an explicit expected fingerprint.
///
/// All three checks always run so every discrepancy is reported together.
pub fn validate_against(
    image: &[u8],
    variant: Variant,
    expected: &Fingerprint,
) -> ValidationReport {
    let actual = Fingerprint::of(image);
    let mut discrepancies = Vec::new();

    if actual.size != expected.size {
        discrepancies
            .push(Discrepancy::SizeMismatch { expected: expected.size, actual: actual.size });
    }

    if actual.header != expected.header {
        discrepancies.push(Discrepancy::HeaderMismatch {
            expected: printable(&expected.header),
            actual: printable(&actual.header),
        });
    }

    if !actual.md5.eq_ignore_ascii_case(&expected.md5) {
        discrepancies.push(Discrepancy::HashMismatch {
            expected: expected.md5.to_ascii_lowercase(),
            actual: actual.md5.clone(),
        });
    }

    ValidationReport { variant, actual, discrepancies }
}

/// Compute the MD5 of a byte buffer as lowercase hex.
pub fn md5_hex(bytes: &[u8]) -> String {
    format!("{:x}", Md5::digest(bytes))
}

fn printable(bytes: &[u8]) -> String {
    bytes.iter().flat_map(|b| std::ascii::escape_default(*b)).map(char::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn md5_of_empty_input_matches_reference() {
        assert_eq!(md5_hex(b""), "d41d8cd98f00b204e9800998ecf8427e");
    }

    #[test]
    fn short_image_reports_partial_header() {
        let fp = Fingerprint::of(&[0u8; 0xA4]);
        assert_eq!(fp.header, vec![0u8; 4]);
        assert_eq!(fp.size, 0xA4);
    }

    #[test]
    fn header_mismatch_is_escaped_for_display() {
        let d =
            Discrepancy::HeaderMismatch { expected: "AB".into(), actual: printable(&[0, b'A']) };
        assert_eq!(d.to_string(), "header is \"\\x00A\", expected \"AB\"");
    }
}
