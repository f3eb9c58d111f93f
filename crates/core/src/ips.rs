//! IPS patch decoding.
//!
//! Layout: the 5-byte `PATCH` magic, then records of a 3-byte big-endian
//! offset and a 2-byte big-endian length. A nonzero length is followed by
//! that many literal bytes. A zero length is followed by a 2-byte run length
//! and a single fill byte. The 3-byte offset `EOF` ends the record list;
//! anything after it is ignored.

use crate::error::{MalformedReason, PatchError, Result};

pub const MAGIC: &[u8; 5] = b"PATCH";

/// Offset value that terminates the record list.
pub const EOF_MARKER: &[u8; 3] = b"EOF";

/// One decoded record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchOp {
    /// Overwrite `data.len()` bytes starting at `offset`.
    Write { offset: usize, data: Vec<u8> },
    /// Write `byte` `len` times starting at `offset`.
    Fill { offset: usize, len: usize, byte: u8 },
}

impl PatchOp {
    pub fn offset(&self) -> usize {
        match self {
            PatchOp::Write { offset, .. } | PatchOp::Fill { offset, .. } => *offset,
        }
    }

    /// Number of bytes this op touches.
    pub fn len(&self) -> usize {
        match self {
            PatchOp::Write { data, .. } => data.len(),
            PatchOp::Fill { len, .. } => *len,
        }
    }

    /// A zero-length fill, which touches nothing.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ensure the op fits inside a buffer of `image_len` bytes.
    pub fn check_bounds(&self, image_len: usize) -> Result<()> {
        let offset = self.offset();
        let len = self.len();
        match offset.checked_add(len) {
            Some(end) if end <= image_len => Ok(()),
            _ => Err(PatchError::OffsetOutOfRange { offset, len, image_len }),
        }
    }

    /// Apply the op to `image`. Never grows or shrinks the buffer.
    pub fn apply(&self, image: &mut [u8]) -> Result<()> {
        self.check_bounds(image.len())?;
        let offset = self.offset();
        let target = &mut image[offset..offset + self.len()];
        match self {
            PatchOp::Write { data, .. } => target.copy_from_slice(data),
            PatchOp::Fill { byte, .. } => target.fill(*byte),
        }
        Ok(())
    }
}

/// A decoded patch file, records in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpsPatch {
    name: String,
    ops: Vec<PatchOp>,
}

impl IpsPatch {
    /// Decode `bytes`. `name` is only used for error messages and reporting.
    pub fn parse(name: impl Into<String>, bytes: &[u8]) -> Result<Self> {
        let name = name.into();
        let malformed =
            |reason: MalformedReason| PatchError::MalformedPatch { patch: name.clone(), reason };

        let mut reader = Reader::new(bytes);
        match reader.take(MAGIC.len()) {
            Some(magic) if magic == MAGIC => {}
            _ => return Err(malformed(MalformedReason::MissingMagic)),
        }

        let mut ops = Vec::new();
        loop {
            let record_start = reader.pos;
            let offset_bytes = match reader.take(3) {
                Some(b) => b,
                None if reader.remaining() == 0 => {
                    return Err(malformed(MalformedReason::MissingEof))
                }
                None => {
                    return Err(malformed(MalformedReason::TruncatedRecord { at: record_start }))
                }
            };
            if offset_bytes == EOF_MARKER {
                break;
            }
            let offset = be24(offset_bytes);
            let truncated = || malformed(MalformedReason::TruncatedRecord { at: record_start });

            let len = reader.read_u16_be().ok_or_else(truncated)? as usize;
            if len > 0 {
                let data = reader.take(len).ok_or_else(truncated)?.to_vec();
                ops.push(PatchOp::Write { offset, data });
            } else {
                let run = reader.read_u16_be().ok_or_else(truncated)? as usize;
                let byte = reader.take(1).ok_or_else(truncated)?[0];
                ops.push(PatchOp::Fill { offset, len: run, byte });
            }
        }

        Ok(Self { name, ops })
    }

    /// Build a patch directly from ops.
    pub fn from_ops(name: impl Into<String>, ops: Vec<PatchOp>) -> Self {
        Self { name: name.into(), ops }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ops(&self) -> &[PatchOp] {
        &self.ops
    }

    /// Apply every op in file order. All ops are bounds-checked first, so a
    /// failing patch leaves `image` untouched. Empty ops are skipped.
    pub fn apply_to(&self, image: &mut [u8]) -> Result<()> {
        let ops = || self.ops.iter().filter(|op| !op.is_empty());
        for op in ops() {
            op.check_bounds(image.len())?;
        }
        for op in ops() {
            op.apply(image)?;
        }
        Ok(())
    }
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    fn take(&mut self, n: usize) -> Option<&'a [u8]> {
        if self.remaining() < n {
            return None;
        }
        let slice = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        Some(slice)
    }

    fn read_u16_be(&mut self) -> Option<u16> {
        self.take(2).map(|b| u16::from_be_bytes([b[0], b[1]]))
    }
}

fn be24(bytes: &[u8]) -> usize {
    ((bytes[0] as usize) << 16) | ((bytes[1] as usize) << 8) | bytes[2] as usize
}
