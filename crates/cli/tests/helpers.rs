#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use zero_patch_core::fingerprint::HEADER_RANGE;
use zero_patch_core::Variant;

pub const ZERO1_SABER: usize = 0x2A8184;

/// Write a Zero 1 sized image with the right header and a Z-Saber row.
///
/// The MD5 never matches, so patching needs `--allow-mismatch`.
pub fn write_zero1_image(dir: &Path) -> PathBuf {
    let mut image = vec![0u8; Variant::Zero1.spec().size];
    image[HEADER_RANGE].copy_from_slice(Variant::Zero1.spec().header);
    for (i, v) in [100u16, 200, 300, 400].iter().enumerate() {
        let at = ZERO1_SABER + i * 2;
        image[at..at + 2].copy_from_slice(&v.to_le_bytes());
    }
    image[0x2B727C..0x2B7280].copy_from_slice(&[0x10, 0x00, 0x20, 0x00]);
    let path = dir.join("zero1.gba");
    fs::write(&path, image).expect("write image");
    path
}

/// IPS file with one literal record.
pub fn ips(offset: u32, data: &[u8]) -> Vec<u8> {
    let mut out = b"PATCH".to_vec();
    out.extend_from_slice(&offset.to_be_bytes()[1..]);
    out.extend_from_slice(&(data.len() as u16).to_be_bytes());
    out.extend_from_slice(data);
    out.extend_from_slice(b"EOF");
    out
}

pub fn saber_values(image: &[u8]) -> Vec<u16> {
    (0..4)
        .map(|i| {
            let at = ZERO1_SABER + i * 2;
            u16::from_le_bytes([image[at], image[at + 1]])
        })
        .collect()
}
