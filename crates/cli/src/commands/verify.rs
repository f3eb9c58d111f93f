use std::path::Path;

use anyhow::{anyhow, Result};
use zero_patch_core::fingerprint;

use crate::commands::{load_rom, parse_game, print_json};

/// Check a ROM against the known-good fingerprint of `game`.
///
/// Every mismatch is reported; the command fails if there is at least one.
pub fn verify_command(game: &str, rom: &Path, json: bool) -> Result<()> {
    let variant = parse_game(game)?;
    let image = load_rom(rom)?;
    let report = fingerprint::validate(&image, variant);
    tracing::debug!(rom = %rom.display(), md5 = %report.actual.md5, "fingerprint computed");

    if json {
        print_json(&report)?;
    } else if report.is_valid() {
        println!("{}: OK ({})", variant, rom.display());
        println!("  MD5: {}", report.actual.md5);
    } else {
        println!("{}: MISMATCH ({})", variant, rom.display());
        for discrepancy in &report.discrepancies {
            println!("  - {discrepancy}");
        }
    }

    if report.is_valid() {
        Ok(())
    } else {
        Err(anyhow!(
            "{} does not match an unmodified {} ({} discrepancy(ies))",
            rom.display(),
            variant,
            report.discrepancies.len()
        ))
    }
}
