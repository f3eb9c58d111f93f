use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use zero_patch_core::fields::FieldTableKind;
use zero_patch_core::{fingerprint, rom, Variant};

use crate::sha256_file;

/// Parse a `--game` argument (`zero1`, `Zero 1`, `1`, ...).
pub fn parse_game(input: &str) -> Result<Variant> {
    Ok(input.parse::<Variant>()?)
}

/// Parse a `--table` argument (`cyber-elf-costs`, `weapon-exp`, ...).
pub fn parse_table(input: &str) -> Result<FieldTableKind> {
    Ok(input.parse::<FieldTableKind>()?)
}

/// One `--set NAME:POS=VALUE` assignment. `POS` is the 0-based position
/// among the field's editable entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetArg {
    pub field: String,
    pub position: usize,
    pub value: u32,
}

pub fn parse_set_arg(input: &str) -> Result<SetArg> {
    let (target, value) = input
        .rsplit_once('=')
        .ok_or_else(|| anyhow!("Invalid --set {input:?}: expected NAME:POS=VALUE"))?;
    let (field, position) = target
        .rsplit_once(':')
        .ok_or_else(|| anyhow!("Invalid --set {input:?}: expected NAME:POS=VALUE"))?;
    let field = field.trim();
    if field.is_empty() {
        return Err(anyhow!("Invalid --set {input:?}: field name is required"));
    }
    let position = position
        .trim()
        .parse::<usize>()
        .with_context(|| format!("Invalid --set {input:?}: bad position"))?;
    let value = value
        .trim()
        .parse::<u32>()
        .with_context(|| format!("Invalid --set {input:?}: bad value"))?;
    Ok(SetArg { field: field.to_string(), position, value })
}

/// Read a ROM image, attaching the path to any error.
pub fn load_rom(path: &Path) -> Result<Vec<u8>> {
    rom::read_image(path).with_context(|| format!("Failed to read ROM {}", path.display()))
}

/// Write a ROM image atomically and return the SHA-256 of what landed on disk.
pub fn write_rom(path: &Path, bytes: &[u8]) -> Result<String> {
    rom::write_image(path, bytes)
        .with_context(|| format!("Failed to write ROM {}", path.display()))?;
    sha256_file(path)
}

/// Log, but do not fail on, a verification mismatch for commands that only
/// touch field tables.
pub fn warn_if_unverified(image: &[u8], game: Variant) {
    let report = fingerprint::validate(image, game);
    for discrepancy in &report.discrepancies {
        tracing::warn!(game = %game, "{discrepancy}");
    }
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let body = serde_json::to_string_pretty(value).context("Failed to serialize JSON output")?;
    println!("{body}");
    Ok(())
}
