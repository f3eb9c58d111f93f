use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use zero_patch_core::config::{FieldConfig, DEFAULT_CONFIG_DIR};
use zero_patch_core::session::EditSession;

use crate::commands::{
    load_rom, parse_game, parse_set_arg, parse_table, print_json, warn_if_unverified, write_rom,
};

#[derive(Debug, Serialize)]
pub struct FieldRow {
    pub field: String,
    pub entries: Vec<EntryRow>,
}

#[derive(Debug, Serialize)]
pub struct EntryRow {
    pub index: usize,
    pub label: String,
    pub value: u32,
}

/// Options for `fields edit`.
///
/// The saved default config (if any) is loaded first. Steps then run as
/// import, preset or scale, randomize, shuffle, then `set`; the image and any
/// configs are written only after all of them succeed.
#[derive(Debug, Clone, Default)]
pub struct FieldEditOptions {
    pub game: String,
    pub table: String,
    pub rom: PathBuf,
    /// Output image; defaults to rewriting `rom`.
    pub out: Option<PathBuf>,
    pub import: Option<PathBuf>,
    /// Raw `NAME:POS=VALUE` assignments.
    pub set: Vec<String>,
    /// Label of one of the preset factors (`1/6`, `1/4`, `1/2`, `3/4`, `2`).
    pub preset: Option<String>,
    pub scale: Option<String>,
    pub randomize: Option<u64>,
    pub shuffle: Option<u64>,
    pub export: Option<PathBuf>,
    pub save_default: bool,
    /// Directory holding default configs; `default_configs` when unset.
    pub config_dir: Option<PathBuf>,
}

fn config_dir_or_default(config_dir: Option<&Path>) -> PathBuf {
    config_dir.map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_DIR))
}

/// Read the table and overlay the saved default config for it, if any.
fn open_session(
    game: &str,
    table: &str,
    rom: &Path,
    config_dir: Option<&Path>,
) -> Result<(Vec<u8>, EditSession)> {
    let variant = parse_game(game)?;
    let kind = parse_table(table)?;
    let table = variant.field_table(kind)?;
    let image = load_rom(rom)?;
    warn_if_unverified(&image, variant);
    let mut session = EditSession::open(table, &image)
        .with_context(|| format!("Failed to read {kind} from {}", rom.display()))?;
    apply_default_config(&mut session, &config_dir_or_default(config_dir));
    Ok((image, session))
}

/// A default that cannot be read or does not fit the table is skipped.
fn apply_default_config(session: &mut EditSession, dir: &Path) {
    let (variant, kind) = (session.table().variant, session.table().kind);
    let path = FieldConfig::default_path(dir, variant, kind);
    let applied = FieldConfig::load_default(dir, variant, kind)
        .and_then(|config| match config {
            Some(config) => session.apply_config(&config).map(|()| true),
            None => Ok(false),
        });
    match applied {
        Ok(true) => tracing::info!(config = %path.display(), "loaded default config"),
        Ok(false) => tracing::debug!(config = %path.display(), "no default config"),
        Err(e) => tracing::warn!(config = %path.display(), "ignoring default config: {e}"),
    }
}

fn rows(session: &EditSession) -> Vec<FieldRow> {
    session
        .current()
        .fields()
        .iter()
        .map(|field| {
            let desc = session.table().descriptor(&field.name);
            let entries = field
                .slots
                .iter()
                .map(|slot| EntryRow {
                    index: slot.index,
                    label: desc
                        .map(|d| d.label(slot.index))
                        .unwrap_or_else(|| format!("Entry {}", slot.index + 1)),
                    value: slot.value,
                })
                .collect();
            FieldRow { field: field.name.clone(), entries }
        })
        .collect()
}

fn print_rows(session: &EditSession) {
    let table = session.table();
    println!("{} - {}:", table.variant, table.kind);
    for row in rows(session) {
        println!("  {}:", row.field);
        if row.entries.is_empty() {
            println!("    (no editable entries)");
        }
        for (position, entry) in row.entries.iter().enumerate() {
            println!("    [{position}] {}: {}", entry.label, entry.value);
        }
    }
}

/// Print the current values of one table.
pub fn show_fields_command(
    game: &str,
    table: &str,
    rom: &Path,
    config_dir: Option<&Path>,
    json: bool,
) -> Result<()> {
    let (_image, session) = open_session(game, table, rom, config_dir)?;
    if json {
        return print_json(&rows(&session));
    }
    print_rows(&session);
    Ok(())
}

/// Save the current values of one table as a field config.
pub fn export_fields_command(
    game: &str,
    table: &str,
    rom: &Path,
    config_dir: Option<&Path>,
    out: &Path,
) -> Result<()> {
    let (_image, session) = open_session(game, table, rom, config_dir)?;
    session
        .to_config()
        .save(out)
        .with_context(|| format!("Failed to write config {}", out.display()))?;
    println!("Exported {} values to {}", session.table().kind, out.display());
    Ok(())
}

/// Apply edits to one table and write the image.
pub fn edit_fields_command(opts: &FieldEditOptions) -> Result<()> {
    let (mut image, mut session) =
        open_session(&opts.game, &opts.table, &opts.rom, opts.config_dir.as_deref())?;

    if let Some(path) = &opts.import {
        let config = FieldConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?;
        session.apply_config(&config)?;
        tracing::debug!(config = %path.display(), "imported values");
    }
    if let Some(label) = &opts.preset {
        let factor = session.scale_preset(label)?;
        tracing::debug!(%factor, "scaled by preset");
    }
    if let Some(factor) = &opts.scale {
        let factor = session.scale_str(factor)?;
        tracing::debug!(%factor, "scaled");
    }
    if let Some(seed) = opts.randomize {
        session.randomize(&mut StdRng::seed_from_u64(seed))?;
        tracing::debug!(seed, "randomized");
    }
    if let Some(seed) = opts.shuffle {
        session.shuffle(&mut StdRng::seed_from_u64(seed))?;
        tracing::debug!(seed, "shuffled");
    }
    for raw in &opts.set {
        let arg = parse_set_arg(raw)?;
        session.set(&arg.field, arg.position, arg.value)?;
        tracing::debug!(field = %arg.field, position = arg.position, value = arg.value, "set");
    }

    session.commit(&mut image)?;

    let out = opts.out.as_deref().unwrap_or(&opts.rom);
    let sha256 = write_rom(out, &image)?;
    tracing::info!(out = %out.display(), modified = session.is_modified(), "wrote edited image");

    print_rows(&session);
    println!("  Output:  {}", out.display());
    println!("  SHA-256: {sha256}");

    let config = session.to_config();
    if let Some(path) = &opts.export {
        config.save(path).with_context(|| format!("Failed to write config {}", path.display()))?;
        println!("Exported values to {}", path.display());
    }
    if opts.save_default {
        let dir = config_dir_or_default(opts.config_dir.as_deref());
        let table = session.table();
        let path = FieldConfig::default_path(&dir, table.variant, table.kind);
        config.save(&path).with_context(|| format!("Failed to write config {}", path.display()))?;
        println!("Saved default config to {}", path.display());
    }
    Ok(())
}
