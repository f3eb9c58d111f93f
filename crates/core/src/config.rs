//! JSON snapshots of edited field values.
//!
//! ```json
//! { "game": "Zero 1", "table": "weapon-exp", "values": { "Buster Shot": [100, 250] } }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PatchError, Result, ValidationError};
use crate::fields::{FieldTable, FieldTableKind, FieldValueSet};
use crate::rom::write_atomic;
use crate::variant::Variant;

/// Directory used for default configs when the caller does not pick one.
pub const DEFAULT_CONFIG_DIR: &str = "default_configs";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldConfig {
    /// Display name of the game the values were taken from.
    pub game: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<FieldTableKind>,
    /// Editable values per field, in slot order.
    pub values: BTreeMap<String, Vec<u32>>,
}

impl FieldConfig {
    pub fn from_values(table: &FieldTable, values: &FieldValueSet) -> Self {
        let values = values.fields().iter().map(|f| (f.name.clone(), f.values())).collect();
        Self { game: table.variant.display_name().to_string(), table: Some(table.kind), values }
    }

    /// Overlay this config on `current`, returning the merged set.
    ///
    /// Fields the table does not know are ignored; a known field must supply
    /// exactly one value per editable slot.
    pub fn apply_to(&self, table: &FieldTable, current: &FieldValueSet) -> Result<FieldValueSet> {
        let expected_game = table.variant.display_name();
        if self.game != expected_game {
            return Err(ValidationError::WrongGame {
                expected: expected_game.to_string(),
                found: self.game.clone(),
            }
            .into());
        }
        if let Some(kind) = self.table {
            if kind != table.kind {
                return Err(ValidationError::WrongTable {
                    expected: table.kind.to_string(),
                    found: kind.to_string(),
                }
                .into());
            }
        }

        let mut merged = current.clone();
        for (name, values) in &self.values {
            if merged.get(name).is_none() {
                continue;
            }
            merged.replace(name, values)?;
        }
        Ok(merged)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| PatchError::Config { what: "field config".into(), reason: e.to_string() })
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| PatchError::Config { what: "field config".into(), reason: e.to_string() })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let body = fs::read_to_string(path).map_err(|e| PatchError::io(path, e))?;
        Self::from_json(&body)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| PatchError::io(parent, e))?;
        }
        write_atomic(path, self.to_json()?.as_bytes())
    }

    /// `<dir>/default_<stem>_<Game>.json`, e.g. `default_cyberelf_Zero1.json`.
    pub fn default_path(dir: &Path, variant: Variant, kind: FieldTableKind) -> PathBuf {
        dir.join(format!("default_{}_{}.json", kind.config_stem(), variant.compact_name()))
    }

    /// Load the default config for a table if one has been saved.
    pub fn load_default(
        dir: &Path,
        variant: Variant,
        kind: FieldTableKind,
    ) -> Result<Option<Self>> {
        let path = Self::default_path(dir, variant, kind);
        if !path.is_file() {
            return Ok(None);
        }
        Self::load(&path).map(Some)
    }
}
