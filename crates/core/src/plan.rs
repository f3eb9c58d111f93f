//! Patch plans: a serializable description of a whole patching job.
//!
//! A plan names the game, the ordered patch chain, and any field edits. It is
//! the explicit configuration a frontend hands to the core instead of
//! keeping selections in global state.
//!
//! ```yaml
//! game: zero2
//! patches: [blood, ex-skill]
//! patch_dir: patches
//! edits:
//!   - table: weapon-exp
//!     scale: "1/2"
//!   - table: cyber-elf-costs
//!     shuffle: 7
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::chain::{PatchChain, PatchSource};
use crate::config::FieldConfig;
use crate::error::{PatchError, Result};
use crate::fields::FieldTableKind;
use crate::fingerprint::{self, ValidationPolicy, ValidationReport};
use crate::session::EditSession;
use crate::variant::Variant;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchPlan {
    pub game: Variant,
    /// Patch ids, applied in this order.
    #[serde(default)]
    pub patches: Vec<String>,
    /// Directory holding the patch files (relative paths resolve against the plan file).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch_dir: Option<PathBuf>,
    /// Proceed even if the source image fails verification.
    #[serde(default)]
    pub allow_mismatch: bool,
    #[serde(default)]
    pub edits: Vec<FieldEdit>,
}

/// Edits applied to one table, in field order: `config`, `set`, `scale`,
/// `randomize`, `shuffle`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldEdit {
    pub table: FieldTableKind,
    /// Field config to import.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<PathBuf>,
    /// Replacement values per field, one per editable slot.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub set: BTreeMap<String, Vec<u32>>,
    /// Scale factor as text (`0.5`, `3/2`, `150%`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<String>,
    /// Seed for randomizing every value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub randomize: Option<u64>,
    /// Seed for shuffling values.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shuffle: Option<u64>,
}

impl FieldEdit {
    pub fn new(table: FieldTableKind) -> Self {
        Self {
            table,
            config: None,
            set: BTreeMap::new(),
            scale: None,
            randomize: None,
            shuffle: None,
        }
    }
}

/// Result of executing a plan.
#[derive(Debug, Clone)]
pub struct PlanOutcome {
    pub image: Vec<u8>,
    pub report: ValidationReport,
    /// File names of the applied patches, in order.
    pub applied: Vec<String>,
    /// Tables whose values were written.
    pub edited: Vec<FieldTableKind>,
}

impl PatchPlan {
    pub fn new(game: Variant) -> Self {
        Self {
            game,
            patches: Vec::new(),
            patch_dir: None,
            allow_mismatch: false,
            edits: Vec::new(),
        }
    }

    pub fn policy(&self) -> ValidationPolicy {
        if self.allow_mismatch {
            ValidationPolicy::AllowMismatch
        } else {
            ValidationPolicy::Strict
        }
    }

    pub fn from_yaml(body: &str) -> Result<Self> {
        serde_yaml::from_str(body)
            .map_err(|e| PatchError::Config { what: "patch plan".into(), reason: e.to_string() })
    }

    pub fn from_json(body: &str) -> Result<Self> {
        serde_json::from_str(body)
            .map_err(|e| PatchError::Config { what: "patch plan".into(), reason: e.to_string() })
    }

    /// Load a plan, picking the format from the extension (`.json`, else YAML).
    ///
    /// Relative paths inside the plan are resolved against the plan's directory.
    pub fn load(path: &Path) -> Result<Self> {
        let body = fs::read_to_string(path).map_err(|e| PatchError::io(path, e))?;
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        let mut plan = if is_json { Self::from_json(&body)? } else { Self::from_yaml(&body)? };
        if let Some(base) = path.parent() {
            plan.resolve_relative(base);
        }
        Ok(plan)
    }

    /// Rebase relative `patch_dir` and `config` paths onto `base`.
    pub fn resolve_relative(&mut self, base: &Path) {
        if let Some(dir) = self.patch_dir.as_mut() {
            if dir.is_relative() {
                *dir = base.join(&*dir);
            }
        }
        for edit in &mut self.edits {
            if let Some(config) = edit.config.as_mut() {
                if config.is_relative() {
                    *config = base.join(&*config);
                }
            }
        }
    }

    /// Verify `image`, apply the patch chain, then every field edit.
    ///
    /// Works on a copy; `image` is never modified and nothing is returned
    /// unless every step succeeds.
    pub fn execute(&self, image: &[u8], source: &dyn PatchSource) -> Result<PlanOutcome> {
        let report = fingerprint::validate(image, self.game);
        report.enforce(self.policy())?;

        let chain = PatchChain::resolve(self.game, &self.patches, source)?;
        let mut working = chain.apply(image)?;

        let mut edited = Vec::with_capacity(self.edits.len());
        for edit in &self.edits {
            apply_edit(self.game, edit, &mut working)?;
            edited.push(edit.table);
        }

        Ok(PlanOutcome { image: working, report, applied: chain.names(), edited })
    }
}

fn apply_edit(game: Variant, edit: &FieldEdit, image: &mut [u8]) -> Result<()> {
    let table = game.field_table(edit.table)?;
    let mut session = EditSession::open(table, image)?;

    if let Some(path) = &edit.config {
        session.apply_config(&FieldConfig::load(path)?)?;
    }
    for (field, values) in &edit.set {
        session.replace(field, values)?;
    }
    if let Some(factor) = &edit.scale {
        session.scale_str(factor)?;
    }
    if let Some(seed) = edit.randomize {
        session.randomize(&mut StdRng::seed_from_u64(seed))?;
    }
    if let Some(seed) = edit.shuffle {
        session.shuffle(&mut StdRng::seed_from_u64(seed))?;
    }

    session.commit(image)
}
