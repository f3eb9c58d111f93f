use std::path::Path;

use anyhow::{Context, Result};
use zero_patch_core::chain::{DirPatchSource, PatchSource};
use zero_patch_core::plan::PatchPlan;

use crate::commands::patch::report_outcome;
use crate::commands::load_rom;

/// Execute a YAML or JSON patch plan against `rom`, writing `out` only if
/// every step succeeds.
pub fn run_plan_command(plan_path: &Path, rom: &Path, out: &Path) -> Result<()> {
    let plan = PatchPlan::load(plan_path)
        .with_context(|| format!("Failed to load plan {}", plan_path.display()))?;

    let patch_dir = match &plan.patch_dir {
        Some(dir) => dir.clone(),
        None => plan_path.parent().map(Path::to_path_buf).unwrap_or_default(),
    };
    let source = DirPatchSource::new(&patch_dir);

    let image = load_rom(rom)?;
    tracing::info!(
        plan = %plan_path.display(),
        game = %plan.game,
        patches = plan.patches.len(),
        edits = plan.edits.len(),
        source = %source.describe(),
        "running plan"
    );
    let outcome = plan
        .execute(&image, &source)
        .with_context(|| format!("Plan {} failed", plan_path.display()))?;

    report_outcome(&plan, &outcome, out)
}
