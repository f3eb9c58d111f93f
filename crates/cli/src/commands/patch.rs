use std::path::Path;

use anyhow::{Context, Result};
use zero_patch_core::chain::{DirPatchSource, PatchSource};
use zero_patch_core::plan::{PatchPlan, PlanOutcome};

use crate::commands::{load_rom, parse_game, write_rom};

/// Verify a ROM, apply the selected patches in order, and write the result once.
pub fn patch_command(
    game: &str,
    rom: &Path,
    out: &Path,
    patch_dir: &Path,
    patches: &[String],
    allow_mismatch: bool,
) -> Result<()> {
    let mut plan = PatchPlan::new(parse_game(game)?);
    plan.patches = patches.to_vec();
    plan.patch_dir = Some(patch_dir.to_path_buf());
    plan.allow_mismatch = allow_mismatch;

    let image = load_rom(rom)?;
    let source = DirPatchSource::new(patch_dir);
    tracing::info!(
        game = %plan.game,
        patches = ?plan.patches,
        source = %source.describe(),
        "patching"
    );
    let outcome = plan
        .execute(&image, &source)
        .with_context(|| format!("Failed to patch {}", rom.display()))?;

    report_outcome(&plan, &outcome, out)
}

/// Log overridden mismatches, write the output image, and print a summary.
pub(crate) fn report_outcome(plan: &PatchPlan, outcome: &PlanOutcome, out: &Path) -> Result<()> {
    for discrepancy in &outcome.report.discrepancies {
        tracing::warn!(game = %plan.game, "verification overridden: {discrepancy}");
    }
    for name in &outcome.applied {
        tracing::debug!(patch = %name, "applied");
    }

    let sha256 = write_rom(out, &outcome.image)?;
    tracing::info!(out = %out.display(), "wrote patched image");

    println!("Patched {}:", plan.game);
    if outcome.applied.is_empty() {
        println!("  Patches: (none)");
    } else {
        println!("  Patches: {}", outcome.applied.join(", "));
    }
    if !outcome.edited.is_empty() {
        let tables: Vec<&str> = outcome.edited.iter().map(|t| t.slug()).collect();
        println!("  Tables:  {}", tables.join(", "));
    }
    println!("  Output:  {}", out.display());
    println!("  SHA-256: {sha256}");
    Ok(())
}
