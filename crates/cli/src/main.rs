use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use zero_patcher::commands::{
    edit_fields_command, export_fields_command, patch_command, run_plan_command,
    show_fields_command, variants_command, verify_command, FieldEditOptions,
};
use zero_patcher::init_tracing;

/// Verify, patch, and edit Mega Man Zero series ROM images.
///
/// This CLI is a thin wrapper around `zero-patch-core` (exposed in code as
/// `zero_patch_core`). All substantive logic lives in the library so it can
/// be tested thoroughly and reused from other frontends.
#[derive(Parser, Debug)]
#[command(
    name = "zero-patcher",
    version,
    about = "Verify, patch, and edit Mega Man Zero ROM images",
    long_about = None
)]
struct Cli {
    /// Log debug events to stderr (overrides RUST_LOG).
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List supported games, their fingerprints, patches, and tables.
    Variants {
        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Check a ROM against the known-good size, header, and MD5.
    ///
    /// Every mismatch is reported. Exits non-zero if there is any.
    Verify {
        /// Game to check against (zero1..zero4, "Zero 2", 3, ...).
        #[arg(long)]
        game: String,

        /// Path to the ROM image.
        #[arg(long)]
        rom: PathBuf,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Apply IPS patches in order and write the result once.
    Patch {
        #[arg(long)]
        game: String,

        /// Source ROM image. Never modified.
        #[arg(long)]
        rom: PathBuf,

        /// Output image path.
        #[arg(long)]
        out: PathBuf,

        /// Directory holding patch files (`<dir>/<game>/<file>` is tried first).
        #[arg(long, default_value = "patches")]
        patch_dir: PathBuf,

        /// Patch id to apply (blood, ex-skill, vocal). Repeat to chain.
        #[arg(long = "patch", required = true)]
        patches: Vec<String>,

        /// Proceed even if the source ROM fails verification.
        #[arg(long, default_value_t = false)]
        allow_mismatch: bool,
    },

    /// Inspect or edit a field table.
    #[command(subcommand)]
    Fields(FieldsCommand),

    /// Execute a YAML or JSON patch plan.
    Run {
        /// Plan file (`.json` is parsed as JSON, anything else as YAML).
        #[arg(long)]
        plan: PathBuf,

        #[arg(long)]
        rom: PathBuf,

        #[arg(long)]
        out: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
enum FieldsCommand {
    /// Print the editable values of a table, with its saved default applied.
    Show {
        #[arg(long)]
        game: String,

        /// Table to read (cyber-elf-costs, weapon-exp).
        #[arg(long)]
        table: String,

        #[arg(long)]
        rom: PathBuf,

        /// Directory for default configs (defaults to `default_configs`).
        #[arg(long)]
        config_dir: Option<PathBuf>,

        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Edit a table and write the image.
    ///
    /// The table's saved default config is applied first. Steps then run in
    /// this order: --import, --preset or --scale, --randomize, --shuffle,
    /// --set. Nothing is written unless all of them succeed.
    Edit {
        #[arg(long)]
        game: String,

        #[arg(long)]
        table: String,

        #[arg(long)]
        rom: PathBuf,

        /// Output image. Defaults to rewriting --rom.
        #[arg(long)]
        out: Option<PathBuf>,

        /// Field config (JSON) to load values from.
        #[arg(long)]
        import: Option<PathBuf>,

        /// Scale by a preset factor: 1/6, 1/4, 1/2, 3/4, or 2.
        #[arg(long, conflicts_with = "scale")]
        preset: Option<String>,

        /// Scale factor: decimal (0.5), fraction (3/4), or percent (150%).
        #[arg(long)]
        scale: Option<String>,

        /// Randomize every value with this seed.
        #[arg(long)]
        randomize: Option<u64>,

        /// Shuffle non-graduated fields with this seed.
        #[arg(long)]
        shuffle: Option<u64>,

        /// Set one entry: NAME:POS=VALUE (POS is 0-based). Repeatable.
        #[arg(long)]
        set: Vec<String>,

        /// Write the edited values to this config file.
        #[arg(long)]
        export: Option<PathBuf>,

        /// Save the edited values as this table's default config.
        #[arg(long, default_value_t = false)]
        save_default: bool,

        /// Directory for default configs (defaults to `default_configs`).
        #[arg(long)]
        config_dir: Option<PathBuf>,
    },

    /// Save a table's current values as a field config.
    Export {
        #[arg(long)]
        game: String,

        #[arg(long)]
        table: String,

        #[arg(long)]
        rom: PathBuf,

        /// Directory for default configs (defaults to `default_configs`).
        #[arg(long)]
        config_dir: Option<PathBuf>,

        /// Config file to write.
        #[arg(long)]
        out: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    match cli.command {
        Command::Variants { json } => variants_command(json)?,
        Command::Verify { game, rom, json } => verify_command(&game, &rom, json)?,
        Command::Patch { game, rom, out, patch_dir, patches, allow_mismatch } => {
            patch_command(&game, &rom, &out, &patch_dir, &patches, allow_mismatch)?
        }
        Command::Fields(FieldsCommand::Show { game, table, rom, config_dir, json }) => {
            show_fields_command(&game, &table, &rom, config_dir.as_deref(), json)?
        }
        Command::Fields(FieldsCommand::Edit {
            game,
            table,
            rom,
            out,
            import,
            preset,
            scale,
            randomize,
            shuffle,
            set,
            export,
            save_default,
            config_dir,
        }) => edit_fields_command(&FieldEditOptions {
            game,
            table,
            rom,
            out,
            import,
            set,
            preset,
            scale,
            randomize,
            shuffle,
            export,
            save_default,
            config_dir,
        })?,
        Command::Fields(FieldsCommand::Export { game, table, rom, config_dir, out }) => {
            export_fields_command(&game, &table, &rom, config_dir.as_deref(), &out)?
        }
        Command::Run { plan, rom, out } => run_plan_command(&plan, &rom, &out)?,
    }

    Ok(())
}
