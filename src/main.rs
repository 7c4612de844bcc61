//! The main entry point for the `treesub` command-line application.
//!
//! This file is responsible for parsing command-line arguments, setting up
//! logging and dispatching to the appropriate command in the `treesub` library.

use anyhow::Context;
use treesub::cli::{self, Commands};
use treesub::patterns::Preset;
use treesub::{file_renamer, replacer};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let args = cli::parse_args();
    init_tracing(args.verbose, args.quiet);

    match args.command {
        Commands::Rename {
            path,
            old_pattern,
            new_pattern,
            preset,
            regex,
            dry_run,
        } => file_renamer::run_rename(path.clone(), old_pattern, new_pattern, preset, regex, dry_run)
            .with_context(|| format!("rename under {} failed", path.display())),
        Commands::Replace {
            path,
            old_pattern,
            new_pattern,
            regex,
            dry_run,
        } => replacer::run_replace(path.clone(), old_pattern, new_pattern, regex, dry_run)
            .with_context(|| format!("replace under {} failed", path.display())),
        Commands::Presets => {
            for preset in Preset::all() {
                println!("{:<20} {}", preset.name(), preset.description());
            }
            Ok(())
        }
    }
}

/// Installs the global subscriber. `RUST_LOG` wins over the verbosity flags.
fn init_tracing(verbose: u8, quiet: bool) {
    let default_level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}
