use clap::Parser;
use tracing_subscriber::EnvFilter;

use docxfix::NormalizeOptions;

mod cli;
use cli::commands::{run_batch, Mode};
use cli::inspect::run_inspect;
use cli::{Cli, Commands};

/// Log to stderr, filtered by `RUST_LOG` (default: warnings and errors).
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Normalize {
            paths,
            parts,
            no_backup,
            dry_run,
            json,
        } => {
            let options = NormalizeOptions {
                parts,
                backup: !no_backup,
                dry_run,
            };
            run_batch(&paths, &options, Mode::Normalize, json)
        }
        Commands::Check { paths, parts, json } => {
            let options = NormalizeOptions {
                parts,
                backup: false,
                dry_run: true,
            };
            run_batch(&paths, &options, Mode::Check, json)
        }
        Commands::Inspect { file, part } => run_inspect(&file, &part).map(|()| true),
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    }
}
