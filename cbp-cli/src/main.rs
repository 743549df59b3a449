// CLI application - panics are acceptable for fatal errors
#![allow(clippy::unwrap_used)]

mod json;
mod terminal;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use cbp::error::render_chain;
use cbp::{Config, Tree};

#[derive(Parser)]
#[clap(author, version, about = "Human-readable report generator for clang -ftime-trace traces")]
#[clap(propagate_version = true)]
struct Cli {
    /// Path to the config file (defaults to `.clang-build-profiler` if it exists)
    #[arg(short, long, default_value = cbp::config::DEFAULT_PATH)]
    config: PathBuf,

    /// Print the tree as JSON instead of the colored terminal report
    #[arg(long)]
    json: bool,

    /// Merge the analyzed trees across translation units instead of printing the raw build tree
    #[arg(long)]
    merge: bool,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a single `-ftime-trace` JSON file
    Trace { path: PathBuf },
    /// Analyze every trace file under a build-artifacts directory
    Target { path: PathBuf },
    /// Analyze a whole CMake build directory
    Build {
        #[arg(default_value = "build/")]
        path: PathBuf,
    },
}

fn run(cli: &Cli) -> cbp::Result<Tree> {
    tracing::info!(path = %cli.config.display(), "parsing config");
    let config = Config::from_file_or_default(&cli.config)?;
    config.validate()?;

    let mut tree = match &cli.command {
        Commands::Trace { path } => {
            tracing::info!(path = %path.display(), "analyzing translation unit");
            cbp::aggregate::analyze_translation_unit(path)?
        }
        Commands::Target { path } => {
            tracing::info!(path = %path.display(), "analyzing target");
            cbp::aggregate::analyze_target(path)?
        }
        Commands::Build { path } => {
            tracing::info!(path = %path.display(), "analyzing CMake build");
            cbp::aggregate::analyze_build(path)?
        }
    };

    if cli.merge {
        tracing::info!("merging trees across translation units");
        tree = cbp::merge::create_merge_summary(&tree)?.stages;
    }

    tracing::info!("preprocessing results");
    cbp::preprocess::preprocess(&mut tree, &config)?;

    Ok(tree)
}

fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(tree) => {
            if cli.json {
                json::print(&tree);
            } else {
                terminal::print(&tree);
            }
        }
        Err(e) => {
            eprintln!("Terminated due to error:\n{}", render_chain(&e));
            std::process::exit(1);
        }
    }
}
