//! caer-build command-line interface
//!
//! Build orchestrator for the caer package: writes the meta module, runs the
//! source generator and compiles the native extensions.

use caer_build::{BuildError, PipelineFailure};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;

/// Display an error and its causes
fn display_error(err: &anyhow::Error) {
    eprintln!("error: {err}");

    // Show error chain
    let mut source = err.source();
    while let Some(err) = source {
        eprintln!("caused by: {err}");
        source = err.source();
    }
}

/// Exit code for a failed command. The interpreter version gate exits `-1`.
fn exit_code(err: &anyhow::Error) -> i32 {
    err.chain()
        .find_map(|cause| {
            cause
                .downcast_ref::<PipelineFailure>()
                .map(PipelineFailure::exit_code)
                .or_else(|| cause.downcast_ref::<BuildError>().map(BuildError::exit_code))
        })
        .unwrap_or(1)
}

#[derive(Parser)]
#[command(name = "caer-build")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Build orchestrator for the caer package", long_about = None)]
pub(crate) struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Path to a caer-build config file (default: .caer-build.toml in the root)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Package root containing setup.cfg
    #[arg(long, global = true, value_name = "DIR", default_value = ".")]
    root: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate setup.cfg and the contributors file without writing anything
    Check,

    /// Write the generated meta module
    Meta,

    /// Write the meta module, generate sources and print the extension list
    Describe {
        /// Print descriptors as JSON
        #[arg(long)]
        json: bool,

        /// Extra include directory (repeatable)
        #[arg(long = "include-dir", value_name = "DIR")]
        include_dirs: Vec<PathBuf>,

        /// Interpreter executable (default: $PYTHON, then python3 in PATH)
        #[arg(long, env = "PYTHON")]
        python: Option<String>,
    },

    /// Run the full build
    Build {
        /// Place compiled modules next to their sources
        #[arg(long)]
        inplace: bool,

        /// Number of extensions compiled in parallel
        #[arg(long, short = 'j')]
        jobs: Option<usize>,

        /// Compiler identity override (e.g., unix, msvc, mingw32)
        #[arg(long)]
        compiler: Option<String>,

        /// Interpreter executable (default: $PYTHON, then python3 in PATH)
        #[arg(long, env = "PYTHON")]
        python: Option<String>,

        /// Extra include directory (repeatable)
        #[arg(long = "include-dir", value_name = "DIR")]
        include_dirs: Vec<PathBuf>,

        /// Hide the progress bar
        #[arg(long)]
        no_progress: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    caer_build::init_logging(cli.debug);

    let config_path = cli.config.as_deref();
    let root = cli.root.as_path();

    let result = match cli.command {
        Commands::Check => commands::check::run(root, config_path),
        Commands::Meta => commands::meta::run(root, config_path),
        Commands::Describe {
            json,
            include_dirs,
            python,
        } => commands::describe::run(
            root,
            config_path,
            &commands::describe::DescribeOptions {
                json,
                include_dirs,
                python,
            },
        ),
        Commands::Build {
            inplace,
            jobs,
            compiler,
            python,
            include_dirs,
            no_progress,
        } => commands::build::run(
            root,
            config_path,
            &commands::build::BuildOptions {
                inplace,
                jobs,
                compiler,
                python,
                include_dirs,
                progress: !no_progress,
            },
        ),
    };

    if let Err(e) = result {
        display_error(&e);
        process::exit(exit_code(&e));
    }
}

mod commands;
