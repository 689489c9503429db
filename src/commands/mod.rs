//! Subcommand implementations
//!
//! Helpers shared by the subcommands that run the pipeline.

pub(crate) mod build;
pub(crate) mod check;
pub(crate) mod describe;
pub(crate) mod meta;

use anyhow::{Context, Result};
use caer_build::generator::DEFAULT_GENERATOR_SCRIPT;
use caer_build::{
    Config, Interpreter, InterpreterInfo, MIN_PYTHON_VERSION, ProjectLayout, SourceGenerator,
    check_version,
};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Pipeline file locations, with config overrides applied
pub(crate) fn project_layout(root: &Path, config: &Config) -> ProjectLayout {
    let mut layout = ProjectLayout::new(root);
    if let Some(contributors) = &config.contributors_file {
        layout.contributors.clone_from(contributors);
    }
    layout.meta_module.clone_from(&config.meta_module);
    layout
}

/// Locate and probe the interpreter, then apply the version gate.
///
/// The gate runs before anything is written.
pub(crate) fn checked_interpreter(explicit: Option<&str>) -> Result<(Interpreter, InterpreterInfo)> {
    let interpreter = Interpreter::find(explicit)?;
    let info = interpreter
        .probe()
        .with_context(|| format!("Failed to inspect {}", interpreter.path().display()))?;

    caer_build::debug!(
        "using {} (Python {}, requires >={MIN_PYTHON_VERSION})",
        interpreter.path().display(),
        info.version
    );
    check_version(&info)?;

    Ok((interpreter, info))
}

/// Source generator invoked through `interpreter` from the package root
pub(crate) fn source_generator(
    root: &Path,
    interpreter: &Interpreter,
    config: &Config,
) -> SourceGenerator {
    let script = config
        .generator_script
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_GENERATOR_SCRIPT));
    SourceGenerator::new(interpreter.path(), root, script)
}

/// Include directories for every extension: the numeric-array headers
/// reported by the interpreter, then config and command-line entries.
/// Relative entries resolve against the package root.
pub(crate) fn include_dirs(
    root: &Path,
    info: &InterpreterInfo,
    config: &Config,
    extra: &[PathBuf],
) -> BTreeSet<PathBuf> {
    let mut dirs: BTreeSet<PathBuf> = info.numpy_include.iter().cloned().collect();
    if dirs.is_empty() {
        tracing::warn!("numpy headers not found; extensions including them will not compile");
    }

    dirs.extend(
        config
            .include_dirs
            .iter()
            .chain(extra)
            .map(|dir| root.join(dir)),
    );
    dirs
}
