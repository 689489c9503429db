//! Build command
//!
//! Run the full pipeline: meta module, source generation, native extensions

use anyhow::Result;
use caer_build::{
    Config, NativeBackend, NativeCompiler, Orchestrator, OutputLayout, detect_compiler_identity,
    env_vars, is_debug_enabled,
};
use std::path::{Path, PathBuf};

/// Build output directory when the config does not set one
const DEFAULT_BUILD_DIR: &str = "build";

/// Options for the build command
#[derive(Debug)]
pub(crate) struct BuildOptions {
    pub(crate) inplace: bool,
    pub(crate) jobs: Option<usize>,
    pub(crate) compiler: Option<String>,
    pub(crate) python: Option<String>,
    pub(crate) include_dirs: Vec<PathBuf>,
    pub(crate) progress: bool,
}

/// Build the package
pub(crate) fn run(root: &Path, config_path: Option<&Path>, options: &BuildOptions) -> Result<()> {
    let config = Config::load(config_path, root)?;

    // Merge settings with proper priority (CLI > Config > Env > Default)
    let python = options.python.as_deref().or(config.python.as_deref());
    let compiler = options.compiler.as_deref().or(config.compiler.as_deref());
    let jobs = options.jobs.or(config.jobs).or_else(env_vars::jobs);
    let build_dir = config
        .build_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_BUILD_DIR));

    let (interpreter, info) = super::checked_interpreter(python)?;
    let generator = super::source_generator(root, &interpreter, &config);
    let include_dirs = super::include_dirs(root, &info, &config, &options.include_dirs);

    let identity = detect_compiler_identity(compiler, env_vars::cc().as_deref());
    caer_build::debug!("compiler identity: {identity}");

    let backend = NativeBackend::new(
        NativeCompiler::new(&identity, is_debug_enabled()),
        root.to_path_buf(),
        OutputLayout::new(root, &build_dir, options.inplace),
        info,
    )
    .with_jobs(jobs)
    .with_progress(options.progress);

    let mut orchestrator = Orchestrator::new(super::project_layout(root, &config));
    let summary = orchestrator.run(
        &generator,
        &config.extension_table(),
        &include_dirs,
        &backend,
        &config.toolchain_flags(),
    )?;

    println!(
        "Built {} extensions in {:.2}s",
        summary.successful,
        summary.total_duration.as_secs_f64()
    );
    Ok(())
}
