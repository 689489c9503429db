//! Build backend
//!
//! The orchestrator hands described extensions to a [`Backend`]. The backend
//! owns compilation; the only thing it learns about the rest of the pipeline
//! is the [`ToolchainHook`] it must call once it knows its compiler.

use super::compiler::NativeCompiler;
use super::toolchain::ToolchainHook;
use super::types::{BuildResult, BuildSummary, ExtensionDescriptor};
use crate::error::BuildError;
use crate::interpreter::InterpreterInfo;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

/// Compiles and links described extensions
pub trait Backend {
    /// Build every extension. Implementations must call `hook` with their
    /// compiler identity before compiling anything.
    fn build(
        &self,
        extensions: Vec<ExtensionDescriptor>,
        hook: &dyn ToolchainHook,
    ) -> Result<BuildSummary, BuildError>;
}

/// Where the native backend puts its output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    /// Object files, one sub-directory per extension
    pub temp_dir: PathBuf,
    /// Linked modules, laid out by dotted name
    pub output_dir: PathBuf,
}

impl OutputLayout {
    /// `build/temp` and `build/lib` under `build_dir`, or modules next to
    /// their sources when `inplace` is set
    pub fn new(build_root: &Path, build_dir: &Path, inplace: bool) -> Self {
        let build_dir = build_root.join(build_dir);
        Self {
            temp_dir: build_dir.join("temp"),
            output_dir: if inplace {
                build_root.to_path_buf()
            } else {
                build_dir.join("lib")
            },
        }
    }
}

/// Backend that drives the system C/C++ toolchain directly
#[derive(Debug)]
pub struct NativeBackend {
    compiler: NativeCompiler,
    build_root: PathBuf,
    layout: OutputLayout,
    python: InterpreterInfo,
    jobs: Option<usize>,
    show_progress: bool,
}

impl NativeBackend {
    /// Create a native backend
    pub const fn new(
        compiler: NativeCompiler,
        build_root: PathBuf,
        layout: OutputLayout,
        python: InterpreterInfo,
    ) -> Self {
        Self {
            compiler,
            build_root,
            layout,
            python,
            jobs: None,
            show_progress: false,
        }
    }

    /// Limit parallel compilation to `jobs` extensions at a time
    #[must_use]
    pub const fn with_jobs(mut self, jobs: Option<usize>) -> Self {
        self.jobs = jobs;
        self
    }

    /// Show a progress bar while compiling
    #[must_use]
    pub const fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(len as u64);
        pb.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
        );
        pb
    }
}

impl Backend for NativeBackend {
    fn build(
        &self,
        extensions: Vec<ExtensionDescriptor>,
        hook: &dyn ToolchainHook,
    ) -> Result<BuildSummary, BuildError> {
        let extensions = hook.configure(self.compiler.identity(), extensions);

        tracing::info!(
            compiler = self.compiler.identity(),
            count = extensions.len(),
            "building extensions"
        );

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.jobs.unwrap_or(0))
            .build()
            .map_err(|e| BuildError::BackendFailure(format!("Failed to start workers: {e}")))?;

        let pb = self.progress_bar(extensions.len());
        let results: Vec<BuildResult> = pool.install(|| {
            extensions
                .par_iter()
                .map(|extension| {
                    pb.set_message(extension.name.clone());
                    let result = self.compiler.compile_extension(
                        extension,
                        &self.build_root,
                        &self.layout.temp_dir,
                        &self.layout.output_dir,
                        &self.python,
                    );
                    pb.inc(1);
                    result
                })
                .collect()
        });
        pb.finish_and_clear();

        for result in &results {
            if let (true, Some(artifact)) = (result.success, &result.artifact) {
                tracing::info!("  OK {} -> {}", result.name, artifact.display());
            } else {
                tracing::error!(
                    "  FAIL {} - {}",
                    result.name,
                    result.error.as_deref().unwrap_or("unknown error")
                );
                if !result.output.trim().is_empty() {
                    tracing::error!("{}", result.output.trim_end());
                }
            }
        }

        let summary = BuildSummary::from_results(&results);
        if summary.failed > 0 {
            let failed: Vec<&str> = results
                .iter()
                .filter(|r| !r.success)
                .map(|r| r.name.as_str())
                .collect();
            let first_error = results
                .iter()
                .find_map(|r| r.error.as_deref())
                .unwrap_or("unknown error");
            return Err(BuildError::BackendFailure(format!(
                "{} of {} extensions failed ({}): {first_error}",
                summary.failed,
                results.len(),
                failed.join(", ")
            )));
        }

        Ok(summary)
    }
}
