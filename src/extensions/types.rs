//! Extension type definitions
//!
//! An [`ExtensionDescriptor`] is everything the backend needs to compile one
//! native module: its dotted module name, its sources, and include paths.

use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// One native module to compile
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtensionDescriptor {
    /// Dotted module name (e.g., "caer.cconvolve")
    pub name: String,

    /// Source files relative to the build root, in compile order
    pub sources: Vec<PathBuf>,

    /// Header search paths shared by every source
    pub include_dirs: BTreeSet<PathBuf>,

    /// Compiler-specific arguments; `None` leaves the backend defaults alone
    pub extra_compile_args: Option<Vec<String>>,
}

impl ExtensionDescriptor {
    /// Create a descriptor with no extra compile arguments
    pub fn new(
        name: impl Into<String>,
        sources: Vec<PathBuf>,
        include_dirs: BTreeSet<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            sources,
            include_dirs,
            extra_compile_args: None,
        }
    }

    /// Whether any source needs the C++ compiler
    pub fn is_cpp(&self) -> bool {
        self.sources.iter().any(|s| is_cpp_source(s))
    }

    /// Output path of the linked module relative to an output directory,
    /// e.g. `caer/ndi/cndi.cpython-311-x86_64-linux-gnu.so`
    pub fn output_relative_path(&self, ext_suffix: &str) -> PathBuf {
        let mut parts: Vec<&str> = self.name.split('.').collect();
        let leaf = parts.pop().unwrap_or(self.name.as_str());

        let mut path: PathBuf = parts.iter().collect();
        path.push(format!("{leaf}{ext_suffix}"));
        path
    }
}

/// Whether a source file is C++ by extension
pub fn is_cpp_source(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("cpp" | "cc" | "cxx" | "C")
    )
}

/// Result of building one extension
#[derive(Debug)]
pub struct BuildResult {
    /// Dotted module name
    pub name: String,

    /// Whether the build succeeded
    pub success: bool,

    /// Build duration
    pub duration: Duration,

    /// Error message if failed
    pub error: Option<String>,

    /// Compiler output (stdout + stderr)
    pub output: String,

    /// Linked module, if the build succeeded
    pub artifact: Option<PathBuf>,
}

impl BuildResult {
    /// Create a successful build result
    #[must_use]
    pub const fn success(
        name: String,
        duration: Duration,
        output: String,
        artifact: PathBuf,
    ) -> Self {
        Self {
            name,
            success: true,
            duration,
            error: None,
            output,
            artifact: Some(artifact),
        }
    }

    /// Create a failed build result
    #[must_use]
    pub const fn failure(name: String, duration: Duration, error: String, output: String) -> Self {
        Self {
            name,
            success: false,
            duration,
            error: Some(error),
            output,
            artifact: None,
        }
    }
}

/// Totals over a set of build results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BuildSummary {
    pub successful: usize,
    pub failed: usize,
    pub total_duration: Duration,
}

impl BuildSummary {
    /// Summarize build results
    #[must_use]
    pub fn from_results(results: &[BuildResult]) -> Self {
        let successful = results.iter().filter(|r| r.success).count();
        Self {
            successful,
            failed: results.len() - successful,
            total_duration: results.iter().map(|r| r.duration).sum(),
        }
    }
}
