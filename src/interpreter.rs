//! Interpreter discovery and probing
//!
//! The package's interpreter runs the source generator and knows where its
//! own headers and the numeric-array runtime's headers live. We ask it once,
//! with a single probe script that prints JSON.

use crate::env_vars;
use crate::error::BuildError;
use semver::Version;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Oldest interpreter the package supports
pub const MIN_PYTHON_VERSION: &str = "3.6.1";

const PROBE_SCRIPT: &str = r#"import json, sys, sysconfig
info = {
    "version": "%d.%d.%d" % tuple(sys.version_info[:3]),
    "include": sysconfig.get_paths().get("include"),
    "ext_suffix": sysconfig.get_config_var("EXT_SUFFIX"),
    "numpy_include": None,
    "base_prefix": sys.base_prefix,
}
try:
    import numpy
    info["numpy_include"] = numpy.get_include()
except ImportError:
    pass
print(json.dumps(info))
"#;

/// What the interpreter reported about itself
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InterpreterInfo {
    /// MAJOR.MINOR.MICRO
    pub version: String,
    /// Interpreter C headers
    pub include: Option<PathBuf>,
    /// Suffix for compiled extension modules, e.g. `.cpython-311-x86_64-linux-gnu.so`
    pub ext_suffix: Option<String>,
    /// Numeric-array runtime headers, if the runtime is importable
    pub numpy_include: Option<PathBuf>,
    /// Installation prefix, used to find import libraries on Windows
    #[serde(default)]
    pub base_prefix: Option<PathBuf>,
}

impl InterpreterInfo {
    /// Extension module suffix, falling back to the platform default
    pub fn ext_suffix(&self) -> &str {
        self.ext_suffix
            .as_deref()
            .unwrap_or(if cfg!(windows) { ".pyd" } else { ".so" })
    }
}

/// A located interpreter executable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interpreter {
    path: PathBuf,
}

impl Interpreter {
    /// Use a specific executable without searching
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Find the interpreter. Names without a path separator are looked up
    /// in PATH; only executable files count.
    ///
    /// Priority order:
    /// 1. `explicit` (from `--python` or the tool config)
    /// 2. `PYTHON` environment variable
    /// 3. `python3`, then `python`, in PATH
    ///
    /// # Errors
    ///
    /// Returns `InterpreterNotFound` if none of these resolve.
    pub fn find(explicit: Option<&str>) -> Result<Self, BuildError> {
        if let Some(path) = explicit.map(str::to_string).or_else(env_vars::python) {
            return which::which(&path)
                .map(Self::at)
                .map_err(|e| BuildError::InterpreterNotFound(format!("{path}: {e}")));
        }

        ["python3", "python"]
            .iter()
            .find_map(|name| which::which(name).ok())
            .map(Self::at)
            .ok_or_else(|| {
                BuildError::InterpreterNotFound(
                    "no python3 or python in PATH (set PYTHON or pass --python)".to_string(),
                )
            })
    }

    /// Executable path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run the probe script and parse its report.
    ///
    /// # Errors
    ///
    /// Returns `InterpreterProbe` if the interpreter cannot be run, exits
    /// non-zero, or prints something other than the expected JSON.
    pub fn probe(&self) -> Result<InterpreterInfo, BuildError> {
        let probe_error = |reason: String| BuildError::InterpreterProbe {
            program: self.path.display().to_string(),
            reason,
        };

        let output = Command::new(&self.path)
            .arg("-c")
            .arg(PROBE_SCRIPT)
            .output()
            .map_err(|e| probe_error(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(probe_error(format!(
                "exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let info: InterpreterInfo = serde_json::from_str(stdout.trim())
            .map_err(|e| probe_error(format!("unexpected probe output: {e}")))?;

        tracing::debug!(
            interpreter = %self.path.display(),
            version = %info.version,
            "probed interpreter"
        );
        Ok(info)
    }
}

/// Check the interpreter against [`MIN_PYTHON_VERSION`].
///
/// # Errors
///
/// Returns `UnsupportedInterpreter` for a 2.x interpreter or one older than
/// the minimum, and `InterpreterProbe` if the reported version is not
/// MAJOR.MINOR.MICRO.
pub fn check_version(info: &InterpreterInfo) -> Result<(), BuildError> {
    check_version_against(&info.version, MIN_PYTHON_VERSION)
}

fn check_version_against(found: &str, required: &str) -> Result<(), BuildError> {
    let parse = |v: &str| {
        Version::parse(v).map_err(|e| BuildError::InterpreterProbe {
            program: "python".to_string(),
            reason: format!("unparseable version `{v}`: {e}"),
        })
    };
    let found_version = parse(found)?;
    let required_version = parse(required)?;

    if found_version.major < 3 || found_version < required_version {
        return Err(BuildError::UnsupportedInterpreter {
            found: found.to_string(),
            required: required.to_string(),
        });
    }
    Ok(())
}
