//! Source generation
//!
//! Runs the transpiler that turns the package's numeric sources into C/C++
//! sources. It's the equivalent of:
//! ```bash
//! cd <build_root>
//! python tools/cythonize.py
//! ```
//! Only the exit status decides success. Output is passed through to the
//! terminal untouched.

use crate::error::BuildError;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Default generator script, relative to the build root
pub const DEFAULT_GENERATOR_SCRIPT: &str = "tools/cythonize.py";

/// Invokes the external source generator
#[derive(Debug, Clone)]
pub struct SourceGenerator {
    interpreter: PathBuf,
    build_root: PathBuf,
    script: PathBuf,
}

impl SourceGenerator {
    /// Create an invoker that runs `script` (relative to `build_root`) with
    /// `interpreter`.
    pub fn new(interpreter: &Path, build_root: &Path, script: impl Into<PathBuf>) -> Self {
        Self {
            interpreter: interpreter.to_path_buf(),
            build_root: build_root.to_path_buf(),
            script: script.into(),
        }
    }

    /// Full path of the generator script
    pub fn script_path(&self) -> PathBuf {
        self.build_root.join(&self.script)
    }

    /// Run the generator and block until it exits. There is no timeout.
    ///
    /// # Errors
    ///
    /// - `GeneratorLaunch` if the interpreter cannot be started
    /// - `GenerationFailed` with the exit code for any non-zero exit
    pub fn generate(&self) -> Result<(), BuildError> {
        let script = self.script_path();
        tracing::info!(script = %script.display(), "generating native sources");

        let status = Command::new(&self.interpreter)
            .arg(&script)
            .current_dir(&self.build_root)
            .stdin(Stdio::null())
            .status()
            .map_err(|source| BuildError::GeneratorLaunch {
                program: self.interpreter.display().to_string(),
                source,
            })?;

        if !status.success() {
            return Err(BuildError::GenerationFailed {
                code: status.code(),
            });
        }

        tracing::debug!("source generation finished");
        Ok(())
    }
}
