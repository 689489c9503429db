//! Build errors
//!
//! Every error here is fatal to the current build invocation. Nothing in the
//! pipeline retries or recovers; the CLI turns these into a non-zero exit.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the individual pipeline stages
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Missing expected section [{section}] in {path}")]
    MissingConfigSection { section: String, path: PathBuf },

    #[error("Missing expected setting: {key} (section [{section}])")]
    MissingConfigKey { section: String, key: String },

    #[error("Invalid value for {key}: {reason}")]
    InvalidConfigValue { key: String, reason: String },

    #[error("Resource not found: {}", path.display())]
    ResourceNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {}", path.display())]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to launch source generator {program}")]
    GeneratorLaunch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Running the source generator failed with exit code: {}", display_code(*code))]
    GenerationFailed { code: Option<i32> },

    #[error("Interpreter not found: {0}")]
    InterpreterNotFound(String),

    #[error("Failed to probe interpreter {program}: {reason}")]
    InterpreterProbe { program: String, reason: String },

    #[error("You are using Python {found}. Python >={required} is required.")]
    UnsupportedInterpreter { found: String, required: String },

    #[error("Backend failed: {0}")]
    BackendFailure(String),

    #[error("Pipeline step out of order: expected state {expected}, found {found}")]
    OutOfOrder { expected: String, found: String },
}

impl BuildError {
    /// Exit code the CLI should use for this error.
    ///
    /// The interpreter version gate exits with `-1`; everything else is a
    /// plain failure.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::UnsupportedInterpreter { .. } => -1,
            _ => 1,
        }
    }
}

fn display_code(code: Option<i32>) -> String {
    code.map_or_else(|| "unknown (terminated by signal)".to_string(), |c| c.to_string())
}

/// Pipeline stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    /// Metadata validation, contributor reading and meta module writing
    Meta,
    /// External source generation
    Generate,
    /// Extension descriptor construction
    Describe,
    /// Compilation by the backend
    Backend,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Meta => "meta",
            Self::Generate => "generate",
            Self::Describe => "describe",
            Self::Backend => "backend",
        };
        f.write_str(name)
    }
}

/// A stage error tagged with the stage that raised it
#[derive(Debug, Error)]
#[error("{stage} stage failed")]
pub struct PipelineFailure {
    pub stage: Stage,
    #[source]
    pub error: BuildError,
}

impl PipelineFailure {
    /// Exit code for the process, see [`BuildError::exit_code`].
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        self.error.exit_code()
    }
}
