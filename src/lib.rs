//! caer-build internal library code
//!
//! Build orchestration for caer: validate `setup.cfg`, write the generated
//! meta module, run the source generator, describe the native extensions and
//! compile them with per-toolchain flags.

pub mod config;
pub mod contributors;
pub mod debug;
pub mod env_vars;
pub mod error;
pub mod extensions;
pub mod generator;
pub mod interpreter;
pub mod meta_module;
pub mod metadata;
pub mod pipeline;
pub mod test_utils;

// Re-export common types for convenience
pub use config::Config;
pub use contributors::read_contributors;
pub use debug::{init_logging, is_debug_enabled};
pub use error::{BuildError, PipelineFailure, Stage};
pub use extensions::{
    Backend, BuildResult, BuildSummary, ExtensionDescriptor, ExtensionEntry, ExtensionTable,
    NativeBackend, NativeCompiler, OutputLayout, ToolchainFlags, ToolchainHook,
    detect_compiler_identity,
};
pub use generator::SourceGenerator;
pub use interpreter::{Interpreter, InterpreterInfo, MIN_PYTHON_VERSION, check_version};
pub use meta_module::{MetaModule, write_meta_module};
pub use metadata::{ConfigSource, MetadataRecord};
pub use pipeline::{Orchestrator, PipelineState, ProjectLayout};
