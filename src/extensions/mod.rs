//! Native extension building
//!
//! Describes the package's native modules and compiles them. The pieces:
//! - `table`: which sources make up which module
//! - `toolchain`: per-compiler extra arguments, applied through a hook
//! - `backend`: the [`Backend`] seam and the parallel native backend
//! - `compiler`: compile and link commands for one module

pub mod backend;
pub mod compiler;
pub mod table;
pub mod toolchain;
pub mod types;

pub use backend::{Backend, NativeBackend, OutputLayout};
pub use compiler::{CompilerFamily, NativeCompiler};
pub use table::{ExtensionEntry, ExtensionTable};
pub use toolchain::{ToolchainFlags, ToolchainHook, detect_compiler_identity};
pub use types::{BuildResult, BuildSummary, ExtensionDescriptor};
