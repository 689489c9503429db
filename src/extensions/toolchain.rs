//! Toolchain configuration
//!
//! Some compilers need extra switches for the generated C++ sources (MSVC
//! wants `/EHsc` for exception handling). The backend calls a
//! [`ToolchainHook`] right before compiling, passing the compiler identity it
//! detected.

use super::types::ExtensionDescriptor;
use std::collections::BTreeMap;
use std::path::Path;

/// Called by a backend just before it compiles
pub trait ToolchainHook: Sync {
    /// Return the extensions with any compiler-specific settings applied
    fn configure(
        &self,
        compiler_identity: &str,
        extensions: Vec<ExtensionDescriptor>,
    ) -> Vec<ExtensionDescriptor>;
}

impl<F> ToolchainHook for F
where
    F: Fn(&str, Vec<ExtensionDescriptor>) -> Vec<ExtensionDescriptor> + Sync,
{
    fn configure(
        &self,
        compiler_identity: &str,
        extensions: Vec<ExtensionDescriptor>,
    ) -> Vec<ExtensionDescriptor> {
        self(compiler_identity, extensions)
    }
}

/// Compiler identity → extra compile arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolchainFlags {
    flags: BTreeMap<String, Vec<String>>,
}

impl Default for ToolchainFlags {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ToolchainFlags {
    /// Use a custom mapping
    pub const fn new(flags: BTreeMap<String, Vec<String>>) -> Self {
        Self { flags }
    }

    /// Flags for the toolchains the generated sources are known to need
    pub fn builtin() -> Self {
        Self::new(BTreeMap::from([
            ("msvc".to_string(), vec!["/EHsc".to_string()]),
            ("intelw".to_string(), vec!["/EHsc".to_string()]),
        ]))
    }

    /// Flags for `compiler_identity`, if it has an entry
    pub fn get(&self, compiler_identity: &str) -> Option<&[String]> {
        self.flags.get(compiler_identity).map(Vec::as_slice)
    }

    /// Add or replace entries from another mapping
    #[must_use]
    pub fn merged(mut self, overrides: BTreeMap<String, Vec<String>>) -> Self {
        self.flags.extend(overrides);
        self
    }
}

impl ToolchainHook for ToolchainFlags {
    fn configure(
        &self,
        compiler_identity: &str,
        mut extensions: Vec<ExtensionDescriptor>,
    ) -> Vec<ExtensionDescriptor> {
        let Some(flags) = self.get(compiler_identity) else {
            tracing::debug!(compiler = compiler_identity, "no extra compile arguments");
            return extensions;
        };

        tracing::debug!(compiler = compiler_identity, ?flags, "applying extra compile arguments");
        for extension in &mut extensions {
            extension.extra_compile_args = Some(flags.to_vec());
        }
        extensions
    }
}

/// Work out the compiler identity, distutils style.
///
/// Priority: explicit override, then the basename of `cc` (usually `CC`),
/// then the target default (`msvc` for MSVC targets, `unix` elsewhere).
pub fn detect_compiler_identity(explicit: Option<&str>, cc: Option<&str>) -> String {
    if let Some(identity) = explicit {
        return identity.to_string();
    }

    if let Some(cc) = cc {
        // CC may carry arguments, e.g. "ccache gcc"
        let program = cc.split_whitespace().last().unwrap_or(cc);
        let stem = Path::new(program)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(program)
            .to_lowercase();

        return match stem.as_str() {
            "cl" | "clang-cl" => "msvc",
            "icl" => "intelw",
            s if s.contains("mingw32") => "mingw32",
            _ => "unix",
        }
        .to_string();
    }

    if cfg!(target_env = "msvc") {
        "msvc".to_string()
    } else {
        "unix".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use std::path::PathBuf;

    fn extensions() -> Vec<ExtensionDescriptor> {
        vec![
            ExtensionDescriptor::new(
                "caer.cconvex",
                vec![PathBuf::from("caer/cconvex.cpp")],
                BTreeSet::new(),
            ),
            ExtensionDescriptor::new(
                "caer.ndi.cndi",
                vec![PathBuf::from("caer/ndi/cndimage.c")],
                BTreeSet::new(),
            ),
        ]
    }

    #[test]
    fn msvc_gets_exception_handling_flag() {
        let configured = ToolchainFlags::builtin().configure("msvc", extensions());

        assert!(
            configured
                .iter()
                .all(|e| e.extra_compile_args == Some(vec!["/EHsc".to_string()]))
        );
    }

    #[test]
    fn unknown_compiler_is_left_alone() {
        let configured = ToolchainFlags::builtin().configure("gcc", extensions());

        assert_eq!(configured, extensions());
        assert!(configured.iter().all(|e| e.extra_compile_args.is_none()));
    }

    #[test]
    fn flags_overwrite_previous_arguments() {
        let mut exts = extensions();
        for e in &mut exts {
            e.extra_compile_args = Some(vec!["/O2".to_string(), "/W4".to_string()]);
        }

        let configured = ToolchainFlags::builtin().configure("intelw", exts);
        assert!(
            configured
                .iter()
                .all(|e| e.extra_compile_args == Some(vec!["/EHsc".to_string()]))
        );
    }

    #[test]
    fn merged_overrides_add_entries() {
        let flags = ToolchainFlags::builtin().merged(BTreeMap::from([(
            "unix".to_string(),
            vec!["-std=c++14".to_string()],
        )]));

        assert_eq!(flags.get("unix"), Some(&["-std=c++14".to_string()][..]));
        assert_eq!(flags.get("msvc"), Some(&["/EHsc".to_string()][..]));
    }

    #[test]
    fn closures_work_as_hooks() {
        let hook = |identity: &str, mut exts: Vec<ExtensionDescriptor>| {
            for e in &mut exts {
                e.extra_compile_args = Some(vec![format!("--for={identity}")]);
            }
            exts
        };

        let configured = hook.configure("unix", extensions());
        assert!(
            configured
                .iter()
                .all(|e| e.extra_compile_args == Some(vec!["--for=unix".to_string()]))
        );
    }

    #[test]
    fn detects_identity_from_cc() {
        assert_eq!(detect_compiler_identity(None, Some("cl.exe")), "msvc");
        assert_eq!(detect_compiler_identity(None, Some("icl.exe")), "intelw");
        assert_eq!(
            detect_compiler_identity(None, Some("x86_64-w64-mingw32-gcc")),
            "mingw32"
        );
        assert_eq!(detect_compiler_identity(None, Some("ccache gcc")), "unix");
        assert_eq!(detect_compiler_identity(Some("msvc"), Some("gcc")), "msvc");
    }
}
