//! Native compilation
//!
//! Compiles one extension descriptor into a loadable module. It's the
//! equivalent of what happens for each module during `build_ext`:
//! ```bash
//! cc -c -fPIC -I<numpy> -I<python> caer/cconvex.cpp -o build/temp/caer.cconvex/caer/cconvex.o
//! c++ -shared build/temp/caer.cconvex/caer/cconvex.o -o build/lib/caer/cconvex<suffix>
//! ```

use super::types::{BuildResult, ExtensionDescriptor, is_cpp_source};
use crate::env_vars;
use crate::interpreter::InterpreterInfo;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Instant;

/// Command-line conventions a compiler follows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompilerFamily {
    /// gcc/clang style (`-c`, `-o`, `-I`)
    Unix,
    /// cl.exe style (`/c`, `/Fo`, `/I`)
    Msvc,
}

impl CompilerFamily {
    /// Family for a distutils-style compiler identity
    pub fn from_identity(identity: &str) -> Self {
        match identity {
            "msvc" | "intelw" => Self::Msvc,
            _ => Self::Unix,
        }
    }

    const fn object_extension(self) -> &'static str {
        match self {
            Self::Unix => "o",
            Self::Msvc => "obj",
        }
    }
}

/// A program plus leading arguments, e.g. `ccache gcc`
#[derive(Debug, Clone, PartialEq, Eq)]
struct Program {
    path: String,
    args: Vec<String>,
}

impl Program {
    fn parse(spec: &str) -> Self {
        let mut parts = spec.split_whitespace().map(str::to_string);
        let path = parts.next().unwrap_or_else(|| spec.to_string());
        Self {
            path,
            args: parts.collect(),
        }
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.path);
        cmd.args(&self.args);
        cmd
    }
}

/// Compiler used by the native backend
#[derive(Debug, Clone)]
pub struct NativeCompiler {
    identity: String,
    family: CompilerFamily,
    cc: Program,
    cxx: Program,
    linker: Program,
    verbose: bool,
}

impl NativeCompiler {
    /// Create a compiler for `identity`, honoring `CC` and `CXX`.
    pub fn new(identity: &str, verbose: bool) -> Self {
        let family = CompilerFamily::from_identity(identity);
        let (default_cc, default_cxx, default_linker) = match (family, identity) {
            (CompilerFamily::Msvc, "intelw") => ("icl.exe", "icl.exe", "link.exe"),
            (CompilerFamily::Msvc, _) => ("cl.exe", "cl.exe", "link.exe"),
            (CompilerFamily::Unix, "mingw32") => ("gcc", "g++", "g++"),
            (CompilerFamily::Unix, _) => ("cc", "c++", "c++"),
        };

        let cc = env_vars::cc().unwrap_or_else(|| default_cc.to_string());
        let cxx = env_vars::cxx().unwrap_or_else(|| default_cxx.to_string());
        let linker = match family {
            CompilerFamily::Unix => cxx.clone(),
            CompilerFamily::Msvc => default_linker.to_string(),
        };

        Self {
            identity: identity.to_string(),
            family,
            cc: Program::parse(&cc),
            cxx: Program::parse(&cxx),
            linker: Program::parse(&linker),
            verbose,
        }
    }

    /// Distutils-style identity (e.g., "unix", "msvc")
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Command-line family
    pub const fn family(&self) -> CompilerFamily {
        self.family
    }

    /// Compile and link one extension.
    ///
    /// Objects go under `temp_dir/<name>/`, the module under `output_dir`.
    /// Source paths are resolved against `build_root`.
    #[must_use]
    pub fn compile_extension(
        &self,
        extension: &ExtensionDescriptor,
        build_root: &Path,
        temp_dir: &Path,
        output_dir: &Path,
        python: &InterpreterInfo,
    ) -> BuildResult {
        let start_time = Instant::now();
        let mut output = String::new();
        let fail = |error: String, output: String| {
            BuildResult::failure(extension.name.clone(), start_time.elapsed(), error, output)
        };

        let object_dir = temp_dir.join(&extension.name);
        let mut objects = Vec::with_capacity(extension.sources.len());

        for source in &extension.sources {
            let object = object_dir
                .join(source)
                .with_extension(self.family.object_extension());
            if let Some(parent) = object.parent()
                && let Err(e) = fs::create_dir_all(parent)
            {
                return fail(
                    format!("Failed to create {}: {e}", parent.display()),
                    output,
                );
            }

            let cmd = self.compile_command(extension, &build_root.join(source), &object, python);
            if let Err(e) = self.run(cmd, &format!("compile {}", source.display()), &mut output) {
                return fail(e, output);
            }
            objects.push(object);
        }

        let target = output_dir.join(extension.output_relative_path(python.ext_suffix()));
        if let Some(parent) = target.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            return fail(
                format!("Failed to create {}: {e}", parent.display()),
                output,
            );
        }

        let cmd = self.link_command(extension, &objects, &target, python);
        if let Err(e) = self.run(cmd, &format!("link {}", extension.name), &mut output) {
            return fail(e, output);
        }

        BuildResult::success(
            extension.name.clone(),
            start_time.elapsed(),
            output,
            target,
        )
    }

    fn compile_command(
        &self,
        extension: &ExtensionDescriptor,
        source: &Path,
        object: &Path,
        python: &InterpreterInfo,
    ) -> Command {
        let cpp = is_cpp_source(source);
        let mut cmd = if cpp { self.cxx.command() } else { self.cc.command() };

        let include_dirs = extension.include_dirs.iter().chain(python.include.as_ref());
        let env_flags = if cpp {
            env_vars::cxxflags()
        } else {
            env_vars::cflags()
        };
        let extra = extension.extra_compile_args.as_deref().unwrap_or_default();

        match self.family {
            CompilerFamily::Unix => {
                cmd.args(["-c", "-fPIC", "-O2"]);
                for dir in include_dirs {
                    cmd.arg(format!("-I{}", dir.display()));
                }
                cmd.args(&env_flags).args(extra);
                cmd.arg(source).arg("-o").arg(object);
            }
            CompilerFamily::Msvc => {
                cmd.args(["/nologo", "/c", "/O2", "/MD"]);
                for dir in include_dirs {
                    cmd.arg(format!("/I{}", dir.display()));
                }
                cmd.args(&env_flags).args(extra);
                let source_switch = if cpp { "/Tp" } else { "/Tc" };
                cmd.arg(format!("{source_switch}{}", source.display()));
                cmd.arg(format!("/Fo{}", object.display()));
            }
        }
        cmd
    }

    fn link_command(
        &self,
        extension: &ExtensionDescriptor,
        objects: &[PathBuf],
        target: &Path,
        python: &InterpreterInfo,
    ) -> Command {
        let mut cmd = match self.family {
            CompilerFamily::Unix if !extension.is_cpp() => self.cc.command(),
            _ => self.linker.command(),
        };

        match self.family {
            CompilerFamily::Unix => {
                cmd.arg("-shared").args(objects).args(env_vars::ldflags());
                if cfg!(target_os = "macos") {
                    cmd.args(["-undefined", "dynamic_lookup"]);
                }
                cmd.arg("-o").arg(target);
            }
            CompilerFamily::Msvc => {
                let leaf = extension.name.rsplit('.').next().unwrap_or(&extension.name);
                cmd.args(["/nologo", "/DLL"]).args(objects);
                if let Some(prefix) = &python.base_prefix {
                    cmd.arg(format!("/LIBPATH:{}", prefix.join("libs").display()));
                }
                cmd.arg(format!("/EXPORT:PyInit_{leaf}"));
                cmd.args(env_vars::ldflags());
                cmd.arg(format!("/OUT:{}", target.display()));
            }
        }
        cmd
    }

    /// Run a build command, appending its output
    fn run(&self, mut cmd: Command, what: &str, output: &mut String) -> Result<(), String> {
        if self.verbose {
            tracing::info!("  Running: {cmd:?}");
        } else {
            tracing::debug!("running {cmd:?}");
        }

        let result = cmd
            .output()
            .map_err(|e| format!("Failed to {what}: {e}"))?;

        output.push_str(&String::from_utf8_lossy(&result.stdout));
        output.push_str(&String::from_utf8_lossy(&result.stderr));

        if !result.status.success() {
            return Err(format!(
                "{what} failed with exit code: {}",
                result
                    .status
                    .code()
                    .map_or_else(|| "unknown".to_string(), |c| c.to_string())
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use std::ffi::OsStr;

    fn python() -> InterpreterInfo {
        InterpreterInfo {
            version: "3.11.4".to_string(),
            include: Some(PathBuf::from("/py/include")),
            ext_suffix: Some(".so".to_string()),
            numpy_include: None,
            base_prefix: Some(PathBuf::from("/py")),
        }
    }

    fn extension(sources: &[&str], extra: Option<Vec<String>>) -> ExtensionDescriptor {
        let mut ext = ExtensionDescriptor::new(
            "caer.cconvolve",
            sources.iter().map(PathBuf::from).collect(),
            BTreeSet::from([PathBuf::from("/numpy/include")]),
        );
        ext.extra_compile_args = extra;
        ext
    }

    fn args(cmd: &Command) -> Vec<String> {
        cmd.get_args()
            .map(OsStr::to_string_lossy)
            .map(std::borrow::Cow::into_owned)
            .collect()
    }

    fn compiler(identity: &str) -> NativeCompiler {
        let mut compiler = NativeCompiler::new(identity, false);
        // Independent of whatever CC/CXX the test environment sets
        compiler.cc = Program::parse("cc");
        compiler.cxx = Program::parse("c++");
        compiler
    }

    #[test]
    fn family_from_identity() {
        assert_eq!(CompilerFamily::from_identity("msvc"), CompilerFamily::Msvc);
        assert_eq!(CompilerFamily::from_identity("intelw"), CompilerFamily::Msvc);
        assert_eq!(CompilerFamily::from_identity("unix"), CompilerFamily::Unix);
        assert_eq!(CompilerFamily::from_identity("mingw32"), CompilerFamily::Unix);
    }

    #[test]
    fn program_keeps_wrapper_arguments() {
        let program = Program::parse("ccache gcc -m64");
        assert_eq!(program.path, "ccache");
        assert_eq!(program.args, vec!["gcc", "-m64"]);
    }

    #[test]
    fn unix_compile_command_includes_headers_and_extra_args() {
        let compiler = compiler("unix");
        let ext = extension(&["caer/cconvolve.cpp"], Some(vec!["-std=c++11".to_string()]));
        let cmd = compiler.compile_command(
            &ext,
            Path::new("/src/caer/cconvolve.cpp"),
            Path::new("/tmp/cconvolve.o"),
            &python(),
        );

        assert_eq!(cmd.get_program(), "c++");
        let args = args(&cmd);
        assert!(args.contains(&"-fPIC".to_string()));
        assert!(args.contains(&"-I/numpy/include".to_string()));
        assert!(args.contains(&"-I/py/include".to_string()));
        assert!(args.contains(&"-std=c++11".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("/tmp/cconvolve.o"));
    }

    #[test]
    fn c_sources_use_c_compiler() {
        let compiler = compiler("unix");
        let ext = extension(&["caer/ndi/cndimage.c"], None);
        let cmd = compiler.compile_command(
            &ext,
            Path::new("caer/ndi/cndimage.c"),
            Path::new("cndimage.o"),
            &python(),
        );
        assert_eq!(cmd.get_program(), "cc");
    }

    #[test]
    fn msvc_compile_command_uses_cl_switches() {
        let compiler = compiler("msvc");
        let ext = extension(&["caer/cconvex.cpp"], Some(vec!["/EHsc".to_string()]));
        let cmd = compiler.compile_command(
            &ext,
            Path::new("caer/cconvex.cpp"),
            Path::new("cconvex.obj"),
            &python(),
        );

        let args = args(&cmd);
        assert!(args.contains(&"/EHsc".to_string()));
        assert!(args.contains(&"/Tpcaer/cconvex.cpp".to_string()));
        assert!(args.contains(&"/Focconvex.obj".to_string()));
    }

    #[test]
    fn msvc_link_exports_module_init() {
        let compiler = compiler("msvc");
        let ext = extension(&["caer/cconvex.cpp"], None);
        let cmd = compiler.link_command(
            &ext,
            &[PathBuf::from("cconvex.obj")],
            Path::new("cconvolve.pyd"),
            &python(),
        );

        let args = args(&cmd);
        assert!(args.contains(&"/EXPORT:PyInit_cconvolve".to_string()));
        assert!(args.contains(&"/OUT:cconvolve.pyd".to_string()));
    }

    #[cfg(unix)]
    #[test]
    fn missing_source_fails_at_compile_time() {
        let temp = tempfile::TempDir::new().unwrap();
        let mut compiler = compiler("unix");
        // `false` stands in for a compiler that rejects the missing file
        compiler.cc = Program::parse("false");
        compiler.cxx = Program::parse("false");

        let ext = extension(&["caer/missing.cpp"], None);
        let result = compiler.compile_extension(
            &ext,
            temp.path(),
            &temp.path().join("build/temp"),
            &temp.path().join("build/lib"),
            &python(),
        );

        assert!(!result.success);
        assert!(result.error.unwrap().contains("compile caer/missing.cpp failed"));
    }
}
