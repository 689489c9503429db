//! Shared test helpers and utilities

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Path to the compiled caer-build binary
#[allow(dead_code)]
pub(crate) fn get_caer_build_binary() -> &'static str {
    env!("CARGO_BIN_EXE_caer-build")
}

/// A complete `setup.cfg` for caer 1.3.3
#[allow(dead_code)]
pub(crate) const SETUP_CFG: &str = r"[metadata]
name = caer
version = 1.3.3
release = true
user = jasmcaus
git_branch = master
author = Jason Dsouza
author_email = jason@example.com
contributors = CONTRIBUTORS
description = A Computer Vision library in Python
keywords = computer vision, deep learning
license = MIT
status = 5 - Production/Stable
audience = Developers
language = English
dev_language = Python
git_url = https://github.com/jasmcaus/caer
download_url = https://pypi.org/project/caer
classifiers =
    Development Status :: 5 - Production/Stable
    Programming Language :: Python :: 3

[options]
pip_requirements = numpy, opencv-contrib-python
min_python = 3.6.1
";

/// `SETUP_CFG` without the line setting `key`
#[allow(dead_code)]
pub(crate) fn setup_cfg_without(key: &str) -> String {
    let prefix = format!("{key} =");
    SETUP_CFG
        .lines()
        .filter(|line| !line.starts_with(&prefix))
        .map(|line| format!("{line}\n"))
        .collect()
}

/// Create a package checkout
///
/// Writes `setup.cfg`, `LONG_DESCRIPTION.md`, `CONTRIBUTORS`, the `caer/`
/// package directory and an empty `caer-build.toml` so a user-level config
/// on the test machine is never picked up.
#[allow(dead_code)]
pub(crate) fn create_package(setup_cfg: &str, contributors: &str) -> TempDir {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let root = temp_dir.path();

    fs::write(root.join("setup.cfg"), setup_cfg).expect("Failed to write setup.cfg");
    fs::write(root.join("LONG_DESCRIPTION.md"), "# Caer\n")
        .expect("Failed to write long description");
    fs::write(root.join("CONTRIBUTORS"), contributors).expect("Failed to write CONTRIBUTORS");
    fs::write(root.join("caer-build.toml"), "").expect("Failed to write caer-build.toml");
    fs::create_dir_all(root.join("caer")).expect("Failed to create package dir");

    temp_dir
}

/// Tool config written by `create_package`
#[allow(dead_code)]
pub(crate) fn config_path(root: &Path) -> PathBuf {
    root.join("caer-build.toml")
}

/// Write `tools/cythonize.py` with a shell body
#[allow(dead_code)]
pub(crate) fn write_generator(root: &Path, body: &str) -> PathBuf {
    let script = root.join("tools").join("cythonize.py");
    fs::create_dir_all(root.join("tools")).expect("Failed to create tools dir");
    fs::write(&script, body).expect("Failed to write generator script");
    script
}

/// An executable that answers the interpreter probe as Python `version` and
/// runs anything else through `/bin/sh`
#[cfg(unix)]
#[allow(dead_code)]
pub(crate) fn fake_python(dir: &Path, version: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("fake-python");
    let script = format!(
        "#!/bin/sh\nif [ \"$1\" = \"-c\" ]; then\n  echo '{{\"version\": \"{version}\", \"include\": \"/py/include\", \"ext_suffix\": \".so\", \"numpy_include\": \"/numpy/include\"}}'\n  exit 0\nfi\nexec /bin/sh \"$@\"\n"
    );
    fs::write(&path, script).expect("Failed to write fake python");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
        .expect("Failed to make fake python executable");
    path
}
