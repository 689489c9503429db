mod common;

use std::fs;
use std::process::Command;

use common::get_caer_build_binary;
use common::helpers::{SETUP_CFG, config_path, create_package, setup_cfg_without};

// ===== CHECK COMMAND TESTS =====

#[test]
fn check_accepts_valid_metadata() {
    let temp = create_package(SETUP_CFG, "Jason Dsouza\n");

    let output = Command::new(get_caer_build_binary())
        .arg("--root")
        .arg(temp.path())
        .arg("--config")
        .arg(config_path(temp.path()))
        .arg("check")
        .output()
        .expect("Failed to execute caer-build check");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "check should succeed: {output:?}");
    assert!(stdout.contains("caer 1.3.3"));
    assert!(stdout.contains("Jason Dsouza <jason@example.com>"));
}

#[test]
fn check_names_missing_key() {
    let temp = create_package(&setup_cfg_without("author_email"), "Jason Dsouza\n");

    let output = Command::new(get_caer_build_binary())
        .arg("--root")
        .arg(temp.path())
        .arg("--config")
        .arg(config_path(temp.path()))
        .arg("check")
        .output()
        .expect("Failed to execute caer-build check");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr.contains("author_email"), "stderr: {stderr}");
}

#[test]
fn check_help_lists_global_flags() {
    let output = Command::new(get_caer_build_binary())
        .args(["check", "--help"])
        .output()
        .expect("Failed to execute caer-build check --help");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("--root"));
    assert!(stdout.contains("--config"));
}

// ===== META COMMAND TESTS =====

#[test]
fn meta_writes_module() {
    let temp = create_package(SETUP_CFG, "Jason Dsouza\n\n  Alice  \n");

    let output = Command::new(get_caer_build_binary())
        .arg("--root")
        .arg(temp.path())
        .arg("--config")
        .arg(config_path(temp.path()))
        .arg("meta")
        .output()
        .expect("Failed to execute caer-build meta");

    assert!(output.status.success(), "meta should succeed: {output:?}");

    let meta = fs::read_to_string(temp.path().join("caer/_meta.py")).unwrap();
    assert!(meta.contains("author = 'Jason Dsouza <jason@example.com>'"));
    assert!(meta.contains("version = '1.3.3'"));
    assert!(meta.contains("release = True"));
    assert!(meta.contains("contributors = ['Jason Dsouza', '', 'Alice']"));
}

#[test]
fn meta_missing_key_leaves_no_module() {
    let temp = create_package(&setup_cfg_without("license"), "Jason Dsouza\n");

    let output = Command::new(get_caer_build_binary())
        .arg("--root")
        .arg(temp.path())
        .arg("--config")
        .arg(config_path(temp.path()))
        .arg("meta")
        .output()
        .expect("Failed to execute caer-build meta");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!output.status.success());
    assert!(stderr.contains("meta stage failed"), "stderr: {stderr}");
    assert!(stderr.contains("license"), "stderr: {stderr}");
    assert!(!temp.path().join("caer/_meta.py").exists());
}

#[test]
fn unknown_config_key_is_rejected() {
    let temp = create_package(SETUP_CFG, "Jason Dsouza\n");
    fs::write(config_path(temp.path()), "pyhton = \"python3\"\n").unwrap();

    let output = Command::new(get_caer_build_binary())
        .arg("--root")
        .arg(temp.path())
        .arg("--config")
        .arg(config_path(temp.path()))
        .arg("meta")
        .output()
        .expect("Failed to execute caer-build meta");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!output.status.success());
    assert!(stderr.contains("Failed to parse config file"), "stderr: {stderr}");
}

// ===== INTERPRETER GATE AND PIPELINE TESTS =====

#[cfg(unix)]
mod unix {
    use super::*;
    use crate::common::helpers::{fake_python, write_generator};

    #[test]
    fn build_rejects_old_interpreter() {
        let temp = create_package(SETUP_CFG, "Jason Dsouza\n");
        write_generator(temp.path(), "exit 0\n");
        let python = fake_python(temp.path(), "3.5.2");

        let output = Command::new(get_caer_build_binary())
            .arg("--root")
            .arg(temp.path())
            .arg("--config")
            .arg(config_path(temp.path()))
            .arg("build")
            .arg("--python")
            .arg(&python)
            .output()
            .expect("Failed to execute caer-build build");

        let stderr = String::from_utf8_lossy(&output.stderr);
        // exit(-1) is reported as 255 on unix
        assert_eq!(output.status.code(), Some(255), "stderr: {stderr}");
        assert!(stderr.contains("Python 3.5.2"), "stderr: {stderr}");
        assert!(!temp.path().join("caer/_meta.py").exists());
    }

    #[test]
    fn build_stops_when_generator_fails() {
        let temp = create_package(SETUP_CFG, "Jason Dsouza\n");
        write_generator(temp.path(), "echo generating\nexit 1\n");
        let python = fake_python(temp.path(), "3.11.4");

        let output = Command::new(get_caer_build_binary())
            .arg("--root")
            .arg(temp.path())
            .arg("--config")
            .arg(config_path(temp.path()))
            .arg("build")
            .arg("--no-progress")
            .arg("--python")
            .arg(&python)
            .output()
            .expect("Failed to execute caer-build build");

        let stderr = String::from_utf8_lossy(&output.stderr);
        assert_eq!(output.status.code(), Some(1), "stderr: {stderr}");
        assert!(stderr.contains("generate stage failed"), "stderr: {stderr}");
        assert!(stderr.contains("exit code: 1"), "stderr: {stderr}");
        // The meta module is written before generation starts
        assert!(temp.path().join("caer/_meta.py").exists());
        assert!(!temp.path().join("build").exists());
    }

    #[test]
    fn describe_prints_descriptors_as_json() {
        let temp = create_package(SETUP_CFG, "Jason Dsouza\n");
        write_generator(temp.path(), "exit 0\n");
        let python = fake_python(temp.path(), "3.11.4");

        let output = Command::new(get_caer_build_binary())
            .arg("--root")
            .arg(temp.path())
            .arg("--config")
            .arg(config_path(temp.path()))
            .arg("describe")
            .arg("--json")
            .arg("--python")
            .arg(&python)
            .output()
            .expect("Failed to execute caer-build describe");

        assert!(output.status.success(), "describe should succeed: {output:?}");

        let descriptors: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        let descriptors = descriptors.as_array().unwrap();
        assert_eq!(descriptors.len(), 5);

        let names: Vec<&str> = descriptors
            .iter()
            .filter_map(|d| d.get("name").and_then(serde_json::Value::as_str))
            .collect();
        assert!(names.contains(&"caer.cconvolve"));
        assert!(names.contains(&"caer.ndi.cndi"));

        let include_dirs = descriptors
            .first()
            .and_then(|d| d.get("include_dirs"))
            .and_then(serde_json::Value::as_array)
            .unwrap();
        assert!(include_dirs.iter().any(|dir| dir == "/numpy/include"));
    }

    #[test]
    fn describe_uses_configured_extension_table() {
        let temp = create_package(SETUP_CFG, "Jason Dsouza\n");
        write_generator(temp.path(), "exit 0\n");
        let python = fake_python(temp.path(), "3.11.4");
        fs::write(
            config_path(temp.path()),
            "[[extensions]]\nname = \"caer.cfast\"\nsources = [\"caer/cfast.c\"]\n",
        )
        .unwrap();

        let output = Command::new(get_caer_build_binary())
            .arg("--root")
            .arg(temp.path())
            .arg("--config")
            .arg(config_path(temp.path()))
            .arg("describe")
            .arg("--python")
            .arg(&python)
            .output()
            .expect("Failed to execute caer-build describe");

        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(output.status.success(), "describe should succeed: {output:?}");
        assert!(stdout.contains("caer.cfast -> caer/cfast.so"), "stdout: {stdout}");
        assert!(stdout.contains("1 extensions"));
    }
}
