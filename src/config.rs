//! Configuration file management
//!
//! Reads caer-build's own TOML configuration from project and user
//! locations. Package metadata lives in `setup.cfg` and is handled by
//! [`crate::metadata`]; this file only tunes how the build runs.
//!
//! ```toml
//! python = "/usr/bin/python3.11"
//! compiler = "msvc"
//! jobs = 4
//! include_dirs = ["third_party/include"]
//!
//! [toolchain_flags]
//! unix = ["-std=c++14"]
//!
//! [[extensions]]
//! name = "caer.cconvex"
//! sources = ["caer/cconvex.cpp"]
//! ```

use crate::extensions::{ExtensionEntry, ExtensionTable, ToolchainFlags};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Project-local config file name
pub const LOCAL_CONFIG_FILE: &str = ".caer-build.toml";

/// Build settings loaded from TOML files
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Interpreter executable
    #[serde(default)]
    pub python: Option<String>,

    /// Compiler identity override (e.g., "msvc", "unix")
    #[serde(default)]
    pub compiler: Option<String>,

    /// Parallel compile jobs
    #[serde(default)]
    pub jobs: Option<usize>,

    /// Source generator script, relative to the build root
    #[serde(default)]
    pub generator_script: Option<PathBuf>,

    /// Contributors file, relative to the build root
    #[serde(default)]
    pub contributors_file: Option<PathBuf>,

    /// Meta module path, relative to the build root
    #[serde(default)]
    pub meta_module: Option<PathBuf>,

    /// Build output directory, relative to the build root
    #[serde(default)]
    pub build_dir: Option<PathBuf>,

    /// Extra include directories added to every extension
    #[serde(default)]
    pub include_dirs: Vec<PathBuf>,

    /// Replaces the built-in extension table when non-empty
    #[serde(default)]
    pub extensions: Vec<ExtensionEntry>,

    /// Added to (or replacing entries of) the built-in toolchain flags
    #[serde(default)]
    pub toolchain_flags: BTreeMap<String, Vec<String>>,
}

impl Config {
    /// Load configuration.
    ///
    /// Priority: `custom_path` → `<build_root>/.caer-build.toml` →
    /// `~/.config/caer-build/config.toml` → defaults. An explicit path must
    /// exist; the others are skipped when absent.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be read or parsed.
    pub fn load(custom_path: Option<&Path>, build_root: &Path) -> Result<Self> {
        if let Some(path) = custom_path {
            return Self::load_from(path);
        }

        let local = build_root.join(LOCAL_CONFIG_FILE);
        if local.exists() {
            return Self::load_from(&local);
        }

        if let Some(config_dir) = Self::user_config_dir() {
            let config_path = config_dir.join("config.toml");
            if config_path.exists() {
                return Self::load_from(&config_path);
            }
        }

        Ok(Self::default())
    }

    fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        crate::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    fn user_config_dir() -> Option<PathBuf> {
        // Check XDG_CONFIG_HOME first
        if let Ok(xdg_config) = env::var("XDG_CONFIG_HOME") {
            return Some(PathBuf::from(xdg_config).join("caer-build"));
        }

        // Fall back to ~/.config/caer-build
        dirs::home_dir().map(|home| home.join(".config").join("caer-build"))
    }

    /// The extension table to build
    pub fn extension_table(&self) -> ExtensionTable {
        if self.extensions.is_empty() {
            ExtensionTable::builtin()
        } else {
            ExtensionTable::new(self.extensions.clone())
        }
    }

    /// Built-in toolchain flags with this config's entries merged in
    pub fn toolchain_flags(&self) -> ToolchainFlags {
        ToolchainFlags::builtin().merged(self.toolchain_flags.clone())
    }
}
