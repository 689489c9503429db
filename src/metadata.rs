//! Package metadata loading
//!
//! Parses `setup.cfg` into a [`MetadataRecord`]. The format is the
//! section-structured `key = value` layout understood by configparser:
//!
//! ```text
//! [metadata]
//! name = caer
//! classifiers =
//!     Development Status :: 5 - Production/Stable
//!     Intended Audience :: Developers
//! ```
//!
//! Validation happens before anything is written, so a missing key never
//! leaves a half-generated meta module behind.

use crate::error::BuildError;
use semver::Version;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

/// Keys that must be present in `[metadata]`, checked in this order.
pub const REQUIRED_METADATA_KEYS: &[&str] = &[
    "description",
    "keywords",
    "author",
    "author_email",
    "contributors",
    "name",
    "user",
    "git_branch",
    "license",
    "status",
    "audience",
    "language",
    "dev_language",
];

/// Keys in `[metadata]` that are read downstream and therefore also required.
pub const CONSUMED_METADATA_KEYS: &[&str] = &["version", "git_url", "download_url", "classifiers"];

/// Keys that must be present in `[options]`.
pub const REQUIRED_OPTIONS_KEYS: &[&str] = &["pip_requirements", "min_python"];

/// Platforms the distribution declares; not configurable.
pub const PLATFORMS: &[&str] = &["Any"];

/// Optional dependency groups, as (group, requirement); not configurable.
pub const EXTRAS: &[(&str, &str)] = &[("canaro", "canaro>=1.0.6")];

/// File holding the long description, next to the config file.
pub const LONG_DESCRIPTION_FILE: &str = "LONG_DESCRIPTION.md";

/// A parsed section-structured config file
///
/// Section names are case-sensitive, option names are not. Values keep
/// their inner newlines so multi-line settings like `classifiers` survive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigSource {
    sections: HashMap<String, HashMap<String, String>>,
}

impl ConfigSource {
    /// Parse config text. Option names are lower-cased.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfigValue` for a key line outside any section, a
    /// key repeated within a section, or a line that is neither a header, a
    /// comment nor `key = value`.
    pub fn parse(content: &str) -> Result<Self, BuildError> {
        let mut sections: HashMap<String, HashMap<String, String>> = HashMap::new();
        let mut current_section: Option<String> = None;
        let mut current_key: Option<String> = None;

        for (index, raw) in content.lines().enumerate() {
            let trimmed = raw.trim();

            if trimmed.starts_with('#') || trimmed.starts_with(';') {
                continue;
            }

            // Continuation line: indented and following a key
            let indented = raw.starts_with(' ') || raw.starts_with('\t');
            if indented
                && !trimmed.is_empty()
                && let (Some(section), Some(key)) = (&current_section, &current_key)
                && let Some(value) = sections.get_mut(section).and_then(|s| s.get_mut(key))
            {
                value.push('\n');
                value.push_str(trimmed);
                continue;
            }

            if trimmed.is_empty() {
                continue;
            }

            if let Some(name) = trimmed
                .strip_prefix('[')
                .and_then(|rest| rest.strip_suffix(']'))
            {
                let name = name.trim().to_string();
                sections.entry(name.clone()).or_default();
                current_section = Some(name);
                current_key = None;
                continue;
            }

            let Some((key, value)) = trimmed.split_once('=') else {
                return Err(BuildError::InvalidConfigValue {
                    key: format!("line {}", index + 1),
                    reason: format!("expected `key = value`, found `{trimmed}`"),
                });
            };

            let Some(section) = &current_section else {
                return Err(BuildError::InvalidConfigValue {
                    key: key.trim().to_string(),
                    reason: "setting appears before any [section] header".to_string(),
                });
            };

            // Option names are case-insensitive, section names are not
            let key = key.trim().to_lowercase();
            let options = sections.entry(section.clone()).or_default();
            if options.contains_key(&key) {
                return Err(BuildError::InvalidConfigValue {
                    key,
                    reason: format!("duplicate setting in section [{section}]"),
                });
            }
            options.insert(key.clone(), value.trim().to_string());
            current_key = Some(key);
        }

        Ok(Self { sections })
    }

    /// Look up a value; `key` matches regardless of case
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .get(section)
            .and_then(|s| s.get(&key.to_lowercase()))
            .map(String::as_str)
    }

    /// Whether a section header was seen
    pub fn has_section(&self, section: &str) -> bool {
        self.sections.contains_key(section)
    }

    fn require(&self, section: &str, key: &str) -> Result<&str, BuildError> {
        self.get(section, key)
            .ok_or_else(|| BuildError::MissingConfigKey {
                section: section.to_string(),
                key: key.to_string(),
            })
    }
}

/// Validated package metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataRecord {
    pub name: String,
    /// MAJOR.MINOR.MICRO, exactly as configured
    pub version: String,
    pub release: bool,
    pub author: String,
    pub author_email: String,
    pub license: String,
    pub url: String,
    pub download_url: String,
    pub description: String,
    pub long_description: String,
    pub keywords: Vec<String>,
    pub requirements: Vec<String>,
    pub classifiers: Vec<String>,
    pub python_min_version: String,
    pub platforms: Vec<String>,
    /// Extra name → requirement
    pub extras: BTreeMap<String, String>,
}

impl MetadataRecord {
    /// Load and validate `setup.cfg`, plus the long description next to it.
    ///
    /// # Errors
    ///
    /// - `ResourceNotFound` if the config or long description cannot be read
    /// - `MissingConfigSection` / `MissingConfigKey` for absent settings
    /// - `InvalidConfigValue` for a malformed version or release flag
    pub fn load(config_path: &Path) -> Result<Self, BuildError> {
        let content =
            fs::read_to_string(config_path).map_err(|source| BuildError::ResourceNotFound {
                path: config_path.to_path_buf(),
                source,
            })?;
        let config = ConfigSource::parse(&content)?;

        let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));
        let long_description_path = base_dir.join(LONG_DESCRIPTION_FILE);

        // Validate before touching any other file
        let record_without_description = Self::from_config(&config, config_path)?;

        let long_description = fs::read_to_string(&long_description_path).map_err(|source| {
            BuildError::ResourceNotFound {
                path: long_description_path,
                source,
            }
        })?;

        Ok(Self {
            long_description,
            ..record_without_description
        })
    }

    /// Build a record from an already parsed config. `long_description` is
    /// left empty.
    ///
    /// # Errors
    ///
    /// See [`MetadataRecord::load`].
    pub fn from_config(config: &ConfigSource, path: &Path) -> Result<Self, BuildError> {
        for section in ["metadata", "options"] {
            if !config.has_section(section) {
                return Err(BuildError::MissingConfigSection {
                    section: section.to_string(),
                    path: path.to_path_buf(),
                });
            }
        }

        for key in REQUIRED_METADATA_KEYS.iter().chain(CONSUMED_METADATA_KEYS) {
            config.require("metadata", key)?;
        }
        for key in REQUIRED_OPTIONS_KEYS {
            config.require("options", key)?;
        }

        let version = config.require("metadata", "version")?;
        validate_version(version)?;

        let release = match config.get("metadata", "release") {
            None => true,
            Some(value) => parse_bool(value).ok_or_else(|| BuildError::InvalidConfigValue {
                key: "release".to_string(),
                reason: format!("expected true or false, found `{value}`"),
            })?,
        };

        Ok(Self {
            name: config.require("metadata", "name")?.to_string(),
            version: version.to_string(),
            release,
            author: config.require("metadata", "author")?.to_string(),
            author_email: config.require("metadata", "author_email")?.to_string(),
            license: config.require("metadata", "license")?.to_string(),
            url: config.require("metadata", "git_url")?.to_string(),
            download_url: config.require("metadata", "download_url")?.to_string(),
            description: config.require("metadata", "description")?.to_string(),
            long_description: String::new(),
            keywords: split_list(config.require("metadata", "keywords")?),
            requirements: split_list(config.require("options", "pip_requirements")?),
            classifiers: split_classifiers(config.require("metadata", "classifiers")?),
            python_min_version: config.require("options", "min_python")?.to_string(),
            platforms: PLATFORMS.iter().map(|p| (*p).to_string()).collect(),
            extras: EXTRAS
                .iter()
                .map(|(name, requirement)| ((*name).to_string(), (*requirement).to_string()))
                .collect(),
        })
    }

    /// Author with email, as shown in the generated meta module
    pub fn author_long(&self) -> String {
        format!("{} <{}>", self.author, self.author_email)
    }

    /// Project links derived from the repository URL
    pub fn project_urls(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Bug Tracker", format!("{}/issues", self.url)),
            (
                "Documentation",
                format!("{}/blob/master/docs/README.md", self.url),
            ),
            ("Source Code", self.url.clone()),
        ]
    }

    /// Python package directory, the lower-cased distribution name
    pub fn package_dir(&self) -> PathBuf {
        PathBuf::from(self.name.to_lowercase())
    }
}

fn validate_version(version: &str) -> Result<(), BuildError> {
    let invalid = |reason: String| BuildError::InvalidConfigValue {
        key: "version".to_string(),
        reason,
    };

    let parsed = Version::parse(version).map_err(|e| invalid(format!("`{version}`: {e}")))?;
    if !parsed.pre.is_empty() || !parsed.build.is_empty() {
        return Err(invalid(format!(
            "`{version}` must be MAJOR.MINOR.MICRO without suffixes"
        )));
    }
    Ok(())
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

// Comma-separated lists in setup.cfg use ", " between items
fn split_list(value: &str) -> Vec<String> {
    value.split(", ").map(str::to_string).collect()
}

// The first line is the empty remainder after `classifiers =`
fn split_classifiers(value: &str) -> Vec<String> {
    value.split('\n').skip(1).map(str::to_string).collect()
}
