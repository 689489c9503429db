//! Generated meta module
//!
//! Renders `<package>/_meta.py`, which the package imports at runtime to
//! report its version and contributors. The file is rewritten on every build.

use crate::error::BuildError;
use crate::metadata::MetadataRecord;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Meta module file name inside the package directory
pub const META_MODULE_FILE: &str = "_meta.py";

/// Fields rendered into the meta module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaModule {
    pub author: String,
    pub version: String,
    pub full_version: String,
    pub release: bool,
    pub contributors: Vec<String>,
}

impl MetaModule {
    /// Collect the fields from validated metadata.
    ///
    /// `full_version` is the plain version; no dev suffix is computed.
    pub fn new(record: &MetadataRecord, contributors: Vec<String>) -> Self {
        Self {
            author: record.author_long(),
            version: record.version.clone(),
            full_version: record.version.clone(),
            release: record.release,
            contributors,
        }
    }

    /// Render module source
    pub fn render(&self) -> String {
        let contributors = self
            .contributors
            .iter()
            .map(|c| py_str(c))
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "# This file is automatically generated by caer-build from setup.cfg\n\
             # Do not edit by hand\n\
             author = {author}\n\
             version = {version}\n\
             full_version = {full_version}\n\
             release = {release}\n\
             contributors = [{contributors}]\n",
            author = py_str(&self.author),
            version = py_str(&self.version),
            full_version = py_str(&self.full_version),
            release = if self.release { "True" } else { "False" },
        )
    }

    /// Write the rendered module to `writer`, consuming it.
    ///
    /// The writer is dropped before this returns, whether or not the write
    /// succeeded.
    pub fn write_to<W: Write>(&self, mut writer: W) -> std::io::Result<()> {
        writer.write_all(self.render().as_bytes())?;
        writer.flush()
    }
}

/// Render and write the meta module at `path`, truncating what was there.
///
/// # Errors
///
/// Returns `WriteFailure` if the file cannot be created or written. The file
/// handle is closed before the error is returned.
pub fn write_meta_module(
    record: &MetadataRecord,
    contributors: Vec<String>,
    path: &Path,
) -> Result<(), BuildError> {
    let module = MetaModule::new(record, contributors);
    let write_failure = |source| BuildError::WriteFailure {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(write_failure)?;
    module.write_to(file).map_err(write_failure)?;

    tracing::debug!(path = %path.display(), "wrote meta module");
    Ok(())
}

/// Render a string as a single-quoted Python literal
fn py_str(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}
