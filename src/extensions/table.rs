//! Extension table
//!
//! Maps each native module to the sources it is compiled from. Some of these
//! sources only exist after source generation has run; nothing here checks
//! for them, a missing file is reported by the compiler.

use super::types::ExtensionDescriptor;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::PathBuf;

/// One row of the extension table
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExtensionEntry {
    /// Dotted module name
    pub name: String,
    /// Source files relative to the build root
    pub sources: Vec<PathBuf>,
}

impl ExtensionEntry {
    fn new(name: &str, sources: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            sources: sources.iter().map(PathBuf::from).collect(),
        }
    }
}

/// Ordered, immutable extension table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionTable {
    entries: Vec<ExtensionEntry>,
}

impl Default for ExtensionTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ExtensionTable {
    /// Use a custom table, keeping the given order
    pub const fn new(entries: Vec<ExtensionEntry>) -> Self {
        Self { entries }
    }

    /// The package's native modules
    pub fn builtin() -> Self {
        Self::new(vec![
            ExtensionEntry::new("caer.cconvex", &["caer/cconvex.cpp"]),
            ExtensionEntry::new("caer.cconvolve", &["caer/cconvolve.cpp", "caer/cfilters.cpp"]),
            ExtensionEntry::new("caer.cdistance", &["caer/cdistance.cpp"]),
            ExtensionEntry::new("caer.cmorph", &["caer/cmorph.cpp", "caer/cfilters.cpp"]),
            ExtensionEntry::new(
                "caer.ndi.cndi",
                &[
                    "caer/ndi/cndimage.c",
                    "caer/ndi/cndfilters.c",
                    "caer/ndi/cndfourier.c",
                    "caer/ndi/cndinterpolation.c",
                    "caer/ndi/cndmeasure.c",
                    "caer/ndi/cndmorphology.c",
                    "caer/ndi/cndsplines.c",
                    "caer/ndi/cndsupport.c",
                ],
            ),
        ])
    }

    /// Table rows in declaration order
    pub fn entries(&self) -> &[ExtensionEntry] {
        &self.entries
    }

    /// Build one descriptor per row, each with the shared include dirs.
    pub fn describe(&self, include_dirs: &BTreeSet<PathBuf>) -> Vec<ExtensionDescriptor> {
        self.entries
            .iter()
            .map(|entry| {
                ExtensionDescriptor::new(
                    entry.name.clone(),
                    entry.sources.clone(),
                    include_dirs.clone(),
                )
            })
            .collect()
    }
}
