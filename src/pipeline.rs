//! Build pipeline orchestration
//!
//! Sequences the build:
//! 1. Validate `setup.cfg`, read contributors, write the meta module
//! 2. Run the source generator (blocking, must exit 0)
//! 3. Describe the native extensions
//! 4. Hand them to a backend with the toolchain hook attached
//!
//! Each step moves the [`Orchestrator`] one state forward. Any error moves it
//! to [`PipelineState::Failed`] and nothing after that step runs.

use crate::contributors::{CONTRIBUTORS_FILE, read_contributors};
use crate::error::{BuildError, PipelineFailure, Stage};
use crate::extensions::{Backend, BuildSummary, ExtensionDescriptor, ExtensionTable, ToolchainHook};
use crate::generator::SourceGenerator;
use crate::meta_module::{META_MODULE_FILE, write_meta_module};
use crate::metadata::MetadataRecord;
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Default package config file, relative to the build root
pub const SETUP_CFG: &str = "setup.cfg";

/// Pipeline progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Init,
    MetaWritten,
    Generated,
    Described,
    Delegated,
    Done,
    Failed { stage: Stage },
}

/// Files the pipeline reads and writes, relative to the build root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    pub build_root: PathBuf,
    pub setup_cfg: PathBuf,
    pub contributors: PathBuf,
    /// Meta module path; `None` means `<package>/_meta.py`
    pub meta_module: Option<PathBuf>,
}

impl ProjectLayout {
    /// Default layout rooted at `build_root`
    pub fn new(build_root: impl Into<PathBuf>) -> Self {
        Self {
            build_root: build_root.into(),
            setup_cfg: PathBuf::from(SETUP_CFG),
            contributors: PathBuf::from(CONTRIBUTORS_FILE),
            meta_module: None,
        }
    }

    /// Absolute (or root-relative) path of `setup.cfg`
    pub fn setup_cfg_path(&self) -> PathBuf {
        self.build_root.join(&self.setup_cfg)
    }

    /// Path of the contributors file
    pub fn contributors_path(&self) -> PathBuf {
        self.build_root.join(&self.contributors)
    }

    /// Where the meta module for `record` is written
    pub fn meta_module_path(&self, record: &MetadataRecord) -> PathBuf {
        let relative = self
            .meta_module
            .clone()
            .unwrap_or_else(|| record.package_dir().join(META_MODULE_FILE));
        self.build_root.join(relative)
    }
}

/// Drives one build invocation
#[derive(Debug)]
pub struct Orchestrator {
    layout: ProjectLayout,
    state: PipelineState,
    record: Option<MetadataRecord>,
    descriptors: Vec<ExtensionDescriptor>,
}

impl Orchestrator {
    /// Start a pipeline in [`PipelineState::Init`]
    pub const fn new(layout: ProjectLayout) -> Self {
        Self {
            layout,
            state: PipelineState::Init,
            record: None,
            descriptors: Vec::new(),
        }
    }

    /// Current state
    pub const fn state(&self) -> PipelineState {
        self.state
    }

    /// Validated metadata, once the meta step has run
    pub const fn record(&self) -> Option<&MetadataRecord> {
        self.record.as_ref()
    }

    /// Extension descriptors, once the describe step has run
    pub fn descriptors(&self) -> &[ExtensionDescriptor] {
        &self.descriptors
    }

    /// Project layout
    pub const fn layout(&self) -> &ProjectLayout {
        &self.layout
    }

    /// `Init → MetaWritten`: load metadata, read contributors, write the
    /// meta module.
    pub fn write_meta(&mut self) -> Result<&MetadataRecord, PipelineFailure> {
        self.expect_state(PipelineState::Init, Stage::Meta)?;

        let record = self.step(Stage::Meta, |layout| {
            let record = MetadataRecord::load(&layout.setup_cfg_path())?;
            let contributors = read_contributors(&layout.contributors_path())?;
            let path = layout.meta_module_path(&record);

            tracing::info!(path = %path.display(), "writing meta module");
            write_meta_module(&record, contributors, &path)?;
            Ok(record)
        })?;

        self.state = PipelineState::MetaWritten;
        Ok(self.record.insert(record))
    }

    /// `MetaWritten → Generated`: run the source generator.
    pub fn generate(&mut self, generator: &SourceGenerator) -> Result<(), PipelineFailure> {
        self.expect_state(PipelineState::MetaWritten, Stage::Generate)?;
        self.step(Stage::Generate, |_| generator.generate())?;
        self.state = PipelineState::Generated;
        Ok(())
    }

    /// `Generated → Described`: one descriptor per table entry.
    pub fn describe(
        &mut self,
        table: &ExtensionTable,
        include_dirs: &BTreeSet<PathBuf>,
    ) -> Result<&[ExtensionDescriptor], PipelineFailure> {
        self.expect_state(PipelineState::Generated, Stage::Describe)?;

        self.descriptors = table.describe(include_dirs);
        tracing::debug!(count = self.descriptors.len(), "described extensions");

        self.state = PipelineState::Described;
        Ok(&self.descriptors)
    }

    /// `Described → Delegated → Done`: hand the descriptors and the hook to
    /// the backend.
    pub fn delegate(
        &mut self,
        backend: &dyn Backend,
        hook: &dyn ToolchainHook,
    ) -> Result<BuildSummary, PipelineFailure> {
        self.expect_state(PipelineState::Described, Stage::Backend)?;
        self.state = PipelineState::Delegated;

        let extensions = self.descriptors.clone();
        let summary = self.step(Stage::Backend, |_| backend.build(extensions, hook))?;

        self.state = PipelineState::Done;
        Ok(summary)
    }

    /// Run every step in order.
    ///
    /// # Errors
    ///
    /// Returns the first step's failure; later steps do not run.
    pub fn run(
        &mut self,
        generator: &SourceGenerator,
        table: &ExtensionTable,
        include_dirs: &BTreeSet<PathBuf>,
        backend: &dyn Backend,
        hook: &dyn ToolchainHook,
    ) -> Result<BuildSummary, PipelineFailure> {
        self.write_meta()?;
        self.generate(generator)?;
        self.describe(table, include_dirs)?;
        self.delegate(backend, hook)
    }

    // Run a fallible step, recording failure
    fn step<T>(
        &mut self,
        stage: Stage,
        f: impl FnOnce(&ProjectLayout) -> Result<T, BuildError>,
    ) -> Result<T, PipelineFailure> {
        f(&self.layout).map_err(|error| {
            tracing::debug!(%stage, "pipeline failed");
            self.state = PipelineState::Failed { stage };
            PipelineFailure { stage, error }
        })
    }

    fn expect_state(&self, expected: PipelineState, stage: Stage) -> Result<(), PipelineFailure> {
        if self.state == expected {
            return Ok(());
        }
        Err(PipelineFailure {
            stage,
            error: BuildError::OutOfOrder {
                expected: format!("{expected:?}"),
                found: format!("{:?}", self.state),
            },
        })
    }
}
