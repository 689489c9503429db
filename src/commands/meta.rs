//! Meta command
//!
//! Write the generated meta module only

use anyhow::Result;
use caer_build::{Config, Orchestrator};
use std::path::Path;

/// Validate metadata and write the meta module
pub(crate) fn run(root: &Path, config_path: Option<&Path>) -> Result<()> {
    let config = Config::load(config_path, root)?;
    let layout = super::project_layout(root, &config);

    let mut orchestrator = Orchestrator::new(layout);
    let record = orchestrator.write_meta()?.clone();
    let path = orchestrator.layout().meta_module_path(&record);

    println!("Wrote {} ({} {})", path.display(), record.name, record.version);
    Ok(())
}
