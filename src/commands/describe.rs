//! Describe command
//!
//! Run the pipeline up to extension description and print the result

use anyhow::{Context, Result};
use caer_build::{Config, Orchestrator};
use std::path::{Path, PathBuf};

/// Options for the describe command
#[derive(Debug)]
pub(crate) struct DescribeOptions {
    pub(crate) json: bool,
    pub(crate) include_dirs: Vec<PathBuf>,
    pub(crate) python: Option<String>,
}

/// Write the meta module, generate sources, then list the extensions that
/// `build` would compile
pub(crate) fn run(root: &Path, config_path: Option<&Path>, options: &DescribeOptions) -> Result<()> {
    let config = Config::load(config_path, root)?;
    let python = options.python.as_deref().or(config.python.as_deref());
    let (interpreter, info) = super::checked_interpreter(python)?;

    let generator = super::source_generator(root, &interpreter, &config);
    let include_dirs = super::include_dirs(root, &info, &config, &options.include_dirs);
    let table = config.extension_table();

    let mut orchestrator = Orchestrator::new(super::project_layout(root, &config));
    orchestrator.write_meta()?;
    orchestrator.generate(&generator)?;
    let descriptors = orchestrator.describe(&table, &include_dirs)?;

    if options.json {
        let json = serde_json::to_string_pretty(descriptors)
            .context("Failed to serialize extension descriptors")?;
        println!("{json}");
        return Ok(());
    }

    for descriptor in descriptors {
        println!(
            "{} -> {}",
            descriptor.name,
            descriptor.output_relative_path(info.ext_suffix()).display()
        );
        for source in &descriptor.sources {
            println!("    {}", source.display());
        }
    }
    println!("\n{} extensions", descriptors.len());
    Ok(())
}
