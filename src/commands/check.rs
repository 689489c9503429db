//! Check command
//!
//! Validate package metadata without writing anything

use anyhow::{Context, Result};
use caer_build::{Config, MetadataRecord, read_contributors};
use std::path::Path;

/// Validate `setup.cfg`, the long description and the contributors file
pub(crate) fn run(root: &Path, config_path: Option<&Path>) -> Result<()> {
    let config = Config::load(config_path, root)?;
    let layout = super::project_layout(root, &config);

    let setup_cfg = layout.setup_cfg_path();
    let record = MetadataRecord::load(&setup_cfg)
        .with_context(|| format!("Invalid package metadata in {}", setup_cfg.display()))?;
    let contributors = read_contributors(&layout.contributors_path())?;

    println!("{} {}", record.name, record.version);
    println!("  author:       {}", record.author_long());
    println!("  license:      {}", record.license);
    println!("  release:      {}", record.release);
    println!("  requires:     Python >={}", record.python_min_version);
    println!("  dependencies: {}", record.requirements.join(", "));
    for (extra, requirement) in &record.extras {
        println!("  extra [{extra}]: {requirement}");
    }
    println!("  platforms:    {}", record.platforms.join(", "));
    println!("  classifiers:  {}", record.classifiers.len());
    println!("  contributors: {}", contributors.len());
    for (label, url) in record.project_urls() {
        println!("  {label}: {url}");
    }
    println!("  meta module:  {}", layout.meta_module_path(&record).display());

    println!("\nsetup.cfg is valid");
    Ok(())
}
