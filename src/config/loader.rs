// src/config/loader.rs

use std::fs;
use std::path::Path;

use crate::config::model::{BenchConfig, RawBenchConfig};
use crate::errors::Result;

/// Load a benchmark config from `path` without validating it.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawBenchConfig> {
    let contents = fs::read_to_string(path.as_ref())?;
    let config: RawBenchConfig = toml::from_str(&contents)?;
    Ok(config)
}

/// Load a benchmark config from `path` and validate it.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<BenchConfig> {
    let raw_config = load_from_path(&path)?;
    let config = BenchConfig::try_from(raw_config)?;
    Ok(config)
}
