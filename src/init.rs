//! Initialization flow for Precis
//!
//! Writes a default configuration file that users can then edit.

use crate::config::Config;
use crate::error::ConfigError;
use std::path::{Path, PathBuf};

/// Result of running the init flow
#[derive(Debug)]
pub enum InitResult {
    /// A default config was written here
    Configured(PathBuf),
    /// A config already exists and `force` was not set
    AlreadyExists(PathBuf),
}

/// Write the default config to `path` (or the default location)
pub fn run_init(path: Option<&Path>, force: bool) -> Result<InitResult, ConfigError> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => Config::default_path()?,
    };

    if path.exists() && !force {
        return Ok(InitResult::AlreadyExists(path));
    }

    Config::default().save(&path)?;
    Ok(InitResult::Configured(path))
}
