use std::path;

use crate::error::Result;
use crate::plan;

/// Groups data passed by the user in the config file.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Config {
    /// Title given to plans created from scratch.
    pub default_title: String,
    /// Title used for documents that carry none.
    pub fallback_title: String,
    /// Base directory image paths are relativized against on save.
    pub base_dir: Option<path::PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_title: plan::DEFAULT_TITLE.to_string(),
            fallback_title: plan::UNTITLED.to_string(),
            base_dir: None,
        }
    }
}

impl Config {
    /// Loads the config file, creating a default one when missing.
    pub fn load() -> Result<Self> {
        Ok(confy::load("planbench", "config")?)
    }
}
