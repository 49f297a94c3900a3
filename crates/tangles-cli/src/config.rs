use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;
use tangles_diff::DiffConfig;

/// Looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "tangles.toml";

/// On-disk configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub diff: DiffSection,
}

/// The `[diff]` table.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiffSection {
    pub semantic_cleanup: bool,
    pub text_diff_timeout_ms: Option<u64>,
}

impl Default for DiffSection {
    fn default() -> Self {
        Self {
            semantic_cleanup: true,
            text_diff_timeout_ms: None,
        }
    }
}

impl FileConfig {
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        toml::from_str(content).context("invalid configuration")
    }

    pub fn diff_config(&self) -> DiffConfig {
        DiffConfig {
            semantic_cleanup: self.diff.semantic_cleanup,
            text_diff_timeout: self.diff.text_diff_timeout_ms.map(Duration::from_millis),
        }
    }
}

/// Load the diff configuration.
///
/// An explicit path must exist. Without one, `tangles.toml` is used when it
/// is present and defaults apply otherwise.
pub fn load(explicit: Option<&Path>) -> anyhow::Result<DiffConfig> {
    let path = match explicit {
        Some(path) => path,
        None if Path::new(DEFAULT_CONFIG_FILE).is_file() => Path::new(DEFAULT_CONFIG_FILE),
        None => return Ok(DiffConfig::default()),
    };
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config = FileConfig::from_toml(&content).with_context(|| format!("in {}", path.display()))?;
    Ok(config.diff_config())
}
