use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Tuning for revision generation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffConfig {
    /// Slide text delta boundaries onto word and line edges.
    pub semantic_cleanup: bool,
    /// Upper bound on the character diff of a single text field. When it
    /// is hit the delta is still exact, only less minimal.
    pub text_diff_timeout: Option<Duration>,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            semantic_cleanup: true,
            text_diff_timeout: None,
        }
    }
}

impl DiffConfig {
    /// Default configuration with a bounded text diff.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            text_diff_timeout: Some(timeout),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = DiffConfig::default();
        assert!(c.semantic_cleanup);
        assert!(c.text_diff_timeout.is_none());
    }

    #[test]
    fn with_timeout_keeps_cleanup() {
        let c = DiffConfig::with_timeout(Duration::from_millis(50));
        assert!(c.semantic_cleanup);
        assert_eq!(c.text_diff_timeout, Some(Duration::from_millis(50)));
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let c: DiffConfig = serde_json::from_str(r#"{"semantic_cleanup": false}"#).unwrap();
        assert!(!c.semantic_cleanup);
        assert!(c.text_diff_timeout.is_none());
    }
}
