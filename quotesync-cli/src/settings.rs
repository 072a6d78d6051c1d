//! Config file loading and flag overrides.

use anyhow::{Context, Result};
use quotesync_sync::SyncConfig;
use std::fs;
use std::path::Path;

/// Loads the sync config from `path`, or defaults when no path is given.
pub fn load(path: Option<&Path>) -> Result<SyncConfig> {
    let Some(path) = path else {
        return Ok(SyncConfig::default());
    };
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    SyncConfig::from_json(&contents)
        .with_context(|| format!("failed to parse config {}", path.display()))
}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Default)]
pub struct Overrides {
    pub endpoint: Option<String>,
    pub interval_secs: Option<u64>,
    pub no_publish: bool,
}

impl Overrides {
    pub fn apply(self, config: &mut SyncConfig) {
        if let Some(endpoint) = self.endpoint {
            config.endpoint = endpoint;
        }
        if let Some(secs) = self.interval_secs {
            config.auto_sync_interval_secs = secs;
        }
        if self.no_publish {
            config.publish_new_quotes = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_path_gives_defaults() {
        assert_eq!(load(None).unwrap(), SyncConfig::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"max_records": 3, "category_literal": "Server"}}"#).unwrap();

        let config = load(Some(file.path())).unwrap();
        assert_eq!(config.max_records, 3);
        assert_eq!(config.category_literal.as_deref(), Some("Server"));
        assert_eq!(config.auto_sync_interval_secs, 30);
    }

    #[test]
    fn unreadable_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load(Some(&dir.path().join("missing.json"))).is_err());
    }

    #[test]
    fn overrides_win() {
        let mut config = SyncConfig::default();
        Overrides {
            endpoint: Some("http://localhost:8080/quotes".into()),
            interval_secs: Some(5),
            no_publish: true,
        }
        .apply(&mut config);
        assert_eq!(config.endpoint, "http://localhost:8080/quotes");
        assert_eq!(config.auto_sync_interval_secs, 5);
        assert!(!config.publish_new_quotes);
    }
}
