//! Configuration parsing and management.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    ParseError(#[from] serde_yaml::Error),
}

/// Main configuration struct matching the venuedir.yml schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub site: SiteConfig,
    pub paths: PathsConfig,

    /// Output is published to the remote host rather than previewed locally
    #[serde(default)]
    pub remote: bool,

    #[serde(default)]
    pub analytics: Option<AnalyticsConfig>,

    #[serde(default = "default_record_extensions")]
    pub record_extensions: Vec<String>,

    #[serde(default = "default_true")]
    pub enable_sitemap: bool,

    #[serde(default)]
    pub enable_tag_pages: bool,

    // Internal: path to config file (for relative path resolution)
    #[serde(skip)]
    config_path: Option<PathBuf>,
}

fn default_record_extensions() -> Vec<String> {
    vec!["yaml".to_string(), "yml".to_string()]
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    pub title: String,
    /// Canonical origin, e.g. `https://freiburg.fit`
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Folder holding `categories/` and `venues/`
    pub data: PathBuf,
    pub output: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    pub umami_id: String,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::from_yaml(&contents)?;

        // Store config file path for relative path resolution
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(contents)?)
    }

    /// Get the data directory, resolved relative to config file
    pub fn data_dir(&self) -> PathBuf {
        self.resolve_path(&self.paths.data)
    }

    /// Get the output directory, resolved relative to config file
    pub fn output_dir(&self) -> PathBuf {
        self.resolve_path(&self.paths.output)
    }

    pub fn umami_id(&self) -> Option<&str> {
        self.analytics
            .as_ref()
            .map(|a| a.umami_id.as_str())
            .filter(|id| !id.trim().is_empty())
    }

    /// Resolve a path relative to the config file location
    fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else if let Some(config_path) = &self.config_path {
            if let Some(parent) = config_path.parent() {
                parent.join(path)
            } else {
                path.to_path_buf()
            }
        } else {
            path.to_path_buf()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const MINIMAL: &str = r#"
site:
  title: freiburg.fit
  url: https://freiburg.fit
paths:
  data: data
  output: public
"#;

    #[test]
    fn test_default_values() {
        let config = Config::from_yaml(MINIMAL).unwrap();
        assert!(!config.remote);
        assert!(config.enable_sitemap);
        assert!(!config.enable_tag_pages);
        assert_eq!(config.record_extensions, vec!["yaml", "yml"]);
        assert_eq!(config.umami_id(), None);
        assert_eq!(config.data_dir(), PathBuf::from("data"));
    }

    #[test]
    fn test_paths_resolve_relative_to_config_file() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("venuedir.yml");
        std::fs::write(
            &config_path,
            format!("{MINIMAL}remote: true\nanalytics:\n  umami_id: abc-123\n"),
        )
        .unwrap();

        let config = Config::from_file(&config_path).unwrap();
        assert_eq!(config.data_dir(), dir.path().join("data"));
        assert_eq!(config.output_dir(), dir.path().join("public"));
        assert!(config.remote);
        assert_eq!(config.umami_id(), Some("abc-123"));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            Config::from_file(dir.path().join("nope.yml")),
            Err(ConfigError::ReadError(_))
        ));
    }
}
