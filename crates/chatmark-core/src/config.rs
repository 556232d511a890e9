//! Configuration management for chatmark.
//!
//! Loads configuration from ${CHATMARK_HOME}/config.toml with sensible defaults.
//! Only labels and wrapper classes are configurable; parser options are fixed.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Labels for the collapsible thinking block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThinkConfig {
    /// Header label while the message is still being generated.
    pub label_in_progress: String,
    /// Header label once generation has finished.
    pub label_finished: String,
}

impl Default for ThinkConfig {
    fn default() -> Self {
        Self {
            label_in_progress: Config::DEFAULT_LABEL_IN_PROGRESS.to_string(),
            label_finished: Config::DEFAULT_LABEL_FINISHED.to_string(),
        }
    }
}

impl ThinkConfig {
    /// Returns the label for the given generation state.
    pub fn label(&self, thinking: bool) -> &str {
        if thinking {
            &self.label_in_progress
        } else {
            &self.label_finished
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Class list on the element wrapping a rendered message.
    pub prose_class: String,

    /// Thinking block configuration
    pub think: ThinkConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prose_class: Self::DEFAULT_PROSE_CLASS.to_string(),
            think: ThinkConfig::default(),
        }
    }
}

/// Returns the default config template with comments.
///
/// This is embedded from default_config.toml at compile time.
fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

pub mod paths {
    //! Path resolution for chatmark configuration.
    //!
    //! CHATMARK_HOME resolution order:
    //! 1. CHATMARK_HOME environment variable (if set)
    //! 2. ~/.config/chatmark (default)

    use std::path::PathBuf;

    use anyhow::{Context, Result};

    /// Returns the chatmark home directory.
    pub fn chatmark_home() -> Result<PathBuf> {
        if let Ok(home) = std::env::var("CHATMARK_HOME") {
            return Ok(PathBuf::from(home));
        }

        dirs::home_dir()
            .map(|h| h.join(".config").join("chatmark"))
            .context("Could not determine home directory")
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> Result<PathBuf> {
        Ok(chatmark_home()?.join("config.toml"))
    }
}

impl Config {
    const DEFAULT_PROSE_CLASS: &str = "prose dark:prose-invert prose-p:leading-relaxed prose-pre:p-0 min-w-full space-y-6 break-words";
    const DEFAULT_LABEL_IN_PROGRESS: &str = "正在思考";
    const DEFAULT_LABEL_FINISHED: &str = "思考完毕";

    /// Loads configuration from the default config path.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path()?)
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            tracing::debug!(path = %path.display(), "config file missing, using defaults");
            Ok(Config::default())
        }
    }

    /// Creates a default config file at the given path.
    /// Returns an error if the file already exists.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create directory {}", dir.display()))?;
        }
        write_atomic(path, default_config_template())
    }
}

/// Writes through a hidden sibling file so readers never see a partial config.
fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let name = path
        .file_name()
        .with_context(|| format!("Config path {} has no file name", path.display()))?;
    let staged = path.with_file_name(format!(".{}.tmp", name.to_string_lossy()));

    fs::write(&staged, contents)
        .with_context(|| format!("Failed to write {}", staged.display()))?;
    fs::rename(&staged, path)
        .with_context(|| format!("Failed to replace {}", path.display()))
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("nonexistent.toml");

        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.think.label_in_progress, "正在思考");
        assert_eq!(config.think.label_finished, "思考完毕");
    }

    #[test]
    fn test_load_partial_config_merges_defaults() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");

        fs::write(&config_path, "[think]\nlabel_finished = \"Thought\"\n").unwrap();

        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config.think.label_finished, "Thought");
        assert_eq!(config.think.label_in_progress, "正在思考");
        assert_eq!(config.prose_class, Config::DEFAULT_PROSE_CLASS);
    }

    #[test]
    fn test_load_invalid_toml_reports_path() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");

        fs::write(&config_path, "prose_class = [").unwrap();

        let err = Config::load_from(&config_path).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse config"));
    }

    #[test]
    fn test_init_creates_config_with_defaults() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("subdir").join("config.toml");

        Config::init(&config_path).unwrap();

        assert!(config_path.exists());
        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_init_leaves_no_staging_file() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");

        Config::init(&config_path).unwrap();

        let entries: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec!["config.toml"]);
    }

    #[test]
    fn test_init_fails_if_exists() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");

        fs::write(&config_path, "").unwrap();

        let result = Config::init(&config_path);
        assert!(result.is_err());
    }

    #[test]
    fn test_label_follows_thinking_flag() {
        let think = ThinkConfig::default();
        assert_eq!(think.label(true), "正在思考");
        assert_eq!(think.label(false), "思考完毕");
    }
}
