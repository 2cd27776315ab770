//! Shell configuration loaded from YAML.

use std::io::BufReader;
use std::path::Path;

use command_dispatch_core::UsageStyle;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading a [`ShellConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// YAML parsing failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

/// Settings for `dispatch-shell`.
///
/// Every field is optional in the file:
///
/// ```yaml
/// prompt: "kv> "
/// usage_style:
///   optional_open: "{"
///   optional_close: "}"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Prompt printed before each line in interactive mode.
    pub prompt: String,
    /// Bracket vocabulary for usage listings.
    pub usage_style: UsageStyle,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            prompt: "> ".to_string(),
            usage_style: UsageStyle::default(),
        }
    }
}

impl ShellConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::IoError`] if the file cannot be read, or
    /// [`ConfigError::YamlError`] if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r#"
usage_style:
  or: " | "
"#;
        let config: ShellConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.prompt, "> ");
        assert_eq!(config.usage_style.or, " | ");
        assert_eq!(config.usage_style.argument_open, "<");
    }

    #[test]
    fn test_empty_mapping_is_default() {
        let config: ShellConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, ShellConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!(
            "dispatch_shell_config_{}.yaml",
            std::process::id()
        ));
        std::fs::write(&path, "prompt: \"kv> \"\n").unwrap();
        let config = ShellConfig::load(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(config.prompt, "kv> ");
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let error = ShellConfig::load("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(error, ConfigError::IoError(_)));
    }
}
