use crate::review::reporter::Anchor;
use crate::review::sink::AnnotationTarget;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Default config file name
pub const DEFAULT_CONFIG_PATH: &str = "ibreview.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {0}: {1}")]
    Io(String, std::io::Error),
    #[error("failed to parse {0}: {1}")]
    Parse(String, toml::de::Error),
    #[error("failed to render config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid option '{0}', expected KEY=VALUE")]
    InvalidOption(String),
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Directory handed to IBLinter (defaults to the working directory)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Report warnings with failing severity in inline mode
    #[serde(default)]
    pub fail_on_warning: bool,
    /// Post one annotation per issue instead of a single markdown summary
    #[serde(default = "default_inline_mode")]
    pub inline_mode: bool,
    /// Where inline annotations are anchored
    #[serde(default)]
    pub anchor: Anchor,
    /// Where inline annotations are written
    #[serde(default)]
    pub annotations: AnnotationTarget,
    /// Path to the iblinter executable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binary_path: Option<String>,
    /// Command used instead of an installed iblinter (e.g. "swift run iblinter")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execute_command: Option<String>,
    /// Glob patterns of changed files that are never reported on
    #[serde(default)]
    pub exclude: Vec<String>,
    /// Extra options passed to `iblinter lint` as `--key value`
    #[serde(default)]
    pub options: BTreeMap<String, toml::Value>,
}

fn default_inline_mode() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            path: None,
            fail_on_warning: false,
            inline_mode: default_inline_mode(),
            anchor: Anchor::default(),
            annotations: AnnotationTarget::default(),
            binary_path: None,
            execute_command: None,
            exclude: vec![],
            options: BTreeMap::new(),
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io(path.into(), e))?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse(path.into(), e))
    }

    /// Load the config file, falling back to defaults when the default file is absent
    pub fn load_or_default(path: &str) -> Result<Self, ConfigError> {
        if path == DEFAULT_CONFIG_PATH && !Path::new(path).exists() {
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Render the config as TOML with a short header
    pub fn render(&self) -> Result<String, ConfigError> {
        let body = toml::to_string_pretty(self)?;
        Ok(format!(
            "# ibreview configuration\n\
             # Every key is optional; command line flags take precedence.\n\n{}",
            body
        ))
    }

    /// Merge `KEY=VALUE` pairs into `options`
    ///
    /// `true`/`false` become booleans, everything else is kept as a string.
    pub fn apply_options(&mut self, pairs: &[String]) -> Result<(), ConfigError> {
        for pair in pairs {
            let (key, value) = pair
                .split_once('=')
                .filter(|(k, _)| !k.trim().is_empty())
                .ok_or_else(|| ConfigError::InvalidOption(pair.clone()))?;
            let value = match value {
                "true" => toml::Value::Boolean(true),
                "false" => toml::Value::Boolean(false),
                other => toml::Value::String(other.to_string()),
            };
            self.options.insert(key.trim().to_string(), value);
        }
        Ok(())
    }
}
