use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::grid::{DEFAULT_COLS, DEFAULT_ROWS, Tokens};
use crate::selector::ProbeMode;

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}

/// Characters printed for each player's marks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenConfig {
    pub player_a: char,
    pub player_b: char,
}

impl Default for TokenConfig {
    fn default() -> Self {
        let tokens = Tokens::default();
        Self {
            player_a: tokens.player_a,
            player_b: tokens.player_b,
        }
    }
}

impl From<TokenConfig> for Tokens {
    fn from(config: TokenConfig) -> Self {
        Self {
            player_a: config.player_a,
            player_b: config.player_b,
        }
    }
}

/// Top-level application configuration, loadable from TOML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub rows: usize,
    pub cols: usize,
    /// Seed for the computer's random moves; random if unset.
    pub seed: Option<u64>,
    /// Evaluate the computer's candidate moves in parallel.
    pub parallel_probing: bool,
    pub tokens: TokenConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
            seed: None,
            parallel_probing: false,
            tokens: TokenConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parse and validate configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the file
    /// does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::warn!(path = %path.display(), "config file not found, using defaults");
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rows == 0 {
            return Err(ConfigError::Validation("rows must be > 0".into()));
        }
        if self.cols == 0 {
            return Err(ConfigError::Validation("cols must be > 0".into()));
        }
        if self.tokens.player_a.is_whitespace() || self.tokens.player_b.is_whitespace() {
            return Err(ConfigError::Validation(
                "tokens must not be whitespace".into(),
            ));
        }
        if self.tokens.player_a == self.tokens.player_b {
            return Err(ConfigError::Validation(
                "tokens.player_a and tokens.player_b must differ".into(),
            ));
        }
        Ok(())
    }

    #[must_use]
    pub const fn probe_mode(&self) -> ProbeMode {
        if self.parallel_probing {
            ProbeMode::Parallel
        } else {
            ProbeMode::Sequential
        }
    }
}
