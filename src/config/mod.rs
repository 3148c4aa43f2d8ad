//! Configuration management for askloop
//!
//! This module handles loading and validating configuration from environment
//! variables and TOML files. Command-line flags are applied on top by the
//! binary.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::Error;
use crate::session::MarkPolicy;
use crate::storage::state::DEFAULT_STATE_FILE;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Session loop configuration
    #[serde(default)]
    pub session: SessionConfig,

    /// Simulated typing configuration
    #[serde(default)]
    pub typing: TypingConfig,

    /// State and question bank locations
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Session loop configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Questions to send per session
    pub max_questions: usize,

    /// Seconds before the first keystroke, to focus the chat input
    pub countdown_secs: u64,

    /// Difficulty label, 1 (senior debugging) to 5 (principal + scale)
    pub difficulty: u8,

    /// Shortest wait between questions, in seconds
    pub wait_min_secs: u64,

    /// Longest wait between questions, in seconds
    pub wait_max_secs: u64,

    /// Whether a question whose text cannot be resolved is still consumed
    pub mark_policy: MarkPolicy,
}

/// Keystroke pacing for the simulated typist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypingConfig {
    /// Per-character delay lower bound (ms)
    pub key_delay_min_ms: u64,

    /// Per-character delay upper bound (ms)
    pub key_delay_max_ms: u64,

    /// Pause after `, . ; : ! ?` lower bound (ms)
    pub punctuation_pause_min_ms: u64,

    /// Pause after punctuation upper bound (ms)
    pub punctuation_pause_max_ms: u64,

    /// Occasional pause at whitespace lower bound (ms)
    pub thinking_pause_min_ms: u64,

    /// Occasional pause at whitespace upper bound (ms)
    pub thinking_pause_max_ms: u64,

    /// Probability that a whitespace character triggers a thinking pause
    pub thinking_pause_probability: f64,

    /// Pause before submitting lower bound (ms)
    pub submit_delay_min_ms: u64,

    /// Pause before submitting upper bound (ms)
    pub submit_delay_max_ms: u64,
}

/// File locations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// JSON file holding rotation progress
    pub state_file: PathBuf,

    /// External question bank; the built-in bank is used when absent
    pub catalog: Option<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_questions: 20,
            countdown_secs: 10,
            difficulty: 3,
            wait_min_secs: 180,
            wait_max_secs: 300,
            mark_policy: MarkPolicy::default(),
        }
    }
}

impl Default for TypingConfig {
    fn default() -> Self {
        Self {
            key_delay_min_ms: 30,
            key_delay_max_ms: 120,
            punctuation_pause_min_ms: 200,
            punctuation_pause_max_ms: 600,
            thinking_pause_min_ms: 500,
            thinking_pause_max_ms: 1500,
            thinking_pause_probability: 0.04,
            submit_delay_min_ms: 300,
            submit_delay_max_ms: 700,
        }
    }
}

impl TypingConfig {
    /// Pacing with every delay set to zero
    pub fn instant() -> Self {
        Self {
            key_delay_min_ms: 0,
            key_delay_max_ms: 0,
            punctuation_pause_min_ms: 0,
            punctuation_pause_max_ms: 0,
            thinking_pause_min_ms: 0,
            thinking_pause_max_ms: 0,
            thinking_pause_probability: 0.0,
            submit_delay_min_ms: 0,
            submit_delay_max_ms: 0,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            state_file: PathBuf::from(DEFAULT_STATE_FILE),
            catalog: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let mark_policy = match std::env::var("ASKLOOP_MARK_POLICY") {
            Ok(value) => value
                .parse::<MarkPolicy>()
                .map_err(|e| anyhow::anyhow!(e))
                .context("Invalid ASKLOOP_MARK_POLICY")?,
            Err(_) => defaults.session.mark_policy,
        };

        let session = SessionConfig {
            max_questions: env_or("ASKLOOP_QUESTIONS", defaults.session.max_questions),
            countdown_secs: env_or("ASKLOOP_COUNTDOWN", defaults.session.countdown_secs),
            difficulty: env_or("ASKLOOP_DIFFICULTY", defaults.session.difficulty),
            wait_min_secs: env_or("ASKLOOP_WAIT_MIN", defaults.session.wait_min_secs),
            wait_max_secs: env_or("ASKLOOP_WAIT_MAX", defaults.session.wait_max_secs),
            mark_policy,
        };

        let typing = TypingConfig {
            key_delay_min_ms: env_or("ASKLOOP_KEY_DELAY_MIN_MS", defaults.typing.key_delay_min_ms),
            key_delay_max_ms: env_or("ASKLOOP_KEY_DELAY_MAX_MS", defaults.typing.key_delay_max_ms),
            ..defaults.typing
        };

        let storage = StorageConfig {
            state_file: std::env::var("ASKLOOP_STATE_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.storage.state_file),
            catalog: std::env::var("ASKLOOP_CATALOG").ok().map(PathBuf::from),
        };

        let logging = LoggingConfig {
            level: std::env::var("ASKLOOP_LOG_LEVEL").unwrap_or(defaults.logging.level),
            format: std::env::var("ASKLOOP_LOG_FORMAT").unwrap_or(defaults.logging.format),
        };

        Ok(Self {
            session,
            typing,
            storage,
            logging,
        })
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> crate::error::Result<()> {
        if !(1..=5).contains(&self.session.difficulty) {
            return Err(Error::config("difficulty must be between 1 and 5"));
        }

        if self.session.wait_min_secs > self.session.wait_max_secs {
            return Err(Error::config("wait_min_secs must not exceed wait_max_secs"));
        }

        let typing = &self.typing;
        for (name, min, max) in [
            ("key_delay", typing.key_delay_min_ms, typing.key_delay_max_ms),
            (
                "punctuation_pause",
                typing.punctuation_pause_min_ms,
                typing.punctuation_pause_max_ms,
            ),
            (
                "thinking_pause",
                typing.thinking_pause_min_ms,
                typing.thinking_pause_max_ms,
            ),
            ("submit_delay", typing.submit_delay_min_ms, typing.submit_delay_max_ms),
        ] {
            if min > max {
                return Err(Error::config(format!(
                    "{name} minimum must not exceed its maximum"
                )));
            }
        }

        if !(0.0..=1.0).contains(&typing.thinking_pause_probability) {
            return Err(Error::config("thinking_pause_probability must be between 0.0 and 1.0"));
        }

        if self.storage.state_file.as_os_str().is_empty() {
            return Err(Error::config("state_file must not be empty"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_defaults_validate() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.session.max_questions, 20);
        assert_eq!(config.session.difficulty, 3);
        assert_eq!(config.storage.state_file, PathBuf::from("session_state.json"));
        assert_eq!(config.session.countdown_secs, 10);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.session.difficulty = 6;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.session.wait_min_secs = 400;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.typing.key_delay_min_ms = 500;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.typing.thinking_pause_probability = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_instant_typing_validates() {
        let config = Config {
            typing: TypingConfig::instant(),
            ..Config::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [session]
            max_questions = 5
            mark_policy = "on-success"

            [storage]
            state_file = "/tmp/askloop.json"
            "#,
        )
        .unwrap();

        assert_eq!(config.session.max_questions, 5);
        assert_eq!(config.session.countdown_secs, 10);
        assert_eq!(config.session.mark_policy, MarkPolicy::OnSuccess);
        assert_eq!(config.storage.state_file, PathBuf::from("/tmp/askloop.json"));
        assert_eq!(config.typing, TypingConfig::default());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("askloop.toml");
        std::fs::write(&path, "[session]\ndifficulty = 5\n").unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.session.difficulty, 5);
    }

    #[test]
    fn test_from_file_missing() {
        assert!(Config::from_file(Path::new("/no/such/askloop.toml")).is_err());
    }

    #[test]
    #[serial]
    fn test_from_env_overrides() {
        std::env::set_var("ASKLOOP_QUESTIONS", "7");
        std::env::set_var("ASKLOOP_STATE_FILE", "/tmp/custom_state.json");
        std::env::set_var("ASKLOOP_MARK_POLICY", "on-success");

        let config = Config::from_env().unwrap();

        std::env::remove_var("ASKLOOP_QUESTIONS");
        std::env::remove_var("ASKLOOP_STATE_FILE");
        std::env::remove_var("ASKLOOP_MARK_POLICY");

        assert_eq!(config.session.max_questions, 7);
        assert_eq!(config.storage.state_file, PathBuf::from("/tmp/custom_state.json"));
        assert_eq!(config.session.mark_policy, MarkPolicy::OnSuccess);
    }

    #[test]
    #[serial]
    fn test_from_env_ignores_unparsable_numbers() {
        std::env::set_var("ASKLOOP_COUNTDOWN", "soon");

        let config = Config::from_env().unwrap();

        std::env::remove_var("ASKLOOP_COUNTDOWN");
        assert_eq!(config.session.countdown_secs, 10);
    }

    #[test]
    #[serial]
    fn test_from_env_rejects_unknown_policy() {
        std::env::set_var("ASKLOOP_MARK_POLICY", "sometimes");

        let result = Config::from_env();

        std::env::remove_var("ASKLOOP_MARK_POLICY");
        assert!(result.is_err());
    }
}
