//! Configuration management for the todo demo.
//!
//! Loads configuration from environment variables with sensible defaults.

use crate::patterns::{Architecture, ParseArchitectureError, ScreenOptions};
use crate::policy::{InputPolicy, ParsePolicyError};
use composable_todo_runtime::StoreConfig;
use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

/// Default log filter when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "todo_list=info,composable_todo_runtime=info";

/// Errors raised while reading configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// `TODO_ARCHITECTURE` named no known architecture
    #[error("TODO_ARCHITECTURE: {0}")]
    Architecture(#[from] ParseArchitectureError),

    /// `TODO_EMPTY_INPUT` was not `reject`, `accept` or `default`
    #[error("TODO_EMPTY_INPUT: {0}")]
    EmptyInput(#[from] ParsePolicyError),
}

/// Demo configuration loaded from environment variables
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Run only this architecture (all nine when unset)
    pub architecture: Option<Architecture>,
    /// Empty-input policy override (per-architecture default when unset)
    pub empty_input: Option<InputPolicy>,
    /// Feedback depth limit for the reducer store, at least one
    pub max_feedback_depth: usize,
    /// Log filter (`RUST_LOG`)
    pub log_filter: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for an unknown architecture or policy name.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup` instead of the process environment
    ///
    /// # Errors
    ///
    /// Same as [`Config::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let architecture = lookup("TODO_ARCHITECTURE")
            .filter(|value| !value.trim().is_empty())
            .map(|value| value.parse::<Architecture>())
            .transpose()?;

        let empty_input = match lookup("TODO_EMPTY_INPUT") {
            Some(value) if !is_default(&value) => Some(value.parse::<InputPolicy>()?),
            _ => None,
        };

        Ok(Self {
            architecture,
            empty_input,
            max_feedback_depth: lookup("TODO_MAX_FEEDBACK_DEPTH")
                .and_then(|s| s.trim().parse::<usize>().ok())
                .map_or_else(|| StoreConfig::default().max_feedback_depth, |depth| depth.max(1)),
            log_filter: lookup("RUST_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
        })
    }

    /// Architectures the demo should run, in navigation-list order
    #[must_use]
    pub fn architectures(&self) -> Vec<Architecture> {
        self.architecture
            .map_or_else(|| Architecture::ALL.to_vec(), |architecture| vec![architecture])
    }

    /// Screen options reflecting this configuration
    #[must_use]
    pub fn screen_options(&self) -> ScreenOptions {
        let options = ScreenOptions::default().with_store_config(
            StoreConfig::default().with_max_feedback_depth(self.max_feedback_depth),
        );
        match self.empty_input {
            Some(policy) => options.with_policy(policy),
            None => options,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            architecture: None,
            empty_input: None,
            max_feedback_depth: StoreConfig::default().max_feedback_depth,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

fn is_default(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || value.eq_ignore_ascii_case("default")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let config = load(&[]).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.architectures(), Architecture::ALL.to_vec());
        assert_eq!(config.max_feedback_depth, 64);
    }

    #[test]
    fn reads_every_variable() {
        let config = load(&[
            ("TODO_ARCHITECTURE", "Clean Architecture"),
            ("TODO_EMPTY_INPUT", "accept"),
            ("TODO_MAX_FEEDBACK_DEPTH", "8"),
            ("RUST_LOG", "debug"),
        ])
        .unwrap();

        assert_eq!(config.architectures(), vec![Architecture::Clean]);
        assert_eq!(config.empty_input, Some(InputPolicy::AcceptAll));
        assert_eq!(config.max_feedback_depth, 8);
        assert_eq!(config.log_filter, "debug");

        let options = config.screen_options();
        assert_eq!(options.policy, Some(InputPolicy::AcceptAll));
        assert_eq!(options.store_config.max_feedback_depth, 8);
    }

    #[test]
    fn default_keyword_keeps_per_architecture_policy() {
        let config = load(&[("TODO_EMPTY_INPUT", "Default")]).unwrap();
        assert_eq!(config.empty_input, None);
        assert_eq!(config.screen_options().policy, None);
    }

    #[test]
    fn bad_numbers_fall_back() {
        let config = load(&[("TODO_MAX_FEEDBACK_DEPTH", "lots")]).unwrap();
        assert_eq!(config.max_feedback_depth, 64);
    }

    #[test]
    fn zero_feedback_depth_is_raised_to_one() {
        let config = load(&[("TODO_MAX_FEEDBACK_DEPTH", "0")]).unwrap();
        assert_eq!(config.max_feedback_depth, 1);
        assert_eq!(config.screen_options().store_config.max_feedback_depth, 1);
    }

    #[test]
    fn reducer_screen_reports_success_at_minimum_depth() {
        let config = load(&[("TODO_MAX_FEEDBACK_DEPTH", "0")]).unwrap();
        let mut screen = Architecture::Tca.build(&config.screen_options());

        let added = screen.enter("buy milk").unwrap();
        assert_eq!(added.map(|task| task.text), Some("buy milk".to_string()));

        assert_eq!(screen.delete(0).unwrap().text, "buy milk");
        assert!(screen.snapshot().is_empty());
    }

    #[test]
    fn unknown_names_are_errors() {
        assert_eq!(
            load(&[("TODO_ARCHITECTURE", "MVP")]),
            Err(ConfigError::Architecture(ParseArchitectureError("MVP".into())))
        );
        assert!(matches!(
            load(&[("TODO_EMPTY_INPUT", "sometimes")]),
            Err(ConfigError::EmptyInput(_))
        ));
    }
}
