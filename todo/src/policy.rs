//! Empty-input policy applied by presentation adapters before adding a task.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Whether a screen forwards blank input to the store
///
/// The store itself accepts any text; this is a presentation-layer choice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputPolicy {
    /// Drop input that is empty or whitespace-only
    RejectBlank,
    /// Forward every submission, even an empty one
    AcceptAll,
}

impl InputPolicy {
    /// Whether `input` should become a task under this policy
    #[must_use]
    pub fn accepts(self, input: &str) -> bool {
        match self {
            Self::RejectBlank => !input.trim().is_empty(),
            Self::AcceptAll => true,
        }
    }
}

/// Error returned when parsing an unknown policy name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown input policy '{0}' (expected 'reject' or 'accept')")]
pub struct ParsePolicyError(pub String);

impl FromStr for InputPolicy {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" | "reject_blank" | "reject-blank" => Ok(Self::RejectBlank),
            "accept" | "accept_all" | "accept-all" => Ok(Self::AcceptAll),
            other => Err(ParsePolicyError(other.to_string())),
        }
    }
}
