use serde::{Deserialize, Serialize};

/// Navigation hint supplied alongside an answer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NavAction {
    /// Advance with the supplied answer (the default).
    #[default]
    Next,
    /// Pop back to the previous step, restoring its pre-answer state.
    Back,
    /// Request the gated exit confirmation.
    Cancel,
}

impl NavAction {
    /// Parse a wire-level nav string. Unknown strings are rejected so a
    /// typo'd client does not silently advance.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "next" => Some(Self::Next),
            "back" => Some(Self::Back),
            "cancel" => Some(Self::Cancel),
            _ => None,
        }
    }
}
