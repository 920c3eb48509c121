//! Section builders. Each returns a [`SetupSectionSteps`] contributing its
//! steps to a merged flow; where a section hands off to is the caller's
//! choice, so the same builders serve both flows.

pub mod gateway;
pub mod identity;
pub mod workspace;

use {serde_json::Value, tracing::debug};

use waypoint_wizard::{StepInterrupt, Transition};

use crate::{
    context::SetupContext,
    state::{SetupState, next_selected_section},
};

pub use {
    gateway::build_gateway_section, identity::build_identity_section,
    workspace::build_workspace_section,
};

/// Where a section goes when its last step completes.
#[derive(Debug, Clone)]
pub enum SectionExit {
    /// Fixed hand-off, used when sections are chained statically.
    Goto(String),
    /// Continue with the next selected section, used in configure mode.
    NextSelected { fallback: String },
}

impl SectionExit {
    pub fn goto(id: impl Into<String>) -> Self {
        Self::Goto(id.into())
    }

    pub fn next_selected(fallback: impl Into<String>) -> Self {
        Self::NextSelected {
            fallback: fallback.into(),
        }
    }

    /// Step id recorded as the section's nominal exit.
    pub fn exit_id(&self) -> &str {
        match self {
            Self::Goto(id) => id,
            Self::NextSelected { fallback } => fallback,
        }
    }

    pub(crate) fn transition(&self, state: &mut SetupState) -> Transition {
        match self {
            Self::Goto(id) => Transition::goto(id.clone()),
            Self::NextSelected { fallback } => next_selected_section(state, fallback),
        }
    }
}

/// Commit the draft config through the session's store, folding the stored
/// form back into both base and draft.
pub(crate) fn commit_config(
    state: &mut SetupState,
    ctx: &SetupContext,
) -> Result<(), StepInterrupt> {
    let draft = state.draft_config.clone().normalized();
    match ctx.store.commit(&draft) {
        Ok(saved) => {
            debug!("config committed");
            state.base_config = saved.clone();
            state.draft_config = saved;
            Ok(())
        },
        Err(e) => Err(StepInterrupt::failed(format!("failed to save config: {e}"))),
    }
}

pub(crate) fn trimmed_string(value: &Value) -> Option<String> {
    let text = value.as_str()?.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

pub(crate) fn is_yes(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => matches!(s.trim().to_ascii_lowercase().as_str(), "y" | "yes" | "true"),
        _ => false,
    }
}
