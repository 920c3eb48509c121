//! Identity section: what the agent is called and who it talks to.

use serde_json::Value;

use waypoint_wizard::{Section, StepKind};

use crate::{
    flows::{SetupSectionSteps, SetupStep},
    sections::{SectionExit, trimmed_string},
    state::SetupState,
};

const ENTRY_ID: &str = "identity.agent_name";

pub fn build_identity_section(exit: SectionExit) -> SetupSectionSteps {
    let exit_id = exit.exit_id().to_string();
    let steps = vec![
        SetupStep::new(ENTRY_ID, StepKind::Text)
            .title("Agent name")
            .message("What should your agent be called?")
            .placeholder("Waypoint")
            .initial_value_with(|state: &SetupState| {
                state
                    .draft_config
                    .identity
                    .name
                    .clone()
                    .map(Value::String)
            })
            .on_answer(|value, state, _| {
                state.draft_config.identity.name =
                    trimmed_string(value).or_else(|| Some("Waypoint".to_string()));
                Ok(())
            })
            .next_to("identity.user_name"),
        SetupStep::new("identity.user_name", StepKind::Text)
            .title("Your name")
            .message("What should the agent call you? Leave empty to skip.")
            .initial_value_with(|state: &SetupState| {
                state.draft_config.user.name.clone().map(Value::String)
            })
            .on_answer(|value, state, _| {
                state.draft_config.user.name = trimmed_string(value);
                Ok(())
            })
            .next_with(move |_, state, _| exit.transition(state)),
    ];

    Section {
        entry_id: ENTRY_ID.into(),
        exit_id,
        steps,
    }
}
