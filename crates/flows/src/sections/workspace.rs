//! Workspace section: where the agent works, plus the apply step that
//! creates the directory and commits the config.

use serde_json::Value;

use waypoint_wizard::{Section, StepInterrupt, StepKind};

use crate::{
    flows::{SetupSectionSteps, SetupStep},
    sections::{SectionExit, commit_config, trimmed_string},
    state::{SetupState, default_workspace, resolve_user_path},
};

const ENTRY_ID: &str = "workspace.path";

pub fn build_workspace_section(exit: SectionExit) -> SetupSectionSteps {
    let exit_id = exit.exit_id().to_string();
    let steps = vec![
        SetupStep::new(ENTRY_ID, StepKind::Text)
            .title("Workspace")
            .message("Workspace directory")
            .initial_value_with(|state: &SetupState| {
                Some(Value::String(state.workspace_dir.clone()))
            })
            .on_answer(|value, state, _| {
                let dir = resolve_user_path(
                    &trimmed_string(value).unwrap_or_else(default_workspace),
                );
                state.workspace_dir = dir.clone();
                state.draft_config.agent.workspace = Some(dir);
                Ok(())
            })
            .next_to("workspace.apply"),
        SetupStep::new("workspace.apply", StepKind::Action)
            .title("Apply workspace")
            .message_with(|state: &SetupState| {
                Some(format!(
                    "Create {} and save the configuration.",
                    state.workspace_dir
                ))
            })
            .on_answer(|_, state, ctx| {
                std::fs::create_dir_all(&state.workspace_dir).map_err(|e| {
                    StepInterrupt::failed(format!(
                        "failed to create workspace {}: {e}",
                        state.workspace_dir
                    ))
                })?;
                commit_config(state, ctx)
            })
            .next_with(move |_, state, _| exit.transition(state)),
    ];

    Section {
        entry_id: ENTRY_ID.into(),
        exit_id,
        steps,
    }
}
