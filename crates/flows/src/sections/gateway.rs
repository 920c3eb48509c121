//! Gateway section: listen port and auth token.

use {serde_json::Value, uuid::Uuid};

use waypoint_wizard::{Section, StepKind};

use crate::{
    flows::{SetupSectionSteps, SetupStep},
    sections::{SectionExit, commit_config, is_yes, trimmed_string},
    state::SetupState,
};

const ENTRY_ID: &str = "gateway.port";

fn parse_port(value: &Value) -> Option<u16> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .and_then(|n| u16::try_from(n).ok())
            .filter(|port| *port > 0),
        Value::String(_) => trimmed_string(value)?.parse::<u16>().ok().filter(|p| *p > 0),
        _ => None,
    }
}

pub fn build_gateway_section(exit: SectionExit) -> SetupSectionSteps {
    let exit_id = exit.exit_id().to_string();
    let steps = vec![
        SetupStep::new(ENTRY_ID, StepKind::Text)
            .title("Gateway port")
            .message("Port the gateway listens on")
            .initial_value_with(|state: &SetupState| {
                Some(Value::String(state.gateway_port.to_string()))
            })
            .validate(|value, _| {
                if parse_port(value).is_some() {
                    None
                } else {
                    Some("enter a port between 1 and 65535".to_string())
                }
            })
            .on_answer(|value, state, _| {
                if let Some(port) = parse_port(value) {
                    state.gateway_port = port;
                    state.draft_config.gateway.port = port;
                }
                Ok(())
            })
            .next_to("gateway.auth"),
        SetupStep::new("gateway.auth", StepKind::Confirm)
            .title("Auth token")
            .message_with(|state: &SetupState| {
                Some(if state.draft_config.gateway.auth_token.is_some() {
                    "Replace the existing gateway auth token?".to_string()
                } else {
                    "Generate a gateway auth token?".to_string()
                })
            })
            .initial_value_with(|state: &SetupState| {
                Some(Value::Bool(state.draft_config.gateway.auth_token.is_none()))
            })
            .on_answer(|value, state, _| {
                if is_yes(value) {
                    state.draft_config.gateway.auth_token =
                        Some(Uuid::new_v4().to_string());
                }
                Ok(())
            })
            .next_to("gateway.apply"),
        SetupStep::new("gateway.apply", StepKind::Action)
            .title("Apply gateway settings")
            .message_with(|state: &SetupState| {
                Some(format!(
                    "Save gateway configuration (port {}).",
                    state.gateway_port
                ))
            })
            .on_answer(|_, state, ctx| commit_config(state, ctx))
            .next_with(move |_, state, _| exit.transition(state)),
    ];

    Section {
        entry_id: ENTRY_ID.into(),
        exit_id,
        steps,
    }
}
