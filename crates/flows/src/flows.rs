//! The two shipped flows: full onboarding and selective configure.

use serde_json::Value;

use waypoint_wizard::{
    Flow, FlowError, Section, StepDefinition, StepKind, StepOption, Transition, WizardEngine,
};

use crate::{
    context::SetupContext,
    sections::{
        SectionExit, build_gateway_section, build_identity_section, build_workspace_section,
    },
    state::{
        SECTION_ORDER, SetupSection, SetupState, next_selected_section,
        normalize_section_selection,
    },
};

pub type SetupStep = StepDefinition<SetupState, SetupContext>;
pub type SetupFlow = Flow<SetupState, SetupContext>;
pub type SetupSectionSteps = Section<SetupState, SetupContext>;
pub type SetupEngine = WizardEngine<SetupState, SetupContext>;

const FINISH_ONBOARD: &str = "onboard.finish";
const FINISH_CONFIGURE: &str = "configure.finish";
const SECTION_PICKER: &str = "configure.sections";

/// Full first-run flow: welcome, then every section in order.
pub fn onboarding_flow() -> Result<SetupFlow, FlowError> {
    let gateway = build_gateway_section(SectionExit::goto(FINISH_ONBOARD));
    let workspace = build_workspace_section(SectionExit::goto(gateway.entry_id.clone()));
    let identity = build_identity_section(SectionExit::goto(workspace.entry_id.clone()));

    let welcome = SetupStep::new("onboard.welcome", StepKind::Note)
        .title("Welcome")
        .message("Let's set up your agent. Answer a few questions; you can go back at any step.")
        .next_to(identity.entry_id.clone());
    let finish = SetupStep::new(FINISH_ONBOARD, StepKind::Note)
        .title("Done")
        .message("Onboarding complete.")
        .next_with(|_, _, _| Transition::Done);

    Flow::from_sections(
        "onboard.welcome",
        vec![identity, workspace, gateway],
        vec![welcome, finish],
    )
}

/// Selective re-configuration. With a pre-selected section list the flow
/// starts directly in the first selected section; otherwise it opens with
/// the section picker.
pub fn configure_flow(state: &mut SetupState) -> Result<SetupFlow, FlowError> {
    state.sections = normalize_section_selection(&state.sections);
    state.section_index = 0;
    let start_id = match state.sections.first().copied() {
        Some(section) => {
            state.section_index = 1;
            section.entry_id().to_string()
        },
        None => SECTION_PICKER.to_string(),
    };

    let exit = SectionExit::next_selected(FINISH_CONFIGURE);
    let sections = vec![
        build_identity_section(exit.clone()),
        build_workspace_section(exit.clone()),
        build_gateway_section(exit),
    ];

    let picker = SetupStep::new(SECTION_PICKER, StepKind::MultiSelect)
        .title("Configure")
        .message("Select sections to configure")
        .options(
            SECTION_ORDER
                .iter()
                .map(|section| StepOption::new(section.as_str(), section.label()))
                .collect(),
        )
        .validate(|value, _| {
            if parse_sections(value).is_empty() {
                Some("select at least one section".to_string())
            } else {
                None
            }
        })
        .on_answer(|value, state, _| {
            state.sections = normalize_section_selection(&parse_sections(value));
            state.section_index = 0;
            Ok(())
        })
        .next_with(|_, state, _| next_selected_section(state, FINISH_CONFIGURE));
    let finish = SetupStep::new(FINISH_CONFIGURE, StepKind::Note)
        .title("Done")
        .message("Configuration updated.")
        .next_with(|_, _, _| Transition::Done);

    Flow::from_sections(start_id, sections, vec![picker, finish])
}

/// Parse a multiselect answer into known sections; unknown names are
/// dropped.
fn parse_sections(value: &Value) -> Vec<SetupSection> {
    let Some(items) = value.as_array() else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| item.as_str())
        .filter_map(SetupSection::parse)
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use {serde_json::json, waypoint_config::Config, waypoint_wizard::NextParams};

    use super::*;
    use crate::state::SetupCommand;

    fn onboard_engine(workspace: &str) -> (SetupEngine, std::sync::Arc<crate::MemoryConfigStore>) {
        let (ctx, store) = SetupContext::in_memory();
        let state = SetupState::new(
            SetupCommand::Onboard,
            Config::default(),
            Some(workspace.to_string()),
            vec![],
        );
        let engine = WizardEngine::new(onboarding_flow().unwrap(), state, ctx);
        (engine, store)
    }

    fn configure_engine(
        sections: Vec<SetupSection>,
    ) -> (SetupEngine, std::sync::Arc<crate::MemoryConfigStore>) {
        let (ctx, store) = SetupContext::in_memory();
        let mut state = SetupState::new(
            SetupCommand::Configure,
            Config::default(),
            None,
            sections,
        );
        let flow = configure_flow(&mut state).unwrap();
        (WizardEngine::new(flow, state, ctx), store)
    }

    #[tokio::test]
    async fn onboarding_walks_every_section_and_commits() {
        let dir = tempfile::tempdir().unwrap();
        let workspace = dir.path().join("ws").to_string_lossy().into_owned();
        let (mut engine, store) = onboard_engine(&workspace);

        let result = engine.start();
        assert_eq!(result.step.as_ref().unwrap().id, "onboard.welcome");

        let result = engine
            .next(NextParams::answer("onboard.welcome", Value::Null))
            .await;
        let step = result.step.unwrap();
        assert_eq!(step.id, "identity.agent_name");
        assert_eq!(step.placeholder.as_deref(), Some("Waypoint"));

        engine
            .next(NextParams::answer("identity.agent_name", "Hub"))
            .await;
        engine
            .next(NextParams::answer("identity.user_name", "Ada"))
            .await;
        let result = engine
            .next(NextParams::answer("workspace.path", workspace.clone()))
            .await;
        assert_eq!(result.step.unwrap().id, "workspace.apply");

        let result = engine
            .next(NextParams::answer("workspace.apply", true))
            .await;
        let step = result.step.unwrap();
        assert_eq!(step.id, "gateway.port");
        assert_eq!(step.initial_value, Some(json!("18789")));

        engine.next(NextParams::answer("gateway.port", "9200")).await;
        engine.next(NextParams::answer("gateway.auth", true)).await;
        let result = engine.next(NextParams::answer("gateway.apply", true)).await;
        assert_eq!(result.step.as_ref().unwrap().id, "onboard.finish");

        let result = engine
            .next(NextParams::answer("onboard.finish", Value::Null))
            .await;
        assert!(result.done);

        let saved = store.saved().unwrap();
        assert_eq!(saved.identity.name.as_deref(), Some("Hub"));
        assert_eq!(saved.user.name.as_deref(), Some("Ada"));
        assert_eq!(saved.agent.workspace.as_deref(), Some(workspace.as_str()));
        assert_eq!(saved.gateway.port, 9200);
        assert!(saved.gateway.auth_token.is_some());
        assert!(dir.path().join("ws").is_dir());
    }

    #[tokio::test]
    async fn picker_routes_to_selected_sections_in_order() {
        let (mut engine, store) = configure_engine(vec![]);
        let result = engine.start();
        let step = result.step.unwrap();
        assert_eq!(step.id, SECTION_PICKER);
        assert_eq!(step.options.unwrap().len(), SECTION_ORDER.len());

        // Selection order does not matter; canonical order does.
        let result = engine
            .next(NextParams::answer(
                SECTION_PICKER,
                json!(["gateway", "identity"]),
            ))
            .await;
        assert_eq!(result.step.unwrap().id, "identity.agent_name");

        engine
            .next(NextParams::answer("identity.agent_name", "Hub"))
            .await;
        let result = engine
            .next(NextParams::answer("identity.user_name", ""))
            .await;
        assert_eq!(result.step.unwrap().id, "gateway.port");

        engine.next(NextParams::answer("gateway.port", "9300")).await;
        engine.next(NextParams::answer("gateway.auth", false)).await;
        let result = engine.next(NextParams::answer("gateway.apply", true)).await;
        assert_eq!(result.step.as_ref().unwrap().id, FINISH_CONFIGURE);

        let result = engine
            .next(NextParams::answer(FINISH_CONFIGURE, Value::Null))
            .await;
        assert!(result.done);

        let saved = store.saved().unwrap();
        assert_eq!(saved.gateway.port, 9300);
        assert!(saved.gateway.auth_token.is_none());
    }

    #[tokio::test]
    async fn back_crosses_the_section_boundary() {
        let dir = tempfile::tempdir().unwrap();
        let workspace = dir.path().join("ws").to_string_lossy().into_owned();
        let (mut engine, _store) = onboard_engine(&workspace);

        engine.start();
        engine
            .next(NextParams::answer("onboard.welcome", Value::Null))
            .await;
        engine
            .next(NextParams::answer("identity.agent_name", "Hub"))
            .await;
        let result = engine
            .next(NextParams::answer("identity.user_name", "Ada"))
            .await;
        assert_eq!(result.step.unwrap().id, "workspace.path");

        // Back from the workspace section lands on the last identity step,
        // with its state snapshot restored and the prior answer replayed.
        let result = engine
            .next(NextParams::nav(waypoint_wizard::NavAction::Back))
            .await;
        let step = result.step.unwrap();
        assert_eq!(step.id, "identity.user_name");
        assert_eq!(step.initial_value, Some(json!("Ada")));
        assert!(engine.state().draft_config.user.name.is_none());

        let result = engine
            .next(NextParams::answer("identity.user_name", "Grace"))
            .await;
        assert_eq!(result.step.unwrap().id, "workspace.path");
        assert_eq!(
            engine.state().draft_config.user.name.as_deref(),
            Some("Grace"),
        );
    }

    #[tokio::test]
    async fn empty_selection_is_rejected() {
        let (mut engine, _store) = configure_engine(vec![]);
        engine.start();
        let result = engine
            .next(NextParams::answer(SECTION_PICKER, json!([])))
            .await;
        assert_eq!(result.error.as_deref(), Some("select at least one section"));
        assert_eq!(result.step.unwrap().id, SECTION_PICKER);
    }

    #[tokio::test]
    async fn preselected_sections_skip_the_picker() {
        let (mut engine, _store) = configure_engine(vec![SetupSection::Gateway]);
        let result = engine.start();
        assert_eq!(result.step.unwrap().id, "gateway.port");
    }

    #[tokio::test]
    async fn bad_port_is_rejected_without_advancing() {
        let (mut engine, _store) = configure_engine(vec![SetupSection::Gateway]);
        engine.start();
        let result = engine
            .next(NextParams::answer("gateway.port", "not-a-port"))
            .await;
        assert_eq!(
            result.error.as_deref(),
            Some("enter a port between 1 and 65535"),
        );
        assert_eq!(result.step.unwrap().id, "gateway.port");
        assert_eq!(engine.state().gateway_port, 18789);
    }

    #[tokio::test]
    async fn failing_store_terminates_the_session() {
        struct FailingStore;
        impl crate::ConfigStore for FailingStore {
            fn commit(&self, _: &Config) -> anyhow::Result<Config> {
                anyhow::bail!("disk full")
            }
        }

        let ctx = SetupContext {
            store: std::sync::Arc::new(FailingStore),
        };
        let mut state = SetupState::new(
            SetupCommand::Configure,
            Config::default(),
            None,
            vec![SetupSection::Gateway],
        );
        let flow = configure_flow(&mut state).unwrap();
        let mut engine = WizardEngine::new(flow, state, ctx);
        engine.start();
        engine.next(NextParams::answer("gateway.port", "9400")).await;
        engine.next(NextParams::answer("gateway.auth", false)).await;
        let result = engine.next(NextParams::answer("gateway.apply", true)).await;
        assert!(result.done);
        assert_eq!(
            result.status,
            waypoint_wizard::SessionStatus::Error,
        );
        assert!(result.error.unwrap().contains("disk full"));
    }
}
