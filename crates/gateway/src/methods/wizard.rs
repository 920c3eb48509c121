//! `wizard.*` methods: start, advance, cancel, and inspect setup sessions.

use {
    serde::de::DeserializeOwned,
    serde_json::{Value, json},
    tracing::debug,
    uuid::Uuid,
};

use {
    waypoint_flows::{SetupCommand, SetupEngine, SetupSection, SetupState, configure_flow, onboarding_flow},
    waypoint_protocol::{ErrorShape, WizardCancelParams, WizardNextParams, WizardStartParams, WizardStatusParams},
    waypoint_wizard::{NavAction, NextParams, SessionStatus, WizardEngine},
};

use crate::{
    methods::{MethodContext, MethodRegistry, MethodResult},
    state::GatewayState,
};

pub(crate) fn register(reg: &mut MethodRegistry) {
    reg.register("wizard.start", Box::new(|ctx| Box::pin(wizard_start(ctx))));
    reg.register("wizard.next", Box::new(|ctx| Box::pin(wizard_next(ctx))));
    reg.register("wizard.cancel", Box::new(|ctx| Box::pin(wizard_cancel(ctx))));
    reg.register("wizard.status", Box::new(|ctx| Box::pin(wizard_status(ctx))));
}

// ── Param parsing ────────────────────────────────────────────────────────────

fn parse_optional<T: DeserializeOwned + Default>(params: &Value, method: &str) -> Result<T, ErrorShape> {
    if params.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(params.clone())
        .map_err(|e| ErrorShape::invalid_request(format!("invalid {method} params: {e}")))
}

fn parse_required<T: DeserializeOwned>(params: &Value, method: &str) -> Result<T, ErrorShape> {
    serde_json::from_value(params.clone())
        .map_err(|e| ErrorShape::invalid_request(format!("invalid {method} params: {e}")))
}

fn parse_section_names(names: &[String]) -> Result<Vec<SetupSection>, ErrorShape> {
    let mut sections = Vec::with_capacity(names.len());
    let mut unknown = Vec::new();
    for name in names {
        match SetupSection::parse(name) {
            Some(section) => sections.push(section),
            None => unknown.push(name.clone()),
        }
    }
    if unknown.is_empty() {
        Ok(sections)
    } else {
        Err(ErrorShape::invalid_request(format!(
            "unknown sections: {}",
            unknown.join(", "),
        )))
    }
}

// ── Engine construction ──────────────────────────────────────────────────────

fn build_engine(gw: &GatewayState, params: WizardStartParams) -> Result<SetupEngine, ErrorShape> {
    let sections = match params.sections.as_deref() {
        Some(names) => parse_section_names(names)?,
        None => Vec::new(),
    };
    let command = match params.mode.as_deref() {
        Some("configure") => SetupCommand::Configure,
        Some("onboard") => SetupCommand::Onboard,
        Some(other) => {
            return Err(ErrorShape::invalid_request(format!("invalid mode: {other}")));
        },
        None if !sections.is_empty() => SetupCommand::Configure,
        None => SetupCommand::Onboard,
    };

    let base = waypoint_config::discover_and_load();
    let mut state = SetupState::new(command, base, params.workspace, sections);
    let flow = match command {
        SetupCommand::Onboard => onboarding_flow(),
        SetupCommand::Configure => configure_flow(&mut state),
    }
    .map_err(|e| ErrorShape::unavailable(format!("failed to build flow: {e}")))?;
    Ok(WizardEngine::new(flow, state, gw.context.clone()))
}

fn result_payload(result: &waypoint_wizard::EngineResult) -> MethodResult {
    serde_json::to_value(result)
        .map_err(|e| ErrorShape::unavailable(format!("serialize result: {e}")))
}

// ── Handlers ─────────────────────────────────────────────────────────────────

async fn wizard_start(ctx: MethodContext) -> MethodResult {
    let params: WizardStartParams = parse_optional(&ctx.params, "wizard.start")?;
    if ctx.state.has_running_session().await {
        return Err(ErrorShape::unavailable("wizard already running"));
    }

    let mut engine = build_engine(&ctx.state, params)?;
    let session_id = Uuid::new_v4().to_string();
    let result = engine.start();
    if !result.done {
        ctx.state.insert_session(session_id.clone(), engine).await;
    }
    debug!(session_id = %session_id, "wizard session started");

    let mut payload = result_payload(&result)?;
    if let Some(map) = payload.as_object_mut() {
        map.insert("sessionId".into(), Value::String(session_id));
    }
    Ok(payload)
}

async fn wizard_next(ctx: MethodContext) -> MethodResult {
    let params: WizardNextParams = parse_required(&ctx.params, "wizard.next")?;
    let Some(handle) = ctx.state.session(&params.session_id).await else {
        return Err(ErrorShape::invalid_request("wizard not found"));
    };

    let nav = match params.nav.as_deref() {
        None => NavAction::Next,
        Some(raw) => NavAction::parse(raw)
            .ok_or_else(|| ErrorShape::invalid_request(format!("invalid nav: {raw}")))?,
    };
    let (step_id, value) = match params.answer {
        Some(answer) => (answer.step_id, answer.value),
        None => (None, None),
    };

    let result = {
        let mut engine = handle.lock().await;
        engine.next(NextParams { step_id, value, nav }).await
    };
    if result.done {
        ctx.state.remove_session(&params.session_id).await;
        debug!(session_id = %params.session_id, status = ?result.status, "wizard session finished");
    }
    result_payload(&result)
}

async fn wizard_cancel(ctx: MethodContext) -> MethodResult {
    let params: WizardCancelParams = parse_required(&ctx.params, "wizard.cancel")?;
    let Some(handle) = ctx.state.session(&params.session_id).await else {
        return Err(ErrorShape::invalid_request("wizard not found"));
    };

    let payload = {
        let mut engine = handle.lock().await;
        engine.cancel();
        json!({ "status": engine.status(), "error": engine.error() })
    };
    ctx.state.remove_session(&params.session_id).await;
    debug!(session_id = %params.session_id, "wizard session cancelled");
    Ok(payload)
}

async fn wizard_status(ctx: MethodContext) -> MethodResult {
    let params: WizardStatusParams = parse_required(&ctx.params, "wizard.status")?;
    let Some(handle) = ctx.state.session(&params.session_id).await else {
        return Err(ErrorShape::invalid_request("wizard not found"));
    };

    let (status, error) = {
        let engine = handle.lock().await;
        (engine.status(), engine.error().map(str::to_string))
    };
    // Lazy cleanup: a session observed terminal is of no further use.
    if status != SessionStatus::Running {
        ctx.state.remove_session(&params.session_id).await;
    }
    Ok(json!({ "status": status, "error": error }))
}
