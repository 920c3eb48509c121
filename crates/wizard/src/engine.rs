//! The stateful wizard runtime: navigation stack, answer history, snapshot
//! restore on back-navigation, and the gated exit confirmation.
//!
//! One engine instance is one session. Methods take `&mut self`, so
//! concurrent calls on the same session are unrepresentable; a transport
//! serializing access (the gateway wraps each session in a mutex) gets the
//! single-writer guarantee for free. Sessions never share state.

use std::collections::HashMap;

use {
    serde::{Deserialize, Serialize},
    serde_json::Value,
    tracing::{debug, warn},
};

use crate::{
    error::StepInterrupt,
    flow::{EXIT_STEP_ID, Flow},
    nav::NavAction,
    step::{RenderedStep, StepKind, Transition},
};

// ── Result shapes ────────────────────────────────────────────────────────────

/// Session lifecycle. `Running` is the initial state; all others are
/// absorbing: once left, a session never runs again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Running,
    Done,
    Cancelled,
    Error,
}

impl SessionStatus {
    pub fn is_terminal(self) -> bool {
        self != Self::Running
    }
}

/// What a transport shows after each engine call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineResult {
    pub done: bool,
    pub status: SessionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<RenderedStep>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub can_go_back: Option<bool>,
}

/// Parameters for [`WizardEngine::next`].
#[derive(Debug, Clone, Default)]
pub struct NextParams {
    /// The step the client believes it is answering. A mismatch with the
    /// engine's actual current step is fatal: it signals a desynchronized
    /// client (stale UI, duplicate submit), not bad input.
    pub step_id: Option<String>,
    pub value: Option<Value>,
    pub nav: NavAction,
}

impl NextParams {
    pub fn answer(step_id: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            step_id: Some(step_id.into()),
            value: Some(value.into()),
            nav: NavAction::Next,
        }
    }

    pub fn nav(nav: NavAction) -> Self {
        Self {
            step_id: None,
            value: None,
            nav,
        }
    }
}

/// Presentation of the synthetic exit-confirmation step.
#[derive(Debug, Clone)]
pub struct ExitConfirm {
    pub title: String,
    pub message: String,
}

impl Default for ExitConfirm {
    fn default() -> Self {
        Self {
            title: "Exit setup".into(),
            message: "Exit setup? Your in-progress changes will be lost.".into(),
        }
    }
}

// ── Engine ───────────────────────────────────────────────────────────────────

/// Snapshot of the domain state captured immediately before a step's
/// `on_answer` ran, keyed by step id. Restored when navigating back.
struct StepSnapshot<S> {
    step_id: String,
    state_before: S,
}

enum RunOutcome {
    Invalid(String),
    Interrupt(StepInterrupt),
    Transition(Transition),
    MissingStep,
}

/// One wizard session walking one [`Flow`].
///
/// The engine owns the domain state outright; step hooks borrow it for the
/// duration of their call only.
pub struct WizardEngine<S, C> {
    flow: Flow<S, C>,
    state: S,
    context: C,
    /// Last-known raw answer per step id, replayed as `initial_value` when a
    /// step is re-rendered.
    answers: HashMap<String, Value>,
    history: Vec<StepSnapshot<S>>,
    /// Path taken through the graph; top of stack is the current step.
    stack: Vec<String>,
    status: SessionStatus,
    error: Option<String>,
    exit: ExitConfirm,
    /// Step to resume at if the exit confirmation is declined. Set only
    /// while the exit step is on top of the stack.
    pending_exit_return: Option<String>,
}

impl<S: Clone, C> WizardEngine<S, C> {
    pub fn new(flow: Flow<S, C>, initial_state: S, context: C) -> Self {
        let stack = vec![flow.start_id().to_string()];
        Self {
            flow,
            state: initial_state,
            context,
            answers: HashMap::new(),
            history: Vec::new(),
            stack,
            status: SessionStatus::Running,
            error: None,
            exit: ExitConfirm::default(),
            pending_exit_return: None,
        }
    }

    #[must_use]
    pub fn with_exit_confirm(mut self, exit: ExitConfirm) -> Self {
        self.exit = exit;
        self
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    pub fn can_go_back(&self) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        // The exit confirmation can always be dismissed.
        if self.current_step_id() == Some(EXIT_STEP_ID) {
            return true;
        }
        self.stack.len() > 1
    }

    /// Render the step at the top of the stack. No side effects.
    pub fn start(&mut self) -> EngineResult {
        if self.status.is_terminal() {
            return self.terminal_result();
        }
        self.render_current()
    }

    /// Advance the session with an answer and a navigation hint.
    ///
    /// Terminal sessions are inert: every call returns the same terminal
    /// result and mutates nothing.
    pub async fn next(&mut self, params: NextParams) -> EngineResult {
        if self.status.is_terminal() {
            return self.terminal_result();
        }
        match params.nav {
            NavAction::Back => return self.go_back(),
            NavAction::Cancel => return self.begin_cancel(),
            NavAction::Next => {},
        }

        let Some(step_id) = self.current_step_id().map(str::to_string) else {
            // Empty stack while running: nothing left to ask.
            self.status = SessionStatus::Done;
            return self.terminal_result();
        };
        if let Some(claimed) = params.step_id.as_deref()
            && claimed != step_id
        {
            warn!(expected = %step_id, got = %claimed, "step mismatch, desynchronized client");
            return self.fail(format!("step mismatch: expected {step_id}, got {claimed}"));
        }

        let value = params.value.unwrap_or(Value::Null);
        if step_id == EXIT_STEP_ID {
            return self.resolve_exit(&value);
        }

        match self.run_step(&step_id, &value).await {
            RunOutcome::Invalid(message) => {
                debug!(step = %step_id, "validation rejected answer");
                EngineResult {
                    done: false,
                    status: self.status,
                    step: self.render_step(&step_id),
                    error: Some(message),
                    can_go_back: Some(self.can_go_back()),
                }
            },
            RunOutcome::Interrupt(interrupt) => self.apply_interrupt(interrupt),
            RunOutcome::Transition(transition) => self.apply_transition(transition),
            RunOutcome::MissingStep => self.fail(format!("missing step: {step_id}")),
        }
    }

    /// Hard, ungated cancellation for a transport force-terminating the
    /// session. The gated path is `next` with [`NavAction::Cancel`].
    pub fn cancel(&mut self) {
        if self.status.is_terminal() {
            return;
        }
        self.status = SessionStatus::Cancelled;
        self.error = Some("cancelled".into());
        self.stack.clear();
    }

    // ── Step execution ───────────────────────────────────────────────────────

    async fn run_step(&mut self, step_id: &str, value: &Value) -> RunOutcome {
        let Some(step) = self.flow.step(step_id) else {
            return RunOutcome::MissingStep;
        };
        if let Some(validate) = &step.validate
            && let Some(message) = validate(value, &self.state)
        {
            return RunOutcome::Invalid(message);
        }

        // Snapshot before any mutation so back can restore the exact state
        // this answer was given against. Re-answering replaces the entry.
        self.history.retain(|snapshot| snapshot.step_id != step_id);
        self.history.push(StepSnapshot {
            step_id: step_id.to_string(),
            state_before: self.state.clone(),
        });
        self.answers.insert(step_id.to_string(), value.clone());
        // Answer values are never logged; steps may be sensitive.
        debug!(step = %step_id, "answer accepted");

        if let Some(on_answer) = &step.on_answer
            && let Err(interrupt) = on_answer(value, &mut self.state, &mut self.context).await
        {
            return RunOutcome::Interrupt(interrupt);
        }
        match &step.next {
            Some(next) => match next(value, &mut self.state, &mut self.context) {
                Ok(transition) => RunOutcome::Transition(transition),
                Err(interrupt) => RunOutcome::Interrupt(interrupt),
            },
            None => RunOutcome::Transition(Transition::Done),
        }
    }

    fn apply_transition(&mut self, transition: Transition) -> EngineResult {
        match transition {
            Transition::Goto(next_id) => {
                debug!(to = %next_id, "advancing");
                self.stack.push(next_id);
                self.render_current()
            },
            Transition::Done => {
                debug!("flow complete");
                self.status = SessionStatus::Done;
                self.stack.clear();
                self.terminal_result()
            },
            // Steps may redirect into navigation without consuming another
            // external answer.
            Transition::Nav(NavAction::Back) => self.go_back(),
            Transition::Nav(NavAction::Cancel) => self.begin_cancel(),
            Transition::Nav(NavAction::Next) => self.render_current(),
        }
    }

    fn apply_interrupt(&mut self, interrupt: StepInterrupt) -> EngineResult {
        match interrupt {
            StepInterrupt::Cancelled(message) => {
                debug!(%message, "step cancelled the session");
                self.status = SessionStatus::Cancelled;
                self.error = Some(message);
            },
            StepInterrupt::Failed(message) => {
                warn!(%message, "step failed, session terminated");
                self.status = SessionStatus::Error;
                self.error = Some(message);
            },
        }
        self.terminal_result()
    }

    // ── Navigation ───────────────────────────────────────────────────────────

    fn go_back(&mut self) -> EngineResult {
        if self.stack.len() <= 1 {
            return self.render_current();
        }
        let Some(removed) = self.stack.pop() else {
            return self.render_current();
        };
        if removed == EXIT_STEP_ID {
            // Dismissing the confirmation; nothing was recorded for it and
            // no older snapshot is restored.
            self.pending_exit_return = None;
            return self.render_current();
        }
        self.answers.remove(&removed);
        self.history.retain(|snapshot| snapshot.step_id != removed);
        if let Some(previous) = self.current_step_id()
            && let Some(snapshot) = self
                .history
                .iter()
                .rev()
                .find(|snapshot| snapshot.step_id == previous)
        {
            self.state = snapshot.state_before.clone();
        }
        debug!(from = %removed, "navigated back");
        self.render_current()
    }

    fn begin_cancel(&mut self) -> EngineResult {
        let Some(current) = self.current_step_id().map(str::to_string) else {
            return self.cancel_terminal();
        };
        if current == EXIT_STEP_ID {
            // Cancelling the confirmation itself confirms the exit.
            return self.resolve_exit(&Value::Bool(true));
        }
        self.pending_exit_return = Some(current);
        self.stack.push(EXIT_STEP_ID.to_string());
        self.render_current()
    }

    fn resolve_exit(&mut self, value: &Value) -> EngineResult {
        let should_exit = is_truthy(value);
        let return_to = self.pending_exit_return.take();
        self.stack.pop();
        if should_exit || return_to.is_none() {
            return self.cancel_terminal();
        }
        // Declined: resume exactly where the user was.
        self.render_current()
    }

    fn cancel_terminal(&mut self) -> EngineResult {
        self.status = SessionStatus::Cancelled;
        self.error = Some("cancelled".into());
        self.stack.clear();
        self.terminal_result()
    }

    // ── Rendering ────────────────────────────────────────────────────────────

    fn current_step_id(&self) -> Option<&str> {
        self.stack.last().map(String::as_str)
    }

    fn render_current(&mut self) -> EngineResult {
        if self.status.is_terminal() {
            return self.terminal_result();
        }
        let Some(step_id) = self.current_step_id().map(str::to_string) else {
            self.status = SessionStatus::Done;
            return self.terminal_result();
        };
        if step_id == EXIT_STEP_ID {
            return EngineResult {
                done: false,
                status: self.status,
                step: Some(RenderedStep {
                    id: EXIT_STEP_ID.into(),
                    kind: StepKind::Confirm,
                    title: Some(self.exit.title.clone()),
                    message: Some(self.exit.message.clone()),
                    options: None,
                    initial_value: Some(Value::Bool(false)),
                    placeholder: None,
                    sensitive: false,
                    executor: None,
                }),
                error: None,
                can_go_back: Some(true),
            };
        }
        match self.render_step(&step_id) {
            Some(step) => EngineResult {
                done: false,
                status: self.status,
                step: Some(step),
                error: None,
                can_go_back: Some(self.can_go_back()),
            },
            None => self.fail(format!("missing step: {step_id}")),
        }
    }

    fn render_step(&self, step_id: &str) -> Option<RenderedStep> {
        let step = self.flow.step(step_id)?;
        // Replay the previously given answer over the step's own default.
        let initial_value = match self.answers.get(step_id) {
            Some(answer) => Some(answer.clone()),
            None => step
                .initial_value
                .as_ref()
                .and_then(|default| default(&self.state)),
        };
        Some(RenderedStep {
            id: step.id.clone(),
            kind: step.kind,
            title: step.title.as_ref().and_then(|t| t.resolve(&self.state)),
            message: step.message.as_ref().and_then(|m| m.resolve(&self.state)),
            options: step.options.as_ref().and_then(|o| o.resolve(&self.state)),
            initial_value,
            placeholder: step
                .placeholder
                .as_ref()
                .and_then(|p| p.resolve(&self.state)),
            sensitive: step.sensitive,
            executor: step.executor,
        })
    }

    fn fail(&mut self, message: String) -> EngineResult {
        self.status = SessionStatus::Error;
        self.error = Some(message);
        self.stack.clear();
        self.terminal_result()
    }

    fn terminal_result(&self) -> EngineResult {
        EngineResult {
            done: true,
            status: self.status,
            step: None,
            error: self.error.clone(),
            can_go_back: None,
        }
    }
}

/// JS-style truthiness, so RPC clients can answer the confirm step with a
/// bool or a string equally.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
