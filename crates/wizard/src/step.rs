//! Step graph model: passive step definitions plus pure render projections.
//!
//! Nothing here transitions or mutates; the engine consumes these shapes
//! when rendering and advancing.

use std::fmt;

use {
    futures::future::BoxFuture,
    serde::{Deserialize, Serialize},
    serde_json::Value,
};

use crate::{error::StepInterrupt, nav::NavAction};

// ── Presentation kinds ───────────────────────────────────────────────────────

/// Presentation kind of a step. Closed set; every consumer (render
/// projection, CLI prompt dispatch, RPC serialization) matches exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepKind {
    Note,
    Select,
    #[serde(rename = "multiselect")]
    MultiSelect,
    Text,
    Confirm,
    /// No user input: the step triggers an async side effect and advances.
    Action,
    Progress,
}

/// Who performs the step's side effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Executor {
    Gateway,
    Client,
}

/// One selectable option for `select`/`multiselect` steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepOption {
    pub value: Value,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl StepOption {
    pub fn new(value: impl Into<Value>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            hint: None,
        }
    }

    #[must_use]
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

// ── Dynamic fields ───────────────────────────────────────────────────────────

/// A step text field: either a static string or a function of the domain
/// state.
///
/// Resolving is read-only and repeatable: rendering the same step twice
/// against the same state yields the same text (relied on for re-render
/// after a failed validation).
pub enum TextSource<S> {
    Static(String),
    Dynamic(Box<dyn Fn(&S) -> Option<String> + Send + Sync>),
}

impl<S> TextSource<S> {
    pub fn resolve(&self, state: &S) -> Option<String> {
        match self {
            Self::Static(text) => Some(text.clone()),
            Self::Dynamic(f) => f(state),
        }
    }
}

impl<S> From<&str> for TextSource<S> {
    fn from(text: &str) -> Self {
        Self::Static(text.to_string())
    }
}

impl<S> From<String> for TextSource<S> {
    fn from(text: String) -> Self {
        Self::Static(text)
    }
}

/// Option list for a step: static or computed from the domain state.
pub enum OptionsSource<S> {
    Static(Vec<StepOption>),
    Dynamic(Box<dyn Fn(&S) -> Option<Vec<StepOption>> + Send + Sync>),
}

impl<S> OptionsSource<S> {
    pub fn resolve(&self, state: &S) -> Option<Vec<StepOption>> {
        match self {
            Self::Static(options) => Some(options.clone()),
            Self::Dynamic(f) => f(state),
        }
    }
}

// ── Transitions and hooks ────────────────────────────────────────────────────

/// What a step's `next` hook decides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Push the given step and continue.
    Goto(String),
    /// The flow terminates successfully.
    Done,
    /// Re-enter navigation (back or gated cancel) without consuming another
    /// external answer.
    Nav(NavAction),
}

impl Transition {
    pub fn goto(id: impl Into<String>) -> Self {
        Self::Goto(id.into())
    }
}

pub(crate) type InitialValueFn<S> = Box<dyn Fn(&S) -> Option<Value> + Send + Sync>;
pub(crate) type ValidateFn<S> = Box<dyn Fn(&Value, &S) -> Option<String> + Send + Sync>;
pub(crate) type AnswerFn<S, C> = Box<
    dyn for<'a> Fn(
            &'a Value,
            &'a mut S,
            &'a mut C,
        ) -> BoxFuture<'a, Result<(), StepInterrupt>>
        + Send
        + Sync,
>;
pub(crate) type NextFn<S, C> =
    Box<dyn Fn(&Value, &mut S, &mut C) -> Result<Transition, StepInterrupt> + Send + Sync>;

// ── Step definition ──────────────────────────────────────────────────────────

/// Authored, immutable definition of one step in a flow.
///
/// `S` is the flow's domain state, `C` the per-session context handed to
/// hooks for their call only.
pub struct StepDefinition<S, C> {
    pub(crate) id: String,
    pub(crate) kind: StepKind,
    pub(crate) title: Option<TextSource<S>>,
    pub(crate) message: Option<TextSource<S>>,
    pub(crate) options: Option<OptionsSource<S>>,
    pub(crate) initial_value: Option<InitialValueFn<S>>,
    pub(crate) placeholder: Option<TextSource<S>>,
    pub(crate) sensitive: bool,
    pub(crate) executor: Option<Executor>,
    pub(crate) validate: Option<ValidateFn<S>>,
    pub(crate) on_answer: Option<AnswerFn<S, C>>,
    pub(crate) next: Option<NextFn<S, C>>,
}

impl<S, C> StepDefinition<S, C> {
    pub fn new(id: impl Into<String>, kind: StepKind) -> Self {
        Self {
            id: id.into(),
            kind,
            title: None,
            message: None,
            options: None,
            initial_value: None,
            placeholder: None,
            sensitive: false,
            executor: None,
            validate: None,
            on_answer: None,
            next: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> StepKind {
        self.kind
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<TextSource<S>>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn message(mut self, message: impl Into<TextSource<S>>) -> Self {
        self.message = Some(message.into());
        self
    }

    #[must_use]
    pub fn message_with(mut self, f: impl Fn(&S) -> Option<String> + Send + Sync + 'static) -> Self {
        self.message = Some(TextSource::Dynamic(Box::new(f)));
        self
    }

    #[must_use]
    pub fn options(mut self, options: Vec<StepOption>) -> Self {
        self.options = Some(OptionsSource::Static(options));
        self
    }

    #[must_use]
    pub fn options_with(
        mut self,
        f: impl Fn(&S) -> Option<Vec<StepOption>> + Send + Sync + 'static,
    ) -> Self {
        self.options = Some(OptionsSource::Dynamic(Box::new(f)));
        self
    }

    #[must_use]
    pub fn initial_value_with(
        mut self,
        f: impl Fn(&S) -> Option<Value> + Send + Sync + 'static,
    ) -> Self {
        self.initial_value = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn placeholder(mut self, placeholder: impl Into<TextSource<S>>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    /// Mark the step's answer as secret: never echoed and never logged.
    #[must_use]
    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    #[must_use]
    pub fn executor(mut self, executor: Executor) -> Self {
        self.executor = Some(executor);
        self
    }

    /// Validation hook: return `Some(message)` to reject the answer. The
    /// engine re-renders the step with the message attached and mutates
    /// nothing.
    #[must_use]
    pub fn validate(
        mut self,
        f: impl Fn(&Value, &S) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        self.validate = Some(Box::new(f));
        self
    }

    /// Synchronous answer hook mutating the domain state in place.
    #[must_use]
    pub fn on_answer(
        mut self,
        f: impl Fn(&Value, &mut S, &mut C) -> Result<(), StepInterrupt> + Send + Sync + 'static,
    ) -> Self {
        self.on_answer = Some(Box::new(move |value, state, ctx| {
            let result = f(value, state, ctx);
            Box::pin(std::future::ready(result))
        }));
        self
    }

    /// Asynchronous answer hook. The engine awaits the returned future before
    /// computing the next render; the state borrow lasts for the call only.
    #[must_use]
    pub fn on_answer_async(
        mut self,
        f: impl for<'a> Fn(
                &'a Value,
                &'a mut S,
                &'a mut C,
            ) -> BoxFuture<'a, Result<(), StepInterrupt>>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        self.on_answer = Some(Box::new(f));
        self
    }

    /// Unconditional transition to a fixed step id.
    #[must_use]
    pub fn next_to(mut self, id: impl Into<String>) -> Self {
        let id = id.into();
        self.next = Some(Box::new(move |_, _, _| Ok(Transition::Goto(id.clone()))));
        self
    }

    /// Transition computed from the answer and state.
    #[must_use]
    pub fn next_with(
        mut self,
        f: impl Fn(&Value, &mut S, &mut C) -> Transition + Send + Sync + 'static,
    ) -> Self {
        self.next = Some(Box::new(move |value, state, ctx| Ok(f(value, state, ctx))));
        self
    }

    /// Fallible transition; an `Err` terminates the session.
    #[must_use]
    pub fn try_next_with(
        mut self,
        f: impl Fn(&Value, &mut S, &mut C) -> Result<Transition, StepInterrupt>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        self.next = Some(Box::new(f));
        self
    }
}

impl<S, C> fmt::Debug for StepDefinition<S, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepDefinition")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("sensitive", &self.sensitive)
            .field("executor", &self.executor)
            .finish_non_exhaustive()
    }
}

// ── Render projection ────────────────────────────────────────────────────────

/// Transport-facing projection of a step, with every dynamic field resolved
/// against the current domain state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedStep {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: StepKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<StepOption>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub sensitive: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub executor: Option<Executor>,
}
