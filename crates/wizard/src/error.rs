use thiserror::Error;

/// Signal raised by a step's `on_answer` or `next` hook.
///
/// Both variants terminate the session; the difference is how the transport
/// should present it. `Cancelled` is the cooperative hard-abort path (the
/// user or a step decided to stop); `Failed` is a real fault.
#[derive(Debug, Error)]
pub enum StepInterrupt {
    #[error("{0}")]
    Cancelled(String),
    #[error("{0}")]
    Failed(String),
}

impl StepInterrupt {
    #[must_use]
    pub fn cancelled(message: impl Into<String>) -> Self {
        Self::Cancelled(message.into())
    }

    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

/// Errors detected while constructing a [`crate::Flow`].
///
/// Flows are authored data; any of these is a programming error in the flow,
/// caught before an engine ever runs it.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FlowError {
    #[error("duplicate step id: {0}")]
    DuplicateStepId(String),
    #[error("step id is reserved for the exit confirmation: {0}")]
    ReservedStepId(String),
    #[error("start step is not defined: {0}")]
    MissingStartStep(String),
}
