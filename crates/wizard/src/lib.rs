//! Resumable, navigable multi-step wizard engine.
//!
//! A [`Flow`] is a declarative graph of [`StepDefinition`]s: each step names
//! its presentation kind, optional dynamic text/options, validation, an
//! async answer hook mutating the flow's domain state, and a transition.
//! A [`WizardEngine`] walks one user through the graph: forward, backward
//! (restoring the exact state a step was first answered against), and
//! through a gated exit confirmation. Every transport, terminal or RPC,
//! consumes the same [`EngineResult`] projection.

pub mod engine;
pub mod error;
pub mod flow;
pub mod nav;
pub mod step;

pub use {
    engine::{EngineResult, ExitConfirm, NextParams, SessionStatus, WizardEngine},
    error::{FlowError, StepInterrupt},
    flow::{EXIT_STEP_ID, Flow, Section},
    nav::NavAction,
    step::{
        Executor, OptionsSource, RenderedStep, StepDefinition, StepKind, StepOption, TextSource,
        Transition,
    },
};
