//! Setup flows: the wizard graphs behind `onboard` and `configure`.
//!
//! The engine in `waypoint-wizard` is domain-agnostic; this crate supplies
//! the domain. [`SetupState`] is the snapshot-able draft of the config being
//! edited, [`SetupContext`] carries the side-effect seams (the config
//! store), and the section modules contribute the actual steps.

pub mod context;
pub mod flows;
pub mod sections;
pub mod state;

pub use {
    context::{ConfigStore, FileConfigStore, MemoryConfigStore, SetupContext},
    flows::{SetupEngine, SetupFlow, SetupSectionSteps, SetupStep, configure_flow, onboarding_flow},
    state::{
        SECTION_ORDER, SetupCommand, SetupSection, SetupState, normalize_section_selection,
        resolve_user_path,
    },
};
