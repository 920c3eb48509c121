//! The terminal run loop: render, prompt, feed the answer back.

use tracing::debug;

use waypoint_flows::SetupEngine;
use waypoint_wizard::{NavAction, NextParams, SessionStatus, StepKind};

use crate::prompter::Prompter;

/// Drive one wizard session to a terminal state.
///
/// Returns `Ok` for completion and cancellation; a session that died with an
/// engine error surfaces as `Err`.
pub async fn run_wizard(
    engine: &mut SetupEngine,
    prompter: &mut dyn Prompter,
) -> anyhow::Result<()> {
    let mut result = engine.start();
    loop {
        if result.done {
            return match result.status {
                SessionStatus::Cancelled => {
                    prompter.note(None, Some("Setup cancelled."))?;
                    Ok(())
                },
                SessionStatus::Error => {
                    let message = result.error.unwrap_or_else(|| "setup failed".to_string());
                    Err(anyhow::anyhow!(message))
                },
                _ => Ok(()),
            };
        }
        let Some(step) = result.step.take() else {
            // A running result always carries a step; treat anything else
            // as a finished session.
            return Ok(());
        };
        if let Some(error) = &result.error {
            prompter.note(Some("Invalid input"), Some(error))?;
        }

        let can_go_back = result.can_go_back.unwrap_or(false);
        debug!(step = %step.id, kind = ?step.kind, "prompting");
        let reply = match step.kind {
            StepKind::Note | StepKind::Progress => {
                prompter.note(step.title.as_deref(), step.message.as_deref())?;
                prompter.proceed("Continue", can_go_back)?
            },
            StepKind::Action => {
                prompter.note(step.title.as_deref(), step.message.as_deref())?;
                prompter.proceed("Run", can_go_back)?
            },
            StepKind::Text => prompter.text(&step, can_go_back)?,
            StepKind::Confirm => prompter.confirm(&step, can_go_back)?,
            StepKind::Select => prompter.select(&step, can_go_back)?,
            StepKind::MultiSelect => prompter.multiselect(&step, can_go_back)?,
        };

        let params = match reply.nav {
            NavAction::Next => NextParams {
                step_id: Some(step.id.clone()),
                value: reply.value,
                nav: NavAction::Next,
            },
            nav => NextParams::nav(nav),
        };
        result = engine.next(params).await;
    }
}
