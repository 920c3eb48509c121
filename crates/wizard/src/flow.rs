//! Flow construction and section composition.

use std::collections::HashMap;

use crate::{error::FlowError, step::StepDefinition};

/// Step id reserved for the engine's synthetic exit-confirmation step.
/// Authored flows may not claim it; [`Flow::new`] rejects the collision.
pub const EXIT_STEP_ID: &str = "__wizard_exit__";

/// A reusable sub-graph of a flow: one entry step, the exit target its last
/// step transitions to, and the steps it contributes to the merged map.
pub struct Section<S, C> {
    pub entry_id: String,
    pub exit_id: String,
    pub steps: Vec<StepDefinition<S, C>>,
}

/// A named entry step plus the full step map for one wizard. Immutable once
/// constructed.
pub struct Flow<S, C> {
    start_id: String,
    steps: HashMap<String, StepDefinition<S, C>>,
}

impl<S, C> std::fmt::Debug for Flow<S, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Flow")
            .field("start_id", &self.start_id)
            .field("steps", &self.steps.keys())
            .finish()
    }
}

impl<S, C> Flow<S, C> {
    /// Build a flow from a start id and its steps.
    ///
    /// Rejects duplicate step ids, a step claiming [`EXIT_STEP_ID`], and a
    /// start id with no matching step.
    pub fn new(
        start_id: impl Into<String>,
        steps: Vec<StepDefinition<S, C>>,
    ) -> Result<Self, FlowError> {
        let start_id = start_id.into();
        let mut map = HashMap::with_capacity(steps.len());
        for step in steps {
            if step.id == EXIT_STEP_ID {
                return Err(FlowError::ReservedStepId(step.id));
            }
            if map.contains_key(&step.id) {
                return Err(FlowError::DuplicateStepId(step.id));
            }
            map.insert(step.id.clone(), step);
        }
        if !map.contains_key(&start_id) {
            return Err(FlowError::MissingStartStep(start_id));
        }
        Ok(Self {
            start_id,
            steps: map,
        })
    }

    /// Merge sections (plus standalone steps such as pickers and finish
    /// notes) into one namespace. Id collisions across sections are rejected.
    pub fn from_sections(
        start_id: impl Into<String>,
        sections: Vec<Section<S, C>>,
        extra: Vec<StepDefinition<S, C>>,
    ) -> Result<Self, FlowError> {
        let mut steps = extra;
        for section in sections {
            steps.extend(section.steps);
        }
        Self::new(start_id, steps)
    }

    pub fn start_id(&self) -> &str {
        &self.start_id
    }

    pub fn step(&self, id: &str) -> Option<&StepDefinition<S, C>> {
        self.steps.get(id)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use {
        super::*,
        crate::step::{StepDefinition, StepKind},
    };

    type TestStep = StepDefinition<(), ()>;

    fn note(id: &str) -> TestStep {
        TestStep::new(id, StepKind::Note)
    }

    #[test]
    fn builds_from_sections() {
        let a = Section {
            entry_id: "a.1".into(),
            exit_id: "b.1".into(),
            steps: vec![note("a.1"), note("a.2")],
        };
        let b = Section {
            entry_id: "b.1".into(),
            exit_id: "finish".into(),
            steps: vec![note("b.1")],
        };
        let flow = Flow::from_sections("a.1", vec![a, b], vec![note("finish")]).unwrap();
        assert_eq!(flow.start_id(), "a.1");
        assert_eq!(flow.len(), 4);
        assert!(flow.step("b.1").is_some());
    }

    #[test]
    fn rejects_duplicate_ids_across_sections() {
        let a = Section {
            entry_id: "shared".into(),
            exit_id: "x".into(),
            steps: vec![note("shared")],
        };
        let b = Section {
            entry_id: "shared".into(),
            exit_id: "x".into(),
            steps: vec![note("shared")],
        };
        let err = Flow::from_sections("shared", vec![a, b], vec![]).unwrap_err();
        assert_eq!(err, FlowError::DuplicateStepId("shared".into()));
    }

    #[test]
    fn rejects_reserved_exit_id() {
        let err = Flow::new(EXIT_STEP_ID, vec![note(EXIT_STEP_ID)]).unwrap_err();
        assert_eq!(err, FlowError::ReservedStepId(EXIT_STEP_ID.into()));
    }

    #[test]
    fn rejects_missing_start_step() {
        let err = Flow::<(), ()>::new("nowhere", vec![note("somewhere")]).unwrap_err();
        assert_eq!(err, FlowError::MissingStartStep("nowhere".into()));
    }
}
