//! Per-session workflow state.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::catalog::StepId;
use crate::domain::payload::StepPayload;
use crate::error::CoreError;
use crate::types::SessionKey;

/// Accumulated state of one branding session.
///
/// Ordered maps keep the serialized form stable so persisted documents can be
/// compared byte for byte.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowState {
    /// Session this state belongs to
    pub session: SessionKey,
    /// Step the session is currently focused on
    pub current_step: StepId,
    /// Merged output payload per completed step
    pub step_outputs: BTreeMap<StepId, StepPayload>,
    /// Steps completed at least once
    pub completed_steps: BTreeSet<StepId>,
    /// When the session was first seen
    pub created_at: DateTime<Utc>,
    /// Last mutation time
    pub updated_at: DateTime<Utc>,
}

impl WorkflowState {
    /// Fresh state positioned on the workflow's first step
    pub fn new(session: SessionKey, first_step: StepId) -> Self {
        let now = Utc::now();
        Self {
            session,
            current_step: first_step,
            step_outputs: BTreeMap::new(),
            completed_steps: BTreeSet::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether `step_id` has been completed at least once
    pub fn is_step_completed(&self, step_id: &StepId) -> bool {
        self.completed_steps.contains(step_id)
    }

    /// Fold `payload` into the stored output for `step_id` and mark the step
    /// completed.
    ///
    /// The payload variant must match `step_id`; on mismatch the state is
    /// left untouched.
    pub fn record_completion(
        &mut self,
        step_id: &StepId,
        payload: StepPayload,
    ) -> Result<(), CoreError> {
        if payload.step_id() != *step_id {
            return Err(CoreError::InvalidParameters(format!(
                "payload is for step {}, not {}",
                payload.step_id(),
                step_id
            )));
        }

        match self.step_outputs.get_mut(step_id) {
            Some(existing) => existing.merge_from(payload)?,
            None => {
                self.step_outputs.insert(step_id.clone(), payload);
            }
        }
        self.completed_steps.insert(step_id.clone());
        self.touch();
        Ok(())
    }

    /// Move the session's focus to `step_id`
    pub fn set_current_step(&mut self, step_id: StepId) {
        self.current_step = step_id;
        self.touch();
    }

    /// The chosen brand name, when one has been selected.
    ///
    /// An empty selection counts as no selection; it must not unlock paid
    /// steps.
    pub fn selected_name(&self) -> Option<&str> {
        self.step_outputs
            .get(&StepId::from("brandName"))
            .and_then(StepPayload::as_brand_name)
            .map(|payload| payload.selected_name.as_str())
            .filter(|name| !name.trim().is_empty())
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
