use std::collections::{BTreeMap, BTreeSet};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use solbrand_core::{
    ActivityLog, ActivityRepository, CoreError, SessionKey, StepId, StepPayload,
    WorkflowRepository, WorkflowState,
};

const CREATION_DATA_FILE: &str = "creation_data.json";
const COMPLETED_STEPS_FILE: &str = "completed_steps.json";
const SESSION_FILE: &str = "session.json";
const ACTIVITIES_FILE: &str = "activities.json";

/// Current step and timestamps, stored alongside the output blob
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionDocument {
    current_step: StepId,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

async fn read_document<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, CoreError> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err.into()),
    }
}

async fn write_document<T: Serialize>(path: &Path, document: &T) -> Result<(), CoreError> {
    let json = serde_json::to_vec(document)?;
    tokio::fs::write(path, json).await?;
    Ok(())
}

async fn remove_if_present(path: &Path) -> Result<(), CoreError> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err.into()),
    }
}

/// File-backed implementation of the WorkflowRepository
pub struct FileWorkflowRepository {
    state_dir: PathBuf,
}

impl FileWorkflowRepository {
    /// Create a new file workflow repository rooted at `state_dir`
    pub fn new(state_dir: PathBuf) -> Self {
        Self { state_dir }
    }

    fn session_dir(&self, session: &SessionKey) -> PathBuf {
        self.state_dir.join(&session.0)
    }
}

#[async_trait]
impl WorkflowRepository for FileWorkflowRepository {
    async fn find_by_session(
        &self,
        session: &SessionKey,
    ) -> Result<Option<WorkflowState>, CoreError> {
        let dir = self.session_dir(session);

        let Some(meta) = read_document::<SessionDocument>(&dir.join(SESSION_FILE)).await? else {
            return Ok(None);
        };
        // Output and completion documents may be absent for a session that
        // has only navigated
        let step_outputs = read_document::<BTreeMap<StepId, StepPayload>>(
            &dir.join(CREATION_DATA_FILE),
        )
        .await?
        .unwrap_or_default();
        let completed_steps =
            read_document::<BTreeSet<StepId>>(&dir.join(COMPLETED_STEPS_FILE))
                .await?
                .unwrap_or_default();

        Ok(Some(WorkflowState {
            session: session.clone(),
            current_step: meta.current_step,
            step_outputs,
            completed_steps,
            created_at: meta.created_at,
            updated_at: meta.updated_at,
        }))
    }

    async fn save(&self, state: &WorkflowState) -> Result<(), CoreError> {
        let dir = self.session_dir(&state.session);
        tokio::fs::create_dir_all(&dir).await?;

        let meta = SessionDocument {
            current_step: state.current_step.clone(),
            created_at: state.created_at,
            updated_at: state.updated_at,
        };
        write_document(&dir.join(CREATION_DATA_FILE), &state.step_outputs).await?;
        write_document(&dir.join(COMPLETED_STEPS_FILE), &state.completed_steps).await?;
        write_document(&dir.join(SESSION_FILE), &meta).await?;

        debug!(session = %state.session, dir = %dir.display(), "Saved workflow state");
        Ok(())
    }

    async fn delete(&self, session: &SessionKey) -> Result<(), CoreError> {
        let dir = self.session_dir(session);
        // The activity log shares the session directory and survives deletion
        remove_if_present(&dir.join(CREATION_DATA_FILE)).await?;
        remove_if_present(&dir.join(COMPLETED_STEPS_FILE)).await?;
        remove_if_present(&dir.join(SESSION_FILE)).await?;
        Ok(())
    }
}

/// File-backed implementation of the ActivityRepository
pub struct FileActivityRepository {
    state_dir: PathBuf,
}

impl FileActivityRepository {
    /// Create a new file activity repository rooted at `state_dir`
    pub fn new(state_dir: PathBuf) -> Self {
        Self { state_dir }
    }

    fn activities_path(&self, session: &SessionKey) -> PathBuf {
        self.state_dir.join(&session.0).join(ACTIVITIES_FILE)
    }
}

#[async_trait]
impl ActivityRepository for FileActivityRepository {
    async fn find_by_session(
        &self,
        session: &SessionKey,
    ) -> Result<Option<ActivityLog>, CoreError> {
        read_document(&self.activities_path(session)).await
    }

    async fn save(&self, session: &SessionKey, log: &ActivityLog) -> Result<(), CoreError> {
        let path = self.activities_path(session);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        write_document(&path, log).await
    }
}
