use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use solbrand_core::{
    ActivityLog, ActivityRepository, CoreError, SessionKey, WorkflowRepository, WorkflowState,
};

/// In-memory implementation of the WorkflowRepository
pub struct InMemoryWorkflowRepository {
    states: Arc<RwLock<HashMap<String, WorkflowState>>>,
}

impl InMemoryWorkflowRepository {
    /// Create a new in-memory workflow repository over shared storage
    pub fn new(states: Arc<RwLock<HashMap<String, WorkflowState>>>) -> Self {
        Self { states }
    }
}

#[async_trait]
impl WorkflowRepository for InMemoryWorkflowRepository {
    async fn find_by_session(
        &self,
        session: &SessionKey,
    ) -> Result<Option<WorkflowState>, CoreError> {
        let states = self.states.read().await;
        Ok(states.get(&session.0).cloned())
    }

    async fn save(&self, state: &WorkflowState) -> Result<(), CoreError> {
        let mut states = self.states.write().await;
        states.insert(state.session.0.clone(), state.clone());
        debug!(session = %state.session, "Saved workflow state");
        Ok(())
    }

    async fn delete(&self, session: &SessionKey) -> Result<(), CoreError> {
        let mut states = self.states.write().await;
        states.remove(&session.0);
        Ok(())
    }
}

/// In-memory implementation of the ActivityRepository
pub struct InMemoryActivityRepository {
    logs: Arc<RwLock<HashMap<String, ActivityLog>>>,
}

impl InMemoryActivityRepository {
    /// Create a new in-memory activity repository over shared storage
    pub fn new(logs: Arc<RwLock<HashMap<String, ActivityLog>>>) -> Self {
        Self { logs }
    }
}

#[async_trait]
impl ActivityRepository for InMemoryActivityRepository {
    async fn find_by_session(
        &self,
        session: &SessionKey,
    ) -> Result<Option<ActivityLog>, CoreError> {
        let logs = self.logs.read().await;
        Ok(logs.get(&session.0).cloned())
    }

    async fn save(&self, session: &SessionKey, log: &ActivityLog) -> Result<(), CoreError> {
        let mut logs = self.logs.write().await;
        logs.insert(session.0.clone(), log.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solbrand_core::domain::activity::ActivityEntry;
    use solbrand_core::{StepId, TokenAmount};

    fn workflow_repo() -> InMemoryWorkflowRepository {
        InMemoryWorkflowRepository::new(Arc::new(RwLock::new(HashMap::new())))
    }

    #[tokio::test]
    async fn test_workflow_round_trip_and_delete() {
        let repo = workflow_repo();
        let session = SessionKey::from("session-1");
        assert!(repo.find_by_session(&session).await.unwrap().is_none());

        let mut state = WorkflowState::new(session.clone(), StepId::from("brandName"));
        repo.save(&state).await.unwrap();
        assert_eq!(
            repo.find_by_session(&session).await.unwrap(),
            Some(state.clone())
        );

        // Saving again replaces the stored document
        state.set_current_step(StepId::from("logo"));
        repo.save(&state).await.unwrap();
        assert_eq!(
            repo.find_by_session(&session)
                .await
                .unwrap()
                .unwrap()
                .current_step,
            StepId::from("logo")
        );

        repo.delete(&session).await.unwrap();
        assert!(repo.find_by_session(&session).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_activity_round_trip() {
        let repo = InMemoryActivityRepository::new(Arc::new(RwLock::new(HashMap::new())));
        let session = SessionKey::from("session-1");

        let mut log = ActivityLog::new();
        log.record(ActivityEntry::brand_creation(
            "Completed Brand Name",
            TokenAmount::from_whole(1).unwrap(),
        ));
        repo.save(&session, &log).await.unwrap();

        let found = repo.find_by_session(&session).await.unwrap().unwrap();
        assert_eq!(found, log);
    }
}
