//! Persistence ports for workflow state and activity feeds.
//!
//! The controller only talks to these traits; external crates implement them
//! to provide different storage backends.

use async_trait::async_trait;

use super::activity::ActivityLog;
use super::workflow::WorkflowState;
use crate::error::CoreError;
use crate::types::SessionKey;

/// Repository for per-session workflow state
#[async_trait]
pub trait WorkflowRepository: Send + Sync {
    /// Find the state for a session
    async fn find_by_session(
        &self,
        session: &SessionKey,
    ) -> Result<Option<WorkflowState>, CoreError>;

    /// Save a session's state, replacing any previous document
    async fn save(&self, state: &WorkflowState) -> Result<(), CoreError>;

    /// Delete a session's state
    async fn delete(&self, session: &SessionKey) -> Result<(), CoreError>;
}

/// Repository for per-session activity feeds
#[async_trait]
pub trait ActivityRepository: Send + Sync {
    /// Find the activity feed for a session
    async fn find_by_session(&self, session: &SessionKey)
        -> Result<Option<ActivityLog>, CoreError>;

    /// Save a session's activity feed, replacing any previous document
    async fn save(&self, session: &SessionKey, log: &ActivityLog) -> Result<(), CoreError>;
}

/// Memory implementations for testing
#[cfg(feature = "testing")]
pub mod memory {
    use super::*;
    use dashmap::DashMap;
    use std::sync::Arc;

    /// In-memory workflow repository backed by a concurrent map
    pub struct MemoryWorkflowRepository {
        states: Arc<DashMap<SessionKey, WorkflowState>>,
    }

    impl MemoryWorkflowRepository {
        /// Create a new memory workflow repository
        pub fn new() -> Self {
            Self {
                states: Arc::new(DashMap::with_capacity(16)),
            }
        }
    }

    impl Default for MemoryWorkflowRepository {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl WorkflowRepository for MemoryWorkflowRepository {
        async fn find_by_session(
            &self,
            session: &SessionKey,
        ) -> Result<Option<WorkflowState>, CoreError> {
            Ok(self.states.get(session).map(|state| state.clone()))
        }

        async fn save(&self, state: &WorkflowState) -> Result<(), CoreError> {
            self.states.insert(state.session.clone(), state.clone());
            Ok(())
        }

        async fn delete(&self, session: &SessionKey) -> Result<(), CoreError> {
            self.states.remove(session);
            Ok(())
        }
    }

    /// In-memory activity repository backed by a concurrent map
    pub struct MemoryActivityRepository {
        logs: Arc<DashMap<SessionKey, ActivityLog>>,
    }

    impl MemoryActivityRepository {
        /// Create a new memory activity repository
        pub fn new() -> Self {
            Self {
                logs: Arc::new(DashMap::with_capacity(16)),
            }
        }
    }

    impl Default for MemoryActivityRepository {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl ActivityRepository for MemoryActivityRepository {
        async fn find_by_session(
            &self,
            session: &SessionKey,
        ) -> Result<Option<ActivityLog>, CoreError> {
            Ok(self.logs.get(session).map(|log| log.clone()))
        }

        async fn save(&self, session: &SessionKey, log: &ActivityLog) -> Result<(), CoreError> {
            self.logs.insert(session.clone(), log.clone());
            Ok(())
        }
    }

}
