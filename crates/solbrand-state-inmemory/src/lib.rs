//! In-memory state store implementation for the SolBrand platform
//!
//! This crate provides in-memory implementations of the repository
//! interfaces defined in the solbrand-core crate. It is primarily useful
//! for development, testing, and deployments where persistence across
//! restarts is not required.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

pub mod repositories;
pub use repositories::{InMemoryActivityRepository, InMemoryWorkflowRepository};

use solbrand_core::{ActivityLog, ActivityRepository, WorkflowRepository, WorkflowState};

/// Provider for in-memory state store repositories
pub struct InMemoryStateProvider {
    // Shared storage for workflow states
    workflow_states: Arc<RwLock<HashMap<String, WorkflowState>>>,

    // Shared storage for activity feeds
    activity_logs: Arc<RwLock<HashMap<String, ActivityLog>>>,
}

impl InMemoryStateProvider {
    /// Create a new in-memory state store provider
    pub fn new() -> Self {
        Self {
            workflow_states: Arc::new(RwLock::new(HashMap::new())),
            activity_logs: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Create repositories over this provider's shared storage
    pub fn create_repositories(&self) -> (Arc<dyn WorkflowRepository>, Arc<dyn ActivityRepository>) {
        let workflow_repo = Arc::new(InMemoryWorkflowRepository::new(
            self.workflow_states.clone(),
        ));
        let activity_repo = Arc::new(InMemoryActivityRepository::new(self.activity_logs.clone()));
        (workflow_repo, activity_repo)
    }
}

impl Default for InMemoryStateProvider {
    fn default() -> Self {
        Self::new()
    }
}
