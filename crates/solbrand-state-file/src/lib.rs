//! File-backed state store implementation for the SolBrand platform
//!
//! Lays each session out as a directory of JSON documents under a configured
//! state directory:
//!
//! ```text
//! <state_dir>/<session>/creation_data.json     step outputs blob
//! <state_dir>/<session>/completed_steps.json   completed step ids
//! <state_dir>/<session>/session.json           current step id and timestamps
//! <state_dir>/<session>/activities.json        bounded activity log
//! ```
//!
//! Documents serialize deterministically (the workflow state uses ordered
//! maps), so re-saving unchanged state produces identical bytes.

use std::path::PathBuf;
use std::sync::Arc;

pub mod repositories;
pub use repositories::{FileActivityRepository, FileWorkflowRepository};

use solbrand_core::{ActivityRepository, WorkflowRepository};

/// Provider for file-backed state store repositories
pub struct FileStateProvider {
    state_dir: PathBuf,
}

impl FileStateProvider {
    /// Create a new provider rooted at `state_dir`. The directory is created
    /// lazily on first save.
    pub fn new(state_dir: impl Into<PathBuf>) -> Self {
        Self {
            state_dir: state_dir.into(),
        }
    }

    /// Create repositories rooted at this provider's state directory
    pub fn create_repositories(&self) -> (Arc<dyn WorkflowRepository>, Arc<dyn ActivityRepository>) {
        let workflow_repo = Arc::new(FileWorkflowRepository::new(self.state_dir.clone()));
        let activity_repo = Arc::new(FileActivityRepository::new(self.state_dir.clone()));
        (workflow_repo, activity_repo)
    }

    /// The root state directory
    pub fn state_dir(&self) -> &PathBuf {
        &self.state_dir
    }
}
