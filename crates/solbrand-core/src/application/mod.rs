/// Workflow controller
pub mod workflow_service;
