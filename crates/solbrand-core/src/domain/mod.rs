/// Step catalog
pub mod catalog;

/// Step output payloads and merge reducers
pub mod payload;

/// Per-session workflow state
pub mod workflow;

/// Activity feed
pub mod activity;

/// Persistence ports
pub mod repository;

/// Token ledger port
pub mod ledger;
