//!
//! SolBrand Core - token-gated branding workflow engine
//!
//! This crate defines the step catalog, the per-session workflow state
//! machine, the activity feed and the ports every storage and ledger
//! backend implements. It is the foundation for the server, the ledger
//! backends and the CLI.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Domain layer - catalog, workflow state, activity feed, ports
pub mod domain;

/// Application services - the workflow controller
pub mod application;

/// Core value types
pub mod types;

/// Error types
pub mod error;

// Re-export key types
pub use error::CoreError;
pub use types::{
    BalanceSnapshot, ExchangeRate, HolderAddress, SessionKey, TokenAmount, TOKEN_DECIMALS,
    TOKEN_NAME, TOKEN_SYMBOL, UNITS_PER_TOKEN,
};

// Re-export main API types for easy use
pub use application::workflow_service::{CompletionOutcome, StepStatus, WorkflowController};
pub use domain::activity::{ActivityCategory, ActivityEntry, ActivityLog, ACTIVITY_LOG_CAPACITY};
pub use domain::catalog::{StepCatalog, StepDefinition, StepId};
pub use domain::ledger::{CreditReceipt, DebitReceipt, LedgerInfo, TokenLedger};
pub use domain::payload::StepPayload;
pub use domain::repository::{ActivityRepository, WorkflowRepository};
pub use domain::workflow::WorkflowState;
