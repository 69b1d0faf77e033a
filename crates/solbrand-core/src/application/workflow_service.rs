//! Workflow controller.
//!
//! Drives the branding state machine: step gating against a cached ledger
//! balance, payment-coupled step completion, per-session persistence and the
//! activity feed. All storage and ledger access goes through injected ports.

use std::sync::Arc;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::domain::activity::{ActivityEntry, ActivityLog};
use crate::domain::catalog::{StepCatalog, StepDefinition, StepId};
use crate::domain::ledger::{LedgerInfo, TokenLedger};
use crate::domain::payload::StepPayload;
use crate::domain::repository::{ActivityRepository, WorkflowRepository};
use crate::domain::workflow::WorkflowState;
use crate::error::CoreError;
use crate::types::{BalanceSnapshot, HolderAddress, SessionKey, TokenAmount, TOKEN_SYMBOL};

/// Catalog step combined with one session's progress flags
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepStatus {
    /// Step identifier
    pub id: StepId,
    /// Display title
    pub title: String,
    /// Short description
    pub description: String,
    /// Whether the workflow requires this step
    pub required: bool,
    /// Cost in whole tokens
    pub cost: u64,
    /// Whether the session has completed this step
    pub completed: bool,
    /// Whether the session may open this step right now. Completed steps
    /// stay open for revisiting even when the balance no longer covers
    /// their cost.
    pub accessible: bool,
    /// Whether this is the session's current step
    pub current: bool,
}

/// Result of a committed step completion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionOutcome {
    /// The completed step
    pub step_id: StepId,
    /// The step's cost
    pub cost: TokenAmount,
    /// Whether this completion debited the ledger
    pub charged: bool,
}

/// Controller for the branding workflow state machine
pub struct WorkflowController {
    /// Ordered step catalog
    catalog: StepCatalog,

    /// Repository for per-session workflow state
    workflow_repo: Arc<dyn WorkflowRepository>,

    /// Repository for per-session activity feeds
    activity_repo: Arc<dyn ActivityRepository>,

    /// External token ledger
    ledger: Arc<dyn TokenLedger>,

    /// Balance snapshots keyed by holder, dropped after every debit or credit
    balances: DashMap<HolderAddress, BalanceSnapshot>,

    /// One completion at a time per session
    session_guards: DashMap<SessionKey, Arc<Mutex<()>>>,
}

impl WorkflowController {
    /// Create a new workflow controller
    pub fn new(
        catalog: StepCatalog,
        workflow_repo: Arc<dyn WorkflowRepository>,
        activity_repo: Arc<dyn ActivityRepository>,
        ledger: Arc<dyn TokenLedger>,
    ) -> Self {
        Self {
            catalog,
            workflow_repo,
            activity_repo,
            ledger,
            balances: DashMap::new(),
            session_guards: DashMap::new(),
        }
    }

    /// The step catalog driving this controller
    pub fn catalog(&self) -> &StepCatalog {
        &self.catalog
    }

    /// Ordered catalog steps
    pub fn list_steps(&self) -> &[StepDefinition] {
        self.catalog.list_steps()
    }

    /// Facts about the ledger backend in use
    pub fn ledger_info(&self) -> LedgerInfo {
        self.ledger.info()
    }

    /// Load a session's workflow state, or a fresh one positioned on the
    /// first catalog step. Fresh state is not persisted until the first
    /// mutation.
    pub async fn workflow_state(&self, session: &SessionKey) -> Result<WorkflowState, CoreError> {
        session.validate()?;
        self.load_or_new_state(session).await
    }

    /// Whether `session` has completed `step_id`
    pub async fn is_step_completed(
        &self,
        session: &SessionKey,
        step_id: &StepId,
    ) -> Result<bool, CoreError> {
        session.validate()?;
        let state = self.load_or_new_state(session).await?;
        Ok(state.is_step_completed(step_id))
    }

    /// The necessary-funds gate for one step.
    ///
    /// The first catalog step is always open. Any other step needs a chosen
    /// brand name and a cached balance covering the step's cost. The check
    /// is not a reservation: the balance can change between this read and a
    /// later debit.
    ///
    /// This is the raw funds gate only. Callers that want completed steps to
    /// stay open once the balance is drained combine it with completion, as
    /// [`step_statuses`](Self::step_statuses) and
    /// [`select_step`](Self::select_step) do.
    pub async fn can_access_step(
        &self,
        session: &SessionKey,
        holder: Option<&HolderAddress>,
        step_id: &StepId,
    ) -> Result<bool, CoreError> {
        session.validate()?;
        let step = self
            .catalog
            .get_step(step_id)
            .ok_or_else(|| CoreError::UnknownStep(step_id.to_string()))?;

        let state = self.load_or_new_state(session).await?;
        let balance = self.balance_for(holder).await?;
        Ok(self.step_accessible(&state, &balance, step))
    }

    /// Every catalog step with the session's completion and access flags,
    /// computed against one balance read
    pub async fn step_statuses(
        &self,
        session: &SessionKey,
        holder: Option<&HolderAddress>,
    ) -> Result<Vec<StepStatus>, CoreError> {
        session.validate()?;
        let state = self.load_or_new_state(session).await?;
        let balance = self.balance_for(holder).await?;

        Ok(self
            .catalog
            .list_steps()
            .iter()
            .map(|step| {
                let completed = state.is_step_completed(&step.id);
                StepStatus {
                    id: step.id.clone(),
                    title: step.title.clone(),
                    description: step.description.clone(),
                    required: step.required,
                    cost: step.cost,
                    completed,
                    accessible: completed || self.step_accessible(&state, &balance, step),
                    current: state.current_step == step.id,
                }
            })
            .collect())
    }

    /// Move the session's focus to `step_id`.
    ///
    /// Allowed for any completed step and any step the access gate permits;
    /// a locked step fails with `InvalidParameters` and leaves the state
    /// untouched.
    pub async fn select_step(
        &self,
        session: &SessionKey,
        holder: Option<&HolderAddress>,
        step_id: &StepId,
    ) -> Result<WorkflowState, CoreError> {
        session.validate()?;
        let step = self
            .catalog
            .get_step(step_id)
            .ok_or_else(|| CoreError::UnknownStep(step_id.to_string()))?;

        let mut state = self.load_or_new_state(session).await?;
        if !state.is_step_completed(step_id) {
            let balance = self.balance_for(holder).await?;
            if !self.step_accessible(&state, &balance, step) {
                return Err(CoreError::InvalidParameters(format!(
                    "step {} is locked",
                    step_id
                )));
            }
        }

        state.set_current_step(step_id.clone());
        self.workflow_repo.save(&state).await?;
        debug!(session = %session, step_id = %step_id, "Selected step");
        Ok(state)
    }

    /// Complete `step_id` for `session`, debiting `holder` when the step
    /// costs tokens and has not been completed before.
    ///
    /// Order of effects: catalog lookup, payload check, debit, state merge,
    /// persist, activity entry. A failed debit aborts with `PaymentFailed`
    /// before any state mutation. Re-completing a step merges the payload
    /// again but never charges twice.
    pub async fn complete_step(
        &self,
        session: &SessionKey,
        holder: &HolderAddress,
        step_id: &StepId,
        payload: StepPayload,
    ) -> Result<CompletionOutcome, CoreError> {
        session.validate()?;
        holder.validate()?;

        let step = self
            .catalog
            .get_step(step_id)
            .ok_or_else(|| CoreError::UnknownStep(step_id.to_string()))?;

        // Reject mismatched payloads before touching the ledger
        if payload.step_id() != *step_id {
            return Err(CoreError::InvalidParameters(format!(
                "payload is for step {}, not {}",
                payload.step_id(),
                step_id
            )));
        }

        // One completion at a time per session; a double submit of a paid
        // step must not debit twice
        let guard = self.session_guard(session);
        let _permit = guard.lock().await;

        let mut state = self.load_or_new_state(session).await?;

        let cost = TokenAmount::from_whole(step.cost)?;
        let charged = !cost.is_zero() && !state.is_step_completed(step_id);
        if charged {
            debug!(
                session = %session,
                step_id = %step_id,
                cost = %cost,
                "Debiting step cost"
            );
            self.ledger.debit(holder, cost).await.map_err(|err| {
                warn!(
                    session = %session,
                    step_id = %step_id,
                    error = %err,
                    "Debit failed, workflow state left unchanged"
                );
                CoreError::PaymentFailed(err.to_string())
            })?;
            // The ledger moved; the cached balance is stale
            self.balances.remove(holder);
        }

        state.record_completion(step_id, payload)?;
        self.workflow_repo.save(&state).await?;

        self.append_activity(
            session,
            ActivityEntry::brand_creation(format!("Completed {}", step.title), cost),
        )
        .await?;

        info!(
            session = %session,
            step_id = %step_id,
            cost = %cost,
            charged,
            "Step completed"
        );
        Ok(CompletionOutcome {
            step_id: step_id.clone(),
            cost,
            charged,
        })
    }

    /// Complete the terminal summary step.
    ///
    /// The terminal step is free and needs no payment gating, so no holder
    /// is involved; it marks the workflow finished and records a zero-cost
    /// activity entry.
    pub async fn complete_final_step(
        &self,
        session: &SessionKey,
        payload: StepPayload,
    ) -> Result<CompletionOutcome, CoreError> {
        session.validate()?;

        let terminal = self.catalog.terminal_step();
        if payload.step_id() != terminal.id {
            return Err(CoreError::InvalidParameters(format!(
                "payload is for step {}, not the terminal step {}",
                payload.step_id(),
                terminal.id
            )));
        }

        let guard = self.session_guard(session);
        let _permit = guard.lock().await;

        let mut state = self.load_or_new_state(session).await?;
        let step_id = terminal.id.clone();
        state.record_completion(&step_id, payload)?;
        self.workflow_repo.save(&state).await?;

        self.append_activity(
            session,
            ActivityEntry::brand_creation(
                format!("Completed {}", terminal.title),
                TokenAmount::ZERO,
            ),
        )
        .await?;

        info!(session = %session, step_id = %step_id, "Workflow finished");
        Ok(CompletionOutcome {
            step_id,
            cost: TokenAmount::ZERO,
            charged: false,
        })
    }

    /// Fetch `holder`'s balance from the ledger and cache the snapshot.
    ///
    /// Lookup failures read as zero: an unfunded holder legitimately has no
    /// ledger account, and gating must not distinguish that from a zero
    /// balance.
    pub async fn refresh_balance(
        &self,
        holder: &HolderAddress,
    ) -> Result<BalanceSnapshot, CoreError> {
        holder.validate()?;
        let snapshot = match self.ledger.fetch_balance(holder).await {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!(holder = %holder, error = %err, "Balance lookup failed, reading as zero");
                BalanceSnapshot::zero()
            }
        };
        self.balances.insert(holder.clone(), snapshot.clone());
        Ok(snapshot)
    }

    /// The cached balance snapshot, when one exists
    pub fn cached_balance(&self, holder: &HolderAddress) -> Option<BalanceSnapshot> {
        self.balances.get(holder).map(|snapshot| snapshot.clone())
    }

    /// Drop `holder`'s cached balance so the next read hits the ledger
    pub fn invalidate_balance(&self, holder: &HolderAddress) {
        self.balances.remove(holder);
    }

    /// The session's activity feed, newest first
    pub async fn activities(&self, session: &SessionKey) -> Result<ActivityLog, CoreError> {
        session.validate()?;
        Ok(self
            .activity_repo
            .find_by_session(session)
            .await?
            .unwrap_or_default())
    }

    /// Record a token purchase in the session's activity feed
    pub async fn record_purchase(
        &self,
        session: &SessionKey,
        amount: TokenAmount,
    ) -> Result<(), CoreError> {
        session.validate()?;
        self.append_activity(
            session,
            ActivityEntry::token_purchase(
                format!("Purchased {} {}", amount, TOKEN_SYMBOL),
                amount,
            ),
        )
        .await
    }

    fn step_accessible(
        &self,
        state: &WorkflowState,
        balance: &BalanceSnapshot,
        step: &StepDefinition,
    ) -> bool {
        if self.catalog.is_first(&step.id) {
            return true;
        }
        if state.selected_name().is_none() {
            return false;
        }
        match TokenAmount::from_whole(step.cost) {
            Ok(cost) => balance.covers(cost),
            Err(_) => false,
        }
    }

    async fn balance_for(
        &self,
        holder: Option<&HolderAddress>,
    ) -> Result<BalanceSnapshot, CoreError> {
        match holder {
            Some(holder) => {
                if let Some(snapshot) = self.balances.get(holder) {
                    return Ok(snapshot.clone());
                }
                self.refresh_balance(holder).await
            }
            None => Ok(BalanceSnapshot::zero()),
        }
    }

    async fn load_or_new_state(&self, session: &SessionKey) -> Result<WorkflowState, CoreError> {
        match self.workflow_repo.find_by_session(session).await? {
            Some(state) => Ok(state),
            None => Ok(WorkflowState::new(
                session.clone(),
                self.catalog.first_step().id.clone(),
            )),
        }
    }

    async fn append_activity(
        &self,
        session: &SessionKey,
        entry: ActivityEntry,
    ) -> Result<(), CoreError> {
        let mut log = self
            .activity_repo
            .find_by_session(session)
            .await?
            .unwrap_or_default();
        log.record(entry);
        self.activity_repo.save(session, &log).await
    }

    fn session_guard(&self, session: &SessionKey) -> Arc<Mutex<()>> {
        self.session_guards
            .entry(session.clone())
            .or_default()
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ledger::{CreditReceipt, DebitReceipt};
    use crate::domain::payload::{BrandNamePayload, LogoPayload, SummaryPayload};
    use crate::domain::repository::memory::{MemoryActivityRepository, MemoryWorkflowRepository};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

    struct StubLedger {
        balance_units: AtomicU64,
        fail_debits: AtomicBool,
        fail_balance: AtomicBool,
        debit_calls: AtomicUsize,
    }

    impl StubLedger {
        fn with_balance(tokens: u64) -> Self {
            Self {
                balance_units: AtomicU64::new(tokens * 1_000_000_000),
                fail_debits: AtomicBool::new(false),
                fail_balance: AtomicBool::new(false),
                debit_calls: AtomicUsize::new(0),
            }
        }

        fn set_balance(&self, tokens: u64) {
            self.balance_units
                .store(tokens * 1_000_000_000, Ordering::SeqCst);
        }

        fn debit_calls(&self) -> usize {
            self.debit_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TokenLedger for StubLedger {
        async fn fetch_balance(
            &self,
            _holder: &HolderAddress,
        ) -> Result<BalanceSnapshot, CoreError> {
            if self.fail_balance.load(Ordering::SeqCst) {
                return Err(CoreError::LedgerError("account lookup failed".to_string()));
            }
            Ok(BalanceSnapshot::new(TokenAmount::from_units(
                self.balance_units.load(Ordering::SeqCst),
            )))
        }

        async fn debit(
            &self,
            _holder: &HolderAddress,
            amount: TokenAmount,
        ) -> Result<DebitReceipt, CoreError> {
            self.debit_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_debits.load(Ordering::SeqCst) {
                return Err(CoreError::LedgerError("insufficient funds".to_string()));
            }
            self.balance_units.fetch_sub(amount.units(), Ordering::SeqCst);
            Ok(DebitReceipt {
                amount,
                holder_token_account: "stub-token-account".to_string(),
                mint_address: "stub-mint".to_string(),
            })
        }

        async fn credit(
            &self,
            _holder: &HolderAddress,
            amount: TokenAmount,
        ) -> Result<CreditReceipt, CoreError> {
            self.balance_units.fetch_add(amount.units(), Ordering::SeqCst);
            Ok(CreditReceipt {
                signature: "stub-signature".to_string(),
                amount,
                holder_token_account: "stub-token-account".to_string(),
                mint_address: "stub-mint".to_string(),
            })
        }

        fn info(&self) -> LedgerInfo {
            LedgerInfo {
                mint_address: "stub-mint".to_string(),
                authority: "stub-authority".to_string(),
                network: "test".to_string(),
                debit_ready: true,
                credit_ready: true,
            }
        }
    }

    fn controller(ledger: Arc<StubLedger>) -> WorkflowController {
        WorkflowController::new(
            StepCatalog::standard(),
            Arc::new(MemoryWorkflowRepository::new()),
            Arc::new(MemoryActivityRepository::new()),
            ledger,
        )
    }

    fn session() -> SessionKey {
        SessionKey::generate()
    }

    fn holder() -> HolderAddress {
        HolderAddress::from("holder-1")
    }

    fn brand_name_payload(name: &str) -> StepPayload {
        StepPayload::BrandName(BrandNamePayload {
            selected_name: name.to_string(),
            ..Default::default()
        })
    }

    fn logo_payload(logo: &str) -> StepPayload {
        StepPayload::Logo(LogoPayload {
            selected_logo: logo.to_string(),
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn test_first_step_always_accessible() {
        let controller = controller(Arc::new(StubLedger::with_balance(0)));
        let session = session();

        // No holder, no balance, no prior state
        let accessible = controller
            .can_access_step(&session, None, &StepId::from("brandName"))
            .await
            .unwrap();
        assert!(accessible);
    }

    #[tokio::test]
    async fn test_paid_step_locked_without_brand_name() {
        let controller = controller(Arc::new(StubLedger::with_balance(1000)));
        let session = session();
        let holder = holder();

        // Plenty of funds but no chosen name
        let accessible = controller
            .can_access_step(&session, Some(&holder), &StepId::from("logo"))
            .await
            .unwrap();
        assert!(!accessible);
    }

    #[tokio::test]
    async fn test_gating_follows_balance() {
        let ledger = Arc::new(StubLedger::with_balance(10));
        let controller = controller(ledger.clone());
        let session = session();
        let holder = holder();

        controller
            .complete_step(
                &session,
                &holder,
                &StepId::from("brandName"),
                brand_name_payload("Acme"),
            )
            .await
            .unwrap();

        // Logo costs 5 tokens
        ledger.set_balance(3);
        controller.refresh_balance(&holder).await.unwrap();
        assert!(!controller
            .can_access_step(&session, Some(&holder), &StepId::from("logo"))
            .await
            .unwrap());

        ledger.set_balance(5);
        controller.refresh_balance(&holder).await.unwrap();
        assert!(controller
            .can_access_step(&session, Some(&holder), &StepId::from("logo"))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_complete_step_debits_persists_and_records_activity() {
        let ledger = Arc::new(StubLedger::with_balance(6));
        let controller = controller(ledger.clone());
        let session = session();
        let holder = holder();

        controller
            .complete_step(
                &session,
                &holder,
                &StepId::from("brandName"),
                brand_name_payload("Acme"),
            )
            .await
            .unwrap();

        let outcome = controller
            .complete_step(&session, &holder, &StepId::from("logo"), logo_payload("fox"))
            .await
            .unwrap();

        assert_eq!(outcome.step_id, StepId::from("logo"));
        assert_eq!(outcome.cost, TokenAmount::from_whole(5).unwrap());
        assert!(outcome.charged);
        assert_eq!(ledger.debit_calls(), 2);

        // State persisted
        let state = controller.workflow_state(&session).await.unwrap();
        assert!(state.is_step_completed(&StepId::from("logo")));

        // Newest activity first
        let activities = controller.activities(&session).await.unwrap();
        assert_eq!(activities.entries()[0].description, "Completed Logo Design");
        assert_eq!(
            activities.entries()[0].cost,
            TokenAmount::from_whole(5).unwrap()
        );
        assert_eq!(activities.entries()[1].description, "Completed Brand Name");
    }

    #[tokio::test]
    async fn test_failed_debit_leaves_state_unchanged() {
        let ledger = Arc::new(StubLedger::with_balance(10));
        ledger.fail_debits.store(true, Ordering::SeqCst);
        let controller = controller(ledger.clone());
        let session = session();

        let err = controller
            .complete_step(
                &session,
                &holder(),
                &StepId::from("brandName"),
                brand_name_payload("Acme"),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, CoreError::PaymentFailed(_)));
        let state = controller.workflow_state(&session).await.unwrap();
        assert!(state.completed_steps.is_empty());
        assert!(state.step_outputs.is_empty());
        assert!(controller.activities(&session).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_recompletion_merges_without_second_charge() {
        let ledger = Arc::new(StubLedger::with_balance(10));
        let controller = controller(ledger.clone());
        let session = session();
        let holder = holder();

        controller
            .complete_step(
                &session,
                &holder,
                &StepId::from("brandName"),
                brand_name_payload("Acme"),
            )
            .await
            .unwrap();
        let outcome = controller
            .complete_step(
                &session,
                &holder,
                &StepId::from("brandName"),
                brand_name_payload("Apex"),
            )
            .await
            .unwrap();

        assert!(!outcome.charged);
        assert_eq!(ledger.debit_calls(), 1);

        let state = controller.workflow_state(&session).await.unwrap();
        assert_eq!(state.selected_name(), Some("Apex"));
        assert_eq!(state.completed_steps.len(), 1);
    }

    #[tokio::test]
    async fn test_final_step_never_debits() {
        let ledger = Arc::new(StubLedger::with_balance(0));
        let controller = controller(ledger.clone());
        let session = session();

        let outcome = controller
            .complete_final_step(
                &session,
                StepPayload::Summary(SummaryPayload {
                    summary: "A bold logistics brand".to_string(),
                }),
            )
            .await
            .unwrap();

        assert!(!outcome.charged);
        assert_eq!(outcome.cost, TokenAmount::ZERO);
        assert_eq!(ledger.debit_calls(), 0);

        let state = controller.workflow_state(&session).await.unwrap();
        assert!(state.is_step_completed(&StepId::from("summary")));

        let activities = controller.activities(&session).await.unwrap();
        assert_eq!(activities.entries()[0].description, "Completed Brand Summary");
        assert!(activities.entries()[0].cost.is_zero());
    }

    #[tokio::test]
    async fn test_unknown_step_rejected() {
        let controller = controller(Arc::new(StubLedger::with_balance(10)));
        let session = session();

        let err = controller
            .complete_step(
                &session,
                &holder(),
                &StepId::from("watermark"),
                brand_name_payload("Acme"),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::UnknownStep(_)));

        let err = controller
            .select_step(&session, None, &StepId::from("watermark"))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::UnknownStep(_)));
    }

    #[tokio::test]
    async fn test_mismatched_payload_rejected_before_debit() {
        let ledger = Arc::new(StubLedger::with_balance(10));
        let controller = controller(ledger.clone());
        let session = session();

        let err = controller
            .complete_step(
                &session,
                &holder(),
                &StepId::from("logo"),
                brand_name_payload("Acme"),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, CoreError::InvalidParameters(_)));
        assert_eq!(ledger.debit_calls(), 0);
    }

    #[tokio::test]
    async fn test_select_step_respects_gating() {
        let ledger = Arc::new(StubLedger::with_balance(10));
        let controller = controller(ledger.clone());
        let session = session();
        let holder = holder();

        // Locked until a name is chosen
        let err = controller
            .select_step(&session, Some(&holder), &StepId::from("logo"))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidParameters(_)));

        controller
            .complete_step(
                &session,
                &holder,
                &StepId::from("brandName"),
                brand_name_payload("Acme"),
            )
            .await
            .unwrap();

        let state = controller
            .select_step(&session, Some(&holder), &StepId::from("logo"))
            .await
            .unwrap();
        assert_eq!(state.current_step, StepId::from("logo"));

        // Selection persists
        let reloaded = controller.workflow_state(&session).await.unwrap();
        assert_eq!(reloaded.current_step, StepId::from("logo"));
    }

    #[tokio::test]
    async fn test_completed_step_stays_open_with_empty_balance() {
        let ledger = Arc::new(StubLedger::with_balance(6));
        let controller = controller(ledger.clone());
        let session = session();
        let holder = holder();

        controller
            .complete_step(
                &session,
                &holder,
                &StepId::from("brandName"),
                brand_name_payload("Acme"),
            )
            .await
            .unwrap();
        controller
            .complete_step(&session, &holder, &StepId::from("logo"), logo_payload("fox"))
            .await
            .unwrap();

        // Balance is drained now, but the completed logo step stays open
        let state = controller
            .select_step(&session, Some(&holder), &StepId::from("logo"))
            .await
            .unwrap();
        assert_eq!(state.current_step, StepId::from("logo"));

        let statuses = controller
            .step_statuses(&session, Some(&holder))
            .await
            .unwrap();
        let logo = statuses
            .iter()
            .find(|status| status.id == StepId::from("logo"))
            .unwrap();
        assert!(logo.completed);
        assert!(logo.accessible);
        assert!(logo.current);
    }

    #[tokio::test]
    async fn test_balance_lookup_failure_reads_zero() {
        let ledger = Arc::new(StubLedger::with_balance(100));
        ledger.fail_balance.store(true, Ordering::SeqCst);
        let controller = controller(ledger);

        let snapshot = controller.refresh_balance(&holder()).await.unwrap();
        assert!(snapshot.amount.is_zero());
    }

    #[tokio::test]
    async fn test_debit_drops_cached_balance() {
        let ledger = Arc::new(StubLedger::with_balance(10));
        let controller = controller(ledger.clone());
        let session = session();
        let holder = holder();

        controller.refresh_balance(&holder).await.unwrap();
        assert!(controller.cached_balance(&holder).is_some());

        controller
            .complete_step(
                &session,
                &holder,
                &StepId::from("brandName"),
                brand_name_payload("Acme"),
            )
            .await
            .unwrap();

        // Next gating read must hit the ledger again
        assert!(controller.cached_balance(&holder).is_none());
    }

    #[tokio::test]
    async fn test_purchase_lands_in_activity_feed() {
        let controller = controller(Arc::new(StubLedger::with_balance(0)));
        let session = session();

        controller
            .record_purchase(&session, TokenAmount::from_whole(1000).unwrap())
            .await
            .unwrap();

        let activities = controller.activities(&session).await.unwrap();
        assert_eq!(activities.entries()[0].description, "Purchased 1000 SOLB");
        assert_eq!(
            activities.entries()[0].cost,
            TokenAmount::from_whole(1000).unwrap()
        );
    }
}
