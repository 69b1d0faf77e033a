//! Integration tests for the workflow controller against memory backends.

use async_trait::async_trait;
use mockall::mock;
use solbrand_core::domain::payload::{
    BrandNamePayload, ColorPalettePayload, IdeaValidationPayload, LogoPayload, PitchDeckPayload,
    SummaryPayload, TypographyPayload,
};
use solbrand_core::domain::repository::memory::{
    MemoryActivityRepository, MemoryWorkflowRepository,
};
use solbrand_core::{
    ActivityCategory, BalanceSnapshot, CoreError, CreditReceipt, DebitReceipt, HolderAddress,
    LedgerInfo, SessionKey, StepCatalog, StepId, StepPayload, TokenAmount, TokenLedger,
    WorkflowController, WorkflowRepository, WorkflowState, ACTIVITY_LOG_CAPACITY,
};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Ledger with real balance arithmetic and a debit call counter. Debits
/// pause briefly so concurrent callers overlap.
struct CountingLedger {
    balance_units: AtomicU64,
    debit_calls: AtomicUsize,
}

impl CountingLedger {
    fn with_tokens(tokens: u64) -> Self {
        Self {
            balance_units: AtomicU64::new(tokens * 1_000_000_000),
            debit_calls: AtomicUsize::new(0),
        }
    }

    fn debit_calls(&self) -> usize {
        self.debit_calls.load(Ordering::SeqCst)
    }

    fn balance(&self) -> TokenAmount {
        TokenAmount::from_units(self.balance_units.load(Ordering::SeqCst))
    }
}

#[async_trait]
impl TokenLedger for CountingLedger {
    async fn fetch_balance(&self, _holder: &HolderAddress) -> Result<BalanceSnapshot, CoreError> {
        Ok(BalanceSnapshot::new(self.balance()))
    }

    async fn debit(
        &self,
        _holder: &HolderAddress,
        amount: TokenAmount,
    ) -> Result<DebitReceipt, CoreError> {
        self.debit_calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(10)).await;

        let held = self.balance();
        if !BalanceSnapshot::new(held).covers(amount) {
            return Err(CoreError::LedgerError(format!(
                "insufficient funds: have {}, need {}",
                held, amount
            )));
        }
        self.balance_units.fetch_sub(amount.units(), Ordering::SeqCst);
        Ok(DebitReceipt {
            amount,
            holder_token_account: "test-token-account".to_string(),
            mint_address: "test-mint".to_string(),
        })
    }

    async fn credit(
        &self,
        _holder: &HolderAddress,
        amount: TokenAmount,
    ) -> Result<CreditReceipt, CoreError> {
        self.balance_units.fetch_add(amount.units(), Ordering::SeqCst);
        Ok(CreditReceipt {
            signature: uuid::Uuid::new_v4().to_string(),
            amount,
            holder_token_account: "test-token-account".to_string(),
            mint_address: "test-mint".to_string(),
        })
    }

    fn info(&self) -> LedgerInfo {
        LedgerInfo {
            mint_address: "test-mint".to_string(),
            authority: "test-authority".to_string(),
            network: "test".to_string(),
            debit_ready: true,
            credit_ready: true,
        }
    }
}

mock! {
    WorkflowRepo {}

    #[async_trait]
    impl WorkflowRepository for WorkflowRepo {
        async fn find_by_session(
            &self,
            session: &SessionKey,
        ) -> Result<Option<WorkflowState>, CoreError>;
        async fn save(&self, state: &WorkflowState) -> Result<(), CoreError>;
        async fn delete(&self, session: &SessionKey) -> Result<(), CoreError>;
    }
}

fn controller_with(
    ledger: Arc<CountingLedger>,
) -> (WorkflowController, Arc<MemoryWorkflowRepository>) {
    let workflow_repo = Arc::new(MemoryWorkflowRepository::new());
    let controller = WorkflowController::new(
        StepCatalog::standard(),
        workflow_repo.clone(),
        Arc::new(MemoryActivityRepository::new()),
        ledger,
    );
    (controller, workflow_repo)
}

fn brand_name(name: &str) -> StepPayload {
    StepPayload::BrandName(BrandNamePayload {
        selected_name: name.to_string(),
        ..Default::default()
    })
}

#[tokio::test]
async fn test_full_workflow_run() {
    let ledger = Arc::new(CountingLedger::with_tokens(0));
    let (controller, _) = controller_with(ledger.clone());
    let session = SessionKey::generate();
    let holder = HolderAddress::from("workflow-holder");

    // Fund the holder: 10 whole tokens covers 1+5+1+1+1+1
    ledger
        .credit(&holder, TokenAmount::from_whole(10).unwrap())
        .await
        .unwrap();
    controller
        .record_purchase(&session, TokenAmount::from_whole(10).unwrap())
        .await
        .unwrap();

    let steps: Vec<(StepId, StepPayload)> = vec![
        (StepId::from("brandName"), brand_name("Northwind")),
        (
            StepId::from("logo"),
            StepPayload::Logo(LogoPayload {
                selected_logo: "compass".to_string(),
                ..Default::default()
            }),
        ),
        (
            StepId::from("ideaValidation"),
            StepPayload::IdeaValidation(IdeaValidationPayload {
                detailed_description: Some("Freight routing for small fleets".to_string()),
                ..Default::default()
            }),
        ),
        (
            StepId::from("typography"),
            StepPayload::Typography(TypographyPayload {
                selected_font_pair: "inter-lora".to_string(),
                ..Default::default()
            }),
        ),
        (
            StepId::from("colorPalette"),
            StepPayload::ColorPalette(ColorPalettePayload {
                selected_palette: "harbor".to_string(),
                ..Default::default()
            }),
        ),
        (
            StepId::from("pitchDeck"),
            StepPayload::PitchDeck(PitchDeckPayload {
                business_summary: Some("Routing engine for regional freight".to_string()),
                ..Default::default()
            }),
        ),
    ];

    for (step_id, payload) in steps {
        // Each upcoming step must be open before it is completed
        assert!(
            controller
                .can_access_step(&session, Some(&holder), &step_id)
                .await
                .unwrap(),
            "step {step_id} should be accessible"
        );
        controller
            .complete_step(&session, &holder, &step_id, payload)
            .await
            .unwrap();
    }

    controller
        .complete_final_step(
            &session,
            StepPayload::Summary(SummaryPayload {
                summary: "Northwind: freight routing for small fleets".to_string(),
            }),
        )
        .await
        .unwrap();

    // All seven steps completed, all ten tokens spent
    let state = controller.workflow_state(&session).await.unwrap();
    assert_eq!(state.completed_steps.len(), 7);
    assert_eq!(ledger.balance(), TokenAmount::ZERO);
    assert_eq!(ledger.debit_calls(), 6);

    // Activity feed: 7 completions over the initial purchase, newest first
    let activities = controller.activities(&session).await.unwrap();
    assert_eq!(activities.len(), 8);
    assert_eq!(activities.entries()[0].description, "Completed Brand Summary");
    assert_eq!(
        activities.entries()[7].category,
        ActivityCategory::TokenPurchase
    );
}

#[tokio::test]
async fn test_concurrent_double_submit_debits_once() {
    let ledger = Arc::new(CountingLedger::with_tokens(10));
    let (controller, _) = controller_with(ledger.clone());
    let controller = Arc::new(controller);
    let session = SessionKey::generate();
    let holder = HolderAddress::from("racy-holder");

    let first = tokio::spawn({
        let controller = controller.clone();
        let session = session.clone();
        let holder = holder.clone();
        async move {
            controller
                .complete_step(&session, &holder, &StepId::from("brandName"), brand_name("Acme"))
                .await
        }
    });
    let second = tokio::spawn({
        let controller = controller.clone();
        let session = session.clone();
        let holder = holder.clone();
        async move {
            controller
                .complete_step(&session, &holder, &StepId::from("brandName"), brand_name("Apex"))
                .await
        }
    });

    let (first, second) = futures::future::join(first, second).await;
    let first = first.unwrap().unwrap();
    let second = second.unwrap().unwrap();

    // Exactly one submission paid; the other merged for free
    assert_eq!(ledger.debit_calls(), 1);
    assert_eq!(
        [first.charged, second.charged].iter().filter(|c| **c).count(),
        1
    );
    assert_eq!(ledger.balance(), TokenAmount::from_whole(9).unwrap());
}

#[tokio::test]
async fn test_persisted_state_matches_memory_byte_for_byte() {
    let ledger = Arc::new(CountingLedger::with_tokens(10));
    let (controller, workflow_repo) = controller_with(ledger);
    let session = SessionKey::generate();
    let holder = HolderAddress::from("holder");

    controller
        .complete_step(
            &session,
            &holder,
            &StepId::from("brandName"),
            StepPayload::BrandName(BrandNamePayload {
                selected_name: "Acme".to_string(),
                industry: Some("logistics".to_string()),
                ..Default::default()
            }),
        )
        .await
        .unwrap();

    let in_memory = controller.workflow_state(&session).await.unwrap();
    let stored = workflow_repo
        .find_by_session(&session)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(
        serde_json::to_string(&in_memory).unwrap(),
        serde_json::to_string(&stored).unwrap()
    );
}

#[tokio::test]
async fn test_activity_feed_is_bounded() {
    let ledger = Arc::new(CountingLedger::with_tokens(0));
    let (controller, _) = controller_with(ledger);
    let session = SessionKey::generate();

    for _ in 0..ACTIVITY_LOG_CAPACITY + 10 {
        controller
            .record_purchase(&session, TokenAmount::from_whole(1).unwrap())
            .await
            .unwrap();
    }

    let activities = controller.activities(&session).await.unwrap();
    assert_eq!(activities.len(), ACTIVITY_LOG_CAPACITY);
}

#[tokio::test]
async fn test_save_failure_surfaces_persistence_error() {
    let mut workflow_repo = MockWorkflowRepo::new();
    workflow_repo
        .expect_find_by_session()
        .returning(|_| Ok(None));
    workflow_repo.expect_save().returning(|_| {
        Err(CoreError::PersistenceError(
            "state directory is read-only".to_string(),
        ))
    });

    let ledger = Arc::new(CountingLedger::with_tokens(10));
    let controller = WorkflowController::new(
        StepCatalog::standard(),
        Arc::new(workflow_repo),
        Arc::new(MemoryActivityRepository::new()),
        ledger.clone(),
    );

    let err = controller
        .complete_step(
            &SessionKey::generate(),
            &HolderAddress::from("holder"),
            &StepId::from("brandName"),
            brand_name("Acme"),
        )
        .await
        .unwrap_err();

    // The debit went through before the write failed; the error names the
    // storage problem, not the payment
    assert!(matches!(err, CoreError::PersistenceError(_)));
    assert_eq!(ledger.debit_calls(), 1);
}
