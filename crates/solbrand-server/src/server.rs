//! Main SolBrand server implementation
//!
//! This module contains the SolBrandServer implementation. Handlers stay
//! thin; the methods here translate between wire strings and domain types,
//! delegate to the workflow controller and the ledger, and shape responses.

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use solbrand_core::{
    ActivityEntry, ActivityRepository, BalanceSnapshot, ExchangeRate, HolderAddress, LedgerInfo,
    SessionKey, StepCatalog, StepDefinition, StepId, StepPayload, StepStatus, TokenAmount,
    TokenLedger, WorkflowController, WorkflowRepository, WorkflowState, TOKEN_SYMBOL,
};
use solbrand_ledger::explorer_transaction_url;

use crate::api::tokens::{BalanceResponse, ConsumeTokensResponse, MintTokensResponse};
use crate::api::workflow::CompleteStepResponse;
use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};

/// Main server implementation
#[derive(Clone)]
pub struct SolBrandServer {
    /// Configuration
    pub config: ServerConfig,

    /// Workflow controller shared across request handlers
    controller: Arc<WorkflowController>,

    /// Token ledger backend
    ledger: Arc<dyn TokenLedger>,

    /// Workflow state repository, kept for health probes
    workflow_repo: Arc<dyn WorkflowRepository>,

    /// Tokens issued per native currency unit
    exchange_rate: ExchangeRate,

    /// Server address (might be different from configured if port is 0)
    address: Option<SocketAddr>,
}

/// Manual Debug implementation that doesn't try to debug the trait objects
impl std::fmt::Debug for SolBrandServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolBrandServer")
            .field("config", &self.config)
            .field("exchange_rate", &self.exchange_rate)
            .field("address", &self.address)
            .finish()
    }
}

impl SolBrandServer {
    /// Create a new SolBrandServer
    pub fn new(
        config: ServerConfig,
        ledger: Arc<dyn TokenLedger>,
        workflow_repo: Arc<dyn WorkflowRepository>,
        activity_repo: Arc<dyn ActivityRepository>,
    ) -> Self {
        let controller = WorkflowController::new(
            StepCatalog::standard(),
            workflow_repo.clone(),
            activity_repo,
            ledger.clone(),
        );
        let exchange_rate = ExchangeRate(config.exchange_rate);

        Self {
            config,
            controller: Arc::new(controller),
            ledger,
            workflow_repo,
            exchange_rate,
            address: None,
        }
    }

    /// Run the server
    pub async fn run(mut self) -> ServerResult<()> {
        info!("Starting SolBrand server");

        let addr = SocketAddr::new(
            self.config.bind_address.parse().map_err(|_| {
                ServerError::ConfigError(format!(
                    "Invalid bind address: {}",
                    self.config.bind_address
                ))
            })?,
            self.config.port,
        );

        // Create and bind the TCP listener
        let listener = TcpListener::bind(addr).await?;
        let addr = listener.local_addr()?;

        // Store the actual bound address
        self.address = Some(addr);
        info!("Listening on {}", addr);

        // Build the API router and run the server
        let app = crate::api::build_router(Arc::new(self.clone()));
        axum::serve(listener, app).await?;

        Ok(())
    }

    /// Get the server's bound address
    pub fn address(&self) -> SocketAddr {
        self.address
            .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], self.config.port)))
    }

    /// The configured exchange rate
    pub fn exchange_rate(&self) -> ExchangeRate {
        self.exchange_rate
    }

    /// Ordered catalog steps
    pub fn list_steps(&self) -> &[StepDefinition] {
        self.controller.list_steps()
    }

    /// Facts about the ledger backend in use
    pub fn ledger_info(&self) -> LedgerInfo {
        self.controller.ledger_info()
    }

    /// Load a session's workflow state
    pub async fn workflow_state(&self, session: &str) -> ServerResult<WorkflowState> {
        let session = SessionKey::from(session);
        Ok(self.controller.workflow_state(&session).await?)
    }

    /// Catalog steps with a session's completion and accessibility flags
    pub async fn step_statuses(
        &self,
        session: &str,
        holder: Option<&str>,
    ) -> ServerResult<Vec<StepStatus>> {
        let session = SessionKey::from(session);
        let holder = holder.map(HolderAddress::from);
        Ok(self
            .controller
            .step_statuses(&session, holder.as_ref())
            .await?)
    }

    /// Move a session's focus to a step, subject to the access gate
    pub async fn select_step(
        &self,
        session: &str,
        holder: Option<&str>,
        step_id: &str,
    ) -> ServerResult<WorkflowState> {
        let session = SessionKey::from(session);
        let holder = holder.map(HolderAddress::from);
        let step_id = StepId::new(step_id);
        Ok(self
            .controller
            .select_step(&session, holder.as_ref(), &step_id)
            .await?)
    }

    /// Complete a workflow step for a session.
    ///
    /// The free terminal step needs no holder; every other step debits the
    /// holder through the controller and responds with a refreshed balance.
    pub async fn complete_step(
        &self,
        session: &str,
        holder: Option<&str>,
        step_id: &str,
        payload: StepPayload,
    ) -> ServerResult<CompleteStepResponse> {
        let session = SessionKey::from(session);
        let step_id = StepId::new(step_id);

        if self.controller.catalog().get_step(&step_id).is_none() {
            return Err(ServerError::NotFound(format!("Step {}", step_id)));
        }

        if self.controller.catalog().is_terminal(&step_id) {
            let outcome = self.controller.complete_final_step(&session, payload).await?;
            return Ok(CompleteStepResponse {
                success: true,
                step_id: outcome.step_id,
                cost: outcome.cost.to_string(),
                charged: outcome.charged,
                balance: None,
            });
        }

        let holder = match holder {
            Some(holder) => holder_address(holder)?,
            None => {
                return Err(ServerError::ValidationError(
                    "holderAddress is required".to_string(),
                ))
            }
        };

        let outcome = self
            .controller
            .complete_step(&session, &holder, &step_id, payload)
            .await?;
        let snapshot = self.controller.refresh_balance(&holder).await?;

        Ok(CompleteStepResponse {
            success: true,
            step_id: outcome.step_id,
            cost: outcome.cost.to_string(),
            charged: outcome.charged,
            balance: Some(balance_response(&holder, snapshot)),
        })
    }

    /// A session's activity feed, newest first
    pub async fn activities(&self, session: &str) -> ServerResult<Vec<ActivityEntry>> {
        let session = SessionKey::from(session);
        let log = self.controller.activities(&session).await?;
        Ok(log.entries().to_vec())
    }

    /// Fetch a holder's balance from the ledger
    pub async fn fetch_balance(&self, holder: &str) -> ServerResult<BalanceResponse> {
        let holder = holder_address(holder)?;
        let snapshot = self.controller.refresh_balance(&holder).await?;
        Ok(balance_response(&holder, snapshot))
    }

    /// Consume (burn) tokens from a holder
    pub async fn consume_tokens(
        &self,
        holder: &str,
        amount: TokenAmount,
    ) -> ServerResult<ConsumeTokensResponse> {
        let holder = holder_address(holder)?;
        if amount.is_zero() {
            return Err(ServerError::ValidationError(
                "amount must be greater than zero".to_string(),
            ));
        }

        let receipt = self.ledger.debit(&holder, amount).await?;
        // The ledger moved; the cached balance is stale
        self.controller.invalidate_balance(&holder);

        info!(holder = %holder, amount = %receipt.amount, "Consumed tokens");
        Ok(ConsumeTokensResponse {
            success: true,
            amount: receipt.amount.to_string(),
            token_amount_in_smallest_units: receipt.amount.units(),
            holder_token_account: receipt.holder_token_account,
            mint_address: receipt.mint_address,
        })
    }

    /// Mint tokens to a holder against a native-currency amount.
    ///
    /// When a session is given, the purchase lands in that session's
    /// activity feed.
    pub async fn mint_tokens(
        &self,
        holder: &str,
        sol_amount: TokenAmount,
        session: Option<&str>,
    ) -> ServerResult<MintTokensResponse> {
        let holder = holder_address(holder)?;
        if sol_amount.is_zero() {
            return Err(ServerError::ValidationError(
                "solAmount must be greater than zero".to_string(),
            ));
        }
        let session = match session {
            Some(session) => Some(session_key(session)?),
            None => None,
        };

        let token_amount = self.exchange_rate.tokens_for_native(sol_amount)?;
        let receipt = self.ledger.credit(&holder, token_amount).await?;
        self.controller.invalidate_balance(&holder);

        if let Some(session) = session {
            self.controller
                .record_purchase(&session, receipt.amount)
                .await?;
        }

        let explorer_url = explorer_transaction_url(&receipt.signature, &self.config.network);
        info!(
            holder = %holder,
            sol_amount = %sol_amount,
            token_amount = %receipt.amount,
            "Minted tokens"
        );
        Ok(MintTokensResponse {
            success: true,
            signature: receipt.signature,
            sol_amount: sol_amount.to_string(),
            token_amount: receipt.amount.to_string(),
            holder_token_account: receipt.holder_token_account,
            mint_address: receipt.mint_address,
            explorer_url,
        })
    }

    /// Check that the ledger backend is reachable.
    ///
    /// `Ok(true)` means fully operational, `Ok(false)` means reachable but
    /// unable to perform every operation (an RPC backend with no signer).
    pub async fn check_ledger_health(&self) -> ServerResult<bool> {
        // A live balance read proves reachability without side effects
        let probe = HolderAddress::from("11111111111111111111111111111111");
        self.ledger
            .fetch_balance(&probe)
            .await
            .map_err(|err| ServerError::LedgerError(err.to_string()))?;

        let info = self.ledger.info();
        Ok(info.debit_ready && info.credit_ready)
    }

    /// Check that the workflow state store answers reads
    pub async fn check_state_store_health(&self) -> ServerResult<bool> {
        // Read probe only; a session that was never written loads as None
        let probe = SessionKey::from("health-probe");
        self.workflow_repo
            .find_by_session(&probe)
            .await
            .map_err(|err| ServerError::StateStoreError(err.to_string()))?;
        Ok(true)
    }
}

fn session_key(session: &str) -> ServerResult<SessionKey> {
    let session = SessionKey::from(session);
    session.validate()?;
    Ok(session)
}

fn holder_address(holder: &str) -> ServerResult<HolderAddress> {
    let holder = HolderAddress::from(holder);
    holder.validate()?;
    Ok(holder)
}

fn balance_response(holder: &HolderAddress, snapshot: BalanceSnapshot) -> BalanceResponse {
    BalanceResponse {
        holder_address: holder.to_string(),
        balance: snapshot.amount.to_string(),
        balance_in_smallest_units: snapshot.amount.units(),
        symbol: TOKEN_SYMBOL.to_string(),
        fetched_at: snapshot.fetched_at,
    }
}
