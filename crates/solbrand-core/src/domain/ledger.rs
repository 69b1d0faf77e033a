//! Token ledger port.
//!
//! The workflow controller never talks to a chain directly; it goes through
//! this trait. Implementations live outside the core crate.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{BalanceSnapshot, HolderAddress, TokenAmount};

/// Proof that tokens were taken from a holder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebitReceipt {
    /// Amount debited
    pub amount: TokenAmount,
    /// Token account the debit was applied to
    pub holder_token_account: String,
    /// Mint the debited tokens belong to
    pub mint_address: String,
}

/// Proof that tokens were issued to a holder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditReceipt {
    /// Transaction signature of the credit
    pub signature: String,
    /// Amount credited
    pub amount: TokenAmount,
    /// Token account the credit landed on
    pub holder_token_account: String,
    /// Mint the credited tokens belong to
    pub mint_address: String,
}

/// Static facts about a ledger backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerInfo {
    /// Mint the ledger operates on
    pub mint_address: String,
    /// Issuing authority identity
    pub authority: String,
    /// Network label, e.g. "devnet"
    pub network: String,
    /// Whether the backend can take tokens from holders
    pub debit_ready: bool,
    /// Whether the backend can issue tokens to holders
    pub credit_ready: bool,
}

/// External token ledger.
///
/// Balances read through this trait are the only source of truth; callers
/// must not adjust cached balances locally after a debit.
#[async_trait]
pub trait TokenLedger: Send + Sync {
    /// Current balance of `holder` on this ledger's mint
    async fn fetch_balance(&self, holder: &HolderAddress) -> Result<BalanceSnapshot, CoreError>;

    /// Take `amount` from `holder`. Fails when the holder has no token
    /// account or not enough funds.
    async fn debit(
        &self,
        holder: &HolderAddress,
        amount: TokenAmount,
    ) -> Result<DebitReceipt, CoreError>;

    /// Issue `amount` to `holder`
    async fn credit(
        &self,
        holder: &HolderAddress,
        amount: TokenAmount,
    ) -> Result<CreditReceipt, CoreError>;

    /// Backend facts for status reporting
    fn info(&self) -> LedgerInfo;
}
