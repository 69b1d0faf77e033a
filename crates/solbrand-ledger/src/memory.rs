//! In-memory implementation of the token ledger
//!
//! Holds balances in a concurrent map. Used for development and testing,
//! and as the issuance backend when no chain endpoint is configured, since
//! credits need an authority signature a bare RPC client does not hold.
//! All balances are lost when the instance is dropped.

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;
use uuid::Uuid;

use solbrand_core::{
    BalanceSnapshot, CoreError, CreditReceipt, DebitReceipt, HolderAddress, LedgerInfo,
    TokenAmount, TokenLedger,
};

/// In-memory implementation of the token ledger
#[derive(Debug)]
pub struct InMemoryTokenLedger {
    /// Mint this ledger issues
    mint_address: String,

    /// Issuing authority identity
    authority: String,

    /// Network label reported in status output
    network: String,

    /// Balances in smallest units, keyed by holder
    accounts: DashMap<HolderAddress, u64>,
}

impl InMemoryTokenLedger {
    /// Create a new in-memory token ledger with no funded accounts
    pub fn new(
        mint_address: impl Into<String>,
        authority: impl Into<String>,
        network: impl Into<String>,
    ) -> Self {
        Self {
            mint_address: mint_address.into(),
            authority: authority.into(),
            network: network.into(),
            accounts: DashMap::new(),
        }
    }

    /// Deterministic pseudo token account for a holder on this mint
    fn token_account(&self, holder: &HolderAddress) -> String {
        format!("{}:{}", holder, self.mint_address)
    }
}

#[async_trait]
impl TokenLedger for InMemoryTokenLedger {
    async fn fetch_balance(&self, holder: &HolderAddress) -> Result<BalanceSnapshot, CoreError> {
        let units = self.accounts.get(holder).map(|units| *units).unwrap_or(0);
        Ok(BalanceSnapshot::new(TokenAmount::from_units(units)))
    }

    async fn debit(
        &self,
        holder: &HolderAddress,
        amount: TokenAmount,
    ) -> Result<DebitReceipt, CoreError> {
        holder.validate()?;
        if amount.is_zero() {
            return Err(CoreError::InvalidParameters(
                "debit amount must be positive".to_string(),
            ));
        }

        let mut account = self.accounts.get_mut(holder).ok_or_else(|| {
            CoreError::LedgerError(format!(
                "holder {} has no token account for mint {}",
                holder, self.mint_address
            ))
        })?;
        if *account < amount.units() {
            return Err(CoreError::LedgerError(format!(
                "insufficient funds: have {}, need {}",
                TokenAmount::from_units(*account),
                amount
            )));
        }
        *account -= amount.units();

        debug!(holder = %holder, amount = %amount, "Debited in-memory account");
        Ok(DebitReceipt {
            amount,
            holder_token_account: self.token_account(holder),
            mint_address: self.mint_address.clone(),
        })
    }

    async fn credit(
        &self,
        holder: &HolderAddress,
        amount: TokenAmount,
    ) -> Result<CreditReceipt, CoreError> {
        holder.validate()?;
        if amount.is_zero() {
            return Err(CoreError::InvalidParameters(
                "credit amount must be positive".to_string(),
            ));
        }

        // Creates the holder's account on first credit
        let mut account = self.accounts.entry(holder.clone()).or_insert(0);
        *account = account.checked_add(amount.units()).ok_or_else(|| {
            CoreError::LedgerError(format!("balance overflow for holder {}", holder))
        })?;
        drop(account);

        let signature = Uuid::new_v4().simple().to_string();
        debug!(holder = %holder, amount = %amount, signature = %signature, "Credited in-memory account");
        Ok(CreditReceipt {
            signature,
            amount,
            holder_token_account: self.token_account(holder),
            mint_address: self.mint_address.clone(),
        })
    }

    fn info(&self) -> LedgerInfo {
        LedgerInfo {
            mint_address: self.mint_address.clone(),
            authority: self.authority.clone(),
            network: self.network.clone(),
            debit_ready: true,
            credit_ready: true,
        }
    }
}
