//! JSON-RPC implementation of the token ledger
//!
//! Reads live balances from a chain RPC endpoint. Debits are validated
//! against the holder's on-chain token accounts and acknowledged; the burn
//! transaction itself is signed by the holder out of band. Credits need the
//! mint authority's signature, which this client does not hold, so they fail
//! with a ledger error.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, info};

use solbrand_core::{
    BalanceSnapshot, CoreError, CreditReceipt, DebitReceipt, HolderAddress, LedgerInfo,
    TokenAmount, TokenLedger,
};

/// One of a holder's token accounts as reported by the RPC endpoint
#[derive(Debug, Clone)]
struct TokenAccountView {
    pubkey: String,
    units: u64,
}

/// JSON-RPC implementation of the token ledger
#[derive(Debug, Clone)]
pub struct RpcTokenLedger {
    /// RPC endpoint URL
    endpoint: String,

    /// Mint the ledger operates on
    mint_address: String,

    /// Issuing authority identity
    authority: String,

    /// Network label reported in status output
    network: String,

    /// HTTP client
    client: Client,
}

/// Upper bound on any single RPC round trip
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

impl RpcTokenLedger {
    /// Create a new RPC token ledger client
    pub fn new(
        endpoint: impl Into<String>,
        mint_address: impl Into<String>,
        authority: impl Into<String>,
        network: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            mint_address: mint_address.into(),
            authority: authority.into(),
            network: network.into(),
            client: Client::new(),
        }
    }

    /// Send one JSON-RPC request and unwrap the result field
    async fn rpc_call(&self, method: &str, params: Value) -> Result<Value, CoreError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });
        debug!(endpoint = %self.endpoint, method, "Sending RPC request");

        let response = self
            .client
            .post(&self.endpoint)
            .timeout(REQUEST_TIMEOUT)
            .json(&body)
            .send()
            .await
            .map_err(|e| CoreError::LedgerError(format!("RPC transport error: {}", e)))?;
        if !response.status().is_success() {
            return Err(CoreError::LedgerError(format!(
                "RPC endpoint returned HTTP {}",
                response.status()
            )));
        }

        let envelope: Value = response
            .json()
            .await
            .map_err(|e| CoreError::LedgerError(format!("RPC response was not JSON: {}", e)))?;
        if let Some(error) = envelope.get("error") {
            return Err(CoreError::LedgerError(format!("RPC error: {}", error)));
        }
        envelope
            .get("result")
            .cloned()
            .ok_or_else(|| CoreError::LedgerError("RPC response missing result".to_string()))
    }

    /// The holder's token accounts on this ledger's mint
    async fn token_accounts(
        &self,
        holder: &HolderAddress,
    ) -> Result<Vec<TokenAccountView>, CoreError> {
        let result = self
            .rpc_call(
                "getTokenAccountsByOwner",
                json!([
                    holder.to_string(),
                    { "mint": self.mint_address },
                    { "encoding": "jsonParsed" },
                ]),
            )
            .await?;

        let entries = result
            .get("value")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        let mut accounts = Vec::with_capacity(entries.len());
        for entry in entries {
            let pubkey = entry
                .get("pubkey")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            let amount = entry
                .pointer("/account/data/parsed/info/tokenAmount/amount")
                .and_then(Value::as_str)
                .unwrap_or("0");
            let units = amount.parse::<u64>().map_err(|_| {
                CoreError::LedgerError(format!(
                    "unparseable token amount in RPC response: {:?}",
                    amount
                ))
            })?;
            accounts.push(TokenAccountView { pubkey, units });
        }
        Ok(accounts)
    }

    fn total_units(accounts: &[TokenAccountView]) -> Result<u64, CoreError> {
        accounts
            .iter()
            .try_fold(0u64, |total, account| total.checked_add(account.units))
            .ok_or_else(|| CoreError::LedgerError("token account balances overflow".to_string()))
    }
}

#[async_trait]
impl TokenLedger for RpcTokenLedger {
    async fn fetch_balance(&self, holder: &HolderAddress) -> Result<BalanceSnapshot, CoreError> {
        let accounts = self.token_accounts(holder).await?;
        let units = Self::total_units(&accounts)?;
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

        let accounts = self.token_accounts(holder).await?;
        let primary = accounts.first().ok_or_else(|| {
            CoreError::LedgerError(format!(
                "holder {} has no token account for mint {}",
                holder, self.mint_address
            ))
        })?;
        let held = Self::total_units(&accounts)?;
        if held < amount.units() {
            return Err(CoreError::LedgerError(format!(
                "insufficient funds: have {}, need {}",
                TokenAmount::from_units(held),
                amount
            )));
        }

        // The burn transaction is signed and submitted by the holder; this
        // side validates the account state and acknowledges
        info!(
            holder = %holder,
            amount = %amount,
            token_account = %primary.pubkey,
            "Acknowledged holder-signed debit"
        );
        Ok(DebitReceipt {
            amount,
            holder_token_account: primary.pubkey.clone(),
            mint_address: self.mint_address.clone(),
        })
    }

    async fn credit(
        &self,
        _holder: &HolderAddress,
        _amount: TokenAmount,
    ) -> Result<CreditReceipt, CoreError> {
        Err(CoreError::LedgerError(
            "minting requires the authority keypair; the RPC backend has no signer".to_string(),
        ))
    }

    fn info(&self) -> LedgerInfo {
        LedgerInfo {
            mint_address: self.mint_address.clone(),
            authority: self.authority.clone(),
            network: self.network.clone(),
            debit_ready: true,
            credit_ready: false,
        }
    }
}
