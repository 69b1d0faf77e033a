//! HTTP client for CLI → server communication
//!
//! Thin wrapper over the server's token endpoints. Error responses carry the
//! server's `{error, details}` envelope; the client surfaces the message and
//! error code so failures read the same in the terminal as in the API.

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;

/// HTTP client that connects to the SolBrand server API
pub struct ServerClient {
    base_url: String,
    client: reqwest::Client,
}

/// Readiness report for one token operation
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationStatus {
    pub ready: bool,
    pub operation: String,
    pub mint_address: String,
    pub authority: String,
    pub network: String,
    pub symbol: String,
    pub decimals: u8,
    /// Only reported by the mint endpoint
    #[serde(default)]
    pub exchange_rate: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceInfo {
    pub holder_address: String,
    pub balance: String,
    pub balance_in_smallest_units: u64,
    pub symbol: String,
    pub fetched_at: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MintReceipt {
    pub success: bool,
    pub signature: String,
    pub sol_amount: String,
    pub token_amount: String,
    pub holder_token_account: String,
    pub mint_address: String,
    pub explorer_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumeReceipt {
    pub success: bool,
    pub amount: String,
    pub token_amount_in_smallest_units: u64,
    pub holder_token_account: String,
    pub mint_address: String,
}

impl ServerClient {
    /// Create a new client pointing at a server URL
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Readiness of the debit side of the ledger
    pub async fn consume_status(&self) -> Result<OperationStatus> {
        let resp = self
            .client
            .get(format!("{}/v1/tokens/consume", self.base_url))
            .send()
            .await
            .context("Failed to connect to SolBrand server")?;

        Self::decode(resp).await
    }

    /// Readiness of the credit side of the ledger
    pub async fn mint_status(&self) -> Result<OperationStatus> {
        let resp = self
            .client
            .get(format!("{}/v1/tokens/mint", self.base_url))
            .send()
            .await
            .context("Failed to connect to SolBrand server")?;

        Self::decode(resp).await
    }

    /// Fetch a holder's balance
    pub async fn balance(&self, holder: &str) -> Result<BalanceInfo> {
        let resp = self
            .client
            .get(format!("{}/v1/balance/{}", self.base_url, holder))
            .send()
            .await
            .context("Failed to connect to SolBrand server")?;

        Self::decode(resp).await
    }

    /// Purchase tokens for a holder, optionally crediting a session's feed
    pub async fn mint(
        &self,
        holder: &str,
        sol_amount: &str,
        session: Option<&str>,
    ) -> Result<MintReceipt> {
        let mut body = serde_json::json!({
            "holderAddress": holder,
            "solAmount": sol_amount,
        });
        if let Some(session) = session {
            body["session"] = Value::String(session.to_string());
        }

        let resp = self
            .client
            .post(format!("{}/v1/tokens/mint", self.base_url))
            .json(&body)
            .send()
            .await
            .context("Failed to connect to SolBrand server")?;

        Self::decode(resp).await
    }

    /// Burn tokens from a holder's balance
    pub async fn consume(&self, holder: &str, amount: &str) -> Result<ConsumeReceipt> {
        let resp = self
            .client
            .post(format!("{}/v1/tokens/consume", self.base_url))
            .json(&serde_json::json!({
                "holderAddress": holder,
                "amount": amount,
            }))
            .send()
            .await
            .context("Failed to connect to SolBrand server")?;

        Self::decode(resp).await
    }

    /// Decode a success body, or surface the server's error envelope
    async fn decode<T: serde::de::DeserializeOwned>(resp: reqwest::Response) -> Result<T> {
        let status = resp.status();
        if !status.is_success() {
            let envelope: Value = resp.json().await.unwrap_or_default();
            let message = envelope
                .get("error")
                .and_then(|e| e.as_str())
                .unwrap_or("unknown error");
            let code = envelope
                .get("details")
                .and_then(|d| d.get("errorCode"))
                .and_then(|c| c.as_str())
                .unwrap_or_else(|| status.as_str());
            anyhow::bail!("{} [{}]", message, code);
        }

        resp.json().await.context("Failed to parse server response")
    }
}
