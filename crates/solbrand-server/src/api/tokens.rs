//! Token mint and consume endpoints
//!
//! These handlers wrap the two ledger mutations: minting SOLB against a
//! native-currency amount and consuming (burning) SOLB from a holder. The
//! GET variants report backend readiness without side effects.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info};

use solbrand_core::{CoreError, TokenAmount, TOKEN_DECIMALS, TOKEN_SYMBOL};

use crate::api::errors::api_error_response;
use crate::error::ServerError;
use crate::server::SolBrandServer;

/// Amount accepted as a JSON number or a decimal string.
///
/// Either form goes through the digit-wise decimal parser, so exponent
/// notation and more than nine fractional digits are rejected instead of
/// being rounded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AmountInput {
    /// JSON number form
    Number(serde_json::Number),
    /// Decimal string form
    Text(String),
}

impl AmountInput {
    /// Parse into smallest units
    pub fn to_token_amount(&self) -> Result<TokenAmount, CoreError> {
        match self {
            AmountInput::Number(number) => TokenAmount::parse_decimal(&number.to_string()),
            AmountInput::Text(text) => TokenAmount::parse_decimal(text),
        }
    }
}

/// Request for consuming tokens
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumeTokensRequest {
    /// Holder the tokens are taken from
    pub holder_address: String,
    /// Token amount to consume
    pub amount: AmountInput,
}

/// Response for a successful consume
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumeTokensResponse {
    /// Always true on the success path
    pub success: bool,
    /// Consumed amount as a decimal string
    pub amount: String,
    /// Consumed amount in smallest units
    pub token_amount_in_smallest_units: u64,
    /// Token account the debit was applied to
    pub holder_token_account: String,
    /// Mint the tokens belonged to
    pub mint_address: String,
}

/// Request for minting tokens against a native-currency amount
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MintTokensRequest {
    /// Holder receiving the minted tokens
    pub holder_address: String,
    /// Native currency paid in, converted by the configured exchange rate
    pub sol_amount: AmountInput,
    /// Session whose activity feed records the purchase
    #[serde(default)]
    pub session: Option<String>,
}

/// Response for a successful mint
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MintTokensResponse {
    /// Always true on the success path
    pub success: bool,
    /// Ledger transaction signature of the credit
    pub signature: String,
    /// Native-currency amount paid in, as a decimal string
    pub sol_amount: String,
    /// Token amount minted, as a decimal string
    pub token_amount: String,
    /// Token account the credit landed on
    pub holder_token_account: String,
    /// Mint the tokens belong to
    pub mint_address: String,
    /// Explorer link for the credit transaction
    pub explorer_url: String,
}

/// A holder's balance as reported by the ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceResponse {
    /// The holder
    pub holder_address: String,
    /// Balance as a decimal string
    pub balance: String,
    /// Balance in smallest units
    pub balance_in_smallest_units: u64,
    /// Token symbol
    pub symbol: String,
    /// When the ledger reported this balance
    pub fetched_at: DateTime<Utc>,
}

/// Handler for consuming tokens
pub async fn consume_tokens_handler(
    State(server): State<Arc<SolBrandServer>>,
    Json(request): Json<ConsumeTokensRequest>,
) -> impl IntoResponse {
    info!(holder = %request.holder_address, "Consuming tokens");

    let amount = match request.amount.to_token_amount() {
        Ok(amount) => amount,
        Err(err) => return api_error_response(&ServerError::from(err)),
    };

    match server.consume_tokens(&request.holder_address, amount).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(err) => {
            error!(?err, holder = %request.holder_address, "Failed to consume tokens");
            api_error_response(&err)
        }
    }
}

/// Handler for the consume readiness status
pub async fn consume_status_handler(
    State(server): State<Arc<SolBrandServer>>,
) -> impl IntoResponse {
    let info = server.ledger_info();
    Json(json!({
        "ready": info.debit_ready,
        "operation": "consume",
        "mintAddress": info.mint_address,
        "authority": info.authority,
        "network": info.network,
        "symbol": TOKEN_SYMBOL,
        "decimals": TOKEN_DECIMALS,
    }))
}

/// Handler for minting tokens
pub async fn mint_tokens_handler(
    State(server): State<Arc<SolBrandServer>>,
    Json(request): Json<MintTokensRequest>,
) -> impl IntoResponse {
    info!(holder = %request.holder_address, "Minting tokens");

    let sol_amount = match request.sol_amount.to_token_amount() {
        Ok(amount) => amount,
        Err(err) => return api_error_response(&ServerError::from(err)),
    };

    match server
        .mint_tokens(
            &request.holder_address,
            sol_amount,
            request.session.as_deref(),
        )
        .await
    {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(err) => {
            error!(?err, holder = %request.holder_address, "Failed to mint tokens");
            api_error_response(&err)
        }
    }
}

/// Handler for the mint readiness status
pub async fn mint_status_handler(State(server): State<Arc<SolBrandServer>>) -> impl IntoResponse {
    let info = server.ledger_info();
    Json(json!({
        "ready": info.credit_ready,
        "operation": "mint",
        "mintAddress": info.mint_address,
        "authority": info.authority,
        "network": info.network,
        "symbol": TOKEN_SYMBOL,
        "decimals": TOKEN_DECIMALS,
        "exchangeRate": server.exchange_rate().0,
    }))
}

/// Handler for fetching a holder's balance
pub async fn get_balance_handler(
    State(server): State<Arc<SolBrandServer>>,
    Path(holder): Path<String>,
) -> impl IntoResponse {
    match server.fetch_balance(&holder).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(err) => {
            error!(?err, %holder, "Failed to fetch balance");
            api_error_response(&err)
        }
    }
}
