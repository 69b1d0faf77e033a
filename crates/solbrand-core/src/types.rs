//! Value types shared across the SolBrand crates.
//!
//! Ledger quantities are fixed-point integers in smallest units. Nothing in
//! this module (or anything downstream of it) performs floating-point
//! arithmetic on balances, costs, or exchange amounts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CoreError;

/// Decimal places declared by the SOLB mint
pub const TOKEN_DECIMALS: u32 = 9;

/// Smallest units per whole token (10^TOKEN_DECIMALS)
pub const UNITS_PER_TOKEN: u64 = 1_000_000_000;

/// Token symbol reported by status surfaces
pub const TOKEN_SYMBOL: &str = "SOLB";

/// Token display name
pub const TOKEN_NAME: &str = "SolBrand Token";

/// A token quantity in smallest units (fixed point, 9 decimals).
///
/// The native currency shares the same decimal count, so exchange input
/// amounts use this type as well.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TokenAmount(u64);

impl TokenAmount {
    /// Zero tokens
    pub const ZERO: TokenAmount = TokenAmount(0);

    /// Create an amount from a raw smallest-unit count
    pub fn from_units(units: u64) -> Self {
        TokenAmount(units)
    }

    /// Create an amount from a whole-token count
    pub fn from_whole(tokens: u64) -> Result<Self, CoreError> {
        tokens
            .checked_mul(UNITS_PER_TOKEN)
            .map(TokenAmount)
            .ok_or_else(|| {
                CoreError::InvalidParameters(format!(
                    "token amount overflows smallest units: {}",
                    tokens
                ))
            })
    }

    /// Parse a decimal string ("5", "0.05", ".5") into smallest units.
    ///
    /// Pure integer digit arithmetic. Rejects negative values, exponent
    /// notation, and more than [`TOKEN_DECIMALS`] fractional digits rather
    /// than silently truncating.
    pub fn parse_decimal(input: &str) -> Result<Self, CoreError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(CoreError::InvalidParameters("amount is empty".to_string()));
        }
        if trimmed.starts_with('-') {
            return Err(CoreError::InvalidParameters(format!(
                "amount must be positive: {}",
                trimmed
            )));
        }
        if trimmed.contains(['e', 'E']) {
            return Err(CoreError::InvalidParameters(format!(
                "exponent notation is not accepted: {}",
                trimmed
            )));
        }

        let (int_part, frac_part) = match trimmed.split_once('.') {
            Some((int_part, frac_part)) => (int_part, frac_part),
            None => (trimmed, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(CoreError::InvalidParameters(format!(
                "not a decimal number: {}",
                trimmed
            )));
        }
        if frac_part.len() > TOKEN_DECIMALS as usize {
            return Err(CoreError::InvalidParameters(format!(
                "more than {} decimal places: {}",
                TOKEN_DECIMALS, trimmed
            )));
        }

        let overflow = || {
            CoreError::InvalidParameters(format!("amount overflows smallest units: {}", trimmed))
        };
        let bad_digit =
            || CoreError::InvalidParameters(format!("not a decimal number: {}", trimmed));

        let mut whole: u64 = 0;
        for c in int_part.chars() {
            let digit = c.to_digit(10).ok_or_else(bad_digit)? as u64;
            whole = whole
                .checked_mul(10)
                .and_then(|w| w.checked_add(digit))
                .ok_or_else(overflow)?;
        }

        // Bounded by the length check above, so plain arithmetic is safe here.
        let mut frac: u64 = 0;
        for c in frac_part.chars() {
            let digit = c.to_digit(10).ok_or_else(bad_digit)? as u64;
            frac = frac * 10 + digit;
        }
        frac *= 10u64.pow(TOKEN_DECIMALS - frac_part.len() as u32);

        whole
            .checked_mul(UNITS_PER_TOKEN)
            .and_then(|units| units.checked_add(frac))
            .map(TokenAmount)
            .ok_or_else(overflow)
    }

    /// Raw smallest-unit count
    pub fn units(&self) -> u64 {
        self.0
    }

    /// Checked addition
    pub fn checked_add(&self, other: TokenAmount) -> Option<TokenAmount> {
        self.0.checked_add(other.0).map(TokenAmount)
    }

    /// Checked subtraction
    pub fn checked_sub(&self, other: TokenAmount) -> Option<TokenAmount> {
        self.0.checked_sub(other.0).map(TokenAmount)
    }

    /// True when the amount is zero
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / UNITS_PER_TOKEN;
        let frac = self.0 % UNITS_PER_TOKEN;
        if frac == 0 {
            write!(f, "{}", whole)
        } else {
            let frac_str = format!("{:09}", frac);
            write!(f, "{}.{}", whole, frac_str.trim_end_matches('0'))
        }
    }
}

/// Tokens issued per whole native-currency unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExchangeRate(pub u64);

impl ExchangeRate {
    /// Convert a native-currency amount into the token amount it buys
    pub fn tokens_for_native(&self, native: TokenAmount) -> Result<TokenAmount, CoreError> {
        native
            .units()
            .checked_mul(self.0)
            .map(TokenAmount::from_units)
            .ok_or_else(|| {
                CoreError::InvalidParameters(format!(
                    "exchange result overflows smallest units: {} x {}",
                    native, self.0
                ))
            })
    }
}

impl Default for ExchangeRate {
    fn default() -> Self {
        // 1 SOL buys 1000 SOLB
        ExchangeRate(1000)
    }
}

/// Address of a ledger account holder
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HolderAddress(pub String);

impl HolderAddress {
    /// Reject empty or whitespace-bearing addresses before any network call
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.0.is_empty() {
            return Err(CoreError::InvalidParameters(
                "holder address is empty".to_string(),
            ));
        }
        if self.0.chars().any(char::is_whitespace) {
            return Err(CoreError::InvalidParameters(format!(
                "holder address contains whitespace: {:?}",
                self.0
            )));
        }
        Ok(())
    }
}

impl fmt::Display for HolderAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for HolderAddress {
    fn from(address: &str) -> Self {
        HolderAddress(address.to_string())
    }
}

/// Key identifying one workflow instance.
///
/// Session keys become storage path segments, so the accepted alphabet is
/// alphanumerics plus `-` and `_`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionKey(pub String);

impl SessionKey {
    /// Generate a fresh random session key
    pub fn generate() -> Self {
        SessionKey(uuid::Uuid::new_v4().simple().to_string())
    }

    /// Validate the storage-safe alphabet
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.0.is_empty() {
            return Err(CoreError::InvalidParameters(
                "session key is empty".to_string(),
            ));
        }
        if !self
            .0
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(CoreError::InvalidParameters(format!(
                "session key contains characters outside [A-Za-z0-9_-]: {:?}",
                self.0
            )));
        }
        Ok(())
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SessionKey {
    fn from(key: &str) -> Self {
        SessionKey(key.to_string())
    }
}

/// Cached view of a holder's ledger balance.
///
/// Never authoritative: the real balance lives in the external ledger, and a
/// snapshot is only as fresh as `fetched_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceSnapshot {
    /// Balance in smallest units at fetch time
    pub amount: TokenAmount,
    /// When the oracle produced this snapshot
    pub fetched_at: DateTime<Utc>,
}

impl BalanceSnapshot {
    /// Snapshot taken now with the given amount
    pub fn new(amount: TokenAmount) -> Self {
        BalanceSnapshot {
            amount,
            fetched_at: Utc::now(),
        }
    }

    /// The zero snapshot used when a lookup fails or an account is unfunded
    pub fn zero() -> Self {
        BalanceSnapshot::new(TokenAmount::ZERO)
    }

    /// Necessary-funds check used by step gating
    pub fn covers(&self, cost: TokenAmount) -> bool {
        self.amount >= cost
    }
}
