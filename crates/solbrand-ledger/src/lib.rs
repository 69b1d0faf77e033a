//! SolBrand Ledger
//!
//! Backends implementing the `TokenLedger` port from `solbrand-core`:
//! an in-memory ledger for development and issuance, and a JSON-RPC client
//! that reads live balances from a chain endpoint.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// In-memory ledger backend
pub mod memory;

/// JSON-RPC ledger backend
pub mod rpc;

pub use memory::InMemoryTokenLedger;
pub use rpc::RpcTokenLedger;

/// Explorer link for a ledger transaction.
///
/// Mainnet is the explorer's default cluster; every other network rides in
/// the `cluster` query parameter.
pub fn explorer_transaction_url(signature: &str, network: &str) -> String {
    match network {
        "mainnet" | "mainnet-beta" => format!("https://explorer.solana.com/tx/{signature}"),
        other => format!("https://explorer.solana.com/tx/{signature}?cluster={other}"),
    }
}
