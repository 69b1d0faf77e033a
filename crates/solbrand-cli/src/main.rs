//! SolBrand CLI - token operations against a running SolBrand server
//!
//! # Quick Start
//!
//! ```bash
//! # Start the server first (in one terminal)
//! cargo run -p solbrand-server
//!
//! # Then drive the token endpoints
//! solbrand status
//! solbrand mint 9hK2QmXo... 1.5
//! solbrand balance 9hK2QmXo...
//! solbrand consume 9hK2QmXo... 250.5
//! ```

use clap::{Parser, Subcommand};
use colored::*;

mod client;

use client::{OperationStatus, ServerClient};
use solbrand_core::TokenAmount;

const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:3000";

/// SolBrand CLI - mint, burn and inspect SOLB balances over the server API
#[derive(Parser)]
#[command(name = "solbrand")]
#[command(version)]
#[command(about = "Token operations against a running SolBrand server", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// SolBrand server URL
    #[arg(long, global = true, default_value = DEFAULT_SERVER_URL)]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show ledger identity and mint/consume readiness
    Status,

    /// Show a holder's token balance
    Balance {
        /// Holder wallet address
        holder: String,
    },

    /// Purchase tokens for a holder by spending SOL
    Mint {
        /// Holder wallet address
        holder: String,

        /// SOL amount to spend, up to 9 decimal places
        #[arg(value_parser = parse_amount)]
        sol_amount: TokenAmount,

        /// Session key whose activity feed records the purchase
        #[arg(long)]
        session: Option<String>,
    },

    /// Burn tokens from a holder's balance
    Consume {
        /// Holder wallet address
        holder: String,

        /// Token amount to burn, up to 9 decimal places
        #[arg(value_parser = parse_amount)]
        amount: TokenAmount,
    },
}

fn parse_amount(raw: &str) -> Result<TokenAmount, String> {
    TokenAmount::parse_decimal(raw).map_err(|err| err.to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let client = ServerClient::new(&cli.server);

    match cli.command {
        Commands::Status => {
            let mint = client.mint_status().await?;
            let consume = client.consume_status().await?;
            print_status(&cli.server, &mint, &consume);
        }

        Commands::Balance { holder } => {
            let info = client.balance(&holder).await?;
            println!(
                "  {} {}",
                "Holder:".bright_white(),
                info.holder_address.bright_cyan()
            );
            println!(
                "  {} {} {}  ({} units)",
                "Balance:".bright_white(),
                info.balance.bright_green().bold(),
                info.symbol,
                info.balance_in_smallest_units,
            );
            println!("  {} {}", "Fetched:".bright_white(), info.fetched_at);
        }

        Commands::Mint {
            holder,
            sol_amount,
            session,
        } => {
            let receipt = client
                .mint(&holder, &sol_amount.to_string(), session.as_deref())
                .await?;
            println!(
                "  {} {} {} for {} SOL",
                "Minted".bright_green().bold(),
                receipt.token_amount.bright_green(),
                "SOLB",
                receipt.sol_amount,
            );
            println!(
                "  {} {}",
                "Token account:".bright_white(),
                receipt.holder_token_account
            );
            println!("  {} {}", "Signature:".bright_white(), receipt.signature);
            println!(
                "  {} {}",
                "Explorer:".bright_white(),
                receipt.explorer_url.bright_cyan()
            );
        }

        Commands::Consume { holder, amount } => {
            let receipt = client.consume(&holder, &amount.to_string()).await?;
            println!(
                "  {} {} {}  ({} units)",
                "Burned".bright_green().bold(),
                receipt.amount.bright_green(),
                "SOLB",
                receipt.token_amount_in_smallest_units,
            );
            println!(
                "  {} {}",
                "Token account:".bright_white(),
                receipt.holder_token_account
            );
        }
    }

    Ok(())
}

fn print_status(server_url: &str, mint: &OperationStatus, consume: &OperationStatus) {
    println!(
        "{} {}",
        "SolBrand server at".bright_white().bold(),
        server_url.bright_cyan()
    );

    println!(
        "  {} {} ({} decimals)",
        "Token:".bright_white(),
        mint.symbol.bright_green(),
        mint.decimals,
    );
    println!("  {} {}", "Mint address:".bright_white(), mint.mint_address);
    println!("  {} {}", "Authority:".bright_white(), mint.authority);
    println!("  {} {}", "Network:".bright_white(), mint.network);
    if let Some(rate) = mint.exchange_rate {
        println!(
            "  {} {} {} per SOL",
            "Rate:".bright_white(),
            rate,
            mint.symbol,
        );
    }

    println!(
        "  {} {}",
        "Mint:".bright_white(),
        readiness_marker(mint.ready)
    );
    println!(
        "  {} {}",
        "Consume:".bright_white(),
        readiness_marker(consume.ready)
    );
}

fn readiness_marker(ready: bool) -> String {
    if ready {
        format!("{} ready", "●".bright_green())
    } else {
        format!("{} unavailable", "○".yellow())
    }
}
