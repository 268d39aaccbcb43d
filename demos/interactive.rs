//! Interactive CLI for the reserves SDK
//!
//! Run with: cargo run --example interactive
//!
//! Uses the injected wallet at WALLET_URL, or a local key when PRIVATE_KEY is set.

use std::io::{self, Write};

use kel_reserves::{
    DepositParams, InjectedWallet, LocalWallet, NetworkConfig, ReservesClient, SequenceOutcome,
    WalletProvider, WithdrawParams,
};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = NetworkConfig::from_env()?;

    match std::env::var("PRIVATE_KEY") {
        Ok(key) => {
            let wallet = LocalWallet::from_private_key(&key, &config.rpc_url)?;
            println!("Using local wallet {}", wallet.address());
            run(ReservesClient::new(wallet, config)?).await
        }
        Err(_) => run(ReservesClient::<InjectedWallet>::connect(config).await?).await,
    }
}

async fn run<W: WalletProvider>(client: ReservesClient<W>) -> eyre::Result<()> {
    println!("\n========================================");
    println!("       KEL Reserves Interactive CLI");
    println!("========================================");
    println!("Registered contracts: {}", client.registry().len());

    loop {
        println!("\n----------------------------------------");
        println!("Select an option:");
        println!("  1. Deposit collateral");
        println!("  2. Withdraw collateral");
        println!("  3. Deposit reserves");
        println!("  4. Withdraw reserves");
        println!("  5. View balances");
        println!("  q. Quit");
        println!("----------------------------------------");

        let choice = prompt("Enter choice: ")?;

        let outcome = match choice.as_str() {
            "1" => client.deposit_collateral(DepositParams::new(read_amount()?)).await,
            "2" => client.withdraw_collateral(WithdrawParams::new(read_amount()?)).await,
            "3" => client.deposit_reserves(DepositParams::new(read_amount()?)).await,
            "4" => client.withdraw_reserves(WithdrawParams::new(read_amount()?)).await,
            "5" => {
                view_balances(&client).await;
                continue;
            }
            "q" | "Q" => {
                println!("\nGoodbye!");
                break;
            }
            _ => {
                println!("\nInvalid choice. Please try again.");
                continue;
            }
        };

        match outcome {
            Ok(outcome) => print_outcome(&outcome),
            Err(err) => println!("Could not start: {}", err),
        }
    }

    Ok(())
}

async fn view_balances<W: WalletProvider>(client: &ReservesClient<W>) {
    println!("\n=== Balances ===");
    match client.snapshot().await {
        Ok(snapshot) => {
            println!("Account:      {}", snapshot.account);
            println!("Collateral:   {:.4}", snapshot.collateral_f64());
            println!("Reserves:     {:.4}", snapshot.reserves_f64());
            println!("Link balance: {:.4}", snapshot.link_balance_f64());
        }
        Err(err) => println!("Failed to load balances: {}", err),
    }
}

fn print_outcome(outcome: &SequenceOutcome) {
    for receipt in outcome.receipts() {
        match receipt.transaction_id {
            Some(tx) => println!("  {} {}", receipt.status, tx),
            None => println!("  {}", receipt.status),
        }
    }
    match outcome {
        SequenceOutcome::Success { .. } => println!("Done."),
        SequenceOutcome::Failed {
            step, method, error, ..
        } => println!("Step {} ({}) failed: {}", step + 1, method, error),
    }
}

fn read_amount() -> eyre::Result<String> {
    let input = prompt("Amount [1]: ")?;
    if input.is_empty() {
        return Ok("1".to_string());
    }
    Ok(input)
}

fn prompt(label: &str) -> eyre::Result<String> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}
