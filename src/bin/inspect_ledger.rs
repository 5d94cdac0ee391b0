use clap::Parser;
use rocket_casino::ledger::{LedgerStore, RankField};
use rocket_casino::JsonLedger;
use std::path::PathBuf;

/// Print a summary of a ledger file
#[derive(Parser)]
#[command(name = "inspect_ledger")]
struct Args {
    /// Ledger file to inspect
    #[arg(default_value = "data.json")]
    path: PathBuf,

    /// Accounts to list per ranking
    #[arg(short, long, default_value_t = 10)]
    top: usize,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    if !args.path.exists() {
        println!("❌ No ledger found at {}", args.path.display());
        return Ok(());
    }

    let ledger = JsonLedger::open(&args.path, 0).await?;
    let document = ledger.snapshot().await;
    let stats = document.global_stats;

    println!("🔍 Ledger Inspector");
    println!("===================");
    println!("File: {}", args.path.display());
    println!("Accounts: {}", document.users.len());
    println!("Other sections: {}", document.extra.keys().cloned().collect::<Vec<_>>().join(", "));
    println!();

    println!("📊 Global Stats:");
    println!("   Total bets: {}", stats.total_bets);
    println!("   Cash won:   {}", stats.total_cash_won);
    println!("   Cash lost:  {}", stats.total_cash_lost);
    println!();

    let circulating: i128 = document.users.values().map(|a| a.cash as i128).sum();
    println!("💰 Cash in circulation: {}", circulating);
    println!();

    for field in [RankField::Cash, RankField::Level, RankField::Profit] {
        println!("🏆 Top {} by {}:", args.top, field);
        let ranked = ledger.rank_accounts(field, args.top).await?;
        if ranked.is_empty() {
            println!("   (no accounts)");
        }
        for (i, (user_id, account)) in ranked.iter().enumerate() {
            println!(
                "   {:>2}. {:<20} {:>12}  (level {}, {}W/{}L)",
                i + 1,
                user_id,
                field.key(account),
                account.level,
                account.wins,
                account.losses
            );
        }
        println!();
    }

    let overdrawn: Vec<_> = document.users.iter().filter(|(_, a)| a.cash < 0).collect();
    if overdrawn.is_empty() {
        println!("✓ No negative balances");
    } else {
        println!("⚠️  {} account(s) with negative balance:", overdrawn.len());
        for (user_id, account) in overdrawn {
            println!("   {} {}", user_id, account.cash);
        }
    }

    Ok(())
}
