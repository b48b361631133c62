//! Offline maintenance for the leaderboard store.
//!
//! - `profiles`: run the aggregation pipeline and replace stored profiles
//! - `mantle-repos`: search GitHub for Mantle repos and replace the stored set
//! - `top-builders`: print the top ten reward recipients and the payout plan

use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use leaderboard_api::cache;
use leaderboard_api::config::Config;
use leaderboard_api::db::create_pool;
use leaderboard_api::init_tracing;
use leaderboard_api::models::ProfileRow;
use leaderboard_api::pipeline::build_leaderboard;
use leaderboard_api::repos::{run_discovery, POPULATE_PLAN};
use leaderboard_api::rewards::{plan, top_builders, REWARDED_BUILDERS, ZERO_ADDRESS};
use leaderboard_api::state::AppState;
use leaderboard_api::store;

#[derive(Parser)]
#[command(name = "leaderboard-sync", about = "Populate and inspect the leaderboard store")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Rebuild the leaderboard from Talent Protocol and GitHub and replace stored profiles
    Profiles,
    /// Search GitHub for Mantle ecosystem repos and replace the stored set
    MantleRepos,
    /// Print the top ten builder wallets, optionally with a payout plan
    TopBuilders {
        /// Reward pool in wei
        #[arg(long)]
        pool_wei: Option<u128>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;
    init_tracing(&config.rust_log);
    config.log_environment();

    let db = create_pool(&config.database_url).await?;
    let cache = cache::from_url(
        config.redis_url.as_deref(),
        Duration::from_secs(config.cache_ttl_secs),
    )?;
    let state = AppState::new(config, db, cache)?;

    match cli.command {
        Command::Profiles => populate_profiles(&state).await,
        Command::MantleRepos => populate_mantle_repos(&state).await,
        Command::TopBuilders { pool_wei } => print_top_builders(&state, pool_wei).await,
    }
}

async fn populate_profiles(state: &AppState) -> Result<()> {
    let Some(talent) = state.talent.as_ref() else {
        bail!("TALENT_API_KEY is required to rebuild profiles");
    };

    let output = build_leaderboard(talent, &state.github, &state.summarizer).await;
    if output.github_rate_limited {
        println!("Warning: GitHub rate limit reached; some repository data is missing");
    }

    let rows: Vec<ProfileRow> = output.profiles.iter().map(ProfileRow::from_profile).collect();
    let counts = store::replace_profiles(&state.db, &rows)
        .await
        .context("failed to replace stored profiles")?;

    if state.config.redis_url.is_some() {
        state
            .cache
            .put(output.profiles)
            .await
            .context("failed to refresh the profiles cache")?;
    }

    println!(
        "Stored {} of {} profiles ({} errors)",
        counts.synced,
        rows.len(),
        counts.errors
    );
    Ok(())
}

async fn populate_mantle_repos(state: &AppState) -> Result<()> {
    let discovery = run_discovery(&state.github, &POPULATE_PLAN)
        .await
        .context("every GitHub search failed")?;

    println!("Found {} Mantle repos. Top 5:", discovery.found);
    for (i, repo) in discovery.repos.iter().take(5).enumerate() {
        println!("  {}. {} ({} stars)", i + 1, repo.full_name, repo.stargazers_count);
    }

    let counts = store::replace_mantle_repos(&state.db, &discovery.repos)
        .await
        .context("failed to replace stored Mantle repos")?;
    println!(
        "Stored {} repos with {} contributors",
        counts.repos, counts.contributors
    );
    Ok(())
}

async fn print_top_builders(state: &AppState, pool_wei: Option<u128>) -> Result<()> {
    let builders = top_builders(&state.db, state.talent.as_ref(), REWARDED_BUILDERS)
        .await
        .context("failed to read top profiles")?;
    if builders.is_empty() {
        bail!("no stored profiles; run `leaderboard-sync profiles` first");
    }

    println!("{}", "=".repeat(60));
    for b in &builders {
        println!("Rank {}: {} (score {})", b.rank, b.name, b.score);
        println!("   UUID:   {}", b.profile_id);
        println!("   Wallet: {}", b.wallet.as_deref().unwrap_or("NOT FOUND"));
    }
    println!("{}", "=".repeat(60));

    println!("\nTop builder addresses:");
    println!("[");
    for b in &builders {
        match &b.wallet {
            Some(wallet) => println!("  \"{wallet}\", // Rank {}: {} (score: {})", b.rank, b.name, b.score),
            None => println!(
                "  \"{ZERO_ADDRESS}\", // Rank {}: {} - needs a wallet address",
                b.rank, b.name
            ),
        }
    }
    for rank in builders.len() + 1..=REWARDED_BUILDERS {
        println!("  \"{ZERO_ADDRESS}\", // Rank {rank}: empty slot");
    }
    println!("]");

    let missing = builders.iter().filter(|b| b.wallet.is_none()).count();
    if missing > 0 {
        println!("\nWarning: {missing} builder(s) have no valid wallet and will not receive rewards");
    } else {
        println!("\nAll {} builders have valid wallet addresses", builders.len());
    }

    if let Some(pool) = pool_wei {
        let distribution = plan(pool, &builders);
        println!("\nPayout plan for a pool of {pool} wei:");
        for p in &distribution.payouts {
            println!(
                "  {:>2}. {:>5.1}%  {:>24} MNT  {}",
                p.rank,
                p.percentage,
                p.amount,
                p.wallet.as_deref().unwrap_or(ZERO_ADDRESS)
            );
        }
        println!("  Undistributed: {} wei", distribution.undistributed_wei);
    }

    Ok(())
}
