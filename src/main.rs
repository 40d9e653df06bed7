use chrono::Local;
use lunch_ledger::{
    config::settings::load_app_configuration,
    core::{
        ledger::DateRange,
        mutation::Mutation,
        report::{format_amount, format_signed_amount, receivables, total_spent},
        sample::SampleMode,
    },
    errors::Result,
    session::{
        LedgerSession,
        auth::{AuthGate, Identity},
        channel::SyncHub,
    },
};
use std::{env, sync::Arc};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load configuration (.env, config.toml, environment overrides)
    let config = load_app_configuration()
        .inspect_err(|e| error!("Failed to load configuration: {}", e))?;
    info!("Using group '{}'", config.group_id);

    // 3. Sign in if a user was given; reads work without one
    let gate = Arc::new(AuthGate::new());
    if let Ok(user) = env::var("LEDGER_USER") {
        gate.sign_in(Identity::new(user));
    }

    // 4. Open the session on the local cache
    let hub = SyncHub::new();
    let mut session = LedgerSession::connect(&config, gate, &hub)
        .await
        .inspect_err(|e| error!("Failed to open ledger: {}", e))?;

    if env::args().any(|arg| arg == "--sample") {
        let report = session
            .dispatch(Mutation::LoadSampleData {
                mode: SampleMode::Full,
            })
            .await?;
        for failure in &report.failures {
            warn!("Sample data loaded with a sync failure: {}", failure);
        }
    }

    // 5. Print the month-to-date summary
    let range = DateRange::month_to_date(Local::now().date_naive());
    let snapshot = session.current();
    println!(
        "{} - {}: {} spent",
        range.start,
        range.end,
        format_amount(total_spent(&snapshot.records, range))
    );
    for balance in session.balances(range).balances {
        println!("  {:<12} {}", balance.name, format_signed_amount(balance.net));
        for owed in receivables(&snapshot.records, range, &balance.name) {
            println!(
                "    {} {}: {} from {}",
                owed.date,
                owed.title,
                format_amount(owed.amount),
                owed.unpaid.join(", ")
            );
        }
    }

    Ok(())
}
