use std::env;

use chrono::{Datelike as _, Local};
use dotenv::dotenv;
use eyre::Context;
use log::info;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    if let Err(err) = dotenv() {
        info!("Failed to load .env file: {}", err);
    }
    pretty_env_logger::init();
    color_eyre::install()?;

    let mongo_url = env::var("MONGO_URL").context("Failed to get MONGO_URL from env")?;
    let storage = storage::Storage::new(&mongo_url)
        .await
        .context("Failed to create storage")?;
    let ledger = ledger::Ledger::new(storage);
    let mut session = ledger.db.start_session().await?;

    let args: Vec<String> = env::args().collect();
    match args.get(1).map(String::as_str) {
        Some("repair-dates") => {
            let report = ledger.repair.repair_package_dates(&mut session).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Some("stats") => {
            let year = args
                .get(2)
                .map(|value| value.parse())
                .transpose()
                .context("Invalid year")?
                .unwrap_or_else(|| Local::now().year());
            let rows = ledger.statistics.monthly(&mut session, year).await?;
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        Some("yearly") => {
            let rows = ledger.statistics.yearly(&mut session).await?;
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        Some("roster") => {
            let roster = ledger.accounting.sorted_roster(&mut session).await?;
            println!("{}", serde_json::to_string_pretty(&roster)?);
        }
        Some("triage") => {
            let board = ledger.accounting.planning(&mut session).await?;
            println!("{}", serde_json::to_string_pretty(&board)?);
        }
        _ => {
            eprintln!("Usage: academy-cli <repair-dates|stats [year]|yearly|roster|triage>");
        }
    }

    Ok(())
}
