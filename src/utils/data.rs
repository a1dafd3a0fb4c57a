use crate::utils::arbitrage::GameArbitrage;
use crate::utils::season::GameAtsRecord;
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

/// Save any serializable data to a JSON cache file, creating its directory
pub fn save_to_cache<T: Serialize + ?Sized>(data: &T, cache_file: &str) -> Result<()> {
    if let Some(dir) = Path::new(cache_file).parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create cache directory {}", dir.display()))?;
        }
    }
    let json = serde_json::to_string_pretty(data).context("Failed to serialize cache data")?;
    std::fs::write(cache_file, json).context("Failed to write cache file")?;
    Ok(())
}

/// Load data from a JSON cache file
pub fn load_from_cache<T: DeserializeOwned>(cache_file: &str) -> Result<T> {
    let json = std::fs::read_to_string(cache_file).context("Failed to read cache file")?;
    serde_json::from_str(&json).context("Failed to deserialize cache data")
}

/// Save a per-game ATS log to CSV
pub fn save_game_records_to_csv(records: &[GameAtsRecord], filename: &str) -> Result<()> {
    let mut writer = csv::Writer::from_path(filename).context("Failed to create CSV file")?;

    writer.write_record([
        "Season",
        "Week",
        "Segment",
        "Date",
        "Team",
        "Opponent",
        "Location",
        "Provider",
        "Spread",
        "Score",
        "ATS Margin",
        "Result",
        "Profit",
        "Total",
    ])?;

    for record in records {
        let location = if record.side.is_home() { "home" } else { "away" };
        let total = record
            .total_outcome
            .map(|t| format!("{:?}", t).to_uppercase())
            .unwrap_or_default();
        writer.write_record([
            record.season.to_string(),
            record.week.to_string(),
            record.season_type.to_string(),
            record.start_date.format("%Y-%m-%d").to_string(),
            record.team.clone(),
            record.opponent.clone(),
            location.to_string(),
            record.provider.clone(),
            format!("{:+.1}", record.adjusted_spread),
            format!("{}-{}", record.team_score, record.opponent_score),
            format!("{:+.1}", record.ats_margin),
            record.outcome.to_string(),
            format!("{:.2}", record.roi_delta),
            total,
        ])?;
    }

    writer.flush().context("Failed to flush CSV file")?;
    Ok(())
}

/// Save moneyline arbitrage opportunities to CSV
pub fn save_arbitrage_to_csv(arbs: &[GameArbitrage], filename: &str) -> Result<()> {
    let mut writer = csv::Writer::from_path(filename).context("Failed to create CSV file")?;

    writer.write_record([
        "Home Team",
        "Away Team",
        "Home Provider",
        "Home Odds",
        "Home Stake (%)",
        "Away Provider",
        "Away Odds",
        "Away Stake (%)",
        "Profit (%)",
    ])?;

    for arb in arbs {
        writer.write_record([
            arb.home_team.clone(),
            arb.away_team.clone(),
            arb.home.provider.clone(),
            format!("{:+}", arb.home.odds),
            format!("{:.2}", arb.home.stake_percentage),
            arb.away.provider.clone(),
            format!("{:+}", arb.away.odds),
            format!("{:.2}", arb.away.stake_percentage),
            format!("{:.2}", arb.profit_percentage),
        ])?;
    }

    writer.flush().context("Failed to flush CSV file")?;
    Ok(())
}
