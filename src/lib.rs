pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod utils;

pub use api::*;
pub use config::*;
pub use error::*;
pub use models::*;
pub use utils::*;

use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;
use utils::arbitrage::{find_moneyline_arbitrage, GameArbitrage};
use utils::data::{load_from_cache, save_to_cache};
use utils::season::{SeasonAggregator, SeasonReport};

const CACHE_DIR: &str = "cache";

fn cache_file(key: &str) -> String {
    let slug: String = key
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    format!("{}/{}.json", CACHE_DIR, slug)
}

/// Fetch a team's games and lines for one segment, from the API or the cache
pub async fn fetch_team_games(
    client: &GameResultsApiClient,
    team: &str,
    year: i32,
    season_type: SeasonType,
    use_cache: bool,
) -> Result<Vec<GameLines>> {
    let cache_file = cache_file(&format!("{}_{}_{}", year, team, season_type));

    if use_cache && Path::new(&cache_file).exists() {
        info!(cache_file = %cache_file, "loading lines from cache");
        return load_from_cache(&cache_file);
    }

    let games = client
        .fetch_team_lines(year, team, season_type)
        .await
        .with_context(|| format!("Failed to fetch {} {} lines for {}", year, season_type, team))?;
    save_to_cache(&games, &cache_file)?;
    Ok(games)
}

/// Build a team's ATS report. With `segment` unset, the regular season and
/// postseason are fetched together and combined.
pub async fn build_season_report(
    client: &GameResultsApiClient,
    aggregator: &SeasonAggregator,
    team: &str,
    year: i32,
    segment: Option<SeasonType>,
    use_cache: bool,
) -> Result<SeasonReport> {
    let games = match segment {
        Some(season_type) => fetch_team_games(client, team, year, season_type, use_cache).await?,
        None => {
            let (mut regular, postseason) = tokio::try_join!(
                fetch_team_games(client, team, year, SeasonType::Regular, use_cache),
                fetch_team_games(client, team, year, SeasonType::Postseason, use_cache),
            )?;
            regular.extend(postseason);
            regular
        }
    };

    Ok(aggregator.aggregate(team, &games, segment))
}

/// Scan one week of lines for moneyline arbitrage
pub async fn find_week_arbitrage(
    client: &GameResultsApiClient,
    year: i32,
    week: i32,
    season_type: SeasonType,
    use_cache: bool,
) -> Result<Vec<GameArbitrage>> {
    let cache_file = cache_file(&format!("{}_week{}_{}", year, week, season_type));

    let games: Vec<GameLines> = if use_cache && Path::new(&cache_file).exists() {
        info!(cache_file = %cache_file, "loading lines from cache");
        load_from_cache(&cache_file)?
    } else {
        let games = client
            .fetch_week_lines(year, week, season_type)
            .await
            .with_context(|| format!("Failed to fetch week {} lines", week))?;
        save_to_cache(&games, &cache_file)?;
        games
    };

    Ok(find_moneyline_arbitrage(&games))
}
