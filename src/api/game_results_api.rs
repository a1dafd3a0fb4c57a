use crate::models::{Game, GameLines, Line, SeasonType};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::info;

const BASE_URL: &str = "https://api.collegefootballdata.com";

/// A game with its betting lines, as returned by `/lines`
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct BettingGame {
    pub id: i64,
    pub season: i32,
    pub season_type: SeasonType,
    pub week: i32,
    pub start_date: DateTime<Utc>,
    pub home_team: String,
    pub home_conference: Option<String>,
    pub home_score: Option<i32>,
    pub away_team: String,
    pub away_conference: Option<String>,
    pub away_score: Option<i32>,
    #[serde(default)]
    pub lines: Vec<GameLine>,
}

/// One provider's line in a `/lines` response. Spread is home-team perspective.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct GameLine {
    pub provider: String,
    pub spread: Option<f64>,
    pub formatted_spread: Option<String>,
    pub spread_open: Option<f64>,
    pub over_under: Option<f64>,
    pub over_under_open: Option<f64>,
    pub home_moneyline: Option<i32>,
    pub away_moneyline: Option<i32>,
}

impl From<BettingGame> for GameLines {
    fn from(api_game: BettingGame) -> Self {
        let game = Game {
            id: api_game.id,
            season: api_game.season,
            week: api_game.week,
            season_type: api_game.season_type,
            start_date: api_game.start_date,
            home_team: api_game.home_team,
            away_team: api_game.away_team,
            home_score: api_game.home_score,
            away_score: api_game.away_score,
        };

        let lines = api_game
            .lines
            .into_iter()
            .map(|line| Line {
                provider: line.provider,
                spread: line.spread,
                over_under: line.over_under,
                home_moneyline: line.home_moneyline,
                away_moneyline: line.away_moneyline,
                spread_open: line.spread_open,
                over_under_open: line.over_under_open,
            })
            .collect();

        GameLines { game, lines }
    }
}

pub struct GameResultsApiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GameResultsApiClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, BASE_URL)
    }

    pub fn with_base_url(api_key: String, base_url: &str) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Fetch a team's games and betting lines for one season segment
    pub async fn fetch_team_lines(
        &self,
        year: i32,
        team: &str,
        season_type: SeasonType,
    ) -> Result<Vec<GameLines>> {
        let games = self
            .fetch_lines(&[
                ("year", year.to_string()),
                ("team", team.to_string()),
                ("seasonType", season_type.to_string()),
            ])
            .await?;
        info!(team, year, %season_type, games = games.len(), "fetched team lines");
        Ok(games)
    }

    /// Fetch every game and its betting lines for one week
    pub async fn fetch_week_lines(
        &self,
        year: i32,
        week: i32,
        season_type: SeasonType,
    ) -> Result<Vec<GameLines>> {
        let games = self
            .fetch_lines(&[
                ("year", year.to_string()),
                ("week", week.to_string()),
                ("seasonType", season_type.to_string()),
            ])
            .await?;
        info!(year, week, %season_type, games = games.len(), "fetched week lines");
        Ok(games)
    }

    async fn fetch_lines(&self, query: &[(&str, String)]) -> Result<Vec<GameLines>> {
        let url = format!("{}/lines", self.base_url);

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .query(query)
            .send()
            .await
            .context("Failed to fetch lines from CollegeFootballData")?;

        if !response.status().is_success() {
            anyhow::bail!("CollegeFootballData returned error: {}", response.status());
        }

        let games: Vec<BettingGame> = response
            .json()
            .await
            .context("Failed to parse CollegeFootballData lines response")?;

        Ok(games.into_iter().map(GameLines::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINES_JSON: &str = r#"[
      {
        "id": 401628319,
        "season": 2024,
        "seasonType": "regular",
        "week": 1,
        "startDate": "2024-08-31T16:00:00.000Z",
        "homeTeam": "Ohio State",
        "homeConference": "Big Ten",
        "homeClassification": "fbs",
        "homeScore": 52,
        "awayTeam": "Akron",
        "awayConference": "Mid-American",
        "awayClassification": "fbs",
        "awayScore": 6,
        "lines": [
          {
            "provider": "ESPN Bet",
            "spread": -48.5,
            "formattedSpread": "Ohio State -48.5",
            "spreadOpen": -49.5,
            "overUnder": 60.5,
            "overUnderOpen": 61,
            "homeMoneyline": null,
            "awayMoneyline": null
          }
        ]
      },
      {
        "id": 401628400,
        "season": 2024,
        "seasonType": "postseason",
        "week": 1,
        "startDate": "2024-12-21T20:00:00.000Z",
        "homeTeam": "Ohio State",
        "homeConference": "Big Ten",
        "homeScore": null,
        "awayTeam": "Tennessee",
        "awayConference": "SEC",
        "awayScore": null
      }
    ]"#;

    #[test]
    fn test_parse_lines_response() {
        let games: Vec<BettingGame> = serde_json::from_str(LINES_JSON).unwrap();
        let games: Vec<GameLines> = games.into_iter().map(GameLines::from).collect();
        assert_eq!(games.len(), 2);

        let first = &games[0];
        assert_eq!(first.game.final_score(), Some((52, 6)));
        assert_eq!(first.game.season_type, SeasonType::Regular);
        assert_eq!(first.lines[0].spread, Some(-48.5));
        assert_eq!(first.lines[0].spread_movement(), Some(1.0));
        assert_eq!(first.lines[0].over_under_open, Some(61.0));

        let second = &games[1];
        assert_eq!(second.game.season_type, SeasonType::Postseason);
        assert!(!second.game.is_completed());
        assert!(second.lines.is_empty());
    }

    #[tokio::test]
    #[ignore]
    async fn test_fetch_team_lines() {
        dotenv::dotenv().ok();
        let api_key = std::env::var("CFBD_API_KEY").expect("CFBD_API_KEY not set");
        let client = GameResultsApiClient::new(api_key);
        let games = client
            .fetch_team_lines(2024, "Ohio State", SeasonType::Regular)
            .await
            .unwrap();
        assert!(!games.is_empty());
    }
}
