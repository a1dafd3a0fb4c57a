use crate::config::{EngineConfig, SpreadTiers};
use crate::error::AtsError;
use crate::models::{GameLines, SeasonType, TeamSide};
use crate::utils::ats::{classify_game, classify_total, AtsOutcome, TotalOutcome};
use crate::utils::line_selection::ProviderPolicy;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Win/loss/push tally
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub wins: u32,
    pub losses: u32,
    pub pushes: u32,
}

impl Record {
    pub fn add(&mut self, outcome: AtsOutcome) {
        match outcome {
            AtsOutcome::Win => self.wins += 1,
            AtsOutcome::Loss => self.losses += 1,
            AtsOutcome::Push => self.pushes += 1,
        }
    }

    pub fn decided(&self) -> u32 {
        self.wins + self.losses
    }

    pub fn total(&self) -> u32 {
        self.wins + self.losses + self.pushes
    }

    /// Wins over decided games, as a percentage. Pushes are left out; 0 when nothing was decided.
    pub fn win_percentage(&self) -> f64 {
        match self.decided() {
            0 => 0.0,
            decided => self.wins as f64 / decided as f64 * 100.0,
        }
    }

    pub fn format(&self) -> String {
        format!(
            "{}-{}-{} ({:.1}%)",
            self.wins,
            self.losses,
            self.pushes,
            self.win_percentage()
        )
    }
}

/// Size bucket of a spread
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SpreadTier {
    Small,
    Medium,
    Large,
}

impl SpreadTier {
    pub fn of(spread: f64, tiers: &SpreadTiers) -> Self {
        let size = spread.abs();
        if size <= tiers.small_max {
            SpreadTier::Small
        } else if size <= tiers.medium_max {
            SpreadTier::Medium
        } else {
            SpreadTier::Large
        }
    }
}

/// Favorite status from the team's adjusted spread. A pick'em (0) counts as favorite.
pub fn is_favorite(adjusted_spread: f64) -> bool {
    adjusted_spread <= 0.0
}

/// Records split by location, favorite status and spread size.
/// Every scored game lands in exactly one bucket of each dimension.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SituationalBreakdown {
    pub home: Record,
    pub away: Record,
    pub favorite: Record,
    pub underdog: Record,
    pub small_spread: Record,
    pub medium_spread: Record,
    pub large_spread: Record,
}

impl SituationalBreakdown {
    fn add(&mut self, side: TeamSide, adjusted_spread: f64, tier: SpreadTier, outcome: AtsOutcome) {
        match side {
            TeamSide::Home => self.home.add(outcome),
            TeamSide::Away => self.away.add(outcome),
        }
        if is_favorite(adjusted_spread) {
            self.favorite.add(outcome);
        } else {
            self.underdog.add(outcome);
        }
        match tier {
            SpreadTier::Small => self.small_spread.add(outcome),
            SpreadTier::Medium => self.medium_spread.add(outcome),
            SpreadTier::Large => self.large_spread.add(outcome),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotalsRecord {
    pub overs: u32,
    pub unders: u32,
    pub pushes: u32,
}

impl TotalsRecord {
    fn add(&mut self, outcome: TotalOutcome) {
        match outcome {
            TotalOutcome::Over => self.overs += 1,
            TotalOutcome::Under => self.unders += 1,
            TotalOutcome::Push => self.pushes += 1,
        }
    }

    pub fn format(&self) -> String {
        format!("O {} / U {} / P {}", self.overs, self.unders, self.pushes)
    }
}

/// Input games that could not be scored, by reason
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataQuality {
    /// Game has no lines at all
    pub missing_lines: u32,
    /// Game has lines but none carries a usable spread
    pub missing_spread: u32,
    /// Only one of the two scores is present
    pub incomplete_scores: u32,
    /// Named team is neither home nor away
    pub team_not_in_game: u32,
    /// Not played yet (no scores). Skipped, not a defect.
    pub not_played: u32,
    /// Outside the requested season segment. Skipped, not a defect.
    pub out_of_segment: u32,
    /// Scored ATS but no over/under was posted on the selected line
    pub missing_total: u32,
}

impl DataQuality {
    /// Games in the requested segment that could not be scored because of bad or missing data
    pub fn invalid_games(&self) -> u32 {
        self.missing_lines + self.missing_spread + self.incomplete_scores + self.team_not_in_game
    }

    pub fn format(&self) -> String {
        format!(
            "{} invalid (no lines: {}, no spread: {}, partial score: {}, team not in game: {}); skipped: {} unplayed, {} out of segment",
            self.invalid_games(),
            self.missing_lines,
            self.missing_spread,
            self.incomplete_scores,
            self.team_not_in_game,
            self.not_played,
            self.out_of_segment
        )
    }
}

/// One scored game in a season report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameAtsRecord {
    pub game_id: i64,
    pub season: i32,
    pub week: i32,
    pub season_type: SeasonType,
    pub start_date: DateTime<Utc>,
    pub team: String,
    pub opponent: String,
    pub side: TeamSide,
    pub provider: String,
    pub adjusted_spread: f64,
    pub team_score: i32,
    pub opponent_score: i32,
    pub ats_margin: f64,
    pub outcome: AtsOutcome,
    pub roi_delta: f64,
    pub total_outcome: Option<TotalOutcome>,
}

impl GameAtsRecord {
    pub fn format(&self) -> String {
        let location = match self.side {
            TeamSide::Home => "vs",
            TeamSide::Away => "@",
        };
        format!(
            "Week {:>2} | {} {} | {}-{} | {:+.1} ({}) | ATS {:+.1} | {}",
            self.week,
            location,
            self.opponent,
            self.team_score,
            self.opponent_score,
            self.adjusted_spread,
            self.provider,
            self.ats_margin,
            self.outcome
        )
    }
}

/// ATS summary of one team over a set of games
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonReport {
    pub team: String,
    /// `None` means segments were deliberately combined
    pub season_type: Option<SeasonType>,
    pub record: Record,
    pub win_percentage: f64,
    pub roi_percentage: f64,
    pub total_profit: f64,
    pub situational: SituationalBreakdown,
    pub totals: TotalsRecord,
    pub data_quality: DataQuality,
    pub games: Vec<GameAtsRecord>,
}

impl SeasonReport {
    pub fn total_games(&self) -> u32 {
        self.record.total()
    }
}

/// Reduces a team's games to an ATS record and situational splits
#[derive(Debug, Clone)]
pub struct SeasonAggregator {
    config: EngineConfig,
    policy: ProviderPolicy,
}

impl SeasonAggregator {
    pub fn new(config: EngineConfig) -> Result<Self, AtsError> {
        config.validate()?;
        let policy = ProviderPolicy::from_config(&config);
        Ok(Self { config, policy })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Aggregate `team`'s games. With `segment` set, games from other
    /// segments are skipped and counted in `out_of_segment`.
    pub fn aggregate(
        &self,
        team: &str,
        games: &[GameLines],
        segment: Option<SeasonType>,
    ) -> SeasonReport {
        let mut record = Record::default();
        let mut situational = SituationalBreakdown::default();
        let mut totals = TotalsRecord::default();
        let mut data_quality = DataQuality::default();
        let mut scored = Vec::new();

        for GameLines { game, lines } in games {
            if segment.is_some_and(|s| s != game.season_type) {
                data_quality.out_of_segment += 1;
                continue;
            }

            let Some(side) = game.side_of(team) else {
                debug!(game_id = game.id, team, "team does not play in game");
                data_quality.team_not_in_game += 1;
                continue;
            };

            let (team_score, opponent_score) = match (game.home_score, game.away_score) {
                (Some(home), Some(away)) if side.is_home() => (home, away),
                (Some(home), Some(away)) => (away, home),
                (None, None) => {
                    data_quality.not_played += 1;
                    continue;
                }
                _ => {
                    debug!(game_id = game.id, "game has only one score");
                    data_quality.incomplete_scores += 1;
                    continue;
                }
            };

            if lines.is_empty() {
                debug!(game_id = game.id, "game has no lines");
                data_quality.missing_lines += 1;
                continue;
            }

            let Some(line) = self.policy.select_spread_line(lines) else {
                debug!(game_id = game.id, "no line with a spread");
                data_quality.missing_spread += 1;
                continue;
            };

            let result = match classify_game(game, line, side, &self.config) {
                Ok(result) => result,
                Err(e) => {
                    debug!(game_id = game.id, error = %e, "could not classify game");
                    data_quality.missing_spread += 1;
                    continue;
                }
            };

            let total_outcome = match classify_total(game, line, &self.config) {
                Ok(total) => {
                    totals.add(total.outcome);
                    Some(total.outcome)
                }
                Err(_) => {
                    data_quality.missing_total += 1;
                    None
                }
            };

            record.add(result.outcome);
            situational.add(
                side,
                result.adjusted_spread,
                SpreadTier::of(result.adjusted_spread, &self.config.spread_tiers),
                result.outcome,
            );

            scored.push(GameAtsRecord {
                game_id: game.id,
                season: game.season,
                week: game.week,
                season_type: game.season_type,
                start_date: game.start_date,
                team: game.team(side).to_string(),
                opponent: game.team(side.flip()).to_string(),
                side,
                provider: line.provider.clone(),
                adjusted_spread: result.adjusted_spread,
                team_score,
                opponent_score,
                ats_margin: result.ats_margin,
                outcome: result.outcome,
                roi_delta: result.roi_delta,
                total_outcome,
            });
        }

        scored.sort_by(|a, b| {
            a.start_date
                .cmp(&b.start_date)
                .then_with(|| a.game_id.cmp(&b.game_id))
        });

        // Profit from the tallies so the result does not depend on input order
        let total_profit = record.wins as f64 * self.config.win_payout()
            - record.losses as f64 * self.config.stake;
        let roi_percentage = match record.total() {
            0 => 0.0,
            n => total_profit / (n as f64 * self.config.stake) * 100.0,
        };

        if data_quality.invalid_games() > 0 {
            warn!(
                team,
                invalid_games = data_quality.invalid_games(),
                "excluded games with unusable data from ATS report"
            );
        }

        SeasonReport {
            team: team.to_string(),
            season_type: segment,
            record,
            win_percentage: record.win_percentage(),
            roi_percentage,
            total_profit,
            situational,
            totals,
            data_quality,
            games: scored,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Game, Line};
    use approx::assert_relative_eq;
    use chrono::TimeZone;

    const TEAM: &str = "Ohio State";

    fn line(provider: &str, spread: Option<f64>, over_under: Option<f64>) -> Line {
        Line {
            provider: provider.to_string(),
            spread,
            over_under,
            home_moneyline: None,
            away_moneyline: None,
            spread_open: None,
            over_under_open: None,
        }
    }

    fn game_lines(
        id: i64,
        week: i32,
        home: &str,
        away: &str,
        scores: (Option<i32>, Option<i32>),
        lines: Vec<Line>,
    ) -> GameLines {
        GameLines {
            game: Game {
                id,
                season: 2024,
                week,
                season_type: SeasonType::Regular,
                start_date: Utc.with_ymd_and_hms(2024, 8, 31, 16, 0, 0).unwrap()
                    + chrono::Duration::weeks(week as i64),
                home_team: home.to_string(),
                away_team: away.to_string(),
                home_score: scores.0,
                away_score: scores.1,
            },
            lines,
        }
    }

    fn season() -> Vec<GameLines> {
        vec![
            // Home -48.5, won by 46: LOSS, favorite, large
            game_lines(
                1,
                1,
                TEAM,
                "Akron",
                (Some(52), Some(6)),
                vec![line("ESPN Bet", Some(-48.5), Some(60.5))],
            ),
            // Away at MSU +23.5 (OSU -23.5), won by 31: WIN, favorite, large
            game_lines(
                2,
                2,
                "Michigan State",
                TEAM,
                (Some(7), Some(38)),
                vec![line("DraftKings", Some(23.5), Some(50.5))],
            ),
            // Away at Oregon -3.5 (OSU +3.5), lost by 1: WIN, underdog, small
            game_lines(
                3,
                3,
                "Oregon",
                TEAM,
                (Some(32), Some(31)),
                vec![line("Bovada", Some(-3.5), None)],
            ),
            // Home -10, won by 10: PUSH, favorite, medium
            game_lines(
                4,
                4,
                TEAM,
                "Penn State",
                (Some(20), Some(10)),
                vec![line("consensus", Some(-10.0), Some(30.0))],
            ),
        ]
    }

    fn aggregator() -> SeasonAggregator {
        SeasonAggregator::new(EngineConfig::default()).unwrap()
    }

    #[test]
    fn test_overall_record_and_roi() {
        let report = aggregator().aggregate(TEAM, &season(), Some(SeasonType::Regular));
        assert_eq!(report.record, Record { wins: 2, losses: 1, pushes: 1 });
        assert_eq!(report.total_games(), 4);
        assert_relative_eq!(report.win_percentage, 2.0 / 3.0 * 100.0, epsilon = 1e-9);

        let profit = 2.0 * 100.0 * 100.0 / 110.0 - 100.0;
        assert_relative_eq!(report.total_profit, profit, epsilon = 1e-9);
        assert_relative_eq!(report.roi_percentage, profit / 400.0 * 100.0, epsilon = 1e-9);
        assert_eq!(report.data_quality.invalid_games(), 0);
    }

    #[test]
    fn test_situational_buckets() {
        let report = aggregator().aggregate(TEAM, &season(), None);
        let s = report.situational;
        assert_eq!(s.home, Record { wins: 0, losses: 1, pushes: 1 });
        assert_eq!(s.away, Record { wins: 2, losses: 0, pushes: 0 });
        assert_eq!(s.favorite, Record { wins: 1, losses: 1, pushes: 1 });
        assert_eq!(s.underdog, Record { wins: 1, losses: 0, pushes: 0 });
        assert_eq!(s.small_spread, Record { wins: 1, losses: 0, pushes: 0 });
        assert_eq!(s.medium_spread, Record { wins: 0, losses: 0, pushes: 1 });
        assert_eq!(s.large_spread, Record { wins: 1, losses: 1, pushes: 0 });

        // Each dimension partitions the same games
        for total in [
            s.home.total() + s.away.total(),
            s.favorite.total() + s.underdog.total(),
            s.small_spread.total() + s.medium_spread.total() + s.large_spread.total(),
        ] {
            assert_eq!(total, report.total_games());
        }
    }

    #[test]
    fn test_totals_record() {
        let report = aggregator().aggregate(TEAM, &season(), None);
        assert_eq!(report.totals, TotalsRecord { overs: 0, unders: 2, pushes: 1 });
        assert_eq!(report.data_quality.missing_total, 1);
    }

    #[test]
    fn test_aggregation_is_order_independent() {
        let forward = aggregator().aggregate(TEAM, &season(), None);
        let mut games = season();
        games.reverse();
        games.swap(0, 2);
        let shuffled = aggregator().aggregate(TEAM, &games, None);
        assert_eq!(forward, shuffled);
        assert_eq!(forward.games[0].game_id, 1);
    }

    #[test]
    fn test_unusable_games_are_counted_not_scored() {
        let mut games = season();
        games.push(game_lines(5, 5, TEAM, "Purdue", (Some(45), Some(0)), vec![]));
        games.push(game_lines(
            6,
            6,
            TEAM,
            "Iowa",
            (Some(35), Some(7)),
            vec![line("ESPN Bet", None, Some(44.5))],
        ));
        games.push(game_lines(
            7,
            7,
            "Nebraska",
            TEAM,
            (Some(17), None),
            vec![line("ESPN Bet", Some(20.5), None)],
        ));
        games.push(game_lines(
            8,
            8,
            "Michigan",
            "Minnesota",
            (Some(24), Some(17)),
            vec![line("ESPN Bet", Some(-3.0), None)],
        ));
        games.push(game_lines(
            9,
            9,
            TEAM,
            "Indiana",
            (None, None),
            vec![line("ESPN Bet", Some(-12.5), None)],
        ));

        let report = aggregator().aggregate(TEAM, &games, Some(SeasonType::Regular));
        let dq = report.data_quality;
        assert_eq!(dq.missing_lines, 1);
        assert_eq!(dq.missing_spread, 1);
        assert_eq!(dq.incomplete_scores, 1);
        assert_eq!(dq.team_not_in_game, 1);
        assert_eq!(dq.not_played, 1);
        assert_eq!(dq.invalid_games(), 4);

        // Scored games are untouched by the bad ones
        assert_eq!(report.record, Record { wins: 2, losses: 1, pushes: 1 });
        assert_eq!(report.games.len(), 4);
    }

    #[test]
    fn test_segment_filter_skips_other_segments() {
        let mut games = season();
        let mut bowl = game_lines(
            10,
            1,
            TEAM,
            "Texas",
            (Some(28), Some(14)),
            vec![line("ESPN Bet", Some(-6.5), None)],
        );
        bowl.game.season_type = SeasonType::Postseason;
        games.push(bowl);

        let regular = aggregator().aggregate(TEAM, &games, Some(SeasonType::Regular));
        assert_eq!(regular.total_games(), 4);
        assert_eq!(regular.data_quality.out_of_segment, 1);
        assert_eq!(regular.data_quality.invalid_games(), 0);

        let post = aggregator().aggregate(TEAM, &games, Some(SeasonType::Postseason));
        assert_eq!(post.record, Record { wins: 1, losses: 0, pushes: 0 });
        assert_eq!(post.data_quality.out_of_segment, 4);

        let all = aggregator().aggregate(TEAM, &games, None);
        assert_eq!(all.total_games(), 5);
    }

    #[test]
    fn test_provider_priority_picks_the_line() {
        let games = vec![game_lines(
            1,
            1,
            TEAM,
            "Akron",
            (Some(52), Some(6)),
            vec![line("Bovada", Some(-44.5), None), line("ESPN Bet", Some(-48.5), None)],
        )];
        let report = aggregator().aggregate(TEAM, &games, None);
        assert_eq!(report.games[0].provider, "ESPN Bet");
        assert_eq!(report.games[0].outcome, AtsOutcome::Loss);

        let config = EngineConfig {
            provider_priority: vec!["Bovada".to_string()],
            ..EngineConfig::default()
        };
        let report = SeasonAggregator::new(config).unwrap().aggregate(TEAM, &games, None);
        assert_eq!(report.games[0].provider, "Bovada");
        assert_eq!(report.games[0].outcome, AtsOutcome::Win);
    }

    #[test]
    fn test_spread_tier_boundaries() {
        let tiers = SpreadTiers::default();
        assert_eq!(SpreadTier::of(-7.0, &tiers), SpreadTier::Small);
        assert_eq!(SpreadTier::of(7.5, &tiers), SpreadTier::Medium);
        assert_eq!(SpreadTier::of(-14.0, &tiers), SpreadTier::Medium);
        assert_eq!(SpreadTier::of(14.5, &tiers), SpreadTier::Large);
        assert_eq!(SpreadTier::of(0.0, &tiers), SpreadTier::Small);

        let narrow = SpreadTiers { small_max: 3.0, medium_max: 10.0 };
        assert_eq!(SpreadTier::of(7.0, &narrow), SpreadTier::Medium);
        assert_eq!(SpreadTier::of(10.5, &narrow), SpreadTier::Large);
    }

    #[test]
    fn test_pickem_counts_as_favorite() {
        assert!(is_favorite(0.0));
        assert!(is_favorite(-0.5));
        assert!(!is_favorite(0.5));
    }

    #[test]
    fn test_empty_input() {
        let report = aggregator().aggregate(TEAM, &[], None);
        assert_eq!(report.total_games(), 0);
        assert_eq!(report.win_percentage, 0.0);
        assert_eq!(report.roi_percentage, 0.0);
        assert_eq!(report.total_profit, 0.0);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = EngineConfig {
            push_threshold: f64::NAN,
            ..EngineConfig::default()
        };
        assert!(SeasonAggregator::new(config).is_err());
    }
}
