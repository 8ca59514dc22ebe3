// Per-player weekly stat lines and the weekly best-ball snapshot.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::position::{position_list, BestBallSlot, Position};

fn default_true() -> bool {
    true
}

/// One player's accumulated stats for a week on one fantasy roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStatLine {
    pub player_key: String,
    pub full_name: String,
    /// Eligible positions, stored on disk as `"PG,SG"`.
    #[serde(rename = "position", with = "position_list", default)]
    pub positions: Vec<Position>,
    /// Raw category name (PTS, REB, ...) to weekly total.
    #[serde(default)]
    pub raw_stats: BTreeMap<String, f64>,
    #[serde(default)]
    pub fantasy_points: f64,
    #[serde(default)]
    pub best_ball_slot: BestBallSlot,
    /// False for injured-reserve style exclusions; such players never start.
    #[serde(rename = "isEligible", default = "default_true")]
    pub eligible: bool,
}

impl PlayerStatLine {
    pub fn new(player_key: &str, full_name: &str, positions: Vec<Position>) -> Self {
        PlayerStatLine {
            player_key: player_key.to_string(),
            full_name: full_name.to_string(),
            positions,
            raw_stats: BTreeMap::new(),
            fantasy_points: 0.0,
            best_ball_slot: BestBallSlot::Bench,
            eligible: true,
        }
    }

    /// Whether this player counts toward the team's best-ball total.
    pub fn is_starter(&self) -> bool {
        !self.best_ball_slot.is_bench()
    }
}

/// A fantasy team's roster for one week and its best-ball total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamWeekResult {
    pub team_key: String,
    pub manager_name: String,
    #[serde(default)]
    pub total_best_ball_points: f64,
    #[serde(default)]
    pub players: Vec<PlayerStatLine>,
}

impl TeamWeekResult {
    pub fn new(team_key: &str, manager_name: &str) -> Self {
        TeamWeekResult {
            team_key: team_key.to_string(),
            manager_name: manager_name.to_string(),
            total_best_ball_points: 0.0,
            players: Vec::new(),
        }
    }

    /// Sum of fantasy points over every non-bench player, in roster order.
    pub fn starter_points(&self) -> f64 {
        self.players
            .iter()
            .filter(|p| p.is_starter())
            .map(|p| p.fantasy_points)
            .sum()
    }
}

/// The weekly best-ball file: input to the weekly scorer (after merging
/// daily deltas) and, once scored, input to the season aggregator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyBestBallSnapshot {
    pub season: i32,
    pub week: u32,
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    /// Dates whose daily delta has already been folded in.
    #[serde(default)]
    pub processed_dates: BTreeSet<NaiveDate>,
    #[serde(default)]
    pub teams: Vec<TeamWeekResult>,
}

impl WeeklyBestBallSnapshot {
    /// Start a fresh week with every league team present and an empty roster.
    pub fn new(
        season: i32,
        week: u32,
        week_start: NaiveDate,
        week_end: NaiveDate,
        teams: &[(String, String)],
    ) -> Self {
        WeeklyBestBallSnapshot {
            season,
            week,
            week_start,
            week_end,
            processed_dates: BTreeSet::new(),
            teams: teams
                .iter()
                .map(|(key, manager)| TeamWeekResult::new(key, manager))
                .collect(),
        }
    }

    pub fn team(&self, team_key: &str) -> Option<&TeamWeekResult> {
        self.teams.iter().find(|t| t.team_key == team_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn player_json_uses_wire_names() {
        let mut player = PlayerStatLine::new(
            "p1",
            "Point Guard",
            vec![Position::PointGuard, Position::ShootingGuard],
        );
        player.best_ball_slot = BestBallSlot::Util2;
        player.raw_stats.insert("PTS".into(), 20.0);

        let json = serde_json::to_value(&player).unwrap();
        assert_eq!(json["playerKey"], "p1");
        assert_eq!(json["fullName"], "Point Guard");
        assert_eq!(json["position"], "PG,SG");
        assert_eq!(json["bestBallSlot"], "UTIL2");
        assert_eq!(json["isEligible"], true);
        assert_eq!(json["rawStats"]["PTS"], 20.0);
    }

    #[test]
    fn player_missing_optional_fields_take_defaults() {
        let json = r#"{ "playerKey": "p9", "fullName": "Bench Guy" }"#;
        let player: PlayerStatLine = serde_json::from_str(json).unwrap();
        assert!(player.eligible);
        assert!(player.positions.is_empty());
        assert_eq!(player.best_ball_slot, BestBallSlot::Bench);
        assert_eq!(player.fantasy_points, 0.0);
    }

    #[test]
    fn player_null_position_is_empty() {
        let json = r#"{ "playerKey": "p9", "fullName": "X", "position": null }"#;
        let player: PlayerStatLine = serde_json::from_str(json).unwrap();
        assert!(player.positions.is_empty());
    }

    #[test]
    fn starter_points_skips_bench() {
        let mut team = TeamWeekResult::new("t1", "Manager");
        let mut a = PlayerStatLine::new("a", "A", vec![Position::Center]);
        a.fantasy_points = 30.0;
        a.best_ball_slot = BestBallSlot::Center;
        let mut b = PlayerStatLine::new("b", "B", vec![Position::Center]);
        b.fantasy_points = 12.5;
        team.players = vec![a, b];
        assert_eq!(team.starter_points(), 30.0);
    }

    #[test]
    fn new_snapshot_seeds_teams() {
        let teams = vec![
            ("t1".to_string(), "Ann".to_string()),
            ("t2".to_string(), "Bo".to_string()),
        ];
        let snap =
            WeeklyBestBallSnapshot::new(2025, 3, date(2025, 11, 3), date(2025, 11, 9), &teams);
        assert_eq!(snap.teams.len(), 2);
        assert_eq!(snap.team("t2").unwrap().manager_name, "Bo");
        assert!(snap.team("t3").is_none());
        assert!(snap.processed_dates.is_empty());
    }

    #[test]
    fn snapshot_dates_serialize_as_iso() {
        let mut snap =
            WeeklyBestBallSnapshot::new(2025, 1, date(2025, 10, 21), date(2025, 10, 26), &[]);
        snap.processed_dates.insert(date(2025, 10, 22));
        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["weekStart"], "2025-10-21");
        assert_eq!(json["processedDates"][0], "2025-10-22");
    }
}
