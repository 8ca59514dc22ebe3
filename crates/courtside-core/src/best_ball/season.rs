// Season best-ball rollup: totals, weekly finishing ranks, best/worst weeks
// and per-player contribution, rebuilt from every stored weekly snapshot.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::model::{TeamWeekResult, WeeklyBestBallSnapshot};

/// Players kept per team when no limit is configured.
pub const DEFAULT_TOP_PLAYERS: usize = 7;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonBestBallPlayer {
    pub player_key: String,
    pub player_name: String,
    pub weeks_on_roster: u32,
    pub weeks_started: u32,
    pub total_contributed_points: f64,
    /// Share of the team's season total, as a fraction (0.25 = 25%).
    pub contribution_percent: f64,
    /// `weeks_started / weeks_on_roster`, 0 when never rostered.
    #[serde(default)]
    pub start_rate: f64,
    /// `total_contributed_points / weeks_started`, 0 when never started.
    #[serde(default)]
    pub points_per_start: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonBestBallTeam {
    pub team_key: String,
    pub manager_name: String,
    pub weeks_played: u32,
    pub season_total_best_ball_points: f64,
    pub best_week_score: f64,
    pub worst_week_score: f64,
    pub total_rank_points: u32,
    pub average_rank: f64,
    pub players: Vec<SeasonBestBallPlayer>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonBestBallSnapshot {
    pub season: i32,
    pub last_updated: DateTime<Utc>,
    pub weeks_included: Vec<u32>,
    pub teams: Vec<SeasonBestBallTeam>,
}

// ---------------------------------------------------------------------------
// Accumulators
// ---------------------------------------------------------------------------

struct PlayerTally {
    player_key: String,
    player_name: String,
    weeks_on_roster: u32,
    weeks_started: u32,
    contributed: f64,
}

impl PlayerTally {
    fn start_rate(&self) -> f64 {
        if self.weeks_on_roster == 0 {
            0.0
        } else {
            f64::from(self.weeks_started) / f64::from(self.weeks_on_roster)
        }
    }

    fn points_per_start(&self) -> f64 {
        if self.weeks_started == 0 {
            0.0
        } else {
            self.contributed / f64::from(self.weeks_started)
        }
    }
}

struct TeamTally {
    team_key: String,
    manager_name: String,
    weeks_played: u32,
    total: f64,
    best: Option<f64>,
    worst: Option<f64>,
    rank_points: u32,
    players: Vec<PlayerTally>,
    player_index: HashMap<String, usize>,
}

impl TeamTally {
    fn new(team: &TeamWeekResult) -> Self {
        TeamTally {
            team_key: team.team_key.clone(),
            manager_name: team.manager_name.clone(),
            weeks_played: 0,
            total: 0.0,
            best: None,
            worst: None,
            rank_points: 0,
            players: Vec::new(),
            player_index: HashMap::new(),
        }
    }

    fn add_week(&mut self, team: &TeamWeekResult, rank: u32, counts_for_extremes: bool) {
        let score = team.total_best_ball_points;
        self.weeks_played += 1;
        self.total += score;
        self.rank_points += rank;

        if counts_for_extremes {
            self.best = Some(self.best.map_or(score, |b| b.max(score)));
            self.worst = Some(self.worst.map_or(score, |w| w.min(score)));
        }

        for player in &team.players {
            let idx = match self.player_index.get(&player.player_key) {
                Some(&idx) => idx,
                None => {
                    self.players.push(PlayerTally {
                        player_key: player.player_key.clone(),
                        player_name: player.full_name.clone(),
                        weeks_on_roster: 0,
                        weeks_started: 0,
                        contributed: 0.0,
                    });
                    self.player_index
                        .insert(player.player_key.clone(), self.players.len() - 1);
                    self.players.len() - 1
                }
            };
            let tally = &mut self.players[idx];
            tally.weeks_on_roster += 1;
            if player.is_starter() {
                tally.weeks_started += 1;
                tally.contributed += player.fantasy_points;
            }
        }
    }

    fn finish(self, top_players: usize) -> SeasonBestBallTeam {
        let total = self.total;
        let mut players: Vec<SeasonBestBallPlayer> = self
            .players
            .into_iter()
            .map(|p| SeasonBestBallPlayer {
                contribution_percent: if total == 0.0 { 0.0 } else { p.contributed / total },
                start_rate: p.start_rate(),
                points_per_start: p.points_per_start(),
                player_key: p.player_key,
                player_name: p.player_name,
                weeks_on_roster: p.weeks_on_roster,
                weeks_started: p.weeks_started,
                total_contributed_points: p.contributed,
            })
            .collect();

        players.sort_by(|a, b| {
            b.total_contributed_points
                .total_cmp(&a.total_contributed_points)
                .then_with(|| a.player_key.cmp(&b.player_key))
        });
        players.truncate(top_players);

        SeasonBestBallTeam {
            team_key: self.team_key,
            manager_name: self.manager_name,
            weeks_played: self.weeks_played,
            season_total_best_ball_points: total,
            best_week_score: self.best.unwrap_or(0.0),
            worst_week_score: self.worst.unwrap_or(0.0),
            total_rank_points: self.rank_points,
            average_rank: if self.weeks_played == 0 {
                0.0
            } else {
                f64::from(self.rank_points) / f64::from(self.weeks_played)
            },
            players,
        }
    }
}

// ---------------------------------------------------------------------------
// Aggregator
// ---------------------------------------------------------------------------

/// Competition ranks (1 = highest total) for a week's teams, in input order.
/// Equal totals share a rank and the next distinct total skips ahead.
pub fn weekly_ranks(teams: &[TeamWeekResult]) -> Vec<u32> {
    teams
        .iter()
        .map(|team| {
            let higher = teams
                .iter()
                .filter(|other| other.total_best_ball_points > team.total_best_ball_points)
                .count();
            higher as u32 + 1
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct SeasonBestBallAggregator {
    top_players: usize,
}

impl Default for SeasonBestBallAggregator {
    fn default() -> Self {
        SeasonBestBallAggregator::new(DEFAULT_TOP_PLAYERS)
    }
}

impl SeasonBestBallAggregator {
    pub fn new(top_players: usize) -> Self {
        SeasonBestBallAggregator { top_players }
    }

    /// Roll up a season from its weekly snapshots.
    ///
    /// `latest_week` is the in-progress week: it counts toward totals and
    /// ranks but not toward best/worst week. Returns `None` when there are
    /// no weeks to aggregate.
    pub fn aggregate(
        &self,
        weeks: &[WeeklyBestBallSnapshot],
        latest_week: u32,
        last_updated: DateTime<Utc>,
    ) -> Option<SeasonBestBallSnapshot> {
        let mut ordered: Vec<&WeeklyBestBallSnapshot> = weeks.iter().collect();
        ordered.sort_by_key(|w| w.week);
        let season = ordered.first()?.season;

        let mut tallies: Vec<TeamTally> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for week in &ordered {
            let ranks = weekly_ranks(&week.teams);
            let counts_for_extremes = week.week != latest_week;
            debug!(
                "aggregating best-ball week {} ({} teams, extremes: {})",
                week.week,
                week.teams.len(),
                counts_for_extremes
            );

            for (team, rank) in week.teams.iter().zip(ranks) {
                let idx = *index.entry(team.team_key.clone()).or_insert_with(|| {
                    tallies.push(TeamTally::new(team));
                    tallies.len() - 1
                });
                tallies[idx].add_week(team, rank, counts_for_extremes);
            }
        }

        let mut teams: Vec<SeasonBestBallTeam> = tallies
            .into_iter()
            .map(|t| t.finish(self.top_players))
            .collect();
        teams.sort_by(|a, b| {
            b.season_total_best_ball_points
                .total_cmp(&a.season_total_best_ball_points)
                .then_with(|| a.team_key.cmp(&b.team_key))
        });

        let weeks_included: Vec<u32> = ordered.iter().map(|w| w.week).collect();
        info!(
            "season {} best-ball: {} teams over weeks {:?}",
            season,
            teams.len(),
            weeks_included
        );

        Some(SeasonBestBallSnapshot {
            season,
            last_updated,
            weeks_included,
            teams,
        })
    }
}
