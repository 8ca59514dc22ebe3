// Folding one day's player stat lines into a weekly best-ball snapshot.

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::config::ScoringWeights;
use crate::model::{PlayerStatLine, TeamWeekResult, WeeklyBestBallSnapshot};

/// Raw stats that are rates, not totals; summing them is meaningless.
const NON_ADDITIVE_STATS: [&str; 2] = ["FG%", "FT%"];

/// Result of [`merge_daily`].
#[derive(Debug, Clone, PartialEq)]
pub enum MergeOutcome {
    /// The delta was folded in and the date recorded.
    Merged {
        snapshot: WeeklyBestBallSnapshot,
        players_updated: usize,
    },
    /// The date was already processed; the snapshot is returned untouched.
    AlreadyProcessed(WeeklyBestBallSnapshot),
}

impl MergeOutcome {
    pub fn is_merged(&self) -> bool {
        matches!(self, MergeOutcome::Merged { .. })
    }

    pub fn snapshot(&self) -> &WeeklyBestBallSnapshot {
        match self {
            MergeOutcome::Merged { snapshot, .. } | MergeOutcome::AlreadyProcessed(snapshot) => {
                snapshot
            }
        }
    }

    pub fn into_snapshot(self) -> WeeklyBestBallSnapshot {
        match self {
            MergeOutcome::Merged { snapshot, .. } | MergeOutcome::AlreadyProcessed(snapshot) => {
                snapshot
            }
        }
    }
}

/// Merge one day's per-team player lines into `previous`.
///
/// Replaying a date that is already in `processed_dates` is a no-op. For a
/// new date every player's counting stats are added to their weekly totals
/// (players and teams not yet seen are appended), positions and eligibility
/// take the latest day's values, and fantasy points are recomputed from the
/// summed totals. Lineup slots are left for the weekly scorer.
pub fn merge_daily(
    previous: WeeklyBestBallSnapshot,
    date: NaiveDate,
    delta: &[TeamWeekResult],
    weights: &ScoringWeights,
) -> MergeOutcome {
    if previous.processed_dates.contains(&date) {
        warn!(
            "week {} of {}: {} already merged, skipping",
            previous.week, previous.season, date
        );
        return MergeOutcome::AlreadyProcessed(previous);
    }

    if date < previous.week_start || date > previous.week_end {
        warn!(
            "week {} of {}: {} falls outside {}..={}, merging anyway",
            previous.week, previous.season, date, previous.week_start, previous.week_end
        );
    }

    let mut snapshot = previous;
    let mut players_updated = 0;

    for daily_team in delta {
        let team_idx = match snapshot
            .teams
            .iter()
            .position(|t| t.team_key == daily_team.team_key)
        {
            Some(idx) => idx,
            None => {
                debug!("adding team {} to week {}", daily_team.team_key, snapshot.week);
                snapshot.teams.push(TeamWeekResult::new(
                    &daily_team.team_key,
                    &daily_team.manager_name,
                ));
                snapshot.teams.len() - 1
            }
        };
        let team = &mut snapshot.teams[team_idx];

        for daily in &daily_team.players {
            merge_player(team, daily, weights);
            players_updated += 1;
        }
    }

    snapshot.processed_dates.insert(date);
    debug!(
        "merged {} into week {}: {} player lines",
        date, snapshot.week, players_updated
    );

    MergeOutcome::Merged {
        snapshot,
        players_updated,
    }
}

fn merge_player(team: &mut TeamWeekResult, daily: &PlayerStatLine, weights: &ScoringWeights) {
    let idx = match team
        .players
        .iter()
        .position(|p| p.player_key == daily.player_key)
    {
        Some(idx) => idx,
        None => {
            team.players.push(PlayerStatLine::new(
                &daily.player_key,
                &daily.full_name,
                daily.positions.clone(),
            ));
            team.players.len() - 1
        }
    };
    let existing = &mut team.players[idx];

    for (key, value) in &daily.raw_stats {
        if NON_ADDITIVE_STATS.contains(&key.as_str()) {
            continue;
        }
        *existing.raw_stats.entry(key.clone()).or_insert(0.0) += value;
    }

    if !daily.positions.is_empty() {
        existing.positions = daily.positions.clone();
    }
    existing.eligible = daily.eligible;
    existing.fantasy_points = weights.fantasy_points(&existing.raw_stats);
}
