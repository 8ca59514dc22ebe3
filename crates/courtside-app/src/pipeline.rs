// Load -> compute -> store pipelines behind each CLI command.

use std::path::PathBuf;

use anyhow::Context;
use chrono::{DateTime, NaiveDate, Utc};
use courtside_core::best_ball::merge::{merge_daily, MergeOutcome};
use courtside_core::best_ball::season::{SeasonBestBallAggregator, SeasonBestBallSnapshot};
use courtside_core::best_ball::weekly::score_snapshot;
use courtside_core::config::{Config, LeagueConfig};
use courtside_core::model::{TeamCategoryLine, TeamWeekResult, WeeklyBestBallSnapshot};
use courtside_core::round_robin::{
    RoundRobinEngine, SeasonRoundRobinAggregator, SeasonRoundRobinSnapshot,
    WeeklyRoundRobinSnapshot,
};
use tracing::{debug, info, warn};

use crate::store::{LeagueContext, SnapshotStore};

/// Which week a daily delta belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekWindow {
    pub week: u32,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct DayReport {
    /// False when the date had already been merged and nothing was written.
    pub merged: bool,
    pub players_updated: usize,
    pub path: PathBuf,
    pub snapshot: WeeklyBestBallSnapshot,
}

#[derive(Debug, Clone)]
pub struct SeasonReport {
    pub best_ball: Option<SeasonBestBallSnapshot>,
    pub round_robin: Option<SeasonRoundRobinSnapshot>,
}

pub struct Pipeline {
    league: LeagueConfig,
    store: SnapshotStore,
}

impl Pipeline {
    pub fn new(league: LeagueConfig, store: SnapshotStore) -> Self {
        Pipeline { league, store }
    }

    pub fn from_config(config: &Config) -> Self {
        Pipeline::new(
            config.league.clone(),
            SnapshotStore::new(config.storage.data_dir.clone()),
        )
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    // -----------------------------------------------------------------------
    // Best ball
    // -----------------------------------------------------------------------

    /// Fold one day's player lines into the week's snapshot, rescore every
    /// team and store the result. Replaying a date writes nothing.
    pub fn run_best_ball_day(
        &self,
        window: WeekWindow,
        date: NaiveDate,
        delta: &[TeamWeekResult],
    ) -> anyhow::Result<DayReport> {
        let season = self.league.season;
        let path = self.store.weekly_best_ball_path(season, window.week);

        let previous = match self
            .store
            .load_weekly_best_ball(season, window.week)
            .with_context(|| format!("failed to load best-ball week {}", window.week))?
        {
            Some(existing) => {
                if existing.week_start != window.start || existing.week_end != window.end {
                    warn!(
                        "week {} is stored as {}..={}, ignoring requested {}..={}",
                        window.week,
                        existing.week_start,
                        existing.week_end,
                        window.start,
                        window.end
                    );
                }
                existing
            }
            None => {
                let teams: Vec<(String, String)> = delta
                    .iter()
                    .map(|t| (t.team_key.clone(), t.manager_name.clone()))
                    .collect();
                info!(
                    "starting best-ball week {} ({}..={}) with {} teams",
                    window.week,
                    window.start,
                    window.end,
                    teams.len()
                );
                WeeklyBestBallSnapshot::new(season, window.week, window.start, window.end, &teams)
            }
        };

        match merge_daily(previous, date, delta, &self.league.scoring) {
            MergeOutcome::AlreadyProcessed(snapshot) => {
                info!("{} already in week {}; nothing written", date, window.week);
                Ok(DayReport {
                    merged: false,
                    players_updated: 0,
                    path,
                    snapshot,
                })
            }
            MergeOutcome::Merged {
                mut snapshot,
                players_updated,
            } => {
                score_snapshot(&mut snapshot);
                let path = self
                    .store
                    .save_weekly_best_ball(&snapshot)
                    .context("failed to store weekly best-ball snapshot")?;
                self.refresh_league_context(window.week)?;
                info!(
                    "best-ball week {}: merged {} ({} player lines), {} teams scored",
                    window.week,
                    date,
                    players_updated,
                    snapshot.teams.len()
                );
                Ok(DayReport {
                    merged: true,
                    players_updated,
                    path,
                    snapshot,
                })
            }
        }
    }

    // -----------------------------------------------------------------------
    // Round robin
    // -----------------------------------------------------------------------

    /// Play every team against every other on one week's category lines and
    /// store the results.
    pub fn run_round_robin_week(
        &self,
        week: u32,
        lines: &[TeamCategoryLine],
    ) -> anyhow::Result<WeeklyRoundRobinSnapshot> {
        let engine = RoundRobinEngine::new(
            self.league.rules.clone(),
            self.league.percentage_precision,
        );
        let results = engine
            .run(lines)
            .with_context(|| format!("round robin for week {week} failed"))?;

        let snapshot = WeeklyRoundRobinSnapshot {
            season: self.league.season,
            week,
            results,
        };
        self.store
            .save_weekly_round_robin(&snapshot)
            .context("failed to store weekly round-robin results")?;
        info!(
            "round-robin week {}: {} teams, {} categories",
            week,
            snapshot.results.len(),
            self.league.rules.len()
        );
        Ok(snapshot)
    }

    // -----------------------------------------------------------------------
    // Season
    // -----------------------------------------------------------------------

    /// Re-aggregate both season files from every stored week. Returns
    /// `None` (and writes nothing) when no weekly snapshots exist.
    ///
    /// `latest_week` defaults to the highest stored best-ball week.
    pub fn run_season(
        &self,
        latest_week: Option<u32>,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Option<SeasonReport>> {
        let season = self.league.season;
        let best_ball_weeks = self
            .store
            .load_all_weekly_best_ball(season)
            .context("failed to load weekly best-ball snapshots")?;
        let round_robin_weeks = self
            .store
            .load_all_weekly_round_robin(season)
            .context("failed to load weekly round-robin snapshots")?;

        if best_ball_weeks.is_empty() && round_robin_weeks.is_empty() {
            info!(
                "no weekly snapshots for {} in {}; season files not written",
                season,
                self.store.dir().display()
            );
            return Ok(None);
        }

        let latest = latest_week
            .or_else(|| best_ball_weeks.iter().map(|w| w.week).max())
            .unwrap_or(0);
        debug!(
            "aggregating season {}: {} best-ball weeks, {} round-robin weeks, latest {}",
            season,
            best_ball_weeks.len(),
            round_robin_weeks.len(),
            latest
        );

        let best_ball = SeasonBestBallAggregator::new(self.league.top_players).aggregate(
            &best_ball_weeks,
            latest,
            now,
        );
        if let Some(snapshot) = &best_ball {
            self.store
                .save_season_best_ball(snapshot)
                .context("failed to store season best-ball snapshot")?;
            info!(
                "season best ball {}: {} teams over weeks {:?}",
                season,
                snapshot.teams.len(),
                snapshot.weeks_included
            );
        }

        let round_robin = SeasonRoundRobinAggregator::new(
            self.league.rules.clone(),
            self.league.percentage_precision,
        )
        .aggregate(&round_robin_weeks, now);
        if let Some(snapshot) = &round_robin {
            self.store
                .save_season_round_robin(snapshot)
                .context("failed to store season round-robin snapshot")?;
            info!(
                "season round robin {}: {} teams over weeks {:?}",
                season,
                snapshot.results.len(),
                snapshot.weeks_included
            );
        }

        Ok(Some(SeasonReport {
            best_ball,
            round_robin,
        }))
    }

    /// Rewrite `league_context.json` from the stored weeks plus `current_week`.
    pub fn refresh_league_context(&self, current_week: u32) -> anyhow::Result<LeagueContext> {
        let mut available_weeks = self
            .store
            .weekly_best_ball_weeks(self.league.season)
            .context("failed to discover stored weeks")?;
        available_weeks.push(current_week);
        available_weeks.sort_unstable();
        available_weeks.dedup();

        let context = LeagueContext {
            season: self.league.season,
            current_week,
            available_weeks,
        };
        self.store
            .save_league_context(&context)
            .context("failed to store league context")?;
        Ok(context)
    }
}
