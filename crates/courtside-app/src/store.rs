// JSON snapshot store: one directory of pretty-printed, camelCase files.
//
//   best_ball_{season}_week_{week}.json     weekly best-ball snapshot
//   season_best_ball_{season}.json          season best-ball rollup
//   round_robin_{season}_week_{week}.json   weekly round-robin results
//   season_round_robin_{season}.json        season round-robin standings
//   league_context.json                     season / current week / weeks

use std::path::{Path, PathBuf};

use anyhow::Context;
use courtside_core::best_ball::season::SeasonBestBallSnapshot;
use courtside_core::model::WeeklyBestBallSnapshot;
use courtside_core::round_robin::{SeasonRoundRobinSnapshot, WeeklyRoundRobinSnapshot};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const LEAGUE_CONTEXT_FILE: &str = "league_context.json";

/// What the presentation layer needs to offer a week picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeagueContext {
    pub season: i32,
    pub current_week: u32,
    pub available_weeks: Vec<u32>,
}

#[derive(Debug, Clone)]
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        SnapshotStore { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    // -----------------------------------------------------------------------
    // File naming
    // -----------------------------------------------------------------------

    pub fn weekly_best_ball_path(&self, season: i32, week: u32) -> PathBuf {
        self.dir.join(format!("best_ball_{season}_week_{week}.json"))
    }

    pub fn season_best_ball_path(&self, season: i32) -> PathBuf {
        self.dir.join(format!("season_best_ball_{season}.json"))
    }

    pub fn weekly_round_robin_path(&self, season: i32, week: u32) -> PathBuf {
        self.dir.join(format!("round_robin_{season}_week_{week}.json"))
    }

    pub fn season_round_robin_path(&self, season: i32) -> PathBuf {
        self.dir.join(format!("season_round_robin_{season}.json"))
    }

    pub fn league_context_path(&self) -> PathBuf {
        self.dir.join(LEAGUE_CONTEXT_FILE)
    }

    // -----------------------------------------------------------------------
    // Weekly best ball
    // -----------------------------------------------------------------------

    pub fn load_weekly_best_ball(
        &self,
        season: i32,
        week: u32,
    ) -> anyhow::Result<Option<WeeklyBestBallSnapshot>> {
        read_json_if_exists(&self.weekly_best_ball_path(season, week))
    }

    pub fn save_weekly_best_ball(
        &self,
        snapshot: &WeeklyBestBallSnapshot,
    ) -> anyhow::Result<PathBuf> {
        let path = self.weekly_best_ball_path(snapshot.season, snapshot.week);
        write_json(&path, snapshot)?;
        Ok(path)
    }

    /// Every weekly best-ball snapshot stored for `season`, sorted by week.
    pub fn load_all_weekly_best_ball(
        &self,
        season: i32,
    ) -> anyhow::Result<Vec<WeeklyBestBallSnapshot>> {
        self.load_weeks(&format!("best_ball_{season}_week_"))
    }

    /// Week numbers of the stored weekly best-ball files for `season`.
    pub fn weekly_best_ball_weeks(&self, season: i32) -> anyhow::Result<Vec<u32>> {
        Ok(self
            .discover(&format!("best_ball_{season}_week_"))?
            .into_iter()
            .map(|(week, _)| week)
            .collect())
    }

    // -----------------------------------------------------------------------
    // Weekly round robin
    // -----------------------------------------------------------------------

    pub fn load_weekly_round_robin(
        &self,
        season: i32,
        week: u32,
    ) -> anyhow::Result<Option<WeeklyRoundRobinSnapshot>> {
        read_json_if_exists(&self.weekly_round_robin_path(season, week))
    }

    pub fn save_weekly_round_robin(
        &self,
        snapshot: &WeeklyRoundRobinSnapshot,
    ) -> anyhow::Result<PathBuf> {
        let path = self.weekly_round_robin_path(snapshot.season, snapshot.week);
        write_json(&path, snapshot)?;
        Ok(path)
    }

    pub fn load_all_weekly_round_robin(
        &self,
        season: i32,
    ) -> anyhow::Result<Vec<WeeklyRoundRobinSnapshot>> {
        self.load_weeks(&format!("round_robin_{season}_week_"))
    }

    // -----------------------------------------------------------------------
    // Season files and league context
    // -----------------------------------------------------------------------

    pub fn load_season_best_ball(
        &self,
        season: i32,
    ) -> anyhow::Result<Option<SeasonBestBallSnapshot>> {
        read_json_if_exists(&self.season_best_ball_path(season))
    }

    pub fn save_season_best_ball(
        &self,
        snapshot: &SeasonBestBallSnapshot,
    ) -> anyhow::Result<PathBuf> {
        let path = self.season_best_ball_path(snapshot.season);
        write_json(&path, snapshot)?;
        Ok(path)
    }

    pub fn load_season_round_robin(
        &self,
        season: i32,
    ) -> anyhow::Result<Option<SeasonRoundRobinSnapshot>> {
        read_json_if_exists(&self.season_round_robin_path(season))
    }

    pub fn save_season_round_robin(
        &self,
        snapshot: &SeasonRoundRobinSnapshot,
    ) -> anyhow::Result<PathBuf> {
        let path = self.season_round_robin_path(snapshot.season);
        write_json(&path, snapshot)?;
        Ok(path)
    }

    pub fn load_league_context(&self) -> anyhow::Result<Option<LeagueContext>> {
        read_json_if_exists(&self.league_context_path())
    }

    pub fn save_league_context(&self, context: &LeagueContext) -> anyhow::Result<PathBuf> {
        let path = self.league_context_path();
        write_json(&path, context)?;
        Ok(path)
    }

    // -----------------------------------------------------------------------
    // Discovery
    // -----------------------------------------------------------------------

    /// Files named `{prefix}{week}.json`, sorted by week. A missing
    /// directory yields nothing.
    fn discover(&self, prefix: &str) -> anyhow::Result<Vec<(u32, PathBuf)>> {
        if !self.dir.is_dir() {
            debug!("snapshot directory {} does not exist", self.dir.display());
            return Ok(Vec::new());
        }

        let entries = std::fs::read_dir(&self.dir)
            .with_context(|| format!("failed to list {}", self.dir.display()))?;

        let mut found = Vec::new();
        for entry in entries {
            let entry = entry.with_context(|| format!("failed to list {}", self.dir.display()))?;
            let path = entry.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            // Anchored at the start: season files contain the weekly prefix.
            let Some(week) = name
                .strip_prefix(prefix)
                .and_then(|rest| rest.strip_suffix(".json"))
                .and_then(|w| w.parse::<u32>().ok())
            else {
                continue;
            };
            found.push((week, path));
        }
        found.sort_by_key(|(week, _)| *week);
        Ok(found)
    }

    fn load_weeks<T: DeserializeOwned>(&self, prefix: &str) -> anyhow::Result<Vec<T>> {
        let mut weeks = Vec::new();
        for (week, path) in self.discover(prefix)? {
            let snapshot = read_json(&path)
                .with_context(|| format!("failed to load week {week} snapshot"))?;
            weeks.push(snapshot);
        }
        Ok(weeks)
    }
}

// ---------------------------------------------------------------------------
// JSON helpers
// ---------------------------------------------------------------------------

fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))
}

fn read_json_if_exists<T: DeserializeOwned>(path: &Path) -> anyhow::Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    read_json(path).map(Some)
}

/// Write pretty JSON via a sibling temp file so readers never see a
/// half-written snapshot.
fn write_json<T: Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(value)
        .with_context(|| format!("failed to serialize {}", path.display()))?;

    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json).with_context(|| format!("failed to write {}", tmp.display()))?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        warn!("rename {} failed: {}", tmp.display(), e);
        let _ = std::fs::remove_file(&tmp);
        return Err(e).with_context(|| format!("failed to replace {}", path.display()));
    }
    debug!("wrote {}", path.display());
    Ok(())
}
