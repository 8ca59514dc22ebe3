// CSV ingestion of daily player stat lines and weekly team category lines.
//
// Daily player CSV: team_key, manager_name, player_key, full_name, position,
// optional eligible, then one numeric column per raw stat (PTS, REB, ...).
// Weekly team CSV: team_key, manager_name, then one column per stat label,
// kept verbatim (e.g. FGM/A = "27/55").

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use courtside_core::model::{parse_position_list, PlayerStatLine, TeamCategoryLine, TeamWeekResult};
use tracing::{debug, warn};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("{path}: missing required column `{column}`")]
    MissingColumn { path: String, column: String },
}

const PLAYER_ID_COLUMNS: [&str; 6] = [
    "team_key",
    "manager_name",
    "player_key",
    "full_name",
    "position",
    "eligible",
];

const TEAM_ID_COLUMNS: [&str; 2] = ["team_key", "manager_name"];

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Column positions by trimmed header name.
fn header_index(headers: &csv::StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(i, h)| (h.trim().to_string(), i))
        .collect()
}

fn require(
    index: &HashMap<String, usize>,
    column: &str,
    label: &str,
) -> Result<usize, IngestError> {
    index
        .get(column)
        .copied()
        .ok_or_else(|| IngestError::MissingColumn {
            path: label.to_string(),
            column: column.to_string(),
        })
}

fn field<'r>(record: &'r csv::StringRecord, idx: usize) -> &'r str {
    record.get(idx).unwrap_or("").trim()
}

fn parse_eligible(raw: &str, player: &str) -> bool {
    match raw.to_ascii_lowercase().as_str() {
        "" | "true" | "yes" | "1" => true,
        "false" | "no" | "0" => false,
        other => {
            warn!("player '{}': unrecognized eligible value '{}', assuming true", player, other);
            true
        }
    }
}

// ---------------------------------------------------------------------------
// Reader-based loaders (enable testing without temp files)
// ---------------------------------------------------------------------------

/// Read daily player lines, grouped by team in first-seen order.
pub fn daily_players_from_reader<R: Read>(
    rdr: R,
    label: &str,
) -> Result<Vec<TeamWeekResult>, IngestError> {
    let csv_err = |source| IngestError::Csv {
        path: label.to_string(),
        source,
    };
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(rdr);
    let headers = reader.headers().map_err(csv_err)?.clone();
    let index = header_index(&headers);

    let team_col = require(&index, "team_key", label)?;
    let manager_col = require(&index, "manager_name", label)?;
    let player_col = require(&index, "player_key", label)?;
    let name_col = require(&index, "full_name", label)?;
    let position_col = require(&index, "position", label)?;
    let eligible_col = index.get("eligible").copied();

    let stat_cols: Vec<(String, usize)> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| (h.trim().to_string(), i))
        .filter(|(h, _)| !h.is_empty() && !PLAYER_ID_COLUMNS.contains(&h.as_str()))
        .collect();

    let mut teams: Vec<TeamWeekResult> = Vec::new();
    let mut team_index: HashMap<String, usize> = HashMap::new();

    for (row, result) in reader.records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                warn!("{}: skipping malformed row {}: {}", label, row + 1, e);
                continue;
            }
        };

        let team_key = field(&record, team_col);
        let player_key = field(&record, player_col);
        if team_key.is_empty() || player_key.is_empty() {
            warn!("{}: skipping row {} without team or player key", label, row + 1);
            continue;
        }

        let mut player = PlayerStatLine::new(
            player_key,
            field(&record, name_col),
            parse_position_list(field(&record, position_col)),
        );
        player.eligible = eligible_col
            .map(|col| parse_eligible(field(&record, col), player_key))
            .unwrap_or(true);

        for (stat, col) in &stat_cols {
            let raw = field(&record, *col);
            if raw.is_empty() {
                continue;
            }
            let value = raw.parse::<f64>().ok().filter(|v| v.is_finite()).unwrap_or_else(|| {
                warn!(
                    "{}: player '{}' has unparseable {} value '{}', using 0",
                    label, player_key, stat, raw
                );
                0.0
            });
            player.raw_stats.insert(stat.clone(), value);
        }

        let idx = *team_index.entry(team_key.to_string()).or_insert_with(|| {
            teams.push(TeamWeekResult::new(team_key, field(&record, manager_col)));
            teams.len() - 1
        });
        teams[idx].players.push(player);
    }

    debug!(
        "{}: read {} player lines for {} teams",
        label,
        teams.iter().map(|t| t.players.len()).sum::<usize>(),
        teams.len()
    );
    Ok(teams)
}

/// Read weekly team category lines. Stat values are kept as strings.
pub fn team_lines_from_reader<R: Read>(
    rdr: R,
    label: &str,
) -> Result<Vec<TeamCategoryLine>, IngestError> {
    let csv_err = |source| IngestError::Csv {
        path: label.to_string(),
        source,
    };
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(rdr);
    let headers = reader.headers().map_err(csv_err)?.clone();
    let index = header_index(&headers);

    let team_col = require(&index, "team_key", label)?;
    let manager_col = require(&index, "manager_name", label)?;
    let stat_cols: Vec<(String, usize)> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| (h.trim().to_string(), i))
        .filter(|(h, _)| !h.is_empty() && !TEAM_ID_COLUMNS.contains(&h.as_str()))
        .collect();

    let mut lines = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                warn!("{}: skipping malformed row {}: {}", label, row + 1, e);
                continue;
            }
        };

        let team_key = field(&record, team_col);
        if team_key.is_empty() {
            warn!("{}: skipping row {} without team key", label, row + 1);
            continue;
        }

        let mut line = TeamCategoryLine::new(team_key, field(&record, manager_col));
        for (stat, col) in &stat_cols {
            let raw = field(&record, *col);
            if !raw.is_empty() {
                line.stat_values.insert(stat.clone(), raw.to_string());
            }
        }
        lines.push(line);
    }

    debug!("{}: read {} team lines", label, lines.len());
    Ok(lines)
}

// ---------------------------------------------------------------------------
// Public path-based loaders
// ---------------------------------------------------------------------------

fn open(path: &Path) -> Result<std::fs::File, IngestError> {
    std::fs::File::open(path).map_err(|e| IngestError::Io {
        path: path.display().to_string(),
        source: e,
    })
}

/// Load one day's player lines from a CSV file.
pub fn load_daily_players(path: &Path) -> Result<Vec<TeamWeekResult>, IngestError> {
    daily_players_from_reader(open(path)?, &path.display().to_string())
}

/// Load one week's team category lines from a CSV file.
pub fn load_team_lines(path: &Path) -> Result<Vec<TeamCategoryLine>, IngestError> {
    team_lines_from_reader(open(path)?, &path.display().to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
