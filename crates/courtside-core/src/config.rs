// Configuration loading and parsing (league.toml, storage.toml).

use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::model::{Category, CategoryRules};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub league: LeagueConfig,
    pub storage: StorageConfig,
}

/// League settings with the round-robin category list already resolved
/// into an immutable rule set.
#[derive(Debug, Clone)]
pub struct LeagueConfig {
    pub name: String,
    pub season: i32,
    pub scoring: ScoringWeights,
    pub rules: CategoryRules,
    pub percentage_precision: usize,
    pub top_players: usize,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub log_dir: PathBuf,
    pub log_filter: String,
}

// ---------------------------------------------------------------------------
// league.toml structs
// ---------------------------------------------------------------------------

/// Wrapper for the top-level `[league]` table in league.toml.
#[derive(Debug, Clone, Deserialize)]
struct LeagueFile {
    league: LeagueSection,
}

#[derive(Debug, Clone, Deserialize)]
struct LeagueSection {
    name: String,
    season: i32,
    #[serde(default)]
    scoring: ScoringWeights,
    #[serde(default)]
    round_robin: RoundRobinSection,
    #[serde(default)]
    standings: StandingsSection,
}

#[derive(Debug, Clone, Deserialize)]
struct RoundRobinSection {
    categories: Vec<String>,
    #[serde(default = "default_precision")]
    percentage_precision: usize,
}

impl Default for RoundRobinSection {
    fn default() -> Self {
        RoundRobinSection {
            categories: Category::ALL.iter().map(|c| c.label().to_string()).collect(),
            percentage_precision: default_precision(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct StandingsSection {
    #[serde(default = "default_top_players")]
    top_players: usize,
}

impl Default for StandingsSection {
    fn default() -> Self {
        StandingsSection {
            top_players: default_top_players(),
        }
    }
}

fn default_precision() -> usize {
    3
}

fn default_top_players() -> usize {
    7
}

/// Fantasy-point weights. The field names use UPPERCASE to match the raw
/// stat keys (PTS, REB, ...) as they appear in TOML and in stat lines.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[allow(non_snake_case)]
pub struct ScoringWeights {
    pub PTS: f64,
    pub REB: f64,
    pub AST: f64,
    pub STL: f64,
    pub BLK: f64,
    pub TO: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        ScoringWeights {
            PTS: 1.0,
            REB: 1.2,
            AST: 1.5,
            STL: 3.0,
            BLK: 3.0,
            TO: -1.0,
        }
    }
}

impl ScoringWeights {
    fn entries(&self) -> [(&'static str, f64); 6] {
        [
            ("PTS", self.PTS),
            ("REB", self.REB),
            ("AST", self.AST),
            ("STL", self.STL),
            ("BLK", self.BLK),
            ("TO", self.TO),
        ]
    }

    /// Weighted sum of the scored categories. Stats without a weight are
    /// ignored; missing stats count as zero.
    pub fn fantasy_points(&self, raw_stats: &BTreeMap<String, f64>) -> f64 {
        self.entries()
            .iter()
            .map(|(key, weight)| raw_stats.get(*key).copied().unwrap_or(0.0) * weight)
            .sum()
    }
}

// ---------------------------------------------------------------------------
// storage.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
struct StorageFile {
    data: DataSection,
    logging: LoggingSection,
}

#[derive(Debug, Clone, Deserialize)]
struct DataSection {
    dir: String,
}

#[derive(Debug, Clone, Deserialize)]
struct LoggingSection {
    dir: String,
    filter: String,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

const LEAGUE_FILE: &str = "league.toml";
const STORAGE_FILE: &str = "storage.toml";
const CONFIG_FILES: [&str; 2] = [LEAGUE_FILE, STORAGE_FILE];

/// Load and validate configuration from `config/league.toml` and
/// `config/storage.toml` relative to the given `base_dir`.
///
/// This is the lower-level loading primitive that does not auto-copy defaults.
/// Prefer `load_config()` which handles default initialization automatically.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");

    // --- league.toml ---
    let league_path = config_dir.join(LEAGUE_FILE);
    let league_text = read_file(&league_path)?;
    let league_file: LeagueFile =
        toml::from_str(&league_text).map_err(|e| ConfigError::ParseError {
            path: league_path.clone(),
            source: e,
        })?;
    let section = league_file.league;

    // --- storage.toml ---
    let storage_path = config_dir.join(STORAGE_FILE);
    let storage_text = read_file(&storage_path)?;
    let storage_file: StorageFile =
        toml::from_str(&storage_text).map_err(|e| ConfigError::ParseError {
            path: storage_path.clone(),
            source: e,
        })?;

    validate(&section, &storage_file)?;

    let rules = resolve_categories(&section.round_robin.categories)?;

    Ok(Config {
        league: LeagueConfig {
            name: section.name,
            season: section.season,
            scoring: section.scoring,
            rules,
            percentage_precision: section.round_robin.percentage_precision,
            top_players: section.standings.top_players,
        },
        storage: StorageConfig {
            data_dir: base_dir.join(storage_file.data.dir),
            log_dir: base_dir.join(storage_file.logging.dir),
            log_filter: storage_file.logging.filter,
        },
    })
}

/// Seed `config/` with whichever of `league.toml` and `storage.toml` is
/// missing, copied from `defaults/`. Existing files are left untouched.
/// Returns the paths that were written.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.is_dir() {
        if config_dir.is_dir() {
            return Ok(vec![]);
        }
        return Err(ConfigError::DefaultsCopyError {
            message: format!(
                "neither defaults/ nor config/ found in {}; run from the league directory",
                base_dir.display()
            ),
        });
    }

    let missing: Vec<&str> = CONFIG_FILES
        .iter()
        .copied()
        .filter(|name| !config_dir.join(name).exists() && defaults_dir.join(name).is_file())
        .collect();
    if missing.is_empty() {
        return Ok(vec![]);
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create {}: {e}", config_dir.display()),
    })?;

    missing
        .into_iter()
        .map(|name| {
            let target = config_dir.join(name);
            std::fs::copy(defaults_dir.join(name), &target).map_err(|e| {
                ConfigError::DefaultsCopyError {
                    message: format!("failed to seed {}: {e}", target.display()),
                }
            })?;
            Ok(target)
        })
        .collect()
}

/// Convenience wrapper: loads config relative to the current working directory.
/// Ensures default config files are copied before loading.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

fn resolve_categories(labels: &[String]) -> Result<CategoryRules, ConfigError> {
    let field = "league.round_robin.categories";
    if labels.is_empty() {
        return Err(ConfigError::ValidationError {
            field: field.into(),
            message: "must list at least one category".into(),
        });
    }

    let mut seen = HashSet::new();
    let mut categories = Vec::with_capacity(labels.len());
    for label in labels {
        let category = Category::from_label(label).ok_or_else(|| ConfigError::ValidationError {
            field: field.into(),
            message: format!("unknown category '{label}'"),
        })?;
        if !seen.insert(category) {
            return Err(ConfigError::ValidationError {
                field: field.into(),
                message: format!("duplicate category '{label}'"),
            });
        }
        categories.push(category);
    }
    Ok(CategoryRules::from_categories(&categories))
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(league: &LeagueSection, storage: &StorageFile) -> Result<(), ConfigError> {
    if league.season <= 0 {
        return Err(ConfigError::ValidationError {
            field: "league.season".into(),
            message: format!("must be greater than 0, got {}", league.season),
        });
    }

    for (name, val) in league.scoring.entries() {
        if !val.is_finite() {
            return Err(ConfigError::ValidationError {
                field: format!("league.scoring.{name}"),
                message: format!("must be a finite number, got {val}"),
            });
        }
    }

    let precision = league.round_robin.percentage_precision;
    if precision > 9 {
        return Err(ConfigError::ValidationError {
            field: "league.round_robin.percentage_precision".into(),
            message: format!("must be at most 9, got {precision}"),
        });
    }

    if league.standings.top_players == 0 {
        return Err(ConfigError::ValidationError {
            field: "league.standings.top_players".into(),
            message: "must be greater than 0".into(),
        });
    }

    if storage.data.dir.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "data.dir".into(),
            message: "must not be empty".into(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    /// Helper: the repository root holding `defaults/`, found by walking up
    /// from this crate's manifest directory.
    fn project_root() -> PathBuf {
        let manifest = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        manifest
            .ancestors()
            .find(|dir| dir.join("defaults/league.toml").exists())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| panic!("Cannot locate defaults/ above {:?}", manifest))
    }

    /// A temp base dir whose `config/` holds the default files, with
    /// league.toml optionally rewritten.
    fn config_with_league(edit: impl Fn(String) -> String) -> TempDir {
        let tmp = TempDir::new().unwrap();
        let config_dir = tmp.path().join("config");
        fs::create_dir_all(&config_dir).unwrap();

        let root = project_root();
        let league = fs::read_to_string(root.join("defaults/league.toml")).unwrap();
        fs::write(config_dir.join("league.toml"), edit(league)).unwrap();
        fs::copy(root.join("defaults/storage.toml"), config_dir.join("storage.toml")).unwrap();
        tmp
    }

    fn expect_validation_field(tmp: &TempDir, expected: &str) {
        let err = load_config_from(tmp.path()).unwrap_err();
        match &err {
            ConfigError::ValidationError { field, .. } => assert_eq!(field, expected),
            other => panic!("expected ValidationError, got: {other}"),
        }
    }

    #[test]
    fn load_valid_config_from_project_files() {
        let tmp = config_with_league(|s| s);
        let config = load_config_from(tmp.path()).expect("should load valid config");

        assert_eq!(config.league.name, "Courtside Hoops League");
        assert_eq!(config.league.season, 2025);
        assert_eq!(config.league.scoring, ScoringWeights::default());
        assert_eq!(config.league.rules, CategoryRules::standard());
        assert_eq!(config.league.percentage_precision, 3);
        assert_eq!(config.league.top_players, 7);

        assert_eq!(config.storage.data_dir, tmp.path().join("data"));
        assert_eq!(config.storage.log_dir, tmp.path().join("logs"));
        assert!(config.storage.log_filter.contains("courtside"));
    }

    #[test]
    fn optional_sections_take_defaults() {
        let tmp = TempDir::new().unwrap();
        let config_dir = tmp.path().join("config");
        fs::create_dir_all(&config_dir).unwrap();
        fs::write(
            config_dir.join("league.toml"),
            "[league]\nname = \"Minimal\"\nseason = 2024\n",
        )
        .unwrap();
        fs::copy(
            project_root().join("defaults/storage.toml"),
            config_dir.join("storage.toml"),
        )
        .unwrap();

        let config = load_config_from(tmp.path()).unwrap();
        assert_eq!(config.league.scoring, ScoringWeights::default());
        assert_eq!(config.league.rules.len(), 9);
        assert_eq!(config.league.top_players, 7);
    }

    #[test]
    fn category_subset_keeps_order() {
        let tmp = config_with_league(|s| {
            s.replace(
                r#"categories = ["PTS", "REB", "AST", "STL", "BLK", "TO", "3PM", "FG%", "FT%"]"#,
                r#"categories = ["TO", "PTS"]"#,
            )
        });
        let config = load_config_from(tmp.path()).unwrap();
        let cats: Vec<Category> = config.league.rules.iter().map(|r| r.category).collect();
        assert_eq!(cats, vec![Category::Turnovers, Category::Points]);
    }

    #[test]
    fn rejects_season_zero() {
        let tmp = config_with_league(|s| s.replace("season = 2025", "season = 0"));
        expect_validation_field(&tmp, "league.season");
    }

    #[test]
    fn rejects_unknown_category() {
        let tmp = config_with_league(|s| s.replace("\"3PM\"", "\"DD\""));
        expect_validation_field(&tmp, "league.round_robin.categories");
    }

    #[test]
    fn rejects_duplicate_category() {
        let tmp = config_with_league(|s| s.replace("\"3PM\"", "\"PTS\""));
        expect_validation_field(&tmp, "league.round_robin.categories");
    }

    #[test]
    fn rejects_empty_category_list() {
        let tmp = config_with_league(|s| {
            s.replace(
                r#"categories = ["PTS", "REB", "AST", "STL", "BLK", "TO", "3PM", "FG%", "FT%"]"#,
                "categories = []",
            )
        });
        expect_validation_field(&tmp, "league.round_robin.categories");
    }

    #[test]
    fn rejects_excessive_precision() {
        let tmp = config_with_league(|s| {
            s.replace("percentage_precision = 3", "percentage_precision = 12")
        });
        expect_validation_field(&tmp, "league.round_robin.percentage_precision");
    }

    #[test]
    fn rejects_zero_top_players() {
        let tmp = config_with_league(|s| s.replace("top_players = 7", "top_players = 0"));
        expect_validation_field(&tmp, "league.standings.top_players");
    }

    #[test]
    fn rejects_non_finite_weight() {
        let tmp = config_with_league(|s| s.replace("BLK = 3.0", "BLK = nan"));
        expect_validation_field(&tmp, "league.scoring.BLK");
    }

    #[test]
    fn file_not_found_for_missing_storage_toml() {
        let tmp = config_with_league(|s| s);
        fs::remove_file(tmp.path().join("config/storage.toml")).unwrap();
        match load_config_from(tmp.path()).unwrap_err() {
            ConfigError::FileNotFound { path } => assert!(path.ends_with("storage.toml")),
            other => panic!("expected FileNotFound, got: {other}"),
        }
    }

    #[test]
    fn parse_error_for_malformed_toml() {
        let tmp = config_with_league(|_| "[league\nname =".to_string());
        assert!(matches!(
            load_config_from(tmp.path()).unwrap_err(),
            ConfigError::ParseError { .. }
        ));
    }

    #[test]
    fn ensure_config_files_copies_without_overwriting() {
        let tmp = TempDir::new().unwrap();
        let defaults = tmp.path().join("defaults");
        fs::create_dir_all(&defaults).unwrap();
        let root = project_root();
        fs::copy(root.join("defaults/league.toml"), defaults.join("league.toml")).unwrap();
        fs::copy(root.join("defaults/storage.toml"), defaults.join("storage.toml")).unwrap();

        let config_dir = tmp.path().join("config");
        fs::create_dir_all(&config_dir).unwrap();
        fs::write(config_dir.join("storage.toml"), "# edited\n").unwrap();

        let copied = ensure_config_files(tmp.path()).unwrap();
        assert_eq!(copied, vec![config_dir.join("league.toml")]);
        assert_eq!(
            fs::read_to_string(config_dir.join("storage.toml")).unwrap(),
            "# edited\n"
        );

        // Second run is a no-op.
        assert!(ensure_config_files(tmp.path()).unwrap().is_empty());
    }

    #[test]
    fn ensure_config_files_seeds_only_league_and_storage() {
        let tmp = TempDir::new().unwrap();
        let defaults = tmp.path().join("defaults");
        fs::create_dir_all(&defaults).unwrap();
        let root = project_root();
        fs::copy(root.join("defaults/league.toml"), defaults.join("league.toml")).unwrap();
        fs::write(defaults.join("scratch.toml"), "x = 1\n").unwrap();

        let copied = ensure_config_files(tmp.path()).unwrap();
        let config_dir = tmp.path().join("config");
        assert_eq!(copied, vec![config_dir.join("league.toml")]);
        assert!(!config_dir.join("scratch.toml").exists());
        assert!(!config_dir.join("storage.toml").exists());
    }

    #[test]
    fn ensure_config_files_without_defaults_keeps_existing_config() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("config")).unwrap();
        assert!(ensure_config_files(tmp.path()).unwrap().is_empty());
    }

    #[test]
    fn ensure_config_files_errors_without_defaults_or_config() {
        let tmp = TempDir::new().unwrap();
        assert!(matches!(
            ensure_config_files(tmp.path()).unwrap_err(),
            ConfigError::DefaultsCopyError { .. }
        ));
    }

    #[test]
    fn fantasy_points_uses_weights() {
        let weights = ScoringWeights::default();
        let mut stats = BTreeMap::new();
        stats.insert("PTS".to_string(), 20.0);
        stats.insert("REB".to_string(), 10.0);
        stats.insert("AST".to_string(), 4.0);
        stats.insert("STL".to_string(), 1.0);
        stats.insert("BLK".to_string(), 2.0);
        stats.insert("TO".to_string(), 3.0);
        stats.insert("3PM".to_string(), 5.0);
        // 20 + 12 + 6 + 3 + 6 - 3 = 44; 3PM carries no weight.
        assert!((weights.fantasy_points(&stats) - 44.0).abs() < 1e-9);
    }

    #[test]
    fn fantasy_points_empty_is_zero() {
        assert_eq!(ScoringWeights::default().fantasy_points(&BTreeMap::new()), 0.0);
    }
}
