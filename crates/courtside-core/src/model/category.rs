// Head-to-head scoring categories, their comparison rules, and the weekly
// per-team category line.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// The fixed set of head-to-head categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "PTS")]
    Points,
    #[serde(rename = "REB")]
    Rebounds,
    #[serde(rename = "AST")]
    Assists,
    #[serde(rename = "STL")]
    Steals,
    #[serde(rename = "BLK")]
    Blocks,
    #[serde(rename = "TO")]
    Turnovers,
    #[serde(rename = "3PM")]
    ThreesMade,
    #[serde(rename = "FG%")]
    FieldGoalPct,
    #[serde(rename = "FT%")]
    FreeThrowPct,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Category::Points,
        Category::Rebounds,
        Category::Assists,
        Category::Steals,
        Category::Blocks,
        Category::Turnovers,
        Category::ThreesMade,
        Category::FieldGoalPct,
        Category::FreeThrowPct,
    ];

    pub fn from_label(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "PTS" => Some(Category::Points),
            "REB" => Some(Category::Rebounds),
            "AST" => Some(Category::Assists),
            "STL" => Some(Category::Steals),
            "BLK" => Some(Category::Blocks),
            "TO" => Some(Category::Turnovers),
            "3PM" => Some(Category::ThreesMade),
            "FG%" => Some(Category::FieldGoalPct),
            "FT%" => Some(Category::FreeThrowPct),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::Points => "PTS",
            Category::Rebounds => "REB",
            Category::Assists => "AST",
            Category::Steals => "STL",
            Category::Blocks => "BLK",
            Category::Turnovers => "TO",
            Category::ThreesMade => "3PM",
            Category::FieldGoalPct => "FG%",
            Category::FreeThrowPct => "FT%",
        }
    }

    /// Stat key holding the `makes/attempts` pair a percentage is derived
    /// from. `None` for counting categories.
    pub fn ratio_key(&self) -> Option<&'static str> {
        match self {
            Category::FieldGoalPct => Some("FGM/A"),
            Category::FreeThrowPct => Some("FTM/A"),
            _ => None,
        }
    }

    pub fn default_direction(&self) -> Direction {
        match self {
            Category::Turnovers => Direction::LowerIsBetter,
            _ => Direction::HigherIsBetter,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Which way a category is won.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    HigherIsBetter,
    LowerIsBetter,
}

impl Direction {
    /// Whether `ours` beats `theirs`. Callers handle equality as a tie first.
    pub fn favors(&self, ours: f64, theirs: f64) -> bool {
        match self {
            Direction::HigherIsBetter => ours > theirs,
            Direction::LowerIsBetter => ours < theirs,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryRule {
    pub category: Category,
    pub direction: Direction,
}

/// The ordered, immutable set of categories a round robin compares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRules {
    rules: Vec<CategoryRule>,
}

impl CategoryRules {
    /// All nine categories with their standard directions.
    pub fn standard() -> Self {
        Self::from_categories(&Category::ALL)
    }

    pub fn from_categories(categories: &[Category]) -> Self {
        CategoryRules {
            rules: categories
                .iter()
                .map(|&category| CategoryRule {
                    category,
                    direction: category.default_direction(),
                })
                .collect(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &CategoryRule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for CategoryRules {
    fn default() -> Self {
        Self::standard()
    }
}

// ---------------------------------------------------------------------------
// Stat values
// ---------------------------------------------------------------------------

/// A parsed stat value: either a plain total or a `makes/attempts` pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CategoryValue {
    Count(f64),
    Ratio { makes: f64, attempts: f64 },
}

impl CategoryValue {
    /// Parse a provider stat string: `"152"`, `".491"`, or `"27/55"`.
    /// Non-finite numbers (`NaN`, `inf`) are rejected like any other junk.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        if let Some((makes, attempts)) = raw.split_once('/') {
            let makes = parse_finite(makes)?;
            let attempts = parse_finite(attempts)?;
            return Some(CategoryValue::Ratio { makes, attempts });
        }
        parse_finite(raw).map(CategoryValue::Count)
    }

    /// Numeric value at full precision. A ratio with zero attempts is 0.
    pub fn value(&self) -> f64 {
        match *self {
            CategoryValue::Count(v) => v,
            CategoryValue::Ratio { makes, attempts } => {
                if attempts == 0.0 {
                    0.0
                } else {
                    makes / attempts
                }
            }
        }
    }
}

fn parse_finite(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Format a shooting percentage for display, e.g. `0.490909` -> `".491"`.
pub fn format_percentage(value: f64, precision: usize) -> String {
    let formatted = format!("{value:.precision$}");
    match formatted.strip_prefix("0.") {
        Some(rest) => format!(".{rest}"),
        None => formatted,
    }
}

/// Format a counting total: whole numbers print without a fraction.
pub fn format_count(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value}")
    }
}

/// One team's aggregate category stats for a week, as supplied upstream.
///
/// Values are kept as the provider's strings; shooting stats arrive as raw
/// `makes/attempts` pairs under `FGM/A` and `FTM/A`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamCategoryLine {
    pub team_key: String,
    pub manager_name: String,
    #[serde(default)]
    pub stat_values: BTreeMap<String, String>,
}

impl TeamCategoryLine {
    pub fn new(team_key: &str, manager_name: &str) -> Self {
        TeamCategoryLine {
            team_key: team_key.to_string(),
            manager_name: manager_name.to_string(),
            stat_values: BTreeMap::new(),
        }
    }

    pub fn with_stat(mut self, key: &str, value: &str) -> Self {
        self.stat_values.insert(key.to_string(), value.to_string());
        self
    }

    /// Parsed value for a category, at full precision.
    ///
    /// Percentages come from the retained `makes/attempts` pair when present,
    /// falling back to the category's own value. Missing or unparseable
    /// values count as zero.
    pub fn category_value(&self, category: Category) -> CategoryValue {
        if let Some(pair) = category
            .ratio_key()
            .and_then(|key| self.stat_values.get(key))
            .and_then(|raw| CategoryValue::parse(raw))
        {
            return pair;
        }

        match self.stat_values.get(category.label()) {
            None => CategoryValue::Count(0.0),
            Some(raw) => CategoryValue::parse(raw).unwrap_or_else(|| {
                warn!(
                    "team {}: unparseable {} value '{}', treating as 0",
                    self.team_key,
                    category.label(),
                    raw
                );
                CategoryValue::Count(0.0)
            }),
        }
    }
}
