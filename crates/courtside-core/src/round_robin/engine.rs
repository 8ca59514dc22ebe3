// All-play category round robin for one week.
//
// Every team is compared against every other team on each configured
// category. Each team's record is built from its own perspective, so a
// league of N teams yields N - 1 matchups per team.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::model::{format_percentage, Category, CategoryRules, TeamCategoryLine};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error, PartialEq)]
pub enum RoundRobinError {
    #[error("round robin needs at least 2 teams, got {found}")]
    NotEnoughTeams { found: usize },

    #[error("team `{team_key}` appears more than once")]
    DuplicateTeam { team_key: String },
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRecord {
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
}

impl CategoryRecord {
    pub fn absorb(&mut self, other: &CategoryRecord) {
        self.wins += other.wins;
        self.losses += other.losses;
        self.ties += other.ties;
    }
}

/// A team's summed record across all of its matchups.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamRecord {
    pub matchup_wins: u32,
    pub matchup_losses: u32,
    pub matchup_ties: u32,
    pub category_wins: u32,
    pub category_losses: u32,
    pub category_ties: u32,
    #[serde(default)]
    pub category_records: BTreeMap<Category, CategoryRecord>,
}

impl TeamRecord {
    fn for_rules(rules: &CategoryRules) -> Self {
        TeamRecord {
            category_records: rules
                .iter()
                .map(|r| (r.category, CategoryRecord::default()))
                .collect(),
            ..TeamRecord::default()
        }
    }

    pub fn absorb(&mut self, other: &TeamRecord) {
        self.matchup_wins += other.matchup_wins;
        self.matchup_losses += other.matchup_losses;
        self.matchup_ties += other.matchup_ties;
        self.category_wins += other.category_wins;
        self.category_losses += other.category_losses;
        self.category_ties += other.category_ties;
        for (category, record) in &other.category_records {
            self.category_records
                .entry(*category)
                .or_default()
                .absorb(record);
        }
    }

    /// "W-L-T" matchup record.
    pub fn matchup_line(&self) -> String {
        format!(
            "{}-{}-{}",
            self.matchup_wins, self.matchup_losses, self.matchup_ties
        )
    }
}

/// One team's result against one opponent. `wins`/`losses`/`ties` count
/// matchup outcomes: exactly one is 1 for a single week.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Matchup {
    pub opponent_team_key: String,
    /// The opponent's manager.
    pub manager_name: String,
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    pub category_wins: u32,
    pub opponent_category_wins: u32,
    pub category_ties: u32,
}

impl Matchup {
    pub fn absorb(&mut self, other: &Matchup) {
        self.wins += other.wins;
        self.losses += other.losses;
        self.ties += other.ties;
        self.category_wins += other.category_wins;
        self.opponent_category_wins += other.opponent_category_wins;
        self.category_ties += other.category_ties;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundRobinResult {
    pub team_key: String,
    /// The team's category line, with FG%/FT% rewritten from the raw pairs.
    pub team: TeamCategoryLine,
    pub team_record: TeamRecord,
    pub matchups: Vec<Matchup>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyRoundRobinSnapshot {
    pub season: i32,
    pub week: u32,
    pub results: Vec<RoundRobinResult>,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct RoundRobinEngine {
    rules: CategoryRules,
    percentage_precision: usize,
}

impl Default for RoundRobinEngine {
    fn default() -> Self {
        RoundRobinEngine::new(CategoryRules::standard(), 3)
    }
}

impl RoundRobinEngine {
    pub fn new(rules: CategoryRules, percentage_precision: usize) -> Self {
        RoundRobinEngine {
            rules,
            percentage_precision,
        }
    }

    pub fn rules(&self) -> &CategoryRules {
        &self.rules
    }

    /// Run the all-play round robin over one week's complete set of team
    /// lines. Results come back in input order.
    pub fn run(
        &self,
        teams: &[TeamCategoryLine],
    ) -> Result<Vec<RoundRobinResult>, RoundRobinError> {
        if teams.len() < 2 {
            return Err(RoundRobinError::NotEnoughTeams { found: teams.len() });
        }
        let mut seen = HashSet::new();
        for team in teams {
            if !seen.insert(team.team_key.as_str()) {
                return Err(RoundRobinError::DuplicateTeam {
                    team_key: team.team_key.clone(),
                });
            }
        }
        if self.rules.is_empty() {
            warn!("round robin has no categories, every matchup is a tie");
        }

        // values[team][rule], at full precision.
        let values: Vec<Vec<f64>> = teams
            .iter()
            .map(|team| {
                self.rules
                    .iter()
                    .map(|rule| team.category_value(rule.category).value())
                    .collect()
            })
            .collect();

        let results: Vec<RoundRobinResult> = teams
            .iter()
            .enumerate()
            .map(|(i, team)| {
                let mut record = TeamRecord::for_rules(&self.rules);
                let mut matchups = Vec::with_capacity(teams.len() - 1);

                for (j, opponent) in teams.iter().enumerate() {
                    if i == j {
                        continue;
                    }
                    let matchup = self.compare(&values[i], &values[j], opponent, &mut record);
                    matchups.push(matchup);
                }

                debug!(
                    "team {}: {} ({}-{}-{} categories)",
                    team.team_key,
                    record.matchup_line(),
                    record.category_wins,
                    record.category_losses,
                    record.category_ties
                );

                RoundRobinResult {
                    team_key: team.team_key.clone(),
                    team: self.display_line(team),
                    team_record: record,
                    matchups,
                }
            })
            .collect();

        info!(
            "round robin complete: {} teams, {} categories",
            teams.len(),
            self.rules.len()
        );
        Ok(results)
    }

    /// Compare one team against one opponent across every category,
    /// accumulating category outcomes into `record`.
    fn compare(
        &self,
        ours: &[f64],
        theirs: &[f64],
        opponent: &TeamCategoryLine,
        record: &mut TeamRecord,
    ) -> Matchup {
        let mut matchup = Matchup {
            opponent_team_key: opponent.team_key.clone(),
            manager_name: opponent.manager_name.clone(),
            ..Matchup::default()
        };

        for (k, rule) in self.rules.iter().enumerate() {
            let cat = record.category_records.entry(rule.category).or_default();
            if ours[k] == theirs[k] {
                matchup.category_ties += 1;
                record.category_ties += 1;
                cat.ties += 1;
            } else if rule.direction.favors(ours[k], theirs[k]) {
                matchup.category_wins += 1;
                record.category_wins += 1;
                cat.wins += 1;
            } else {
                matchup.opponent_category_wins += 1;
                record.category_losses += 1;
                cat.losses += 1;
            }
        }

        match matchup.category_wins.cmp(&matchup.opponent_category_wins) {
            std::cmp::Ordering::Greater => {
                matchup.wins = 1;
                record.matchup_wins += 1;
            }
            std::cmp::Ordering::Less => {
                matchup.losses = 1;
                record.matchup_losses += 1;
            }
            std::cmp::Ordering::Equal => {
                matchup.ties = 1;
                record.matchup_ties += 1;
            }
        }

        matchup
    }

    /// Copy of the line with each active percentage rewritten from its raw
    /// pair for display.
    fn display_line(&self, team: &TeamCategoryLine) -> TeamCategoryLine {
        let mut line = team.clone();
        for rule in self.rules.iter() {
            let Some(ratio_key) = rule.category.ratio_key() else {
                continue;
            };
            if !team.stat_values.contains_key(ratio_key) {
                continue;
            }
            let value = team.category_value(rule.category).value();
            line.stat_values.insert(
                rule.category.label().to_string(),
                format_percentage(value, self.percentage_precision),
            );
        }
        line
    }
}
