// Season round-robin rollup: summed records, head-to-head history per
// opponent, and season category totals.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::engine::{Matchup, RoundRobinResult, TeamRecord, WeeklyRoundRobinSnapshot};
use crate::model::{
    format_count, format_percentage, CategoryRules, CategoryValue, TeamCategoryLine,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonRoundRobinSnapshot {
    pub season: i32,
    pub last_updated: DateTime<Utc>,
    pub weeks_included: Vec<u32>,
    pub results: Vec<RoundRobinResult>,
}

#[derive(Default)]
struct RatioTotal {
    makes: f64,
    attempts: f64,
}

struct TeamSeason {
    team_key: String,
    manager_name: String,
    record: TeamRecord,
    opponents: BTreeMap<String, Matchup>,
    counts: BTreeMap<&'static str, f64>,
    ratios: BTreeMap<&'static str, RatioTotal>,
}

impl TeamSeason {
    fn new(result: &RoundRobinResult) -> Self {
        TeamSeason {
            team_key: result.team_key.clone(),
            manager_name: result.team.manager_name.clone(),
            record: TeamRecord::default(),
            opponents: BTreeMap::new(),
            counts: BTreeMap::new(),
            ratios: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SeasonRoundRobinAggregator {
    rules: CategoryRules,
    percentage_precision: usize,
}

impl Default for SeasonRoundRobinAggregator {
    fn default() -> Self {
        SeasonRoundRobinAggregator::new(CategoryRules::standard(), 3)
    }
}

impl SeasonRoundRobinAggregator {
    pub fn new(rules: CategoryRules, percentage_precision: usize) -> Self {
        SeasonRoundRobinAggregator {
            rules,
            percentage_precision,
        }
    }

    /// Sum every weekly round robin into season standings. Returns `None`
    /// when there are no weeks to aggregate.
    pub fn aggregate(
        &self,
        weeks: &[WeeklyRoundRobinSnapshot],
        last_updated: DateTime<Utc>,
    ) -> Option<SeasonRoundRobinSnapshot> {
        let mut ordered: Vec<&WeeklyRoundRobinSnapshot> = weeks.iter().collect();
        ordered.sort_by_key(|w| w.week);
        let season = ordered.first()?.season;

        let mut teams: Vec<TeamSeason> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for week in &ordered {
            debug!(
                "aggregating round-robin week {} ({} teams)",
                week.week,
                week.results.len()
            );
            for result in &week.results {
                let idx = *index.entry(result.team_key.clone()).or_insert_with(|| {
                    teams.push(TeamSeason::new(result));
                    teams.len() - 1
                });
                let team = &mut teams[idx];

                team.record.absorb(&result.team_record);
                for matchup in &result.matchups {
                    team.opponents
                        .entry(matchup.opponent_team_key.clone())
                        .or_insert_with(|| Matchup {
                            opponent_team_key: matchup.opponent_team_key.clone(),
                            manager_name: matchup.manager_name.clone(),
                            ..Matchup::default()
                        })
                        .absorb(matchup);
                }
                self.add_stats(team, &result.team);
            }
        }

        let mut results: Vec<RoundRobinResult> =
            teams.into_iter().map(|t| self.finish(t)).collect();
        results.sort_by(|a, b| {
            let (ra, rb) = (&a.team_record, &b.team_record);
            rb.matchup_wins
                .cmp(&ra.matchup_wins)
                .then_with(|| rb.matchup_ties.cmp(&ra.matchup_ties))
                .then_with(|| ra.matchup_losses.cmp(&rb.matchup_losses))
                .then_with(|| a.team_key.cmp(&b.team_key))
        });

        let weeks_included: Vec<u32> = ordered.iter().map(|w| w.week).collect();
        info!(
            "season {} round robin: {} teams over weeks {:?}",
            season,
            results.len(),
            weeks_included
        );

        Some(SeasonRoundRobinSnapshot {
            season,
            last_updated,
            weeks_included,
            results,
        })
    }

    fn add_stats(&self, team: &mut TeamSeason, line: &TeamCategoryLine) {
        for rule in self.rules.iter() {
            let category = rule.category;
            match category.ratio_key() {
                Some(ratio_key) => {
                    let raw = line.stat_values.get(ratio_key);
                    if let Some(CategoryValue::Ratio { makes, attempts }) =
                        raw.and_then(|r| CategoryValue::parse(r))
                    {
                        let total = team.ratios.entry(ratio_key).or_default();
                        total.makes += makes;
                        total.attempts += attempts;
                    }
                }
                None => {
                    *team.counts.entry(category.label()).or_insert(0.0) +=
                        line.category_value(category).value();
                }
            }
        }
    }

    fn finish(&self, team: TeamSeason) -> RoundRobinResult {
        let mut line = TeamCategoryLine::new(&team.team_key, &team.manager_name);

        for rule in self.rules.iter() {
            let category = rule.category;
            match category.ratio_key() {
                Some(ratio_key) => {
                    let Some(total) = team.ratios.get(ratio_key) else {
                        continue;
                    };
                    let pair = CategoryValue::Ratio {
                        makes: total.makes,
                        attempts: total.attempts,
                    };
                    line.stat_values.insert(
                        ratio_key.to_string(),
                        format!(
                            "{}/{}",
                            format_count(total.makes),
                            format_count(total.attempts)
                        ),
                    );
                    line.stat_values.insert(
                        category.label().to_string(),
                        format_percentage(pair.value(), self.percentage_precision),
                    );
                }
                None => {
                    let value = team.counts.get(category.label()).copied().unwrap_or(0.0);
                    line.stat_values
                        .insert(category.label().to_string(), format_count(value));
                }
            }
        }

        RoundRobinResult {
            team_key: team.team_key,
            team: line,
            team_record: team.record,
            matchups: team.opponents.into_values().collect(),
        }
    }
}
