// Category round robin: weekly all-play engine and season rollup.

pub mod engine;
pub mod season;

pub use engine::{
    CategoryRecord, Matchup, RoundRobinEngine, RoundRobinError, RoundRobinResult, TeamRecord,
    WeeklyRoundRobinSnapshot,
};
pub use season::{SeasonRoundRobinAggregator, SeasonRoundRobinSnapshot};
