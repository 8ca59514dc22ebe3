// Best-ball scoring: optimal weekly lineups, daily merges and season rollup.

pub mod lineup;
pub mod merge;
pub mod season;
pub mod weekly;
