// Library root: scoring and aggregation engine for best-ball and
// category round-robin fantasy basketball standings.

pub mod best_ball;
pub mod config;
pub mod model;
pub mod round_robin;
