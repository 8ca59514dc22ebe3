// Weekly best-ball scoring: optimal lineup and total for every team.

use rayon::prelude::*;
use tracing::debug;

use super::lineup::assign_best_ball;
use crate::model::{TeamWeekResult, WeeklyBestBallSnapshot};

/// Assign slots for one team and set its total to the sum of its starters.
pub fn score_team(team: &mut TeamWeekResult) {
    let lineup_total = assign_best_ball(&mut team.players);
    team.total_best_ball_points = team.starter_points();
    debug!(
        "scored team {}: {} players, lineup {:.2}, total {:.2}",
        team.team_key,
        team.players.len(),
        lineup_total,
        team.total_best_ball_points
    );
}

/// Score every team in place. Teams share nothing, so they are scored in
/// parallel and joined before returning.
pub fn score_week(teams: &mut [TeamWeekResult]) {
    teams.par_iter_mut().for_each(score_team);
}

/// Score a whole weekly snapshot in place.
pub fn score_snapshot(snapshot: &mut WeeklyBestBallSnapshot) {
    score_week(&mut snapshot.teams);
    debug!(
        "scored week {} of {}: {} teams",
        snapshot.week,
        snapshot.season,
        snapshot.teams.len()
    );
}
