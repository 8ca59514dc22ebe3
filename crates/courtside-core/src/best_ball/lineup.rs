// Optimal best-ball lineup search.
//
// Slots are decided in `BestBallSlot::LINEUP` order (PG, SG, SF, PF, C,
// UTIL1, UTIL2). For each slot every unused, eligible player that fits is
// tried in roster order; a slot is left empty only when nobody fits. The
// first assignment reaching the maximum total wins, so results depend on
// roster order when several lineups tie.

use crate::model::{BestBallSlot, PlayerStatLine};

const SLOT_COUNT: usize = BestBallSlot::LINEUP.len();

/// Slack on the pruning bound so float summation order never discards a
/// branch that could still win.
const BOUND_EPSILON: f64 = 1e-6;

/// A lineup: for each decision slot, the roster index of its player.
#[derive(Debug, Clone, PartialEq)]
pub struct Lineup {
    pub slots: [Option<usize>; SLOT_COUNT],
    pub total: f64,
}

impl Lineup {
    fn empty() -> Self {
        Lineup {
            slots: [None; SLOT_COUNT],
            total: 0.0,
        }
    }

    /// Roster index of the player in `slot`. Always `None` for Bench.
    pub fn player_in(&self, slot: BestBallSlot) -> Option<usize> {
        let idx = BestBallSlot::LINEUP.iter().position(|s| *s == slot)?;
        self.slots[idx]
    }

    /// Slot held by the player at roster index `player`, Bench if none.
    pub fn slot_of(&self, player: usize) -> BestBallSlot {
        self.slots
            .iter()
            .position(|p| *p == Some(player))
            .map(|idx| BestBallSlot::LINEUP[idx])
            .unwrap_or(BestBallSlot::Bench)
    }

    pub fn starter_count(&self) -> usize {
        self.slots.iter().filter(|p| p.is_some()).count()
    }
}

/// Find the highest-scoring lineup for one team's weekly roster.
///
/// Players flagged ineligible are never considered. Does not touch the
/// players; see [`apply_lineup`].
pub fn optimize(players: &[PlayerStatLine]) -> Lineup {
    Search::new(players, true).run()
}

/// Write a lineup's slots onto the roster. Everyone not in the lineup,
/// including players with a stale slot from an earlier run, goes to Bench.
pub fn apply_lineup(players: &mut [PlayerStatLine], lineup: &Lineup) {
    for player in players.iter_mut() {
        player.best_ball_slot = BestBallSlot::Bench;
    }
    for (slot, assigned) in BestBallSlot::LINEUP.iter().zip(lineup.slots.iter()) {
        if let Some(idx) = assigned {
            players[*idx].best_ball_slot = *slot;
        }
    }
}

/// Optimize and apply in one step, returning the lineup total.
pub fn assign_best_ball(players: &mut [PlayerStatLine]) -> f64 {
    let lineup = optimize(players);
    apply_lineup(players, &lineup);
    lineup.total
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

struct Search<'a> {
    players: &'a [PlayerStatLine],
    /// Eligible players by descending points, for the pruning bound.
    by_points: Vec<usize>,
    used: Vec<bool>,
    current: [Option<usize>; SLOT_COUNT],
    prune: bool,
}

impl<'a> Search<'a> {
    fn new(players: &'a [PlayerStatLine], prune: bool) -> Self {
        let mut by_points: Vec<usize> = (0..players.len())
            .filter(|&i| players[i].eligible)
            .collect();
        by_points.sort_by(|&a, &b| {
            players[b]
                .fantasy_points
                .total_cmp(&players[a].fantasy_points)
        });

        Search {
            players,
            by_points,
            used: vec![false; players.len()],
            current: [None; SLOT_COUNT],
            prune,
        }
    }

    fn run(mut self) -> Lineup {
        self.descend(0, 0.0, None).unwrap_or_else(Lineup::empty)
    }

    /// Decide slot `depth` and everything after it. `best` is the best
    /// complete lineup found so far; the returned value replaces it.
    fn descend(&mut self, depth: usize, running: f64, best: Option<Lineup>) -> Option<Lineup> {
        if depth == SLOT_COUNT {
            return match best {
                Some(b) if running <= b.total => Some(b),
                _ => Some(Lineup {
                    slots: self.current,
                    total: running,
                }),
            };
        }

        if let Some(b) = &best {
            if self.prune && self.upper_bound(depth, running) + BOUND_EPSILON <= b.total {
                return best;
            }
        }

        let players = self.players;
        let slot = BestBallSlot::LINEUP[depth];
        let mut best = best;
        let mut any_candidate = false;

        for (idx, player) in players.iter().enumerate() {
            if self.used[idx] || !player.eligible || !slot.accepts(&player.positions) {
                continue;
            }
            any_candidate = true;

            self.used[idx] = true;
            self.current[depth] = Some(idx);
            best = self.descend(depth + 1, running + player.fantasy_points, best);
            self.current[depth] = None;
            self.used[idx] = false;
        }

        if !any_candidate {
            best = self.descend(depth + 1, running, best);
        }

        best
    }

    /// Most any completion from `depth` could add: the top remaining
    /// positive scores, one per open slot.
    fn upper_bound(&self, depth: usize, running: f64) -> f64 {
        let open = SLOT_COUNT - depth;
        running
            + self
                .by_points
                .iter()
                .filter(|&&i| !self.used[i])
                .map(|&i| self.players[i].fantasy_points)
                .take_while(|&fp| fp > 0.0)
                .take(open)
                .sum::<f64>()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Position;
    use crate::model::Position::*;

    fn player(key: &str, positions: &[Position], fp: f64) -> PlayerStatLine {
        let mut p = PlayerStatLine::new(key, key, positions.to_vec());
        p.fantasy_points = fp;
        p
    }

    /// Tiny deterministic generator for roster fixtures.
    struct Lcg(u64);

    impl Lcg {
        fn next(&mut self) -> u64 {
            self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            self.0 >> 33
        }
    }

    fn random_roster(seed: u64, size: usize) -> Vec<PlayerStatLine> {
        let all = [PointGuard, ShootingGuard, SmallForward, PowerForward, Center];
        let mut rng = Lcg(seed);
        (0..size)
            .map(|i| {
                let positions: Vec<Position> = all
                    .iter()
                    .copied()
                    .filter(|_| rng.next() % 3 == 0)
                    .collect();
                // Whole-point scores make ties common.
                let fp = (rng.next() % 12) as f64 * 5.0 - 5.0;
                let mut p = player(&format!("p{i}"), &positions, fp);
                p.eligible = rng.next() % 8 != 0;
                p
            })
            .collect()
    }

    #[test]
    fn guard_forward_scenario() {
        let players = vec![
            player("A", &[PointGuard], 20.0),
            player("B", &[PointGuard, ShootingGuard], 15.0),
            player("C", &[SmallForward], 10.0),
        ];
        let lineup = optimize(&players);

        assert_eq!(lineup.total, 45.0);
        assert_eq!(lineup.player_in(BestBallSlot::PointGuard), Some(0));
        // The league's worked example lists B at UTIL1 with SG left empty.
        // Slot matching is by containment, so B's PG,SG set fills SG first
        // and the total is the same 45 either way.
        assert_eq!(lineup.player_in(BestBallSlot::ShootingGuard), Some(1));
        assert_eq!(lineup.player_in(BestBallSlot::SmallForward), Some(2));
        assert_eq!(lineup.starter_count(), 3);
        for slot in [
            BestBallSlot::PowerForward,
            BestBallSlot::Center,
            BestBallSlot::Util1,
            BestBallSlot::Util2,
        ] {
            assert_eq!(lineup.player_in(slot), None, "{slot}");
        }
    }

    #[test]
    fn second_point_guard_overflows_to_util() {
        let mut players = vec![
            player("A", &[PointGuard], 20.0),
            player("B", &[PointGuard], 15.0),
            player("C", &[SmallForward], 10.0),
        ];
        let total = assign_best_ball(&mut players);
        assert_eq!(total, 45.0);
        assert_eq!(players[0].best_ball_slot, BestBallSlot::PointGuard);
        assert_eq!(players[1].best_ball_slot, BestBallSlot::Util1);
        assert_eq!(players[2].best_ball_slot, BestBallSlot::SmallForward);
    }

    #[test]
    fn ineligible_players_never_start() {
        let mut injured = player("hurt", &[Center], 99.0);
        injured.eligible = false;
        let players = vec![injured, player("ok", &[Center], 5.0)];
        let lineup = optimize(&players);
        assert_eq!(lineup.player_in(BestBallSlot::Center), Some(1));
        assert_eq!(lineup.slot_of(0), BestBallSlot::Bench);
        assert_eq!(lineup.total, 5.0);
    }

    #[test]
    fn empty_roster_is_empty_lineup() {
        let lineup = optimize(&[]);
        assert_eq!(lineup.starter_count(), 0);
        assert_eq!(lineup.total, 0.0);
    }

    #[test]
    fn picks_higher_scorer_for_contested_slot() {
        let players = vec![
            player("low", &[Center], 10.0),
            player("high", &[Center], 30.0),
            player("g1", &[PointGuard], 1.0),
            player("g2", &[PointGuard], 1.0),
            player("g3", &[PointGuard], 1.0),
        ];
        let lineup = optimize(&players);
        // Both centers start (one at C, one at UTIL); a guard sits.
        assert_eq!(lineup.total, 42.0);
        assert_eq!(lineup.player_in(BestBallSlot::Center), Some(0));
        assert_eq!(lineup.slot_of(1), BestBallSlot::Util1);
    }

    #[test]
    fn equal_totals_keep_first_found_lineup() {
        let players: Vec<PlayerStatLine> = (0..8)
            .map(|i| player(&format!("g{i}"), &[PointGuard], 10.0))
            .collect();
        let lineup = optimize(&players);
        assert_eq!(lineup.total, 30.0);
        assert_eq!(lineup.player_in(BestBallSlot::PointGuard), Some(0));
        assert_eq!(lineup.player_in(BestBallSlot::Util1), Some(1));
        assert_eq!(lineup.player_in(BestBallSlot::Util2), Some(2));
        assert_eq!(lineup.player_in(BestBallSlot::ShootingGuard), None);
    }

    #[test]
    fn negative_scorers_still_fill_open_slots() {
        let players = vec![player("cold", &[Center], -4.0)];
        let lineup = optimize(&players);
        assert_eq!(lineup.player_in(BestBallSlot::Center), Some(0));
        assert_eq!(lineup.total, -4.0);
    }

    #[test]
    fn apply_lineup_clears_stale_slots() {
        let mut players = vec![
            player("a", &[PointGuard], 10.0),
            player("b", &[Center], 8.0),
        ];
        players[1].best_ball_slot = BestBallSlot::PointGuard;
        let mut ineligible = player("c", &[SmallForward], 3.0);
        ineligible.eligible = false;
        ineligible.best_ball_slot = BestBallSlot::SmallForward;
        players.push(ineligible);

        assign_best_ball(&mut players);
        assert_eq!(players[0].best_ball_slot, BestBallSlot::PointGuard);
        assert_eq!(players[1].best_ball_slot, BestBallSlot::Center);
        assert_eq!(players[2].best_ball_slot, BestBallSlot::Bench);
    }

    #[test]
    fn pruning_matches_exhaustive_search() {
        for seed in 0..60 {
            let players = random_roster(seed, 6 + (seed as usize % 7));
            let pruned = Search::new(&players, true).run();
            let full = Search::new(&players, false).run();
            assert_eq!(pruned, full, "seed {seed}");
        }
    }

    #[test]
    fn lineups_are_injective_and_respect_positions() {
        for seed in 100..160 {
            let players = random_roster(seed, 12);
            let lineup = optimize(&players);

            let mut seen = std::collections::HashSet::new();
            for (slot, assigned) in BestBallSlot::LINEUP.iter().zip(lineup.slots.iter()) {
                if let Some(idx) = assigned {
                    assert!(seen.insert(*idx), "seed {seed}: player {idx} in two slots");
                    assert!(players[*idx].eligible);
                    assert!(slot.accepts(&players[*idx].positions));
                }
            }

            // A core slot is empty only if no benched eligible player fits it.
            for (slot, assigned) in BestBallSlot::LINEUP.iter().zip(lineup.slots.iter()) {
                if assigned.is_none() && !slot.is_util() {
                    let fits = players.iter().enumerate().any(|(i, p)| {
                        p.eligible && !seen.contains(&i) && slot.accepts(&p.positions)
                    });
                    assert!(!fits, "seed {seed}: {slot} left empty");
                }
            }

            let starters: f64 = lineup
                .slots
                .iter()
                .flatten()
                .map(|&i| players[i].fantasy_points)
                .sum();
            assert_eq!(starters, lineup.total, "seed {seed}");
        }
    }
}
