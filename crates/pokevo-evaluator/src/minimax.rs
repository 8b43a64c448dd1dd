//! Depth-limited adversarial search with alpha-beta pruning.
//!
//! One unit of depth is one full round: the searching side picks a move (max layer), the
//! opponent picks a reply (min layer), and only then is the turn resolved on a cloned
//! [`Battle`]. The search recurses from the resolved position with one less unit of depth
//! and scores leaves with [`static_eval::evaluate`].
//!
//! ```text
//! max: own move ──► min: reply ──► submit_turn(clone) ──► max (depth - 1) ...
//! ```
//!
//! # Determinism
//!
//! Each simulated turn draws its randomness from a [`Pcg32`] seeded by the decision seed
//! and the path of choices leading to it. Within a decision the tree is therefore a fixed
//! function of the position, and pruning can only skip subtrees, never change the chosen
//! move. Different decisions still differ because [`MinimaxSelector`] draws a fresh seed
//! from the caller's RNG every time.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use pokevo_engine::{Battle, CombatantSpec, MoveChoice, MoveId, Nature, Side, SpeciesData, StatTable};
//! use pokevo_evaluator::minimax::{self, SearchParams};
//!
//! let spec = |name: &str, moves: &[&str]| {
//!     let species = SpeciesData::from_name(name).unwrap();
//!     Arc::new(CombatantSpec {
//!         name: name.to_owned(),
//!         base_stats: species.base_stats,
//!         types: species.types.iter().copied().collect(),
//!         ability: species.ability,
//!         nature: Nature::Hardy,
//!         evs: StatTable::splat(0),
//!         moves: moves.iter().map(|m| MoveId::from_name(m).unwrap()).collect(),
//!     })
//! };
//! let battle = Battle::start(
//!     spec("garchomp", &["dragon-claw", "earthquake"]),
//!     spec("heatran", &["lava-plume", "earth-power"]),
//! )
//! .unwrap();
//!
//! let outcome = minimax::search(&battle, Side::A, &SearchParams::default(), 42);
//! assert_eq!(outcome.choice, MoveChoice::Move(1));
//! ```

use pokevo_engine::{Battle, MAX_MOVES, MoveChoice, Side};
use rand::{RngCore, SeedableRng as _};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::{
    move_selector::{MoveSelector, ordered_choices},
    static_eval,
};

/// Search configuration threaded through every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchParams {
    /// Full rounds to look ahead.
    pub depth: u32,
    /// Enables alpha-beta cutoffs.
    pub pruning: bool,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            depth: 2,
            pruning: true,
        }
    }
}

/// Result of one search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchOutcome {
    pub choice: MoveChoice,
    pub score: f32,
    /// Simulated turns resolved during the search.
    pub nodes: u64,
}

/// Searches for the best move for `side`.
///
/// A side with a single legal choice gets it back immediately with zero nodes.
#[must_use]
pub fn search(battle: &Battle, side: Side, params: &SearchParams, seed: u64) -> SearchOutcome {
    let choices = ordered_choices(battle, side);
    if let [(only, _)] = choices.as_slice() {
        return SearchOutcome {
            choice: *only,
            score: static_eval::evaluate(battle, side),
            nodes: 0,
        };
    }

    let mut searcher = Searcher {
        side,
        params,
        seed,
        nodes: 0,
    };
    let depth = params.depth.max(1);
    let mut alpha = f32::NEG_INFINITY;
    let mut best: Option<(MoveChoice, f32)> = None;
    for (choice, _) in choices {
        let score = searcher.min_layer(battle, choice, depth, alpha, f32::INFINITY, seed);
        if best.is_none_or(|(_, best_score)| score > best_score) {
            best = Some((choice, score));
        }
        if params.pruning {
            alpha = alpha.max(score);
        }
    }

    let (choice, score) = best.unwrap_or_else(|| (choices_fallback(battle, side), 0.0));
    SearchOutcome {
        choice,
        score,
        nodes: searcher.nodes,
    }
}

fn choices_fallback(battle: &Battle, side: Side) -> MoveChoice {
    battle
        .legal_choices(side)
        .first()
        .copied()
        .unwrap_or(MoveChoice::Struggle)
}

struct Searcher<'a> {
    side: Side,
    params: &'a SearchParams,
    seed: u64,
    nodes: u64,
}

impl Searcher<'_> {
    fn max_layer(&mut self, battle: &Battle, depth: u32, mut alpha: f32, beta: f32, key: u64) -> f32 {
        if depth == 0 || battle.is_finished() {
            return static_eval::evaluate(battle, self.side);
        }
        let mut value = f32::NEG_INFINITY;
        for (choice, _) in ordered_choices(battle, self.side) {
            value = value.max(self.min_layer(battle, choice, depth, alpha, beta, key));
            if self.params.pruning {
                alpha = alpha.max(value);
                if alpha >= beta {
                    break;
                }
            }
        }
        value
    }

    fn min_layer(
        &mut self,
        battle: &Battle,
        own: MoveChoice,
        depth: u32,
        alpha: f32,
        mut beta: f32,
        key: u64,
    ) -> f32 {
        let opponent = self.side.opponent();
        let mut value = f32::INFINITY;
        let mut resolved = false;
        for (reply, _) in ordered_choices(battle, opponent) {
            let child_key = mix(key, depth, own, reply);
            let (a, b) = match self.side {
                Side::A => (own, reply),
                Side::B => (reply, own),
            };
            let mut next = battle.clone();
            let mut rng = Pcg32::seed_from_u64(self.seed ^ child_key);
            self.nodes += 1;
            if let Err(e) = next.submit_turn(a, b, &mut rng) {
                log::trace!("skipping unresolvable branch: {e}");
                continue;
            }
            resolved = true;
            value = value.min(self.max_layer(&next, depth - 1, alpha, beta, child_key));
            if self.params.pruning {
                beta = beta.min(value);
                if alpha >= beta {
                    break;
                }
            }
        }
        if resolved {
            value
        } else {
            static_eval::evaluate(battle, self.side)
        }
    }
}

fn choice_index(choice: MoveChoice) -> u64 {
    match choice {
        MoveChoice::Move(slot) => slot as u64,
        MoveChoice::Struggle => MAX_MOVES as u64,
    }
}

/// Derives a child path key (splitmix64 finalizer).
fn mix(parent: u64, depth: u32, own: MoveChoice, reply: MoveChoice) -> u64 {
    let step = (u64::from(depth) << 16) | (choice_index(own) << 8) | choice_index(reply);
    let mut z = parent
        .rotate_left(17)
        .wrapping_add(step)
        .wrapping_add(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

/// Selects moves by [`search`], with a fresh decision seed per call.
#[derive(Debug, Default, Clone, Copy)]
pub struct MinimaxSelector {
    params: SearchParams,
}

impl MinimaxSelector {
    #[must_use]
    pub fn new(params: SearchParams) -> Self {
        Self { params }
    }
}

impl MoveSelector for MinimaxSelector {
    fn select_move(&self, battle: &Battle, side: Side, rng: &mut dyn RngCore) -> MoveChoice {
        let outcome = search(battle, side, &self.params, rng.next_u64());
        log::trace!(
            "{side} turn {}: {:?} scored {:.1} over {} nodes",
            battle.turn(),
            outcome.choice,
            outcome.score,
            outcome.nodes
        );
        outcome.choice
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pokevo_engine::{CombatantSpec, MoveId, Nature, SpeciesData, StatTable};
    use rand::{Rng as _, SeedableRng as _};

    use super::*;

    fn spec(species: &str, moves: &[&str]) -> Arc<CombatantSpec> {
        let data = SpeciesData::from_name(species).unwrap();
        Arc::new(CombatantSpec {
            name: species.to_owned(),
            base_stats: data.base_stats,
            types: data.types.iter().copied().collect(),
            ability: data.ability,
            nature: Nature::Hardy,
            evs: StatTable::splat(0),
            moves: moves.iter().map(|m| MoveId::from_name(m).unwrap()).collect(),
        })
    }

    fn matchups() -> Vec<Battle> {
        [
            (
                spec("garchomp", &["earthquake", "dragon-claw", "swords-dance", "stealth-rock"]),
                spec("salamence", &["dragon-dance", "dragon-claw", "earthquake", "roost"]),
            ),
            (
                spec("scizor", &["bullet-punch", "swords-dance", "roost", "u-turn"]),
                spec("blissey", &["seismic-toss", "toxic", "soft-boiled", "protect"]),
            ),
            (
                spec("lucario", &["close-combat", "swords-dance", "extreme-speed", "iron-head"]),
                spec("rotom", &["hydro-pump", "thunderbolt", "will-o-wisp", "shadow-ball"]),
            ),
        ]
        .into_iter()
        .map(|(a, b)| Battle::start(a, b).unwrap())
        .collect()
    }

    #[test]
    fn test_pruning_does_not_change_choice() {
        let mut rng = Pcg32::seed_from_u64(2024);
        for battle in matchups() {
            for side in Side::BOTH {
                for _ in 0..4 {
                    let seed = rng.random();
                    let full = search(
                        &battle,
                        side,
                        &SearchParams {
                            depth: 2,
                            pruning: false,
                        },
                        seed,
                    );
                    let pruned = search(&battle, side, &SearchParams::default(), seed);
                    assert_eq!(full.choice, pruned.choice);
                    assert!((full.score - pruned.score).abs() < 1e-3);
                    assert!(pruned.nodes <= full.nodes);
                }
            }
        }
    }

    #[test]
    fn test_pruning_cuts_nodes() {
        let battle = &matchups()[0];
        let full = search(
            battle,
            Side::A,
            &SearchParams {
                depth: 2,
                pruning: false,
            },
            7,
        );
        let pruned = search(battle, Side::A, &SearchParams::default(), 7);
        assert!(pruned.nodes < full.nodes);
    }

    #[test]
    fn test_single_choice_skips_search() {
        let battle = Battle::start(
            spec("blissey", &["seismic-toss"]),
            spec("garchomp", &["earthquake", "dragon-claw"]),
        )
        .unwrap();
        let outcome = search(&battle, Side::A, &SearchParams::default(), 0);
        assert_eq!(outcome.choice, MoveChoice::Move(0));
        assert_eq!(outcome.nodes, 0);
    }

    #[test]
    fn test_search_finds_knockout() {
        let battle = Battle::start(
            spec("garchomp", &["dragon-claw", "earthquake"]),
            spec("heatran", &["lava-plume", "earth-power"]),
        )
        .unwrap();
        let outcome = search(
            &battle,
            Side::A,
            &SearchParams {
                depth: 1,
                pruning: true,
            },
            1,
        );
        assert_eq!(outcome.choice, MoveChoice::Move(1));
        assert!(outcome.score > static_eval::FAINT_SCORE);
    }

    #[test]
    fn test_selector_returns_legal_choice() {
        let mut rng = Pcg32::seed_from_u64(5);
        let selector = MinimaxSelector::new(SearchParams {
            depth: 1,
            pruning: true,
        });
        for battle in matchups() {
            for side in Side::BOTH {
                let choice = selector.select_move(&battle, side, &mut rng);
                assert!(battle.legal_choices(side).contains(&choice));
            }
        }
    }
}
