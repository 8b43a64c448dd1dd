//! Fitness evaluation against a gauntlet.
//!
//! Every genome battles each gauntlet opponent a fixed number of times, with fresh
//! combatants for every battle. Wins against one opponent have diminishing value:
//!
//! ```text
//! fitness = Σ over opponents of rewards[0] + rewards[1] + ... (one term per win)
//! ```
//!
//! With the default [`WinRewards`] of `[1000, 250, 100]`, three battles per opponent
//! give `0`, `1000`, `1250` or `1350` for that opponent. Wins beyond the length of the
//! reward table add nothing.
//!
//! Failures never escape an evaluation:
//!
//! - an invalid genome scores zero
//! - invalid opponents are dropped when the evaluator is built
//! - a battle whose turn cannot be resolved is abandoned and not counted as a win

use std::{fmt, sync::Arc};

use pokevo_engine::{Battle, CombatantSpec, Side, SpecError, TurnError};
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::{
    gauntlet::{self, OpponentRecord},
    move_selector::MoveSelector,
};

/// Reward for the first, second, third... win against the same opponent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WinRewards(Vec<f32>);

impl Default for WinRewards {
    fn default() -> Self {
        Self(vec![1000.0, 250.0, 100.0])
    }
}

impl WinRewards {
    #[must_use]
    pub fn new(rewards: Vec<f32>) -> Self {
        Self(rewards)
    }

    /// Total reward for `wins` wins against one opponent.
    #[must_use]
    pub fn score(&self, wins: usize) -> f32 {
        self.0.iter().take(wins).sum()
    }
}

/// How a single battle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BattleResult {
    Won(Side),
    Draw,
    /// A turn could not be resolved; the battle was abandoned.
    Aborted(TurnError),
}

/// Runs one battle to completion, both sides choosing with `selector`.
pub fn play_battle(
    a: Arc<CombatantSpec>,
    b: Arc<CombatantSpec>,
    selector: &dyn MoveSelector,
    rng: &mut dyn RngCore,
) -> Result<BattleResult, SpecError> {
    let mut battle = Battle::start(a, b)?;
    while !battle.is_finished() {
        let choice_a = selector.select_move(&battle, Side::A, rng);
        let choice_b = selector.select_move(&battle, Side::B, rng);
        if let Err(e) = battle.submit_turn(choice_a, choice_b, rng) {
            return Ok(BattleResult::Aborted(e));
        }
    }
    Ok(battle
        .winner()
        .map_or(BattleResult::Draw, BattleResult::Won))
}

/// Result of evaluating one combatant.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FitnessReport {
    pub fitness: f32,
    pub wins: usize,
    /// Distinct opponents beaten at least once.
    pub opponents_defeated: usize,
    pub aborted_battles: usize,
}

/// Scores combatant specs.
pub trait FitnessEvaluator: fmt::Debug + Send + Sync {
    fn evaluate(&self, spec: &CombatantSpec, rng: &mut dyn RngCore) -> FitnessReport;
}

/// Scores a combatant by battling the gauntlet.
#[derive(Debug)]
pub struct GauntletEvaluator {
    opponents: Vec<(String, Arc<CombatantSpec>)>,
    battles_per_opponent: usize,
    rewards: WinRewards,
    selector: Box<dyn MoveSelector>,
}

impl GauntletEvaluator {
    /// Default number of battles against each opponent.
    pub const DEFAULT_BATTLES_PER_OPPONENT: usize = 3;

    /// Builds an evaluator; opponents that fail to resolve are logged and skipped.
    #[must_use]
    pub fn new(
        records: &[OpponentRecord],
        battles_per_opponent: usize,
        rewards: WinRewards,
        selector: Box<dyn MoveSelector>,
    ) -> Self {
        Self {
            opponents: gauntlet::resolve(records),
            battles_per_opponent,
            rewards,
            selector,
        }
    }

    #[must_use]
    pub fn opponent_count(&self) -> usize {
        self.opponents.len()
    }
}

impl FitnessEvaluator for GauntletEvaluator {
    fn evaluate(&self, spec: &CombatantSpec, rng: &mut dyn RngCore) -> FitnessReport {
        if let Err(e) = spec.validate() {
            log::warn!("invalid genome {}, scoring zero: {e}", spec.name);
            return FitnessReport::default();
        }
        let spec = Arc::new(spec.clone());

        let mut report = FitnessReport::default();
        for (name, opponent) in &self.opponents {
            let mut wins = 0;
            for _ in 0..self.battles_per_opponent {
                match play_battle(Arc::clone(&spec), Arc::clone(opponent), &*self.selector, rng) {
                    Ok(BattleResult::Won(Side::A)) => wins += 1,
                    Ok(BattleResult::Won(Side::B) | BattleResult::Draw) => {}
                    Ok(BattleResult::Aborted(e)) => {
                        log::debug!("battle of {} against {name} aborted: {e}", spec.name);
                        report.aborted_battles += 1;
                    }
                    Err(e) => {
                        log::warn!("battle of {} against {name} could not start: {e}", spec.name);
                        report.aborted_battles += 1;
                    }
                }
            }
            report.fitness += self.rewards.score(wins);
            report.wins += wins;
            if wins > 0 {
                report.opponents_defeated += 1;
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use pokevo_engine::{MoveChoice, MoveId, Nature, SpeciesData, StatTable};
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;
    use crate::move_selector::GreedySelector;

    fn spec(species: &str, moves: &[&str]) -> CombatantSpec {
        let data = SpeciesData::from_name(species).unwrap();
        CombatantSpec {
            name: species.to_owned(),
            base_stats: data.base_stats,
            types: data.types.iter().copied().collect(),
            ability: data.ability,
            nature: Nature::Hardy,
            evs: StatTable::splat(0),
            moves: moves.iter().map(|m| MoveId::from_name(m).unwrap()).collect(),
        }
    }

    /// Always picks a slot that does not exist.
    #[derive(Debug)]
    struct BrokenSelector;

    impl MoveSelector for BrokenSelector {
        fn select_move(&self, _battle: &Battle, _side: Side, _rng: &mut dyn RngCore) -> MoveChoice {
            MoveChoice::Move(7)
        }
    }

    #[test]
    fn test_diminishing_rewards() {
        let rewards = WinRewards::default();
        let scores: Vec<f32> = (0..=4).map(|w| rewards.score(w)).collect();
        assert_eq!(scores, [0.0, 1000.0, 1250.0, 1350.0, 1350.0]);
    }

    #[test]
    fn test_sure_wins_score_full_rewards() {
        let evaluator = GauntletEvaluator::new(
            &gauntlet::simple_gauntlet()[3..4],
            3,
            WinRewards::default(),
            Box::new(GreedySelector::new()),
        );
        assert_eq!(evaluator.opponent_count(), 1);
        let mut rng = Pcg32::seed_from_u64(8);
        let mut chomp = spec("garchomp", &["earthquake"]);
        chomp.nature = Nature::Jolly;
        chomp.evs = StatTable::new(0, 252, 0, 0, 6, 252);
        let report = evaluator.evaluate(&chomp, &mut rng);
        assert_eq!(report.wins, 3);
        assert_eq!(report.opponents_defeated, 1);
        assert!((report.fitness - 1350.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_invalid_genome_scores_zero() {
        let evaluator = GauntletEvaluator::new(
            &gauntlet::simple_gauntlet(),
            3,
            WinRewards::default(),
            Box::new(GreedySelector::new()),
        );
        let mut rng = Pcg32::seed_from_u64(0);
        let mut broken = spec("garchomp", &["earthquake"]);
        broken.moves.clear();
        assert_eq!(evaluator.evaluate(&broken, &mut rng), FitnessReport::default());
    }

    #[test]
    fn test_aborted_battles_are_absorbed() {
        let evaluator = GauntletEvaluator::new(
            &gauntlet::simple_gauntlet()[..2],
            2,
            WinRewards::default(),
            Box::new(BrokenSelector),
        );
        let mut rng = Pcg32::seed_from_u64(0);
        let report = evaluator.evaluate(&spec("garchomp", &["earthquake"]), &mut rng);
        assert_eq!(report.aborted_battles, 4);
        assert_eq!(report.wins, 0);
        assert!(report.fitness.abs() < f32::EPSILON);
    }
}
