//! Move selection strategies.
//!
//! A [`MoveSelector`] picks one side's [`MoveChoice`] for the coming turn. Two
//! implementations exist:
//!
//! - [`GreedySelector`] - highest estimated damage, with a priority-kill override
//! - [`MinimaxSelector`](crate::minimax::MinimaxSelector) - depth-limited alpha-beta search
//!
//! Both share [`ordered_choices`], the cheap heuristic used for move ordering.

use std::fmt;

use arrayvec::ArrayVec;
use pokevo_engine::{Battle, MAX_MOVES, MoveChoice, Side};
use rand::RngCore;

use crate::damage;

/// Ordering bonus for a move whose estimate is lethal.
pub const LETHAL_BONUS: f32 = 10_000.0;
/// Extra ordering bonus for a lethal move with positive priority.
pub const PRIORITY_LETHAL_BONUS: f32 = 5_000.0;

const STATUS_MOVE_SCORE: f32 = -1.0;

/// Chooses a move for one side of a battle.
pub trait MoveSelector: fmt::Debug + Send + Sync {
    /// Returns a legal choice for `side`.
    ///
    /// Only called while the battle is unfinished.
    fn select_move(&self, battle: &Battle, side: Side, rng: &mut dyn RngCore) -> MoveChoice;
}

/// Legal choices for `side`, best first by the ordering heuristic.
///
/// Status moves rank below every damaging move. Damaging moves rank by estimated damage,
/// plus [`LETHAL_BONUS`] if the estimate knocks the opponent out and
/// [`PRIORITY_LETHAL_BONUS`] on top if that move also has positive priority. The sort is
/// stable, so equal scores keep moveset order.
#[must_use]
pub fn ordered_choices(battle: &Battle, side: Side) -> ArrayVec<(MoveChoice, f32), MAX_MOVES> {
    let defender = battle.combatant(side.opponent());
    let mut choices: ArrayVec<_, MAX_MOVES> = battle
        .legal_choices(side)
        .into_iter()
        .map(|choice| {
            let Some(data) = battle.move_data(side, choice) else {
                return (choice, STATUS_MOVE_SCORE);
            };
            if data.category.is_status() {
                return (choice, STATUS_MOVE_SCORE);
            }
            let estimate = damage::estimate_choice(battle, side, choice);
            let mut score = estimate;
            if damage::is_lethal(estimate, defender) {
                score += LETHAL_BONUS;
                if data.priority > 0 {
                    score += PRIORITY_LETHAL_BONUS;
                }
            }
            (choice, score)
        })
        .collect();
    choices.sort_by(|a, b| b.1.total_cmp(&a.1));
    choices
}

/// Picks the highest estimated damage.
///
/// If any positive-priority move is estimated to knock the opponent out, the one with the
/// highest priority wins instead (higher damage breaks ties), since it lands before the
/// opponent can act.
#[derive(Debug, Default, Clone, Copy)]
pub struct GreedySelector;

impl GreedySelector {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    #[must_use]
    pub fn choose(battle: &Battle, side: Side) -> MoveChoice {
        let choices = battle.legal_choices(side);
        if let [only] = choices.as_slice() {
            return *only;
        }

        let defender = battle.combatant(side.opponent());
        let mut best_kill: Option<(MoveChoice, i8, f32)> = None;
        let mut best_hit: Option<(MoveChoice, f32)> = None;
        for &choice in &choices {
            let Some(data) = battle.move_data(side, choice) else {
                continue;
            };
            let estimate = damage::estimate_choice(battle, side, choice);
            if data.priority > 0 && damage::is_lethal(estimate, defender) {
                let better = best_kill.is_none_or(|(_, priority, damage)| {
                    (data.priority, estimate) > (priority, damage)
                });
                if better {
                    best_kill = Some((choice, data.priority, estimate));
                }
            }
            if estimate > 0.0 && best_hit.is_none_or(|(_, damage)| estimate > damage) {
                best_hit = Some((choice, estimate));
            }
        }

        best_kill
            .map(|(choice, ..)| choice)
            .or(best_hit.map(|(choice, _)| choice))
            .unwrap_or(choices[0])
    }
}

impl MoveSelector for GreedySelector {
    fn select_move(&self, battle: &Battle, side: Side, _rng: &mut dyn RngCore) -> MoveChoice {
        Self::choose(battle, side)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pokevo_engine::{
        Ability, CombatantSpec, ElementType, MoveId, Nature, SpeciesData, StatTable,
    };

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

    fn frail(moves: &[&str]) -> Arc<CombatantSpec> {
        Arc::new(CombatantSpec {
            name: "frail".to_owned(),
            base_stats: StatTable::new(1, 50, 1, 50, 1, 1),
            types: [ElementType::Normal].into_iter().collect(),
            ability: Ability::Pressure,
            nature: Nature::Hardy,
            evs: StatTable::splat(0),
            moves: moves.iter().map(|m| MoveId::from_name(m).unwrap()).collect(),
        })
    }

    #[test]
    fn test_greedy_prefers_priority_kill() {
        let battle = Battle::start(
            spec("scizor", &["superpower", "bullet-punch"]),
            frail(&["swords-dance"]),
        )
        .unwrap();
        let superpower = damage::estimate_choice(&battle, Side::A, MoveChoice::Move(0));
        let bullet_punch = damage::estimate_choice(&battle, Side::A, MoveChoice::Move(1));
        assert!(superpower > bullet_punch);
        assert_eq!(GreedySelector::choose(&battle, Side::A), MoveChoice::Move(1));
    }

    #[test]
    fn test_greedy_picks_highest_damage_without_kill() {
        let battle = Battle::start(
            spec("garchomp", &["dragon-claw", "earthquake"]),
            spec("blissey", &["soft-boiled"]),
        )
        .unwrap();
        assert_eq!(GreedySelector::choose(&battle, Side::A), MoveChoice::Move(1));
        // only one legal choice
        assert_eq!(GreedySelector::choose(&battle, Side::B), MoveChoice::Move(0));
    }

    #[test]
    fn test_greedy_falls_back_to_first_move() {
        let battle = Battle::start(
            spec("garchomp", &["swords-dance", "stealth-rock"]),
            spec("blissey", &["soft-boiled"]),
        )
        .unwrap();
        assert_eq!(GreedySelector::choose(&battle, Side::A), MoveChoice::Move(0));
    }

    #[test]
    fn test_ordering_puts_status_last_and_kills_first() {
        let battle = Battle::start(
            spec("scizor", &["swords-dance", "u-turn", "superpower", "bullet-punch"]),
            frail(&["swords-dance"]),
        )
        .unwrap();
        let order: Vec<_> = ordered_choices(&battle, Side::A)
            .into_iter()
            .map(|(choice, _)| choice)
            .collect();
        assert_eq!(order[0], MoveChoice::Move(3));
        assert_eq!(order[3], MoveChoice::Move(0));
    }
}
