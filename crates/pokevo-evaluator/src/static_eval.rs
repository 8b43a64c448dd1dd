//! Static evaluation of a battle position.
//!
//! Scores are always from the point of view of one side; higher is better for that side.
//!
//! # Terms
//!
//! Terminal positions short-circuit everything else:
//!
//! - [`WIN_SCORE`] / `-WIN_SCORE` once the battle has a winner
//! - `-FAINT_SCORE` / [`FAINT_SCORE`] when one combatant has fainted
//!
//! Otherwise the score is the sum of
//!
//! ```text
//!   (own HP fraction - opponent HP fraction) × 100
//! + (own stage sum - opponent stage sum) × 10
//! + opponent status severity - own status severity
//! ± 15 for holding / lacking the speed advantage
//! ```
//!
//! If the opponent has a positive-priority move whose estimate already knocks us out, the
//! position is scored as [`TRAP_SCORE`] regardless of the additive terms: a priority KO
//! cannot be outsped.

use pokevo_engine::{Battle, Combatant, Side, StatKey, StatusKind};

use crate::damage;

pub const WIN_SCORE: f32 = 1_000_000.0;
pub const FAINT_SCORE: f32 = 500_000.0;
pub const TRAP_SCORE: f32 = -400_000.0;

const HP_WEIGHT: f32 = 100.0;
const STAGE_WEIGHT: f32 = 10.0;
const SPEED_BONUS: f32 = 15.0;

/// Scores `battle` from the perspective of `side`.
#[must_use]
pub fn evaluate(battle: &Battle, side: Side) -> f32 {
    if let Some(winner) = battle.winner() {
        return if winner == side { WIN_SCORE } else { -WIN_SCORE };
    }
    let own = battle.combatant(side);
    let opponent = battle.combatant(side.opponent());
    if own.is_fainted() {
        return -FAINT_SCORE;
    }
    if opponent.is_fainted() {
        return FAINT_SCORE;
    }
    if !battle.is_finished() && facing_priority_kill(battle, side) {
        return TRAP_SCORE;
    }

    let hp = (own.hp_fraction() - opponent.hp_fraction()) * HP_WEIGHT;
    #[expect(clippy::cast_precision_loss)]
    let stages = (own.stage_sum() - opponent.stage_sum()) as f32 * STAGE_WEIGHT;
    let status = status_penalty(opponent) - status_penalty(own);
    let own_speed = own.effective_stat(StatKey::Spe);
    let opponent_speed = opponent.effective_stat(StatKey::Spe);
    let speed = if own_speed > opponent_speed {
        SPEED_BONUS
    } else if own_speed < opponent_speed {
        -SPEED_BONUS
    } else {
        0.0
    };
    hp + stages + status + speed
}

/// Severity of a combatant's status condition.
#[must_use]
pub fn status_penalty(combatant: &Combatant) -> f32 {
    match combatant.status_kind() {
        None => 0.0,
        Some(StatusKind::Paralysis | StatusKind::Sleep | StatusKind::Freeze) => 40.0,
        Some(StatusKind::Toxic) => 30.0,
        Some(StatusKind::Burn | StatusKind::Poison) => 20.0,
    }
}

fn facing_priority_kill(battle: &Battle, side: Side) -> bool {
    let opponent = side.opponent();
    let own = battle.combatant(side);
    battle.legal_choices(opponent).into_iter().any(|choice| {
        battle
            .move_data(opponent, choice)
            .is_some_and(|data| data.priority > 0)
            && damage::is_lethal(damage::estimate_choice(battle, opponent, choice), own)
    })
}
