//! Live battle state and turn resolution.
//!
//! - [`CombatantSpec`] - Immutable description of a combatant (stats, typing, moves)
//! - [`Combatant`] - Mutable in-battle state (HP, status, stat stages, PP)
//! - [`Battle`] - Two combatants facing each other, advanced one turn at a time
//!
//! # Turn Flow
//!
//! 1. Both sides submit a [`MoveChoice`] via [`Battle::submit_turn`]
//! 2. The higher priority move acts first, then the faster combatant, then a coin flip
//! 3. Each move checks status, protection and accuracy before taking effect
//! 4. Residual damage (burn, poison, leech seed) is applied if nobody fainted
//! 5. The battle ends when a combatant faints or the turn limit is reached
//!
//! A [`Battle`] owns all of its mutable state, so search algorithms clone it freely
//! to look ahead.

pub use self::{battle::*, combatant::*};

mod battle;
mod combatant;
