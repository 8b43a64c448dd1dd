//! Battle simulation for single combatants.
//!
//! [`core`] holds the static lookup data (types, natures, moves, species) and
//! [`engine`] resolves turns between two [`CombatantSpec`]s.

pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

/// A combatant description that cannot enter a battle.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum SpecError {
    #[display("{name} has no moves")]
    EmptyMoveset { name: String },
    #[display("move {name} appears more than once")]
    DuplicateMove { name: &'static str },
    #[display("combatant has no type")]
    NoTypes,
    #[display("type {ty} appears twice")]
    DuplicateType { ty: ElementType },
    #[display("base {stat} is zero")]
    ZeroBaseStat { stat: StatKey },
    #[display("effort values exceed their caps (total {total})")]
    EffortOverCap { total: u32 },
}

/// A turn submission the battle refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum TurnError {
    #[display("battle is already finished")]
    BattleFinished,
    #[display("{side} chose move slot {slot}, which does not exist")]
    SlotOutOfRange { side: Side, slot: usize },
    #[display("{side} chose move slot {slot}, which has no PP left")]
    NoPpLeft { side: Side, slot: usize },
    #[display("{side} cannot struggle while it still has usable moves")]
    StruggleNotAllowed { side: Side },
}
