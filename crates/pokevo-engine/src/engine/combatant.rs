use std::sync::Arc;

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use crate::{
    SpecError,
    core::{Ability, ElementType, MoveId, Nature, StatKey, StatTable, Status, StatusKind},
};

/// Maximum number of moves a combatant carries.
pub const MAX_MOVES: usize = 4;
/// Every combatant battles at this level.
pub const LEVEL: u16 = 100;
/// Per-stat effort cap.
pub const MAX_EV_PER_STAT: u16 = 252;
/// Cap on the sum of all effort values.
pub const MAX_EV_TOTAL: u16 = 510;

const PERFECT_IV: u16 = 31;
const MAX_STAGE: i8 = 6;

/// Everything needed to bring a combatant into a battle.
///
/// A spec is immutable once a battle starts; live state is tracked separately by
/// [`Combatant`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatantSpec {
    pub name: String,
    pub base_stats: StatTable<u16>,
    pub types: ArrayVec<ElementType, 2>,
    pub ability: Ability,
    pub nature: Nature,
    pub evs: StatTable<u16>,
    pub moves: ArrayVec<MoveId, MAX_MOVES>,
}

impl CombatantSpec {
    /// Checks the structural rules a battle relies on.
    pub fn validate(&self) -> Result<(), SpecError> {
        if self.moves.is_empty() {
            return Err(SpecError::EmptyMoveset {
                name: self.name.clone(),
            });
        }
        for (i, id) in self.moves.iter().enumerate() {
            if self.moves[..i].contains(id) {
                return Err(SpecError::DuplicateMove { name: id.name() });
            }
        }
        match self.types.as_slice() {
            [] => return Err(SpecError::NoTypes),
            [a, b] if a == b => return Err(SpecError::DuplicateType { ty: *a }),
            _ => {}
        }
        if let Some((stat, _)) = self.base_stats.iter().find(|(_, v)| **v == 0) {
            return Err(SpecError::ZeroBaseStat { stat });
        }
        let ev_total = self.evs.total();
        let over_stat_cap = self.evs.iter().any(|(_, v)| *v > MAX_EV_PER_STAT);
        if ev_total > u32::from(MAX_EV_TOTAL) || over_stat_cap {
            return Err(SpecError::EffortOverCap { total: ev_total });
        }
        Ok(())
    }

    /// Level-100 stats with perfect individual values, effort and nature applied.
    #[must_use]
    pub fn derived_stats(&self) -> StatTable<u16> {
        StatTable::from_fn(|key| {
            let base = 2 * u32::from(self.base_stats[key])
                + u32::from(PERFECT_IV)
                + u32::from(self.evs[key]) / 4;
            let scaled = base * u32::from(LEVEL) / 100;
            let value = if key == StatKey::Hp {
                scaled + u32::from(LEVEL) + 10
            } else {
                #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let v = ((scaled + 5) as f32 * self.nature.multiplier(key)).floor() as u32;
                v
            };
            u16::try_from(value).unwrap_or(u16::MAX)
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveSlot {
    pub id: MoveId,
    pub pp: u8,
}

/// Live state of a combatant inside a battle.
///
/// Cloning produces a fully independent copy of the mutable state; only the
/// immutable spec is shared.
#[derive(Debug, Clone)]
pub struct Combatant {
    spec: Arc<CombatantSpec>,
    stats: StatTable<u16>,
    hp: u16,
    status: Option<Status>,
    stages: StatTable<i8>,
    slots: ArrayVec<MoveSlot, MAX_MOVES>,
    pub(crate) protected: bool,
    pub(crate) protected_last_turn: bool,
    pub(crate) seeded: bool,
}

impl Combatant {
    pub fn new(spec: Arc<CombatantSpec>) -> Result<Self, SpecError> {
        spec.validate()?;
        let stats = spec.derived_stats();
        let slots = spec
            .moves
            .iter()
            .map(|id| MoveSlot {
                id: *id,
                pp: id.data().pp,
            })
            .collect();
        Ok(Self {
            hp: stats.hp,
            stats,
            spec,
            status: None,
            stages: StatTable::splat(0),
            slots,
            protected: false,
            protected_last_turn: false,
            seeded: false,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.spec.name
    }

    #[must_use]
    pub fn types(&self) -> &[ElementType] {
        &self.spec.types
    }

    #[must_use]
    pub fn ability(&self) -> Ability {
        self.spec.ability
    }

    #[must_use]
    pub fn hp(&self) -> u16 {
        self.hp
    }

    #[must_use]
    pub fn max_hp(&self) -> u16 {
        self.stats.hp
    }

    #[must_use]
    pub fn hp_fraction(&self) -> f32 {
        f32::from(self.hp) / f32::from(self.stats.hp.max(1))
    }

    #[must_use]
    pub fn is_fainted(&self) -> bool {
        self.hp == 0
    }

    #[must_use]
    pub fn status(&self) -> Option<Status> {
        self.status
    }

    #[must_use]
    pub fn status_kind(&self) -> Option<StatusKind> {
        self.status.map(|s| s.kind)
    }

    #[must_use]
    pub fn stages(&self) -> &StatTable<i8> {
        &self.stages
    }

    #[must_use]
    pub fn stage_sum(&self) -> i32 {
        self.stages.iter().map(|(_, v)| i32::from(*v)).sum()
    }

    /// Unmodified derived stat.
    #[must_use]
    pub fn raw_stat(&self, key: StatKey) -> u16 {
        self.stats[key]
    }

    /// Stat with stage multiplier applied; speed is halved by paralysis.
    #[must_use]
    pub fn effective_stat(&self, key: StatKey) -> f32 {
        let mut value = f32::from(self.stats[key]) * stage_multiplier(self.stages[key]);
        if key == StatKey::Spe && self.status_kind() == Some(StatusKind::Paralysis) {
            value *= 0.5;
        }
        value
    }

    #[must_use]
    pub fn slots(&self) -> &[MoveSlot] {
        &self.slots
    }

    /// Moves that still have PP, with their slot index.
    pub fn available_moves(&self) -> impl Iterator<Item = (usize, MoveId)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.pp > 0)
            .map(|(i, slot)| (i, slot.id))
    }

    #[must_use]
    pub fn has_available_move(&self) -> bool {
        self.slots.iter().any(|slot| slot.pp > 0)
    }

    pub(crate) fn spend_pp(&mut self, slot: usize) {
        if let Some(slot) = self.slots.get_mut(slot) {
            slot.pp = slot.pp.saturating_sub(1);
        }
    }

    /// Removes up to `amount` HP and returns how much was actually lost.
    pub(crate) fn take_damage(&mut self, amount: u16) -> u16 {
        let lost = amount.min(self.hp);
        self.hp -= lost;
        lost
    }

    pub(crate) fn heal(&mut self, amount: u16) -> u16 {
        let gained = amount.min(self.stats.hp - self.hp);
        self.hp += gained;
        gained
    }

    /// Applies a new status if none is present. Returns whether it took hold.
    pub(crate) fn try_set_status(&mut self, status: Status) -> bool {
        if self.status.is_some() || self.is_fainted() || self.is_immune_to(status.kind) {
            return false;
        }
        self.status = Some(status);
        true
    }

    pub(crate) fn status_mut(&mut self) -> &mut Option<Status> {
        &mut self.status
    }

    fn is_immune_to(&self, kind: StatusKind) -> bool {
        let has = |ty| self.types().contains(&ty);
        match kind {
            StatusKind::Burn => has(ElementType::Fire),
            StatusKind::Poison | StatusKind::Toxic => {
                has(ElementType::Poison) || has(ElementType::Steel)
            }
            StatusKind::Paralysis => has(ElementType::Electric),
            StatusKind::Freeze => has(ElementType::Ice),
            StatusKind::Sleep => false,
        }
    }

    /// Shifts a stat stage, clamped to ±6. Returns the applied change.
    pub(crate) fn change_stage(&mut self, key: StatKey, delta: i8) -> i8 {
        let before = self.stages[key];
        let after = before.saturating_add(delta).clamp(-MAX_STAGE, MAX_STAGE);
        self.stages[key] = after;
        after - before
    }
}

/// Multiplier for a stat stage in `-6..=6`.
#[must_use]
pub fn stage_multiplier(stage: i8) -> f32 {
    let stage = f32::from(stage);
    if stage >= 0.0 {
        (2.0 + stage) / 2.0
    } else {
        2.0 / (2.0 - stage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> CombatantSpec {
        let species = crate::SpeciesData::from_name("garchomp").unwrap();
        CombatantSpec {
            name: "garchomp".to_owned(),
            base_stats: species.base_stats,
            types: species.types.iter().copied().collect(),
            ability: species.ability,
            nature: Nature::Jolly,
            evs: StatTable::new(0, 252, 0, 0, 6, 252),
            moves: ["earthquake", "dragon-claw", "swords-dance", "stealth-rock"]
                .into_iter()
                .map(|m| MoveId::from_name(m).unwrap())
                .collect(),
        }
    }

    #[test]
    fn test_derived_stats_match_reference_values() {
        let stats = spec().derived_stats();
        assert_eq!(stats.hp, 357);
        assert_eq!(stats.atk, 359);
        assert_eq!(stats.spe, 333);
        assert_eq!(stats.spa, 176);
    }

    #[test]
    fn test_validate_rejects_duplicate_moves() {
        let mut spec = spec();
        spec.moves[1] = spec.moves[0];
        assert!(matches!(
            spec.validate(),
            Err(SpecError::DuplicateMove { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_effort_overflow() {
        let mut spec = spec();
        spec.evs.hp = 252;
        assert!(matches!(
            spec.validate(),
            Err(SpecError::EffortOverCap { total: 762 })
        ));

        spec.evs = StatTable::splat(u16::MAX);
        assert!(matches!(
            spec.validate(),
            Err(SpecError::EffortOverCap { total: 393_210 })
        ));
    }

    #[test]
    fn test_stage_changes_are_clamped() {
        let mut combatant = Combatant::new(Arc::new(spec())).unwrap();
        assert_eq!(combatant.change_stage(StatKey::Atk, 4), 4);
        assert_eq!(combatant.change_stage(StatKey::Atk, 4), 2);
        assert_eq!(combatant.stages().atk, 6);
        assert!((stage_multiplier(-2) - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_clone_is_independent() {
        let original = Combatant::new(Arc::new(spec())).unwrap();
        let mut copy = original.clone();
        copy.take_damage(100);
        copy.spend_pp(0);
        assert_eq!(original.hp(), original.max_hp());
        assert_eq!(original.slots()[0].pp, 10);
        assert_eq!(copy.slots()[0].pp, 9);
    }
}
