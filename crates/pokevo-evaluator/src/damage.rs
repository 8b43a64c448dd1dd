//! Analytic damage estimates.
//!
//! These are cheap, deterministic approximations used to rank moves; the battle itself
//! rolls its own damage. The estimate is
//!
//! ```text
//! ((2 × level / 5 + 2) × power × attack / defense) / 50 + 2
//!     × STAB × type effectiveness × item multiplier
//! ```
//!
//! with stage-adjusted stats and no random roll or critical hits.

use pokevo_engine::{
    Ability, Battle, Combatant, ElementType, LEVEL, MoveChoice, MoveData, MoveEffect, STRUGGLE,
    Side, StatKey,
};

/// Combatants carry no held items, so the item term is neutral.
pub const ITEM_MULTIPLIER: f32 = 1.0;

const STAB: f32 = 1.5;
const ADAPTABILITY_STAB: f32 = 2.0;

/// Estimated damage of `data` used by `attacker` against `defender`.
///
/// Status moves estimate to zero.
#[must_use]
pub fn estimate_damage(attacker: &Combatant, defender: &Combatant, data: &MoveData) -> f32 {
    if data.category.is_status() {
        return 0.0;
    }
    let is_struggle = data.name == STRUGGLE.name;
    let effectiveness = if is_struggle {
        1.0
    } else {
        effectiveness(defender, data)
    };
    if effectiveness <= 0.0 {
        return 0.0;
    }
    if data.effect == MoveEffect::FixedDamage {
        return f32::from(LEVEL);
    }

    let mut power = f32::from(data.power);
    if attacker.ability() == Ability::Technician && data.power <= 60 {
        power *= 1.5;
    }
    if data.effect == MoveEffect::Facade && attacker.status().is_some() {
        power *= 2.0;
    }
    let (attack, defense) = if data.category.is_physical() {
        (StatKey::Atk, StatKey::Def)
    } else {
        (StatKey::Spa, StatKey::Spd)
    };
    let attack = attacker.effective_stat(attack);
    let defense = defender.effective_stat(defense).max(1.0);

    let level_factor = 2.0 * f32::from(LEVEL) / 5.0 + 2.0;
    let base = level_factor * power * attack / defense / 50.0 + 2.0;
    let stab = match (is_struggle, attacker.types().contains(&data.ty)) {
        (false, true) if attacker.ability() == Ability::Adaptability => ADAPTABILITY_STAB,
        (false, true) => STAB,
        _ => 1.0,
    };
    base * stab * effectiveness * ITEM_MULTIPLIER
}

/// Estimated damage of a side's choice against the other side.
#[must_use]
pub fn estimate_choice(battle: &Battle, side: Side, choice: MoveChoice) -> f32 {
    battle.move_data(side, choice).map_or(0.0, |data| {
        estimate_damage(
            battle.combatant(side),
            battle.combatant(side.opponent()),
            data,
        )
    })
}

/// Whether an estimate is enough to knock out `defender` from its current HP.
#[must_use]
pub fn is_lethal(estimate: f32, defender: &Combatant) -> bool {
    estimate > 0.0 && estimate >= f32::from(defender.hp())
}

fn effectiveness(defender: &Combatant, data: &MoveData) -> f32 {
    match (defender.ability(), data.ty) {
        (Ability::Levitate, ElementType::Ground) | (Ability::FlashFire, ElementType::Fire) => 0.0,
        (Ability::ThickFat, ElementType::Fire | ElementType::Ice) => {
            0.5 * data.ty.against_all(defender.types())
        }
        _ => data.ty.against_all(defender.types()),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pokevo_engine::{CombatantSpec, MoveId, Nature, SpeciesData, StatTable};

    use super::*;

    fn combatant(species: &str, moves: &[&str]) -> Combatant {
        let data = SpeciesData::from_name(species).unwrap();
        Combatant::new(Arc::new(CombatantSpec {
            name: species.to_owned(),
            base_stats: data.base_stats,
            types: data.types.iter().copied().collect(),
            ability: data.ability,
            nature: Nature::Hardy,
            evs: StatTable::splat(0),
            moves: moves.iter().map(|m| MoveId::from_name(m).unwrap()).collect(),
        }))
        .unwrap()
    }

    fn data(name: &str) -> &'static MoveData {
        MoveId::from_name(name).unwrap().data()
    }

    #[test]
    fn test_super_effective_stab_beats_neutral() {
        let chomp = combatant("garchomp", &["earthquake", "dragon-claw"]);
        let heatran = combatant("heatran", &["lava-plume"]);
        let quake = estimate_damage(&chomp, &heatran, data("earthquake"));
        let claw = estimate_damage(&chomp, &heatran, data("dragon-claw"));
        assert!(quake > claw * 4.0);
        assert!(is_lethal(quake, &heatran));
    }

    #[test]
    fn test_immunities_and_status_moves_estimate_zero() {
        let chomp = combatant("garchomp", &["earthquake"]);
        let gengar = combatant("gengar", &["shadow-ball"]);
        assert!(estimate_damage(&chomp, &gengar, data("earthquake")).abs() < f32::EPSILON);
        assert!(estimate_damage(&chomp, &gengar, data("swords-dance")).abs() < f32::EPSILON);
        assert!(!is_lethal(0.0, &gengar));
    }

    #[test]
    fn test_fixed_damage_is_level() {
        let blissey = combatant("blissey", &["seismic-toss"]);
        let scizor = combatant("scizor", &["bullet-punch"]);
        let toss = estimate_damage(&blissey, &scizor, data("seismic-toss"));
        assert!((toss - f32::from(LEVEL)).abs() < f32::EPSILON);
    }
}
