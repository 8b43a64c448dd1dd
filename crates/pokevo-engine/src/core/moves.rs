use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use super::{element::ElementType, stat::StatKey, status::StatusKind};

use self::table::MOVES;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::IsVariant)]
pub enum MoveCategory {
    Physical,
    Special,
    Status,
}

/// What a move does beyond (or instead of) direct damage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveEffect {
    None,
    /// Chance (percent) to inflict a status on the target after a damaging hit.
    Secondary { status: StatusKind, chance: u8 },
    /// Status move that inflicts a status on the target.
    InflictStatus(StatusKind),
    /// Status move that changes the user's stat stages.
    Boost(&'static [(StatKey, i8)]),
    /// Damaging move that lowers the user's own stages afterwards.
    SelfDrop(&'static [(StatKey, i8)]),
    /// User takes `1 / divisor` of the damage dealt.
    Recoil(u8),
    /// User recovers `1 / divisor` of the damage dealt.
    Drain(u8),
    /// User recovers half of its maximum HP.
    Heal,
    Protect,
    /// Deals damage equal to the user's level.
    FixedDamage,
    /// Power doubles while the user has a status condition.
    Facade,
    LeechSeed,
}

/// Static description of a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveData {
    pub name: &'static str,
    pub ty: ElementType,
    pub category: MoveCategory,
    pub power: u16,
    /// `None` means the move never misses.
    pub accuracy: Option<u8>,
    pub priority: i8,
    pub pp: u8,
    pub effect: MoveEffect,
}

/// Index into the static move table.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MoveId(u16);

impl MoveId {
    /// Looks up a move by its kebab-case name (`"close-combat"`).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized = name.trim().to_ascii_lowercase().replace([' ', '_'], "-");
        MOVES
            .iter()
            .position(|m| m.name == normalized)
            .and_then(|i| u16::try_from(i).ok())
            .map(Self)
    }

    #[must_use]
    pub fn data(self) -> &'static MoveData {
        &MOVES[usize::from(self.0)]
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        self.data().name
    }

    /// Every move in the table.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..MOVES.len()).filter_map(|i| u16::try_from(i).ok().map(Self))
    }
}

impl fmt::Debug for MoveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MoveId({})", self.name())
    }
}

impl fmt::Display for MoveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for MoveId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for MoveId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        Self::from_name(&name).ok_or_else(|| de::Error::custom(format!("unknown move `{name}`")))
    }
}

/// Struggle is not part of any moveset; it is used when no move has PP left.
pub const STRUGGLE: MoveData = MoveData {
    name: "struggle",
    ty: ElementType::Normal,
    category: MoveCategory::Physical,
    power: 50,
    accuracy: None,
    priority: 0,
    pp: 0,
    effect: MoveEffect::Recoil(4),
};

/// The default pool evolvable combatants draw their movesets from.
pub const DEFAULT_MOVE_POOL: &[&str] = &[
    "superpower",
    "close-combat",
    "dragon-claw",
    "earthquake",
    "facade",
    "flare-blitz",
    "giga-drain",
    "ice-beam",
    "iron-head",
    "shadow-claw",
    "shadow-ball",
    "stealth-rock",
    "surf",
    "swords-dance",
    "thunderbolt",
    "u-turn",
    "discharge",
    "will-o-wisp",
    "stone-edge",
    "waterfall",
    "crunch",
    "poison-jab",
    "sucker-punch",
    "bullet-punch",
    "aqua-jet",
    "return",
    "brick-break",
    "rock-slide",
    "fire-punch",
    "ice-punch",
    "thunder-punch",
    "flamethrower",
    "fire-blast",
    "hydro-pump",
    "focus-blast",
    "energy-ball",
    "psychic",
    "dark-pulse",
    "dragon-pulse",
    "aura-sphere",
    "grass-knot",
    "sludge-bomb",
    "power-gem",
    "toxic",
    "protect",
    "recover",
    "roost",
    "calm-mind",
    "dragon-dance",
    "nasty-plot",
    "bulk-up",
    "taunt",
    "spikes",
    "toxic-spikes",
    "wish",
    "substitute",
    "leech-seed",
    "sleep-powder",
    "stun-spore",
];

const fn attack(
    name: &'static str,
    ty: ElementType,
    category: MoveCategory,
    power: u16,
    accuracy: u8,
    pp: u8,
) -> MoveData {
    MoveData {
        name,
        ty,
        category,
        power,
        accuracy: Some(accuracy),
        priority: 0,
        pp,
        effect: MoveEffect::None,
    }
}

const fn status(
    name: &'static str,
    ty: ElementType,
    accuracy: Option<u8>,
    pp: u8,
    effect: MoveEffect,
) -> MoveData {
    MoveData {
        name,
        ty,
        category: MoveCategory::Status,
        power: 0,
        accuracy,
        priority: 0,
        pp,
        effect,
    }
}

const fn with_effect(data: MoveData, effect: MoveEffect) -> MoveData {
    MoveData { effect, ..data }
}

const fn with_priority(data: MoveData, priority: i8) -> MoveData {
    MoveData { priority, ..data }
}

const fn sure_hit(data: MoveData) -> MoveData {
    MoveData {
        accuracy: None,
        ..data
    }
}

const fn secondary(status: StatusKind, chance: u8) -> MoveEffect {
    MoveEffect::Secondary { status, chance }
}

mod table {
    use super::{
        MoveCategory::{Physical, Special},
        MoveData, MoveEffect, attack, secondary, status, sure_hit, with_effect, with_priority,
    };
    use crate::core::{
        element::ElementType::{
            Bug, Dark, Dragon, Electric, Fighting, Fire, Flying, Ghost, Grass, Ground, Ice,
            Normal, Poison, Psychic, Rock, Steel, Water,
        },
        stat::StatKey::{Atk, Def, Spa, Spd, Spe},
        status::StatusKind::{self, Burn, Freeze, Paralysis, Sleep, Toxic},
    };

    #[rustfmt::skip]
    pub(super) static MOVES: &[MoveData] = &[
        // physical
        with_effect(attack("superpower", Fighting, Physical, 120, 100, 5), MoveEffect::SelfDrop(&[(Atk, -1), (Def, -1)])),
        with_effect(attack("close-combat", Fighting, Physical, 120, 100, 5), MoveEffect::SelfDrop(&[(Def, -1), (Spd, -1)])),
        attack("dragon-claw", Dragon, Physical, 80, 100, 15),
        attack("earthquake", Ground, Physical, 100, 100, 10),
        with_effect(attack("facade", Normal, Physical, 70, 100, 20), MoveEffect::Facade),
        with_effect(attack("flare-blitz", Fire, Physical, 120, 100, 15), MoveEffect::Recoil(3)),
        attack("iron-head", Steel, Physical, 80, 100, 15),
        attack("shadow-claw", Ghost, Physical, 70, 100, 15),
        attack("u-turn", Bug, Physical, 70, 100, 20),
        attack("stone-edge", Rock, Physical, 100, 80, 5),
        attack("waterfall", Water, Physical, 80, 100, 15),
        attack("crunch", Dark, Physical, 80, 100, 15),
        with_effect(attack("poison-jab", Poison, Physical, 80, 100, 20), secondary(StatusKind::Poison, 30)),
        with_priority(attack("sucker-punch", Dark, Physical, 70, 100, 5), 1),
        with_priority(attack("bullet-punch", Steel, Physical, 40, 100, 30), 1),
        with_priority(attack("aqua-jet", Water, Physical, 40, 100, 20), 1),
        with_priority(attack("extreme-speed", Normal, Physical, 80, 100, 5), 2),
        attack("return", Normal, Physical, 102, 100, 20),
        attack("brick-break", Fighting, Physical, 75, 100, 15),
        attack("rock-slide", Rock, Physical, 75, 90, 10),
        with_effect(attack("fire-punch", Fire, Physical, 75, 100, 15), secondary(Burn, 10)),
        with_effect(attack("ice-punch", Ice, Physical, 75, 100, 15), secondary(Freeze, 10)),
        with_effect(attack("thunder-punch", Electric, Physical, 75, 100, 15), secondary(Paralysis, 10)),
        with_effect(attack("fire-fang", Fire, Physical, 65, 95, 15), secondary(Burn, 10)),
        attack("bug-bite", Bug, Physical, 60, 100, 20),
        with_effect(attack("seismic-toss", Fighting, Physical, 0, 100, 20), MoveEffect::FixedDamage),
        // special
        with_effect(attack("giga-drain", Grass, Special, 75, 100, 10), MoveEffect::Drain(2)),
        with_effect(attack("ice-beam", Ice, Special, 90, 100, 10), secondary(Freeze, 10)),
        attack("shadow-ball", Ghost, Special, 80, 100, 15),
        attack("surf", Water, Special, 90, 100, 15),
        with_effect(attack("thunderbolt", Electric, Special, 90, 100, 15), secondary(Paralysis, 10)),
        with_effect(attack("discharge", Electric, Special, 80, 100, 15), secondary(Paralysis, 30)),
        with_effect(attack("flamethrower", Fire, Special, 90, 100, 15), secondary(Burn, 10)),
        with_effect(attack("fire-blast", Fire, Special, 110, 85, 5), secondary(Burn, 10)),
        attack("hydro-pump", Water, Special, 110, 80, 5),
        attack("focus-blast", Fighting, Special, 120, 70, 5),
        attack("energy-ball", Grass, Special, 90, 100, 10),
        attack("psychic", Psychic, Special, 90, 100, 10),
        attack("dark-pulse", Dark, Special, 80, 100, 15),
        attack("dragon-pulse", Dragon, Special, 85, 100, 10),
        sure_hit(attack("aura-sphere", Fighting, Special, 80, 100, 20)),
        attack("grass-knot", Grass, Special, 80, 100, 20),
        with_effect(attack("sludge-bomb", Poison, Special, 90, 100, 10), secondary(StatusKind::Poison, 30)),
        attack("power-gem", Rock, Special, 80, 100, 20),
        with_effect(attack("lava-plume", Fire, Special, 80, 100, 15), secondary(Burn, 30)),
        attack("earth-power", Ground, Special, 90, 100, 10),
        attack("flash-cannon", Steel, Special, 80, 100, 10),
        with_effect(attack("overheat", Fire, Special, 130, 90, 5), MoveEffect::SelfDrop(&[(Spa, -2)])),
        // status
        status("stealth-rock", Rock, None, 20, MoveEffect::None),
        status("swords-dance", Normal, None, 20, MoveEffect::Boost(&[(Atk, 2)])),
        status("will-o-wisp", Fire, Some(85), 15, MoveEffect::InflictStatus(Burn)),
        status("toxic", Poison, Some(90), 10, MoveEffect::InflictStatus(Toxic)),
        with_priority(status("protect", Normal, None, 10, MoveEffect::Protect), 4),
        status("recover", Normal, None, 10, MoveEffect::Heal),
        status("roost", Flying, None, 10, MoveEffect::Heal),
        status("soft-boiled", Normal, None, 10, MoveEffect::Heal),
        status("calm-mind", Psychic, None, 20, MoveEffect::Boost(&[(Spa, 1), (Spd, 1)])),
        status("dragon-dance", Dragon, None, 20, MoveEffect::Boost(&[(Atk, 1), (Spe, 1)])),
        status("nasty-plot", Dark, None, 20, MoveEffect::Boost(&[(Spa, 2)])),
        status("bulk-up", Fighting, None, 20, MoveEffect::Boost(&[(Atk, 1), (Def, 1)])),
        status("taunt", Dark, Some(100), 20, MoveEffect::None),
        status("spikes", Ground, None, 20, MoveEffect::None),
        status("toxic-spikes", Poison, None, 20, MoveEffect::None),
        status("wish", Normal, None, 10, MoveEffect::Heal),
        status("substitute", Normal, None, 10, MoveEffect::None),
        status("leech-seed", Grass, Some(90), 10, MoveEffect::LeechSeed),
        status("sleep-powder", Grass, Some(75), 15, MoveEffect::InflictStatus(Sleep)),
        status("stun-spore", Grass, Some(75), 30, MoveEffect::InflictStatus(Paralysis)),
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pool_is_fully_known() {
        for name in DEFAULT_MOVE_POOL {
            assert!(MoveId::from_name(name).is_some(), "missing move {name}");
        }
    }

    #[test]
    fn test_move_names_are_unique() {
        let mut names = MOVES.iter().map(|m| m.name).collect::<Vec<_>>();
        names.sort_unstable();
        let len = names.len();
        names.dedup();
        assert_eq!(len, names.len());
    }

    #[test]
    fn test_serde_uses_move_name() {
        let id = MoveId::from_name("Close Combat").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"close-combat\"");
        let back: MoveId = serde_json::from_str("\"close-combat\"").unwrap();
        assert_eq!(back, id);
        assert!(serde_json::from_str::<MoveId>("\"splash\"").is_err());
    }

    #[test]
    fn test_priority_moves() {
        let id = MoveId::from_name("extreme-speed").unwrap();
        assert_eq!(id.data().priority, 2);
        assert!(id.data().category.is_physical());
    }
}
