use super::{ability::Ability, element::ElementType, moves::MoveId, stat::StatTable};

/// Fixed per-species data: base stats, typing, default ability and learnset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpeciesData {
    pub name: &'static str,
    pub base_stats: StatTable<u16>,
    pub types: &'static [ElementType],
    pub ability: Ability,
    /// Names of the moves the species can learn.
    pub learnset: &'static [&'static str],
}

impl SpeciesData {
    /// Case-insensitive lookup by species name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<&'static Self> {
        SPECIES
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(name.trim()))
    }

    #[must_use]
    pub fn all() -> &'static [Self] {
        SPECIES
    }

    /// The learnset resolved against the move table.
    #[must_use]
    pub fn learnset_moves(&self) -> Vec<MoveId> {
        self.learnset
            .iter()
            .filter_map(|name| MoveId::from_name(name))
            .collect()
    }
}

const fn species(
    name: &'static str,
    [hp, atk, def, spa, spd, spe]: [u16; 6],
    types: &'static [ElementType],
    ability: Ability,
    learnset: &'static [&'static str],
) -> SpeciesData {
    SpeciesData {
        name,
        base_stats: StatTable::new(hp, atk, def, spa, spd, spe),
        types,
        ability,
        learnset,
    }
}

const GARCHOMP_LEARNSET: &[&str] = &[
    "earthquake",
    "dragon-claw",
    "stone-edge",
    "fire-fang",
    "crunch",
    "poison-jab",
    "dragon-pulse",
    "fire-blast",
    "swords-dance",
    "stealth-rock",
    "substitute",
    "protect",
    "toxic",
];

const GENGAR_LEARNSET: &[&str] = &[
    "shadow-ball",
    "focus-blast",
    "thunderbolt",
    "sludge-bomb",
    "psychic",
    "energy-ball",
    "dark-pulse",
    "giga-drain",
    "u-turn",
    "will-o-wisp",
    "nasty-plot",
    "taunt",
    "substitute",
    "protect",
    "toxic",
];

const SCIZOR_LEARNSET: &[&str] = &[
    "bullet-punch",
    "bug-bite",
    "superpower",
    "u-turn",
    "iron-head",
    "brick-break",
    "swords-dance",
    "roost",
    "substitute",
    "protect",
    "toxic",
];

const HEATRAN_LEARNSET: &[&str] = &[
    "lava-plume",
    "earth-power",
    "flash-cannon",
    "dark-pulse",
    "flamethrower",
    "fire-blast",
    "overheat",
    "stealth-rock",
    "will-o-wisp",
    "taunt",
    "substitute",
    "protect",
    "toxic",
];

const SALAMENCE_LEARNSET: &[&str] = &[
    "dragon-claw",
    "earthquake",
    "fire-blast",
    "hydro-pump",
    "flamethrower",
    "dragon-pulse",
    "crunch",
    "fire-fang",
    "dragon-dance",
    "roost",
    "protect",
    "toxic",
];

const BLISSEY_LEARNSET: &[&str] = &[
    "seismic-toss",
    "ice-beam",
    "thunderbolt",
    "flamethrower",
    "shadow-ball",
    "fire-blast",
    "psychic",
    "grass-knot",
    "soft-boiled",
    "wish",
    "calm-mind",
    "stealth-rock",
    "protect",
    "toxic",
];

const TYRANITAR_LEARNSET: &[&str] = &[
    "stone-edge",
    "crunch",
    "earthquake",
    "superpower",
    "fire-punch",
    "ice-punch",
    "thunder-punch",
    "rock-slide",
    "fire-blast",
    "ice-beam",
    "dark-pulse",
    "dragon-dance",
    "stealth-rock",
    "protect",
    "toxic",
];

const LUCARIO_LEARNSET: &[&str] = &[
    "close-combat",
    "extreme-speed",
    "iron-head",
    "shadow-claw",
    "stone-edge",
    "aura-sphere",
    "flash-cannon",
    "dark-pulse",
    "crunch",
    "ice-punch",
    "thunder-punch",
    "bullet-punch",
    "dragon-pulse",
    "swords-dance",
    "nasty-plot",
];

const ROTOM_LEARNSET: &[&str] = &[
    "hydro-pump",
    "thunderbolt",
    "shadow-ball",
    "overheat",
    "discharge",
    "dark-pulse",
    "will-o-wisp",
    "substitute",
    "protect",
    "taunt",
];

#[rustfmt::skip]
static SPECIES: &[SpeciesData] = &[
    species("garchomp", [108, 130, 95, 80, 85, 102], &[ElementType::Dragon, ElementType::Ground], Ability::SandVeil, GARCHOMP_LEARNSET),
    species("gengar", [60, 65, 60, 130, 75, 110], &[ElementType::Ghost, ElementType::Poison], Ability::Levitate, GENGAR_LEARNSET),
    species("scizor", [70, 130, 100, 55, 80, 65], &[ElementType::Bug, ElementType::Steel], Ability::Technician, SCIZOR_LEARNSET),
    species("heatran", [91, 90, 106, 130, 106, 77], &[ElementType::Fire, ElementType::Steel], Ability::FlashFire, HEATRAN_LEARNSET),
    species("salamence", [95, 135, 80, 110, 80, 100], &[ElementType::Dragon, ElementType::Flying], Ability::Intimidate, SALAMENCE_LEARNSET),
    species("blissey", [255, 10, 10, 75, 135, 55], &[ElementType::Normal], Ability::NaturalCure, BLISSEY_LEARNSET),
    species("tyranitar", [100, 134, 110, 95, 100, 61], &[ElementType::Rock, ElementType::Dark], Ability::SandStream, TYRANITAR_LEARNSET),
    species("lucario", [70, 110, 70, 115, 70, 90], &[ElementType::Fighting, ElementType::Steel], Ability::InnerFocus, LUCARIO_LEARNSET),
    species("rotom", [50, 50, 77, 95, 77, 91], &[ElementType::Electric, ElementType::Ghost], Ability::Levitate, ROTOM_LEARNSET),
];
