//! Gauntlet opponents.
//!
//! A gauntlet is an ordered list of [`OpponentRecord`]s. Records are plain strings so
//! they can be written by hand in a config file; [`OpponentRecord::to_spec`] resolves
//! them against the species, move, ability and nature tables.
//!
//! Effort strings use the usual `"<amount> <stat>"` pairs joined by `/`:
//!
//! ```
//! use pokevo_engine::StatTable;
//! use pokevo_evaluator::gauntlet::parse_evs;
//!
//! let evs = parse_evs("252 Atk / 6 SpD / 252 Spe").unwrap();
//! assert_eq!(evs, StatTable::new(0, 252, 0, 0, 6, 252));
//! ```

use std::sync::Arc;

use pokevo_engine::{
    Ability, CombatantSpec, MAX_MOVES, MoveId, Nature, SpecError, SpeciesData, StatKey, StatTable,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum OpponentError {
    #[display("unknown species {name:?}")]
    UnknownSpecies { name: String },
    #[display("unknown move {name:?}")]
    UnknownMove { name: String },
    #[display("unknown ability {name:?}")]
    UnknownAbility { name: String },
    #[display("unknown nature {name:?}")]
    UnknownNature { name: String },
    #[display("malformed effort entry {entry:?}")]
    MalformedEffort { entry: String },
    #[display("{count} moves given, at most {} allowed", MAX_MOVES)]
    TooManyMoves { count: usize },
    #[display("invalid combatant: {source}")]
    InvalidSpec { source: SpecError },
}

/// A hand-written gauntlet entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpponentRecord {
    pub name: String,
    pub moves: Vec<String>,
    pub ability: String,
    pub evs: String,
    pub nature: String,
}

impl OpponentRecord {
    fn new(name: &str, moves: [&str; MAX_MOVES], ability: &str, evs: &str, nature: &str) -> Self {
        Self {
            name: name.to_owned(),
            moves: moves.iter().map(|m| (*m).to_owned()).collect(),
            ability: ability.to_owned(),
            evs: evs.to_owned(),
            nature: nature.to_owned(),
        }
    }

    /// Resolves the record into a validated combatant spec.
    pub fn to_spec(&self) -> Result<CombatantSpec, OpponentError> {
        let species =
            SpeciesData::from_name(&self.name).ok_or_else(|| OpponentError::UnknownSpecies {
                name: self.name.clone(),
            })?;
        if self.moves.len() > MAX_MOVES {
            return Err(OpponentError::TooManyMoves {
                count: self.moves.len(),
            });
        }
        let moves = self
            .moves
            .iter()
            .map(|name| {
                MoveId::from_name(name).ok_or_else(|| OpponentError::UnknownMove { name: name.clone() })
            })
            .collect::<Result<_, _>>()?;
        let ability =
            Ability::from_name(&self.ability).ok_or_else(|| OpponentError::UnknownAbility {
                name: self.ability.clone(),
            })?;
        let nature =
            Nature::from_name(&self.nature).ok_or_else(|| OpponentError::UnknownNature {
                name: self.nature.clone(),
            })?;

        let spec = CombatantSpec {
            name: self.name.clone(),
            base_stats: species.base_stats,
            types: species.types.iter().copied().collect(),
            ability,
            nature,
            evs: parse_evs(&self.evs)?,
            moves,
        };
        spec.validate()
            .map_err(|source| OpponentError::InvalidSpec { source })?;
        Ok(spec)
    }
}

/// Parses an effort string such as `"252 HP / 252 Def / 6 SpD"`.
///
/// An empty string means no effort at all. Repeated stats accumulate.
pub fn parse_evs(s: &str) -> Result<StatTable<u16>, OpponentError> {
    let mut evs = StatTable::splat(0_u16);
    for entry in s.split('/').map(str::trim).filter(|e| !e.is_empty()) {
        let malformed = || OpponentError::MalformedEffort {
            entry: entry.to_owned(),
        };
        let (amount, stat) = entry.split_once(char::is_whitespace).ok_or_else(malformed)?;
        let amount: u16 = amount.parse().map_err(|_| malformed())?;
        let stat = StatKey::from_abbreviation(stat).ok_or_else(malformed)?;
        evs[stat] = evs[stat].saturating_add(amount);
    }
    Ok(evs)
}

/// Resolves every record, logging and dropping the ones that fail.
#[must_use]
pub fn resolve(records: &[OpponentRecord]) -> Vec<(String, Arc<CombatantSpec>)> {
    records
        .iter()
        .filter_map(|record| match record.to_spec() {
            Ok(spec) => Some((record.name.clone(), Arc::new(spec))),
            Err(e) => {
                log::warn!("invalid opponent data for {}, skipping: {e}", record.name);
                None
            }
        })
        .collect()
}

/// Opponents with status, setup and hazard moves.
#[must_use]
#[rustfmt::skip]
pub fn advanced_gauntlet() -> Vec<OpponentRecord> {
    vec![
        OpponentRecord::new("Garchomp", ["earthquake", "dragon-claw", "swords-dance", "stealth-rock"], "sand-veil", "252 Atk / 6 SpD / 252 Spe", "Jolly"),
        OpponentRecord::new("Gengar", ["shadow-ball", "focus-blast", "u-turn", "thunderbolt"], "levitate", "252 SpA / 6 SpD / 252 Spe", "Timid"),
        OpponentRecord::new("Scizor", ["bullet-punch", "swords-dance", "roost", "u-turn"], "technician", "248 HP / 252 Atk / 8 SpD", "Adamant"),
        OpponentRecord::new("Heatran", ["lava-plume", "earth-power", "stealth-rock", "protect"], "flash-fire", "252 HP / 6 SpA / 252 SpD", "Calm"),
        OpponentRecord::new("Salamence", ["dragon-dance", "dragon-claw", "earthquake", "roost"], "intimidate", "252 Atk / 6 Def / 252 Spe", "Jolly"),
        OpponentRecord::new("Blissey", ["seismic-toss", "toxic", "soft-boiled", "protect"], "natural-cure", "252 HP / 252 Def / 6 SpD", "Bold"),
        OpponentRecord::new("Tyranitar", ["stone-edge", "crunch", "earthquake", "dragon-dance"], "sand-stream", "252 Atk / 6 SpD / 252 Spe", "Jolly"),
        OpponentRecord::new("Lucario", ["close-combat", "swords-dance", "extreme-speed", "iron-head"], "inner-focus", "252 Atk / 6 SpD / 252 Spe", "Jolly"),
        OpponentRecord::new("Rotom", ["hydro-pump", "thunderbolt", "will-o-wisp", "shadow-ball"], "levitate", "252 HP / 252 SpA / 6 Spe", "Modest"),
    ]
}

/// The same opponents with all-out attacking movesets.
#[must_use]
#[rustfmt::skip]
pub fn simple_gauntlet() -> Vec<OpponentRecord> {
    vec![
        OpponentRecord::new("Garchomp", ["earthquake", "dragon-claw", "stone-edge", "fire-fang"], "sand-veil", "252 Atk / 6 SpD / 252 Spe", "Jolly"),
        OpponentRecord::new("Gengar", ["shadow-ball", "focus-blast", "sludge-bomb", "thunderbolt"], "levitate", "252 SpA / 6 SpD / 252 Spe", "Timid"),
        OpponentRecord::new("Scizor", ["bullet-punch", "bug-bite", "superpower", "u-turn"], "technician", "248 HP / 252 Atk / 8 SpD", "Adamant"),
        OpponentRecord::new("Heatran", ["lava-plume", "earth-power", "flash-cannon", "dark-pulse"], "flash-fire", "252 HP / 252 SpA / 6 SpD", "Modest"),
        OpponentRecord::new("Salamence", ["dragon-claw", "earthquake", "fire-blast", "hydro-pump"], "intimidate", "252 Atk / 6 Def / 252 Spe", "Jolly"),
        OpponentRecord::new("Blissey", ["ice-beam", "thunderbolt", "flamethrower", "shadow-ball"], "natural-cure", "252 HP / 252 Def / 6 SpA", "Modest"),
        OpponentRecord::new("Tyranitar", ["stone-edge", "crunch", "earthquake", "superpower"], "sand-stream", "252 Atk / 6 SpD / 252 Spe", "Jolly"),
        OpponentRecord::new("Lucario", ["close-combat", "shadow-claw", "stone-edge", "iron-head"], "inner-focus", "252 Atk / 6 SpD / 252 Spe", "Jolly"),
        OpponentRecord::new("Rotom", ["hydro-pump", "thunderbolt", "overheat", "shadow-ball"], "levitate", "252 HP / 252 SpA / 6 Spe", "Modest"),
    ]
}
