use std::{
    fmt,
    ops::{Index, IndexMut},
};

use serde::{Deserialize, Serialize};

/// One of the six combat stats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatKey {
    Hp,
    Atk,
    Def,
    Spa,
    Spd,
    Spe,
}

impl StatKey {
    pub const LEN: usize = 6;
    pub const ALL: [Self; Self::LEN] = [
        Self::Hp,
        Self::Atk,
        Self::Def,
        Self::Spa,
        Self::Spd,
        Self::Spe,
    ];

    #[must_use]
    pub const fn abbreviation(self) -> &'static str {
        match self {
            Self::Hp => "hp",
            Self::Atk => "atk",
            Self::Def => "def",
            Self::Spa => "spa",
            Self::Spd => "spd",
            Self::Spe => "spe",
        }
    }

    /// Parses a stat abbreviation case-insensitively (`"SpA"`, `"spa"`, `"HP"`).
    #[must_use]
    pub fn from_abbreviation(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|key| key.abbreviation().eq_ignore_ascii_case(s.trim()))
    }
}

impl fmt::Display for StatKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbreviation())
    }
}

/// A value for each of the six stats.
///
/// Used for base stats, effort allocations, derived stats and stat stages alike.
///
/// # Example
///
/// ```
/// use pokevo_engine::{StatKey, StatTable};
///
/// let mut evs = StatTable::splat(0_u16);
/// evs[StatKey::Atk] = 252;
/// evs[StatKey::Spe] = 252;
/// assert_eq!(evs.iter().map(|(_, v)| *v).sum::<u16>(), 504);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StatTable<T> {
    pub hp: T,
    pub atk: T,
    pub def: T,
    pub spa: T,
    pub spd: T,
    pub spe: T,
}

impl<T> StatTable<T> {
    #[must_use]
    pub const fn new(hp: T, atk: T, def: T, spa: T, spd: T, spe: T) -> Self {
        Self {
            hp,
            atk,
            def,
            spa,
            spd,
            spe,
        }
    }

    pub fn from_fn<F>(mut f: F) -> Self
    where
        F: FnMut(StatKey) -> T,
    {
        Self {
            hp: f(StatKey::Hp),
            atk: f(StatKey::Atk),
            def: f(StatKey::Def),
            spa: f(StatKey::Spa),
            spd: f(StatKey::Spd),
            spe: f(StatKey::Spe),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (StatKey, &T)> + '_ {
        StatKey::ALL.into_iter().map(move |key| (key, &self[key]))
    }
}

impl<T: Copy> StatTable<T> {
    #[must_use]
    pub const fn splat(value: T) -> Self {
        Self::new(value, value, value, value, value, value)
    }
}

impl StatTable<u16> {
    #[must_use]
    pub fn total(&self) -> u32 {
        self.iter().map(|(_, v)| u32::from(*v)).sum()
    }
}

impl<T> Index<StatKey> for StatTable<T> {
    type Output = T;

    fn index(&self, key: StatKey) -> &T {
        match key {
            StatKey::Hp => &self.hp,
            StatKey::Atk => &self.atk,
            StatKey::Def => &self.def,
            StatKey::Spa => &self.spa,
            StatKey::Spd => &self.spd,
            StatKey::Spe => &self.spe,
        }
    }
}

impl<T> IndexMut<StatKey> for StatTable<T> {
    fn index_mut(&mut self, key: StatKey) -> &mut T {
        match key {
            StatKey::Hp => &mut self.hp,
            StatKey::Atk => &mut self.atk,
            StatKey::Def => &mut self.def,
            StatKey::Spa => &mut self.spa,
            StatKey::Spd => &mut self.spd,
            StatKey::Spe => &mut self.spe,
        }
    }
}
