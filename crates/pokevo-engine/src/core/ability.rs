use std::fmt;

use serde::{Deserialize, Serialize};

/// Abilities known to the simulator.
///
/// Only some of them change battle outcomes in a single-combatant battle; the rest
/// (weather and switching abilities) are carried so gauntlet records parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Ability {
    Pressure,
    Levitate,
    Intimidate,
    Technician,
    FlashFire,
    Adaptability,
    ThickFat,
    Sturdy,
    SandVeil,
    SandStream,
    NaturalCure,
    InnerFocus,
}

impl Ability {
    pub const ALL: [Self; 12] = [
        Self::Pressure,
        Self::Levitate,
        Self::Intimidate,
        Self::Technician,
        Self::FlashFire,
        Self::Adaptability,
        Self::ThickFat,
        Self::Sturdy,
        Self::SandVeil,
        Self::SandStream,
        Self::NaturalCure,
        Self::InnerFocus,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Pressure => "pressure",
            Self::Levitate => "levitate",
            Self::Intimidate => "intimidate",
            Self::Technician => "technician",
            Self::FlashFire => "flash-fire",
            Self::Adaptability => "adaptability",
            Self::ThickFat => "thick-fat",
            Self::Sturdy => "sturdy",
            Self::SandVeil => "sand-veil",
            Self::SandStream => "sand-stream",
            Self::NaturalCure => "natural-cure",
            Self::InnerFocus => "inner-focus",
        }
    }

    /// Accepts `"flash-fire"`, `"Flash Fire"` and `"flash_fire"` alike.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized = name.trim().to_ascii_lowercase().replace([' ', '_'], "-");
        Self::ALL.into_iter().find(|a| a.name() == normalized)
    }
}

impl fmt::Display for Ability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
