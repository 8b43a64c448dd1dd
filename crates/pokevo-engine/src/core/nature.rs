use std::fmt;

use serde::{Deserialize, Serialize};

use super::stat::StatKey;

/// A nature raises one non-HP stat by 10% and lowers another by 10%.
///
/// The five neutral natures (`Bashful`, `Docile`, `Hardy`, `Quirky`, `Serious`)
/// leave every stat unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Nature {
    Adamant,
    Bashful,
    Bold,
    Brave,
    Calm,
    Careful,
    Docile,
    Gentle,
    Hardy,
    Hasty,
    Impish,
    Jolly,
    Lax,
    Lonely,
    Mild,
    Modest,
    Naive,
    Naughty,
    Quiet,
    Quirky,
    Rash,
    Relaxed,
    Sassy,
    Serious,
    Timid,
}

impl Nature {
    pub const ALL: [Self; 25] = [
        Self::Adamant,
        Self::Bashful,
        Self::Bold,
        Self::Brave,
        Self::Calm,
        Self::Careful,
        Self::Docile,
        Self::Gentle,
        Self::Hardy,
        Self::Hasty,
        Self::Impish,
        Self::Jolly,
        Self::Lax,
        Self::Lonely,
        Self::Mild,
        Self::Modest,
        Self::Naive,
        Self::Naughty,
        Self::Quiet,
        Self::Quirky,
        Self::Rash,
        Self::Relaxed,
        Self::Sassy,
        Self::Serious,
        Self::Timid,
    ];

    /// The `(raised, lowered)` stat pair, or `None` for neutral natures.
    #[must_use]
    pub const fn bias(self) -> Option<(StatKey, StatKey)> {
        use StatKey::{Atk, Def, Spa, Spd, Spe};
        let pair = match self {
            Self::Bashful | Self::Docile | Self::Hardy | Self::Quirky | Self::Serious => {
                return None;
            }
            Self::Adamant => (Atk, Spa),
            Self::Bold => (Def, Atk),
            Self::Brave => (Atk, Spe),
            Self::Calm => (Spd, Atk),
            Self::Careful => (Spd, Spa),
            Self::Gentle => (Spd, Def),
            Self::Hasty => (Spe, Def),
            Self::Impish => (Def, Spa),
            Self::Jolly => (Spe, Spa),
            Self::Lax => (Def, Spd),
            Self::Lonely => (Atk, Def),
            Self::Mild => (Spa, Def),
            Self::Modest => (Spa, Atk),
            Self::Naive => (Spe, Spd),
            Self::Naughty => (Atk, Spd),
            Self::Quiet => (Spa, Spe),
            Self::Rash => (Spa, Spd),
            Self::Relaxed => (Def, Spe),
            Self::Sassy => (Spd, Spe),
            Self::Timid => (Spe, Atk),
        };
        Some(pair)
    }

    /// Multiplier this nature applies to `stat`.
    #[must_use]
    pub fn multiplier(self, stat: StatKey) -> f32 {
        match self.bias() {
            Some((up, _)) if up == stat => 1.1,
            Some((_, down)) if down == stat => 0.9,
            _ => 1.0,
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|nature| nature.to_string().eq_ignore_ascii_case(name.trim()))
    }
}

impl fmt::Display for Nature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jolly_trades_special_attack_for_speed() {
        assert!((Nature::Jolly.multiplier(StatKey::Spe) - 1.1).abs() < f32::EPSILON);
        assert!((Nature::Jolly.multiplier(StatKey::Spa) - 0.9).abs() < f32::EPSILON);
        assert!((Nature::Jolly.multiplier(StatKey::Atk) - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_neutral_natures_have_no_bias() {
        let neutral = Nature::ALL.iter().filter(|n| n.bias().is_none()).count();
        assert_eq!(neutral, 5);
        assert_eq!(Nature::from_name("timid"), Some(Nature::Timid));
    }
}
