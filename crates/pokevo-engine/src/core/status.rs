use serde::{Deserialize, Serialize};

/// Non-volatile status conditions.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::IsVariant,
)]
#[serde(rename_all = "kebab-case")]
pub enum StatusKind {
    Burn,
    Poison,
    Toxic,
    Paralysis,
    Sleep,
    Freeze,
}

impl StatusKind {
    /// Whether the condition can prevent its holder from acting.
    #[must_use]
    pub const fn is_disabling(self) -> bool {
        matches!(self, Self::Paralysis | Self::Sleep | Self::Freeze)
    }
}

/// A status condition together with its running counter.
///
/// For sleep the counter is the number of turns left asleep; for badly poisoned it
/// is the number of residual ticks taken so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status {
    pub kind: StatusKind,
    pub counter: u8,
}

impl Status {
    #[must_use]
    pub const fn new(kind: StatusKind) -> Self {
        Self { kind, counter: 0 }
    }
}
