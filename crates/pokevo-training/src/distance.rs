//! Compatibility distance between genomes.
//!
//! The distance is a weighted sum of components that each fall roughly in `[0, 1]`:
//!
//! | component | normalized by | applies to |
//! |---|---|---|
//! | base stat difference (sum of absolute differences) | base stat total × 1.5 | both custom |
//! | type symmetric difference | 2 | both custom |
//! | move symmetric difference | [`MAX_MOVES`] | all |
//! | effort difference (sum of absolute differences) | effort total × 2 | all |
//! | nature differs | - | all |
//! | ability differs | - | both custom |

use pokevo_engine::{MAX_MOVES, StatKey, StatTable};
use serde::{Deserialize, Serialize};

use crate::genome::{Genome, GenomeConfig};

/// Weights of the distance components.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompatibilityCoefficients {
    pub stats: f32,
    pub types: f32,
    pub moves: f32,
    pub effort: f32,
    pub nature: f32,
    pub ability: f32,
}

impl Default for CompatibilityCoefficients {
    fn default() -> Self {
        Self {
            stats: 1.0,
            types: 1.0,
            moves: 0.8,
            effort: 0.5,
            nature: 0.2,
            ability: 0.0,
        }
    }
}

/// Weighted dissimilarity of two genomes. Symmetric, and zero for identical genomes.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn distance(
    a: &Genome,
    b: &Genome,
    coefficients: &CompatibilityCoefficients,
    config: &GenomeConfig,
) -> f32 {
    let both_custom = a.is_custom() && b.is_custom();
    let mut total = 0.0;

    if both_custom {
        let stat_diff = abs_diff_sum(a.base_stats(), b.base_stats());
        total +=
            coefficients.stats * (stat_diff / (f32::from(config.max_base_stat_total) * 1.5));
        let type_diff = symmetric_difference(a.types(), b.types());
        total += coefficients.types * (type_diff as f32 / 2.0);
    }

    let move_diff = symmetric_difference(a.moves(), b.moves());
    total += coefficients.moves * (move_diff as f32 / MAX_MOVES as f32);

    let effort_diff = abs_diff_sum(a.evs(), b.evs());
    total += coefficients.effort * (effort_diff / (f32::from(config.max_effort_total) * 2.0));

    if a.nature() != b.nature() {
        total += coefficients.nature;
    }
    if both_custom && a.ability() != b.ability() {
        total += coefficients.ability;
    }
    total
}

fn abs_diff_sum(a: &StatTable<u16>, b: &StatTable<u16>) -> f32 {
    StatKey::ALL
        .into_iter()
        .map(|key| f32::from(a[key].abs_diff(b[key])))
        .sum()
}

fn symmetric_difference<T: PartialEq>(a: &[T], b: &[T]) -> usize {
    a.iter().filter(|x| !b.contains(x)).count() + b.iter().filter(|x| !a.contains(x)).count()
}
