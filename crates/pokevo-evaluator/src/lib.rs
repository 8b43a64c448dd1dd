//! Move search and fitness evaluation for evolved combatants.
//!
//! The crate is layered the same way a battle is played:
//!
//! ```text
//! Fitness evaluation (gauntlet battles → scalar fitness)
//!     ↓ uses
//! Move selection (greedy or minimax, one choice per side per turn)
//!     ↓ uses
//! Static evaluation + damage estimates (score a position / a move)
//! ```
//!
//! - [`damage`] - analytic damage estimates used for ordering and greedy play
//! - [`static_eval`] - leaf scores for the search
//! - [`move_selector`] - the [`MoveSelector`](move_selector::MoveSelector) seam and the
//!   greedy selector
//! - [`minimax`] - depth-limited alpha-beta search
//! - [`gauntlet`] - opponent records and the built-in gauntlets
//! - [`fitness`] - battles against the gauntlet with diminishing win rewards
//! - [`tournament`] - round robin between champions
//!
//! All search state is passed explicitly; nothing is shared between concurrent
//! evaluations except immutable combatant specs.

use serde::{Deserialize, Serialize};

use crate::{
    gauntlet::OpponentRecord,
    minimax::{MinimaxSelector, SearchParams},
    move_selector::{GreedySelector, MoveSelector},
};

pub mod damage;
pub mod fitness;
pub mod gauntlet;
pub mod minimax;
pub mod move_selector;
pub mod static_eval;
pub mod tournament;

/// How battles are played during evaluation.
#[derive(
    Default, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::FromStr,
)]
#[serde(rename_all = "lowercase")]
pub enum EvaluationMode {
    /// Greedy damage selection against all-out attackers.
    Simple,
    /// Minimax search against the status/setup gauntlet.
    #[default]
    Advanced,
}

impl EvaluationMode {
    #[must_use]
    pub fn selector(self, params: SearchParams) -> Box<dyn MoveSelector> {
        match self {
            Self::Simple => Box::new(GreedySelector::new()),
            Self::Advanced => Box::new(MinimaxSelector::new(params)),
        }
    }

    #[must_use]
    pub fn default_gauntlet(self) -> Vec<OpponentRecord> {
        match self {
            Self::Simple => gauntlet::simple_gauntlet(),
            Self::Advanced => gauntlet::advanced_gauntlet(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parses_case_insensitively() {
        assert_eq!("simple".parse::<EvaluationMode>().unwrap(), EvaluationMode::Simple);
        assert_eq!("Advanced".parse::<EvaluationMode>().unwrap(), EvaluationMode::Advanced);
        assert!("chaotic".parse::<EvaluationMode>().is_err());
    }
}
