//! Run configuration file.
//!
//! Every section is optional; missing fields fall back to the library defaults, so `{}`
//! is a valid config. Command line flags are applied on top of the loaded file.

use std::path::Path;

use pokevo_evaluator::{
    EvaluationMode,
    fitness::{GauntletEvaluator, WinRewards},
    gauntlet::OpponentRecord,
    minimax::SearchParams,
};
use pokevo_training::{evolution::EvolutionParams, genome::GenomeConfig};
use serde::{Deserialize, Serialize};

use crate::util;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub mode: EvaluationMode,
    /// Template species; a custom combatant is evolved when absent.
    pub species: Option<String>,
    pub seed: Option<u64>,
    pub battles_per_opponent: usize,
    /// Replaces the built-in gauntlet of the selected mode.
    pub gauntlet: Option<Vec<OpponentRecord>>,
    pub rewards: WinRewards,
    pub search: SearchParams,
    pub genome: GenomeConfig,
    pub evolution: EvolutionParams,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            mode: EvaluationMode::default(),
            species: None,
            seed: None,
            battles_per_opponent: GauntletEvaluator::DEFAULT_BATTLES_PER_OPPONENT,
            gauntlet: None,
            rewards: WinRewards::default(),
            search: SearchParams::default(),
            genome: GenomeConfig::default(),
            evolution: EvolutionParams::default(),
        }
    }
}

impl RunConfig {
    /// Reads the config at `path`, or returns the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => util::read_json_file("config", path),
            None => Ok(Self::default()),
        }
    }

    /// The configured gauntlet, or the built-in one for the mode.
    pub fn gauntlet(&self) -> Vec<OpponentRecord> {
        self.gauntlet
            .clone()
            .unwrap_or_else(|| self.mode.default_gauntlet())
    }
}
