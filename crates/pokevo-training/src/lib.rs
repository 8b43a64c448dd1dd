//! Speciated evolution of combatant genomes.
//!
//! This crate evolves [`genome::Genome`]s (moves, nature, effort values and, for custom
//! combatants, base stats, typing and ability) against a gauntlet of fixed opponents. The
//! fitness signal comes from battles played by `pokevo-evaluator`, so the quality of the
//! move selector directly shapes what evolution rewards.
//!
//! # How Evolution Works
//!
//! 1. **Population** - Create random genomes from a template
//! 2. **Evaluation** - Each genome battles every gauntlet opponent several times
//! 3. **Speciation** - Genomes are grouped by [compatibility distance](distance)
//! 4. **Fitness sharing** - Raw fitness is divided by species size, so a large species
//!    cannot crowd out small ones
//! 5. **Stagnation** - Species that stop improving are removed (except the last one)
//! 6. **Reproduction** - Each species fills a fitness-proportional quota with its elite
//!    and mutated crossover children
//!
//! # Architecture
//!
//! ```text
//! Evolution (evolution)
//!     ↓ groups
//! Species (species) ←── distance (distance)
//!     ↓ breed
//! Genome (genome) ←── stat budgets (allocation)
//!     ↓ to_spec()
//! CombatantSpec (pokevo-engine)
//!     ↓ scored by
//! FitnessEvaluator (pokevo-evaluator)
//! ```
//!
//! # Modules
//!
//! - [`allocation`] - budgeted integer stat tables (normalization, effort spreads)
//! - [`genome`] - random initialization, mutation and crossover
//! - [`distance`] - weighted genome dissimilarity
//! - [`species`] - membership, shared fitness, stagnation, culling, parent selection
//! - [`evolution`] - the per-generation state machine
//!
//! # Current Limitations
//!
//! - Species representatives are fixed when the species is founded
//! - Fitness is measured against a fixed gauntlet only; genomes never battle each other
//!   during evolution
//! - Mutation touches exactly one facet per call

pub mod allocation;
pub mod distance;
pub mod evolution;
pub mod genome;
pub mod species;
