//! Speciated evolution loop.
//!
//! Each call to [`Evolution::step`] runs one generation through a fixed sequence of
//! states:
//!
//! 1. **Evaluate** - every genome is scored by a [`FitnessEvaluator`], at most
//!    [`EvolutionParams::max_concurrent_evaluations`] at a time
//! 2. **Speciate** - genomes join the first species whose representative is closer than
//!    [`EvolutionParams::compatibility_threshold`], or found a new one
//! 3. **Cull stagnant** - shared fitness and stagnation are updated, and species stagnant
//!    for more than [`EvolutionParams::stagnation_limit`] generations are removed
//! 4. **Allocate offspring** - each surviving species gets a share of the next
//!    population proportional to its average shared fitness
//! 5. **Reproduce** - each species keeps its top members, clones its best genome
//!    unchanged, and fills the rest of its quota with mutated crossover children
//!
//! # Parallelization
//!
//! Evaluation spawns a bounded set of scoped worker threads that pull genomes from a
//! shared queue. Every genome gets a seed drawn from the caller's RNG *before* any worker
//! starts, so results do not depend on scheduling.
//!
//! # Extinction
//!
//! The last surviving species is never removed for stagnation. If no species is left
//! anyway, the loop stops early and the best genome ever observed becomes the only
//! champion.
//!
//! # Example
//!
//! ```rust,no_run
//! use pokevo_evaluator::{
//!     fitness::{GauntletEvaluator, WinRewards},
//!     gauntlet,
//!     move_selector::GreedySelector,
//! };
//! use pokevo_training::{
//!     evolution::{Evolution, EvolutionParams},
//!     genome::{GenomeConfig, GenomeTemplate},
//! };
//! use rand::SeedableRng as _;
//! use rand_pcg::Pcg32;
//!
//! let mut rng = Pcg32::seed_from_u64(0);
//! let evaluator = GauntletEvaluator::new(
//!     &gauntlet::simple_gauntlet(),
//!     3,
//!     WinRewards::default(),
//!     Box::new(GreedySelector::new()),
//! );
//! let mut evolution = Evolution::new(
//!     GenomeTemplate::Custom,
//!     GenomeConfig::default(),
//!     EvolutionParams::default(),
//!     &mut rng,
//! )
//! .unwrap();
//! let champions = evolution.run(&evaluator, &mut rng, |report| {
//!     println!("generation {}: best {}", report.generation, report.best_fitness);
//! })
//! .unwrap();
//! assert!(!champions.is_empty());
//! ```

use std::{sync::Mutex, thread};

use pokevo_evaluator::fitness::FitnessEvaluator;
use rand::{Rng, SeedableRng as _};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::{
    distance::{self, CompatibilityCoefficients},
    genome::{Genome, GenomeConfig, GenomeId, GenomeTemplate},
    species::Species,
};

/// Failures of the loop's own bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum EvolutionError {
    #[display("population size must be at least 1")]
    ZeroPopulation,
    #[display("at least one concurrent evaluation is required")]
    ZeroConcurrency,
    #[display("no genome survived to become a champion")]
    EmptyPopulation,
}

/// Tunables of the evolution loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionParams {
    pub population_size: usize,
    pub generations: usize,
    /// Genomes closer than this to a representative join its species.
    pub compatibility_threshold: f32,
    /// Generations a species may go without improving before it is removed.
    pub stagnation_limit: usize,
    /// Fraction of each species kept as parents.
    pub survival_threshold: f32,
    /// Probability that a crossover child is mutated.
    pub mutation_rate: f64,
    pub max_concurrent_evaluations: usize,
    pub coefficients: CompatibilityCoefficients,
}

impl Default for EvolutionParams {
    fn default() -> Self {
        Self {
            population_size: 20,
            generations: 10,
            compatibility_threshold: 4.0,
            stagnation_limit: 5,
            survival_threshold: 0.4,
            mutation_rate: 0.3,
            max_concurrent_evaluations: 6,
            coefficients: CompatibilityCoefficients::default(),
        }
    }
}

/// Summary of one finished generation.
#[derive(Debug, Clone)]
pub struct GenerationReport {
    /// 1-based generation number.
    pub generation: usize,
    pub best_fitness: f32,
    pub mean_fitness: f32,
    /// Species alive after stagnation culling.
    pub species_count: usize,
    /// Ids of species removed for stagnation this generation.
    pub culled_species: Vec<GenomeId>,
    /// Best genome of this generation.
    pub best_genome: Genome,
    /// Best genome observed in any generation so far.
    pub best_ever: Genome,
}

/// The population, its species and the run history.
#[derive(Debug)]
pub struct Evolution {
    genome_config: GenomeConfig,
    params: EvolutionParams,
    population: Vec<Genome>,
    species: Vec<Species>,
    generation: usize,
    best_ever: Option<Genome>,
    history: Vec<GenerationReport>,
}

impl Evolution {
    /// Creates a random initial population from `template`.
    pub fn new<R>(
        template: GenomeTemplate,
        genome_config: GenomeConfig,
        params: EvolutionParams,
        rng: &mut R,
    ) -> Result<Self, EvolutionError>
    where
        R: Rng + ?Sized,
    {
        if params.population_size == 0 {
            return Err(EvolutionError::ZeroPopulation);
        }
        if params.max_concurrent_evaluations == 0 {
            return Err(EvolutionError::ZeroConcurrency);
        }
        let population = (0..params.population_size)
            .map(|_| Genome::random(template, &genome_config, rng))
            .collect();
        Ok(Self {
            genome_config,
            params,
            population,
            species: vec![],
            generation: 0,
            best_ever: None,
            history: vec![],
        })
    }

    /// Genomes waiting for (or fresh from) evaluation.
    #[must_use]
    pub fn population(&self) -> &[Genome] {
        &self.population
    }

    #[must_use]
    pub fn species(&self) -> &[Species] {
        &self.species
    }

    /// Number of completed generations.
    #[must_use]
    pub fn generation(&self) -> usize {
        self.generation
    }

    #[must_use]
    pub fn best_ever(&self) -> Option<&Genome> {
        self.best_ever.as_ref()
    }

    #[must_use]
    pub fn history(&self) -> &[GenerationReport] {
        &self.history
    }

    /// Runs every configured generation and returns the champions.
    ///
    /// `on_generation` sees each report as soon as its generation finishes.
    pub fn run<E, R, F>(
        &mut self,
        evaluator: &E,
        rng: &mut R,
        mut on_generation: F,
    ) -> Result<Vec<Genome>, EvolutionError>
    where
        E: FitnessEvaluator + ?Sized,
        R: Rng + ?Sized,
        F: FnMut(&GenerationReport),
    {
        for _ in 0..self.params.generations {
            let Some(report) = self.step(evaluator, rng) else {
                break;
            };
            on_generation(report);
        }
        self.champions()
    }

    /// Runs one generation. Returns `None` if no species survived it.
    pub fn step<E, R>(&mut self, evaluator: &E, rng: &mut R) -> Option<&GenerationReport>
    where
        E: FitnessEvaluator + ?Sized,
        R: Rng + ?Sized,
    {
        self.evaluate(evaluator, rng);
        self.generation += 1;

        let (best_genome, mean_fitness) = self.population_summary()?;
        if self
            .best_ever
            .as_ref()
            .is_none_or(|best| best_genome.fitness() > best.fitness())
        {
            self.best_ever = Some(best_genome.clone());
        }

        self.speciate();
        let culled_species = self.cull_stagnant();
        if self.species.is_empty() {
            log::warn!("all species died out in generation {}", self.generation);
            return None;
        }
        self.allocate_offspring();

        let report = GenerationReport {
            generation: self.generation,
            best_fitness: best_genome.fitness(),
            mean_fitness,
            species_count: self.species.len(),
            culled_species,
            best_ever: self.best_ever.clone().unwrap_or_else(|| best_genome.clone()),
            best_genome,
        };
        log::info!(
            "generation {}: best {:.1}, mean {:.1}, {} species",
            report.generation,
            report.best_fitness,
            report.mean_fitness,
            report.species_count
        );

        self.reproduce(rng);
        self.history.push(report);
        self.history.last()
    }

    /// Scores every genome in the population.
    pub fn evaluate<E, R>(&mut self, evaluator: &E, rng: &mut R)
    where
        E: FitnessEvaluator + ?Sized,
        R: Rng + ?Sized,
    {
        let seeds: Vec<u64> = self.population.iter().map(|_| rng.next_u64()).collect();
        let workers = self
            .params
            .max_concurrent_evaluations
            .min(self.population.len());
        let queue = Mutex::new(self.population.iter_mut().zip(seeds));
        thread::scope(|s| {
            for _ in 0..workers {
                s.spawn(|| {
                    loop {
                        let Some((genome, seed)) = queue.lock().ok().and_then(|mut q| q.next())
                        else {
                            break;
                        };
                        let mut rng = Pcg32::seed_from_u64(seed);
                        let report = evaluator.evaluate(&genome.to_spec(), &mut rng);
                        genome.record_evaluation(&report);
                    }
                });
            }
        });
    }

    /// Best genome (cloned) and mean raw fitness of the current population.
    #[expect(clippy::cast_precision_loss)]
    fn population_summary(&self) -> Option<(Genome, f32)> {
        let best = self
            .population
            .iter()
            .max_by(|a, b| a.fitness().total_cmp(&b.fitness()))?;
        let sum: f32 = self.population.iter().map(Genome::fitness).sum();
        Some((best.clone(), sum / self.population.len() as f32))
    }

    /// Moves every genome of the population into a species.
    fn speciate(&mut self) {
        for species in &mut self.species {
            species.take_members();
        }
        for genome in std::mem::take(&mut self.population) {
            let home = self.species.iter_mut().find(|species| {
                distance::distance(
                    &genome,
                    species.representative(),
                    &self.params.coefficients,
                    &self.genome_config,
                ) < self.params.compatibility_threshold
            });
            match home {
                Some(species) => species.add(genome),
                None => self.species.push(Species::new(genome)),
            }
        }
        self.species.retain(|species| !species.is_empty());
    }

    /// Updates shared fitness and stagnation, then removes stagnant species.
    ///
    /// The last species left is kept even when stagnant.
    fn cull_stagnant(&mut self) -> Vec<GenomeId> {
        for species in &mut self.species {
            species.compute_shared_fitness();
            species.update_stagnation();
        }

        let limit = self.params.stagnation_limit;
        let mut remaining = self.species.len();
        let mut culled = vec![];
        let mut survivors = Vec::with_capacity(remaining);
        for species in std::mem::take(&mut self.species) {
            remaining -= 1;
            let last_one = survivors.is_empty() && remaining == 0;
            if species.stagnation() > limit && !last_one {
                log::debug!(
                    "species {} stagnant for {} generations, removing",
                    species.id(),
                    species.stagnation()
                );
                culled.push(species.id());
            } else {
                survivors.push(species);
            }
        }
        self.species = survivors;
        culled
    }

    fn allocate_offspring(&mut self) {
        let averages: Vec<f32> = self
            .species
            .iter()
            .map(Species::average_shared_fitness)
            .collect();
        let quotas = allocate_offspring(&averages, self.params.population_size);
        for (species, quota) in self.species.iter_mut().zip(quotas) {
            species.set_offspring_quota(quota);
        }
    }

    /// Builds the next population from the species' culled members.
    fn reproduce<R>(&mut self, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        let mut next = Vec::with_capacity(self.params.population_size);
        for species in &mut self.species {
            species.cull(self.params.survival_threshold);
            let quota = species.offspring_quota();
            if quota == 0 {
                continue;
            }
            if let Some(elite) = species.best_member() {
                next.push(elite.clone());
            }
            for _ in 1..quota {
                let (Some(p1), Some(p2)) = (species.select_parent(rng), species.select_parent(rng))
                else {
                    continue;
                };
                let mut child = Genome::crossover(p1, p2, &self.genome_config, rng);
                if rng.random::<f64>() < self.params.mutation_rate {
                    let facet = child.mutate(&self.genome_config, rng);
                    log::trace!("mutated {} of genome {}", facet, child.id());
                }
                next.push(child);
            }
        }
        self.population = next;
    }

    /// Best member of each surviving species, or the best genome ever seen if every
    /// species is gone.
    pub fn champions(&self) -> Result<Vec<Genome>, EvolutionError> {
        let champions: Vec<Genome> = self
            .species
            .iter()
            .filter_map(Species::best_member)
            .cloned()
            .collect();
        if !champions.is_empty() {
            return Ok(champions);
        }
        self.best_ever
            .clone()
            .map(|best| vec![best])
            .ok_or(EvolutionError::EmptyPopulation)
    }
}

/// Splits `population_size` offspring across species proportionally to `averages`.
///
/// Shares are floored, and the remainder is handed out one by one in species order, so
/// the quotas always sum to `population_size` (as long as there is at least one
/// species). If every average is zero the population is split evenly.
#[must_use]
pub fn allocate_offspring(averages: &[f32], population_size: usize) -> Vec<usize> {
    if averages.is_empty() {
        return vec![];
    }
    let total: f32 = averages.iter().sum();
    let mut quotas: Vec<usize> = if total > 0.0 {
        averages
            .iter()
            .map(|average| {
                #[expect(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let quota = (average / total * population_size as f32).floor() as usize;
                quota
            })
            .collect()
    } else {
        vec![population_size / averages.len(); averages.len()]
    };
    let assigned: usize = quotas.iter().sum();
    let remainder = population_size.saturating_sub(assigned);
    let len = quotas.len();
    for i in 0..remainder {
        quotas[i % len] += 1;
    }
    quotas
}
