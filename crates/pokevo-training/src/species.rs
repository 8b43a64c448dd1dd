//! Species: clusters of compatible genomes.
//!
//! A species is anchored by the snapshot of the genome that founded it. The
//! representative never changes, even when later members outperform the founder, so
//! species boundaries only drift through newly founded species.

use rand::{Rng, seq::IndexedRandom};

use crate::genome::{Genome, GenomeId};

/// Maximum tournament size for parent selection.
const TOURNAMENT_SIZE: usize = 3;

#[derive(Debug, Clone)]
pub struct Species {
    representative: Genome,
    members: Vec<Genome>,
    best_fitness: f32,
    stagnation: usize,
    offspring_quota: usize,
}

impl Species {
    /// Founds a species with `founder` as its only member and representative.
    #[must_use]
    pub fn new(founder: Genome) -> Self {
        Self {
            representative: founder.clone(),
            best_fitness: founder.fitness(),
            members: vec![founder],
            stagnation: 0,
            offspring_quota: 0,
        }
    }

    /// The species is named after its founder.
    #[must_use]
    pub fn id(&self) -> GenomeId {
        self.representative.id()
    }

    #[must_use]
    pub fn representative(&self) -> &Genome {
        &self.representative
    }

    #[must_use]
    pub fn members(&self) -> &[Genome] {
        &self.members
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Best raw fitness the species has ever reached.
    #[must_use]
    pub fn best_fitness(&self) -> f32 {
        self.best_fitness
    }

    /// Generations since [`Self::best_fitness`] last improved.
    #[must_use]
    pub fn stagnation(&self) -> usize {
        self.stagnation
    }

    #[must_use]
    pub fn offspring_quota(&self) -> usize {
        self.offspring_quota
    }

    pub fn add(&mut self, genome: Genome) {
        self.members.push(genome);
    }

    pub(crate) fn take_members(&mut self) -> Vec<Genome> {
        std::mem::take(&mut self.members)
    }

    pub(crate) fn set_offspring_quota(&mut self, quota: usize) {
        self.offspring_quota = quota;
    }

    /// Member with the highest raw fitness.
    #[must_use]
    pub fn best_member(&self) -> Option<&Genome> {
        self.members
            .iter()
            .max_by(|a, b| a.fitness().total_cmp(&b.fitness()))
    }

    /// Resets the stagnation counter if the best member beats the recorded best,
    /// increments it otherwise. Returns whether the species improved.
    pub fn update_stagnation(&mut self) -> bool {
        let Some(current) = self.best_member().map(Genome::fitness) else {
            self.stagnation += 1;
            return false;
        };
        if current > self.best_fitness {
            self.best_fitness = current;
            self.stagnation = 0;
            true
        } else {
            self.stagnation += 1;
            false
        }
    }

    /// Sets every member's shared fitness to its raw fitness divided by the member count.
    #[expect(clippy::cast_precision_loss)]
    pub fn compute_shared_fitness(&mut self) {
        let n = self.members.len() as f32;
        for genome in &mut self.members {
            let shared = genome.fitness() / n;
            genome.set_shared_fitness(shared);
        }
    }

    /// Mean shared fitness of the members, zero for an empty species.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn average_shared_fitness(&self) -> f32 {
        if self.members.is_empty() {
            return 0.0;
        }
        let sum: f32 = self.members.iter().map(Genome::shared_fitness).sum();
        sum / self.members.len() as f32
    }

    /// Keeps the top `ceil(len × survival_threshold)` members by shared fitness, and
    /// always at least one.
    pub fn cull(&mut self, survival_threshold: f32) {
        if self.members.is_empty() {
            return;
        }
        self.members
            .sort_by(|a, b| b.shared_fitness().total_cmp(&a.shared_fitness()));
        #[expect(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            clippy::cast_precision_loss
        )]
        let survivors = (self.members.len() as f32 * survival_threshold).ceil() as usize;
        self.members.truncate(survivors.max(1));
    }

    /// Tournament selection: the member with the highest shared fitness among up to three
    /// random members.
    pub fn select_parent<R>(&self, rng: &mut R) -> Option<&Genome>
    where
        R: Rng + ?Sized,
    {
        let size = TOURNAMENT_SIZE.min(self.members.len());
        self.members
            .choose_multiple(rng, size)
            .max_by(|a, b| a.shared_fitness().total_cmp(&b.shared_fitness()))
    }
}
