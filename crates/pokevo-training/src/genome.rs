//! Evolvable combatant descriptions.
//!
//! A [`Genome`] is either *custom* (base stats, typing and ability evolve too) or built
//! on a species *template* (those facets are copied from the species and never change).
//! Every genome evolves its moveset, nature and effort values.
//!
//! Invariants kept by [`Genome::random`], [`Genome::mutate`] and [`Genome::crossover`]:
//!
//! - custom base stats sum to exactly [`GenomeConfig::max_base_stat_total`]
//! - effort values sum to at most [`GenomeConfig::max_effort_total`], each within
//!   [`GenomeConfig::max_effort_per_stat`]
//! - the moveset has [`MAX_MOVES`] distinct moves drawn from [`GenomeTemplate::move_pool`],
//!   as long as that pool is large enough
//! - two types, when present, are distinct
//!
//! Genomes compare equal by [`GenomeId`] only. Cloning keeps the id, so an elite carried
//! into the next generation is still the same genome.

use std::{
    borrow::Cow,
    ops::RangeInclusive,
    sync::atomic::{AtomicU64, Ordering},
};

use arrayvec::ArrayVec;
use pokevo_engine::{
    Ability, CombatantSpec, DEFAULT_MOVE_POOL, ElementType, MAX_EV_PER_STAT, MAX_EV_TOTAL,
    MAX_MOVES, MoveId, Nature, SpeciesData, StatTable,
};
use pokevo_evaluator::fitness::FitnessReport;
use rand::{Rng, seq::IndexedRandom};
use serde::{Deserialize, Serialize};

use crate::allocation;

/// Name given to custom genomes.
pub const CUSTOM_NAME: &str = "Mewthree";

static NEXT_GENOME_ID: AtomicU64 = AtomicU64::new(0);

/// Unique, never reused genome identifier.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[serde(transparent)]
pub struct GenomeId(u64);

impl GenomeId {
    fn next() -> Self {
        Self(NEXT_GENOME_ID.fetch_add(1, Ordering::Relaxed))
    }

    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

/// What a population is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenomeTemplate {
    /// Fully evolvable combatant.
    Custom,
    /// Stats, typing and ability fixed by a species.
    Species(&'static SpeciesData),
}

impl GenomeTemplate {
    /// Looks up a species template by name.
    #[must_use]
    pub fn from_species_name(name: &str) -> Option<Self> {
        SpeciesData::from_name(name).map(Self::Species)
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Custom => CUSTOM_NAME,
            Self::Species(species) => species.name,
        }
    }

    #[must_use]
    pub fn is_custom(self) -> bool {
        matches!(self, Self::Custom)
    }

    /// Moves a genome built on this template may carry.
    ///
    /// Species use their learnset; custom genomes (and species without one) use
    /// [`GenomeConfig::move_pool`].
    #[must_use]
    pub fn move_pool(self, config: &GenomeConfig) -> Cow<'_, [MoveId]> {
        match self {
            Self::Species(species) if !species.learnset.is_empty() => {
                Cow::Owned(species.learnset_moves())
            }
            _ => Cow::Borrowed(&config.move_pool),
        }
    }
}

/// Budgets and pools that bound every genome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenomeConfig {
    pub max_base_stat_total: u16,
    pub max_effort_total: u16,
    pub max_effort_per_stat: u16,
    /// Effort given to the third stat of a fresh spread.
    pub minor_effort: u16,
    /// Amount a stat mutation moves between two base stats.
    pub stat_mutation_step: RangeInclusive<u16>,
    /// Range each base stat is drawn from before normalization.
    pub base_stat_draw: RangeInclusive<u16>,
    pub move_pool: Vec<MoveId>,
    pub type_pool: Vec<ElementType>,
    pub ability_pool: Vec<Ability>,
}

impl Default for GenomeConfig {
    fn default() -> Self {
        Self {
            max_base_stat_total: 600,
            max_effort_total: MAX_EV_TOTAL,
            max_effort_per_stat: MAX_EV_PER_STAT,
            minor_effort: 6,
            stat_mutation_step: 1..=20,
            base_stat_draw: 1..=100,
            move_pool: DEFAULT_MOVE_POOL
                .iter()
                .filter_map(|name| MoveId::from_name(name))
                .collect(),
            type_pool: ElementType::EVOLVABLE.to_vec(),
            ability_pool: Ability::ALL.to_vec(),
        }
    }
}

/// The facet changed by one [`Genome::mutate`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum Mutation {
    #[display("effort")]
    Effort,
    #[display("moves")]
    Moves,
    #[display("nature")]
    Nature,
    #[display("stats")]
    Stats,
    #[display("types")]
    Types,
    #[display("ability")]
    Ability,
}

impl Mutation {
    const COMMON: [Self; 3] = [Self::Effort, Self::Moves, Self::Nature];
    const CUSTOM: [Self; 6] = [
        Self::Effort,
        Self::Moves,
        Self::Nature,
        Self::Stats,
        Self::Types,
        Self::Ability,
    ];
}

/// One candidate combatant plus its latest evaluation.
#[derive(Debug, Clone)]
pub struct Genome {
    id: GenomeId,
    name: String,
    template: GenomeTemplate,
    base_stats: StatTable<u16>,
    types: ArrayVec<ElementType, 2>,
    ability: Ability,
    nature: Nature,
    evs: StatTable<u16>,
    moves: ArrayVec<MoveId, MAX_MOVES>,
    fitness: f32,
    shared_fitness: f32,
    opponents_defeated: usize,
}

impl PartialEq for Genome {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Genome {}

impl Genome {
    /// Creates a random genome from `template`.
    ///
    /// Template genomes only randomize moves, nature and effort; custom genomes also draw
    /// base stats, one or two types and an ability.
    pub fn random<R>(template: GenomeTemplate, config: &GenomeConfig, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let mut genome = Self::from_template(template);
        if template.is_custom() {
            genome.base_stats = allocation::random_base_stats(
                &config.base_stat_draw,
                config.max_base_stat_total,
                rng,
            );
            let type_count = rng.random_range(1..=2);
            genome.types = config
                .type_pool
                .choose_multiple(rng, type_count)
                .copied()
                .collect();
            genome.types.sort_unstable();
            if let Some(&ability) = config.ability_pool.choose(rng) {
                genome.ability = ability;
            }
        }
        genome.moves = template
            .move_pool(config)
            .choose_multiple(rng, MAX_MOVES)
            .copied()
            .collect();
        sort_moves(&mut genome.moves);
        genome.evs = random_efforts(config, rng);
        genome.nature = random_nature(rng);
        genome
    }

    /// An unrandomized genome: template facets filled in, everything else empty.
    fn from_template(template: GenomeTemplate) -> Self {
        let (base_stats, types, ability) = match template {
            GenomeTemplate::Custom => (StatTable::splat(0), ArrayVec::new(), Ability::Pressure),
            GenomeTemplate::Species(species) => (
                species.base_stats,
                species.types.iter().copied().collect(),
                species.ability,
            ),
        };
        Self {
            id: GenomeId::next(),
            name: template.name().to_owned(),
            template,
            base_stats,
            types,
            ability,
            nature: Nature::Hardy,
            evs: StatTable::splat(0),
            moves: ArrayVec::new(),
            fitness: 0.0,
            shared_fitness: 0.0,
            opponents_defeated: 0,
        }
    }

    /// Applies one localized change to a random evolvable facet.
    ///
    /// Returns the facet that was picked. The pick can be a no-op when the facet has no
    /// legal alternative (a full move pool already in use, a base stat too small to give
    /// the drawn amount).
    pub fn mutate<R>(&mut self, config: &GenomeConfig, rng: &mut R) -> Mutation
    where
        R: Rng + ?Sized,
    {
        let facets: &[Mutation] = if self.is_custom() {
            &Mutation::CUSTOM
        } else {
            &Mutation::COMMON
        };
        let facet = facets[rng.random_range(0..facets.len())];
        match facet {
            Mutation::Effort => self.evs = random_efforts(config, rng),
            Mutation::Moves => {
                let unused: Vec<MoveId> = self
                    .template
                    .move_pool(config)
                    .iter()
                    .copied()
                    .filter(|m| !self.moves.contains(m))
                    .collect();
                if let Some(&new) = unused.choose(rng) {
                    if self.moves.is_empty() {
                        self.moves.push(new);
                    } else {
                        let slot = rng.random_range(0..self.moves.len());
                        self.moves[slot] = new;
                    }
                    sort_moves(&mut self.moves);
                }
            }
            Mutation::Nature => self.nature = random_nature(rng),
            Mutation::Stats => {
                allocation::shift_stat(&mut self.base_stats, &config.stat_mutation_step, rng);
            }
            Mutation::Types => {
                let unused: Vec<ElementType> = config
                    .type_pool
                    .iter()
                    .copied()
                    .filter(|ty| !self.types.contains(ty))
                    .collect();
                if let Some(&new) = unused.choose(rng) {
                    if self.types.is_empty() {
                        self.types.push(new);
                    } else {
                        let slot = rng.random_range(0..self.types.len());
                        self.types[slot] = new;
                    }
                    self.types.sort_unstable();
                }
            }
            Mutation::Ability => {
                let others: Vec<Ability> = config
                    .ability_pool
                    .iter()
                    .copied()
                    .filter(|a| *a != self.ability)
                    .collect();
                if let Some(&new) = others.choose(rng) {
                    self.ability = new;
                }
            }
        }
        facet
    }

    /// Breeds a new genome from two parents.
    ///
    /// # Process
    ///
    /// 1. **Nature**: taken from either parent at random
    /// 2. **Moves**: the union of both movesets, padded from `p1`'s move pool if it is
    ///    smaller than [`MAX_MOVES`], then a random subset of [`MAX_MOVES`]
    /// 3. **Effort**: per-stat floor average, capped per stat and trimmed to the total
    /// 4. **Custom only**: ability from either parent, base stats averaged and corrected
    ///    to the exact total, one or two types drawn from the union of parent types
    ///
    /// Template genomes copy base stats, types and ability from `p1`.
    pub fn crossover<R>(p1: &Self, p2: &Self, config: &GenomeConfig, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let mut child = Self {
            id: GenomeId::next(),
            name: p1.name.clone(),
            template: p1.template,
            base_stats: p1.base_stats,
            types: p1.types.clone(),
            ability: p1.ability,
            nature: pick(p1.nature, p2.nature, rng),
            evs: allocation::blend_efforts(
                &p1.evs,
                &p2.evs,
                config.max_effort_per_stat,
                config.max_effort_total,
                rng,
            ),
            moves: ArrayVec::new(),
            fitness: 0.0,
            shared_fitness: 0.0,
            opponents_defeated: 0,
        };

        let mut combined: Vec<MoveId> = Vec::with_capacity(MAX_MOVES * 2);
        for m in p1.moves.iter().chain(&p2.moves) {
            if !combined.contains(m) {
                combined.push(*m);
            }
        }
        if combined.len() < MAX_MOVES {
            let unused: Vec<MoveId> = p1
                .template
                .move_pool(config)
                .iter()
                .copied()
                .filter(|m| !combined.contains(m))
                .collect();
            let needed = MAX_MOVES - combined.len();
            combined.extend(unused.choose_multiple(rng, needed).copied());
        }
        child.moves = combined.choose_multiple(rng, MAX_MOVES).copied().collect();
        sort_moves(&mut child.moves);

        if child.is_custom() {
            child.ability = pick(p1.ability, p2.ability, rng);
            child.base_stats = allocation::blend_base_stats(
                &p1.base_stats,
                &p2.base_stats,
                config.max_base_stat_total,
                rng,
            );
            child.types = blend_types(&p1.types, &p2.types, &config.type_pool, rng);
        }
        child
    }

    /// The battle-ready description of this genome.
    #[must_use]
    pub fn to_spec(&self) -> CombatantSpec {
        CombatantSpec {
            name: self.name.clone(),
            base_stats: self.base_stats,
            types: self.types.clone(),
            ability: self.ability,
            nature: self.nature,
            evs: self.evs,
            moves: self.moves.clone(),
        }
    }

    pub(crate) fn record_evaluation(&mut self, report: &FitnessReport) {
        self.fitness = report.fitness;
        self.opponents_defeated = report.opponents_defeated;
    }

    pub(crate) fn set_shared_fitness(&mut self, shared_fitness: f32) {
        self.shared_fitness = shared_fitness;
    }

    #[must_use]
    pub fn id(&self) -> GenomeId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn is_custom(&self) -> bool {
        self.template.is_custom()
    }

    #[must_use]
    pub fn base_stats(&self) -> &StatTable<u16> {
        &self.base_stats
    }

    #[must_use]
    pub fn types(&self) -> &[ElementType] {
        &self.types
    }

    #[must_use]
    pub fn ability(&self) -> Ability {
        self.ability
    }

    #[must_use]
    pub fn nature(&self) -> Nature {
        self.nature
    }

    #[must_use]
    pub fn evs(&self) -> &StatTable<u16> {
        &self.evs
    }

    #[must_use]
    pub fn moves(&self) -> &[MoveId] {
        &self.moves
    }

    /// Raw fitness from the latest evaluation.
    #[must_use]
    pub fn fitness(&self) -> f32 {
        self.fitness
    }

    /// Raw fitness divided by the size of the genome's species.
    #[must_use]
    pub fn shared_fitness(&self) -> f32 {
        self.shared_fitness
    }

    #[must_use]
    pub fn opponents_defeated(&self) -> usize {
        self.opponents_defeated
    }
}

fn random_efforts<R>(config: &GenomeConfig, rng: &mut R) -> StatTable<u16>
where
    R: Rng + ?Sized,
{
    allocation::effort_spread(
        config.max_effort_per_stat,
        config.minor_effort,
        config.max_effort_total,
        rng,
    )
}

fn random_nature<R>(rng: &mut R) -> Nature
where
    R: Rng + ?Sized,
{
    Nature::ALL[rng.random_range(0..Nature::ALL.len())]
}

fn pick<T, R>(a: T, b: T, rng: &mut R) -> T
where
    R: Rng + ?Sized,
{
    if rng.random_bool(0.5) { a } else { b }
}

fn sort_moves(moves: &mut [MoveId]) {
    moves.sort_unstable_by_key(|m| m.name());
}

/// One or two distinct types from the parents' union, padded from `pool` when the union
/// is too small.
fn blend_types<R>(
    a: &[ElementType],
    b: &[ElementType],
    pool: &[ElementType],
    rng: &mut R,
) -> ArrayVec<ElementType, 2>
where
    R: Rng + ?Sized,
{
    let mut combined: Vec<ElementType> = Vec::with_capacity(4);
    for ty in a.iter().chain(b) {
        if !combined.contains(ty) {
            combined.push(*ty);
        }
    }
    let count = rng.random_range(1..=2);
    let mut types: ArrayVec<ElementType, 2> = if combined.len() >= count {
        combined.choose_multiple(rng, count).copied().collect()
    } else {
        combined.into_iter().collect()
    };
    while types.len() < count {
        let unused: Vec<ElementType> = pool
            .iter()
            .copied()
            .filter(|ty| !types.contains(ty))
            .collect();
        let Some(&ty) = unused.choose(rng) else {
            break;
        };
        types.push(ty);
    }
    types.sort_unstable();
    types
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use pokevo_engine::SpecError;
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    fn assert_invariants(genome: &Genome, config: &GenomeConfig) {
        let effort_total: u32 = genome.evs().total();
        assert!(effort_total <= u32::from(config.max_effort_total), "{genome:?}");
        assert!(
            genome
                .evs()
                .iter()
                .all(|(_, v)| *v <= config.max_effort_per_stat),
            "{genome:?}"
        );
        assert_eq!(genome.moves().len(), MAX_MOVES, "{genome:?}");
        let distinct: HashSet<_> = genome.moves().iter().collect();
        assert_eq!(distinct.len(), MAX_MOVES, "{genome:?}");
        assert!(!genome.types().is_empty() && genome.types().len() <= 2);
        if let [a, b] = genome.types() {
            assert_ne!(a, b);
        }
        if genome.is_custom() {
            assert_eq!(
                genome.base_stats().total(),
                u32::from(config.max_base_stat_total),
                "{genome:?}"
            );
        }
        assert_eq!(genome.to_spec().validate(), Ok(()));
    }

    #[test]
    fn test_random_genomes_are_valid() {
        let config = GenomeConfig::default();
        let mut rng = Pcg32::seed_from_u64(1);
        for template in [
            GenomeTemplate::Custom,
            GenomeTemplate::from_species_name("scizor").unwrap(),
        ] {
            for _ in 0..200 {
                assert_invariants(&Genome::random(template, &config, &mut rng), &config);
            }
        }
    }

    #[test]
    fn test_ids_are_unique_and_survive_clone() {
        let config = GenomeConfig::default();
        let mut rng = Pcg32::seed_from_u64(2);
        let a = Genome::random(GenomeTemplate::Custom, &config, &mut rng);
        let b = Genome::random(GenomeTemplate::Custom, &config, &mut rng);
        assert!(b.id() > a.id());
        assert_ne!(a, b);
        let copy = a.clone();
        assert_eq!(copy, a);
        let child = Genome::crossover(&a, &b, &config, &mut rng);
        assert!(child.id() > b.id());
    }

    #[test]
    fn test_mutation_keeps_invariants() {
        let config = GenomeConfig::default();
        let mut rng = Pcg32::seed_from_u64(3);
        let mut genome = Genome::random(GenomeTemplate::Custom, &config, &mut rng);
        let mut seen = HashSet::new();
        for _ in 0..500 {
            seen.insert(genome.mutate(&config, &mut rng));
            assert_invariants(&genome, &config);
        }
        assert_eq!(seen.len(), Mutation::CUSTOM.len());
    }

    #[test]
    fn test_template_facets_never_change() {
        let config = GenomeConfig::default();
        let mut rng = Pcg32::seed_from_u64(4);
        let template = GenomeTemplate::from_species_name("garchomp").unwrap();
        let GenomeTemplate::Species(species) = template else {
            unreachable!();
        };
        let mut a = Genome::random(template, &config, &mut rng);
        let b = Genome::random(template, &config, &mut rng);
        for _ in 0..200 {
            let facet = a.mutate(&config, &mut rng);
            assert!(Mutation::COMMON.contains(&facet));
            a = Genome::crossover(&a, &b, &config, &mut rng);
            assert_eq!(a.base_stats(), &species.base_stats);
            assert_eq!(a.types(), species.types);
            assert_eq!(a.ability(), species.ability);
            assert_eq!(a.name(), "garchomp");
            assert_invariants(&a, &config);
        }
    }

    #[test]
    fn test_template_moves_come_from_learnset() {
        let config = GenomeConfig::default();
        let mut rng = Pcg32::seed_from_u64(8);
        let template = GenomeTemplate::from_species_name("blissey").unwrap();
        let learnset = template.move_pool(&config);
        assert_ne!(learnset.as_ref(), config.move_pool.as_slice());
        let in_learnset = |g: &Genome| g.moves().iter().all(|m| learnset.contains(m));

        let mut a = Genome::random(template, &config, &mut rng);
        let b = Genome::random(template, &config, &mut rng);
        assert!(in_learnset(&a) && in_learnset(&b));
        for _ in 0..200 {
            a.mutate(&config, &mut rng);
            assert!(in_learnset(&a), "{a:?}");
            a.moves.truncate(1);
            a = Genome::crossover(&a, &a, &config, &mut rng);
            assert!(in_learnset(&a), "{a:?}");
            a = Genome::crossover(&a, &b, &config, &mut rng);
            assert!(in_learnset(&a), "{a:?}");
            assert_invariants(&a, &config);
        }
    }

    #[test]
    fn test_custom_moves_come_from_config_pool() {
        let config = GenomeConfig::default();
        assert_eq!(
            GenomeTemplate::Custom.move_pool(&config).as_ref(),
            config.move_pool.as_slice()
        );
    }

    #[test]
    fn test_crossover_keeps_invariants() {
        let config = GenomeConfig::default();
        let mut rng = Pcg32::seed_from_u64(5);
        for _ in 0..200 {
            let a = Genome::random(GenomeTemplate::Custom, &config, &mut rng);
            let b = Genome::random(GenomeTemplate::Custom, &config, &mut rng);
            let child = Genome::crossover(&a, &b, &config, &mut rng);
            assert_invariants(&child, &config);
            assert!([a.nature(), b.nature()].contains(&child.nature()));
            assert!([a.ability(), b.ability()].contains(&child.ability()));
        }
    }

    #[test]
    fn test_crossover_of_twins_pads_moves_from_pool() {
        let config = GenomeConfig::default();
        let mut rng = Pcg32::seed_from_u64(6);
        let mut a = Genome::random(GenomeTemplate::Custom, &config, &mut rng);
        a.moves.truncate(2);
        let child = Genome::crossover(&a, &a, &config, &mut rng);
        assert_eq!(child.moves().len(), MAX_MOVES);
        assert!(a.moves().iter().all(|m| child.moves().contains(m)));
    }

    #[test]
    fn test_small_pools_degrade_to_invalid_spec() {
        let config = GenomeConfig {
            move_pool: vec![],
            ..GenomeConfig::default()
        };
        let mut rng = Pcg32::seed_from_u64(7);
        let genome = Genome::random(GenomeTemplate::Custom, &config, &mut rng);
        assert!(matches!(
            genome.to_spec().validate(),
            Err(SpecError::EmptyMoveset { .. })
        ));
    }
}
