use std::path::PathBuf;

use anyhow::Context as _;
use chrono::Utc;
use pokevo_engine::{SpeciesData, StatTable};
use pokevo_evaluator::{EvaluationMode, fitness::GauntletEvaluator};
use pokevo_training::{
    evolution::{Evolution, GenerationReport},
    genome::{Genome, GenomeTemplate},
};
use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg32;

use crate::{
    command::tournament,
    config::RunConfig,
    schema::champion::{ChampionList, ChampionRecord},
    util,
};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct EvolveArg {
    /// JSON run configuration; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,
    /// Genomes per generation
    #[arg(long)]
    population: Option<usize>,
    #[arg(long)]
    generations: Option<usize>,
    /// `simple` (greedy play, all-out attackers) or `advanced` (minimax, setup gauntlet)
    #[arg(long)]
    mode: Option<EvaluationMode>,
    /// Minimax depth in full rounds
    #[arg(long)]
    depth: Option<u32>,
    /// Battles against each gauntlet opponent
    #[arg(long)]
    battles: Option<usize>,
    #[arg(long)]
    seed: Option<u64>,
    /// Evolve movesets and effort for an existing species instead of a custom combatant
    #[arg(long)]
    species: Option<String>,
    /// Skip the round robin between champions
    #[arg(long)]
    no_tournament: bool,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

impl EvolveArg {
    fn apply(&self, config: &mut RunConfig) {
        if let Some(population) = self.population {
            config.evolution.population_size = population;
        }
        if let Some(generations) = self.generations {
            config.evolution.generations = generations;
        }
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if let Some(depth) = self.depth {
            config.search.depth = depth;
        }
        if let Some(battles) = self.battles {
            config.battles_per_opponent = battles;
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(species) = &self.species {
            config.species = Some(species.clone());
        }
    }
}

pub(crate) fn run(arg: &EvolveArg) -> anyhow::Result<()> {
    let mut config = RunConfig::load(arg.config.as_deref())?;
    arg.apply(&mut config);
    log::debug!("effective config: {config:?}");

    let template = match &config.species {
        Some(name) => GenomeTemplate::from_species_name(name).with_context(|| {
            format!("Unknown template species: {name} (known: {})", species_names())
        })?,
        None => GenomeTemplate::Custom,
    };
    let seed = config.seed.unwrap_or_else(|| rand::rng().random());
    let mut rng = Pcg32::seed_from_u64(seed);

    let evaluator = GauntletEvaluator::new(
        &config.gauntlet(),
        config.battles_per_opponent,
        config.rewards.clone(),
        config.mode.selector(config.search),
    );
    if evaluator.opponent_count() == 0 {
        anyhow::bail!("No usable gauntlet opponents");
    }

    eprintln!(
        "Evolving {} ({:?} mode, {} opponents, seed {seed})",
        template.name(),
        config.mode,
        evaluator.opponent_count(),
    );

    let mut evolution = Evolution::new(
        template,
        config.genome.clone(),
        config.evolution.clone(),
        &mut rng,
    )?;
    let champions = evolution.run(&evaluator, &mut rng, print_generation)?;
    if evolution.generation() < config.evolution.generations {
        eprintln!(
            "Every species went extinct after {} generations",
            evolution.generation()
        );
    }

    eprintln!();
    eprintln!("Champions:");
    for (i, genome) in champions.iter().enumerate() {
        eprintln!("  {i:2}: {}", describe(genome));
    }

    let records: Vec<ChampionRecord> = champions.iter().map(ChampionRecord::from).collect();
    if !arg.no_tournament && records.len() > 1 {
        let selector = config.mode.selector(config.search);
        tournament::run_round_robin(&records, selector.as_ref(), &mut rng)?;
    }

    let list = ChampionList {
        generated_at: Utc::now(),
        mode: config.mode,
        seed,
        generations: evolution.generation(),
        champions: records,
    };
    let path = util::save_json(&list, arg.output.as_deref())?;

    eprintln!();
    eprintln!("Champions saved successfully");
    eprintln!("  Path: {path}");
    eprintln!("  Generated at: {}", list.generated_at);
    eprintln!("  Champions: {}", list.champions.len());

    Ok(())
}

fn print_generation(report: &GenerationReport) {
    eprintln!("Generation #{}:", report.generation);
    eprintln!(
        "  Species:   {} ({} culled)",
        report.species_count,
        report.culled_species.len()
    );
    eprintln!("  Mean:      {:.1}", report.mean_fitness);
    eprintln!("  Best:      {}", describe(&report.best_genome));
    eprintln!("  Best ever: {}", describe(&report.best_ever));
}

fn describe(genome: &Genome) -> String {
    let moves = genome
        .moves()
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    let types = genome
        .types()
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("/");
    format!(
        "{} #{} [{types}] {:.1} ({} beaten) {} {} {} [{moves}]",
        genome.name(),
        genome.id(),
        genome.fitness(),
        genome.opponents_defeated(),
        genome.ability(),
        genome.nature(),
        format_effort(genome.evs()),
    )
}

fn species_names() -> String {
    SpeciesData::all()
        .iter()
        .map(|species| species.name)
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_effort(evs: &StatTable<u16>) -> String {
    evs.iter()
        .filter(|(_, v)| **v > 0)
        .map(|(key, v)| format!("{v} {key}"))
        .collect::<Vec<_>>()
        .join(" / ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let arg = EvolveArg {
            population: Some(8),
            mode: Some(EvaluationMode::Simple),
            depth: Some(1),
            seed: Some(42),
            species: Some("lucario".to_owned()),
            ..EvolveArg::default()
        };
        let mut config = RunConfig::default();
        arg.apply(&mut config);
        assert_eq!(config.evolution.population_size, 8);
        assert_eq!(config.evolution.generations, 10);
        assert_eq!(config.mode, EvaluationMode::Simple);
        assert_eq!(config.search.depth, 1);
        assert_eq!(config.battles_per_opponent, 3);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.species.as_deref(), Some("lucario"));
    }

    #[test]
    fn test_format_effort_skips_empty_stats() {
        let evs = StatTable::new(0, 252, 0, 0, 6, 252);
        assert_eq!(format_effort(&evs), "252 atk / 6 spd / 252 spe");
    }

    #[test]
    fn test_unknown_species_lists_known_ones() {
        let arg = EvolveArg {
            species: Some("missingno".to_owned()),
            ..EvolveArg::default()
        };
        let message = format!("{:#}", run(&arg).unwrap_err());
        assert!(message.contains("missingno"), "{message}");
        assert!(message.contains("garchomp, gengar"), "{message}");
    }
}
