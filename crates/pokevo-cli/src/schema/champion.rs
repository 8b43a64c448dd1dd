use std::sync::Arc;

use chrono::{DateTime, Utc};
use pokevo_engine::CombatantSpec;
use pokevo_evaluator::{EvaluationMode, tournament::Entrant};
use pokevo_training::genome::{Genome, GenomeId};
use serde::{Deserialize, Serialize};

/// Champions of one evolution run.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChampionList {
    pub generated_at: DateTime<Utc>,
    pub mode: EvaluationMode,
    pub seed: u64,
    pub generations: usize,
    pub champions: Vec<ChampionRecord>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ChampionRecord {
    pub id: GenomeId,
    pub custom: bool,
    #[serde(flatten)]
    pub spec: CombatantSpec,
    pub fitness: f32,
    pub opponents_defeated: usize,
}

impl From<&Genome> for ChampionRecord {
    fn from(genome: &Genome) -> Self {
        Self {
            id: genome.id(),
            custom: genome.is_custom(),
            spec: genome.to_spec(),
            fitness: genome.fitness(),
            opponents_defeated: genome.opponents_defeated(),
        }
    }
}

impl ChampionRecord {
    /// Tournament entrant labelled with the genome id, since champions of one run
    /// usually share a name.
    pub fn to_entrant(&self) -> anyhow::Result<Entrant> {
        self.spec
            .validate()
            .map_err(|e| anyhow::anyhow!("Champion #{} is not a valid combatant: {e}", self.id))?;
        Ok(Entrant {
            name: format!("{} #{}", self.spec.name, self.id),
            spec: Arc::new(self.spec.clone()),
            opponents_defeated: self.opponents_defeated,
        })
    }
}

#[cfg(test)]
mod tests {
    use pokevo_engine::StatTable;
    use pokevo_training::genome::{GenomeConfig, GenomeTemplate};
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    #[test]
    fn test_record_json_is_flat_and_reloads() {
        let mut rng = Pcg32::seed_from_u64(0);
        let genome = Genome::random(GenomeTemplate::Custom, &GenomeConfig::default(), &mut rng);
        let record = ChampionRecord::from(&genome);

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["name"], "Mewthree");
        assert_eq!(json["custom"], true);
        assert_eq!(json["id"], genome.id().get());
        assert!(json["moves"].is_array());

        let reloaded: ChampionRecord = serde_json::from_value(json).unwrap();
        assert_eq!(reloaded, record);
    }

    #[test]
    fn test_entrant_names_include_id() {
        let mut rng = Pcg32::seed_from_u64(1);
        let template = GenomeTemplate::from_species_name("garchomp").unwrap();
        let genome = Genome::random(template, &GenomeConfig::default(), &mut rng);
        let entrant = ChampionRecord::from(&genome).to_entrant().unwrap();
        assert_eq!(entrant.name, format!("garchomp #{}", genome.id()));
        assert_eq!(*entrant.spec, genome.to_spec());
    }

    #[test]
    fn test_invalid_record_is_rejected() {
        let mut rng = Pcg32::seed_from_u64(2);
        let genome = Genome::random(GenomeTemplate::Custom, &GenomeConfig::default(), &mut rng);
        let mut record = ChampionRecord::from(&genome);
        record.spec.moves.clear();
        assert!(record.to_entrant().is_err());

        let mut record = ChampionRecord::from(&genome);
        record.spec.evs = StatTable::splat(u16::MAX);
        assert!(record.to_entrant().is_err());
    }
}
