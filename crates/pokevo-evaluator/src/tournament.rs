//! Round-robin tournament between champions.

use std::sync::Arc;

use pokevo_engine::{CombatantSpec, Side};
use rand::RngCore;

use crate::{
    fitness::{self, BattleResult},
    move_selector::MoveSelector,
};

#[derive(Debug, Clone)]
pub struct Entrant {
    pub name: String,
    pub spec: Arc<CombatantSpec>,
    /// Gauntlet opponents beaten during evolution; breaks ties in the standings.
    pub opponents_defeated: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Standing {
    /// Position of the entrant in the input slice.
    pub entrant: usize,
    pub name: String,
    pub wins: usize,
    pub opponents_defeated: usize,
}

/// Every entrant battles every other entrant once.
///
/// Standings are sorted by wins, then by opponents defeated, then by entry order.
pub fn round_robin(
    entrants: &[Entrant],
    selector: &dyn MoveSelector,
    rng: &mut dyn RngCore,
) -> Vec<Standing> {
    let mut wins = vec![0; entrants.len()];
    for (i, first) in entrants.iter().enumerate() {
        for (j, second) in entrants.iter().enumerate().skip(i + 1) {
            let result = fitness::play_battle(
                Arc::clone(&first.spec),
                Arc::clone(&second.spec),
                selector,
                rng,
            );
            match result {
                Ok(BattleResult::Won(Side::A)) => {
                    log::info!("{} defeats {}", first.name, second.name);
                    wins[i] += 1;
                }
                Ok(BattleResult::Won(Side::B)) => {
                    log::info!("{} defeats {}", second.name, first.name);
                    wins[j] += 1;
                }
                Ok(BattleResult::Draw) => log::info!("{} and {} draw", first.name, second.name),
                Ok(BattleResult::Aborted(e)) => {
                    log::warn!("{} vs {} aborted: {e}", first.name, second.name);
                }
                Err(e) => log::warn!("{} vs {} could not start: {e}", first.name, second.name),
            }
        }
    }

    let mut standings: Vec<_> = entrants
        .iter()
        .zip(wins)
        .enumerate()
        .map(|(entrant, (e, wins))| Standing {
            entrant,
            name: e.name.clone(),
            wins,
            opponents_defeated: e.opponents_defeated,
        })
        .collect();
    standings.sort_by(|a, b| {
        b.wins
            .cmp(&a.wins)
            .then(b.opponents_defeated.cmp(&a.opponents_defeated))
            .then(a.entrant.cmp(&b.entrant))
    });
    standings
}

#[cfg(test)]
mod tests {
    use pokevo_engine::{MoveId, Nature, SpeciesData, StatTable};
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;
    use crate::move_selector::GreedySelector;

    fn entrant(species: &str, moves: &[&str], opponents_defeated: usize) -> Entrant {
        let data = SpeciesData::from_name(species).unwrap();
        Entrant {
            name: species.to_owned(),
            spec: Arc::new(CombatantSpec {
                name: species.to_owned(),
                base_stats: data.base_stats,
                types: data.types.iter().copied().collect(),
                ability: data.ability,
                nature: Nature::Hardy,
                evs: StatTable::splat(0),
                moves: moves.iter().map(|m| MoveId::from_name(m).unwrap()).collect(),
            }),
            opponents_defeated,
        }
    }

    #[test]
    fn test_round_robin_ranks_by_wins() {
        let entrants = [
            entrant("heatran", &["lava-plume"], 5),
            entrant("garchomp", &["earthquake"], 0),
            entrant("blissey", &["soft-boiled"], 9),
        ];
        let mut rng = Pcg32::seed_from_u64(3);
        let standings = round_robin(&entrants, &GreedySelector::new(), &mut rng);
        assert_eq!(standings.len(), 3);
        assert_eq!(standings[0].name, "garchomp");
        assert_eq!(standings[0].wins, 2);
        assert_eq!(standings.iter().map(|s| s.wins).sum::<usize>(), 3);
    }

    /// Picks a slot that does not exist, so every battle is abandoned.
    #[derive(Debug)]
    struct AbortingSelector;

    impl MoveSelector for AbortingSelector {
        fn select_move(
            &self,
            _battle: &pokevo_engine::Battle,
            _side: Side,
            _rng: &mut dyn RngCore,
        ) -> pokevo_engine::MoveChoice {
            pokevo_engine::MoveChoice::Move(9)
        }
    }

    #[test]
    fn test_ties_use_opponents_defeated() {
        let entrants = [
            entrant("blissey", &["soft-boiled"], 1),
            entrant("scizor", &["bullet-punch"], 4),
            entrant("gengar", &["shadow-ball"], 4),
        ];
        let mut rng = Pcg32::seed_from_u64(0);
        let standings = round_robin(&entrants, &AbortingSelector, &mut rng);
        let order: Vec<_> = standings.iter().map(|s| s.entrant).collect();
        assert_eq!(order, [1, 2, 0]);
        assert!(standings.iter().all(|s| s.wins == 0));
    }
}
