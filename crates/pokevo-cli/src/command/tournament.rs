use std::path::PathBuf;

use pokevo_evaluator::{
    EvaluationMode, minimax::SearchParams, move_selector::MoveSelector, tournament,
};
use rand::{Rng as _, RngCore, SeedableRng as _};
use rand_pcg::Pcg32;

use crate::{schema::champion::ChampionRecord, util};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct TournamentArg {
    /// Champions JSON written by `evolve`
    champions: PathBuf,
    /// Selector used by both sides; defaults to the mode the champions evolved under
    #[arg(long)]
    mode: Option<EvaluationMode>,
    /// Minimax depth in full rounds
    #[arg(long)]
    depth: Option<u32>,
    #[arg(long)]
    seed: Option<u64>,
}

pub(crate) fn run(arg: &TournamentArg) -> anyhow::Result<()> {
    let list = util::read_champions_file(&arg.champions)?;
    if list.champions.len() < 2 {
        anyhow::bail!(
            "A tournament needs at least two champions, {} has {}",
            arg.champions.display(),
            list.champions.len()
        );
    }

    let mode = arg.mode.unwrap_or(list.mode);
    let mut search = SearchParams::default();
    if let Some(depth) = arg.depth {
        search.depth = depth;
    }
    let seed = arg.seed.unwrap_or_else(|| rand::rng().random());
    let mut rng = Pcg32::seed_from_u64(seed);

    eprintln!(
        "Round robin between {} champions generated at {} ({mode:?} mode, seed {seed})",
        list.champions.len(),
        list.generated_at,
    );
    let selector = mode.selector(search);
    run_round_robin(&list.champions, selector.as_ref(), &mut rng)
}

pub(crate) fn run_round_robin(
    records: &[ChampionRecord],
    selector: &dyn MoveSelector,
    rng: &mut dyn RngCore,
) -> anyhow::Result<()> {
    let entrants = records
        .iter()
        .map(ChampionRecord::to_entrant)
        .collect::<anyhow::Result<Vec<_>>>()?;
    let standings = tournament::round_robin(&entrants, selector, rng);

    eprintln!();
    eprintln!("Standings:");
    for (rank, standing) in standings.iter().enumerate() {
        eprintln!(
            "  {:2}: {:<24} {:2} wins ({} gauntlet opponents beaten)",
            rank + 1,
            standing.name,
            standing.wins,
            standing.opponents_defeated,
        );
    }
    Ok(())
}
