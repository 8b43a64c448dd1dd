use clap::{Parser, Subcommand};

use self::{evolve::EvolveArg, tournament::TournamentArg};

mod evolve;
mod tournament;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Evolve combatants against a gauntlet and write the champions
    Evolve(#[clap(flatten)] EvolveArg),
    /// Replay a round robin between saved champions
    Tournament(#[clap(flatten)] TournamentArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Evolve(arg) => evolve::run(&arg)?,
        Mode::Tournament(arg) => tournament::run(&arg)?,
    }
    Ok(())
}
