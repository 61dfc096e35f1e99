use clap::{Parser, Subcommand};

mod cli;

#[derive(Parser)]
#[command(
    name = "weftc",
    version,
    about = "Compile weighted transducers into Forward-likelihood scoring functions"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write a pairwise-alignment starter model
    Init(cli::init::InitArgs),
    /// Compile a model file into a scoring function
    Build(cli::build::BuildArgs),
    /// Validate a model file and print a summary
    Check(cli::check::CheckArgs),
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Command::Init(args) => cli::init::cmd_init(args),
        Command::Build(args) => cli::build::cmd_build(args),
        Command::Check(args) => cli::check::cmd_check(args),
    }
}
