mod cli;

use clap::{Parser, Subcommand};

use cli::check::{cmd_check, CheckArgs};
use cli::generate::{cmd_generate, GenArgs};
use cli::plan::{cmd_plan, PlanArgs};

#[derive(Parser)]
#[command(
    name = "babymaker",
    version,
    about = "Generate ROOT n-tuple reduction code from a YAML configuration"
)]
struct Cli {
    /// Raise the log level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate the C++ reduction program
    Gen(GenArgs),
    /// Resolve the configuration and report problems without writing
    Check(CheckArgs),
    /// Print the resolved directives of every routine
    Plan(PlanArgs),
}

fn main() {
    let cli = Cli::parse();
    cli::init_logging(cli.verbose);

    match cli.command {
        Command::Gen(args) => cmd_generate(args),
        Command::Check(args) => cmd_check(args),
        Command::Plan(args) => cmd_plan(args),
    }
}
