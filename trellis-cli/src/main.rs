mod create;
mod project;

use clap::{Parser, Subcommand};
use color_eyre::{config::HookBuilder, eyre::Result};
use tracing_subscriber::{filter::LevelFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "trellis")]
#[command(about = "CLI of Trellis", long_about = None)]
#[command(version, author)]
struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new Trellis application project
    Create(create::Args),
    /// Serve a Trellis application with live event round-trips
    Dev(project::DevArgs),
    /// Write the static two-file build of a Trellis application
    Build(project::BuildArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    HookBuilder::default()
        .display_env_section(false)
        .panic_section("It looks like the Trellis CLI encountered a bug")
        .install()?;

    let level = match cli.verbose {
        0 => LevelFilter::INFO,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .without_time()
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Create(args) => create::run(args),
        Commands::Dev(args) => project::dev(args, cli.verbose),
        Commands::Build(args) => project::build(args, cli.verbose),
    }
}
