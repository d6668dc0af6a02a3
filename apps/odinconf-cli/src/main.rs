use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod error;
mod input;

use error::CliResult;
use input::InputArgs;

#[derive(Parser)]
#[command(name = "odinconf")]
#[command(about = "Odin ENS electrode configuration generator")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a configuration from a jacksheet and write the tabular and
    /// binary artifacts as a pair
    Generate {
        #[command(flatten)]
        input: InputArgs,

        /// Localization number
        #[arg(short, long, default_value_t = 0)]
        localization: u32,

        /// Montage number
        #[arg(short, long, default_value_t = 0)]
        montage: u32,

        /// Mark the configuration as stim-capable
        #[arg(short = 'S', long)]
        stim: bool,

        /// Directory to write output to (print tabular form to stdout when
        /// omitted)
        #[arg(short, long)]
        output_path: Option<PathBuf>,
    },

    /// Export the derived sense-channel pairing as a flat table
    Pairs {
        #[command(flatten)]
        input: InputArgs,

        /// Export format (csv or json)
        #[arg(short, long, default_value = "csv")]
        format: String,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Summarize an existing tabular configuration file
    Show {
        /// Path to a tabular configuration file
        config: PathBuf,

        /// List every sense and stim channel
        #[arg(long)]
        channels: bool,
    },
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            input,
            localization,
            montage,
            stim,
            output_path,
        } => commands::generate::execute(input, localization, montage, stim, output_path),

        Commands::Pairs { input, format, output } => {
            commands::pairs::execute(input, format, output)
        }

        Commands::Show { config, channels } => commands::show::execute(config, channels),
    }
}
