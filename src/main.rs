use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use notebook_studio_lib::commands;
use notebook_studio_lib::config::AppConfig;
use notebook_studio_lib::error::AppError;
use notebook_studio_lib::generation::StudioContentKind;
use notebook_studio_lib::logger;
use notebook_studio_lib::PcmFormat;

/// Notebook Studio - chat with your sources and turn them into study material
#[derive(Parser)]
#[command(name = "notebook-studio")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Wrap raw 16-bit little-endian PCM in a WAV container
    Wrap {
        /// Raw PCM input file
        #[arg(short, long)]
        input: PathBuf,

        /// WAV output file
        #[arg(short, long)]
        output: PathBuf,

        /// Sample rate in Hz
        #[arg(long, default_value_t = 24000)]
        rate: u32,

        /// Channel count
        #[arg(long, default_value_t = 1)]
        channels: u16,
    },

    /// Ask a question answered only from the given sources
    Ask {
        /// Source documents
        #[arg(short, long = "source", required = true)]
        sources: Vec<PathBuf>,

        /// The question
        question: String,
    },

    /// Generate a study artifact (summary, flashcards, quiz, mind-map, audio-script)
    Studio {
        kind: String,

        /// Source documents
        #[arg(short, long = "source", required = true)]
        sources: Vec<PathBuf>,
    },

    /// Generate a two-host audio overview and save it as WAV + transcript
    Overview {
        /// Source documents
        #[arg(short, long = "source", required = true)]
        sources: Vec<PathBuf>,

        /// Output directory (default: NOTEBOOK_OUTPUT_DIR or ~/Documents/NotebookStudio/overviews)
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    logger::init_logger();
    let cli = Cli::parse();
    let config = AppConfig::from_env();

    match dispatch(cli.command, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn dispatch(command: Commands, config: &AppConfig) -> Result<(), AppError> {
    match command {
        Commands::Wrap {
            input,
            output,
            rate,
            channels,
        } => {
            let written = commands::wrap_pcm_file(&input, &output, PcmFormat::new(rate, channels))?;
            println!("{} ({written} bytes)", output.display());
        }
        Commands::Ask { sources, question } => {
            let sources = commands::load_sources(&sources)?;
            println!("{}", commands::ask(config, &sources, &question).await?);
        }
        Commands::Studio { kind, sources } => {
            let kind: StudioContentKind = kind.parse()?;
            let sources = commands::load_sources(&sources)?;
            println!("{}", commands::studio(config, &sources, kind).await?);
        }
        Commands::Overview {
            sources,
            output_dir,
        } => {
            let sources = commands::load_sources(&sources)?;
            let saved = commands::overview(config, &sources, output_dir).await?;
            println!("{}", serde_json::to_string_pretty(&saved)?);
        }
    }
    Ok(())
}
