use clap::{Parser, Subcommand};
use sandpane::core::config::{self, CliOverrides};
use sandpane::replay;
use simplelog::{ConfigBuilder, WriteLogger};
use std::error::Error;
use std::fs::File;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sandpane", about = "Navigation and console state for sandboxed previews")]
struct Args {
    /// Config file (default: ~/.sandpane/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Where to write the log
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log level: off, error, warn, info, debug, trace
    #[arg(long)]
    log_level: Option<String>,

    /// Console capacity (0 keeps every line)
    #[arg(long)]
    max_entries: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Replay a recorded session and print the final panel state as JSON
    Replay {
        /// Session file, or - for stdin
        session: PathBuf,
        /// Print on one line
        #[arg(long)]
        compact: bool,
    },
    /// Print the resolved configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    let file_config = match &args.config {
        Some(path) => config::load_config_from(path)?,
        None => config::load_config()?,
    };
    let resolved = config::resolve(
        &file_config,
        &CliOverrides {
            max_entries: args.max_entries,
            log_file: args.log_file.clone(),
            log_level: args.log_level.clone(),
        },
    );

    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .build();

    if let Ok(log_file) = File::create(&resolved.log_file) {
        let _ = WriteLogger::init(resolved.log_level, log_config, log_file);
    }

    log::info!("sandpane starting up");

    match args.command {
        Command::Replay { session, compact } => {
            let text = replay::read_session(&session)?;
            let steps = replay::parse_session(&text)?;
            let report = replay::replay(steps, &resolved).await;
            let out = if compact {
                serde_json::to_string(&report)?
            } else {
                serde_json::to_string_pretty(&report)?
            };
            println!("{out}");
        }
        Command::Config => {
            println!("{resolved:#?}");
        }
    }
    Ok(())
}
