use anyhow::{Context, Result};
use chrono::{Datelike, Local};
use clap::{Parser, Subcommand};
use extracto_core::{Document, StatementResult};
use extracto_ingest::{Dialect, IngestError, identify};
use std::fs;
use std::path::{Path, PathBuf};

mod config;
mod state;

#[derive(Parser, Debug)]
#[command(name = "extracto", version, about = "Layout-driven parser for Mexican bank statements")]
struct Cli {
    /// Debug logging (RUST_LOG still wins when set)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the bank and statement year detected in a layout dump
    Identify {
        /// Layout JSON produced by the layout provider
        input: PathBuf,
    },

    /// Parse a layout dump into a JSON statement result
    Parse {
        /// Layout JSON produced by the layout provider
        input: PathBuf,

        /// Force a dialect instead of detecting it (bbva, banamex)
        #[arg(long)]
        dialect: Option<Dialect>,

        /// Year for statements that do not print one
        #[arg(long)]
        year: Option<i32>,

        /// Write the result here instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Single-line JSON
        #[arg(long)]
        compact: bool,
    },

    /// Manage ~/.extracto/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config if none exists
    Init,
    /// Print the effective config
    Show,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config()?;
    init_logging(cli.verbose, &cfg.log.level);

    match cli.command {
        Command::Identify { input } => {
            let document = read_document(&input)?;
            let id = identify(&document)
                .with_context(|| format!("identifying {}", input.display()))?;
            println!("{}", serde_json::to_string_pretty(&id)?);
        }

        Command::Parse {
            input,
            dialect,
            year,
            out,
            compact,
        } => {
            let document = read_document(&input)?;
            let (dialect, printed_year) = match dialect {
                Some(d) => (d, identify(&document).ok().and_then(|id| id.year)),
                None => {
                    let id = identify(&document).with_context(|| {
                        format!("identifying {} (pass --dialect to force one)", input.display())
                    })?;
                    (id.dialect, id.year)
                }
            };

            let year = resolve_year(year, printed_year, cfg.parse.default_year);
            let result = dialect
                .parse(&document, year)
                .with_context(|| format!("parsing {} as {dialect}", input.display()))?;

            let json = render(&result, cfg.output.pretty && !compact)?;
            match out {
                Some(path) => {
                    fs::write(&path, format!("{json}\n"))
                        .with_context(|| format!("write {}", path.display()))?;
                    eprintln!(
                        "Parsed {} transactions ({dialect}) from {} into {}",
                        result.transactions.len(),
                        input.display(),
                        path.display()
                    );
                }
                None => println!("{json}"),
            }
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => config::show_config()?,
        },
    }

    Ok(())
}

fn init_logging(verbose: bool, level: &str) {
    let fallback = if verbose { "debug" } else { level };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(fallback)).init();
}

fn read_document(path: &Path) -> Result<Document> {
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    decode_document(&s).with_context(|| format!("decode layout {}", path.display()))
}

fn decode_document(s: &str) -> Result<Document> {
    serde_json::from_str(s).map_err(|e| IngestError::UnreadableDocument(e.to_string()).into())
}

/// --year, then the year printed on the statement, then the configured
/// default, then the current year.
fn resolve_year(flag: Option<i32>, printed: Option<i32>, configured: Option<i32>) -> i32 {
    flag.or(printed)
        .or(configured)
        .unwrap_or_else(|| Local::now().year())
}

fn render(result: &StatementResult, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };
    Ok(json)
}
