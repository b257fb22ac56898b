//! # apkg-filter CLI
//!
//! ```bash
//! apkg-filter core2000.apkg first200.txt "Core 200"
//! ```
//!
//! Lists the fields of the deck's note type, asks which one to compare with
//! the wordlist, and writes `./Core 200.apkg` holding only the matching
//! cards and their media.

use anyhow::Result;
use clap::error::ErrorKind;
use clap::Parser;
use std::path::PathBuf;

use apkg_filter::config;
use apkg_filter::pipeline::{self, FilterJob};
use apkg_filter::progress::ProgressMode;
use apkg_filter::schema::Prompt;

/// Keep only the cards of an Anki deck whose chosen field appears in a
/// wordlist, and write them to a new deck package.
#[derive(Parser)]
#[command(
    name = "apkg-filter",
    version,
    about = "Extract the cards matching a wordlist from an Anki deck package into a new deck",
    long_about = "Unpacks an .apkg deck, asks which field of its note type to compare, keeps the \
    notes whose field exactly matches a line of the wordlist (after trimming whitespace), drops \
    media no kept note references, renames the deck and writes <output-name>.apkg."
)]
struct Cli {
    /// Deck package to filter (`.apkg`).
    archive: PathBuf,

    /// Wordlist: one term per line, UTF-8.
    wordlist: PathBuf,

    /// Name of the new deck; the output is written to `<output-name>.apkg`.
    output_name: String,

    /// Optional TOML file overriding the working directory, output
    /// directory and archive file names.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => e.exit(),
            _ => {
                let _ = e.print();
                std::process::exit(1);
            }
        },
    };

    let cfg = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => config::Config::from_env(),
    };

    let job = FilterJob {
        archive: cli.archive,
        wordlist: cli.wordlist,
        output_name: cli.output_name,
    };

    let progress = ProgressMode::default_for_tty().reporter();
    let mut prompt = Prompt::stdio();
    let report = pipeline::run_filter(&cfg, &job, &mut prompt, progress.as_ref()).await?;
    pipeline::print_summary(&job, &report);

    Ok(())
}
