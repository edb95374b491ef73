//! quill - text diffing and everyday text utilities from the command line

mod commands;
mod config;
mod input;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::*;
use config::Config;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "quill", version, about = "Text diffing and everyday text utilities")]
struct Cli {
    /// Config file (defaults to $XDG_CONFIG_HOME/quill/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compare two texts (exit status 1 when they differ)
    Diff(DiffArgs),
    /// Test a regular expression, or replace its matches
    Regex(RegexArgs),
    /// Convert text case
    Case(CaseArgs),
    /// Tidy whitespace, dedupe or sort lines
    Clean(CleanArgs),
    /// Pretty-print or minify JSON
    Json(JsonArgs),
    /// Count characters, words, lines and sentences
    Stats(StatsArgs),
    /// Generate random passwords
    Password(PasswordArgs),
    /// Generate random integers
    Numbers(NumbersArgs),
    /// Shuffle lines
    Shuffle(ShuffleArgs),
    /// Pick random lines
    Pick(PickArgs),
    /// Generate random UUIDs
    Uuid(UuidArgs),
    /// Map a rectangle between viewport pixels and PDF user space
    PdfRect(PdfRectArgs),
    /// Compute where to draw watermark text on a page
    Watermark(WatermarkArgs),
    /// Expand a page selection like `1-3,5`
    Pages(PagesArgs),
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("QUILL_LOG").unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match &cli.command {
        Command::Diff(args) => {
            let config = Config::load(cli.config.as_deref())?;
            run_diff(args, &config)
        }
        Command::Regex(args) => run_regex(args),
        Command::Case(args) => run_case(args),
        Command::Clean(args) => run_clean(args),
        Command::Json(args) => run_json(args),
        Command::Stats(args) => run_stats(args),
        Command::Password(args) => run_password(args),
        Command::Numbers(args) => run_numbers(args),
        Command::Shuffle(args) => run_shuffle(args),
        Command::Pick(args) => run_pick(args),
        Command::Uuid(args) => run_uuid(args),
        Command::PdfRect(args) => run_pdf_rect(args),
        Command::Watermark(args) => run_watermark(args),
        Command::Pages(args) => run_pages(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_diff_with_global_flags() {
        let cli = Cli::parse_from(["quill", "diff", "a.txt", "b.txt", "-m", "lines", "-v"]);
        assert!(cli.verbose);
        match cli.command {
            Command::Diff(args) => {
                assert_eq!(args.mode, Some(quill_core::TokenMode::Lines));
                assert_eq!(args.old, PathBuf::from("a.txt"));
            }
            _ => panic!("expected diff"),
        }
    }

    #[test]
    fn test_parse_negative_numbers() {
        let cli = Cli::parse_from(["quill", "numbers", "--min", "-5", "--max", "5"]);
        match cli.command {
            Command::Numbers(args) => assert_eq!((args.min, args.max), (-5, 5)),
            _ => panic!("expected numbers"),
        }
    }
}
