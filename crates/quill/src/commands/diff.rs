//! `quill diff`

use crate::config::{ColorChoice, Config};
use crate::input::{label, read_input};
use anyhow::{bail, Result};
use clap::Args;
use quill_core::render::{
    format_side_by_side, render_ansi, render_html, render_json, render_side_by_side,
    render_unified,
};
use quill_core::{DiffEngine, DiffResult, OutputFormat, TokenMode};
use std::path::PathBuf;
use std::process::ExitCode;

const DEFAULT_WIDTH: usize = 120;

#[derive(Debug, Args)]
pub struct DiffArgs {
    /// Old file (`-` for stdin)
    pub old: PathBuf,
    /// New file (`-` for stdin)
    pub new: PathBuf,
    /// Token granularity: words, lines, chars or code
    #[arg(short, long)]
    pub mode: Option<TokenMode>,
    /// Output: unified, html, ansi, side-by-side or json
    #[arg(short, long)]
    pub format: Option<OutputFormat>,
    /// Lines of context in unified output
    #[arg(short = 'U', long)]
    pub context: Option<usize>,
    /// Compare case-insensitively
    #[arg(short = 'i', long)]
    pub ignore_case: bool,
    /// Ignore whitespace differences within tokens
    #[arg(short = 'w', long)]
    pub ignore_whitespace: bool,
    #[arg(long, value_enum)]
    pub color: Option<ColorChoice>,
    /// Total width for side-by-side output
    #[arg(long)]
    pub width: Option<usize>,
    /// Print a change summary to stderr
    #[arg(long)]
    pub stats: bool,
}

impl DiffArgs {
    fn engine(&self, config: &Config) -> DiffEngine {
        DiffEngine::new()
            .with_mode(self.mode.unwrap_or(config.diff.mode))
            .with_context(self.context.unwrap_or(config.diff.context))
            .with_ignore_case(self.ignore_case || config.diff.ignore_case)
            .with_ignore_whitespace(self.ignore_whitespace || config.diff.ignore_whitespace)
            .with_max_cells(config.diff.max_cells)
    }

    fn width(&self, config: &Config) -> usize {
        self.width
            .or(config.output.width)
            .or_else(|| std::env::var("COLUMNS").ok()?.parse().ok())
            .unwrap_or(DEFAULT_WIDTH)
    }
}

/// Exit status follows diff(1): 0 when identical, 1 when the inputs differ.
pub fn run(args: &DiffArgs, config: &Config) -> Result<ExitCode> {
    if args.old.as_os_str() == "-" && args.new.as_os_str() == "-" {
        bail!("Only one of the inputs can be read from stdin");
    }

    let old = read_input(&args.old)?;
    let new = read_input(&args.new)?;
    let engine = args.engine(config);
    let result = engine.diff_strings(&old, &new)?;
    tracing::info!(
        insertions = result.stats.insertions,
        deletions = result.stats.deletions,
        "diff complete"
    );

    let format = args.format.unwrap_or(config.output.format);
    let color = args.color.unwrap_or(config.output.color).enabled();
    let rendered = render(&result, args, config, &engine, format, color)?;
    print!("{rendered}");

    if args.stats {
        eprintln!("{}", summary(&result));
    }

    Ok(if result.is_identical() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

fn render(
    result: &DiffResult,
    args: &DiffArgs,
    config: &Config,
    engine: &DiffEngine,
    format: OutputFormat,
    color: bool,
) -> Result<String> {
    let mut out = match format {
        OutputFormat::Unified => render_unified(
            result,
            &label(&args.old),
            &label(&args.new),
            engine.context_lines(),
            color,
        )?,
        OutputFormat::Html => render_html(&result.ops),
        OutputFormat::Ansi => render_ansi(&result.ops, color),
        OutputFormat::SideBySide => {
            format_side_by_side(&render_side_by_side(result)?, args.width(config))
        }
        OutputFormat::Json => render_json(result)?,
    };
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
    Ok(out)
}

fn summary(result: &DiffResult) -> String {
    let unit = match result.mode {
        TokenMode::Lines => "lines",
        TokenMode::Chars => "characters",
        TokenMode::Words | TokenMode::Code => "tokens",
    };
    format!(
        "{} {unit} inserted(+), {} deleted(-), {} unchanged, {:.1}% similar",
        result.stats.insertions,
        result.stats.deletions,
        result.stats.unchanged,
        result.stats.similarity() * 100.0
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        diff: DiffArgs,
    }

    fn parse(args: &[&str]) -> DiffArgs {
        TestCli::parse_from(std::iter::once("quill").chain(args.iter().copied())).diff
    }

    #[test]
    fn test_flags_override_config() {
        let mut config = Config::default();
        config.diff.mode = TokenMode::Chars;
        config.diff.context = 7;

        let args = parse(&["a", "b", "--mode", "lines", "-i"]);
        let engine = args.engine(&config);

        assert_eq!(engine.mode(), TokenMode::Lines);
        assert_eq!(engine.context_lines(), 7);
    }

    #[test]
    fn test_render_formats() {
        let args = parse(&["old.txt", "new.txt"]);
        let config = Config::default();
        let engine = DiffEngine::new().with_mode(TokenMode::Lines);
        let result = engine.diff_strings("a\nb\n", "a\nc\n").unwrap();

        let unified =
            render(&result, &args, &config, &engine, OutputFormat::Unified, false).unwrap();
        assert!(unified.starts_with("--- old.txt\n+++ new.txt\n"));

        let html = render(&result, &args, &config, &engine, OutputFormat::Html, false).unwrap();
        assert!(html.contains("<ins class=\"diff-insert\">c\n</ins>"));
    }

    #[test]
    fn test_ignore_case_renders_nothing_for_equal_inputs() {
        let args = parse(&["a", "b", "-i"]);
        let config = Config::default();
        let engine = args.engine(&config);
        let result = engine.diff_strings("Hello World\n", "hello world\n").unwrap();
        assert!(result.is_identical());

        for format in [OutputFormat::Unified, OutputFormat::SideBySide] {
            let out = render(&result, &args, &config, &engine, format, false).unwrap();
            assert!(!out.contains('|') && !out.contains("@@"), "{format:?}: {out}");
        }
    }

    #[test]
    fn test_summary() {
        let result = DiffEngine::new().diff_strings("one two", "one three").unwrap();
        assert_eq!(
            summary(&result),
            "1 tokens inserted(+), 1 deleted(-), 1 unchanged, 50.0% similar"
        );
    }
}
