//! Text tools: `regex`, `case`, `clean`, `json`, `stats`

use crate::input::read_input;
use anyhow::Result;
use clap::Args;
use quill_core::format::{self, CaseStyle, CleanupOptions};
use quill_core::regex_tester::{self, RegexFlags, TestReport};
use std::fmt::Write as _;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Args)]
pub struct RegexArgs {
    pub pattern: String,
    /// Text to search (`-` for stdin)
    #[arg(default_value = "-")]
    pub input: PathBuf,
    /// JavaScript-style flags, e.g. `gim`
    #[arg(short, long)]
    pub flags: Option<RegexFlags>,
    /// Print the text with matches replaced instead of listing matches
    #[arg(short, long)]
    pub replace: Option<String>,
    #[arg(long)]
    pub json: bool,
}

pub fn run_regex(args: &RegexArgs) -> Result<ExitCode> {
    let text = read_input(&args.input)?;
    let flags = args.flags.unwrap_or_default();
    if let Some(replacement) = &args.replace {
        print!("{}", regex_tester::replace(&args.pattern, flags, &text, replacement)?);
        return Ok(ExitCode::SUCCESS);
    }

    let report = regex_tester::test(&args.pattern, flags, &text)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", describe_matches(&report));
    }
    Ok(if report.is_match() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

fn describe_matches(report: &TestReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} match{} for /{}/{}",
        report.matches.len(),
        if report.matches.len() == 1 { "" } else { "es" },
        report.pattern,
        report.flags
    );
    for (i, m) in report.matches.iter().enumerate() {
        let _ = writeln!(out, "#{} [{}..{}] {:?}", i + 1, m.start, m.end, m.text);
        for group in &m.groups {
            let name = match &group.name {
                Some(name) => format!("{} ({name})", group.index),
                None => group.index.to_string(),
            };
            match &group.text {
                Some(text) => {
                    let _ = writeln!(out, "    group {name}: {text:?}");
                }
                None => {
                    let _ = writeln!(out, "    group {name}: <unmatched>");
                }
            }
        }
    }
    out
}

#[derive(Debug, Args)]
pub struct CaseArgs {
    /// upper, lower, title, sentence, camel, pascal, snake, kebab or constant
    pub style: CaseStyle,
    #[arg(default_value = "-")]
    pub input: PathBuf,
}

pub fn run_case(args: &CaseArgs) -> Result<ExitCode> {
    let text = read_input(&args.input)?;
    print!("{}", format::convert_case(&text, args.style));
    Ok(ExitCode::SUCCESS)
}

#[derive(Debug, Args)]
pub struct CleanArgs {
    #[arg(default_value = "-")]
    pub input: PathBuf,
    /// Trim leading and trailing whitespace on every line
    #[arg(long)]
    pub trim: bool,
    /// Collapse runs of spaces and tabs
    #[arg(long)]
    pub collapse: bool,
    /// Drop blank lines
    #[arg(long)]
    pub no_blank: bool,
    /// Drop repeated lines
    #[arg(long)]
    pub dedupe: bool,
    #[arg(long)]
    pub sort: bool,
}

impl CleanArgs {
    fn options(&self) -> CleanupOptions {
        let nothing_selected =
            !(self.trim || self.collapse || self.no_blank || self.dedupe || self.sort);
        if nothing_selected {
            // bare `quill clean` tidies whitespace
            return CleanupOptions {
                trim_lines: true,
                collapse_spaces: true,
                remove_blank_lines: true,
                ..Default::default()
            };
        }
        CleanupOptions {
            trim_lines: self.trim,
            collapse_spaces: self.collapse,
            remove_blank_lines: self.no_blank,
            dedupe_lines: self.dedupe,
            sort_lines: self.sort,
        }
    }
}

pub fn run_clean(args: &CleanArgs) -> Result<ExitCode> {
    let text = read_input(&args.input)?;
    print!("{}", format::cleanup(&text, &args.options()));
    Ok(ExitCode::SUCCESS)
}

#[derive(Debug, Args)]
pub struct JsonArgs {
    #[arg(default_value = "-")]
    pub input: PathBuf,
    #[arg(short, long)]
    pub minify: bool,
    /// Spaces per indentation level
    #[arg(long, default_value_t = 2)]
    pub indent: usize,
}

pub fn run_json(args: &JsonArgs) -> Result<ExitCode> {
    let text = read_input(&args.input)?;
    let out = if args.minify {
        format::json_minify(&text)?
    } else {
        format::json_pretty(&text, args.indent)?
    };
    println!("{out}");
    Ok(ExitCode::SUCCESS)
}

#[derive(Debug, Args)]
pub struct StatsArgs {
    #[arg(default_value = "-")]
    pub input: PathBuf,
    #[arg(long)]
    pub json: bool,
}

pub fn run_stats(args: &StatsArgs) -> Result<ExitCode> {
    let text = read_input(&args.input)?;
    let stats = format::text_stats(&text);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(ExitCode::SUCCESS);
    }
    println!("Characters:           {}", stats.characters);
    println!("Characters (no space): {}", stats.characters_no_whitespace);
    println!("Words:                {}", stats.words);
    println!("Lines:                {}", stats.lines);
    println!("Sentences:            {}", stats.sentences);
    println!("Paragraphs:           {}", stats.paragraphs);
    println!(
        "Reading time:         {}m {:02}s",
        stats.reading_time_secs / 60,
        stats.reading_time_secs % 60
    );
    Ok(ExitCode::SUCCESS)
}
