//! Random generators: `password`, `numbers`, `shuffle`, `pick`, `uuid`

use crate::input::read_input;
use anyhow::Result;
use clap::Args;
use quill_core::random::{self, PasswordOptions};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Args)]
pub struct PasswordArgs {
    #[arg(short, long, default_value_t = 16)]
    pub length: usize,
    /// How many passwords to print
    #[arg(short, long, default_value_t = 1)]
    pub count: usize,
    #[arg(long)]
    pub no_lower: bool,
    #[arg(long)]
    pub no_upper: bool,
    #[arg(long)]
    pub no_digits: bool,
    #[arg(short, long)]
    pub symbols: bool,
    /// Skip look-alike characters such as l, 1, O and 0
    #[arg(long)]
    pub no_ambiguous: bool,
}

impl PasswordArgs {
    fn options(&self) -> PasswordOptions {
        PasswordOptions {
            length: self.length,
            lowercase: !self.no_lower,
            uppercase: !self.no_upper,
            digits: !self.no_digits,
            symbols: self.symbols,
            exclude_ambiguous: self.no_ambiguous,
        }
    }
}

pub fn run_password(args: &PasswordArgs) -> Result<ExitCode> {
    let options = args.options();
    let mut rng = rand::rng();
    for _ in 0..args.count {
        println!("{}", random::password(&options, &mut rng)?);
    }
    Ok(ExitCode::SUCCESS)
}

#[derive(Debug, Args)]
pub struct NumbersArgs {
    #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
    pub min: i64,
    #[arg(long, default_value_t = 100, allow_negative_numbers = true)]
    pub max: i64,
    #[arg(short, long, default_value_t = 1)]
    pub count: usize,
    /// Never repeat a number
    #[arg(short, long)]
    pub unique: bool,
}

pub fn run_numbers(args: &NumbersArgs) -> Result<ExitCode> {
    let values = random::random_integers(
        args.min..=args.max,
        args.count,
        args.unique,
        &mut rand::rng(),
    )?;
    for value in values {
        println!("{value}");
    }
    Ok(ExitCode::SUCCESS)
}

#[derive(Debug, Args)]
pub struct ShuffleArgs {
    /// One item per line (`-` for stdin)
    #[arg(default_value = "-")]
    pub input: PathBuf,
}

pub fn run_shuffle(args: &ShuffleArgs) -> Result<ExitCode> {
    let text = read_input(&args.input)?;
    println!("{}", random::shuffle_lines(&text, &mut rand::rng()));
    Ok(ExitCode::SUCCESS)
}

#[derive(Debug, Args)]
pub struct PickArgs {
    /// One item per line (`-` for stdin)
    #[arg(default_value = "-")]
    pub input: PathBuf,
    #[arg(short, long, default_value_t = 1)]
    pub count: usize,
}

pub fn run_pick(args: &PickArgs) -> Result<ExitCode> {
    let text = read_input(&args.input)?;
    let items: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect();
    for item in random::pick(&items, args.count, &mut rand::rng())? {
        println!("{item}");
    }
    Ok(ExitCode::SUCCESS)
}

#[derive(Debug, Args)]
pub struct UuidArgs {
    #[arg(short, long, default_value_t = 1)]
    pub count: usize,
}

pub fn run_uuid(args: &UuidArgs) -> Result<ExitCode> {
    let mut rng = rand::rng();
    for _ in 0..args.count {
        println!("{}", random::uuid_v4(&mut rng));
    }
    Ok(ExitCode::SUCCESS)
}
