//! Subcommand implementations

mod diff;
mod pdf;
mod random;
mod text;

pub use diff::{run as run_diff, DiffArgs};
pub use pdf::{run_pages, run_pdf_rect, run_watermark, PagesArgs, PdfRectArgs, WatermarkArgs};
pub use random::{
    run_numbers, run_password, run_pick, run_shuffle, run_uuid, NumbersArgs, PasswordArgs,
    PickArgs, ShuffleArgs, UuidArgs,
};
pub use text::{
    run_case, run_clean, run_json, run_regex, run_stats, CaseArgs, CleanArgs, JsonArgs, RegexArgs,
    StatsArgs,
};
