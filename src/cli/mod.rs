// src/cli/mod.rs — CLI definition (clap derive)

pub mod progress;
pub mod run;

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "decora", about = "Autonomous interior design agent", version)]
pub struct Cli {
    /// Design goal, e.g. "make this living room feel scandinavian"
    #[arg(trailing_var_arg = true)]
    pub goal: Vec<String>,

    /// Path or URL of the room image to refine
    #[arg(short, long)]
    pub image: String,

    /// Style keyword, in priority order (repeatable)
    #[arg(short = 's', long = "style")]
    pub styles: Vec<String>,

    /// Max iterations
    #[arg(short = 'n', long)]
    pub iterations: Option<u32>,

    /// Cost ceiling in USD
    #[arg(short, long)]
    pub budget: Option<f64>,

    /// Delay between iterations, in milliseconds
    #[arg(long)]
    pub delay_ms: Option<u64>,

    /// Score changes without retaining generated artifacts
    #[arg(long)]
    pub simulate: bool,

    /// Write the run report (JSON) to this path
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Write retained artifact references (JSON) to this path
    #[arg(long)]
    pub artifacts: Option<PathBuf>,

    /// Suppress progress output (only emit the final report)
    #[arg(long)]
    pub quiet: bool,

    /// Config file path
    #[arg(long)]
    pub config: Option<String>,
}
