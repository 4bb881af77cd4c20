//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::anchor::AnchorArgs;
use crate::commands::chart::ChartArgs;
use crate::commands::timeline::TimelineArgs;

/// Battery historian timeline extraction.
///
/// Reads an Android diagnostic dump and derives the deep doze, light doze
/// and screen-on timeline with wakeup alarm and job counts per interval.
#[derive(Debug, Parser)]
#[command(name = "bh", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the power-state timeline of a dump.
    Timeline(TimelineArgs),

    /// Print chart series (count bars and axis bounds) as JSON.
    Chart(ChartArgs),

    /// Print the absolute time job offsets are counted from.
    Anchor(AnchorArgs),
}
