//! Command-line interface for orient-results.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **check**: Check every result of a race and assign group places
//! - **splits**: Show leg times, leg places and leg leaders per group
//! - **penalty**: Count marked-route penalties of a punch list against a course
//!
//! ## Usage
//!
//! ```text
//! # Check a race file and print the results
//! orient-results check race.json
//!
//! # Read raw card dumps first, then write the checked race back
//! orient-results check race.json --cards cards.json --write checked.json
//!
//! # Force a processing mode
//! orient-results check race.json --mode scores --format json
//!
//! # Splits of one group
//! orient-results splits race.json --group M21
//!
//! # Ad-hoc penalty count
//! orient-results penalty --course "31,41,51" --punches "31,42,51"
//! ```

use clap::{Parser, Subcommand};

pub mod check;
pub mod penalty;
pub mod splits;

#[derive(Parser)]
#[command(name = "orient-results")]
#[command(author = "Fulcrum Genomics")]
#[command(version)]
#[command(about = "Check orienteering results, penalties, splits and rankings")]
#[command(
    long_about = "orient-results checks competitors' punches against their courses and computes official results.\n\nIt supports classic time courses, marked routes with penalty time or laps, rogaine scores, ARDF and Trail-O, and provides:\n- Result status and penalties for every competitor\n- Leg times with leg places and leaders\n- Group places with shared places for ties"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check all results of a race and assign places
    Check(check::CheckArgs),

    /// Show per-leg splits for each group
    Splits(splits::SplitsArgs),

    /// Count penalties of a punch list against a course
    Penalty(penalty::PenaltyArgs),
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}
