//! Check command - check every result of a race and assign group places.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use tracing::warn;

use crate::checking::ResultChecker;
use crate::cli::OutputFormat;
use crate::core::result::RaceResult;
use crate::core::time::RaceTime;
use crate::core::types::{ProcessingMode, ResultStatus};
use crate::parsing::card::parse_cards_file;
use crate::race::store::Race;
use crate::readout::{read_cards, CardDataProcessor};
use crate::splits::{placing, RaceSplits};

/// Arguments for the check command
#[derive(Args)]
pub struct CheckArgs {
    /// Race file (JSON)
    #[arg(required = true)]
    pub race: PathBuf,

    /// Raw card dumps (JSON array) to read in before checking
    #[arg(long)]
    pub cards: Option<PathBuf>,

    /// Override the processing mode of the race file
    #[arg(long)]
    pub mode: Option<ProcessingMode>,

    /// Check results again even if they already carry a final status
    #[arg(long)]
    pub recheck: bool,

    /// Only show results of this group
    #[arg(short, long)]
    pub group: Option<String>,

    /// Write the checked race to this file (JSON)
    #[arg(short, long)]
    pub write: Option<PathBuf>,
}

/// One printed result line
struct ResultRow {
    group: String,
    place: Option<usize>,
    name: String,
    bib: u32,
    status: ResultStatus,
    time: RaceTime,
    score: Option<i64>,
    penalty_time: RaceTime,
    penalty_laps: u32,
    comment: String,
}

/// Execute the check command
///
/// # Errors
///
/// Returns an error if the race or card file cannot be read or parsed, or the
/// checked race cannot be written.
#[allow(clippy::needless_pass_by_value)]
pub fn run(args: CheckArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let mut race = Race::load_from_file(&args.race)
        .with_context(|| format!("Failed to load race from {}", args.race.display()))?;

    if let Some(mode) = args.mode {
        race.context.settings.result_processing_mode = mode;
    }
    let mode = race.context.settings.result_processing_mode;

    if let Some(ref path) = args.cards {
        let cards = parse_cards_file(path)?;
        let count = cards.len();
        let rt = tokio::runtime::Runtime::new()?;
        let results = rt.block_on(read_cards(CardDataProcessor::new(mode), cards))?;
        if verbose {
            eprintln!("Read {} of {} cards from {}", results.len(), count, path.display());
        }
        for result in results {
            race.add_result(result);
        }
    }

    let checker = ResultChecker::new(&race.context);
    let checked = if args.recheck {
        race.results
            .iter_mut()
            .filter(|r| r.person.is_some())
            .filter_map(|r| checker.recheck(r).ok())
            .count()
    } else {
        checker.check_all(&mut race.results)
    };

    let unassigned = race.results.iter().filter(|r| r.person.is_none()).count();
    if unassigned > 0 {
        warn!("{unassigned} results have no linked person and were not checked");
    }
    if verbose {
        eprintln!("Checked {checked} results in {mode:?} mode");
    }

    placing::set_places(&race.context, &mut race.results);
    RaceSplits::generate(&race.context, &mut race.results, None);

    if let Some(ref path) = args.write {
        std::fs::write(path, race.to_json()?)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        if verbose {
            eprintln!("Checked race written to {}", path.display());
        }
    }

    let rows = collect_rows(&race, mode, args.group.as_deref());
    match format {
        OutputFormat::Text => print_text(&rows, mode),
        OutputFormat::Json => print_json(&rows)?,
        OutputFormat::Tsv => print_tsv(&rows),
    }

    Ok(())
}

fn score_of(result: &RaceResult, mode: ProcessingMode) -> Option<i64> {
    match mode {
        ProcessingMode::Time => None,
        ProcessingMode::Scores => Some(result.rogaine_score),
        ProcessingMode::Ardf => Some(result.scores_ardf),
        ProcessingMode::Trailo => Some(result.trailo_score),
    }
}

fn collect_rows(race: &Race, mode: ProcessingMode, group: Option<&str>) -> Vec<ResultRow> {
    let mut rows = Vec::new();

    for g in race
        .context
        .groups
        .iter()
        .filter(|g| group.map_or(true, |name| g.name == name))
    {
        let mut group_rows: Vec<ResultRow> = race
            .group_results(&g.name)
            .map(|result| {
                let person = race.context.person_of(result);
                ResultRow {
                    group: g.name.clone(),
                    place: result.place,
                    name: person.map(|p| p.name.clone()).unwrap_or_default(),
                    bib: person.map_or(0, |p| p.bib),
                    status: result.status,
                    time: result.get_result_time(person),
                    score: score_of(result, mode),
                    penalty_time: result.penalty_time,
                    penalty_laps: result.penalty_laps,
                    comment: result.status_comment.clone(),
                }
            })
            .collect();

        group_rows.sort_by_key(|r| (r.place.is_none(), r.place, r.status.sort_priority(), r.time));
        rows.extend(group_rows);
    }

    rows
}

fn print_text(rows: &[ResultRow], mode: ProcessingMode) {
    let mut current_group: Option<&str> = None;

    for row in rows {
        if current_group != Some(row.group.as_str()) {
            println!("\n{}", row.group);
            println!("{}", "─".repeat(60));
            current_group = Some(row.group.as_str());
        }

        let place = row.place.map(|p| format!("{p}.")).unwrap_or_default();
        let score = row.score.map(|s| format!("  {s} pts")).unwrap_or_default();
        let penalty = if row.penalty_laps > 0 {
            format!("  +{} laps", row.penalty_laps)
        } else if row.penalty_time > RaceTime::ZERO {
            format!("  +{}", row.penalty_time)
        } else {
            String::new()
        };

        println!(
            "{:>4} {:<24} {:>5}  {:<4} {}{}{}",
            place,
            row.name,
            row.bib,
            row.status.to_string(),
            row.time,
            score,
            penalty
        );
        if !row.comment.is_empty() {
            println!("     {}", row.comment);
        }
    }

    if rows.is_empty() {
        println!("No results ({mode:?} mode)");
    }
}

fn print_json(rows: &[ResultRow]) -> anyhow::Result<()> {
    let output: Vec<serde_json::Value> = rows
        .iter()
        .map(|row| {
            serde_json::json!({
                "group": row.group,
                "place": row.place,
                "name": row.name,
                "bib": row.bib,
                "status": row.status,
                "time": row.time,
                "score": row.score,
                "penalty_time": row.penalty_time,
                "penalty_laps": row.penalty_laps,
                "comment": row.comment,
            })
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_tsv(rows: &[ResultRow]) {
    println!("group\tplace\tname\tbib\tstatus\ttime\tscore\tpenalty_time\tpenalty_laps");
    for row in rows {
        println!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            row.group,
            row.place.map(|p| p.to_string()).unwrap_or_default(),
            row.name,
            row.bib,
            row.status,
            row.time,
            row.score.map(|s| s.to_string()).unwrap_or_default(),
            row.penalty_time,
            row.penalty_laps,
        );
    }
}
