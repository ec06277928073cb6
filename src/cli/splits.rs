//! Splits command - per-leg times, leg places and leaders for each group.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use crate::checking::ResultChecker;
use crate::cli::OutputFormat;
use crate::core::time::RaceTime;
use crate::core::types::ProcessingMode;
use crate::race::store::Race;
use crate::splits::{placing, GroupSplits};

/// Arguments for the splits command
#[derive(Args)]
pub struct SplitsArgs {
    /// Race file (JSON)
    #[arg(required = true)]
    pub race: PathBuf,

    /// Only show this group
    #[arg(short, long)]
    pub group: Option<String>,

    /// Override the processing mode of the race file
    #[arg(long)]
    pub mode: Option<ProcessingMode>,
}

/// One leg of one competitor
struct LegRow {
    index: usize,
    code: String,
    leg_time: RaceTime,
    leg_place: usize,
    relative_time: RaceTime,
    relative_place: usize,
    speed: String,
}

struct PersonRow {
    name: String,
    status: String,
    place: Option<usize>,
    legs: Vec<Option<LegRow>>,
}

struct GroupTable {
    name: String,
    leaders: Vec<(String, Option<RaceTime>)>,
    persons: Vec<PersonRow>,
}

/// Execute the splits command
///
/// # Errors
///
/// Returns an error if the race file cannot be read or parsed.
#[allow(clippy::needless_pass_by_value)]
pub fn run(args: SplitsArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let mut race = Race::load_from_file(&args.race)
        .with_context(|| format!("Failed to load race from {}", args.race.display()))?;

    if let Some(mode) = args.mode {
        race.context.settings.result_processing_mode = mode;
    }

    let checked = ResultChecker::new(&race.context).check_all(&mut race.results);
    placing::set_places(&race.context, &mut race.results);
    if verbose {
        eprintln!("Checked {checked} results");
    }

    let tables = build_tables(&mut race, args.group.as_deref());

    match format {
        OutputFormat::Text => print_text(&tables),
        OutputFormat::Json => print_json(&tables)?,
        OutputFormat::Tsv => print_tsv(&tables),
    }

    Ok(())
}

fn build_tables(race: &mut Race, group: Option<&str>) -> Vec<GroupTable> {
    let context = &race.context;
    let mut tables = Vec::new();

    for g in context
        .groups
        .iter()
        .filter(|g| group.map_or(true, |name| g.name == name))
    {
        let splits = GroupSplits::new(context, g).generate(race.results.iter_mut());

        let leaders = (0..splits.cp_count)
            .map(|i| {
                splits
                    .leg_leader(i)
                    .map(|l| (l.name.clone(), l.time))
                    .unwrap_or_default()
            })
            .collect();

        let persons = splits
            .person_splits
            .iter()
            .map(|ps| PersonRow {
                name: ps.person.map(|p| p.name.clone()).unwrap_or_default(),
                status: ps.result.status.to_string(),
                place: ps.result.place,
                legs: (0..splits.cp_count)
                    .map(|i| {
                        ps.get_leg_by_course_index(i).map(|leg| LegRow {
                            index: i,
                            code: leg.code.clone(),
                            leg_time: leg.leg_time,
                            leg_place: leg.leg_place,
                            relative_time: leg.relative_time,
                            relative_place: leg.relative_place,
                            speed: leg.speed.clone(),
                        })
                    })
                    .collect(),
            })
            .collect();

        tables.push(GroupTable {
            name: g.name.clone(),
            leaders,
            persons,
        });
    }

    tables
}

fn print_text(tables: &[GroupTable]) {
    for table in tables {
        println!("\n{}", table.name);
        println!("{}", "─".repeat(60));

        for person in &table.persons {
            let place = person.place.map(|p| format!("{p}.")).unwrap_or_default();
            println!("{:>4} {:<24} {}", place, person.name, person.status);

            for leg in &person.legs {
                match leg {
                    Some(leg) => println!(
                        "       {:>2} {:<6} {} ({})  {} ({})  {}",
                        leg.index + 1,
                        leg.code,
                        leg.leg_time.to_minute_str(),
                        leg.leg_place,
                        leg.relative_time,
                        leg.relative_place,
                        leg.speed
                    ),
                    None => println!("       --"),
                }
            }
        }

        for (i, (name, time)) in table.leaders.iter().enumerate() {
            if let Some(time) = time {
                println!("   Leg {} leader: {} {}", i + 1, name, time.to_minute_str());
            }
        }
    }
}

fn print_json(tables: &[GroupTable]) -> anyhow::Result<()> {
    let output: Vec<serde_json::Value> = tables
        .iter()
        .map(|table| {
            serde_json::json!({
                "group": table.name,
                "leaders": table.leaders.iter().map(|(name, time)| {
                    serde_json::json!({"name": name, "time": time})
                }).collect::<Vec<_>>(),
                "results": table.persons.iter().map(|person| {
                    serde_json::json!({
                        "name": person.name,
                        "status": person.status,
                        "place": person.place,
                        "legs": person.legs.iter().map(|leg| leg.as_ref().map(|leg| {
                            serde_json::json!({
                                "code": leg.code,
                                "leg_time": leg.leg_time,
                                "leg_place": leg.leg_place,
                                "relative_time": leg.relative_time,
                                "relative_place": leg.relative_place,
                                "speed": leg.speed,
                            })
                        })).collect::<Vec<_>>(),
                    })
                }).collect::<Vec<_>>(),
            })
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_tsv(tables: &[GroupTable]) {
    println!("group\tname\tplace\tstatus\tleg\tcode\tleg_time\tleg_place\trelative_time\trelative_place");
    for table in tables {
        for person in &table.persons {
            for leg in person.legs.iter().flatten() {
                println!(
                    "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
                    table.name,
                    person.name,
                    person.place.map(|p| p.to_string()).unwrap_or_default(),
                    person.status,
                    leg.index + 1,
                    leg.code,
                    leg.leg_time,
                    leg.leg_place,
                    leg.relative_time,
                    leg.relative_place,
                );
            }
        }
    }
}
