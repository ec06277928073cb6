//! Penalty command - count marked-route penalties of a punch list.
//!
//! Runs the ordered course check and both penalty counts (classic and free
//! order) without a race file.

use std::path::PathBuf;

use clap::Args;

use crate::checking::penalty::{
    incorrect_choice_codes, penalty_calculation, penalty_calculation_free_order,
};
use crate::cli::OutputFormat;
use crate::core::control::Control;
use crate::core::course::Course;
use crate::core::result::{RaceResult, Split};
use crate::core::time::RaceTime;
use crate::parsing::punches::parse_punches_file;
use crate::utils::validation::split_code_list;

/// Arguments for the penalty command
#[derive(Args)]
pub struct PenaltyArgs {
    /// Course control expressions, e.g. "31,41(41,141),*,90"
    #[arg(short, long, required = true)]
    pub course: String,

    /// Punched codes in card order, e.g. "31,141,55,90"
    #[arg(short, long, conflicts_with = "punches_file")]
    pub punches: Option<String>,

    /// Punch file (TSV/CSV with code and time columns)
    #[arg(long)]
    pub punches_file: Option<PathBuf>,

    /// Charge one extra penalty per punch missing from the control count
    #[arg(long)]
    pub check_existence: bool,
}

struct PenaltyReport {
    controls: usize,
    punches: usize,
    check_passed: bool,
    classic: usize,
    free_order: usize,
    wrong_choices: Vec<String>,
}

/// Execute the penalty command
///
/// # Errors
///
/// Returns an error if no punches are given or the punch file cannot be parsed.
#[allow(clippy::needless_pass_by_value)]
pub fn run(args: PenaltyArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let course = Course::new(
        "course",
        split_code_list(&args.course)
            .iter()
            .map(|c| Control::new(c))
            .collect(),
    );

    let splits = match (&args.punches, &args.punches_file) {
        (Some(list), _) => punches_from_list(list),
        (None, Some(path)) => parse_punches_file(path)?,
        (None, None) => anyhow::bail!("Either --punches or --punches-file is required"),
    };

    if verbose {
        let codes: Vec<String> = course.controls.iter().map(|c| c.code.to_string()).collect();
        eprintln!("Course: {}", codes.join(" "));
    }

    let report = evaluate(&course, splits, args.check_existence);

    match format {
        OutputFormat::Text => {
            println!(
                "Controls: {}, punches: {}",
                report.controls, report.punches
            );
            println!(
                "Ordered check: {}",
                if report.check_passed { "passed" } else { "failed" }
            );
            println!("Classic penalty: {}", report.classic);
            println!("Free-order penalty: {}", report.free_order);
            if !report.wrong_choices.is_empty() {
                println!("Wrong choices punched: {}", report.wrong_choices.join(", "));
            }
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "controls": report.controls,
                "punches": report.punches,
                "check_passed": report.check_passed,
                "classic": report.classic,
                "free_order": report.free_order,
                "wrong_choices": report.wrong_choices,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Tsv => {
            println!("controls\tpunches\tcheck_passed\tclassic\tfree_order");
            println!(
                "{}\t{}\t{}\t{}\t{}",
                report.controls,
                report.punches,
                report.check_passed,
                report.classic,
                report.free_order
            );
        }
    }

    Ok(())
}

/// Punches from a code list, one minute apart
fn punches_from_list(list: &str) -> Vec<Split> {
    (1..)
        .zip(split_code_list(list))
        .map(|(minute, code)| Split::new(code, RaceTime::from_sec(minute * 60)))
        .collect()
}

fn evaluate(course: &Course, splits: Vec<Split>, check_existence: bool) -> PenaltyReport {
    let mut result = RaceResult {
        splits,
        ..RaceResult::default()
    };
    let check_passed = result.check(course);

    let wrong_choices = incorrect_choice_codes(&course.controls)
        .into_iter()
        .filter(|code| result.splits.iter().any(|s| s.code == *code))
        .map(str::to_string)
        .collect();

    PenaltyReport {
        controls: course.controls.len(),
        punches: result.splits.len(),
        check_passed,
        classic: penalty_calculation(&result.splits, &course.controls, check_existence),
        free_order: penalty_calculation_free_order(&result.splits, &course.controls),
        wrong_choices,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn course(codes: &str) -> Course {
        Course::new(
            "course",
            split_code_list(codes).iter().map(|c| Control::new(c)).collect(),
        )
    }

    #[test]
    fn test_evaluate_classic() {
        let report = evaluate(&course("31,41,51"), punches_from_list("31,42,51"), false);
        assert!(!report.check_passed);
        assert_eq!(report.classic, 1);
        // 51 comes after the missed 41 and is not accepted in order
        assert_eq!(report.free_order, 2);
        assert!(report.wrong_choices.is_empty());
    }

    #[test]
    fn test_evaluate_existence() {
        let report = evaluate(&course("31,41,51"), Vec::new(), true);
        assert_eq!(report.classic, 3);
        assert_eq!(report.punches, 0);
    }

    #[test]
    fn test_evaluate_choices() {
        let report = evaluate(
            &course("31(31,131) 41(41,141)"),
            punches_from_list("131 41 131"),
            false,
        );
        assert!(report.check_passed);
        assert_eq!(report.classic, 1);
        assert_eq!(report.wrong_choices, vec!["131".to_string()]);
    }

    #[test]
    fn test_punches_from_list_times() {
        let splits = punches_from_list("31 41");
        assert_eq!(splits[1].time, RaceTime::from_sec(120));
    }
}
