//! Penalty calculation for marked routes and Trail-O.
//!
//! Everything here is a pure function of punches and course controls.

use crate::core::control::{Control, ControlCode, TRAILO_TIMED_ANSWER, TRAILO_TIMED_THRESHOLD};
use crate::core::result::Split;
use crate::core::time::RaceTime;

/// Wrong alternatives of every marked-route choice control, each listed once
#[must_use]
pub fn incorrect_choice_codes(controls: &[Control]) -> Vec<&str> {
    let mut codes: Vec<&str> = Vec::new();
    for control in controls {
        for code in control.code.incorrect_choices() {
            if !codes.contains(&code) {
                codes.push(code);
            }
        }
    }
    codes
}

/// Number of incorrect or duplicated punches; order is ignored.
///
/// ```text
/// origin: 31,41,51; athlete: 31,41,51; result: 0
/// origin: 31,41,51; athlete: 31; result: 0
/// origin: 31,41,51; athlete: 41,31,51; result: 0
/// origin: 31,41,51; athlete: 31,42,51; result: 1
/// origin: 31,41,51; athlete: 31,41,51,52; result: 1
/// origin: 31,41,51; athlete: 31,31,41,51; result: 1
/// origin: 31,41,51; athlete: 32,42,52; result: 3
/// origin: 31,41,51; athlete: 51,61,71,81,91,32,42; result: 6
/// ```
///
/// With `check_existence`, each punch the athlete is short of the control
/// count adds one more penalty (`31,41,51` vs `31` gives 2).
///
/// When the course has choice controls such as `31(31,131)`, only the wrong
/// choices are charged, once per distinct code, and the classic matching is
/// skipped for the whole course.
#[must_use]
pub fn penalty_calculation(splits: &[Split], controls: &[Control], check_existence: bool) -> usize {
    let mut user: Vec<&str> = splits.iter().map(|s| s.code.as_str()).collect();
    let origin: Vec<String> = controls.iter().map(|c| c.code.number_code()).collect();
    let mut penalty = 0;

    if check_existence && user.len() < origin.len() {
        penalty = origin.len() - user.len();
    }

    let incorrect = incorrect_choice_codes(controls);
    if !incorrect.is_empty() {
        // TODO: confirm with organisers whether plain controls next to choice
        // controls should still go through the classic matching
        penalty += incorrect.iter().filter(|code| user.contains(*code)).count();
        return penalty;
    }

    for code in &origin {
        if code == "0" {
            if !user.is_empty() {
                user.remove(0);
            }
        } else if let Some(pos) = user.iter().position(|u| *u == code.as_str()) {
            user.remove(pos);
        }
    }

    // Only incorrect and duplicated punches are left
    penalty + user.len()
}

/// Shortfall of accepted punches against the control count.
///
/// Relies on the `has_penalty` flags left by the ordered course check:
///
/// ```text
/// origin: *,*,*; athlete: 31,41,51; result: 0
/// origin: *,*,*; athlete: 31,31,51; result: 1
/// origin: *,*,*; athlete: 31; result: 2
/// origin: 40,*,*,90; athlete: 40,31,40,90; result: 1
/// origin: 40,*,*,90; athlete: 31,32,33,90; result: 4
/// ```
#[must_use]
pub fn penalty_calculation_free_order(splits: &[Split], controls: &[Control]) -> usize {
    let correct = splits.iter().filter(|s| !s.has_penalty).count();
    controls.len().saturating_sub(correct)
}

/// Time penalty for wrong answers at timed Trail-O controls.
///
/// Controls numbered below 100 are scored instead, and a `T` control accepts
/// any answer.
#[must_use]
pub fn penalty_calculation_trailo(
    splits: &[Split],
    controls: &[Control],
    penalty_time: RaceTime,
) -> RaceTime {
    let mut total = RaceTime::ZERO;

    for control in controls {
        let ControlCode::TrailO { number, answer } = control.code else {
            continue;
        };
        if number < TRAILO_TIMED_THRESHOLD || answer == TRAILO_TIMED_ANSWER {
            continue;
        }

        let wrong = splits.iter().any(|s| {
            s.trailo_parts()
                .is_some_and(|(n, a)| n == number && a != answer)
        });
        if wrong {
            total += penalty_time;
        }
    }

    total
}

/// Split punches into regular ones and penalty laps run at the lap station.
///
/// A punch is a penalty lap when it was taken at the station and is not part
/// of the course.
#[must_use]
pub fn detach_penalty_laps(splits: &[Split], lap_station: Option<u32>) -> (Vec<Split>, Vec<Split>) {
    let at_station = |s: &Split| lap_station.is_some() && s.code_number() == lap_station;

    let (penalty, regular): (Vec<Split>, Vec<Split>) = splits
        .iter()
        .cloned()
        .partition(|s| at_station(s) && !s.is_correct);
    (regular, penalty)
}

/// Time spent on legs ending at the credit control
#[must_use]
pub fn credit_calculation(splits: &[Split], credit_cp: u32) -> RaceTime {
    splits
        .windows(2)
        .filter(|pair| pair[1].code_number() == Some(credit_cp))
        .fold(RaceTime::ZERO, |acc, pair| acc + (pair[1].time - pair[0].time))
}
