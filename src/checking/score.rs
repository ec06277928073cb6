//! Score calculation for rogaine, ARDF and Trail-O.

use crate::core::control::{Control, ControlCode, TRAILO_TIMED_ANSWER, TRAILO_TIMED_THRESHOLD};
use crate::core::result::Split;
use crate::core::time::RaceTime;
use crate::core::types::ScoreMode;
use crate::race::store::RaceContext;

/// Points for one punched control code.
///
/// An explicit score registered for the control wins; otherwise the fixed
/// configured value, or the code divided by ten in rogaine score mode.
#[must_use]
pub fn control_score(context: &RaceContext, code: &str) -> i64 {
    if let Some(score) = context.control_score(code) {
        return score;
    }
    match context.settings.result_processing_score_mode {
        ScoreMode::Fixed => context.settings.result_processing_fixed_score_value,
        ScoreMode::Rogaine => code.parse::<i64>().map_or(0, |n| n / 10),
    }
}

/// Rogaine score: each code counts the first time it is punched, unless
/// duplicates are allowed.
#[must_use]
pub fn calculate_rogaine_score(splits: &[Split], context: &RaceContext, allow_duplicates: bool) -> i64 {
    let mut seen: Vec<&str> = Vec::new();
    let mut score = 0;

    for split in splits {
        let code = split.code.as_str();
        if allow_duplicates || !seen.contains(&code) {
            seen.push(code);
            score += control_score(context, code);
        }
    }

    score
}

/// Late penalty: `penalty_step` points per started minute past the limit,
/// never more than the score itself. A zero limit means no penalty.
///
/// ```text
/// limit 60:00, result 61:30, step 1 -> 2
/// ```
#[must_use]
pub fn calculate_rogaine_penalty(
    result_time: RaceTime,
    max_time: RaceTime,
    score: i64,
    penalty_step: i64,
) -> i64 {
    let mut penalty = 0;
    if RaceTime::ZERO < max_time && max_time < result_time {
        let seconds = (result_time - max_time).to_sec();
        // 1:01 over counts as two minutes
        let minutes = (seconds + 59) / 60;
        penalty = minutes * penalty_step;
    }
    penalty.min(score)
}

/// ARDF score: one point per distinct code taken in course order.
///
/// Optional controls (`?`, `?(20,120)`) may be skipped. Punches that do not
/// fit the order are ignored.
#[must_use]
pub fn calculate_scores_ardf(splits: &[Split], controls: &[Control]) -> i64 {
    let mut counted: Vec<&str> = Vec::new();
    let mut score = 0;
    let mut cursor = 0;

    for split in splits {
        let code = split.code.as_str();
        let initial = cursor;
        let mut matched = false;

        while cursor < controls.len() {
            let control = &controls[cursor].code;

            if let ControlCode::Optional { .. } = control {
                if control.accepts(code) && !counted.contains(&code) {
                    counted.push(code);
                    score += 1;
                    matched = true;
                    cursor = initial + 1;
                    break;
                }
                cursor += 1;
                continue;
            }

            if control.accepts(code) {
                if !counted.contains(&code) {
                    counted.push(code);
                    score += 1;
                }
                matched = true;
                cursor += 1;
            }
            break;
        }

        // A punch that fits nowhere does not move the cursor
        if !matched {
            cursor = initial;
        }
    }

    score
}

/// Trail-O score: one point per map task (number below 100) answered with
/// the correct letter.
#[must_use]
pub fn calculate_scores_trailo(splits: &[Split], controls: &[Control]) -> i64 {
    let mut score = 0;

    for control in controls {
        let ControlCode::TrailO { number, answer } = control.code else {
            continue;
        };
        if number >= TRAILO_TIMED_THRESHOLD || answer == TRAILO_TIMED_ANSWER {
            continue;
        }
        let answered = splits
            .iter()
            .any(|s| s.trailo_parts() == Some((number, answer)));
        if answered {
            score += 1;
        }
    }

    score
}

/// Trail-O time: sum of the times recorded at timed (`T`) controls
#[must_use]
pub fn calculate_time_trailo(splits: &[Split], controls: &[Control]) -> RaceTime {
    let mut total = RaceTime::ZERO;

    for control in controls {
        let ControlCode::TrailO { number, answer } = control.code else {
            continue;
        };
        if answer != TRAILO_TIMED_ANSWER {
            continue;
        }
        if let Some(split) = splits
            .iter()
            .find(|s| s.trailo_parts() == Some((number, TRAILO_TIMED_ANSWER)))
        {
            total += split.time;
        }
    }

    total
}
