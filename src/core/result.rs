use serde::{Deserialize, Serialize};

use crate::core::control::{split_trailo, ControlCode};
use crate::core::course::{Course, Person};
use crate::core::time::RaceTime;
use crate::core::types::{PersonId, ResultStatus};

/// One punch on a card, plus the leg data derived from it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Split {
    pub code: String,
    pub time: RaceTime,

    // === Set by checking ===
    #[serde(default)]
    pub is_correct: bool,
    #[serde(default)]
    pub has_penalty: bool,

    // === Set by split generation ===
    /// Position of this punch on the card
    #[serde(default)]
    pub index: usize,
    /// Matched course position, `None` when the punch matched no control
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_index: Option<usize>,
    #[serde(default)]
    pub leg_time: RaceTime,
    #[serde(default)]
    pub relative_time: RaceTime,
    #[serde(default)]
    pub leg_place: usize,
    #[serde(default)]
    pub relative_place: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leader_time: Option<RaceTime>,
    #[serde(default)]
    pub length_leg: u32,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub speed: String,
}

impl Split {
    pub fn new(code: impl Into<String>, time: RaceTime) -> Self {
        Self {
            code: code.into(),
            time,
            ..Self::default()
        }
    }

    /// Numeric value of the code, if it has one
    #[must_use]
    pub fn code_number(&self) -> Option<u32> {
        self.code.parse().ok()
    }

    /// Trail-O number and answer letter of the code
    #[must_use]
    pub fn trailo_parts(&self) -> Option<(u32, char)> {
        split_trailo(&self.code)
    }
}

/// One competitor's race record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RaceResult {
    /// Linked person; unassigned cards have none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub person: Option<PersonId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_number: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<RaceTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_time: Option<RaceTime>,

    #[serde(default)]
    pub splits: Vec<Split>,

    #[serde(default)]
    pub status: ResultStatus,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub status_comment: String,

    // === Penalties ===
    #[serde(default)]
    pub penalty_time: RaceTime,
    #[serde(default)]
    pub penalty_laps: u32,
    #[serde(default)]
    pub credit_time: RaceTime,

    // === Scores ===
    #[serde(default)]
    pub rogaine_score: i64,
    #[serde(default)]
    pub rogaine_penalty: i64,
    #[serde(default)]
    pub scores_ardf: i64,
    #[serde(default)]
    pub trailo_score: i64,
    #[serde(default)]
    pub trailo_score_penalty: i64,
    #[serde(default)]
    pub trailo_time: RaceTime,

    // === Derived ===
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place: Option<usize>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub speed: String,
}

impl RaceResult {
    pub fn new(person: Option<PersonId>) -> Self {
        Self {
            person,
            ..Self::default()
        }
    }

    /// Append a punch
    #[must_use]
    pub fn with_punch(mut self, code: &str, time: RaceTime) -> Self {
        self.splits.push(Split::new(code, time));
        self
    }

    #[must_use]
    pub fn with_times(mut self, start: RaceTime, finish: RaceTime) -> Self {
        self.start_time = Some(start);
        self.finish_time = Some(finish);
        self
    }

    /// Start time of the result, falling back to the person's start time
    #[must_use]
    pub fn get_start_time(&self, person: Option<&Person>) -> RaceTime {
        self.start_time
            .or_else(|| person.and_then(|p| p.start_time))
            .unwrap_or_default()
    }

    #[must_use]
    pub fn get_finish_time(&self) -> RaceTime {
        self.finish_time
            .or_else(|| self.splits.last().map(|s| s.time))
            .unwrap_or_default()
    }

    /// Credited race time: finish - start + penalty - credit, never negative
    #[must_use]
    pub fn get_result_time(&self, person: Option<&Person>) -> RaceTime {
        let time = self.get_finish_time() - self.get_start_time(person) + self.penalty_time
            - self.credit_time;
        time.max(RaceTime::ZERO)
    }

    /// Punch codes in card order
    #[must_use]
    pub fn codes(&self) -> Vec<&str> {
        self.splits.iter().map(|s| s.code.as_str()).collect()
    }

    /// Ordered course check.
    ///
    /// Marks every accepted punch `is_correct` and clears its `has_penalty`
    /// flag; all other punches keep `has_penalty`. Returns true when every
    /// control of the course was taken in order.
    pub fn check(&mut self, course: &Course) -> bool {
        for split in &mut self.splits {
            split.is_correct = false;
            split.has_penalty = true;
            split.course_index = None;
        }

        let controls = &course.controls;
        if controls.is_empty() {
            return true;
        }

        let mut accepted: Vec<String> = Vec::new();
        let mut cursor = 0;

        for split in &mut self.splits {
            let control = &controls[cursor].code;
            if !control.accepts(&split.code) {
                continue;
            }
            // Each free-order wildcard takes a code only once
            if matches!(control, ControlCode::Wildcard(_)) && accepted.contains(&split.code) {
                continue;
            }

            split.is_correct = true;
            split.has_penalty = false;
            accepted.push(split.code.clone());
            cursor += 1;

            if cursor == controls.len() {
                break;
            }
        }

        cursor == controls.len()
    }
}
