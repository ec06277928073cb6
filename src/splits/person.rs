use crate::core::control::{ControlCode, TRAILO_MISSING_ANSWER, TRAILO_TIMED_ANSWER};
use crate::core::course::{Course, Person};
use crate::core::result::{RaceResult, Split};
use crate::core::time::{speed_min_per_km, RaceTime};
use crate::core::types::ProcessingMode;
use crate::race::store::{CourseResolver, RaceContext};

/// Course used for results without a resolvable course
static UNKNOWN_COURSE: Course = Course {
    name: String::new(),
    controls: Vec::new(),
    length: 0,
};

/// Leg data of one result, matched against its course.
///
/// Generation writes leg fields into the result's splits. Legs after
/// `last_correct_index` are never reported, even when a later punch happens
/// to carry a matching course index.
pub struct PersonSplits<'a> {
    pub result: &'a mut RaceResult,
    pub person: Option<&'a Person>,
    pub course: &'a Course,
    pub relay_leg: u32,
    last_correct_index: Option<usize>,
}

impl<'a> PersonSplits<'a> {
    pub fn new(context: &'a RaceContext, result: &'a mut RaceResult) -> Self {
        let person = context.person_of(result);
        let course = context.find_course(result).unwrap_or(&UNKNOWN_COURSE);
        Self {
            relay_leg: person.map_or(0, Person::relay_leg),
            result,
            person,
            course,
            last_correct_index: None,
        }
    }

    /// Fill in leg data for the given processing mode
    #[must_use]
    pub fn generate(mut self, mode: ProcessingMode) -> Self {
        match mode {
            ProcessingMode::Trailo => self.generate_trailo(),
            ProcessingMode::Time | ProcessingMode::Scores | ProcessingMode::Ardf => {
                self.generate_standard();
            }
        }
        self
    }

    #[must_use]
    pub fn last_correct_index(&self) -> Option<usize> {
        self.last_correct_index
    }

    /// The split recorded for a course leg, if that leg was reached
    #[must_use]
    pub fn get_leg_by_course_index(&self, index: usize) -> Option<&Split> {
        if self.last_correct_index.map_or(true, |last| index > last) {
            return None;
        }
        self.result
            .splits
            .iter()
            .find(|s| s.course_index == Some(index))
    }

    pub fn get_leg_by_course_index_mut(&mut self, index: usize) -> Option<&mut Split> {
        if self.last_correct_index.map_or(true, |last| index > last) {
            return None;
        }
        self.result
            .splits
            .iter_mut()
            .find(|s| s.course_index == Some(index))
    }

    #[must_use]
    pub fn get_leg_time(&self, index: usize) -> Option<RaceTime> {
        self.get_leg_by_course_index(index).map(|s| s.leg_time)
    }

    #[must_use]
    pub fn get_leg_relative_time(&self, index: usize) -> Option<RaceTime> {
        self.get_leg_by_course_index(index).map(|s| s.relative_time)
    }

    fn generate_standard(&mut self) {
        let start = self.result.get_start_time(self.person);

        if self.course.length > 0 {
            let time = self.result.get_result_time(self.person);
            self.result.speed = speed_min_per_km(time, self.course.length);
        }

        for split in &mut self.result.splits {
            split.relative_time = split.time - start;
        }

        if self.course.controls.is_empty() {
            self.legs_without_controls(start);
        } else {
            self.legs_with_controls(start);
        }
    }

    /// Every punch is a leg, in card order
    fn legs_without_controls(&mut self, start: RaceTime) {
        let mut previous = start;
        for (i, split) in self.result.splits.iter_mut().enumerate() {
            split.index = i;
            split.course_index = Some(i);
            split.leg_time = split.time - previous;
            previous = split.time;
        }
        self.last_correct_index = self.result.splits.len().checked_sub(1);
    }

    /// Walk punches and controls in lock-step; only correct punches advance
    /// the control cursor
    fn legs_with_controls(&mut self, start: RaceTime) {
        let controls = &self.course.controls;
        let mut course_index = 0;
        let mut leg_start = start;

        for (i, split) in self.result.splits.iter_mut().enumerate() {
            split.index = i;
            reset_leg(split);

            if course_index >= controls.len() || !split.is_correct {
                continue;
            }

            split.leg_time = split.time - leg_start;
            split.course_index = Some(course_index);
            split.length_leg = controls[course_index].length;
            split.speed = speed_min_per_km(split.leg_time, split.length_leg);

            leg_start = split.time;
            course_index += 1;
        }

        self.last_correct_index = course_index.checked_sub(1);
    }

    /// Trail-O legs are matched by control number, whatever the punch order.
    /// Unanswered controls get a synthesized missing punch.
    fn generate_trailo(&mut self) {
        let splits = &mut self.result.splits;
        splits.retain(|s| !s.code.ends_with(TRAILO_MISSING_ANSWER));
        sort_trailo(splits);

        for split in splits.iter_mut() {
            reset_leg(split);
            split.relative_time = RaceTime::ZERO;
            split.is_correct = false;
        }

        for (position, control) in self.course.controls.iter().enumerate() {
            let ControlCode::TrailO { number, answer } = control.code else {
                continue;
            };

            let found = splits
                .iter_mut()
                .find(|s| s.trailo_parts().is_some_and(|(n, _)| n == number));

            match found {
                Some(split) => {
                    split.course_index = Some(position);
                    if answer == TRAILO_TIMED_ANSWER {
                        // The punch time of a timed control is the time taken there
                        split.leg_time = split.time;
                        split.relative_time = split.time;
                        split.is_correct = true;
                    } else {
                        split.is_correct = split.trailo_parts() == Some((number, answer));
                    }
                }
                None => {
                    let code = if answer == TRAILO_TIMED_ANSWER {
                        control.code.to_string()
                    } else {
                        format!("{number}{TRAILO_MISSING_ANSWER}")
                    };
                    let mut missing = Split::new(code, RaceTime::ZERO);
                    missing.course_index = Some(position);
                    splits.push(missing);
                }
            }
        }

        sort_trailo(splits);
        self.last_correct_index = self.course.controls.len().checked_sub(1);
    }
}

/// Clear everything a previous generation wrote for a leg
fn reset_leg(split: &mut Split) {
    split.course_index = None;
    split.leg_time = RaceTime::ZERO;
    split.leg_place = 0;
    split.relative_place = 0;
    split.leader_time = None;
    split.length_leg = 0;
    split.speed.clear();
}

fn sort_trailo(splits: &mut [Split]) {
    splits.sort_by_key(|s| (s.trailo_parts().map_or(u32::MAX, |(n, _)| n), s.time));
}
