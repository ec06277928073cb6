use rayon::prelude::*;
use thiserror::Error;
use tracing::debug;

use crate::checking::penalty::{
    credit_calculation, detach_penalty_laps, penalty_calculation, penalty_calculation_free_order,
    penalty_calculation_trailo,
};
use crate::checking::score::{
    calculate_rogaine_penalty, calculate_rogaine_score, calculate_scores_ardf,
    calculate_scores_trailo, calculate_time_trailo,
};
use crate::core::course::{Course, Group, Person};
use crate::core::result::RaceResult;
use crate::core::time::RaceTime;
use crate::core::types::{MarkedRouteMode, ProcessingMode, ResultStatus};
use crate::race::store::{CourseResolver, RaceContext};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CheckError {
    #[error("Result has no linked person")]
    NoPerson,
}

/// Checks results against their courses and derives status, penalties and
/// scores.
///
/// Checking mutates the result in place and returns the resulting status.
pub struct ResultChecker<'a> {
    context: &'a RaceContext,
}

impl<'a> ResultChecker<'a> {
    pub fn new(context: &'a RaceContext) -> Self {
        Self { context }
    }

    /// Check one result.
    ///
    /// A result already carrying a finalized status is left untouched; use
    /// [`ResultChecker::recheck`] to force a new check.
    ///
    /// # Errors
    ///
    /// Returns `CheckError::NoPerson` if the result is not linked to a
    /// person. The result is not modified in that case.
    pub fn checking(&self, result: &mut RaceResult) -> Result<ResultStatus, CheckError> {
        let person = self.context.person_of(result).ok_or(CheckError::NoPerson)?;

        if result.status.is_finalized() {
            return Ok(result.status);
        }

        result.status = ResultStatus::Ok;
        result.penalty_time = RaceTime::ZERO;
        result.penalty_laps = 0;
        self.calculate_credit_time(result);

        let passed = self.check_result(result, person);
        self.calculate_penalty(result);

        self.validate_result_status(result, person, passed);
        result.status_comment = result.status.default_comment().to_string();

        debug!(
            person = %person.id,
            status = %result.status,
            penalty_time = %result.penalty_time,
            penalty_laps = result.penalty_laps,
            "Result checked"
        );

        Ok(result.status)
    }

    /// Reset the status and check again
    ///
    /// # Errors
    ///
    /// Returns `CheckError::NoPerson` if the result is not linked to a person.
    pub fn recheck(&self, result: &mut RaceResult) -> Result<ResultStatus, CheckError> {
        if result.person.is_none() {
            return Err(CheckError::NoPerson);
        }
        result.status = ResultStatus::None;
        self.checking(result)
    }

    /// Check every result that has a person; results are independent and are
    /// checked in parallel. Returns the number of results checked.
    pub fn check_all(&self, results: &mut [RaceResult]) -> usize {
        results
            .par_iter_mut()
            .filter(|r| r.person.is_some())
            .filter_map(|r| self.checking(r).ok())
            .count()
    }

    /// Run the mode-specific checks; false means the punches failed the course
    fn check_result(&self, result: &mut RaceResult, person: &Person) -> bool {
        let Some(group) = self.group_of(person) else {
            return true;
        };

        match self.context.settings.result_processing_mode {
            ProcessingMode::Time => self.process_standard_mode(result, group),
            ProcessingMode::Scores => {
                self.process_scores_mode(result, person, group);
                true
            }
            ProcessingMode::Ardf => {
                self.process_ardf_mode(result);
                true
            }
            ProcessingMode::Trailo => {
                self.process_trailo_mode(result, person, group);
                true
            }
        }
    }

    fn process_standard_mode(&self, result: &mut RaceResult, group: &Group) -> bool {
        let course = self.context.find_course(result);

        if self.context.settings.marked_route_dont_dsq {
            // Punches only feed the penalty count
            if let Some(course) = course {
                result.check(course);
            }
            return true;
        }

        if group.is_any_course {
            // Flags only; an any-course group passes whatever was punched
            if let Some(course) = course.or_else(|| self.context.group_course(group)) {
                result.check(course);
            }
            return true;
        }

        match course {
            Some(course) => result.check(course),
            // A group without a course accepts any punches, a missing one fails
            None => group.course.is_none(),
        }
    }

    fn process_scores_mode(&self, result: &mut RaceResult, person: &Person, group: &Group) {
        let settings = &self.context.settings;

        let score = calculate_rogaine_score(
            &result.splits,
            self.context,
            settings.result_processing_scores_allow_duplicates,
        );
        let penalty = calculate_rogaine_penalty(
            result.get_result_time(Some(person)),
            group.max_time,
            score,
            settings.result_processing_scores_minute_penalty,
        );

        result.rogaine_score = score - penalty;
        result.rogaine_penalty = penalty;
    }

    fn process_ardf_mode(&self, result: &mut RaceResult) {
        result.scores_ardf = self
            .context
            .find_course(result)
            .map_or(0, |course| calculate_scores_ardf(&result.splits, &course.controls));
    }

    fn process_trailo_mode(&self, result: &mut RaceResult, person: &Person, group: &Group) {
        let course = self.context.find_course(result);

        let score = course.map_or(0, |c| calculate_scores_trailo(&result.splits, &c.controls));
        let penalty =
            calculate_rogaine_penalty(result.get_result_time(Some(person)), group.max_time, score, 1);
        let time = course.map_or(RaceTime::ZERO, |c| {
            calculate_time_trailo(&result.splits, &c.controls)
        });

        result.trailo_score_penalty = penalty;
        result.trailo_score = score - penalty;
        result.trailo_time = time;
    }

    fn validate_result_status(&self, result: &mut RaceResult, person: &Person, passed: bool) {
        if !passed {
            result.status = ResultStatus::MissingPunch;
        } else if !self.check_penalty_laps(result) {
            result.status = ResultStatus::MissPenaltyLap;
        } else {
            self.check_overtime(result, person);
        }
    }

    fn check_overtime(&self, result: &mut RaceResult, person: &Person) {
        let Some(group) = self.group_of(person) else {
            return;
        };
        let max_time = group.max_time;
        if max_time.is_zero() {
            return;
        }

        let result_time = result.get_result_time(Some(person));
        let settings = &self.context.settings;

        match settings.result_processing_mode {
            ProcessingMode::Time => {
                if result_time > max_time {
                    result.status = ResultStatus::Overtime;
                }
            }
            ProcessingMode::Ardf => {
                if result_time > max_time {
                    result.status = ResultStatus::Overtime;
                    result.scores_ardf = 0;
                }
            }
            ProcessingMode::Scores => {
                let grace = settings.result_processing_scores_max_overrun_time;
                if grace > RaceTime::ZERO && result_time > max_time + grace {
                    result.status = ResultStatus::Overtime;
                }
            }
            ProcessingMode::Trailo => {}
        }
    }

    /// Marked-route penalty time or laps
    fn calculate_penalty(&self, result: &mut RaceResult) {
        let settings = &self.context.settings;
        if settings.marked_route_mode == MarkedRouteMode::Off {
            return;
        }
        let Some(group) = self.context.group_of(result) else {
            return;
        };
        let Some(course) = self.context.find_course(result) else {
            return;
        };

        match settings.result_processing_mode {
            ProcessingMode::Trailo => {
                result.penalty_time = penalty_calculation_trailo(
                    &result.splits,
                    &course.controls,
                    settings.marked_route_penalty_time,
                );
            }
            ProcessingMode::Time | ProcessingMode::Scores | ProcessingMode::Ardf => {
                self.calculate_standard_penalty(result, group, course);
            }
        }
    }

    fn calculate_standard_penalty(&self, result: &mut RaceResult, group: &Group, course: &Course) {
        let settings = &self.context.settings;

        // Group names can force the penalty kind
        let name = group.name.to_lowercase();
        let mut mode = settings.marked_route_mode;
        if name.contains("_min") {
            mode = MarkedRouteMode::Time;
        }
        if name.contains("_lap") {
            mode = MarkedRouteMode::Laps;
        }

        let regular = if mode == MarkedRouteMode::Laps && settings.marked_route_if_station_check {
            detach_penalty_laps(&result.splits, settings.marked_route_penalty_lap_station_code).0
        } else {
            result.splits.clone()
        };

        let mut penalty = if settings.marked_route_dont_dsq {
            penalty_calculation_free_order(&regular, &course.controls)
        } else {
            penalty_calculation(&regular, &course.controls, true)
        };

        if settings.marked_route_max_penalty_by_cp {
            penalty = penalty.min(course.controls.len());
        }

        result.penalty_laps = 0;
        result.penalty_time = RaceTime::ZERO;

        match mode {
            MarkedRouteMode::Laps => {
                result.penalty_laps = u32::try_from(penalty).unwrap_or(u32::MAX);
            }
            MarkedRouteMode::Time => {
                result.penalty_time =
                    settings.marked_route_penalty_time * i64::try_from(penalty).unwrap_or(i64::MAX);
            }
            MarkedRouteMode::Off => {}
        }
    }

    fn calculate_credit_time(&self, result: &mut RaceResult) {
        let settings = &self.context.settings;
        result.credit_time = if settings.credit_time_enabled {
            credit_calculation(&result.splits, settings.credit_time_cp)
        } else {
            RaceTime::ZERO
        };
    }

    /// Were all charged penalty laps run at the lap station?
    fn check_penalty_laps(&self, result: &RaceResult) -> bool {
        let settings = &self.context.settings;
        if settings.marked_route_mode != MarkedRouteMode::Laps || !settings.marked_route_if_station_check {
            return true;
        }

        let (_, laps) =
            detach_penalty_laps(&result.splits, settings.marked_route_penalty_lap_station_code);
        laps.len() >= result.penalty_laps as usize
    }

    fn group_of(&self, person: &Person) -> Option<&'a Group> {
        person.group.as_deref().and_then(|name| self.context.group(name))
    }
}
