use std::collections::HashMap;

use tracing::debug;

use crate::core::control::{ControlCode, TRAILO_TIMED_ANSWER};
use crate::core::course::Group;
use crate::core::result::RaceResult;
use crate::core::time::RaceTime;
use crate::core::types::ProcessingMode;
use crate::race::store::RaceContext;
use crate::splits::person::PersonSplits;
use crate::splits::placing::{shared_places, RankKey};

/// Fastest competitor on a leg
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegLeader {
    pub name: String,
    pub time: Option<RaceTime>,
}

/// Leg places and leaders for all results of one group.
///
/// Everything is recomputed on each [`GroupSplits::generate`] call.
pub struct GroupSplits<'a> {
    context: &'a RaceContext,
    pub group: &'a Group,
    pub cp_count: usize,
    pub person_splits: Vec<PersonSplits<'a>>,
    leaders: HashMap<usize, LegLeader>,
}

impl<'a> GroupSplits<'a> {
    pub fn new(context: &'a RaceContext, group: &'a Group) -> Self {
        let cp_count = context.group_course(group).map_or(0, |c| c.controls.len());
        Self {
            context,
            group,
            cp_count,
            person_splits: Vec::new(),
            leaders: HashMap::new(),
        }
    }

    /// Generate splits for the group members found in `results`, then place
    /// every leg and order the results.
    #[must_use]
    pub fn generate<I>(mut self, results: I) -> Self
    where
        I: IntoIterator<Item = &'a mut RaceResult>,
    {
        debug!("Group splits generate for {}", self.group.name);

        let context = self.context;
        let group = self.group;
        let mode = context.settings.result_processing_mode;

        self.person_splits = results
            .into_iter()
            .filter(|r| context.group_of(r).is_some_and(|g| g.name == group.name))
            .map(|r| PersonSplits::new(context, r).generate(mode))
            .collect();
        self.leaders.clear();

        self.set_places();
        self.sort_results();
        self
    }

    #[must_use]
    pub fn leg_leader(&self, index: usize) -> Option<&LegLeader> {
        self.leaders.get(&index)
    }

    fn set_places(&mut self) {
        for index in 0..self.cp_count {
            if !self.is_timed_leg(index) {
                continue;
            }
            self.sort_by_leg(index, false);
            self.set_places_for_leg(index, false);
            self.set_leg_leader(index);

            self.sort_by_leg(index, true);
            self.set_places_for_leg(index, true);
        }
    }

    /// Trail-O answers carry no time; only timed controls are placed there
    fn is_timed_leg(&self, index: usize) -> bool {
        if self.context.settings.result_processing_mode != ProcessingMode::Trailo {
            return true;
        }
        self.context
            .group_course(self.group)
            .and_then(|course| course.controls.get(index))
            .is_some_and(|control| {
                matches!(control.code, ControlCode::TrailO { answer, .. } if answer == TRAILO_TIMED_ANSWER)
            })
    }

    /// Fastest first; persons lacking the leg go last
    fn sort_by_leg(&mut self, index: usize, relative: bool) {
        self.person_splits.sort_by_key(|ps| {
            let time = leg_time(ps, index, relative);
            (time.is_none(), time)
        });
    }

    fn set_places_for_leg(&mut self, index: usize, relative: bool) {
        let Some(first) = self.person_splits.first() else {
            return;
        };
        let leader_time = leg_time(first, index, relative);

        // Persons with the leg form a prefix after sorting
        let times: Vec<RaceTime> = self
            .person_splits
            .iter()
            .map_while(|ps| leg_time(ps, index, relative))
            .collect();
        let places = shared_places(&times);

        for (ps, place) in self.person_splits.iter_mut().zip(places) {
            let Some(leg) = ps.get_leg_by_course_index_mut(index) else {
                continue;
            };
            if relative {
                leg.relative_place = place;
            } else {
                leg.leg_place = place;
                leg.leader_time = leader_time;
            }
        }
    }

    fn set_leg_leader(&mut self, index: usize) {
        if let Some(leader) = self.person_splits.first() {
            let name = leader.person.map(|p| p.name.clone()).unwrap_or_default();
            self.leaders.insert(
                index,
                LegLeader {
                    name,
                    time: leader.get_leg_time(index),
                },
            );
        }
    }

    fn sort_results(&mut self) {
        if self.group.is_relay {
            self.person_splits
                .sort_by_key(|ps| (ps.result.place.is_none(), ps.result.place, ps.relay_leg));
        } else {
            let context = self.context;
            let mode = context.settings.result_processing_mode;
            self.person_splits.sort_by_cached_key(|ps| {
                (
                    ps.result.status.sort_priority(),
                    RankKey::of(context, ps.result, mode),
                )
            });
        }
    }
}

fn leg_time(ps: &PersonSplits<'_>, index: usize, relative: bool) -> Option<RaceTime> {
    if relative {
        ps.get_leg_relative_time(index)
    } else {
        ps.get_leg_time(index)
    }
}

/// Split generation over a whole race
pub struct RaceSplits;

impl RaceSplits {
    /// Generate splits for one named group, or for every group when `None`.
    /// Returns the number of groups processed.
    pub fn generate(context: &RaceContext, results: &mut [RaceResult], group: Option<&str>) -> usize {
        let mut count = 0;
        for g in context
            .groups
            .iter()
            .filter(|g| group.map_or(true, |name| g.name == name))
        {
            let splits = GroupSplits::new(context, g).generate(results.iter_mut());
            debug!(
                group = %g.name,
                results = splits.person_splits.len(),
                "Splits generated"
            );
            count += 1;
        }
        count
    }
}
