//! Final places within a group.

use std::collections::BTreeMap;

use tracing::debug;

use crate::core::course::Group;
use crate::core::result::RaceResult;
use crate::core::time::RaceTime;
use crate::core::types::ProcessingMode;
use crate::race::store::RaceContext;

/// Ordering key of a result within its group; lower ranks first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RankKey {
    score: i64,
    time: RaceTime,
}

impl RankKey {
    /// Higher scores rank first, then shorter times
    #[must_use]
    pub fn new(score: i64, time: RaceTime) -> Self {
        Self {
            score: -score,
            time,
        }
    }

    /// Key for a result under the given processing mode
    #[must_use]
    pub fn of(context: &RaceContext, result: &RaceResult, mode: ProcessingMode) -> Self {
        let time = result.get_result_time(context.person_of(result));
        match mode {
            ProcessingMode::Time => Self::new(0, time),
            ProcessingMode::Scores => Self::new(result.rogaine_score, time),
            ProcessingMode::Ardf => Self::new(result.scores_ardf, time),
            ProcessingMode::Trailo => Self::new(result.trailo_score, result.trailo_time),
        }
    }
}

/// Places for keys that are already sorted.
///
/// Equal neighbours share a place and the next distinct key continues from
/// its own position, so `[a, a, b]` gets `[1, 1, 3]`.
#[must_use]
pub fn shared_places<K: PartialEq>(sorted: &[K]) -> Vec<usize> {
    let mut places = Vec::with_capacity(sorted.len());
    let mut tied = 0;

    for (i, key) in sorted.iter().enumerate() {
        if i > 0 && sorted[i - 1] == *key {
            tied += 1;
        } else {
            tied = 0;
        }
        places.push(i + 1 - tied);
    }

    places
}

/// Assign `place` to every result of every group
pub fn set_places(context: &RaceContext, results: &mut [RaceResult]) {
    for group in &context.groups {
        set_group_places(context, group, results);
    }
}

/// Assign `place` to the results of one group.
///
/// Only OK results are placed; all others get no place.
pub fn set_group_places(context: &RaceContext, group: &Group, results: &mut [RaceResult]) {
    let members: Vec<usize> = results
        .iter()
        .enumerate()
        .filter(|(_, r)| context.group_of(r).is_some_and(|g| g.name == group.name))
        .map(|(i, _)| i)
        .collect();

    for &i in &members {
        results[i].place = None;
    }

    if group.is_relay {
        place_relay_teams(context, &members, results);
    } else {
        place_individuals(context, &members, results);
    }

    debug!(group = %group.name, results = members.len(), "Places assigned");
}

fn place_individuals(context: &RaceContext, members: &[usize], results: &mut [RaceResult]) {
    let mode = context.settings.result_processing_mode;

    let mut ranked: Vec<(RankKey, usize)> = members
        .iter()
        .filter(|&&i| results[i].status.is_ok())
        .map(|&i| (RankKey::of(context, &results[i], mode), i))
        .collect();
    ranked.sort();

    let keys: Vec<RankKey> = ranked.iter().map(|(key, _)| *key).collect();
    for (place, (_, i)) in shared_places(&keys).into_iter().zip(ranked) {
        results[i].place = Some(place);
    }
}

/// Teams are ranked by summed leg time; a team with any non-OK leg is not placed
fn place_relay_teams(context: &RaceContext, members: &[usize], results: &mut [RaceResult]) {
    let mut teams: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
    for &i in members {
        if let Some(person) = context.person_of(&results[i]) {
            teams.entry(person.relay_team()).or_default().push(i);
        }
    }

    let mut ranked: Vec<(RaceTime, u32)> = teams
        .iter()
        .filter(|(_, legs)| legs.iter().all(|&i| results[i].status.is_ok()))
        .map(|(&team, legs)| {
            let total = legs.iter().fold(RaceTime::ZERO, |acc, &i| {
                acc + results[i].get_result_time(context.person_of(&results[i]))
            });
            (total, team)
        })
        .collect();
    ranked.sort();

    let times: Vec<RaceTime> = ranked.iter().map(|(time, _)| *time).collect();
    for (place, (_, team)) in shared_places(&times).into_iter().zip(ranked) {
        for &i in &teams[&team] {
            results[i].place = Some(place);
        }
    }
}
