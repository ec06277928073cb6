//! Engine behaviour through the public library API.
//!
//! Each test builds a small race the way a race file would describe it and
//! checks one rule of result computation end to end.

use orient_results::checking::penalty::{penalty_calculation, penalty_calculation_free_order};
use orient_results::checking::score::{calculate_rogaine_penalty, calculate_scores_ardf};
use orient_results::splits::{placing, GroupSplits};
use orient_results::{
    Course, Race, RaceResult, RaceSplits, RaceTime, ResultChecker, ResultStatus, Split,
};

fn splits_of(codes: &[&str]) -> Vec<Split> {
    (1..)
        .zip(codes)
        .map(|(minute, code)| Split::new(*code, RaceTime::from_sec(minute * 60)))
        .collect()
}

fn race(json: &str) -> Race {
    Race::from_json(json).expect("valid race json")
}

#[test]
fn test_checking_is_idempotent() {
    let mut race = race(
        r#"{
        "settings": {"marked_route_mode": "time"},
        "courses": [{"name": "A", "controls": [{"code": 31}, {"code": 41}, {"code": 51}]}],
        "groups": [{"name": "M21", "course": "A", "max_time": "00:45:00"}],
        "persons": [{"id": 1, "name": "Anna", "group": "M21"}],
        "results": [
            {"person": 1, "start_time": "10:00:00", "finish_time": "10:40:00",
             "splits": [{"code": "31", "time": "10:05:00"}, {"code": "42", "time": "10:10:00"},
                        {"code": "41", "time": "10:15:00"}, {"code": "51", "time": "10:20:00"}]}
        ]
    }"#,
    );

    let checker = ResultChecker::new(&race.context);
    let first = checker.recheck(&mut race.results[0]).unwrap();
    let snapshot = race.results[0].clone();
    let second = checker.recheck(&mut race.results[0]).unwrap();

    assert_eq!(first, second);
    assert_eq!(race.results[0], snapshot);
    assert_eq!(race.results[0].penalty_time, RaceTime::from_sec(60));

    // A plain second check keeps the finalized result as it is
    assert_eq!(checker.checking(&mut race.results[0]), Ok(first));
    assert_eq!(race.results[0], snapshot);
}

/// Recheck every result twice and require the second pass to change nothing
fn recheck_twice(race: &mut Race) -> Vec<RaceResult> {
    let checker = ResultChecker::new(&race.context);
    for result in &mut race.results {
        checker.recheck(result).unwrap();
    }
    let first = race.results.clone();
    for result in &mut race.results {
        checker.recheck(result).unwrap();
    }
    assert_eq!(race.results, first);
    first
}

#[test]
fn test_scores_recheck_is_stable() {
    let mut race = race(
        r#"{
        "settings": {"result_processing_mode": "scores", "credit_time_enabled": true, "credit_time_cp": 250},
        "groups": [{"name": "Open", "max_time": "01:00:00"}],
        "persons": [
            {"id": 1, "name": "Anna", "group": "Open"},
            {"id": 2, "name": "Boris", "group": "Open"}
        ],
        "results": [
            {"person": 1, "start_time": "10:00:00", "finish_time": "11:02:00",
             "splits": [{"code": "31", "time": "10:10:00"}, {"code": "250", "time": "10:15:00"},
                        {"code": "32", "time": "10:20:00"}, {"code": "33", "time": "10:30:00"}]},
            {"person": 2, "start_time": "10:00:00", "finish_time": "11:01:30",
             "splits": [{"code": "31", "time": "10:10:00"}, {"code": "32", "time": "10:20:00"},
                        {"code": "33", "time": "10:30:00"}]}
        ]
    }"#,
    );

    let results = recheck_twice(&mut race);

    assert_eq!(results[0].status, ResultStatus::Ok);
    assert_eq!(results[0].credit_time, RaceTime::from_sec(300));
    assert_eq!((results[0].rogaine_score, results[0].rogaine_penalty), (4, 0));

    assert_eq!(results[1].status, ResultStatus::Ok);
    assert_eq!((results[1].rogaine_score, results[1].rogaine_penalty), (1, 2));
}

#[test]
fn test_ardf_recheck_is_stable() {
    let mut race = race(
        r#"{
        "settings": {"result_processing_mode": "ardf"},
        "courses": [{"name": "A", "controls": [{"code": 10}, {"code": "20?(20,120)"}, {"code": 30}]}],
        "groups": [{"name": "M21", "course": "A", "max_time": "01:00:00"}],
        "persons": [
            {"id": 1, "name": "Anna", "group": "M21"},
            {"id": 2, "name": "Boris", "group": "M21"}
        ],
        "results": [
            {"person": 1, "start_time": "10:00:00", "finish_time": "10:50:00",
             "splits": [{"code": "10", "time": "10:10:00"}, {"code": "120", "time": "10:20:00"},
                        {"code": "30", "time": "10:30:00"}]},
            {"person": 2, "start_time": "10:00:00", "finish_time": "11:10:00",
             "splits": [{"code": "10", "time": "10:10:00"}, {"code": "30", "time": "10:30:00"}]}
        ]
    }"#,
    );

    let results = recheck_twice(&mut race);

    assert_eq!(results[0].status, ResultStatus::Ok);
    assert_eq!(results[0].scores_ardf, 3);
    assert_eq!(results[1].status, ResultStatus::Overtime);
    assert_eq!(results[1].scores_ardf, 0);
}

#[test]
fn test_trailo_recheck_is_stable() {
    let mut race = race(
        r#"{
        "settings": {"result_processing_mode": "trailo", "marked_route_mode": "time"},
        "courses": [{"name": "T", "controls": [{"code": "31A"}, {"code": "32B"}, {"code": "101C"}, {"code": "102T"}]}],
        "groups": [{"name": "Open", "course": "T", "max_time": "00:30:00"}],
        "persons": [{"id": 1, "name": "Anna", "group": "Open"}],
        "results": [
            {"person": 1, "start_time": "10:00:00", "finish_time": "10:29:30",
             "splits": [{"code": "31A", "time": "10:05:00"}, {"code": "32A", "time": "10:10:00"},
                        {"code": "101B", "time": "10:15:00"}, {"code": "102T", "time": 42000}]}
        ]
    }"#,
    );

    let results = recheck_twice(&mut race);

    // The wrong timed answer costs a minute but must not feed the late penalty
    assert_eq!(results[0].status, ResultStatus::Ok);
    assert_eq!(results[0].penalty_time, RaceTime::from_sec(60));
    assert_eq!((results[0].trailo_score, results[0].trailo_score_penalty), (1, 0));
    assert_eq!(results[0].trailo_time, RaceTime::from_sec(42));
}

#[test]
fn test_any_course_group_always_passes() {
    let mut race = race(
        r#"{
        "courses": [{"name": "A", "controls": [{"code": 31}, {"code": 41}]}],
        "groups": [{"name": "Open", "course": "A", "is_any_course": true}],
        "persons": [{"id": 1, "name": "Anna", "group": "Open"}],
        "results": [
            {"person": 1, "start_time": "10:00:00", "finish_time": "10:30:00",
             "splits": [{"code": "99", "time": "10:10:00"}]}
        ]
    }"#,
    );

    ResultChecker::new(&race.context).check_all(&mut race.results);
    assert_eq!(race.results[0].status, ResultStatus::Ok);
}

#[test]
fn test_classic_penalty() {
    let course = Course::from_codes("A", &["31", "41", "51"]);
    let cases: [(&[&str], usize); 5] = [
        (&["31", "41", "51"], 0),
        (&["31", "42", "51"], 1),
        (&["31", "41", "51", "51"], 1),
        (&["41", "31", "51"], 0),
        (&["51", "61", "71", "81", "91", "32", "42"], 6),
    ];
    for (athlete, expected) in cases {
        assert_eq!(
            penalty_calculation(&splits_of(athlete), &course.controls, false),
            expected,
            "athlete {athlete:?}"
        );
    }

    assert_eq!(penalty_calculation(&[], &course.controls, true), 3);
}

#[test]
fn test_free_order_penalty() {
    let course = Course::from_codes("A", &["*", "*", "*"]);
    let mut result = RaceResult {
        splits: splits_of(&["31", "31", "31", "31"]),
        ..RaceResult::default()
    };

    assert!(!result.check(&course));
    assert_eq!(penalty_calculation_free_order(&result.splits, &course.controls), 2);
}

#[test]
fn test_rogaine_penalty() {
    let limit = RaceTime::from_hms(0, 60, 0);
    let finish = RaceTime::from_hms(0, 61, 30);

    assert_eq!(calculate_rogaine_penalty(finish, limit, 10, 1), 2);
    assert_eq!(calculate_rogaine_penalty(finish, limit, 1, 1), 1);
    assert_eq!(calculate_rogaine_penalty(finish, RaceTime::ZERO, 10, 1), 0);
}

#[test]
fn test_ardf_score_with_optional_control() {
    let course = Course::from_codes("A", &["10", "20?(20,120)", "30"]);

    assert_eq!(calculate_scores_ardf(&splits_of(&["10", "120", "30"]), &course.controls), 3);
    assert_eq!(calculate_scores_ardf(&splits_of(&["10", "30"]), &course.controls), 2);
}

#[test]
fn test_unlimited_time_never_overtime() {
    let mut race = race(
        r#"{
        "courses": [{"name": "A", "controls": [{"code": 31}]}],
        "groups": [{"name": "M21", "course": "A", "max_time": "00:00:00"}],
        "persons": [{"id": 1, "name": "Anna", "group": "M21"}],
        "results": [
            {"person": 1, "start_time": "08:00:00", "finish_time": "20:00:00",
             "splits": [{"code": "31", "time": "12:00:00"}]}
        ]
    }"#,
    );

    let checked = ResultChecker::new(&race.context).check_all(&mut race.results);
    assert_eq!(checked, 1);
    assert_eq!(race.results[0].status, ResultStatus::Ok);
}

#[test]
fn test_tied_leg_times_share_place() {
    let mut race = race(
        r#"{
        "courses": [{"name": "A", "controls": [{"code": 31}, {"code": 41}]}],
        "groups": [{"name": "M21", "course": "A"}],
        "persons": [
            {"id": 1, "name": "Anna", "group": "M21"},
            {"id": 2, "name": "Boris", "group": "M21"},
            {"id": 3, "name": "Carla", "group": "M21"}
        ],
        "results": [
            {"person": 1, "start_time": "10:00:00", "finish_time": "10:30:00",
             "splits": [{"code": "31", "time": "10:05:00"}, {"code": "41", "time": "10:20:00"}]},
            {"person": 2, "start_time": "10:00:00", "finish_time": "10:30:00",
             "splits": [{"code": "31", "time": "10:05:00"}, {"code": "41", "time": "10:20:00"}]},
            {"person": 3, "start_time": "10:00:00", "finish_time": "10:35:00",
             "splits": [{"code": "31", "time": "10:06:00"}, {"code": "41", "time": "10:21:00"}]}
        ]
    }"#,
    );

    ResultChecker::new(&race.context).check_all(&mut race.results);
    placing::set_places(&race.context, &mut race.results);
    assert_eq!(RaceSplits::generate(&race.context, &mut race.results, None), 1);

    let leg_places: Vec<usize> = race.results.iter().map(|r| r.splits[0].leg_place).collect();
    assert_eq!(leg_places, vec![1, 1, 3]);

    let places: Vec<Option<usize>> = race.results.iter().map(|r| r.place).collect();
    assert_eq!(places, vec![Some(1), Some(1), Some(3)]);
}

#[test]
fn test_relay_results_ordered_by_place_then_leg() {
    let mut race = race(
        r#"{
        "courses": [{"name": "A", "controls": [{"code": 31}]}],
        "groups": [{"name": "Relay", "course": "A", "is_relay": true}],
        "persons": [
            {"id": 1, "name": "T1 leg 2", "bib": 2001, "group": "Relay"},
            {"id": 2, "name": "T2 leg 1", "bib": 1002, "group": "Relay"},
            {"id": 3, "name": "T1 leg 1", "bib": 1001, "group": "Relay"},
            {"id": 4, "name": "T2 leg 2", "bib": 2002, "group": "Relay"}
        ],
        "results": [
            {"person": 1, "start_time": "10:20:00", "finish_time": "10:40:00",
             "splits": [{"code": "31", "time": "10:30:00"}]},
            {"person": 2, "start_time": "10:00:00", "finish_time": "10:25:00",
             "splits": [{"code": "31", "time": "10:10:00"}]},
            {"person": 3, "start_time": "10:00:00", "finish_time": "10:20:00",
             "splits": [{"code": "31", "time": "10:10:00"}]},
            {"person": 4, "start_time": "10:25:00", "finish_time": "10:50:00",
             "splits": [{"code": "31", "time": "10:35:00"}]}
        ]
    }"#,
    );

    ResultChecker::new(&race.context).check_all(&mut race.results);
    placing::set_places(&race.context, &mut race.results);

    let context = &race.context;
    let group = context.group("Relay").unwrap();
    let splits = GroupSplits::new(context, group).generate(race.results.iter_mut());

    let order: Vec<&str> = splits
        .person_splits
        .iter()
        .map(|ps| ps.person.unwrap().name.as_str())
        .collect();
    assert_eq!(order, vec!["T1 leg 1", "T1 leg 2", "T2 leg 1", "T2 leg 2"]);

    let places: Vec<Option<usize>> = splits.person_splits.iter().map(|ps| ps.result.place).collect();
    assert_eq!(places, vec![Some(1), Some(1), Some(2), Some(2)]);
}

#[test]
fn test_missing_person_leaves_result_untouched() {
    let race = race(r#"{"courses": [{"name": "A", "controls": [{"code": 31}]}]}"#);
    let mut result = RaceResult::default().with_punch("31", RaceTime::from_sec(60));
    let before = result.clone();

    assert!(ResultChecker::new(&race.context).checking(&mut result).is_err());
    assert_eq!(result, before);
}
