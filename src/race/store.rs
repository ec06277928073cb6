use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use tracing::warn;

use crate::core::control::ControlPoint;
use crate::core::course::{Course, Group, Person};
use crate::core::result::RaceResult;
use crate::core::types::PersonId;
use crate::race::settings::RaceSettings;

#[derive(Error, Debug)]
pub enum RaceError {
    #[error("Failed to read race file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse race file: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Race file version for compatibility checking
pub const RACE_FORMAT_VERSION: &str = "1.0.0";

/// Serializable race file format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaceData {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked_at: Option<String>,
    #[serde(default)]
    pub settings: RaceSettings,
    #[serde(default)]
    pub controls: Vec<ControlPoint>,
    #[serde(default)]
    pub courses: Vec<Course>,
    #[serde(default)]
    pub groups: Vec<Group>,
    #[serde(default)]
    pub persons: Vec<Person>,
    #[serde(default)]
    pub results: Vec<RaceResult>,
}

fn default_version() -> String {
    RACE_FORMAT_VERSION.to_string()
}

/// Resolves which course a result has to be checked against
pub trait CourseResolver {
    fn find_course(&self, result: &RaceResult) -> Option<&Course>;
}

/// Read-only event setup passed into every engine call
#[derive(Debug, Default)]
pub struct RaceContext {
    pub settings: RaceSettings,

    /// Scored control points (rogaine)
    pub controls: Vec<ControlPoint>,

    pub courses: Vec<Course>,
    pub groups: Vec<Group>,
    pub persons: Vec<Person>,

    /// Index: course name -> index in courses vec
    course_index: HashMap<String, usize>,

    /// Index: group name -> index in groups vec
    group_index: HashMap<String, usize>,

    /// Index: person id -> index in persons vec
    person_index: HashMap<PersonId, usize>,

    /// Index: card number -> person id
    card_index: HashMap<u32, PersonId>,
}

impl RaceContext {
    pub fn new(settings: RaceSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn add_course(&mut self, course: Course) {
        self.course_index
            .insert(course.name.clone(), self.courses.len());
        self.courses.push(course);
    }

    pub fn add_group(&mut self, group: Group) {
        self.group_index.insert(group.name.clone(), self.groups.len());
        self.groups.push(group);
    }

    pub fn add_person(&mut self, person: Person) {
        self.person_index.insert(person.id, self.persons.len());
        if let Some(card) = person.card_number {
            self.card_index.insert(card, person.id);
        }
        self.persons.push(person);
    }

    pub fn course(&self, name: &str) -> Option<&Course> {
        self.course_index.get(name).map(|&idx| &self.courses[idx])
    }

    pub fn group(&self, name: &str) -> Option<&Group> {
        self.group_index.get(name).map(|&idx| &self.groups[idx])
    }

    pub fn person(&self, id: PersonId) -> Option<&Person> {
        self.person_index.get(&id).map(|&idx| &self.persons[idx])
    }

    pub fn person_by_card(&self, card_number: u32) -> Option<&Person> {
        self.card_index
            .get(&card_number)
            .and_then(|id| self.person(*id))
    }

    /// Person linked to a result
    pub fn person_of(&self, result: &RaceResult) -> Option<&Person> {
        result.person.and_then(|id| self.person(id))
    }

    /// Group of the person linked to a result
    pub fn group_of(&self, result: &RaceResult) -> Option<&Group> {
        self.person_of(result)
            .and_then(|p| p.group.as_deref())
            .and_then(|name| self.group(name))
    }

    /// Course assigned to a group
    pub fn group_course(&self, group: &Group) -> Option<&Course> {
        group.course.as_deref().and_then(|name| self.course(name))
    }

    /// Score registered for a control code
    pub fn control_score(&self, code: &str) -> Option<i64> {
        self.controls
            .iter()
            .find(|c| c.code == code)
            .and_then(|c| c.score)
    }
}

impl CourseResolver for RaceContext {
    fn find_course(&self, result: &RaceResult) -> Option<&Course> {
        let person = self.person_of(result)?;
        let group = self.group_of(result)?;

        if group.is_relay {
            // Relay variants are courses named after the bib
            if let Some(course) = self.course(&person.bib.to_string()) {
                return Some(course);
            }
        }

        if group.is_any_course {
            return self.courses.iter().find(|course| {
                let mut trial = result.clone();
                trial.check(course)
            });
        }

        self.group_course(group)
    }
}

/// A race: its setup plus all results
#[derive(Debug, Default)]
pub struct Race {
    pub context: RaceContext,
    pub results: Vec<RaceResult>,
}

impl Race {
    pub fn new(context: RaceContext) -> Self {
        Self {
            context,
            results: Vec::new(),
        }
    }

    /// Load a race from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self, RaceError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse a race from a JSON string
    pub fn from_json(json: &str) -> Result<Self, RaceError> {
        let data: RaceData = serde_json::from_str(json)?;

        // Version check (warn but don't fail)
        if data.version != RACE_FORMAT_VERSION {
            warn!(
                "Race file version mismatch (expected {}, found {})",
                RACE_FORMAT_VERSION, data.version
            );
        }

        let mut context = RaceContext::new(data.settings);
        context.controls = data.controls;
        for course in data.courses {
            context.add_course(course);
        }
        for group in data.groups {
            context.add_group(group);
        }
        for person in data.persons {
            context.add_person(person);
        }

        let mut race = Self::new(context);
        race.results = data.results;
        race.bind_results();
        Ok(race)
    }

    /// Export race to JSON
    pub fn to_json(&self) -> Result<String, RaceError> {
        let data = RaceData {
            version: RACE_FORMAT_VERSION.to_string(),
            checked_at: Some(chrono::Utc::now().to_rfc3339()),
            settings: self.context.settings.clone(),
            controls: self.context.controls.clone(),
            courses: self.context.courses.clone(),
            groups: self.context.groups.clone(),
            persons: self.context.persons.clone(),
            results: self.results.clone(),
        };
        Ok(serde_json::to_string_pretty(&data)?)
    }

    /// Add a result, linking it to a person by card number when unassigned
    pub fn add_result(&mut self, mut result: RaceResult) {
        self.bind_result(&mut result);
        self.results.push(result);
    }

    fn bind_results(&mut self) {
        let mut results = std::mem::take(&mut self.results);
        for result in &mut results {
            self.bind_result(result);
        }
        self.results = results;
    }

    fn bind_result(&self, result: &mut RaceResult) {
        if result.person.is_some() {
            return;
        }
        let Some(card) = result.card_number else {
            return;
        };
        match self.context.person_by_card(card) {
            Some(person) => result.person = Some(person.id),
            None => warn!("No person registered for card {card}"),
        }
    }

    /// Results whose person belongs to the group
    pub fn group_results<'a>(&'a self, group: &'a str) -> impl Iterator<Item = &'a RaceResult> + 'a {
        self.results.iter().filter(move |r| {
            self.context
                .group_of(r)
                .is_some_and(|g| g.name == group)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::time::RaceTime;

    const RACE_JSON: &str = r#"{
        "settings": {"result_processing_mode": "time"},
        "courses": [
            {"name": "A", "controls": [{"code": 31}, {"code": "41"}, {"code": 51}]},
            {"name": "B", "controls": [{"code": 32}, {"code": 42}]}
        ],
        "groups": [
            {"name": "M21", "course": "A"},
            {"name": "Open", "course": "A", "is_any_course": true}
        ],
        "persons": [
            {"id": 1, "name": "Anna", "group": "M21", "card_number": 5001},
            {"id": 2, "name": "Boris", "group": "Open", "card_number": 5002}
        ],
        "results": [
            {"card_number": 5001, "start_time": "10:00:00", "finish_time": "10:30:00",
             "splits": [{"code": "31", "time": "10:05:00"}]}
        ]
    }"#;

    #[test]
    fn test_load_and_bind() {
        let race = Race::from_json(RACE_JSON).unwrap();
        assert_eq!(race.context.courses.len(), 2);
        assert_eq!(race.results[0].person, Some(PersonId(1)));
        assert_eq!(race.results[0].start_time, Some(RaceTime::from_hms(10, 0, 0)));
        assert_eq!(race.group_results("M21").count(), 1);
    }

    #[test]
    fn test_find_course_from_group() {
        let race = Race::from_json(RACE_JSON).unwrap();
        let course = race.context.find_course(&race.results[0]).unwrap();
        assert_eq!(course.name, "A");
    }

    #[test]
    fn test_find_course_any_course_by_punches() {
        let race = Race::from_json(RACE_JSON).unwrap();
        let result = RaceResult::new(Some(PersonId(2)))
            .with_punch("32", RaceTime::from_sec(60))
            .with_punch("42", RaceTime::from_sec(120));
        let course = race.context.find_course(&result).unwrap();
        assert_eq!(course.name, "B");

        let lost = RaceResult::new(Some(PersonId(2))).with_punch("99", RaceTime::from_sec(60));
        assert!(race.context.find_course(&lost).is_none());
    }

    #[test]
    fn test_find_course_relay_variant() {
        let mut context = RaceContext::default();
        context.add_course(Course::from_codes("Relay", &["31"]));
        context.add_course(Course::from_codes("2015", &["32"]));
        let mut group = Group::new("Relay", Some("Relay"));
        group.is_relay = true;
        context.add_group(group);
        let mut person = Person::new(7, "Carl", "Relay");
        person.bib = 2015;
        context.add_person(person);

        let result = RaceResult::new(Some(PersonId(7)));
        assert_eq!(context.find_course(&result).unwrap().name, "2015");
    }

    #[test]
    fn test_to_json_round_trip() {
        let race = Race::from_json(RACE_JSON).unwrap();
        let json = race.to_json().unwrap();
        assert!(json.contains("\"version\""));
        assert!(json.contains("\"checked_at\""));
        let again = Race::from_json(&json).unwrap();
        assert_eq!(again.results, race.results);
    }

    #[test]
    fn test_unknown_card_stays_unassigned() {
        let mut race = Race::from_json(RACE_JSON).unwrap();
        let mut result = RaceResult::new(None);
        result.card_number = Some(9999);
        race.add_result(result);
        assert!(race.results[1].person.is_none());
    }
}
