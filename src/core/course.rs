use serde::{Deserialize, Serialize};

use crate::core::control::Control;
use crate::core::time::RaceTime;
use crate::core::types::PersonId;

/// An ordered sequence of controls
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub name: String,

    #[serde(default)]
    pub controls: Vec<Control>,

    /// Total length in metres (0 = unknown)
    #[serde(default)]
    pub length: u32,
}

impl Course {
    pub fn new(name: impl Into<String>, controls: Vec<Control>) -> Self {
        Self {
            name: name.into(),
            controls,
            length: 0,
        }
    }

    /// Build a course from plain control expressions
    pub fn from_codes(name: impl Into<String>, codes: &[&str]) -> Self {
        Self::new(name, codes.iter().map(|c| Control::new(c)).collect())
    }

    #[must_use]
    pub fn with_length(mut self, length: u32) -> Self {
        self.length = length;
        self
    }

    /// A course with no controls accepts any punches
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        self.controls.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.controls.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }
}

/// A competition class
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub name: String,

    /// Name of the course the group runs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course: Option<String>,

    /// Time limit; zero means unlimited
    #[serde(default)]
    pub max_time: RaceTime,

    #[serde(default)]
    pub is_relay: bool,

    /// Competitors may run any course of the race
    #[serde(default)]
    pub is_any_course: bool,
}

impl Group {
    pub fn new(name: impl Into<String>, course: Option<&str>) -> Self {
        Self {
            name: name.into(),
            course: course.map(str::to_string),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_max_time(mut self, max_time: RaceTime) -> Self {
        self.max_time = max_time;
        self
    }
}

/// A registered competitor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,

    #[serde(default)]
    pub name: String,

    /// Bib number; in relays `leg * 1000 + team`
    #[serde(default)]
    pub bib: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_number: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<RaceTime>,
}

impl Person {
    pub fn new(id: u32, name: impl Into<String>, group: &str) -> Self {
        Self {
            id: PersonId(id),
            name: name.into(),
            bib: id,
            group: Some(group.to_string()),
            card_number: None,
            start_time: None,
        }
    }

    /// Relay leg number, derived from the bib
    #[must_use]
    pub fn relay_leg(&self) -> u32 {
        self.bib / 1000
    }

    /// Relay team number, derived from the bib
    #[must_use]
    pub fn relay_team(&self) -> u32 {
        self.bib % 1000
    }
}
