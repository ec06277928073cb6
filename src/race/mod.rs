//! Race setup, settings and course resolution.
//!
//! A [`Race`] is split into a read-only [`RaceContext`] (settings, courses,
//! groups, persons) and the mutable list of results, so the context can be
//! shared while results are checked.
//!
//! ## Race Files
//!
//! Races are loaded from JSON:
//!
//! ```json
//! {
//!   "settings": {"result_processing_mode": "time", "marked_route_mode": "off"},
//!   "courses": [{"name": "A", "controls": [{"code": 31, "length": 400}]}],
//!   "groups": [{"name": "M21", "course": "A", "max_time": "02:00:00"}],
//!   "persons": [{"id": 1, "name": "Anna", "group": "M21", "card_number": 5001}],
//!   "results": [{"card_number": 5001, "start_time": "10:00:00", "finish_time": "10:30:00",
//!                "splits": [{"code": "31", "time": "10:04:10"}]}]
//! }
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use orient_results::race::{CourseResolver, Race};
//! use std::path::Path;
//!
//! let race = Race::load_from_file(Path::new("race.json")).unwrap();
//! for result in &race.results {
//!     if let Some(course) = race.context.find_course(result) {
//!         println!("{} controls", course.len());
//!     }
//! }
//! ```

pub mod settings;
pub mod store;

pub use settings::{RaceSettings, SettingValue};
pub use store::{CourseResolver, Race, RaceContext, RaceData, RaceError};
