//! # orient-results
//!
//! Result computation for orienteering events.
//!
//! A competitor's card holds a list of punches: control codes with the time
//! each was taken. `orient-results` checks those punches against the
//! competitor's course, decides the result status, charges penalties and
//! credits, computes leg times with leg places, and ranks every group.
//!
//! ## Features
//!
//! - **Course checking**: Ordered controls, free-order wildcards, choices and optional controls
//! - **Marked routes**: Penalty time or penalty laps for wrong punches
//! - **Rogaine scores**: Control points with an overtime deduction
//! - **ARDF and Trail-O**: Mode-specific scoring and answer checking
//! - **Splits**: Leg times, leg places, relative places and leg leaders
//! - **Places**: Shared places for ties, relay teams ranked by total time
//! - **Readout**: An async pipeline turning raw card dumps into results
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use orient_results::{Race, ResultChecker, RaceSplits};
//! use orient_results::splits::placing;
//!
//! let mut race = Race::load_from_file(Path::new("race.json")).unwrap();
//!
//! let checked = ResultChecker::new(&race.context).check_all(&mut race.results);
//! placing::set_places(&race.context, &mut race.results);
//! RaceSplits::generate(&race.context, &mut race.results, None);
//!
//! for result in &race.results {
//!     println!("{:?} {} {:?}", result.person, result.status, result.place);
//! }
//! println!("{checked} results checked");
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Times, controls, courses, persons and results
//! - [`race`]: Race settings and the race context results are checked against
//! - [`checking`]: Result status, penalties and scores
//! - [`splits`]: Leg times, leg places and group places
//! - [`parsing`]: Punch lists and raw card dumps
//! - [`readout`]: Async card readout pipeline
//! - [`cli`]: Command-line interface implementation

pub mod checking;
pub mod cli;
pub mod core;
pub mod parsing;
pub mod race;
pub mod readout;
pub mod splits;
pub mod utils;

// Re-export commonly used types for convenience
pub use checking::{CheckError, ResultChecker};
pub use core::control::{Control, ControlCode};
pub use core::course::{Course, Group, Person};
pub use core::result::{RaceResult, Split};
pub use core::time::RaceTime;
pub use core::types::*;
pub use race::{Race, RaceContext, RaceSettings};
pub use splits::{GroupSplits, PersonSplits, RaceSplits};
