//! Leg splits, leg places and group result places.
//!
//! Split generation reads the flags left by checking, so results must be
//! checked before their group is generated:
//!
//! ```rust,no_run
//! use orient_results::checking::ResultChecker;
//! use orient_results::race::Race;
//! use orient_results::splits::{placing, RaceSplits};
//! use std::path::Path;
//!
//! let mut race = Race::load_from_file(Path::new("race.json")).unwrap();
//! ResultChecker::new(&race.context).check_all(&mut race.results);
//! placing::set_places(&race.context, &mut race.results);
//! RaceSplits::generate(&race.context, &mut race.results, None);
//! ```

pub mod group;
pub mod person;
pub mod placing;

pub use group::{GroupSplits, LegLeader, RaceSplits};
pub use person::PersonSplits;
