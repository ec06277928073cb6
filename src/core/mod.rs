//! Core data types for result checking.
//!
//! This module provides the fundamental types used throughout the library:
//!
//! - [`RaceTime`]: Millisecond time values for punches, limits and penalties
//! - [`ControlCode`], [`Control`]: Parsed control expressions of a course
//! - [`Course`], [`Group`], [`Person`]: Event setup, immutable while checking
//! - [`Split`], [`RaceResult`]: A competitor's card and everything derived from it
//! - [`ResultStatus`], [`ProcessingMode`]: Result classification and scoring regimes
//!
//! ## Control Expressions
//!
//! | Expression | Meaning |
//! |------------|---------|
//! | `31`       | Punch control 31 |
//! | `31(31,131)` | Marked route choice, 131 is the wrong flag |
//! | `*`        | Any control, each code once |
//! | `%`        | Any control, repeats allowed |
//! | `20?(20,120)` | Optional ARDF control |
//! | `31A`      | Trail-O control 31 with answer A |

pub mod control;
pub mod course;
pub mod result;
pub mod time;
pub mod types;

pub use control::{Control, ControlCode, ControlPoint};
pub use course::{Course, Group, Person};
pub use result::{RaceResult, Split};
pub use time::RaceTime;
pub use types::{PersonId, ProcessingMode, ResultStatus};
