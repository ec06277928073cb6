//! Result checking: status, penalties and scores.
//!
//! [`ResultChecker`] runs the mode-specific check of a result against its
//! course and fills in the derived fields:
//!
//! | Mode | Check | Derived |
//! |------|-------|---------|
//! | `time` | Ordered course check | `penalty_time` / `penalty_laps`, `credit_time` |
//! | `scores` | None | `rogaine_score`, `rogaine_penalty` |
//! | `ardf` | None | `scores_ardf` |
//! | `trailo` | None | `trailo_score`, `trailo_time`, timed-control `penalty_time` |
//!
//! The [`penalty`] and [`score`] modules hold the pure calculations and can be
//! used on their own.

pub mod checker;
pub mod penalty;
pub mod score;

pub use checker::{CheckError, ResultChecker};
