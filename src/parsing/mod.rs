//! Parsers for punch data.
//!
//! This module provides parsers for:
//!
//! - **Punch files**: TSV/CSV with `code` and `time` columns, one punch per line
//! - **Card dumps**: JSON arrays of raw card readouts, as delivered by card readers
//!
//! ## Example
//!
//! ```rust,no_run
//! use orient_results::parsing::punches::parse_punches_text;
//!
//! let splits = parse_punches_text("code\ttime\n31\t10:05:00\n41\t10:09:30\n", '\t').unwrap();
//! assert_eq!(splits.len(), 2);
//! ```
//!
//! ## Card Dump Format
//!
//! | Field | Description | Required |
//! |-------|-------------|----------|
//! | `card_number` (or `bib`) | Card number; in Trail-O the last digit is the answer | Yes |
//! | `punches` | `[code, time]` pairs; a null time marks an empty slot | No |
//! | `start` | Start punch time | No |
//! | `finish` | Finish punch time | No |

pub mod card;
pub mod punches;

pub use card::{CardData, CardPunch};
pub use punches::ParseError;
