use serde::{Deserialize, Serialize};

/// Unique identifier for a person in the race
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PersonId(pub u32);

impl std::fmt::Display for PersonId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outcome of checking a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultStatus {
    /// Not checked yet
    #[default]
    None,
    Ok,
    Overtime,
    MissingPunch,
    Disqualified,
    DidNotStart,
    DidNotFinish,
    MissPenaltyLap,
    MultiDayIssue,
}

impl ResultStatus {
    /// Statuses produced by checking; a result carrying one of these is not
    /// checked again until it is explicitly reset.
    pub const FINALIZED: [Self; 5] = [
        Self::Ok,
        Self::MissingPunch,
        Self::Overtime,
        Self::MissPenaltyLap,
        Self::MultiDayIssue,
    ];

    #[must_use]
    pub fn is_finalized(self) -> bool {
        Self::FINALIZED.contains(&self)
    }

    #[must_use]
    pub fn is_ok(self) -> bool {
        matches!(self, Self::Ok)
    }

    /// Position in the group order: OK first, then the disqualifying statuses
    /// in a fixed order, anything else last.
    #[must_use]
    pub fn sort_priority(self) -> u8 {
        match self {
            Self::Ok => 0,
            Self::Overtime => 1,
            Self::MissingPunch => 2,
            Self::Disqualified => 3,
            Self::DidNotFinish => 4,
            Self::DidNotStart => 5,
            Self::None | Self::MissPenaltyLap | Self::MultiDayIssue => 0,
        }
    }

    /// Default human-readable comment shown next to the status
    #[must_use]
    pub fn default_comment(self) -> &'static str {
        match self {
            Self::None | Self::Ok => "",
            Self::Overtime => "Exceeded the time limit",
            Self::MissingPunch => "Missing or incorrect punch",
            Self::Disqualified => "Disqualified",
            Self::DidNotStart => "Did not start",
            Self::DidNotFinish => "Did not finish",
            Self::MissPenaltyLap => "Penalty laps not run",
            Self::MultiDayIssue => "Multi-day result issue",
        }
    }
}

impl std::fmt::Display for ResultStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::None => "-",
            Self::Ok => "OK",
            Self::Overtime => "OVT",
            Self::MissingPunch => "MP",
            Self::Disqualified => "DSQ",
            Self::DidNotStart => "DNS",
            Self::DidNotFinish => "DNF",
            Self::MissPenaltyLap => "MPL",
            Self::MultiDayIssue => "MDI",
        };
        write!(f, "{text}")
    }
}

/// Race-wide scoring regime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingMode {
    /// Classic time course
    #[default]
    Time,
    /// Rogaine: free-order collection of control points
    Scores,
    /// Ordered control visitation with optional controls
    Ardf,
    /// Control identification
    Trailo,
}

/// How incorrect punches on a marked route are charged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkedRouteMode {
    #[default]
    Off,
    /// Each penalty adds a fixed amount of time
    Time,
    /// Each penalty is a lap the competitor has to run
    Laps,
}

/// Where a rogaine control takes its points from when it has no explicit score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreMode {
    /// A configured value per control
    #[default]
    Fixed,
    /// Code divided by ten
    Rogaine,
}

/// Trail-O answer letter encoded as the last digit of the card number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrailOAnswer {
    Z,
    A,
    B,
    C,
    D,
    E,
    F,
}

impl TrailOAnswer {
    #[must_use]
    pub fn from_digit(digit: u32) -> Option<Self> {
        match digit {
            0 => Some(Self::Z),
            1 => Some(Self::A),
            2 => Some(Self::B),
            3 => Some(Self::C),
            4 => Some(Self::D),
            5 => Some(Self::E),
            6 => Some(Self::F),
            _ => None,
        }
    }

    #[must_use]
    pub fn letter(self) -> char {
        match self {
            Self::Z => 'Z',
            Self::A => 'A',
            Self::B => 'B',
            Self::C => 'C',
            Self::D => 'D',
            Self::E => 'E',
            Self::F => 'F',
        }
    }
}
