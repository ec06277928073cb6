use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A time value with millisecond precision.
///
/// Used both for absolute times of day (punch, start, finish) and for
/// durations (leg times, penalties, limits). Serialized as `HH:MM:SS` (with a
/// `.mmm` suffix when there are milliseconds); deserialized from that form or
/// from an integer number of milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RaceTime(i64);

impl RaceTime {
    pub const ZERO: Self = Self(0);

    #[must_use]
    pub const fn from_msec(msec: i64) -> Self {
        Self(msec)
    }

    #[must_use]
    pub const fn from_sec(sec: i64) -> Self {
        Self(sec * 1000)
    }

    #[must_use]
    pub const fn from_hms(hour: i64, minute: i64, second: i64) -> Self {
        Self(((hour * 60 + minute) * 60 + second) * 1000)
    }

    #[must_use]
    pub const fn to_msec(self) -> i64 {
        self.0
    }

    /// Whole seconds, truncated toward zero
    #[must_use]
    pub const fn to_sec(self) -> i64 {
        self.0 / 1000
    }

    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Parse `HH:MM:SS`, `HH:MM:SS.fff`, `MM:SS` or a plain millisecond count.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }
        if let Ok(msec) = s.parse::<i64>() {
            return Some(Self(msec));
        }

        let parts: Vec<&str> = s.split(':').collect();
        let (hours, minutes, seconds) = match parts.as_slice() {
            [h, m, sec] => (h.parse::<i64>().ok()?, m.parse::<i64>().ok()?, *sec),
            [m, sec] => (0, m.parse::<i64>().ok()?, *sec),
            _ => return None,
        };

        let (whole, fraction) = seconds.split_once('.').unwrap_or((seconds, ""));
        let whole: i64 = whole.parse().ok()?;
        let msec = if fraction.is_empty() {
            0
        } else {
            let digits: String = fraction.chars().chain("000".chars()).take(3).collect();
            digits.parse::<i64>().ok()?
        };

        Some(Self(((hours * 60 + minutes) * 60 + whole) * 1000 + msec))
    }

    /// Format as `M:SS`, used for pace strings
    #[must_use]
    pub fn to_minute_str(self) -> String {
        let total = self.to_sec().max(0);
        format!("{}:{:02}", total / 60, total % 60)
    }
}

impl fmt::Display for RaceTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.abs();
        let msec = abs % 1000;
        let total = abs / 1000;
        write!(
            f,
            "{sign}{:02}:{:02}:{:02}",
            total / 3600,
            (total / 60) % 60,
            total % 60
        )?;
        if msec > 0 {
            write!(f, ".{msec:03}")?;
        }
        Ok(())
    }
}

impl Add for RaceTime {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for RaceTime {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for RaceTime {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl Mul<i64> for RaceTime {
    type Output = Self;

    fn mul(self, rhs: i64) -> Self {
        Self(self.0 * rhs)
    }
}

impl Serialize for RaceTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for RaceTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Msec(i64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Msec(msec) => Ok(Self(msec)),
            Raw::Text(text) => Self::parse(&text)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid time '{text}'"))),
        }
    }
}

/// Pace in minutes per kilometre, e.g. `5:30/km`.
///
/// Returns an empty string when the length is unknown.
#[must_use]
pub fn speed_min_per_km(value: RaceTime, length_m: u32) -> String {
    if length_m == 0 {
        return String::new();
    }
    let per_km = value.to_msec() * 1000 / i64::from(length_m);
    format!("{}/km", RaceTime::from_msec(per_km).to_minute_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_formats() {
        assert_eq!(RaceTime::parse("01:02:03"), Some(RaceTime::from_hms(1, 2, 3)));
        assert_eq!(RaceTime::parse("61:30"), Some(RaceTime::from_hms(1, 1, 30)));
        assert_eq!(RaceTime::parse("10:00:00.250").map(RaceTime::to_msec), Some(36_000_250));
        assert_eq!(RaceTime::parse("1500"), Some(RaceTime::from_msec(1500)));
        assert_eq!(RaceTime::parse("26:00:00"), Some(RaceTime::from_hms(26, 0, 0)));
        assert_eq!(RaceTime::parse("abc"), None);
        assert_eq!(RaceTime::parse(""), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(RaceTime::from_hms(1, 2, 3).to_string(), "01:02:03");
        assert_eq!(RaceTime::from_msec(1_500).to_string(), "00:00:01.500");
        assert_eq!(RaceTime::from_sec(-90).to_string(), "-00:01:30");
    }

    #[test]
    fn test_serde_round_trip_accepts_msec() {
        let t: RaceTime = serde_json::from_str("90000").unwrap();
        assert_eq!(t, RaceTime::from_sec(90));
        let t: RaceTime = serde_json::from_str("\"00:01:30\"").unwrap();
        assert_eq!(serde_json::to_string(&t).unwrap(), "\"00:01:30\"");
    }

    #[test]
    fn test_speed() {
        // 11 minutes over 2 km
        assert_eq!(speed_min_per_km(RaceTime::from_sec(660), 2000), "5:30/km");
        assert_eq!(speed_min_per_km(RaceTime::from_sec(660), 0), "");
    }
}
