use serde::{Deserialize, Serialize};

use crate::core::time::RaceTime;
use crate::core::types::{MarkedRouteMode, ProcessingMode, ScoreMode};

/// Default time charged per marked-route penalty
pub const DEFAULT_PENALTY_TIME: RaceTime = RaceTime::from_sec(60);

/// Default control code of the credit (rest) station
pub const DEFAULT_CREDIT_CP: u32 = 250;

fn default_penalty_time() -> RaceTime {
    DEFAULT_PENALTY_TIME
}

fn default_credit_cp() -> u32 {
    DEFAULT_CREDIT_CP
}

fn default_one() -> i64 {
    1
}

/// Race-wide settings controlling mode selection and thresholds.
///
/// Field names are the keys of the `settings` object in a race file; every
/// key is optional and falls back to its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RaceSettings {
    pub result_processing_mode: ProcessingMode,

    // === Marked route ===
    pub marked_route_mode: MarkedRouteMode,
    #[serde(default = "default_penalty_time")]
    pub marked_route_penalty_time: RaceTime,
    /// Accept punches in any order and only charge penalties
    pub marked_route_dont_dsq: bool,
    /// Cap the penalty count at the number of course controls
    pub marked_route_max_penalty_by_cp: bool,
    /// Verify penalty laps at the lap station
    pub marked_route_if_station_check: bool,
    pub marked_route_penalty_lap_station_code: Option<u32>,

    // === Credit time ===
    pub credit_time_enabled: bool,
    #[serde(default = "default_credit_cp")]
    pub credit_time_cp: u32,

    // === Score modes ===
    pub result_processing_scores_allow_duplicates: bool,
    #[serde(default = "default_one")]
    pub result_processing_scores_minute_penalty: i64,
    /// Grace window past the time limit before a scores result is overtime
    pub result_processing_scores_max_overrun_time: RaceTime,
    pub result_processing_score_mode: ScoreMode,
    #[serde(default = "default_one")]
    pub result_processing_fixed_score_value: i64,
}

impl Default for RaceSettings {
    fn default() -> Self {
        Self {
            result_processing_mode: ProcessingMode::Time,
            marked_route_mode: MarkedRouteMode::Off,
            marked_route_penalty_time: DEFAULT_PENALTY_TIME,
            marked_route_dont_dsq: false,
            marked_route_max_penalty_by_cp: false,
            marked_route_if_station_check: false,
            marked_route_penalty_lap_station_code: None,
            credit_time_enabled: false,
            credit_time_cp: DEFAULT_CREDIT_CP,
            result_processing_scores_allow_duplicates: false,
            result_processing_scores_minute_penalty: 1,
            result_processing_scores_max_overrun_time: RaceTime::ZERO,
            result_processing_score_mode: ScoreMode::Fixed,
            result_processing_fixed_score_value: 1,
        }
    }
}

/// An untyped setting value
#[derive(Debug, Clone, PartialEq)]
pub enum SettingValue {
    Bool(bool),
    Number(i64),
    Text(String),
}

impl RaceSettings {
    /// Look up a setting by its key.
    ///
    /// Times are reported in milliseconds. Unknown keys return `None`.
    #[must_use]
    pub fn get_setting(&self, key: &str) -> Option<SettingValue> {
        let value = serde_json::to_value(self).ok()?;
        match value.get(key)? {
            serde_json::Value::Bool(b) => Some(SettingValue::Bool(*b)),
            serde_json::Value::Number(n) => n.as_i64().map(SettingValue::Number),
            serde_json::Value::String(s) => Some(
                RaceTime::parse(s)
                    .filter(|_| s.contains(':'))
                    .map_or_else(|| SettingValue::Text(s.clone()), |t| SettingValue::Number(t.to_msec())),
            ),
            _ => None,
        }
    }

    #[must_use]
    pub fn with_mode(mut self, mode: ProcessingMode) -> Self {
        self.result_processing_mode = mode;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_object() {
        let settings: RaceSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, RaceSettings::default());
        assert_eq!(settings.marked_route_penalty_time, RaceTime::from_sec(60));
        assert_eq!(settings.credit_time_cp, 250);
    }

    #[test]
    fn test_partial_settings() {
        let settings: RaceSettings = serde_json::from_str(
            r#"{"result_processing_mode": "scores", "marked_route_penalty_time": 30000}"#,
        )
        .unwrap();
        assert_eq!(settings.result_processing_mode, ProcessingMode::Scores);
        assert_eq!(settings.marked_route_penalty_time, RaceTime::from_sec(30));
        assert_eq!(settings.result_processing_scores_minute_penalty, 1);
    }

    #[test]
    fn test_get_setting() {
        let settings = RaceSettings::default();
        assert_eq!(
            settings.get_setting("result_processing_mode"),
            Some(SettingValue::Text("time".into()))
        );
        assert_eq!(
            settings.get_setting("marked_route_penalty_time"),
            Some(SettingValue::Number(60_000))
        );
        assert_eq!(
            settings.get_setting("credit_time_enabled"),
            Some(SettingValue::Bool(false))
        );
        assert_eq!(settings.get_setting("no_such_key"), None);
    }
}
