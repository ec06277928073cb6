use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A parsed control-code expression.
///
/// Course controls are written as short text expressions. They are parsed once
/// when the course is loaded:
///
/// | Text | Variant |
/// |------|---------|
/// | `31` | `Plain("31")` |
/// | `31(31,131)` | `Choice { correct: "31", alternatives: ["31", "131"] }` |
/// | `*`, `*(31,32)` | `Wildcard(options)`, each code accepted once |
/// | `%`, `%(31,32)` | `AnyRepeat(options)`, duplicates accepted |
/// | `?`, `?(20,120)`, `20?(20,120)` | `Optional { code, options }`, `code` is the text before `?` |
/// | `31A`, `105T` | `TrailO { number: 31, answer: 'A' }` |
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlCode {
    Plain(String),
    Choice {
        correct: String,
        alternatives: Vec<String>,
    },
    Wildcard(Vec<String>),
    AnyRepeat(Vec<String>),
    Optional {
        code: String,
        options: Vec<String>,
    },
    TrailO {
        number: u32,
        answer: char,
    },
}

/// Answer suffix of a Trail-O control that accepts any answer and is timed
pub const TRAILO_TIMED_ANSWER: char = 'T';

/// Answer suffix of a synthesized missing Trail-O punch
pub const TRAILO_MISSING_ANSWER: char = 'X';

/// Trail-O controls numbered from here on are timed controls
pub const TRAILO_TIMED_THRESHOLD: u32 = 100;

fn parse_options(text: &str) -> Option<Vec<String>> {
    let start = text.find('(')?;
    let end = text.rfind(')')?;
    if end <= start {
        return None;
    }
    Some(
        text[start + 1..end]
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
    )
}

impl ControlCode {
    /// Parse a control expression. Unknown shapes fall back to `Plain`.
    pub fn parse(text: &str) -> Self {
        let text = text.trim();

        if let Some(mark) = text.find('?') {
            return Self::Optional {
                code: text[..mark].trim().to_string(),
                options: parse_options(text).unwrap_or_default(),
            };
        }
        if text.starts_with('*') {
            return Self::Wildcard(parse_options(text).unwrap_or_default());
        }
        if text.starts_with('%') {
            return Self::AnyRepeat(parse_options(text).unwrap_or_default());
        }
        if let Some(alternatives) = parse_options(text) {
            let correct = text[..text.find('(').unwrap_or(0)].trim().to_string();
            return Self::Choice {
                correct,
                alternatives,
            };
        }
        if let Some((number, answer)) = split_trailo(text) {
            return Self::TrailO { number, answer };
        }
        Self::Plain(text.to_string())
    }

    /// Does a punch with this code satisfy the control?
    ///
    /// Uniqueness of wildcard punches is tracked by the caller.
    #[must_use]
    pub fn accepts(&self, code: &str) -> bool {
        match self {
            Self::Plain(c) => c == code,
            Self::Choice { alternatives, .. } => alternatives.iter().any(|a| a == code),
            Self::Wildcard(options) | Self::AnyRepeat(options) | Self::Optional { options, .. } => {
                options.is_empty() || options.iter().any(|o| o == code)
            }
            Self::TrailO { number, answer } => split_trailo(code) == Some((*number, *answer)),
        }
    }

    /// The numeric code used by the classic penalty model.
    ///
    /// Wildcards and other code-less controls yield `"0"`, which consumes any
    /// one punch.
    #[must_use]
    pub fn number_code(&self) -> String {
        match self {
            Self::Plain(c) if !c.is_empty() && c.chars().all(|ch| ch.is_ascii_digit()) => c.clone(),
            Self::Choice { correct, .. }
                if !correct.is_empty() && correct.chars().all(|ch| ch.is_ascii_digit()) =>
            {
                correct.clone()
            }
            Self::TrailO { number, .. } => number.to_string(),
            _ => "0".to_string(),
        }
    }

    /// Alternatives of a marked-route choice control that are not the correct code
    #[must_use]
    pub fn incorrect_choices(&self) -> Vec<&str> {
        match self {
            Self::Choice {
                correct,
                alternatives,
            } if !correct.is_empty() && correct.chars().all(|c| c.is_ascii_digit()) => alternatives
                .iter()
                .filter(|a| *a != correct && a.chars().all(|c| c.is_ascii_digit()))
                .map(String::as_str)
                .collect(),
            _ => Vec::new(),
        }
    }
}

impl std::fmt::Display for ControlCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fn with_options(f: &mut std::fmt::Formatter<'_>, prefix: &str, options: &[String]) -> std::fmt::Result {
            if options.is_empty() {
                write!(f, "{prefix}")
            } else {
                write!(f, "{prefix}({})", options.join(","))
            }
        }

        match self {
            Self::Plain(c) => write!(f, "{c}"),
            Self::Choice {
                correct,
                alternatives,
            } => write!(f, "{correct}({})", alternatives.join(",")),
            Self::Wildcard(options) => with_options(f, "*", options),
            Self::AnyRepeat(options) => with_options(f, "%", options),
            Self::Optional { code, options } => with_options(f, &format!("{code}?"), options),
            Self::TrailO { number, answer } => write!(f, "{number}{answer}"),
        }
    }
}

impl Serialize for ControlCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ControlCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Text(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Self::Plain(n.to_string()),
            Raw::Text(text) => Self::parse(&text),
        })
    }
}

/// Split a Trail-O code such as `31A` into its number and answer letter
#[must_use]
pub fn split_trailo(code: &str) -> Option<(u32, char)> {
    let answer = code.chars().last()?;
    if !answer.is_ascii_alphabetic() {
        return None;
    }
    let number = code[..code.len() - answer.len_utf8()].parse().ok()?;
    Some((number, answer.to_ascii_uppercase()))
}

/// A single course checkpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Control {
    /// Parsed control expression
    pub code: ControlCode,

    /// Length of the leg leading to this control, in metres (0 = unknown)
    #[serde(default)]
    pub length: u32,

    /// Points awarded in score modes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<i64>,
}

impl Control {
    pub fn new(code: &str) -> Self {
        Self {
            code: ControlCode::parse(code),
            length: 0,
            score: None,
        }
    }

    #[must_use]
    pub fn with_length(mut self, length: u32) -> Self {
        self.length = length;
        self
    }
}

/// A scored control point registered for the whole race (rogaine scores)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlPoint {
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_variants() {
        assert_eq!(ControlCode::parse("31"), ControlCode::Plain("31".into()));
        assert_eq!(
            ControlCode::parse("31(31,131)"),
            ControlCode::Choice {
                correct: "31".into(),
                alternatives: vec!["31".into(), "131".into()],
            }
        );
        assert_eq!(ControlCode::parse("*"), ControlCode::Wildcard(vec![]));
        assert_eq!(
            ControlCode::parse("%(31, 32)"),
            ControlCode::AnyRepeat(vec!["31".into(), "32".into()])
        );
        assert_eq!(
            ControlCode::parse("20?(20,120)"),
            ControlCode::Optional {
                code: "20".into(),
                options: vec!["20".into(), "120".into()],
            }
        );
        assert_eq!(
            ControlCode::parse("?"),
            ControlCode::Optional {
                code: String::new(),
                options: vec![],
            }
        );
        assert_eq!(
            ControlCode::parse("31a"),
            ControlCode::TrailO {
                number: 31,
                answer: 'A'
            }
        );
    }

    #[test]
    fn test_accepts() {
        assert!(ControlCode::parse("31").accepts("31"));
        assert!(!ControlCode::parse("31").accepts("131"));
        assert!(ControlCode::parse("31(31,131)").accepts("131"));
        assert!(ControlCode::parse("*").accepts("77"));
        assert!(!ControlCode::parse("*(31,32)").accepts("33"));
        assert!(ControlCode::parse("105T").accepts("105T"));
    }

    #[test]
    fn test_trailo_accepts_any_letter_case() {
        let code = ControlCode::parse("31a");
        assert!(code.accepts("31a"));
        assert!(code.accepts("31A"));
        assert!(!code.accepts("31B"));
        assert!(!code.accepts("131A"));
    }

    #[test]
    fn test_number_code() {
        assert_eq!(ControlCode::parse("31").number_code(), "31");
        assert_eq!(ControlCode::parse("31(31,131)").number_code(), "31");
        assert_eq!(ControlCode::parse("*").number_code(), "0");
        assert_eq!(ControlCode::parse("%(31,32)").number_code(), "0");
    }

    #[test]
    fn test_incorrect_choices() {
        let code = ControlCode::parse("31(31,131,231)");
        assert_eq!(code.incorrect_choices(), vec!["131", "231"]);
        assert!(ControlCode::parse("%(31,32)").incorrect_choices().is_empty());
    }

    #[test]
    fn test_display_round_trip() {
        for text in ["31", "31(31,131)", "*", "*(31,32)", "%", "?(20,120)", "20?(20,120)", "105T"] {
            assert_eq!(ControlCode::parse(text).to_string(), text);
        }
    }

    #[test]
    fn test_deserialize_numeric_code() {
        let control: Control = serde_json::from_str(r#"{"code": 31, "length": 400}"#).unwrap();
        assert_eq!(control.code, ControlCode::Plain("31".into()));
        assert_eq!(control.length, 400);
    }
}
