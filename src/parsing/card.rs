use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::time::RaceTime;
use crate::parsing::punches::ParseError;
use crate::utils::validation::MAX_PUNCHES;

/// One punch as stored on a card: control code and optional time.
///
/// Serialized as a `[code, time]` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardPunch(pub u32, pub Option<RaceTime>);

/// Raw card dump as delivered by a card reader
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardData {
    #[serde(alias = "bib")]
    pub card_number: u32,

    #[serde(default)]
    pub punches: Vec<CardPunch>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<RaceTime>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish: Option<RaceTime>,
}

impl CardData {
    pub fn new(card_number: u32) -> Self {
        Self {
            card_number,
            punches: Vec::new(),
            start: None,
            finish: None,
        }
    }

    #[must_use]
    pub fn with_punch(mut self, code: u32, time: RaceTime) -> Self {
        self.punches.push(CardPunch(code, Some(time)));
        self
    }
}

/// Parse a JSON file holding an array of card dumps
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, `ParseError::Json` if
/// it is not a valid card array, or `ParseError::TooManyPunches` if a card
/// exceeds the punch limit.
pub fn parse_cards_file(path: &Path) -> Result<Vec<CardData>, ParseError> {
    let content = std::fs::read_to_string(path)?;
    parse_cards_text(&content)
}

/// Parse a JSON array of card dumps
///
/// # Errors
///
/// Returns `ParseError::Json` if the text is not a valid card array, or
/// `ParseError::TooManyPunches` if a card exceeds the punch limit.
pub fn parse_cards_text(text: &str) -> Result<Vec<CardData>, ParseError> {
    let cards: Vec<CardData> = serde_json::from_str(text)?;
    if let Some(card) = cards.iter().find(|c| c.punches.len() > MAX_PUNCHES) {
        return Err(ParseError::TooManyPunches(card.punches.len()));
    }
    Ok(cards)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cards() {
        let json = r#"[
            {"card_number": 5001, "punches": [[31, "10:05:00"], [41, null]],
             "start": "10:00:00", "finish": "10:30:00"},
            {"bib": 5002}
        ]"#;
        let cards = parse_cards_text(json).unwrap();
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].punches[0], CardPunch(31, Some(RaceTime::from_hms(10, 5, 0))));
        assert_eq!(cards[0].punches[1].1, None);
        assert_eq!(cards[0].finish, Some(RaceTime::from_hms(10, 30, 0)));
        assert_eq!(cards[1].card_number, 5002);
        assert!(cards[1].punches.is_empty());
    }

    #[test]
    fn test_parse_cards_rejects_garbage() {
        assert!(matches!(parse_cards_text("{}"), Err(ParseError::Json(_))));
    }

    #[test]
    fn test_punch_limit() {
        let mut card = CardData::new(1);
        card.punches = vec![CardPunch(31, None); MAX_PUNCHES + 1];
        let json = serde_json::to_string(&vec![card]).unwrap();
        assert!(matches!(parse_cards_text(&json), Err(ParseError::TooManyPunches(_))));
    }
}
