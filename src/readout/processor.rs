use tracing::debug;

use crate::core::result::{RaceResult, Split};
use crate::core::types::{ProcessingMode, TrailOAnswer};
use crate::parsing::card::CardData;
use crate::readout::ReadoutError;

/// Turns raw card dumps into unassigned results.
///
/// In Trail-O mode the last digit of the card number is the answer letter
/// for every punch on the card, and the remaining digits are the card number.
#[derive(Debug, Clone, Copy)]
pub struct CardDataProcessor {
    is_trailo: bool,
}

impl CardDataProcessor {
    pub fn new(mode: ProcessingMode) -> Self {
        Self {
            is_trailo: mode == ProcessingMode::Trailo,
        }
    }

    /// Build a result from a card dump.
    ///
    /// Empty slots and zero codes are skipped. The result is not linked to a
    /// person; binding by card number is up to the race.
    ///
    /// # Errors
    ///
    /// Returns `ReadoutError::InvalidCard` for a zero card number, or for a
    /// Trail-O card whose answer digit is not a known answer.
    pub fn process_card_data(&self, card: &CardData) -> Result<RaceResult, ReadoutError> {
        if card.card_number == 0 {
            return Err(ReadoutError::InvalidCard("card number is zero".to_string()));
        }

        let (card_number, answer) = if self.is_trailo {
            let digit = card.card_number % 10;
            let answer = TrailOAnswer::from_digit(digit).ok_or_else(|| {
                ReadoutError::InvalidCard(format!(
                    "card {} has no Trail-O answer for digit {digit}",
                    card.card_number
                ))
            })?;
            (card.card_number / 10, Some(answer))
        } else {
            (card.card_number, None)
        };

        let mut result = RaceResult::new(None);
        result.card_number = Some(card_number);
        result.start_time = card.start;
        result.finish_time = card.finish;

        for punch in &card.punches {
            let (code, Some(time)) = (punch.0, punch.1) else {
                continue;
            };
            if code == 0 {
                continue;
            }
            let code = match answer {
                Some(answer) => format!("{code}{}", answer.letter()),
                None => code.to_string(),
            };
            result.splits.push(Split::new(code, time));
        }

        debug!(
            card = card_number,
            punches = result.splits.len(),
            "Card processed"
        );

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::time::RaceTime;
    use crate::parsing::card::CardPunch;

    fn card(number: u32) -> CardData {
        let mut card = CardData::new(number)
            .with_punch(31, RaceTime::from_sec(100))
            .with_punch(0, RaceTime::from_sec(150))
            .with_punch(41, RaceTime::from_sec(200));
        card.punches.push(CardPunch(51, None));
        card.start = Some(RaceTime::from_sec(10));
        card
    }

    #[test]
    fn test_standard_card() {
        let processor = CardDataProcessor::new(ProcessingMode::Time);
        let result = processor.process_card_data(&card(5001)).unwrap();
        assert_eq!(result.card_number, Some(5001));
        assert_eq!(result.codes(), vec!["31", "41"]);
        assert_eq!(result.start_time, Some(RaceTime::from_sec(10)));
        assert!(result.finish_time.is_none());
        assert!(result.person.is_none());
    }

    #[test]
    fn test_trailo_card() {
        let processor = CardDataProcessor::new(ProcessingMode::Trailo);
        let result = processor.process_card_data(&card(50_013)).unwrap();
        assert_eq!(result.card_number, Some(5001));
        assert_eq!(result.codes(), vec!["31C", "41C"]);

        let result = processor.process_card_data(&card(50_010)).unwrap();
        assert_eq!(result.codes(), vec!["31Z", "41Z"]);

        assert!(matches!(
            processor.process_card_data(&card(50_019)),
            Err(ReadoutError::InvalidCard(_))
        ));
    }

    #[test]
    fn test_zero_card_rejected() {
        let processor = CardDataProcessor::new(ProcessingMode::Time);
        assert!(processor.process_card_data(&CardData::new(0)).is_err());
    }
}
