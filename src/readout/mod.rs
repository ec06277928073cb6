//! Card readout pipeline.
//!
//! Card readers run on their own tasks and push [`ReadoutCommand`]s into a
//! FIFO channel. A single processor task turns each card into a
//! [`RaceResult`] and emits it on the results channel, in arrival order.
//!
//! The processor stops when every command sender is dropped, when it receives
//! [`ReadoutCommand::Stop`], or when the results receiver is dropped.
//!
//! ```rust,no_run
//! use orient_results::core::ProcessingMode;
//! use orient_results::parsing::CardData;
//! use orient_results::readout::{read_cards, CardDataProcessor};
//!
//! # async fn demo() -> Result<(), orient_results::readout::ReadoutError> {
//! let processor = CardDataProcessor::new(ProcessingMode::Time);
//! let results = read_cards(processor, vec![CardData::new(5001)]).await?;
//! assert_eq!(results.len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod processor;

use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::core::result::RaceResult;
use crate::parsing::card::CardData;

pub use processor::CardDataProcessor;

#[derive(Error, Debug)]
pub enum ReadoutError {
    #[error("Invalid card data: {0}")]
    InvalidCard(String),

    #[error("Readout pipeline closed")]
    Closed,
}

/// Message from a card reader to the processor
#[derive(Debug, Clone)]
pub enum ReadoutCommand {
    CardData(CardData),
    Stop,
}

/// Handles of a running processor
pub struct ReadoutChannels {
    /// Sender for reader commands; clone it for each reader
    pub commands: mpsc::UnboundedSender<ReadoutCommand>,
    /// Receiver for built results
    pub results: mpsc::UnboundedReceiver<RaceResult>,
    /// Resolves to the number of cards turned into results
    pub handle: JoinHandle<usize>,
}

/// Spawn the processor task. Must be called from within a tokio runtime.
pub fn spawn_processor(processor: CardDataProcessor) -> ReadoutChannels {
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (result_tx, result_rx) = mpsc::unbounded_channel();

    let handle = tokio::spawn(async move { process_commands(processor, command_rx, result_tx).await });

    ReadoutChannels {
        commands: command_tx,
        results: result_rx,
        handle,
    }
}

async fn process_commands(
    processor: CardDataProcessor,
    mut commands: mpsc::UnboundedReceiver<ReadoutCommand>,
    results: mpsc::UnboundedSender<RaceResult>,
) -> usize {
    info!("Readout processor started");
    let mut processed = 0;

    while let Some(command) = commands.recv().await {
        match command {
            ReadoutCommand::CardData(card) => match processor.process_card_data(&card) {
                Ok(result) => {
                    if results.send(result).is_err() {
                        debug!("Result receiver dropped, shutting down");
                        break;
                    }
                    processed += 1;
                }
                Err(e) => {
                    warn!("Skipping card {}: {}", card.card_number, e);
                }
            },
            ReadoutCommand::Stop => {
                debug!("Stop requested");
                break;
            }
        }
    }

    info!("Readout processor stopped after {} cards", processed);
    processed
}

/// Run a batch of cards through the pipeline and collect the results
///
/// # Errors
///
/// Returns `ReadoutError::Closed` if the processor stops before all cards
/// were handed over or the processor task fails.
pub async fn read_cards(
    processor: CardDataProcessor,
    cards: Vec<CardData>,
) -> Result<Vec<RaceResult>, ReadoutError> {
    let ReadoutChannels {
        commands,
        mut results,
        handle,
    } = spawn_processor(processor);

    for card in cards {
        commands
            .send(ReadoutCommand::CardData(card))
            .map_err(|_| ReadoutError::Closed)?;
    }
    drop(commands);

    let mut built = Vec::new();
    while let Some(result) = results.recv().await {
        built.push(result);
    }

    handle.await.map_err(|_| ReadoutError::Closed)?;
    Ok(built)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::time::RaceTime;
    use crate::core::types::ProcessingMode;

    #[tokio::test]
    async fn test_results_keep_arrival_order() {
        let cards = vec![
            CardData::new(3).with_punch(31, RaceTime::from_sec(60)),
            CardData::new(0),
            CardData::new(1).with_punch(41, RaceTime::from_sec(60)),
        ];
        let results = read_cards(CardDataProcessor::new(ProcessingMode::Time), cards)
            .await
            .unwrap();
        let numbers: Vec<Option<u32>> = results.iter().map(|r| r.card_number).collect();
        assert_eq!(numbers, vec![Some(3), Some(1)]);
    }

    #[tokio::test]
    async fn test_multiple_readers() {
        let ReadoutChannels {
            commands,
            mut results,
            handle,
        } = spawn_processor(CardDataProcessor::new(ProcessingMode::Time));

        let readers: Vec<_> = (1..=3)
            .map(|n| {
                let tx = commands.clone();
                tokio::spawn(async move {
                    tx.send(ReadoutCommand::CardData(CardData::new(n))).unwrap();
                })
            })
            .collect();
        drop(commands);
        for reader in readers {
            reader.await.unwrap();
        }

        let mut numbers = Vec::new();
        while let Some(result) = results.recv().await {
            numbers.push(result.card_number.unwrap());
        }
        numbers.sort_unstable();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(handle.await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_stop_command() {
        let channels = spawn_processor(CardDataProcessor::new(ProcessingMode::Time));
        channels.commands.send(ReadoutCommand::CardData(CardData::new(7))).unwrap();
        channels.commands.send(ReadoutCommand::Stop).unwrap();
        channels.commands.send(ReadoutCommand::CardData(CardData::new(8))).ok();
        assert_eq!(channels.handle.await.unwrap(), 1);
    }
}
