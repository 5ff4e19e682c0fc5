//! Pairs a command message with the envelope appended after it.

use crate::message::Transcript;
use crate::protocol::{CommandResult, LifecycleNotice, ResponseEnvelope};

use super::view::IndicatorState;

#[derive(Debug, Clone, PartialEq)]
pub enum Correlation {
    /// Nothing qualifying at `i+1` yet. Not an error.
    Pending,
    Resolved(LifecycleNotice),
}

/// Looks at `position + 1` only.
///
/// The dispatch loop appends a cycle's envelope directly after the scanned
/// message, so the single slot is enough; anything else there means the
/// result has not arrived.
pub fn correlate(transcript: &Transcript, position: usize) -> Correlation {
    transcript
        .get(position + 1)
        .and_then(LifecycleNotice::from_message)
        .map_or(Correlation::Pending, Correlation::Resolved)
}

impl Correlation {
    /// State and result for the `index`-th occurrence in the command message.
    pub fn indicator(&self, index: usize) -> (IndicatorState, Option<CommandResult>) {
        match self {
            Correlation::Pending | Correlation::Resolved(LifecycleNotice::Started) => {
                (IndicatorState::Pending, None)
            }
            Correlation::Resolved(LifecycleNotice::Finished(envelope)) => {
                result_indicator(envelope.results.get(index))
            }
            Correlation::Resolved(LifecycleNotice::FinishedStructured(parts)) => {
                match ResponseEnvelope::from_structured(parts) {
                    Some(summary) => result_indicator(summary.results.get(index)),
                    // A bare image list carries no per-result detail.
                    None => (IndicatorState::Success, None),
                }
            }
        }
    }
}

fn result_indicator(result: Option<&CommandResult>) -> (IndicatorState, Option<CommandResult>) {
    match result {
        Some(result) if result.is_error() => (IndicatorState::Error, Some(result.clone())),
        Some(result) => (IndicatorState::Success, Some(result.clone())),
        None => (IndicatorState::Pending, None),
    }
}
