pub mod executor;
pub mod policy;

pub use executor::{CommandExecutor, DEFAULT_MAX_MESSAGE_BYTES};
pub use policy::{build_envelope, Envelope, EnvelopeBody};

/// Result of scanning and executing one message.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// No command found; nothing is appended to the transcript.
    Pass,
    /// Commands ran; the envelope is appended right after the scanned message.
    Responded(Envelope),
}

impl CycleOutcome {
    pub fn is_pass(&self) -> bool {
        matches!(self, CycleOutcome::Pass)
    }
}
