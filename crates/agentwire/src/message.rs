pub mod content;
pub mod transcript;

pub use content::{MessageContent, StructuredContent};
pub use transcript::{RawMessage, Role, Transcript};
