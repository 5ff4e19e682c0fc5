//! Folds the results of one cycle into the message appended after it.

use crate::message::{MessageContent, StructuredContent};
use crate::protocol::{CommandResult, Continuation, ControlMessage, ResponseEnvelope};

#[derive(Debug, Clone, PartialEq)]
pub enum EnvelopeBody {
    /// `{"type": "RESPONSE", "results": [...], "continuation": ...}`
    Response(ResponseEnvelope),
    /// Multi-modal list fed back to the model so it can see images.
    Structured(Vec<StructuredContent>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub body: EnvelopeBody,
    pub continuation: Continuation,
}

impl Envelope {
    pub fn into_content(self) -> MessageContent {
        match self.body {
            EnvelopeBody::Response(envelope) => ControlMessage::Response(envelope).into_content(),
            EnvelopeBody::Structured(parts) => MessageContent::Structured(parts),
        }
    }
}

/// Pure: the same results always give the same envelope.
///
/// The continuation is `CONTINUE_MODEL` if any result asks for it. Results
/// carrying images are merged into one structured list, closed by a
/// `RESPONSE` text block listing every result in occurrence order; inlined
/// results appear there as [`CommandResult::inlined`] stand-ins.
pub fn build_envelope(results: Vec<CommandResult>) -> Envelope {
    let continuation = results
        .iter()
        .fold(Continuation::Terminate, |acc, result| acc.or(result.continuation));

    if !results.iter().any(|result| result.multimodal_content().is_some()) {
        return Envelope {
            body: EnvelopeBody::Response(ResponseEnvelope {
                results,
                continuation,
            }),
            continuation,
        };
    }

    let mut parts = Vec::new();
    let mut summary = Vec::with_capacity(results.len());
    for result in results {
        match result.multimodal_content() {
            Some(content) => {
                let images = content.iter().filter(|part| part.is_image()).count();
                summary.push(result.inlined(images));
                parts.extend(content);
            }
            None => summary.push(result),
        }
    }
    let block = ControlMessage::Response(ResponseEnvelope {
        results: summary,
        continuation,
    });
    parts.push(StructuredContent::text(block.to_json_string()));

    Envelope {
        body: EnvelopeBody::Structured(parts),
        continuation,
    }
}
