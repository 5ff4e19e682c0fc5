//! Display-side view of a transcript: which messages are shown, how commands
//! appear, and which results they are paired with.

pub mod classifier;
pub mod correlator;
pub mod markdown;
pub mod view;

pub use classifier::{classify, Treatment};
pub use correlator::{correlate, Correlation};
pub use markdown::{ComrakRenderer, MarkdownRenderer, PlainRenderer};
pub use view::{Indicator, IndicatorState, MessageView, RenderOptions, RenderedMessage, Segment};

use crate::command::CommandTable;
use crate::message::Transcript;

/// Renders every position of `transcript`, hidden messages included.
pub fn render_transcript(
    table: &CommandTable,
    transcript: &Transcript,
    options: RenderOptions,
    renderer: &dyn MarkdownRenderer,
) -> Vec<RenderedMessage> {
    transcript
        .messages()
        .iter()
        .map(|message| RenderedMessage {
            position: message.position,
            role: message.role,
            view: render_message(table, transcript, message.position, options, renderer),
        })
        .collect()
}

pub fn render_message(
    table: &CommandTable,
    transcript: &Transcript,
    position: usize,
    options: RenderOptions,
    renderer: &dyn MarkdownRenderer,
) -> MessageView {
    let Some(message) = transcript.get(position) else {
        return MessageView::Hidden;
    };
    match classify(table, transcript, position, options) {
        Treatment::Hidden => MessageView::Hidden,
        Treatment::Passthrough => MessageView::Passthrough {
            content: message.content.clone(),
        },
        Treatment::MultiModal {
            parts,
            downloadable,
        } => MessageView::MultiModal {
            parts,
            downloadable,
        },
        Treatment::CommandView => MessageView::Commands {
            segments: command_segments(
                table,
                &message.content.text(),
                &correlate(transcript, position),
                renderer,
            ),
        },
    }
}

/// Splits text into prose and rows of adjacent command indicators.
///
/// Whitespace between two commands does not break a row. The n-th occurrence
/// is paired with the n-th result of the correlated envelope.
fn command_segments(
    table: &CommandTable,
    text: &str,
    correlation: &Correlation,
    renderer: &dyn MarkdownRenderer,
) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut row: Vec<Indicator> = Vec::new();
    let mut cursor = 0;

    for (index, occurrence) in table.match_all(text).into_iter().enumerate() {
        if occurrence.span.start > cursor {
            let gap = &text[cursor..occurrence.span.start];
            if !gap.trim().is_empty() {
                if !row.is_empty() {
                    segments.push(Segment::Indicators(std::mem::take(&mut row)));
                }
                segments.push(Segment::Prose(renderer.render(gap.trim())));
            }
        }
        let (state, result) = correlation.indicator(index);
        row.push(Indicator {
            icon: table.icon(&occurrence.command).map(str::to_string),
            request: occurrence.payload.to_value(),
            command: occurrence.command,
            state,
            result,
        });
        cursor = cursor.max(occurrence.span.end);
    }

    if !row.is_empty() {
        segments.push(Segment::Indicators(row));
    }
    let tail = &text[cursor.min(text.len())..];
    if !tail.trim().is_empty() {
        segments.push(Segment::Prose(renderer.render(tail.trim())));
    }
    segments
}
