//! Per-message display treatment.

use crate::command::CommandTable;
use crate::message::{MessageContent, StructuredContent, Transcript};
use crate::protocol::{ControlMessage, LifecycleNotice};

use super::view::RenderOptions;

#[derive(Debug, Clone, PartialEq)]
pub enum Treatment {
    Hidden,
    MultiModal {
        parts: Vec<StructuredContent>,
        downloadable: bool,
    },
    CommandView,
    Passthrough,
}

/// Decides how the message at `position` is shown.
///
/// Pure in the transcript and position: classifying again yields the same
/// treatment. Positions past the end are passed through.
pub fn classify(
    table: &CommandTable,
    transcript: &Transcript,
    position: usize,
    options: RenderOptions,
) -> Treatment {
    if options.debug {
        return Treatment::Passthrough;
    }
    let Some(message) = transcript.get(position) else {
        return Treatment::Passthrough;
    };
    let control = ControlMessage::parse(&message.content);

    if control == Some(ControlMessage::Continuation) {
        return Treatment::Hidden;
    }

    if let MessageContent::Structured(parts) = &message.content {
        if parts.iter().any(StructuredContent::is_image) {
            return Treatment::MultiModal {
                parts: parts.clone(),
                downloadable: false,
            };
        }
    }

    if let Some(ControlMessage::Response(envelope)) = &control {
        let artifacts: Vec<StructuredContent> = envelope
            .results
            .iter()
            .filter_map(|result| result.artifact_url())
            .map(StructuredContent::image)
            .collect();
        if !artifacts.is_empty() {
            return Treatment::MultiModal {
                parts: artifacts,
                downloadable: true,
            };
        }
    }

    if let Some(notice) = LifecycleNotice::from_message(message) {
        let follows_command = position
            .checked_sub(1)
            .and_then(|previous| transcript.get(previous))
            .is_some_and(|previous| table.matches_any(&previous.content.text()));
        if !notice.has_visual_artifact() && follows_command {
            return Treatment::Hidden;
        }
    }

    if table.matches_any(&message.content.text()) {
        return Treatment::CommandView;
    }

    Treatment::Passthrough
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{boxed_command_future, FnCommand, PayloadShape};
    use crate::message::Role;
    use crate::protocol::{kinds, CommandResult, Continuation, ResponseEnvelope};
    use serde_json::json;

    fn table() -> CommandTable {
        let mut table = CommandTable::new();
        for name in ["googleSearch", "createAIImage"] {
            table
                .register(FnCommand::new(name, PayloadShape::Paired, |_payload| {
                    boxed_command_future(async { Ok(CommandResult::new("OK", json!({}))) })
                }))
                .unwrap();
        }
        table
    }

    fn response(results: Vec<CommandResult>) -> String {
        ControlMessage::Response(ResponseEnvelope {
            results,
            continuation: Continuation::ContinueModel,
        })
        .to_json_string()
    }

    fn classify_last(transcript: &Transcript) -> Treatment {
        classify(&table(), transcript, transcript.len() - 1, RenderOptions::default())
    }

    #[test]
    fn continuation_marker_is_hidden_unless_debug() {
        let mut transcript = Transcript::new();
        transcript.append(Role::System, ControlMessage::Continuation.into_content());

        assert_eq!(classify_last(&transcript), Treatment::Hidden);
        let debug = RenderOptions { debug: true };
        assert_eq!(classify(&table(), &transcript, 0, debug), Treatment::Passthrough);
    }

    #[test]
    fn structured_content_with_image_is_multimodal() {
        let mut transcript = Transcript::new();
        let parts = vec![StructuredContent::text("look"), StructuredContent::image("https://a")];
        transcript.append(Role::User, parts.clone());
        assert_eq!(
            classify_last(&transcript),
            Treatment::MultiModal {
                parts,
                downloadable: false
            }
        );

        let mut text_only = Transcript::new();
        text_only.append(Role::User, vec![StructuredContent::text("just words")]);
        assert_eq!(classify_last(&text_only), Treatment::Passthrough);
    }

    #[test]
    fn response_with_visual_artifact_shows_only_the_artifacts() {
        let mut transcript = Transcript::new();
        transcript.append(Role::Agent, r#"<createAIImage>{"prompt":"fox"}</createAIImage>"#);
        transcript.append(
            Role::System,
            response(vec![
                CommandResult::new("SAVED", json!({})),
                CommandResult::new(kinds::IMAGE, json!({"imageUrl": "https://cdn/fox.png"})).terminate(),
            ])
            .as_str(),
        );
        assert_eq!(
            classify_last(&transcript),
            Treatment::MultiModal {
                parts: vec![StructuredContent::image("https://cdn/fox.png")],
                downloadable: true
            }
        );
    }

    #[test]
    fn lifecycle_notice_after_command_is_suppressed() {
        let mut transcript = Transcript::new();
        transcript.append(Role::Agent, r#"<googleSearch>{"query":"a"}</googleSearch>"#);
        transcript.append(Role::System, response(vec![CommandResult::new("SEARCH_RESULTS", json!({}))]).as_str());
        transcript.append(Role::System, ControlMessage::DispatchStarted.to_json_string().as_str());
        assert_eq!(classify(&table(), &transcript, 0, RenderOptions::default()), Treatment::CommandView);
        assert_eq!(classify(&table(), &transcript, 1, RenderOptions::default()), Treatment::Hidden);
        // Previous message is the notice itself, not a command.
        assert_eq!(classify(&table(), &transcript, 2, RenderOptions::default()), Treatment::Passthrough);
    }

    #[test]
    fn notice_from_non_system_role_is_not_suppressed() {
        let mut transcript = Transcript::new();
        transcript.append(Role::Agent, r#"<googleSearch>{"query":"a"}</googleSearch>"#);
        transcript.append(Role::User, response(vec![]).as_str());
        assert_eq!(classify_last(&transcript), Treatment::Passthrough);
    }

    #[test]
    fn unknown_tags_and_prose_pass_through() {
        let mut transcript = Transcript::new();
        transcript.append(Role::Agent, "I used <b>bold</b> and <unknownTool>x</unknownTool>.");
        assert_eq!(classify_last(&transcript), Treatment::Passthrough);
        assert_eq!(
            classify(&table(), &transcript, 7, RenderOptions::default()),
            Treatment::Passthrough
        );
    }

    #[test]
    fn classification_is_idempotent() {
        let mut transcript = Transcript::new();
        transcript.append(Role::Agent, r#"<googleSearch>{"query":"a"}</googleSearch>"#);
        transcript.append(Role::System, response(vec![]).as_str());
        let table = table();
        for position in 0..transcript.len() {
            let first = classify(&table, &transcript, position, RenderOptions::default());
            let second = classify(&table, &transcript, position, RenderOptions::default());
            assert_eq!(first, second);
        }
    }
}
