use utoipa::OpenApi;

use crate::agent::TurnSummary;
use crate::message::{MessageContent, RawMessage, Role, StructuredContent};
use crate::protocol::{CommandResult, Continuation, ResponseEnvelope};
use crate::render::{Indicator, IndicatorState, MessageView, RenderedMessage, Segment};
use crate::server::conversations::{PostMessageRequest, RenderResponse};
use crate::server::error::{ApiErrorBody, ApiErrorResponse, ErrorCode};
use crate::server::webhook::WebhookAck;
use crate::webhook::{InboundEvent, TelegramChat, TelegramMessage, TelegramUpdate, TelegramUser};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Agentwire API",
        version = "0.1.0",
        description = "Command dispatch and transcript rendering for chat agents"
    ),
    paths(
        crate::server::webhook::telegram,
        crate::server::conversations::post_message,
        crate::server::conversations::transcript,
        crate::server::conversations::render,
    ),
    components(schemas(
        // Error
        ApiErrorResponse,
        ApiErrorBody,
        ErrorCode,
        // Messages
        Role,
        RawMessage,
        MessageContent,
        StructuredContent,
        // Dispatch
        CommandResult,
        Continuation,
        ResponseEnvelope,
        TurnSummary,
        PostMessageRequest,
        // Rendering
        RenderResponse,
        RenderedMessage,
        MessageView,
        Segment,
        Indicator,
        IndicatorState,
        // Webhooks
        WebhookAck,
        InboundEvent,
        TelegramUpdate,
        TelegramMessage,
        TelegramUser,
        TelegramChat,
    )),
    tags(
        (name = "conversations", description = "Conversation turns and rendering"),
        (name = "webhooks", description = "Third-party bot ingest"),
    )
)]
pub struct ApiDoc;
