use std::sync::Arc;

use axum::extract::{Query, RawQuery, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::agent::TurnSummary;
use crate::message::{MessageContent, RawMessage, Role};
use crate::render::{render_transcript, ComrakRenderer, RenderOptions, RenderedMessage};
use crate::server::error::{ApiError, ApiErrorResponse};
use crate::server::ServerState;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostMessageRequest {
    pub conversation_id: String,
    #[serde(default = "default_role")]
    pub role: Role,
    pub content: MessageContent,
}

fn default_role() -> Role {
    Role::User
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct ConversationQuery {
    pub conversation_id: String,
    /// `debug`, `debug=1` or `debug=true` shows every message raw.
    pub debug: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RenderResponse {
    pub conversation_id: String,
    pub debug: bool,
    pub messages: Vec<RenderedMessage>,
}

#[utoipa::path(
    post,
    path = "/conversations/messages",
    tag = "conversations",
    request_body = PostMessageRequest,
    responses(
        (status = 200, description = "Turn completed", body = TurnSummary),
        (status = 400, body = ApiErrorResponse),
        (status = 502, body = ApiErrorResponse),
    ),
    description = "Append a message and run dispatch cycles until the turn settles."
)]
#[tracing::instrument(skip_all)]
pub(crate) async fn post_message(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<PostMessageRequest>,
) -> Result<Json<TurnSummary>, ApiError> {
    if request.conversation_id.trim().is_empty() {
        return Err(ApiError::bad_request("conversationId must not be empty"));
    }
    let summary = state
        .agent
        .handle_inbound(&request.conversation_id, request.role, request.content)
        .await?;
    Ok(Json(summary))
}

#[utoipa::path(
    get,
    path = "/conversations/transcript",
    tag = "conversations",
    params(ConversationQuery),
    responses(
        (status = 200, description = "Raw transcript", body = [RawMessage]),
        (status = 404, body = ApiErrorResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub(crate) async fn transcript(
    State(state): State<Arc<ServerState>>,
    Query(params): Query<ConversationQuery>,
) -> Result<Json<Vec<RawMessage>>, ApiError> {
    let transcript = state
        .agent
        .store()
        .transcript(&params.conversation_id)
        .await
        .ok_or_else(|| ApiError::not_found(format!("unknown conversation: {}", params.conversation_id)))?;
    Ok(Json(transcript.messages().to_vec()))
}

#[utoipa::path(
    get,
    path = "/conversations/render",
    tag = "conversations",
    params(ConversationQuery),
    responses(
        (status = 200, description = "Display view of every message", body = RenderResponse),
        (status = 404, body = ApiErrorResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub(crate) async fn render(
    State(state): State<Arc<ServerState>>,
    Query(params): Query<ConversationQuery>,
    RawQuery(raw): RawQuery,
) -> Result<Json<RenderResponse>, ApiError> {
    let transcript = state
        .agent
        .store()
        .transcript(&params.conversation_id)
        .await
        .ok_or_else(|| ApiError::not_found(format!("unknown conversation: {}", params.conversation_id)))?;

    let mut options = RenderOptions::from_query(raw.as_deref().unwrap_or_default());
    options.debug |= state.config.debug_render;
    let messages = render_transcript(state.agent.table(), &transcript, options, &ComrakRenderer);

    Ok(Json(RenderResponse {
        conversation_id: params.conversation_id,
        debug: options.debug,
        messages,
    }))
}
