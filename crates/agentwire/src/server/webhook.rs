use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use crate::server::error::{ApiError, ApiErrorResponse};
use crate::server::ServerState;
use crate::webhook::{normalize_telegram, verify_secret, TelegramUpdate, TELEGRAM_SECRET_HEADER};

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WebhookAck {
    pub ok: bool,
    /// Whether the update produced a conversation message.
    pub accepted: bool,
    pub conversation_id: Option<String>,
}

#[utoipa::path(
    post,
    path = "/webhooks/telegram",
    tag = "webhooks",
    request_body = TelegramUpdate,
    responses(
        (status = 200, description = "Update acknowledged", body = WebhookAck),
        (status = 401, body = ApiErrorResponse),
    ),
    description = "Ingest a Telegram bot update. Text updates are fed to the agent in the background."
)]
#[tracing::instrument(skip_all)]
pub(crate) async fn telegram(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    Json(update): Json<TelegramUpdate>,
) -> Result<Json<WebhookAck>, ApiError> {
    let provided = headers
        .get(TELEGRAM_SECRET_HEADER)
        .and_then(|value| value.to_str().ok());
    verify_secret(state.config.webhook_secret.as_deref(), provided)?;

    let update_id = update.update_id;
    let Some(event) = normalize_telegram(update) else {
        tracing::debug!(update_id, "ignoring update without text");
        return Ok(Json(WebhookAck {
            ok: true,
            accepted: false,
            conversation_id: None,
        }));
    };

    let conversation_id = event.conversation_id();
    let (role, content) = event.into_message();
    let agent = state.agent.clone();
    let id = conversation_id.clone();
    tokio::spawn(async move {
        if let Err(error) = agent.handle_inbound(&id, role, content).await {
            tracing::warn!(conversation_id = %id, error = %error, "webhook turn failed");
        }
    });

    Ok(Json(WebhookAck {
        ok: true,
        accepted: true,
        conversation_id: Some(conversation_id),
    }))
}
