use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{json, Value};

use super::*;
use crate::capabilities::{
    ImageGenerator, ImageOptions, Item, Messenger, PageReader, SearchHit, WebSearch,
};
use crate::dispatch::{CommandExecutor, CycleOutcome, EnvelopeBody};
use crate::message::StructuredContent;
use crate::protocol::{kinds, CommandResult, Continuation};
use crate::utils::time::now_millis;

struct FakeSearch;

#[async_trait::async_trait]
impl WebSearch for FakeSearch {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, CollaboratorError> {
        if query == "fail" {
            return Err(CollaboratorError::Unavailable("search quota exceeded".to_string()));
        }
        Ok((0..limit.min(2))
            .map(|i| SearchHit {
                title: format!("{query} {i}"),
                link: format!("https://example.com/{i}"),
                snippet: "snippet".to_string(),
            })
            .collect())
    }
}

struct SlowPages;

#[async_trait::async_trait]
impl PageReader for SlowPages {
    async fn page_to_text(&self, _url: &str) -> Result<String, CollaboratorError> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok("too late".to_string())
    }
}

struct FakeImages;

#[async_trait::async_trait]
impl ImageGenerator for FakeImages {
    async fn generate(&self, _prompt: &str, _options: &ImageOptions) -> Result<Vec<String>, CollaboratorError> {
        Ok(vec!["aGVsbG8=".to_string()])
    }
}

#[derive(Default)]
struct RecordingMessenger {
    sent: Mutex<Vec<(String, String)>>,
}

#[async_trait::async_trait]
impl Messenger for RecordingMessenger {
    async fn send_message(&self, chat_id: &str, text: &str) -> Result<(), CollaboratorError> {
        self.sent.lock().unwrap().push((chat_id.to_string(), text.to_string()));
        Ok(())
    }

    async fn send_photo(&self, chat_id: &str, photo_url: &str, _caption: Option<&str>) -> Result<(), CollaboratorError> {
        self.sent.lock().unwrap().push((chat_id.to_string(), photo_url.to_string()));
        Ok(())
    }
}

struct Harness {
    executor: CommandExecutor,
    capabilities: Capabilities,
    messenger: Arc<RecordingMessenger>,
}

fn harness(config: AgentConfig) -> Harness {
    let messenger = Arc::new(RecordingMessenger::default());
    let mut capabilities = Capabilities::in_memory();
    capabilities.search = Arc::new(FakeSearch);
    capabilities.pages = Arc::new(SlowPages);
    capabilities.images = Arc::new(FakeImages);
    capabilities.messenger = messenger.clone();

    let mut table = CommandTable::new();
    register_builtins(&mut table, capabilities.clone(), &config).expect("register builtins");
    Harness {
        executor: CommandExecutor::new(Arc::new(table)),
        capabilities,
        messenger,
    }
}

async fn run_one(harness: &Harness, text: &str) -> CommandResult {
    let mut results = harness.executor.execute(text).await.expect("execute");
    assert_eq!(results.len(), 1, "expected one result for {text}");
    results.remove(0)
}

#[test]
fn every_builtin_is_registered_once() {
    let harness = harness(AgentConfig::default());
    let table = harness.executor.table();
    for name in [
        "setMemory",
        "deleteItem",
        "cleanupMemory",
        "googleSearch",
        "webpageToText",
        "viewImage",
        "createAIImage",
        "scheduleTask",
        "getScheduledTasks",
        "deleteScheduledTask",
        "searchKnowledge",
        "sendToTelegram",
        "sendPhotoToTelegram",
    ] {
        assert!(table.is_known(name), "{name} not registered");
        assert!(table.icon(name).is_some(), "{name} has no icon");
    }
    assert_eq!(table.len(), 13);
}

#[tokio::test]
async fn set_memory_upserts_and_applies_default_expiry() {
    let config = AgentConfig {
        memory_expiration_minutes: Some(10),
        ..AgentConfig::default()
    };
    let harness = harness(config);

    let before = now_millis();
    let result = run_one(
        &harness,
        r#"<setMemory>{"itemId":"memory_x","value":"hi"}</setMemory>"#,
    )
    .await;
    assert_eq!(result.kind, kinds::MEMORY_SAVED);
    assert_eq!(result.continuation, Continuation::ContinueModel);

    let stored = harness.capabilities.items.get("memory_x").await.unwrap().unwrap();
    assert_eq!(stored.value, json!("hi"));
    let expires_at = stored.expires_at.expect("default expiry");
    assert!(expires_at >= before + 600_000);

    run_one(&harness, r#"<setMemory>{"itemId":"memory_x","value":2}</setMemory>"#).await;
    let stored = harness.capabilities.items.get("memory_x").await.unwrap().unwrap();
    assert_eq!(stored.value, json!(2));
}

#[tokio::test]
async fn set_memory_rejects_foreign_keys() {
    let harness = harness(AgentConfig::default());
    let result = run_one(&harness, r#"<setMemory>{"itemId":"task_x","value":"hi"}</setMemory>"#).await;
    assert!(result.is_error());
    assert!(result.data["message"].as_str().unwrap().contains("memory_"));
    assert!(harness.capabilities.items.get("task_x").await.unwrap().is_none());
}

#[tokio::test]
async fn oversized_minutes_are_rejected_instead_of_overflowing() {
    let harness = harness(AgentConfig::default());

    let memory = run_one(
        &harness,
        r#"<setMemory>{"itemId":"memory_x","value":"hi","expirationInMinutes":18446744073709551615}</setMemory>"#,
    )
    .await;
    assert!(memory.is_error());
    let message = memory.data["message"].as_str().unwrap();
    assert!(message.contains("expirationInMinutes"), "{message}");
    assert!(!message.contains("panicked"), "{message}");
    assert!(harness.capabilities.items.get("memory_x").await.unwrap().is_none());

    let task = run_one(
        &harness,
        r#"<scheduleTask>{"message":"later","delayMinutes":18446744073709551615}</scheduleTask>"#,
    )
    .await;
    assert!(task.is_error());
    let message = task.data["message"].as_str().unwrap();
    assert!(message.contains("delayMinutes"), "{message}");
    assert!(!message.contains("panicked"), "{message}");
    assert!(harness.capabilities.scheduler.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn cleanup_removes_only_expired_memory() {
    let harness = harness(AgentConfig::default());
    let items = &harness.capabilities.items;
    let mut expired = Item::new("memory_old", json!(1));
    expired.expires_at = Some(1);
    items.create(expired).await.unwrap();
    items.create(Item::new("memory_keep", json!(2))).await.unwrap();
    let mut other = Item::new("task_old", json!(3));
    other.expires_at = Some(1);
    items.create(other).await.unwrap();

    let result = run_one(&harness, "<cleanupMemory/>").await;
    assert_eq!(result.kind, kinds::MEMORY_CLEANED);
    assert_eq!(result.data["deleted"], json!(1));
    assert!(items.get("memory_old").await.unwrap().is_none());
    assert!(items.get("memory_keep").await.unwrap().is_some());
    assert!(items.get("task_old").await.unwrap().is_some());
}

#[tokio::test]
async fn delete_item_reports_whether_it_existed() {
    let harness = harness(AgentConfig::default());
    harness
        .capabilities
        .items
        .create(Item::new("memory_a", json!(1)))
        .await
        .unwrap();
    let first = run_one(&harness, r#"<deleteItem>{"itemId":"memory_a"}</deleteItem>"#).await;
    assert_eq!(first.data["deleted"], json!(true));
    let second = run_one(&harness, "<deleteItem>memory_a</deleteItem>").await;
    assert_eq!(second.data["deleted"], json!(false));
}

#[tokio::test]
async fn search_failure_becomes_error_result() {
    let harness = harness(AgentConfig::default());
    let ok = run_one(&harness, r#"<googleSearch>{"query":"rust","limit":1}</googleSearch>"#).await;
    assert_eq!(ok.kind, kinds::SEARCH_RESULTS);
    assert_eq!(ok.data["results"].as_array().unwrap().len(), 1);

    let failed = run_one(&harness, r#"<googleSearch>{"query":"fail"}</googleSearch>"#).await;
    assert!(failed.is_error());
    assert!(failed.data["message"].as_str().unwrap().contains("quota"));
}

#[tokio::test]
async fn slow_collaborator_times_out() {
    let config = AgentConfig {
        handler_timeout_secs: 0,
        ..AgentConfig::default()
    };
    let harness = harness(config);
    let result = run_one(&harness, "<webpageToText>https://example.com</webpageToText>").await;
    assert!(result.is_error());
    assert!(result.data["message"].as_str().unwrap().contains("timed out"));
}

#[tokio::test]
async fn webpage_requires_http_url() {
    let harness = harness(AgentConfig::default());
    let result = run_one(&harness, r#"<webpageToText>{"url":"ftp://x"}</webpageToText>"#).await;
    assert!(result.is_error());
}

#[tokio::test]
async fn view_image_feeds_images_back_as_structured_content() {
    let harness = harness(AgentConfig::default());
    let outcome = harness
        .executor
        .run_cycle(r#"<viewImage>{"urls":["https://a/1.png","https://a/2.png"]}</viewImage>"#)
        .await
        .unwrap();
    let CycleOutcome::Responded(envelope) = outcome else {
        panic!("expected an envelope");
    };
    assert_eq!(envelope.continuation, Continuation::ContinueModel);
    let EnvelopeBody::Structured(parts) = envelope.body else {
        panic!("expected structured envelope");
    };
    assert_eq!(parts.len(), 4);
    assert_eq!(parts[2], StructuredContent::image("https://a/2.png"));
    let summary = crate::protocol::ResponseEnvelope::from_structured(&parts).expect("result summary");
    assert_eq!(summary.results[0].kind, kinds::IMAGE_VIEW);
    assert_eq!(summary.results[0].data, json!({"inlineImages": 2}));
}

#[tokio::test]
async fn create_image_uploads_and_terminates() {
    let harness = harness(AgentConfig::default());
    let result = run_one(&harness, "<createAIImage>a red fox</createAIImage>").await;
    assert_eq!(result.kind, kinds::IMAGE);
    assert_eq!(result.continuation, Continuation::Terminate);
    assert_eq!(result.data["prompt"], "a red fox");
    assert_eq!(result.artifact_url(), Some("data:image/png;base64,aGVsbG8="));
}

#[tokio::test]
async fn schedule_list_and_delete_tasks() {
    let harness = harness(AgentConfig::default());
    let scheduled = run_one(
        &harness,
        r#"<scheduleTask>{"message":"stand up","delayMinutes":5}</scheduleTask>"#,
    )
    .await;
    assert_eq!(scheduled.kind, kinds::TASK_SCHEDULED);
    let timestamp = scheduled.data["timestamp"].as_u64().unwrap();

    let listed = run_one(&harness, "<getScheduledTasks />").await;
    assert_eq!(listed.data["count"], json!(1));
    assert_eq!(listed.data["tasks"][0]["message"], "stand up");

    let deleted = run_one(
        &harness,
        &format!(r#"<deleteScheduledTask>{{"timestamp":{timestamp}}}</deleteScheduledTask>"#),
    )
    .await;
    assert_eq!(deleted.kind, kinds::TASK_DELETED);
    assert_eq!(deleted.data["deleted"], json!(true));
}

#[tokio::test]
async fn knowledge_search_ranks_matches() {
    let harness = harness(AgentConfig::default());
    let vectors = &harness.capabilities.vectors;
    vectors.upsert("doc1", "refund policy for orders", json!({})).await.unwrap();
    vectors.upsert("doc2", "shipping times", json!({})).await.unwrap();

    let result = run_one(&harness, r#"<searchKnowledge>{"query":"refund","topK":3}</searchKnowledge>"#).await;
    assert_eq!(result.kind, kinds::KNOWLEDGE_MATCHES);
    let matches = result.data["matches"].as_array().unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0]["id"], "doc1");
}

#[tokio::test]
async fn telegram_uses_configured_default_chat() {
    let config = AgentConfig {
        telegram_chat_id: Some("100".to_string()),
        ..AgentConfig::default()
    };
    let harness = harness(config);

    let sent = run_one(&harness, "<sendToTelegram>hello there</sendToTelegram>").await;
    assert_eq!(sent.kind, kinds::MESSAGE_SENT);
    assert_eq!(sent.continuation, Continuation::Terminate);

    let photo = run_one(
        &harness,
        r#"<sendPhotoToTelegram>{"photoUrl":"https://a/p.png","chatId":7}</sendPhotoToTelegram>"#,
    )
    .await;
    assert_eq!(photo.data["chatId"], Value::from("7"));

    let sent = harness.messenger.sent.lock().unwrap().clone();
    assert_eq!(
        sent,
        vec![
            ("100".to_string(), "hello there".to_string()),
            ("7".to_string(), "https://a/p.png".to_string()),
        ]
    );
}

#[tokio::test]
async fn telegram_without_any_chat_is_invalid() {
    let harness = harness(AgentConfig::default());
    let result = run_one(&harness, r#"<sendToTelegram>{"text":"hi"}</sendToTelegram>"#).await;
    assert!(result.is_error());
    assert!(harness.messenger.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn unconfigured_collaborators_report_unavailable() {
    let mut table = CommandTable::new();
    register_builtins(&mut table, Capabilities::in_memory(), &AgentConfig::default()).unwrap();
    let executor = CommandExecutor::new(Arc::new(table));
    let results = executor
        .execute(r#"<googleSearch>{"query":"x"}</googleSearch>"#)
        .await
        .unwrap();
    assert!(results[0].data["message"].as_str().unwrap().contains("not configured"));
}
