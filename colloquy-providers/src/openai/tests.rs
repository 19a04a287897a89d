use super::*;
use crate::error::HttpError;
use crate::http::{HttpClient, ResponseStream};
use bytes::Bytes;
use colloquy_core::{
    AiServiceClient, ChatCompletionClient, ChatHistory, ChatMessage, CompletionOptions, Error,
    ExecutionSettings, InferenceErrorKind, StreamAccumulator,
};
use futures::{stream, StreamExt};
use reqwest::header::HeaderMap;
use serde_json::{json, Value};
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Sets its flag when the response body it travels with is dropped
struct ReleaseGuard(Arc<AtomicBool>);

impl Drop for ReleaseGuard {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

/// Canned transport that records every request
#[derive(Default)]
struct FakeClient {
    response: Option<Value>,
    status: Option<u16>,
    chunks: Mutex<Option<Vec<Result<Bytes, HttpError>>>>,
    hang_after_chunks: bool,
    delay: Option<Duration>,
    released: Arc<AtomicBool>,
    requests: Mutex<Vec<(String, HeaderMap, Value)>>,
}

impl FakeClient {
    fn json(response: Value) -> Self {
        Self {
            response: Some(response),
            ..Default::default()
        }
    }

    fn sse(events: &[&str]) -> Self {
        let chunks = events
            .iter()
            .map(|e| Ok(Bytes::from(e.to_string())))
            .collect();
        Self::chunks(chunks)
    }

    fn chunks(chunks: Vec<Result<Bytes, HttpError>>) -> Self {
        Self {
            chunks: Mutex::new(Some(chunks)),
            ..Default::default()
        }
    }

    fn failing(status: u16) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    fn last_body(&self) -> Value {
        let requests = self.requests.lock().unwrap();
        requests.last().unwrap().2.clone()
    }

    async fn answer(&self, url: &str, headers: HeaderMap, body: Value) -> Result<(), HttpError> {
        self.requests
            .lock()
            .unwrap()
            .push((url.to_string(), headers, body));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match self.status {
            Some(status) => Err(HttpError::Status {
                status,
                retry_after: (status == 429).then(|| Duration::from_secs(3)),
                body: format!("{{\"error\":{{\"message\":\"status {}\"}}}}", status),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait::async_trait]
impl HttpClient for FakeClient {
    async fn post(&self, url: &str, headers: HeaderMap, body: Value) -> Result<Value, HttpError> {
        self.answer(url, headers, body).await?;
        Ok(self.response.clone().unwrap_or(Value::Null))
    }

    async fn post_stream(
        &self,
        url: &str,
        headers: HeaderMap,
        body: Value,
    ) -> Result<ResponseStream, HttpError> {
        self.answer(url, headers, body).await?;
        let chunks = self.chunks.lock().unwrap().take().unwrap_or_default();
        let guard = ReleaseGuard(self.released.clone());
        let body = stream::iter(chunks).map(move |chunk| {
            let _held = &guard;
            chunk
        });
        if self.hang_after_chunks {
            Ok(Box::pin(body.chain(stream::pending())))
        } else {
            Ok(Box::pin(body))
        }
    }
}

fn provider(fake: Arc<FakeClient>) -> OpenAI {
    let config = OpenAIConfig::new("sk-test")
        .with_base_url("http://fake/v1/")
        .with_model("gpt-4o");
    OpenAI::new(config, fake)
}

fn history() -> ChatHistory {
    let mut history = ChatHistory::with_system_message("Answer briefly.");
    history.add_user_message("What is 2+2?");
    history
}

fn chunk(index: u32, content: &str) -> String {
    format!(
        "data: {}\n\n",
        json!({"model": "gpt-4o", "choices": [{"index": index, "delta": {"content": content}}]})
    )
}

fn completion(content: &str) -> Value {
    json!({
        "id": "chatcmpl-1",
        "model": "gpt-4o",
        "choices": [{"index": 0, "message": {"role": "assistant", "content": content}, "finish_reason": "stop"}]
    })
}

#[tokio::test]
async fn test_complete_chat_sends_normalized_history() {
    let fake = Arc::new(FakeClient::json(completion("4")));
    let client = provider(fake.clone());

    let mut history = history();
    history.add_message(ChatMessage::tool_result("4", "call_9", "add").with_encoding("utf-8"));

    let options = CompletionOptions::new().with_user("user-7");
    let replies = client
        .complete_chat(&history, &ExecutionSettings::new(), &options)
        .await
        .unwrap();

    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].content.as_deref(), Some("4"));

    let requests = fake.requests.lock().unwrap();
    let (url, headers, body) = &requests[0];
    assert_eq!(url, "http://fake/v1/chat/completions");
    assert_eq!(headers["authorization"], "Bearer sk-test");
    assert_eq!(body["model"], json!("gpt-4o"));
    assert_eq!(body["stream"], json!(false));
    assert_eq!(body["user"], json!("user-7"));

    let messages = body["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[0], json!({"role": "system", "content": "Answer briefly."}));
    assert_eq!(messages[2]["tool_call_id"], json!("call_9"));
    assert_eq!(messages[2]["name"], json!("add"));
    assert!(messages[2].get("metadata").is_none());
    assert!(messages[2].get("encoding").is_none());
}

#[tokio::test]
async fn test_organization_header() {
    let fake = Arc::new(FakeClient::json(completion("ok")));
    let config = OpenAIConfig::new("sk-test").with_organization("org-42");
    let client = OpenAI::new(config, fake.clone());

    client
        .complete_chat(&history(), &ExecutionSettings::new(), &CompletionOptions::new())
        .await
        .unwrap();

    let requests = fake.requests.lock().unwrap();
    assert_eq!(requests[0].1["openai-organization"], "org-42");
}

#[tokio::test]
async fn test_settings_passthrough() {
    let fake = Arc::new(FakeClient::json(completion("ok")));
    let client = provider(fake.clone());

    let settings = ExecutionSettings::new()
        .with("temperature", json!(0.2))
        .with("max_tokens", json!(64));
    let options = CompletionOptions::new().with_extension("temperature", json!(0.9));

    client.complete_chat(&history(), &settings, &options).await.unwrap();

    let body = fake.last_body();
    assert_eq!(body["max_tokens"], json!(64));
    assert_eq!(body["temperature"], json!(0.9));
}

#[tokio::test]
async fn test_status_failures_map_to_kinds() {
    let cases = [
        (401, InferenceErrorKind::Authentication),
        (429, InferenceErrorKind::RateLimited),
        (504, InferenceErrorKind::Timeout),
        (422, InferenceErrorKind::Rejected),
        (500, InferenceErrorKind::Provider),
    ];

    for (status, kind) in cases {
        let client = provider(Arc::new(FakeClient::failing(status)));
        let err = client
            .complete_chat(&history(), &ExecutionSettings::new(), &CompletionOptions::new())
            .await
            .unwrap_err();
        assert_eq!(err.inference_kind(), Some(kind), "status {}", status);
    }
}

#[tokio::test]
async fn test_rate_limit_carries_retry_after() {
    let client = provider(Arc::new(FakeClient::failing(429)));
    let err = client
        .complete_chat_stream(&history(), &ExecutionSettings::new(), &CompletionOptions::new())
        .await
        .err()
        .unwrap();

    assert_eq!(err.retry_after(), Some(Duration::from_secs(3)));
    match err {
        Error::Inference { provider, source, .. } => {
            assert_eq!(provider, "openai");
            assert!(source.is_some());
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_error_object_in_body() {
    let fake = Arc::new(FakeClient::json(json!({"error": {"message": "context too long"}})));
    let err = provider(fake)
        .complete_chat(&history(), &ExecutionSettings::new(), &CompletionOptions::new())
        .await
        .unwrap_err();
    assert!(err.is_inference());
    assert!(err.to_string().contains("context too long"));
}

#[tokio::test(start_paused = true)]
async fn test_timeout_option() {
    let fake = Arc::new(FakeClient {
        response: Some(completion("late")),
        delay: Some(Duration::from_secs(30)),
        ..Default::default()
    });
    let options = CompletionOptions::new().with_timeout(Duration::from_millis(100));

    let err = provider(fake)
        .complete_chat(&history(), &ExecutionSettings::new(), &options)
        .await
        .unwrap_err();
    assert_eq!(err.inference_kind(), Some(InferenceErrorKind::Timeout));
}

#[test_log::test(tokio::test)]
async fn test_stream_yields_increments_in_order() {
    let fake = Arc::new(FakeClient::sse(&[
        ": keep-alive\n\n",
        &chunk(0, "Hel"),
        &chunk(0, "lo"),
        "data: [DONE]\n\n",
    ]));
    let client = provider(fake.clone());

    let mut stream = client
        .complete_chat_stream(&history(), &ExecutionSettings::new(), &CompletionOptions::new())
        .await
        .unwrap();

    let mut text = String::new();
    while let Some(item) = stream.next().await {
        for part in item.unwrap() {
            text.push_str(part.content.as_deref().unwrap_or_default());
        }
    }

    assert_eq!(text, "Hello");
    assert_eq!(stream.increments(), 2);
    assert!(stream.is_completed());
    assert!(fake.released.load(Ordering::SeqCst));
    assert_eq!(fake.last_body()["stream"], json!(true));
}

#[tokio::test]
async fn test_stream_events_split_across_reads() {
    let event = chunk(0, "caf\u{e9}");
    let bytes = event.as_bytes();
    // Cut inside the two-byte encoding of the accented character
    let split = event.find('\u{e9}').unwrap() + 1;
    let fake = Arc::new(FakeClient::chunks(vec![
        Ok(Bytes::copy_from_slice(&bytes[..split])),
        Ok(Bytes::copy_from_slice(&bytes[split..])),
        Ok(Bytes::from_static(b"data: [DONE]\n\n")),
    ]));

    let stream = provider(fake)
        .complete_chat_stream(&history(), &ExecutionSettings::new(), &CompletionOptions::new())
        .await
        .unwrap();
    let items: Vec<_> = stream.collect().await;

    assert_eq!(items.len(), 1);
    let parts = items.into_iter().next().unwrap().unwrap();
    assert_eq!(parts[0].content.as_deref(), Some("caf\u{e9}"));
}

#[tokio::test]
async fn test_stream_multiple_choices() {
    let both = format!(
        "data: {}\n\n",
        json!({"model": "gpt-4o", "choices": [
            {"index": 0, "delta": {"role": "assistant", "content": "Yes"}},
            {"index": 1, "delta": {"role": "assistant", "content": "No"}}
        ]})
    );
    let fake = Arc::new(FakeClient::sse(&[&both, &chunk(1, "pe"), "data: [DONE]\n\n"]));

    let mut stream = provider(fake)
        .complete_chat_stream(&history(), &ExecutionSettings::new(), &CompletionOptions::new())
        .await
        .unwrap();

    let mut accumulator = StreamAccumulator::new();
    while let Some(item) = stream.next().await {
        accumulator.push_all(item.unwrap());
    }

    assert_eq!(accumulator.content(0), Some("Yes"));
    assert_eq!(accumulator.content(1), Some("Nope"));
}

#[tokio::test]
async fn test_stream_ends_when_body_closes_without_done() {
    let fake = Arc::new(FakeClient::sse(&[&chunk(0, "a"), &chunk(0, "tail")]));

    let mut stream = provider(fake.clone())
        .complete_chat_stream(&history(), &ExecutionSettings::new(), &CompletionOptions::new())
        .await
        .unwrap();
    let mut items = Vec::new();
    while let Some(item) = stream.next().await {
        items.push(item);
    }

    assert_eq!(items.len(), 2);
    assert!(items.iter().all(Result::is_ok));
    assert!(!stream.is_completed());
    assert!(fake.released.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_stream_event_with_multiline_data() {
    let fake = Arc::new(FakeClient::sse(&[
        "data: {\"model\": \"gpt-4o\",\ndata:  \"choices\": [{\"index\": 0,\n",
        "data: \"delta\": {\"content\": \"spread out\"}}]}\n\n",
        "data: [DONE]\n\n",
    ]));

    let stream = provider(fake)
        .complete_chat_stream(&history(), &ExecutionSettings::new(), &CompletionOptions::new())
        .await
        .unwrap();
    let items: Vec<_> = stream.collect().await;

    assert_eq!(items.len(), 1);
    let parts = items.into_iter().next().unwrap().unwrap();
    assert_eq!(parts[0].content.as_deref(), Some("spread out"));
}

#[tokio::test]
async fn test_stream_failure_after_increments() {
    let fake = Arc::new(FakeClient::chunks(vec![
        Ok(Bytes::from(chunk(0, "one"))),
        Ok(Bytes::from(chunk(0, "two"))),
        Err(HttpError::Io(io::Error::new(
            io::ErrorKind::ConnectionReset,
            "connection reset",
        ))),
        Ok(Bytes::from(chunk(0, "never"))),
    ]));

    let stream = provider(fake.clone())
        .complete_chat_stream(&history(), &ExecutionSettings::new(), &CompletionOptions::new())
        .await
        .unwrap();
    let items: Vec<_> = stream.collect().await;

    assert_eq!(items.len(), 3);
    assert!(items[0].is_ok());
    assert!(items[1].is_ok());
    let err = items[2].as_ref().unwrap_err();
    assert_eq!(err.inference_kind(), Some(InferenceErrorKind::Network));
    assert!(fake.released.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_stream_malformed_chunk_ends_stream() {
    let fake = Arc::new(FakeClient::sse(&["data: {oops\n\n", &chunk(0, "after")]));

    let stream = provider(fake)
        .complete_chat_stream(&history(), &ExecutionSettings::new(), &CompletionOptions::new())
        .await
        .unwrap();
    let items: Vec<_> = stream.collect().await;

    assert_eq!(items.len(), 1);
    assert_eq!(
        items[0].as_ref().unwrap_err().inference_kind(),
        Some(InferenceErrorKind::MalformedResponse)
    );
}

#[tokio::test]
async fn test_dropping_stream_releases_connection() {
    let fake = Arc::new(FakeClient {
        chunks: Mutex::new(Some(vec![
            Ok(Bytes::from(chunk(0, "a"))),
            Ok(Bytes::from(chunk(0, "b"))),
            Ok(Bytes::from(chunk(0, "c"))),
        ])),
        hang_after_chunks: true,
        ..Default::default()
    });

    let mut stream = provider(fake.clone())
        .complete_chat_stream(&history(), &ExecutionSettings::new(), &CompletionOptions::new())
        .await
        .unwrap();

    let first = stream.next().await.unwrap().unwrap();
    assert_eq!(first[0].content.as_deref(), Some("a"));
    assert!(!fake.released.load(Ordering::SeqCst));

    drop(stream);
    assert!(fake.released.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_concurrent_calls() {
    let fake = Arc::new(FakeClient::json(completion("same")));
    let client = provider(fake.clone());
    let settings = ExecutionSettings::new();
    let options = CompletionOptions::new();

    let mut other = ChatHistory::new();
    other.add_user_message("Another question");

    let first_history = history();
    let (first, second) = futures::join!(
        client.complete_chat(&first_history, &settings, &options),
        client.complete_chat(&other, &settings, &options),
    );

    assert!(first.is_ok());
    assert!(second.is_ok());
    assert_eq!(fake.requests.lock().unwrap().len(), 2);
}

#[test]
fn test_service_identity() {
    let fake = Arc::new(FakeClient::default());
    let client = provider(fake.clone());
    assert_eq!(client.model_id(), "gpt-4o");
    assert_eq!(client.service_id(), "gpt-4o");

    let mut config = OpenAIConfig::new("sk").with_model("gpt-4o");
    config.service_id = Some("fast".into());
    let named = OpenAI::new(config, fake);
    assert_eq!(named.service_id(), "fast");
    assert_eq!(named.model_id(), "gpt-4o");
}

#[test]
fn test_response_message_type() {
    let client = provider(Arc::new(FakeClient::default()));
    assert!(client.response_message_type().is::<ChatMessage>());
}
