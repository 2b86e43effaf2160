//! Chat streaming tests.
//!
//! Real HTTP against wiremock for the request shape and transport errors;
//! the mock transport for chunking behaviour, where exact chunk boundaries
//! matter.

mod common;

use std::time::Duration;

use common::{http_client, mock_client, MockHttpConfig, EXAMPLE_STREAM, MOCK_BASE_URL};
use futures_util::StreamExt;
use qa_copilot::error::StreamError;
use qa_copilot::models::{ChatRequest, StepStatus};
use qa_copilot::sse::ChatStreamEvent;
use qa_copilot::api::spawn_chat_stream;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn stream_url() -> String {
    format!("{}/api/chat/stream", MOCK_BASE_URL)
}

fn assert_example_events(events: &[ChatStreamEvent]) {
    assert_eq!(events.len(), 4, "events: {:?}", events);
    assert_eq!(events[0], ChatStreamEvent::ThinkingStart);
    match &events[1] {
        ChatStreamEvent::ThinkingStep(step) => {
            assert_eq!(step.id, "1");
            assert_eq!(step.agent, "router");
            assert_eq!(step.status, StepStatus::InProgress);
        }
        other => panic!("Expected ThinkingStep, got {:?}", other),
    }
    assert_eq!(events[2], ChatStreamEvent::Content("Hello".to_string()));
    match &events[3] {
        ChatStreamEvent::Done(envelope) => {
            assert_eq!(envelope.content, "Hello");
            assert_eq!(envelope.correlation_id, "abc");
            assert_eq!(
                envelope.metadata.get("conversation_id"),
                Some(&serde_json::json!("c1"))
            );
        }
        other => panic!("Expected Done, got {:?}", other),
    }
}

async fn collect_chunks(chunks: Vec<Vec<u8>>) -> Vec<ChatStreamEvent> {
    let mock = MockHttpConfig::new().with_stream(&stream_url(), chunks).build();
    mock_client(&mock)
        .stream_chat(&ChatRequest::new("hi"), CancellationToken::new())
        .collect()
        .await
}

#[tokio::test]
async fn test_example_stream_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat/stream"))
        .and(header("Accept", "text/event-stream"))
        .and(header("X-Correlation-ID", "abc"))
        .and(header("X-Conversation-ID", "c1"))
        .and(body_partial_json(serde_json::json!({
            "messages": [{"role": "user", "content": "Plan FI regression"}],
            "correlation_id": "abc"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_raw(EXAMPLE_STREAM, "text/event-stream"))
        .expect(1)
        .mount(&server)
        .await;

    let request = ChatRequest::new("Plan FI regression")
        .with_conversation("c1")
        .with_correlation_id("abc");
    let events: Vec<_> = http_client(&server.uri())
        .stream_chat(&request, CancellationToken::new())
        .collect()
        .await;

    assert_example_events(&events);
}

#[tokio::test]
async fn test_server_error_is_single_terminal_event() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat/stream"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let events: Vec<_> = http_client(&server.uri())
        .stream_chat(&ChatRequest::new("hi"), CancellationToken::new())
        .collect()
        .await;

    assert_eq!(events.len(), 1);
    match &events[0] {
        ChatStreamEvent::Error(StreamError::HttpStatus { status, message }) => {
            assert_eq!(*status, 503);
            assert_eq!(message, "maintenance");
        }
        other => panic!("Expected HttpStatus, got {:?}", other),
    }
}

#[tokio::test]
async fn test_backend_error_event_ends_stream() {
    let server = MockServer::start().await;
    let body = concat!(
        "event: content\ndata: {\"content\":\"Checking\"}\n\n",
        "event: error\ndata: {\"message\":\"Workspace ws-9 not found\",\"code\":404}\n\n",
        "event: content\ndata: {\"content\":\"ignored\"}\n\n",
    );
    Mock::given(method("POST"))
        .and(path("/api/chat/stream"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .mount(&server)
        .await;

    let events: Vec<_> = http_client(&server.uri())
        .stream_chat(&ChatRequest::new("hi"), CancellationToken::new())
        .collect()
        .await;

    assert_eq!(
        events,
        vec![
            ChatStreamEvent::Content("Checking".to_string()),
            ChatStreamEvent::Error(StreamError::BackendError {
                code: Some("404".to_string()),
                message: "Workspace ws-9 not found".to_string(),
            }),
        ]
    );
}

#[tokio::test]
async fn test_connection_refused() {
    // Nothing listens on port 9 (discard) in the test environment.
    let events: Vec<_> = http_client("http://127.0.0.1:9")
        .stream_chat(&ChatRequest::new("hi"), CancellationToken::new())
        .collect()
        .await;

    assert_eq!(events.len(), 1);
    assert!(matches!(
        events[0],
        ChatStreamEvent::Error(StreamError::ConnectionFailed { .. })
    ));
}

#[tokio::test]
async fn test_cancel_during_slow_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat/stream"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(EXAMPLE_STREAM, "text/event-stream")
                .set_delay(Duration::from_secs(10)),
        )
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    let canceller = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        canceller.cancel();
    });

    let events: Vec<_> = tokio::time::timeout(
        Duration::from_secs(5),
        http_client(&server.uri())
            .stream_chat(&ChatRequest::new("hi"), cancel)
            .collect(),
    )
    .await
    .expect("cancellation should end the stream promptly");

    assert_eq!(events, vec![ChatStreamEvent::Error(StreamError::Cancelled)]);
}

#[tokio::test]
async fn test_single_chunk() {
    assert_example_events(&collect_chunks(vec![EXAMPLE_STREAM.as_bytes().to_vec()]).await);
}

#[tokio::test]
async fn test_byte_by_byte_chunks() {
    let chunks = EXAMPLE_STREAM.bytes().map(|b| vec![b]).collect();
    assert_example_events(&collect_chunks(chunks).await);
}

#[tokio::test]
async fn test_chunking_invariance_with_multibyte_text() {
    let stream = concat!(
        "event: content\n",
        "data: {\"content\":\"Prüfung läuft – 完了 ✓\"}\n",
        "\n",
        "event: done\n",
        "data: {\"correlation_id\":\"x\"}\n",
        "\n",
    )
    .as_bytes();

    let whole = collect_chunks(vec![stream.to_vec()]).await;
    assert_eq!(whole.len(), 2);

    for size in [1, 2, 3, 5, 7, 11] {
        let chunks = stream.chunks(size).map(<[u8]>::to_vec).collect();
        assert_eq!(collect_chunks(chunks).await, whole, "chunk size {}", size);
    }
}

#[tokio::test]
async fn test_payload_split_across_data_lines() {
    let stream = concat!(
        "event: content\n",
        "data: {\"content\":\n",
        "data: \"joined\"}\n",
        "\n",
    );
    let events = collect_chunks(vec![stream.as_bytes().to_vec()]).await;
    assert_eq!(events, vec![ChatStreamEvent::Content("joined".to_string())]);
}

#[tokio::test]
async fn test_done_sentinel_is_inert() {
    let events = collect_chunks(vec![b"data: [DONE]\n\n".to_vec()]).await;
    assert!(events.is_empty());
}

#[tokio::test]
async fn test_channel_variant_matches_stream() {
    let mock = MockHttpConfig::new()
        .with_stream(&stream_url(), vec![EXAMPLE_STREAM.as_bytes().to_vec()])
        .build();

    let mut rx = spawn_chat_stream(
        &mock_client(&mock),
        &ChatRequest::new("hi"),
        CancellationToken::new(),
    );
    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }

    assert_example_events(&events);
}
