//! Chat: the streaming driver and the non-streaming call.
//!
//! The driver opens `POST /api/chat/stream`, pulls body chunks and feeds
//! them through a [`StreamSession`]. Every exit path ends the stream:
//! `Done`, a terminal `Error`, the body ending, cancellation, or the consumer
//! dropping the stream. The body is dropped (and the connection released)
//! as soon as the session terminates.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures::stream::{self, BoxStream};
use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::{
    decode_json, new_correlation_id, CopilotClient, Method, HEADER_CONVERSATION_ID,
    HEADER_CORRELATION_ID,
};
use crate::error::{CopilotResult, StreamError};
use crate::models::{ChatRequest, ChatResponseEnvelope};
use crate::sse::{ChatStreamEvent, StreamSession};
use crate::traits::{ByteStream, Headers, HttpClient, HttpError};

const CHAT_PATH: &str = "/api/chat";
const CHAT_STREAM_PATH: &str = "/api/chat/stream";

impl CopilotClient {
    /// Send a chat turn and wait for the complete answer.
    pub async fn send_chat(&self, request: &ChatRequest) -> CopilotResult<ChatResponseEnvelope> {
        let (correlation_id, body) = prepare_request(request)?;
        let mut extra = Headers::new();
        if let Some(conversation_id) = &request.conversation_id {
            extra.insert(HEADER_CONVERSATION_ID.to_string(), conversation_id.clone());
        }

        let response = self
            .request_with(
                Method::Post,
                CHAT_PATH,
                Some(body),
                "send_chat",
                correlation_id.clone(),
                extra,
            )
            .await?;

        let payload: serde_json::Value = decode_json(&response, "send_chat")?;
        Ok(ChatResponseEnvelope::from_payload(
            &payload,
            None,
            Some(&correlation_id),
        ))
    }

    /// Stream a chat turn as typed events.
    ///
    /// The request is only sent once the stream is first polled. The
    /// stream yields at most one terminal event (`Done` or `Error`) and ends
    /// right after it. Cancelling `cancel` yields `Error(Cancelled)`.
    pub fn stream_chat(
        &self,
        request: &ChatRequest,
        cancel: CancellationToken,
    ) -> BoxStream<'static, ChatStreamEvent> {
        let (correlation_id, body) = match prepare_request(request) {
            Ok(prepared) => prepared,
            Err(e) => {
                let event = ChatStreamEvent::Error(StreamError::ConnectionFailed {
                    message: e.to_string(),
                });
                return stream::once(async move { event }).boxed();
            }
        };

        let mut headers = Headers::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        headers.insert("Accept".to_string(), "text/event-stream".to_string());
        headers.insert(HEADER_CORRELATION_ID.to_string(), correlation_id.clone());
        if let Some(conversation_id) = &request.conversation_id {
            headers.insert(HEADER_CONVERSATION_ID.to_string(), conversation_id.clone());
        }

        let driver = StreamDriver {
            state: DriverState::Connecting {
                http: Arc::clone(&self.http),
                url: self.url(CHAT_STREAM_PATH),
                body,
                headers,
            },
            session: StreamSession::with_max_line_bytes(
                correlation_id,
                self.config.max_line_bytes,
            ),
            pending: VecDeque::new(),
            cancel,
            idle_timeout: self.config.stream_idle_timeout,
        };

        stream::unfold(driver, |mut driver| async move {
            driver.next_event().await.map(|event| (event, driver))
        })
        .boxed()
    }
}

/// Run a chat stream on a spawned task and deliver its events on a channel.
///
/// The channel closes after the last event. Dropping the receiver stops the
/// task and releases the connection.
pub fn spawn_chat_stream(
    client: &CopilotClient,
    request: &ChatRequest,
    cancel: CancellationToken,
) -> mpsc::UnboundedReceiver<ChatStreamEvent> {
    let (tx, rx) = mpsc::unbounded_channel();
    let mut events = client.stream_chat(request, cancel);

    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = tx.closed() => {
                    tracing::debug!("Chat stream receiver dropped");
                    break;
                }
                event = events.next() => match event {
                    Some(event) => {
                        if tx.send(event).is_err() {
                            break;
                        }
                    }
                    None => break,
                },
            }
        }
    });

    rx
}

/// Fill in the correlation id and serialize the body.
fn prepare_request(request: &ChatRequest) -> CopilotResult<(String, String)> {
    let correlation_id = request
        .correlation_id
        .clone()
        .unwrap_or_else(new_correlation_id);
    let mut outbound = request.clone();
    outbound.correlation_id = Some(correlation_id.clone());
    let body = serde_json::to_string(&outbound)?;
    Ok((correlation_id, body))
}

enum DriverState {
    Connecting {
        http: Arc<dyn HttpClient>,
        url: String,
        body: String,
        headers: Headers,
    },
    Reading {
        body: ByteStream,
    },
    Finished,
}

enum Chunk {
    Data(Bytes),
    End,
    Failed(HttpError),
    Idle(Duration),
    Cancelled,
}

struct StreamDriver {
    state: DriverState,
    session: StreamSession,
    pending: VecDeque<ChatStreamEvent>,
    cancel: CancellationToken,
    idle_timeout: Option<Duration>,
}

impl StreamDriver {
    async fn next_event(&mut self) -> Option<ChatStreamEvent> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Some(event);
            }

            match std::mem::replace(&mut self.state, DriverState::Finished) {
                DriverState::Finished => return None,
                DriverState::Connecting {
                    http,
                    url,
                    body,
                    headers,
                } => self.connect(http, url, body, headers).await,
                DriverState::Reading { body } => self.read(body).await,
            }
        }
    }

    async fn connect(
        &mut self,
        http: Arc<dyn HttpClient>,
        url: String,
        body: String,
        headers: Headers,
    ) {
        tracing::info!(
            correlation_id = %self.session.correlation_id(),
            %url,
            "Opening chat stream"
        );

        let opened = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(StreamError::Cancelled),
            result = http.post_stream(&url, &body, &headers) => result.map_err(StreamError::from),
        };

        match opened {
            Ok(body) => self.state = DriverState::Reading { body },
            Err(e) => self.pending.extend(self.session.fail(e)),
        }
    }

    async fn read(&mut self, mut body: ByteStream) {
        let chunk = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Chunk::Cancelled,
            chunk = next_chunk(&mut body, self.idle_timeout) => chunk,
        };

        match chunk {
            Chunk::Data(bytes) => {
                self.pending.extend(self.session.feed(&bytes));
                if !self.session.is_terminated() {
                    self.state = DriverState::Reading { body };
                }
            }
            Chunk::End => self.pending.extend(self.session.finish()),
            Chunk::Failed(e) => {
                let message = e.to_string();
                self.pending
                    .extend(self.session.fail(StreamError::ConnectionLost { message }));
            }
            Chunk::Idle(timeout) => {
                let idle_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
                self.pending
                    .extend(self.session.fail(StreamError::Timeout { idle_ms }));
            }
            Chunk::Cancelled => self.pending.extend(self.session.fail(StreamError::Cancelled)),
        }
    }
}

async fn next_chunk(body: &mut ByteStream, idle_timeout: Option<Duration>) -> Chunk {
    let item = match idle_timeout {
        Some(timeout) => match tokio::time::timeout(timeout, body.next()).await {
            Ok(item) => item,
            Err(_) => return Chunk::Idle(timeout),
        },
        None => body.next().await,
    };

    match item {
        Some(Ok(bytes)) => Chunk::Data(bytes),
        Some(Err(e)) => Chunk::Failed(e),
        None => Chunk::End,
    }
}
