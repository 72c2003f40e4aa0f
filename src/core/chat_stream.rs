use futures_util::StreamExt;
use memchr::memchr;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::api::{ChatChunk, ChatRequest};
use crate::core::message::Message;

#[derive(Clone, Debug)]
pub enum StreamMessage {
    Chunk(String),
    Error(String),
    End,
}

/// Handle one NDJSON line. Returns true once the stream is finished.
fn process_ndjson_line(
    line: &str,
    tx: &mpsc::UnboundedSender<(StreamMessage, u64)>,
    stream_id: u64,
) -> bool {
    if line.is_empty() {
        return false;
    }

    let chunk = match serde_json::from_str::<ChatChunk>(line) {
        Ok(chunk) => chunk,
        Err(err) => {
            tracing::debug!("Skipping undecodable stream line: {err}");
            return false;
        }
    };

    if chunk.error.is_some() {
        let _ = tx.send((StreamMessage::Error(format_api_error(line)), stream_id));
        let _ = tx.send((StreamMessage::End, stream_id));
        return true;
    }

    if let Some(message) = chunk.message {
        if !message.content.is_empty() {
            let _ = tx.send((StreamMessage::Chunk(message.content), stream_id));
        }
    }

    if chunk.done {
        let _ = tx.send((StreamMessage::End, stream_id));
        return true;
    }
    false
}

fn extract_error_summary(value: &serde_json::Value) -> Option<String> {
    let summary = value
        .pointer("/error/message")
        .and_then(|v| v.as_str())
        .map(str::to_owned)
        .or_else(|| {
            value.get("error").and_then(|v| match v {
                serde_json::Value::String(s) => Some(s.to_string()),
                serde_json::Value::Object(map) => map
                    .get("message")
                    .and_then(|message| message.as_str().map(str::to_owned)),
                _ => None,
            })
        });

    summary.map(|text| text.split_whitespace().collect::<Vec<_>>().join(" "))
}

pub fn format_api_error(error_text: &str) -> String {
    let trimmed = error_text.trim();

    if trimmed.is_empty() {
        return "API Error: <empty response>".to_string();
    }

    if let Ok(json_value) = serde_json::from_str::<serde_json::Value>(trimmed) {
        if let Some(summary) = extract_error_summary(&json_value) {
            if !summary.is_empty() {
                return format!("API Error: {summary}");
            }
        }
        if let Ok(compact) = serde_json::to_string(&json_value) {
            return format!("API Error: {compact}");
        }
    }

    format!("API Error: {trimmed}")
}

pub struct StreamParams {
    pub client: reqwest::Client,
    pub api_url: String,
    pub model: String,
    pub messages: Vec<Message>,
    pub cancel_token: CancellationToken,
    pub stream_id: u64,
}

/// Runs chat requests in the background and forwards reply fragments
/// over a channel, tagged with the id of the request that produced them.
#[derive(Clone)]
pub struct ChatStreamService {
    tx: mpsc::UnboundedSender<(StreamMessage, u64)>,
}

impl ChatStreamService {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<(StreamMessage, u64)>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn spawn_stream(&self, params: StreamParams) {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let StreamParams {
                client,
                api_url,
                model,
                messages,
                cancel_token,
                stream_id,
            } = params;

            tokio::select! {
                _ = run_stream(&client, &api_url, &model, &messages, &cancel_token, &tx, stream_id) => {}
                _ = cancel_token.cancelled() => {
                    tracing::debug!(stream_id, "Stream cancelled");
                }
            }
        });
    }
}

async fn run_stream(
    client: &reqwest::Client,
    api_url: &str,
    model: &str,
    messages: &[Message],
    cancel_token: &CancellationToken,
    tx: &mpsc::UnboundedSender<(StreamMessage, u64)>,
    stream_id: u64,
) {
    let request = ChatRequest {
        model,
        messages,
        stream: true,
    };

    let response = match client.post(api_url).json(&request).send().await {
        Ok(response) => response,
        Err(err) => {
            tracing::warn!("Chat request failed: {err}");
            let _ = tx.send((StreamMessage::Error(format_api_error(&err.to_string())), stream_id));
            let _ = tx.send((StreamMessage::End, stream_id));
            return;
        }
    };

    if !response.status().is_success() {
        let status = response.status();
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "<no body>".to_string());
        tracing::warn!(%status, "Chat request rejected");
        let _ = tx.send((StreamMessage::Error(format_api_error(&error_text)), stream_id));
        let _ = tx.send((StreamMessage::End, stream_id));
        return;
    }

    let mut stream = response.bytes_stream();
    let mut buffer: Vec<u8> = Vec::new();

    while let Some(chunk) = stream.next().await {
        if cancel_token.is_cancelled() {
            return;
        }

        let chunk_bytes = match chunk {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::warn!("Stream interrupted: {err}");
                let _ = tx.send((StreamMessage::Error(format_api_error(&err.to_string())), stream_id));
                let _ = tx.send((StreamMessage::End, stream_id));
                return;
            }
        };
        buffer.extend_from_slice(&chunk_bytes);

        while let Some(newline_pos) = memchr(b'\n', &buffer) {
            let finished = match std::str::from_utf8(&buffer[..newline_pos]) {
                Ok(line) => process_ndjson_line(line.trim(), tx, stream_id),
                Err(err) => {
                    tracing::warn!("Invalid UTF-8 in stream: {err}");
                    false
                }
            };
            buffer.drain(..=newline_pos);
            if finished {
                return;
            }
        }
    }

    // A final line without a trailing newline.
    if let Ok(line) = std::str::from_utf8(&buffer) {
        if process_ndjson_line(line.trim(), tx, stream_id) {
            return;
        }
    }
    let _ = tx.send((StreamMessage::End, stream_id));
}
