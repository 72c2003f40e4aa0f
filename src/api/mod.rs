use serde::{Deserialize, Serialize};

use crate::core::message::Message;

/// Body of a streaming `/api/chat` request.
#[derive(Serialize)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [Message],
    pub stream: bool,
}

#[derive(Deserialize)]
pub struct ChatChunkMessage {
    #[serde(default)]
    pub content: String,
}

/// One NDJSON line of a streaming reply.
#[derive(Deserialize)]
pub struct ChatChunk {
    #[serde(default)]
    pub message: Option<ChatChunkMessage>,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub error: Option<String>,
}
