use crate::traits::Message;
use serde::Serialize;
use serde_json::Value;

pub const TRANSCRIPTION_MODEL: &str = "gpt-4o-mini-transcribe";

/// Body of a realtime session request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionConfig {
    pub model: String,
    pub voice: String,
    pub instructions: String,
    pub turn_detection: TurnDetection,
    pub modalities: Vec<String>,
    pub input_audio_transcription: Transcription,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnDetection {
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transcription {
    pub model: String,
}

impl SessionConfig {
    pub fn new(model: &str, voice: &str, instructions: String) -> Self {
        Self {
            model: model.to_string(),
            voice: voice.to_string(),
            instructions,
            turn_detection: TurnDetection {
                kind: "server_vad".to_string(),
            },
            modalities: vec!["audio".to_string(), "text".to_string()],
            input_audio_transcription: Transcription {
                model: TRANSCRIPTION_MODEL.to_string(),
            },
            tools: Vec::new(),
        }
    }

    pub fn with_tools(mut self, tools: Vec<Value>) -> Self {
        self.tools = tools;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub temperature: f64,
}

/// System prompt, then the usable part of the client's history, then the new
/// message. History entries with another role or non-string content are dropped.
pub fn compose_chat_messages(system_prompt: &str, history: &[Value], message: &str) -> Vec<Message> {
    let mut messages = vec![Message::new("system", system_prompt)];
    messages.extend(history.iter().filter_map(|entry| {
        let role = entry.get("role").and_then(Value::as_str)?;
        let content = entry.get("content").and_then(Value::as_str)?;
        matches!(role, "user" | "assistant").then(|| Message::new(role, content))
    }));
    messages.push(Message::new("user", message));
    messages
}
