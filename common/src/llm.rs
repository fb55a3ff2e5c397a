//! Extraction collaborator: the hosted LLM that answers chat turns and turns
//! conversations or documents into structured JSON.
//!
//! [`GeminiClient`] speaks the Gemini `generateContent` REST call over any
//! [`HttpTransport`]. Replies are parsed defensively: a reply that is not a
//! JSON object becomes an empty object rather than an error.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::ClientConfig;
use crate::error::CollaboratorError;
use crate::intake::{ChatMessage, ChatRole};
use crate::transport::HttpTransport;

/// Binary payload sent inline with an extraction prompt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attachment {
    pub mime_type: String,
    /// Base64 (standard alphabet, padded).
    pub data: String,
}

impl Attachment {
    pub fn from_bytes(mime_type: &str, bytes: &[u8]) -> Self {
        Self {
            mime_type: mime_type.to_string(),
            data: STANDARD.encode(bytes),
        }
    }
}

/// A prompt whose reply must follow `schema`.
#[derive(Clone, Copy, Debug)]
pub struct ExtractionRequest<'a> {
    pub prompt: &'a str,
    pub attachment: Option<&'a Attachment>,
    pub schema: &'a Value,
}

/// The two call shapes the app needs from the LLM.
#[allow(async_fn_in_trait)]
pub trait Collaborator {
    /// Free-text reply to the full transcript under a system instruction.
    async fn converse(
        &self,
        system_instruction: &str,
        transcript: &[ChatMessage],
    ) -> Result<String, CollaboratorError>;

    /// JSON object reply to a schema-constrained prompt. Never fails on a
    /// malformed reply; that yields an empty object.
    async fn extract(&self, request: ExtractionRequest<'_>) -> Result<Value, CollaboratorError>;
}

// ─── Wire types ──────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<ContentPart>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum ContentPart {
    Text { text: String },
    InlineData { inline_data: InlineData },
    Other(Value),
}

#[derive(Debug, Serialize, Deserialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: Value,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<Candidate>>,
    error: Option<GeminiError>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    message: String,
}

// ─── Client ──────────────────────────────────────────────────────────────────

pub struct GeminiClient<T> {
    transport: T,
    api_key: Option<String>,
    model: String,
    api_base: String,
}

impl<T: HttpTransport> GeminiClient<T> {
    pub fn new(transport: T, config: &ClientConfig) -> Self {
        Self {
            transport,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            api_base: config.api_base.clone(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self, api_key: &str) -> String {
        format!(
            "{}/models/{}:generateContent?key={api_key}",
            self.api_base, self.model
        )
    }

    async fn generate(&self, request: &GeminiRequest) -> Result<String, CollaboratorError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(CollaboratorError::MissingApiKey)?;
        let body = serde_json::to_string(request)
            .map_err(|e| CollaboratorError::Malformed(format!("encode request: {e}")))?;

        tracing::debug!(model = %self.model, "Sending generateContent request");
        let response = self.transport.post_json(&self.endpoint(api_key), &body).await?;

        if !response.is_success() {
            tracing::error!(status = response.status, body = %response.body, "Gemini API error");
            return Err(CollaboratorError::Status {
                status: response.status,
                body: response.body,
            });
        }

        let parsed: GeminiResponse = serde_json::from_str(&response.body).map_err(|e| {
            tracing::error!(error = %e, body = %response.body, "Failed to parse Gemini response");
            CollaboratorError::Malformed(e.to_string())
        })?;

        if let Some(error) = parsed.error {
            return Err(CollaboratorError::Api(error.message));
        }

        Ok(first_candidate_text(parsed.candidates.unwrap_or_default()))
    }
}

impl<T: HttpTransport> Collaborator for GeminiClient<T> {
    async fn converse(
        &self,
        system_instruction: &str,
        transcript: &[ChatMessage],
    ) -> Result<String, CollaboratorError> {
        let request = GeminiRequest {
            contents: transcript_contents(transcript),
            system_instruction: Some(GeminiContent {
                role: None,
                parts: vec![ContentPart::Text {
                    text: system_instruction.to_string(),
                }],
            }),
            generation_config: None,
        };
        self.generate(&request).await
    }

    async fn extract(&self, request: ExtractionRequest<'_>) -> Result<Value, CollaboratorError> {
        let mut parts = vec![ContentPart::Text {
            text: request.prompt.to_string(),
        }];
        if let Some(attachment) = request.attachment {
            parts.push(ContentPart::InlineData {
                inline_data: InlineData {
                    mime_type: attachment.mime_type.clone(),
                    data: attachment.data.clone(),
                },
            });
        }
        let gemini_request = GeminiRequest {
            contents: vec![GeminiContent {
                role: Some("user".into()),
                parts,
            }],
            system_instruction: None,
            generation_config: Some(GenerationConfig {
                response_mime_type: "application/json",
                response_schema: request.schema.clone(),
            }),
        };
        let text = self.generate(&gemini_request).await?;
        Ok(parse_json_reply(&text))
    }
}

/// Map the transcript to Gemini turns. Leading assistant turns are dropped
/// (a conversation must open with the user) and consecutive same-role turns
/// are merged.
fn transcript_contents(transcript: &[ChatMessage]) -> Vec<GeminiContent> {
    let mut contents: Vec<GeminiContent> = Vec::new();
    let mut texts: Vec<(ChatRole, String)> = Vec::new();

    for msg in transcript
        .iter()
        .skip_while(|m| m.role == ChatRole::Assistant)
    {
        match texts.last_mut() {
            Some((role, text)) if *role == msg.role => {
                text.push_str("\n\n");
                text.push_str(&msg.text);
            }
            _ => texts.push((msg.role, msg.text.clone())),
        }
    }

    for (role, text) in texts {
        let role = match role {
            ChatRole::User => "user",
            ChatRole::Assistant => "model",
        };
        contents.push(GeminiContent {
            role: Some(role.into()),
            parts: vec![ContentPart::Text { text }],
        });
    }
    contents
}

fn first_candidate_text(candidates: Vec<Candidate>) -> String {
    candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|p| match p {
                    ContentPart::Text { text } => Some(text),
                    _ => None,
                })
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default()
}

// ─── Defensive parsing ───────────────────────────────────────────────────────

/// Parse a model reply into a JSON object.
///
/// Tolerates Markdown code fences and chatter around the object. Anything
/// else yields an empty object.
pub fn parse_json_reply(text: &str) -> Value {
    let trimmed = strip_code_fence(text.trim());

    if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(trimmed) {
        return value;
    }

    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if start < end {
            if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(&trimmed[start..=end])
            {
                return value;
            }
        }
    }

    if !trimmed.is_empty() {
        tracing::warn!("Extraction reply was not a JSON object, using empty object");
    }
    Value::Object(Map::new())
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Skip an optional language tag on the opening fence line.
    let rest = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

/// String value of `key`; numbers and booleans are rendered as text.
/// Missing, null or structured values give "".
pub fn text_field(value: &Value, key: &str) -> String {
    match value.get(key) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

/// Numeric value of `key`, accepting numbers or numeric strings
/// ("1,250.5" included).
pub fn number_field(value: &Value, key: &str) -> Option<f64> {
    let number = match value.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', "").parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|n| n.is_finite())
}
