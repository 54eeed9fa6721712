use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde_json::{json, Value};
use std::io::ErrorKind;
use std::path::Path;
use url::Url;

use crate::errors::{AdapterResult, ToolError};
use crate::models::message::{ContentPart, ProviderMessage};

/// MIME type for an image path, judged by its extension.
pub fn image_mime_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        _ => "image/png",
    }
}

pub fn to_data_uri(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, BASE64.encode(bytes))
}

/// Read an image from disk and encode it as a `data:` URI.
pub async fn encode_image_to_data_uri(path: &Path) -> AdapterResult<String> {
    let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
        ErrorKind::NotFound => ToolError::InputNotFound(path.display().to_string()),
        _ => ToolError::Internal(format!("Failed to read image file: {}", e)),
    })?;
    Ok(to_data_uri(image_mime_type(path), &bytes))
}

/// Syntactic URL check; reachability is not tested.
pub fn validate_url(label: &str, value: &str) -> AdapterResult<()> {
    Url::parse(value)
        .map(|_| ())
        .map_err(|_| ToolError::InvalidInput(format!("Invalid {}: {}", label, value)))
}

pub fn check_range(name: &str, value: f64, min: f64, max: f64) -> AdapterResult<()> {
    if value.is_nan() || value < min || value > max {
        return Err(ToolError::InvalidInput(format!(
            "{} must be between {} and {}, got {}",
            name, min, max, value
        )));
    }
    Ok(())
}

pub fn require_prompt(prompt: &str) -> AdapterResult<()> {
    if prompt.trim().is_empty() {
        return Err(ToolError::InvalidInput("Prompt cannot be empty".to_string()));
    }
    Ok(())
}

/// Convert messages to the chat-completions specification used by GLM and the
/// Pollinations vision endpoint. A lone text part is sent as a plain string.
pub fn messages_to_chat_spec(messages: &[ProviderMessage]) -> Vec<Value> {
    messages
        .iter()
        .map(|message| {
            let content = match message.as_plain_text() {
                Some(text) => json!(text),
                None => Value::Array(message.parts.iter().map(chat_part).collect()),
            };
            json!({
                "role": message.role,
                "content": content,
            })
        })
        .collect()
}

fn chat_part(part: &ContentPart) -> Value {
    match part {
        ContentPart::Text(text) => json!({"type": "text", "text": text}),
        ContentPart::Image(url) => json!({"type": "image_url", "image_url": {"url": url}}),
        ContentPart::Video(url) => json!({"type": "video_url", "video_url": {"url": url}}),
    }
}

/// Convert messages to the DashScope `input.messages` specification.
pub fn messages_to_dashscope_spec(messages: &[ProviderMessage]) -> Vec<Value> {
    messages
        .iter()
        .map(|message| {
            let content = match message.as_plain_text() {
                Some(text) => json!(text),
                None => Value::Array(message.parts.iter().map(dashscope_part).collect()),
            };
            json!({
                "role": message.role,
                "content": content,
            })
        })
        .collect()
}

fn dashscope_part(part: &ContentPart) -> Value {
    match part {
        ContentPart::Text(text) => json!({"text": text}),
        ContentPart::Image(url) => json!({"image": url}),
        ContentPart::Video(url) => json!({"video": url}),
    }
}

/// `choices[0].message.content` of a chat-completions response when it is a
/// non-empty string.
pub fn chat_completion_content(response: &Value) -> Option<String> {
    response["choices"][0]["message"]["content"]
        .as_str()
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}
