use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextContent {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
/// Content returned to the MCP host
pub enum Content {
    Text(TextContent),
}

impl Content {
    pub fn text<S: Into<String>>(text: S) -> Self {
        Content::Text(TextContent { text: text.into() })
    }

    /// Get the text content if this is a TextContent variant
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Content::Text(text) => Some(&text.text),
        }
    }
}

/// The envelope every tool returns. Success and failure share the same shape:
/// a single text item, so failure is only visible in the text itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    pub content: Vec<Content>,
}

impl ToolResult {
    pub fn success<S: Into<String>>(text: S) -> Self {
        Self {
            content: vec![Content::text(text)],
        }
    }

    pub fn error<S: Into<String>>(message: S) -> Self {
        Self {
            content: vec![Content::text(message)],
        }
    }

    /// Text of the single content item.
    pub fn text(&self) -> &str {
        self.content
            .first()
            .and_then(Content::as_text)
            .unwrap_or_default()
    }
}
