use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

/// One piece of a conversational turn sent to a provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ContentPart {
    Text(String),
    /// Remote URL or `data:` URI
    Image(String),
    /// Remote URL
    Video(String),
}

impl ContentPart {
    pub fn text<S: Into<String>>(text: S) -> Self {
        ContentPart::Text(text.into())
    }

    pub fn image<S: Into<String>>(url: S) -> Self {
        ContentPart::Image(url.into())
    }

    pub fn video<S: Into<String>>(url: S) -> Self {
        ContentPart::Video(url.into())
    }
}

/// A single turn of a provider conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderMessage {
    pub role: Role,
    pub parts: Vec<ContentPart>,
}

impl ProviderMessage {
    pub fn system<S: Into<String>>(text: S) -> Self {
        Self {
            role: Role::System,
            parts: vec![ContentPart::text(text)],
        }
    }

    pub fn user(parts: Vec<ContentPart>) -> Self {
        Self {
            role: Role::User,
            parts,
        }
    }

    /// Returns the text when the message is a single text part.
    pub fn as_plain_text(&self) -> Option<&str> {
        match self.parts.as_slice() {
            [ContentPart::Text(text)] => Some(text),
            _ => None,
        }
    }
}

/// One user turn: the given media parts followed by the prompt text.
pub fn build_user_turn(content: Vec<ContentPart>, prompt: &str) -> ProviderMessage {
    let mut parts = content;
    parts.push(ContentPart::text(prompt));
    ProviderMessage::user(parts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_user_turn_puts_prompt_last() {
        let message = build_user_turn(vec![ContentPart::image("https://x/y.png")], "describe");
        assert_eq!(message.role, Role::User);
        assert_eq!(
            message.parts,
            vec![
                ContentPart::image("https://x/y.png"),
                ContentPart::text("describe")
            ]
        );
        assert!(message.as_plain_text().is_none());
    }

    #[test]
    fn test_plain_text_message() {
        let message = build_user_turn(vec![], "hello");
        assert_eq!(message.as_plain_text(), Some("hello"));
        assert_eq!(ProviderMessage::system("be brief").role, Role::System);
    }
}
