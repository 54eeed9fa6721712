use thiserror::Error;

#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Image file not found: {0}")]
    InputNotFound(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("Unsupported {option}: {value}. Supported {option} values: {}", .allowed.join(", "))]
    UnsupportedOption {
        option: &'static str,
        value: String,
        allowed: Vec<String>,
    },

    #[error("{key} environment variable is required. Please set it in your environment or in a .env file.")]
    MissingCredential { key: &'static str },

    #[error("HTTP error! status: {status}{}", body_suffix(.body))]
    UpstreamHttp { status: u16, body: Option<String> },

    #[error("{0}")]
    UpstreamEmptyResult(String),

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ToolError {
    pub fn unsupported<S: AsRef<str>>(option: &'static str, value: &str, allowed: &[S]) -> Self {
        ToolError::UnsupportedOption {
            option,
            value: value.to_string(),
            allowed: allowed.iter().map(|s| s.as_ref().to_string()).collect(),
        }
    }

    /// Errors caused by the caller's arguments, raised before any network call.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ToolError::InputNotFound(_)
                | ToolError::InvalidInput(_)
                | ToolError::UnsupportedOption { .. }
        )
    }
}

impl From<reqwest::Error> for ToolError {
    fn from(err: reqwest::Error) -> Self {
        ToolError::Transport(err.to_string())
    }
}

impl From<std::io::Error> for ToolError {
    fn from(err: std::io::Error) -> Self {
        ToolError::Internal(err.to_string())
    }
}

fn body_suffix(body: &Option<String>) -> String {
    match body {
        Some(text) if !text.is_empty() => format!(", message: {}", text),
        _ => String::new(),
    }
}

pub type AdapterResult<T> = Result<T, ToolError>;
