use async_trait::async_trait;
use reqwest::Response;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::utils::{check_range, encode_image_to_data_uri, validate_url};
use crate::errors::{AdapterResult, ToolError};
use crate::models::message::ContentPart;

pub const MAX_OUTPUT_TOKENS: u32 = 16384;

/// Optional sampling parameters shared by the chat-style providers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SamplingOptions {
    pub temperature: Option<f64>,
    pub top_p: Option<f64>,
    pub max_tokens: Option<u32>,
}

impl SamplingOptions {
    pub fn new(temperature: Option<f64>, top_p: Option<f64>, max_tokens: Option<u32>) -> Self {
        Self {
            temperature,
            top_p,
            max_tokens,
        }
    }

    /// Rejects values outside temperature 0-1, top_p 0-1 and max_tokens 1-`max_tokens_limit`.
    pub fn validate(&self, max_tokens_limit: u32) -> AdapterResult<()> {
        if let Some(temperature) = self.temperature {
            check_range("temperature", temperature, 0.0, 1.0)?;
        }
        if let Some(top_p) = self.top_p {
            check_range("top_p", top_p, 0.0, 1.0)?;
        }
        if let Some(max_tokens) = self.max_tokens {
            check_range("max_tokens", max_tokens as f64, 1.0, max_tokens_limit as f64)?;
        }
        Ok(())
    }
}

/// Where an image comes from: a file on disk or a remote URL.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaSource {
    LocalPath(PathBuf),
    Url(String),
}

impl MediaSource {
    /// Exactly one of `path` and `url` must be supplied.
    pub fn exclusive(path: Option<String>, url: Option<String>) -> AdapterResult<Self> {
        match (path, url) {
            (Some(_), Some(_)) => Err(ToolError::InvalidInput(
                "Provide either image_path or image_url, not both".to_string(),
            )),
            (None, None) => Err(ToolError::InvalidInput(
                "Either image_path or image_url must be provided".to_string(),
            )),
            (Some(path), None) => Ok(MediaSource::LocalPath(PathBuf::from(path))),
            (None, Some(url)) => {
                validate_url("image URL", &url)?;
                Ok(MediaSource::Url(url))
            }
        }
    }

    /// The image reference a provider can consume: a base64 data URI for
    /// local files, the URL itself otherwise.
    pub async fn into_image_part(self) -> AdapterResult<ContentPart> {
        match self {
            MediaSource::LocalPath(path) => Ok(ContentPart::image(encode_image_to_data_uri(&path).await?)),
            MediaSource::Url(url) => Ok(ContentPart::image(url)),
        }
    }
}

/// A provider able to answer a prompt about one image or video.
#[async_trait]
pub trait VisionProvider: Send + Sync {
    /// Send `media` with `prompt` to `model` and return the extracted answer.
    async fn analyze(
        &self,
        model: &str,
        media: ContentPart,
        prompt: &str,
        options: &SamplingOptions,
    ) -> AdapterResult<String>;
}

/// Turns a non-2xx response into `UpstreamHttp`, optionally keeping the body
/// text for the error message.
pub async fn ensure_success(response: Response, keep_body: bool) -> AdapterResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = if keep_body {
        response.text().await.ok()
    } else {
        None
    };
    tracing::error!(status = status.as_u16(), body = ?body, "upstream returned an error status");
    Err(ToolError::UpstreamHttp {
        status: status.as_u16(),
        body,
    })
}
