use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};

use super::base::{ensure_success, SamplingOptions, VisionProvider};
use super::utils::{chat_completion_content, messages_to_chat_spec, require_prompt};
use crate::config::GlmConfig;
use crate::errors::{AdapterResult, ToolError};
use crate::models::message::{build_user_turn, ContentPart};

pub const NO_RESPONSE: &str = "No response from API";

/// A validated image generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageGenerationRequest {
    pub prompt: String,
    pub model: String,
    pub quality: String,
    pub size: String,
}

impl ImageGenerationRequest {
    /// Checks the prompt and every option against the configured allow-lists;
    /// unset options take the configured defaults.
    pub fn new(
        config: &GlmConfig,
        prompt: &str,
        quality: Option<&str>,
        size: Option<&str>,
        model: Option<&str>,
    ) -> AdapterResult<Self> {
        require_prompt(prompt)?;

        let model = model.unwrap_or(&config.generation_model);
        if !config.supported_models.iter().any(|m| m == model) {
            return Err(ToolError::unsupported("model", model, &config.supported_models));
        }
        let quality = quality.unwrap_or(&config.quality);
        if !config.supported_qualities.iter().any(|q| q == quality) {
            return Err(ToolError::unsupported("quality", quality, &config.supported_qualities));
        }
        let size = size.unwrap_or(&config.size);
        if !config.supported_sizes.iter().any(|s| s == size) {
            return Err(ToolError::unsupported("size", size, &config.supported_sizes));
        }

        Ok(Self {
            prompt: prompt.to_string(),
            model: model.to_string(),
            quality: quality.to_string(),
            size: size.to_string(),
        })
    }
}

pub struct GlmProvider {
    client: Client,
    config: GlmConfig,
    api_key: String,
}

impl GlmProvider {
    pub fn new(client: Client, config: GlmConfig, api_key: String) -> Self {
        Self {
            client,
            config,
            api_key,
        }
    }

    async fn post(&self, url: &str, payload: Value) -> AdapterResult<Value> {
        let response = self
            .client
            .post(url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Accept-Language", "en-US,en")
            .json(&payload)
            .send()
            .await?;

        let response = ensure_success(response, false).await?;
        Ok(response.json().await?)
    }

    /// Generate an image and return its remote URL.
    pub async fn generate_image(&self, request: &ImageGenerationRequest) -> AdapterResult<String> {
        let payload = json!({
            "model": request.model,
            "prompt": request.prompt,
            "quality": request.quality,
            "size": request.size,
        });

        let response = self.post(&self.config.image_generation_url, payload).await?;

        response["data"][0]["url"]
            .as_str()
            .filter(|url| !url.is_empty())
            .map(str::to_string)
            .ok_or_else(|| {
                ToolError::UpstreamEmptyResult("Failed to generate image: No URL returned".to_string())
            })
    }

    /// Fetch `url` and write the bytes to `save_path`, creating parent
    /// directories as needed.
    pub async fn download(&self, url: &str, save_path: &Path) -> AdapterResult<PathBuf> {
        let response = self.client.get(url).send().await?;
        let bytes = ensure_success(response, false).await?.bytes().await?;

        if let Some(parent) = save_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(save_path, &bytes).await?;
        Ok(save_path.to_path_buf())
    }
}

#[async_trait]
impl VisionProvider for GlmProvider {
    async fn analyze(
        &self,
        model: &str,
        media: ContentPart,
        prompt: &str,
        options: &SamplingOptions,
    ) -> AdapterResult<String> {
        let messages = messages_to_chat_spec(&[build_user_turn(vec![media], prompt)]);

        let mut payload = json!({
            "model": model,
            "messages": messages,
            "thinking": {"type": "enabled"},
            "stream": false,
            "temperature": options.temperature.unwrap_or(self.config.temperature),
            "top_p": options.top_p.unwrap_or(self.config.top_p),
        });
        if let (Some(tokens), Some(object)) = (options.max_tokens, payload.as_object_mut()) {
            object.insert("max_tokens".to_string(), json!(tokens));
        }

        let response = self.post(&self.config.chat_url, payload).await?;

        Ok(chat_completion_content(&response).unwrap_or_else(|| NO_RESPONSE.to_string()))
    }
}
