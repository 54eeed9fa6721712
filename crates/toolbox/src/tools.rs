//! Tool handlers. Each handler validates its arguments, resolves the
//! credential it needs, runs one adapter and folds the outcome into a
//! [`ToolResult`]. Errors never escape a handler.
pub mod inputs;

use reqwest::Client;
use std::path::PathBuf;

use crate::config::ToolboxConfig;
use crate::credentials::{CredentialResolver, ProviderTag};
use crate::errors::{AdapterResult, ToolError};
use crate::models::content::ToolResult;
use crate::models::message::ContentPart;
use crate::providers::base::{MediaSource, SamplingOptions, VisionProvider, MAX_OUTPUT_TOKENS};
use crate::providers::glm::{GlmProvider, ImageGenerationRequest};
use crate::providers::pollinations::{
    build_image_url, ImageUrlRequest, PollinationsProvider, TextRequest, VISION_MAX_TOKENS,
};
use crate::providers::qwen::QwenProvider;
use crate::providers::utils::validate_url;
use inputs::*;

pub const GLM_IMAGE_MODEL: &str = "GLM_IMAGE_MODEL";
pub const GLM_VIDEO_MODEL: &str = "GLM_VIDEO_MODEL";
pub const GLM_GENERATION_MODEL: &str = "GLM_GENERATION_MODEL";

/// Render an adapter error for the caller. Argument problems are shown as is;
/// anything that happened past validation is prefixed with the action.
pub fn render_error(action: &str, err: &ToolError) -> String {
    match err {
        ToolError::UpstreamEmptyResult(_) => err.to_string(),
        _ if err.is_validation() => err.to_string(),
        _ => format!("Error {}: {}", action, err),
    }
}

fn finish(tool: &'static str, action: &str, result: AdapterResult<String>) -> ToolResult {
    match result {
        Ok(text) => {
            tracing::info!(tool, result_len = text.len(), "tool completed");
            ToolResult::success(text)
        }
        Err(err) => {
            tracing::error!(tool, error = %err, "tool failed");
            ToolResult::error(render_error(action, &err))
        }
    }
}

async fn analyze_with(
    provider: &dyn VisionProvider,
    model: &str,
    media: ContentPart,
    prompt: &str,
    options: &SamplingOptions,
) -> AdapterResult<String> {
    tracing::debug!(model, "sending analysis request");
    provider.analyze(model, media, prompt, options).await
}

/// Entry point for every tool. Cheap to clone; holds no per-call state.
#[derive(Clone)]
pub struct Toolbox {
    client: Client,
    config: ToolboxConfig,
    credentials: CredentialResolver,
}

impl Default for Toolbox {
    fn default() -> Self {
        Self::new(ToolboxConfig::default(), CredentialResolver::default())
    }
}

impl Toolbox {
    pub fn new(config: ToolboxConfig, credentials: CredentialResolver) -> Self {
        Self {
            client: Client::new(),
            config,
            credentials,
        }
    }

    /// Model named by an environment override, read on every call.
    fn model_override(&self, key: &str) -> Option<String> {
        self.credentials
            .environment()
            .get_var(key)
            .ok()
            .filter(|value| !value.is_empty())
    }

    fn glm(&self) -> AdapterResult<GlmProvider> {
        let api_key = self.credentials.resolve(ProviderTag::Primary)?;
        Ok(GlmProvider::new(
            self.client.clone(),
            self.config.glm.clone(),
            api_key,
        ))
    }

    fn qwen(&self) -> AdapterResult<QwenProvider> {
        let api_key = self.credentials.resolve(ProviderTag::Regional)?;
        Ok(QwenProvider::new(
            self.client.clone(),
            self.config.qwen.clone(),
            api_key,
        ))
    }

    fn pollinations(&self) -> PollinationsProvider {
        PollinationsProvider::new(self.client.clone(), self.config.pollinations.clone())
    }

    pub async fn read_image(&self, input: ReadImageInput) -> ToolResult {
        tracing::info!(tool = "read_image", path = %input.image_path, "tool called");
        finish("read_image", "analyzing image", self.try_read_image(input).await)
    }

    async fn try_read_image(&self, input: ReadImageInput) -> AdapterResult<String> {
        let options = input.sampling();
        options.validate(MAX_OUTPUT_TOKENS)?;
        let media = MediaSource::LocalPath(PathBuf::from(&input.image_path))
            .into_image_part()
            .await?;

        let provider = self.glm()?;
        let model = self
            .model_override(GLM_IMAGE_MODEL)
            .unwrap_or_else(|| self.config.glm.image_model.clone());
        analyze_with(&provider, &model, media, &input.prompt, &options).await
    }

    pub async fn analyze_video(&self, input: AnalyzeVideoInput) -> ToolResult {
        tracing::info!(tool = "analyze_video", url = %input.video_url, "tool called");
        finish("analyze_video", "analyzing video", self.try_analyze_video(input).await)
    }

    async fn try_analyze_video(&self, input: AnalyzeVideoInput) -> AdapterResult<String> {
        let options = input.sampling();
        options.validate(MAX_OUTPUT_TOKENS)?;
        validate_url("video URL", &input.video_url)?;

        let provider = self.glm()?;
        let model = self
            .model_override(GLM_VIDEO_MODEL)
            .unwrap_or_else(|| self.config.glm.video_model.clone());
        let media = ContentPart::video(input.video_url);
        analyze_with(&provider, &model, media, &input.prompt, &options).await
    }

    pub async fn generate_image(&self, input: GenerateImageInput) -> ToolResult {
        tracing::info!(tool = "generate_image", model = ?input.model, "tool called");
        finish("generate_image", "generating image", self.try_generate_image(input).await)
    }

    async fn try_generate_image(&self, input: GenerateImageInput) -> AdapterResult<String> {
        let model = input.model.or_else(|| self.model_override(GLM_GENERATION_MODEL));
        let request = ImageGenerationRequest::new(
            &self.config.glm,
            &input.prompt,
            input.quality.as_deref(),
            input.size.as_deref(),
            model.as_deref(),
        )?;

        let provider = self.glm()?;
        let url = provider.generate_image(&request).await?;

        let Some(save_path) = input.save_path else {
            return Ok(url);
        };
        match provider.download(&url, &PathBuf::from(&save_path)).await {
            Ok(path) => Ok(format!("Image saved to: {}", path.display())),
            Err(err) => {
                tracing::warn!(path = %save_path, error = %err, "failed to save image, returning URL");
                Ok(url)
            }
        }
    }

    pub async fn pollinations_generate_image(&self, input: PollinationsImageInput) -> ToolResult {
        tracing::info!(tool = "pollinations_generate_image", model = ?input.model, "tool called");
        let request = ImageUrlRequest {
            prompt: input.prompt,
            model: input.model,
            width: input.width,
            height: input.height,
            seed: input.seed,
            nologo: input.nologo,
            private: input.private,
            enhance: input.enhance,
            safe: input.safe,
            transparent: input.transparent,
        };
        finish(
            "pollinations_generate_image",
            "generating image",
            build_image_url(&self.config.pollinations, &request),
        )
    }

    pub async fn pollinations_generate_text(&self, input: PollinationsTextInput) -> ToolResult {
        tracing::info!(tool = "pollinations_generate_text", model = ?input.model, "tool called");
        let request = TextRequest {
            prompt: input.prompt,
            model: input.model,
            seed: input.seed,
            temperature: input.temperature,
            top_p: input.top_p,
            presence_penalty: input.presence_penalty,
            frequency_penalty: input.frequency_penalty,
            json: input.json,
            system: input.system,
            stream: input.stream,
            private: input.private,
        };
        finish(
            "pollinations_generate_text",
            "generating text",
            self.pollinations().generate_text(&request).await,
        )
    }

    pub async fn pollinations_generate_audio(&self, input: PollinationsAudioInput) -> ToolResult {
        tracing::info!(tool = "pollinations_generate_audio", voice = ?input.voice, "tool called");
        let result = self
            .pollinations()
            .generate_audio(&input.prompt, input.voice, input.model.as_deref())
            .await;
        finish("pollinations_generate_audio", "generating audio", result)
    }

    pub async fn pollinations_analyze_image(&self, input: PollinationsAnalyzeImageInput) -> ToolResult {
        tracing::info!(tool = "pollinations_analyze_image", model = ?input.model, "tool called");
        finish(
            "pollinations_analyze_image",
            "analyzing image",
            self.try_pollinations_analyze_image(input).await,
        )
    }

    async fn try_pollinations_analyze_image(
        &self,
        input: PollinationsAnalyzeImageInput,
    ) -> AdapterResult<String> {
        let source = MediaSource::exclusive(input.image_path, input.image_url)?;
        let options = SamplingOptions::new(None, None, input.max_tokens);
        options.validate(VISION_MAX_TOKENS)?;
        let media = source.into_image_part().await?;

        let provider = self.pollinations();
        let model = input
            .model
            .unwrap_or_else(|| provider.default_vision_model().to_string());
        analyze_with(&provider, &model, media, &input.prompt, &options).await
    }

    pub async fn qwen_generate_text(&self, input: QwenTextInput) -> ToolResult {
        tracing::info!(tool = "qwen_generate_text", model = ?input.model, "tool called");
        finish(
            "qwen_generate_text",
            "generating text",
            self.try_qwen_generate_text(input).await,
        )
    }

    async fn try_qwen_generate_text(&self, input: QwenTextInput) -> AdapterResult<String> {
        let options = input.sampling();
        options.validate(MAX_OUTPUT_TOKENS)?;
        let model = QwenProvider::text_model(&self.config.qwen, input.model.as_deref())?;

        self.qwen()?
            .generate_text(&model, &input.prompt, input.system.as_deref(), &options)
            .await
    }

    pub async fn qwen_analyze_image(&self, input: QwenAnalyzeImageInput) -> ToolResult {
        tracing::info!(tool = "qwen_analyze_image", model = ?input.model, "tool called");
        finish(
            "qwen_analyze_image",
            "analyzing image",
            self.try_qwen_analyze_image(input).await,
        )
    }

    async fn try_qwen_analyze_image(&self, input: QwenAnalyzeImageInput) -> AdapterResult<String> {
        let options = input.sampling();
        let source = MediaSource::exclusive(input.image_path, input.image_url)?;
        options.validate(MAX_OUTPUT_TOKENS)?;
        let model = QwenProvider::multimodal_model(&self.config.qwen, input.model.as_deref())?;
        let media = source.into_image_part().await?;

        let provider = self.qwen()?;
        analyze_with(&provider, &model, media, &input.prompt, &options).await
    }

    pub async fn qwen_analyze_video(&self, input: QwenAnalyzeVideoInput) -> ToolResult {
        tracing::info!(tool = "qwen_analyze_video", url = %input.video_url, "tool called");
        finish(
            "qwen_analyze_video",
            "analyzing video",
            self.try_qwen_analyze_video(input).await,
        )
    }

    async fn try_qwen_analyze_video(&self, input: QwenAnalyzeVideoInput) -> AdapterResult<String> {
        let options = input.sampling();
        options.validate(MAX_OUTPUT_TOKENS)?;
        validate_url("video URL", &input.video_url)?;
        let model = QwenProvider::multimodal_model(&self.config.qwen, input.model.as_deref())?;

        let provider = self.qwen()?;
        let media = ContentPart::video(input.video_url);
        analyze_with(&provider, &model, media, &input.prompt, &options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::{DotenvSource, MockEnvironment};
    use std::env::VarError;
    use std::sync::Arc;

    fn toolbox_without_credentials() -> Toolbox {
        let mut mock_env = MockEnvironment::new();
        mock_env
            .expect_get_var()
            .returning(|_| Err(VarError::NotPresent));
        let dir = tempfile::TempDir::new().unwrap();
        let credentials = CredentialResolver::new(
            Arc::new(mock_env),
            vec![DotenvSource::Directory(dir.path().to_path_buf())],
        );
        Toolbox::new(ToolboxConfig::default(), credentials)
    }

    #[test]
    fn test_render_error() {
        let err = ToolError::InputNotFound("/tmp/missing.png".to_string());
        assert_eq!(render_error("analyzing image", &err), "Image file not found: /tmp/missing.png");

        let err = ToolError::UpstreamHttp {
            status: 500,
            body: None,
        };
        assert_eq!(
            render_error("analyzing image", &err),
            "Error analyzing image: HTTP error! status: 500"
        );

        let err = ToolError::MissingCredential { key: "GLM_API_KEY" };
        assert!(render_error("generating image", &err).starts_with("Error generating image: GLM_API_KEY"));
    }

    #[tokio::test]
    async fn test_missing_file_reported_before_credentials() {
        let toolbox = toolbox_without_credentials();
        let result = toolbox
            .read_image(ReadImageInput {
                image_path: "/nonexistent/cat.png".to_string(),
                prompt: "describe".to_string(),
                temperature: None,
                top_p: None,
                max_tokens: None,
            })
            .await;
        assert_eq!(result.text(), "Image file not found: /nonexistent/cat.png");
    }

    #[tokio::test]
    async fn test_missing_credential_is_reported_as_text() {
        let toolbox = toolbox_without_credentials();
        let result = toolbox
            .qwen_generate_text(QwenTextInput {
                prompt: "hi".to_string(),
                ..Default::default()
            })
            .await;
        assert_eq!(
            result.text(),
            "Error generating text: ALIYUN_API_KEY environment variable is required. \
             Please set it in your environment or in a .env file."
        );
    }

    #[tokio::test]
    async fn test_out_of_range_sampling_rejected() {
        let toolbox = toolbox_without_credentials();
        let result = toolbox
            .analyze_video(AnalyzeVideoInput {
                video_url: "https://v/clip.mp4".to_string(),
                prompt: "summarize".to_string(),
                temperature: Some(1.5),
                top_p: None,
                max_tokens: None,
            })
            .await;
        assert_eq!(result.text(), "temperature must be between 0 and 1, got 1.5");
    }

    #[tokio::test]
    async fn test_exclusive_image_source() {
        let toolbox = toolbox_without_credentials();
        let result = toolbox
            .qwen_analyze_image(QwenAnalyzeImageInput {
                prompt: "what is this?".to_string(),
                ..Default::default()
            })
            .await;
        assert_eq!(result.text(), "Either image_path or image_url must be provided");

        let result = toolbox
            .pollinations_analyze_image(PollinationsAnalyzeImageInput {
                image_path: Some("/tmp/a.png".to_string()),
                image_url: Some("https://i/a.png".to_string()),
                prompt: "what is this?".to_string(),
                ..Default::default()
            })
            .await;
        assert_eq!(result.text(), "Provide either image_path or image_url, not both");
    }

    #[tokio::test]
    async fn test_pollinations_image_needs_no_network() {
        let toolbox = toolbox_without_credentials();
        let result = toolbox
            .pollinations_generate_image(PollinationsImageInput {
                prompt: "a cat".to_string(),
                ..Default::default()
            })
            .await;
        assert_eq!(result.text(), "https://image.pollinations.ai/prompt/a%20cat?prompt=a+cat");

        let result = toolbox
            .pollinations_generate_image(PollinationsImageInput::default())
            .await;
        assert_eq!(result.text(), "Prompt cannot be empty");
    }
}
