//! Pollinations.AI: a free, unauthenticated aggregator. Text and audio are
//! fetched with GET requests whose options travel in the query string, images
//! are addressed by URL alone, and vision uses a chat-completions endpoint.
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use reqwest::Client;
use serde::Serialize;
use serde_json::json;

use super::base::{ensure_success, SamplingOptions, VisionProvider};
use super::utils::{chat_completion_content, check_range, messages_to_chat_spec, require_prompt};
use crate::config::{PollinationsConfig, Voice};
use crate::errors::{AdapterResult, ToolError};
use crate::models::message::{ContentPart, ProviderMessage};

pub const NO_ANALYSIS: &str = "No analysis result";
pub const VISION_MAX_TOKENS: u32 = 4000;
const AUDIO_MIME_TYPE: &str = "audio/mpeg";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageUrlRequest {
    pub prompt: String,
    pub model: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub seed: Option<i64>,
    pub nologo: bool,
    pub private: bool,
    pub enhance: bool,
    pub safe: bool,
    pub transparent: bool,
}

#[derive(Serialize)]
struct ImageQuery<'a> {
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    nologo: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    private: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    enhance: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    safe: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    transparent: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextRequest {
    pub prompt: String,
    pub model: Option<String>,
    pub seed: Option<i64>,
    pub temperature: Option<f64>,
    pub top_p: Option<f64>,
    pub presence_penalty: Option<f64>,
    pub frequency_penalty: Option<f64>,
    pub json: bool,
    pub system: Option<String>,
    pub stream: bool,
    pub private: bool,
}

impl TextRequest {
    pub fn validate(&self) -> AdapterResult<()> {
        if let Some(temperature) = self.temperature {
            check_range("temperature", temperature, 0.0, 3.0)?;
        }
        if let Some(top_p) = self.top_p {
            check_range("top_p", top_p, 0.0, 1.0)?;
        }
        if let Some(penalty) = self.presence_penalty {
            check_range("presence_penalty", penalty, -2.0, 2.0)?;
        }
        if let Some(penalty) = self.frequency_penalty {
            check_range("frequency_penalty", penalty, -2.0, 2.0)?;
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct TextQuery<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    presence_penalty: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    frequency_penalty: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    json: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    private: Option<bool>,
}

#[derive(Serialize)]
struct AudioQuery<'a> {
    model: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    voice: Option<Voice>,
}

/// Flags are only sent when set.
fn flag(value: bool) -> Option<bool> {
    value.then_some(true)
}

fn encode_query<T: Serialize>(query: &T) -> AdapterResult<String> {
    serde_urlencoded::to_string(query).map_err(|e| ToolError::Internal(e.to_string()))
}

fn prompt_url(base: &str, segment: &str, prompt: &str) -> String {
    let base = base.trim_end_matches('/');
    let encoded = urlencoding::encode(prompt);
    if segment.is_empty() {
        format!("{}/{}", base, encoded)
    } else {
        format!("{}/{}/{}", base, segment, encoded)
    }
}

/// Build the image URL. No request is made: the image is rendered when the
/// URL is first fetched, so identical inputs always give the identical URL.
pub fn build_image_url(config: &PollinationsConfig, request: &ImageUrlRequest) -> AdapterResult<String> {
    require_prompt(&request.prompt)?;
    if let Some(width) = request.width {
        check_range("width", width as f64, 64.0, 2048.0)?;
    }
    if let Some(height) = request.height {
        check_range("height", height as f64, 64.0, 2048.0)?;
    }

    let query = encode_query(&ImageQuery {
        prompt: &request.prompt,
        model: request.model.as_deref(),
        width: request.width,
        height: request.height,
        seed: request.seed,
        nologo: flag(request.nologo),
        private: flag(request.private),
        enhance: flag(request.enhance),
        safe: flag(request.safe),
        transparent: flag(request.transparent),
    })?;

    Ok(format!(
        "{}?{}",
        prompt_url(&config.image_url, "prompt", &request.prompt),
        query
    ))
}

pub struct PollinationsProvider {
    client: Client,
    config: PollinationsConfig,
}

impl PollinationsProvider {
    pub fn new(client: Client, config: PollinationsConfig) -> Self {
        Self { client, config }
    }

    pub fn text_url(&self, request: &TextRequest) -> AdapterResult<String> {
        let query = encode_query(&TextQuery {
            model: request.model.as_deref(),
            seed: request.seed,
            temperature: request.temperature,
            top_p: request.top_p,
            presence_penalty: request.presence_penalty,
            frequency_penalty: request.frequency_penalty,
            json: flag(request.json),
            system: request.system.as_deref(),
            stream: flag(request.stream),
            private: flag(request.private),
        })?;

        let url = prompt_url(&self.config.text_url, "", &request.prompt);
        if query.is_empty() {
            Ok(url)
        } else {
            Ok(format!("{}?{}", url, query))
        }
    }

    /// Generate text; the body is returned verbatim.
    pub async fn generate_text(&self, request: &TextRequest) -> AdapterResult<String> {
        request.validate()?;
        let url = self.text_url(request)?;

        let response = self.client.get(&url).send().await?;
        Ok(ensure_success(response, false).await?.text().await?)
    }

    /// Synthesize speech and return it as a base64 `data:` URI.
    pub async fn generate_audio(
        &self,
        prompt: &str,
        voice: Option<Voice>,
        model: Option<&str>,
    ) -> AdapterResult<String> {
        let query = encode_query(&AudioQuery {
            model: model.unwrap_or(&self.config.audio_model),
            voice,
        })?;
        let url = format!("{}?{}", prompt_url(&self.config.text_url, "", prompt), query);

        let response = self.client.get(&url).send().await?;
        let bytes = ensure_success(response, false).await?.bytes().await?;
        tracing::debug!(audio_size = bytes.len(), "audio received");

        Ok(format!("data:{};base64,{}", AUDIO_MIME_TYPE, BASE64.encode(&bytes)))
    }

    pub fn default_vision_model(&self) -> &str {
        &self.config.vision_model
    }
}

#[async_trait]
impl VisionProvider for PollinationsProvider {
    async fn analyze(
        &self,
        model: &str,
        media: ContentPart,
        prompt: &str,
        options: &SamplingOptions,
    ) -> AdapterResult<String> {
        let message = ProviderMessage::user(vec![ContentPart::text(prompt), media]);
        let payload = json!({
            "model": model,
            "messages": messages_to_chat_spec(&[message]),
            "max_tokens": options.max_tokens.unwrap_or(self.config.vision_max_tokens),
        });

        let response = self
            .client
            .post(&self.config.vision_url)
            .json(&payload)
            .send()
            .await?;
        let response: serde_json::Value = ensure_success(response, false).await?.json().await?;

        Ok(chat_completion_content(&response).unwrap_or_else(|| NO_ANALYSIS.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(mock_server: &MockServer) -> PollinationsConfig {
        PollinationsConfig {
            image_url: "https://image.example.com".to_string(),
            text_url: mock_server.uri(),
            vision_url: format!("{}/openai", mock_server.uri()),
            ..PollinationsConfig::default()
        }
    }

    #[test]
    fn test_build_image_url() {
        let request = ImageUrlRequest {
            prompt: "a red fox".to_string(),
            model: Some("flux".to_string()),
            width: Some(512),
            seed: Some(42),
            nologo: true,
            ..Default::default()
        };

        let url = build_image_url(&PollinationsConfig::default(), &request).unwrap();
        assert_eq!(
            url,
            "https://image.pollinations.ai/prompt/a%20red%20fox?prompt=a+red+fox&model=flux&width=512&seed=42&nologo=true"
        );
    }

    #[test]
    fn test_build_image_url_is_idempotent() {
        let request = ImageUrlRequest {
            prompt: "sunset over the sea & sky".to_string(),
            height: Some(768),
            private: true,
            enhance: true,
            ..Default::default()
        };
        let config = PollinationsConfig::default();

        let first = build_image_url(&config, &request).unwrap();
        let second = build_image_url(&config, &request).unwrap();
        assert_eq!(first, second);
        assert!(first.contains("sunset%20over%20the%20sea%20%26%20sky"));
        assert!(!first.contains("nologo"));
    }

    #[test]
    fn test_build_image_url_rejects_out_of_range_dimensions() {
        let config = PollinationsConfig::default();
        for (width, height) in [(Some(63), None), (None, Some(2049))] {
            let request = ImageUrlRequest {
                prompt: "a cat".to_string(),
                width,
                height,
                ..Default::default()
            };
            let err = build_image_url(&config, &request).unwrap_err();
            assert!(matches!(err, ToolError::InvalidInput(_)));
        }
    }

    #[test]
    fn test_text_url_without_options_has_no_query() {
        let provider = PollinationsProvider::new(Client::new(), PollinationsConfig::default());
        let request = TextRequest {
            prompt: "hello world".to_string(),
            ..Default::default()
        };
        assert_eq!(
            provider.text_url(&request).unwrap(),
            "https://text.pollinations.ai/hello%20world"
        );
    }

    #[test]
    fn test_text_url_sends_model_only_when_requested() {
        let provider = PollinationsProvider::new(Client::new(), PollinationsConfig::default());
        let mut request = TextRequest {
            prompt: "hi".to_string(),
            temperature: Some(1.0),
            ..Default::default()
        };
        assert_eq!(
            provider.text_url(&request).unwrap(),
            "https://text.pollinations.ai/hi?temperature=1.0"
        );

        request.model = Some("mistral".to_string());
        assert_eq!(
            provider.text_url(&request).unwrap(),
            "https://text.pollinations.ai/hi?model=mistral&temperature=1.0"
        );
    }

    #[test]
    fn test_text_request_ranges() {
        let mut request = TextRequest {
            prompt: "hi".to_string(),
            temperature: Some(2.5),
            ..Default::default()
        };
        assert!(request.validate().is_ok());

        request.temperature = Some(3.1);
        assert!(request.validate().is_err());

        request.temperature = None;
        request.presence_penalty = Some(-2.5);
        assert!(request.validate().is_err());
    }

    #[tokio::test]
    async fn test_generate_text_returns_raw_body() -> anyhow::Result<()> {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/tell%20me%20a%20joke"))
            .and(query_param("model", "mistral"))
            .and(query_param("temperature", "1.5"))
            .and(query_param("json", "true"))
            .and(query_param("system", "be funny"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"joke\": \"...\"}"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = PollinationsProvider::new(Client::new(), config_for(&mock_server));
        let body = provider
            .generate_text(&TextRequest {
                prompt: "tell me a joke".to_string(),
                model: Some("mistral".to_string()),
                temperature: Some(1.5),
                json: true,
                system: Some("be funny".to_string()),
                ..Default::default()
            })
            .await?;

        assert_eq!(body, "{\"joke\": \"...\"}");
        Ok(())
    }

    #[tokio::test]
    async fn test_generate_text_rejects_range_before_request() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let provider = PollinationsProvider::new(Client::new(), config_for(&mock_server));
        let err = provider
            .generate_text(&TextRequest {
                prompt: "hi".to_string(),
                top_p: Some(1.2),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_generate_audio_returns_data_uri() -> anyhow::Result<()> {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/good%20morning"))
            .and(query_param("model", "openai-audio"))
            .and(query_param("voice", "shimmer"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"ID3".to_vec()))
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = PollinationsProvider::new(Client::new(), config_for(&mock_server));
        let uri = provider
            .generate_audio("good morning", Some(Voice::Shimmer), None)
            .await?;

        assert_eq!(uri, format!("data:audio/mpeg;base64,{}", BASE64.encode(b"ID3")));
        Ok(())
    }

    #[tokio::test]
    async fn test_generate_audio_http_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&mock_server)
            .await;

        let provider = PollinationsProvider::new(Client::new(), config_for(&mock_server));
        let err = provider.generate_audio("hi", None, None).await.unwrap_err();
        assert!(matches!(err, ToolError::UpstreamHttp { status: 502, .. }));
    }

    #[tokio::test]
    async fn test_analyze_posts_text_then_image() -> anyhow::Result<()> {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/openai"))
            .and(body_json(json!({
                "model": "openai",
                "messages": [{
                    "role": "user",
                    "content": [
                        {"type": "text", "text": "what is this?"},
                        {"type": "image_url", "image_url": {"url": "https://img/a.png"}}
                    ]
                }],
                "max_tokens": 300
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"content": "a bridge"}}]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = PollinationsProvider::new(Client::new(), config_for(&mock_server));
        let answer = provider
            .analyze(
                "openai",
                ContentPart::image("https://img/a.png"),
                "what is this?",
                &SamplingOptions::default(),
            )
            .await?;

        assert_eq!(answer, "a bridge");
        Ok(())
    }

    #[tokio::test]
    async fn test_analyze_falls_back_to_placeholder() -> anyhow::Result<()> {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&mock_server)
            .await;

        let provider = PollinationsProvider::new(Client::new(), config_for(&mock_server));
        let answer = provider
            .analyze(
                "openai",
                ContentPart::image("https://img/a.png"),
                "what is this?",
                &SamplingOptions::default(),
            )
            .await?;

        assert_eq!(answer, NO_ANALYSIS);
        Ok(())
    }
}
