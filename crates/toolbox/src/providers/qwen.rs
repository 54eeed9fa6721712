use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use super::base::{ensure_success, SamplingOptions, VisionProvider};
use super::utils::messages_to_dashscope_spec;
use crate::config::QwenConfig;
use crate::errors::{AdapterResult, ToolError};
use crate::models::message::{ContentPart, ProviderMessage};

pub const NO_RESPONSE: &str = "No response generated";
pub const NO_ANALYSIS: &str = "No analysis result";

type Extractor = fn(&Value) -> Option<String>;

/// DashScope answers arrive in one of several shapes depending on the model
/// family. Tried in order; the first non-empty string wins.
pub const DASHSCOPE_EXTRACTORS: [Extractor; 3] = [output_choice_content, output_text, choice_content];

fn message_content(content: &Value) -> Option<String> {
    let text = match content {
        Value::String(text) => Some(text.as_str()),
        Value::Array(parts) => parts.first().and_then(|part| part["text"].as_str()),
        _ => None,
    };
    text.filter(|text| !text.is_empty()).map(str::to_string)
}

fn output_choice_content(response: &Value) -> Option<String> {
    message_content(&response["output"]["choices"][0]["message"]["content"])
}

fn output_text(response: &Value) -> Option<String> {
    response["output"]["text"]
        .as_str()
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

fn choice_content(response: &Value) -> Option<String> {
    message_content(&response["choices"][0]["message"]["content"])
}

pub fn extract_dashscope_answer(response: &Value) -> Option<String> {
    DASHSCOPE_EXTRACTORS.iter().find_map(|extract| extract(response))
}

fn check_model(model: &str, allowed: &[String]) -> AdapterResult<()> {
    if allowed.iter().any(|m| m == model) {
        Ok(())
    } else {
        Err(ToolError::unsupported("model", model, allowed))
    }
}

pub struct QwenProvider {
    client: Client,
    config: QwenConfig,
    api_key: String,
}

impl QwenProvider {
    pub fn new(client: Client, config: QwenConfig, api_key: String) -> Self {
        Self {
            client,
            config,
            api_key,
        }
    }

    /// The requested text model, or the default, checked against the allow-list.
    pub fn text_model(config: &QwenConfig, model: Option<&str>) -> AdapterResult<String> {
        let model = model.unwrap_or(&config.text_model);
        check_model(model, &config.supported_text_models)?;
        Ok(model.to_string())
    }

    pub fn multimodal_model(config: &QwenConfig, model: Option<&str>) -> AdapterResult<String> {
        let model = model.unwrap_or(&config.multimodal_model);
        check_model(model, &config.supported_multimodal_models)?;
        Ok(model.to_string())
    }

    fn payload(&self, model: &str, messages: &[ProviderMessage], options: &SamplingOptions) -> Value {
        let mut parameters = json!({
            "temperature": options.temperature.unwrap_or(self.config.temperature),
            "top_p": options.top_p.unwrap_or(self.config.top_p),
        });
        if let (Some(tokens), Some(object)) = (options.max_tokens, parameters.as_object_mut()) {
            object.insert("max_tokens".to_string(), json!(tokens));
        }

        json!({
            "model": model,
            "input": {"messages": messages_to_dashscope_spec(messages)},
            "parameters": parameters,
        })
    }

    async fn post(&self, url: &str, payload: Value) -> AdapterResult<Value> {
        let response = self
            .client
            .post(url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("X-DashScope-SSE", "disable")
            .json(&payload)
            .send()
            .await?;

        let response = ensure_success(response, true).await?;
        Ok(response.json().await?)
    }

    pub async fn generate_text(
        &self,
        model: &str,
        prompt: &str,
        system: Option<&str>,
        options: &SamplingOptions,
    ) -> AdapterResult<String> {
        let mut messages = Vec::new();
        if let Some(system) = system.filter(|s| !s.is_empty()) {
            messages.push(ProviderMessage::system(system));
        }
        messages.push(ProviderMessage::user(vec![ContentPart::text(prompt)]));

        let payload = self.payload(model, &messages, options);
        let response = self.post(&self.config.chat_url, payload).await?;

        Ok(extract_dashscope_answer(&response).unwrap_or_else(|| NO_RESPONSE.to_string()))
    }
}

#[async_trait]
impl VisionProvider for QwenProvider {
    async fn analyze(
        &self,
        model: &str,
        media: ContentPart,
        prompt: &str,
        options: &SamplingOptions,
    ) -> AdapterResult<String> {
        let message = ProviderMessage::user(vec![ContentPart::text(prompt), media]);
        let payload = self.payload(model, &[message], options);
        let response = self.post(&self.config.multimodal_url, payload).await?;

        Ok(extract_dashscope_answer(&response).unwrap_or_else(|| NO_ANALYSIS.to_string()))
    }
}
