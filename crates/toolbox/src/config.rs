//! Static provider tables: endpoints, default models, sampling defaults and
//! allow-lists.
//!
//! Every adapter receives its table by value when constructed, so tests (and
//! the server settings layer) can point a provider at a different endpoint.
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

pub const GLM_CHAT_URL: &str = "https://open.bigmodel.cn/api/paas/v4/chat/completions";
pub const GLM_IMAGE_GENERATION_URL: &str = "https://open.bigmodel.cn/api/paas/v4/images/generations";

pub const POLLINATIONS_IMAGE_URL: &str = "https://image.pollinations.ai";
pub const POLLINATIONS_TEXT_URL: &str = "https://text.pollinations.ai";
pub const POLLINATIONS_VISION_URL: &str = "https://text.pollinations.ai/openai";

pub const QWEN_CHAT_URL: &str =
    "https://dashscope.aliyuncs.com/api/v1/services/aigc/text-generation/generation";
pub const QWEN_MULTIMODAL_URL: &str =
    "https://dashscope.aliyuncs.com/api/v1/services/aigc/multimodal-generation/generation";

/// Primary (GLM) provider table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlmConfig {
    pub chat_url: String,
    pub image_generation_url: String,
    pub image_model: String,
    pub video_model: String,
    pub generation_model: String,
    pub temperature: f64,
    pub top_p: f64,
    pub quality: String,
    pub size: String,
    pub supported_models: Vec<String>,
    pub supported_qualities: Vec<String>,
    pub supported_sizes: Vec<String>,
}

impl Default for GlmConfig {
    fn default() -> Self {
        Self {
            chat_url: GLM_CHAT_URL.to_string(),
            image_generation_url: GLM_IMAGE_GENERATION_URL.to_string(),
            image_model: "glm-4.5v".to_string(),
            video_model: "glm-4.5v".to_string(),
            generation_model: "cogview-4".to_string(),
            temperature: 0.8,
            top_p: 0.6,
            quality: "standard".to_string(),
            size: "1024x1024".to_string(),
            supported_models: strings(&["cogview-4-250304", "cogview-4", "cogview-3-flash"]),
            supported_qualities: strings(&["hd", "standard"]),
            supported_sizes: strings(&[
                "1024x1024",
                "768x1344",
                "864x1152",
                "1344x768",
                "1152x864",
                "1440x720",
                "720x1440",
            ]),
        }
    }
}

/// Free aggregator (Pollinations) table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollinationsConfig {
    pub image_url: String,
    pub text_url: String,
    pub vision_url: String,
    pub audio_model: String,
    pub vision_model: String,
    pub vision_max_tokens: u32,
}

impl Default for PollinationsConfig {
    fn default() -> Self {
        Self {
            image_url: POLLINATIONS_IMAGE_URL.to_string(),
            text_url: POLLINATIONS_TEXT_URL.to_string(),
            vision_url: POLLINATIONS_VISION_URL.to_string(),
            audio_model: "openai-audio".to_string(),
            vision_model: "openai".to_string(),
            vision_max_tokens: 300,
        }
    }
}

/// Regional (Qwen / DashScope) provider table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QwenConfig {
    pub chat_url: String,
    pub multimodal_url: String,
    pub text_model: String,
    pub multimodal_model: String,
    pub temperature: f64,
    pub top_p: f64,
    pub supported_text_models: Vec<String>,
    pub supported_multimodal_models: Vec<String>,
}

impl Default for QwenConfig {
    fn default() -> Self {
        Self {
            chat_url: QWEN_CHAT_URL.to_string(),
            multimodal_url: QWEN_MULTIMODAL_URL.to_string(),
            text_model: "qwen-max".to_string(),
            multimodal_model: "qwen-vl-max".to_string(),
            temperature: 0.8,
            top_p: 0.8,
            supported_text_models: strings(&["qwen-turbo", "qwen-plus", "qwen-max", "qwen-72b-chat"]),
            supported_multimodal_models: strings(&["qwen-vl-plus", "qwen-vl-max"]),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolboxConfig {
    pub glm: GlmConfig,
    pub pollinations: PollinationsConfig,
    pub qwen: QwenConfig,
}

/// Speech voices accepted by the aggregator's audio endpoint.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    JsonSchema,
    Display,
    AsRefStr,
    EnumIter,
    EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Voice {
    Alloy,
    Echo,
    Fable,
    Onyx,
    Nova,
    Shimmer,
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}
