//! Tool arguments as they arrive from the MCP host. The JSON schema each tool
//! advertises is derived from these structs.
use schemars::JsonSchema;
use serde::Deserialize;

use crate::config::Voice;
use crate::providers::base::SamplingOptions;

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ReadImageInput {
    /// Path to a local image file (png, jpg, jpeg or gif).
    pub image_path: String,

    /// What to ask about the image.
    pub prompt: String,

    /// Sampling temperature, 0.0 to 1.0. Default: 0.8.
    #[schemars(range(min = 0.0, max = 1.0))]
    pub temperature: Option<f64>,

    /// Nucleus sampling, 0.0 to 1.0. Default: 0.6.
    #[schemars(range(min = 0.0, max = 1.0))]
    pub top_p: Option<f64>,

    /// Maximum tokens in the answer, 1 to 16384.
    #[schemars(range(min = 1, max = 16384))]
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct AnalyzeVideoInput {
    /// Publicly reachable video URL.
    pub video_url: String,

    /// What to ask about the video.
    pub prompt: String,

    /// Sampling temperature, 0.0 to 1.0. Default: 0.8.
    #[schemars(range(min = 0.0, max = 1.0))]
    pub temperature: Option<f64>,

    /// Nucleus sampling, 0.0 to 1.0. Default: 0.6.
    #[schemars(range(min = 0.0, max = 1.0))]
    pub top_p: Option<f64>,

    /// Maximum tokens in the answer, 1 to 16384.
    #[schemars(range(min = 1, max = 16384))]
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GenerateImageInput {
    /// Description of the image to generate.
    pub prompt: String,

    /// "hd" or "standard". Default: standard.
    pub quality: Option<String>,

    /// One of 1024x1024, 768x1344, 864x1152, 1344x768, 1152x864, 1440x720,
    /// 720x1440. Default: 1024x1024.
    pub size: Option<String>,

    /// cogview-4-250304, cogview-4 or cogview-3-flash. Default: cogview-4.
    pub model: Option<String>,

    /// Local path to download the generated image to. The image URL is
    /// returned when omitted or when the download fails.
    pub save_path: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct PollinationsImageInput {
    /// Description of the image.
    pub prompt: String,

    /// Image model, e.g. "flux".
    pub model: Option<String>,

    /// Width in pixels, 64 to 2048.
    #[schemars(range(min = 64, max = 2048))]
    pub width: Option<u32>,

    /// Height in pixels, 64 to 2048.
    #[schemars(range(min = 64, max = 2048))]
    pub height: Option<u32>,

    /// Seed for reproducible output.
    pub seed: Option<i64>,

    /// Remove the logo overlay.
    #[serde(default)]
    pub nologo: bool,

    /// Keep the image out of the public feed.
    #[serde(default)]
    pub private: bool,

    /// Let the service rewrite the prompt for more detail.
    #[serde(default)]
    pub enhance: bool,

    /// Strict content filtering.
    #[serde(default)]
    pub safe: bool,

    /// Transparent background.
    #[serde(default)]
    pub transparent: bool,
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct PollinationsTextInput {
    /// The prompt text.
    pub prompt: String,

    /// Text model. Default chosen by the service.
    pub model: Option<String>,

    /// Seed for reproducible output.
    pub seed: Option<i64>,

    /// Sampling temperature, 0.0 to 3.0.
    #[schemars(range(min = 0.0, max = 3.0))]
    pub temperature: Option<f64>,

    /// Nucleus sampling, 0.0 to 1.0.
    #[schemars(range(min = 0.0, max = 1.0))]
    pub top_p: Option<f64>,

    /// Presence penalty, -2.0 to 2.0.
    #[schemars(range(min = -2.0, max = 2.0))]
    pub presence_penalty: Option<f64>,

    /// Frequency penalty, -2.0 to 2.0.
    #[schemars(range(min = -2.0, max = 2.0))]
    pub frequency_penalty: Option<f64>,

    /// Ask for a JSON formatted answer.
    #[serde(default)]
    pub json: bool,

    /// System prompt.
    pub system: Option<String>,

    #[serde(default)]
    pub stream: bool,

    /// Keep the request out of the public feed.
    #[serde(default)]
    pub private: bool,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct PollinationsAudioInput {
    /// Text to speak.
    pub prompt: String,

    /// Voice to speak with.
    pub voice: Option<Voice>,

    /// Audio model. Default: openai-audio.
    pub model: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct PollinationsAnalyzeImageInput {
    /// Local image path. Mutually exclusive with `image_url`.
    pub image_path: Option<String>,

    /// Remote image URL. Mutually exclusive with `image_path`.
    pub image_url: Option<String>,

    /// What to ask about the image.
    pub prompt: String,

    /// Vision model. Default: openai.
    pub model: Option<String>,

    /// Maximum tokens in the answer, 1 to 4000. Default: 300.
    #[schemars(range(min = 1, max = 4000))]
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct QwenTextInput {
    /// The prompt text.
    pub prompt: String,

    /// qwen-turbo, qwen-plus, qwen-max or qwen-72b-chat. Default: qwen-max.
    pub model: Option<String>,

    /// Sampling temperature, 0.0 to 1.0. Default: 0.8.
    #[schemars(range(min = 0.0, max = 1.0))]
    pub temperature: Option<f64>,

    /// Nucleus sampling, 0.0 to 1.0. Default: 0.8.
    #[schemars(range(min = 0.0, max = 1.0))]
    pub top_p: Option<f64>,

    /// Maximum tokens in the answer, 1 to 16384.
    #[schemars(range(min = 1, max = 16384))]
    pub max_tokens: Option<u32>,

    /// System prompt.
    pub system: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct QwenAnalyzeImageInput {
    /// Local image path. Mutually exclusive with `image_url`.
    pub image_path: Option<String>,

    /// Remote image URL. Mutually exclusive with `image_path`.
    pub image_url: Option<String>,

    /// What to ask about the image.
    pub prompt: String,

    /// qwen-vl-plus or qwen-vl-max. Default: qwen-vl-max.
    pub model: Option<String>,

    #[schemars(range(min = 0.0, max = 1.0))]
    pub temperature: Option<f64>,

    #[schemars(range(min = 0.0, max = 1.0))]
    pub top_p: Option<f64>,

    #[schemars(range(min = 1, max = 16384))]
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct QwenAnalyzeVideoInput {
    /// Publicly reachable video URL.
    pub video_url: String,

    /// What to ask about the video.
    pub prompt: String,

    /// qwen-vl-plus or qwen-vl-max. Default: qwen-vl-max.
    pub model: Option<String>,

    #[schemars(range(min = 0.0, max = 1.0))]
    pub temperature: Option<f64>,

    #[schemars(range(min = 0.0, max = 1.0))]
    pub top_p: Option<f64>,

    #[schemars(range(min = 1, max = 16384))]
    pub max_tokens: Option<u32>,
}

macro_rules! sampling_options {
    ($($input:ty),*) => {
        $(
            impl $input {
                pub fn sampling(&self) -> SamplingOptions {
                    SamplingOptions::new(self.temperature, self.top_p, self.max_tokens)
                }
            }
        )*
    };
}

sampling_options!(
    ReadImageInput,
    AnalyzeVideoInput,
    QwenTextInput,
    QwenAnalyzeImageInput,
    QwenAnalyzeVideoInput
);
