//! These models represent the values passed around during one tool invocation
//!
//! There are several related formats we need to interact with:
//! - MCP tool results, returned to the host transport
//! - chat-completions messages, sent to GLM and the Pollinations vision endpoint
//! - DashScope messages, sent to Qwen
//!
//! Handlers build the internal structs and convert them to a wire format only
//! at the provider boundary (see `providers::utils`).
pub mod content;
pub mod message;
