pub mod base;
pub mod glm;
pub mod pollinations;
pub mod qwen;
pub mod utils;
