//! MCP server exposing the toolbox over stdio.

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::*;
use rmcp::{tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler, ServiceExt};
use toolbox::models::content::{Content as ToolContent, ToolResult};
use toolbox::tools::inputs::*;
use toolbox::tools::Toolbox;

fn into_call_result(result: ToolResult) -> CallToolResult {
    let content = result
        .content
        .into_iter()
        .map(|item| match item {
            ToolContent::Text(text) => Content::text(text.text),
        })
        .collect();
    CallToolResult::success(content)
}

#[derive(Clone)]
pub struct ToolboxServer {
    toolbox: Toolbox,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl ToolboxServer {
    pub fn new(toolbox: Toolbox) -> Self {
        Self {
            toolbox,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(description = "Analyze a local image with the GLM vision model and answer the prompt about it")]
    async fn read_image(
        &self,
        Parameters(input): Parameters<ReadImageInput>,
    ) -> Result<CallToolResult, McpError> {
        Ok(into_call_result(self.toolbox.read_image(input).await))
    }

    #[tool(description = "Analyze a video by URL with the GLM vision model and answer the prompt about it")]
    async fn analyze_video(
        &self,
        Parameters(input): Parameters<AnalyzeVideoInput>,
    ) -> Result<CallToolResult, McpError> {
        Ok(into_call_result(self.toolbox.analyze_video(input).await))
    }

    #[tool(description = "Generate an image with CogView and return its URL, or save it locally when save_path is given")]
    async fn generate_image(
        &self,
        Parameters(input): Parameters<GenerateImageInput>,
    ) -> Result<CallToolResult, McpError> {
        Ok(into_call_result(self.toolbox.generate_image(input).await))
    }

    #[tool(description = "Build a Pollinations.AI image URL for the prompt; the image renders when the URL is opened")]
    async fn pollinations_generate_image(
        &self,
        Parameters(input): Parameters<PollinationsImageInput>,
    ) -> Result<CallToolResult, McpError> {
        Ok(into_call_result(self.toolbox.pollinations_generate_image(input).await))
    }

    #[tool(description = "Generate text with Pollinations.AI (no API key required)")]
    async fn pollinations_generate_text(
        &self,
        Parameters(input): Parameters<PollinationsTextInput>,
    ) -> Result<CallToolResult, McpError> {
        Ok(into_call_result(self.toolbox.pollinations_generate_text(input).await))
    }

    #[tool(description = "Convert text to speech with Pollinations.AI; returns a base64 audio/mpeg data URI")]
    async fn pollinations_generate_audio(
        &self,
        Parameters(input): Parameters<PollinationsAudioInput>,
    ) -> Result<CallToolResult, McpError> {
        Ok(into_call_result(self.toolbox.pollinations_generate_audio(input).await))
    }

    #[tool(description = "Analyze an image (local path or URL) with the Pollinations.AI vision endpoint")]
    async fn pollinations_analyze_image(
        &self,
        Parameters(input): Parameters<PollinationsAnalyzeImageInput>,
    ) -> Result<CallToolResult, McpError> {
        Ok(into_call_result(self.toolbox.pollinations_analyze_image(input).await))
    }

    #[tool(description = "Generate text with a Qwen model through Aliyun DashScope")]
    async fn qwen_generate_text(
        &self,
        Parameters(input): Parameters<QwenTextInput>,
    ) -> Result<CallToolResult, McpError> {
        Ok(into_call_result(self.toolbox.qwen_generate_text(input).await))
    }

    #[tool(description = "Analyze an image (local path or URL) with a Qwen-VL model")]
    async fn qwen_analyze_image(
        &self,
        Parameters(input): Parameters<QwenAnalyzeImageInput>,
    ) -> Result<CallToolResult, McpError> {
        Ok(into_call_result(self.toolbox.qwen_analyze_image(input).await))
    }

    #[tool(description = "Analyze a video by URL with a Qwen-VL model")]
    async fn qwen_analyze_video(
        &self,
        Parameters(input): Parameters<QwenAnalyzeVideoInput>,
    ) -> Result<CallToolResult, McpError> {
        Ok(into_call_result(self.toolbox.qwen_analyze_video(input).await))
    }
}

#[tool_handler]
impl ServerHandler for ToolboxServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "toolbox-mcp".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                title: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Multimodal AI toolbox: image and video understanding (GLM, Qwen-VL, \
                 Pollinations), image generation (CogView, Pollinations), text generation \
                 (Qwen, Pollinations) and text to speech (Pollinations). GLM tools need \
                 GLM_API_KEY and Qwen tools need ALIYUN_API_KEY."
                    .into(),
            ),
        }
    }
}

/// Serve on stdin/stdout until the client disconnects.
pub async fn run(toolbox: Toolbox) -> anyhow::Result<()> {
    let server = ToolboxServer::new(toolbox);
    let service = server.serve(rmcp::transport::stdio()).await?;
    tracing::info!("MCP server ready on stdio");
    let reason = service.waiting().await?;
    tracing::info!(?reason, "MCP server stopped");
    Ok(())
}
