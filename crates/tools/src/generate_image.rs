//! Image generation tool — paid, side-effecting, approval-gated.
//!
//! Calls the OpenAI images endpoint and returns the URL of the first image.
//! The agent never runs this tool without an explicit yes from the user.

use async_trait::async_trait;
use parley_config::ImageConfig;
use parley_core::error::ToolError;
use parley_core::tool::{Tool, ToolInput, ToolResult};
use serde::Deserialize;
use tracing::{info, warn};

pub struct GenerateImageTool {
    base_url: String,
    api_key: Option<String>,
    model: String,
    size: String,
    client: reqwest::Client,
}

impl GenerateImageTool {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        image: &ImageConfig,
        client: reqwest::Client,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            model: image.model.clone(),
            size: image.size.clone(),
            client,
        }
    }

    async fn generate(&self, api_key: &str, prompt: &str) -> Result<Option<String>, reqwest::Error> {
        #[derive(Deserialize)]
        struct ImageResponse {
            #[serde(default)]
            data: Vec<ImageData>,
        }

        #[derive(Deserialize)]
        struct ImageData {
            #[serde(default)]
            url: Option<String>,
        }

        let response: ImageResponse = self
            .client
            .post(format!("{}/images/generations", self.base_url))
            .bearer_auth(api_key)
            .json(&serde_json::json!({
                "model": self.model,
                "prompt": prompt,
                "n": 1,
                "size": self.size,
            }))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(response.data.into_iter().next().and_then(|d| d.url))
    }
}

#[derive(Debug, Deserialize)]
struct Args {
    prompt: String,
}

#[async_trait]
impl Tool for GenerateImageTool {
    fn name(&self) -> &str {
        "generate_image"
    }

    fn description(&self) -> &str {
        "Generate an image from a text prompt. The user must approve before the image is generated."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "prompt": {
                    "type": "string",
                    "description": "The prompt to use to generate the image with a diffusion model image generator like Dall-E"
                }
            },
            "required": ["prompt"]
        })
    }

    fn requires_approval(&self) -> bool {
        true
    }

    async fn execute(&self, input: ToolInput) -> Result<ToolResult, ToolError> {
        let args: Args = input.args()?;
        let api_key = self.api_key.as_deref().ok_or_else(|| ToolError::NotConfigured {
            tool_name: self.name().into(),
            reason: "no API key".into(),
        })?;

        info!(model = %self.model, size = %self.size, "Generating image");
        match self.generate(api_key, &args.prompt).await {
            Ok(Some(url)) => Ok(ToolResult::ok(url)),
            Ok(None) => Ok(ToolResult::failed("Error: The image service returned no image")),
            Err(e) => {
                warn!(error = %e, "Image generation failed");
                Ok(ToolResult::failed("Error: Failed to generate image"))
            }
        }
    }
}
