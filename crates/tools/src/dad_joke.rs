//! Dad joke tool — fetches a random joke from icanhazdadjoke.

use async_trait::async_trait;
use parley_core::error::ToolError;
use parley_core::tool::{Tool, ToolInput, ToolResult};
use serde::Deserialize;
use tracing::warn;

pub struct DadJokeTool {
    base_url: String,
    client: reqwest::Client,
}

impl DadJokeTool {
    pub fn new(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    async fn fetch(&self) -> Result<String, reqwest::Error> {
        #[derive(Deserialize)]
        struct Joke {
            joke: String,
        }

        let joke: Joke = self
            .client
            .get(format!("{}/", self.base_url))
            .header("Accept", "application/json")
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(joke.joke)
    }
}

#[async_trait]
impl Tool for DadJokeTool {
    fn name(&self) -> &str {
        "dad_joke"
    }

    fn description(&self) -> &str {
        "Get a dad joke"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {}
        })
    }

    async fn execute(&self, _input: ToolInput) -> Result<ToolResult, ToolError> {
        match self.fetch().await {
            Ok(joke) => Ok(ToolResult::ok(joke)),
            Err(e) => {
                warn!(error = %e, "Dad joke request failed");
                Ok(ToolResult::failed("Error: Failed to fetch a dad joke"))
            }
        }
    }
}
