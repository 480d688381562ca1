//! Reddit search tool — retrieval over indexed Reddit comments.
//!
//! Comments were embedded as `"<post title>. <comment body>"` with the post
//! and sentiment fields kept as metadata; hits are flattened back into rows.

use async_trait::async_trait;
use parley_core::error::ToolError;
use parley_core::tool::{Tool, ToolInput, ToolResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;
use crate::vector::{QueryRequest, VectorFilter, VectorIndex, VectorMatch};

pub struct RedditSearchTool {
    index: Option<Arc<dyn VectorIndex>>,
    top_k: usize,
}

impl RedditSearchTool {
    pub fn new(index: Option<Arc<dyn VectorIndex>>, top_k: usize) -> Self {
        Self { index, top_k }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Args {
    query: String,
    #[serde(default)]
    sentiment_label: Option<String>,
    #[serde(default)]
    topic: Option<String>,
    #[serde(default)]
    author: Option<String>,
}

/// One comment as handed back to the model. Absent fields are omitted.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CommentRow {
    #[serde(skip_serializing_if = "Option::is_none")]
    post_id: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    post_title: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    author: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    score: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    created: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sentiment: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sentiment_label: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    keywords: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ai_mentions: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    topic: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    body: Option<String>,
}

impl From<VectorMatch> for CommentRow {
    fn from(hit: VectorMatch) -> Self {
        Self {
            post_id: hit.meta("postId"),
            post_title: hit.meta("postTitle"),
            author: hit.meta("author"),
            score: hit.meta("score"),
            created: hit.meta("created"),
            sentiment: hit.meta("sentiment"),
            sentiment_label: hit.meta("sentimentLabel"),
            keywords: hit.meta("keywords"),
            ai_mentions: hit.meta("aiMentions"),
            topic: hit.meta("topic"),
            body: hit.data,
        }
    }
}

#[async_trait]
impl Tool for RedditSearchTool {
    fn name(&self) -> &str {
        "redditSearch"
    }

    fn description(&self) -> &str {
        "Searches for Reddit posts and comments, returning information like post title, \
         comment body, author, sentiment, keywords, and topic. Use this to answer questions \
         about Reddit discussions."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query for finding Reddit posts or comments"
                },
                "sentimentLabel": {
                    "type": "string",
                    "description": "Filter by sentiment label, such as Positive, Neutral, or Negative"
                },
                "topic": {
                    "type": "string",
                    "description": "Filter by topic classification"
                },
                "author": {
                    "type": "string",
                    "description": "Filter by the author of the comment"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, input: ToolInput) -> Result<ToolResult, ToolError> {
        let args: Args = input.args()?;
        let index = self.index.as_ref().ok_or_else(|| ToolError::NotConfigured {
            tool_name: self.name().into(),
            reason: "vector index URL and token are not set".into(),
        })?;

        let filter = VectorFilter::new()
            .text("sentimentLabel", args.sentiment_label.as_deref())
            .text("topic", args.topic.as_deref())
            .text("author", args.author.as_deref());

        let request = QueryRequest::new(args.query, self.top_k, &filter)
            .map_err(|e| ToolError::InvalidArguments(e.to_string()))?;
        let hits = match index.query(request).await {
            Ok(hits) => hits,
            Err(e) => {
                warn!(error = %e, "Reddit search failed");
                return Ok(ToolResult::failed("Error: Failed to search for Reddit data"));
            }
        };

        let rows: Vec<CommentRow> = hits.into_iter().map(CommentRow::from).collect();
        let output = serde_json::to_string_pretty(&rows)
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: self.name().into(),
                reason: e.to_string(),
            })?;
        Ok(ToolResult::ok(output))
    }
}
