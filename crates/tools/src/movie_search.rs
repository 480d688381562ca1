//! Movie search tool — semantic search over the indexed movie catalogue.

use async_trait::async_trait;
use parley_core::error::ToolError;
use parley_core::tool::{Tool, ToolInput, ToolResult};
use serde::Deserialize;
use std::sync::Arc;
use tracing::warn;
use crate::vector::{QueryRequest, VectorFilter, VectorIndex};

pub struct MovieSearchTool {
    index: Option<Arc<dyn VectorIndex>>,
    top_k: usize,
}

impl MovieSearchTool {
    pub fn new(index: Option<Arc<dyn VectorIndex>>, top_k: usize) -> Self {
        Self { index, top_k }
    }
}

#[derive(Debug, Deserialize)]
struct Args {
    query: String,
    #[serde(default)]
    genre: Option<String>,
    #[serde(default)]
    director: Option<String>,
}

#[async_trait]
impl Tool for MovieSearchTool {
    fn name(&self) -> &str {
        "movie_search"
    }

    fn description(&self) -> &str {
        "Searches for movies and information about them, including title, year, genre, \
         director, actors, rating, and description. Use this to answer questions about movies."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query for finding movies"
                },
                "genre": {
                    "type": "string",
                    "description": "Filter movies by genre"
                },
                "director": {
                    "type": "string",
                    "description": "Filter movies by director name"
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
            .text("genre", args.genre.as_deref())
            .text("director", args.director.as_deref());

        let request = QueryRequest::new(args.query, self.top_k, &filter)
            .map_err(|e| ToolError::InvalidArguments(e.to_string()))?;
        let hits = match index.query(request).await {
            Ok(hits) => hits,
            Err(e) => {
                warn!(error = %e, "Movie search failed");
                return Ok(ToolResult::failed("Error: Failed to search for movies"));
            }
        };

        // Each row is the stored metadata plus the hit id and the indexed
        // text as `description`
        let rows: Vec<serde_json::Value> = hits
            .into_iter()
            .map(|hit| {
                let mut row = hit.metadata.unwrap_or_default();
                row.entry("id").or_insert(hit.id.into());
                row.insert(
                    "description".into(),
                    hit.data.map(serde_json::Value::String).unwrap_or(serde_json::Value::Null),
                );
                serde_json::Value::Object(row)
            })
            .collect();

        let output = serde_json::to_string_pretty(&rows)
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: self.name().into(),
                reason: e.to_string(),
            })?;
        Ok(ToolResult::ok(output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeIndex;

    fn input(args: serde_json::Value) -> ToolInput {
        ToolInput {
            user_message: "find me a heist movie".into(),
            tool_args: args,
        }
    }

    #[tokio::test]
    async fn returns_metadata_rows_with_description() {
        let index = Arc::new(FakeIndex::with_hits(serde_json::json!([
            {
                "id": "m1",
                "score": 0.9,
                "metadata": { "title": "Heat", "year": "1995", "director": "Michael Mann" },
                "data": "A group of professional bank robbers..."
            }
        ])));
        let tool = MovieSearchTool::new(Some(index.clone()), 5);

        let result = tool
            .execute(input(serde_json::json!({"query": "heist", "director": "Michael Mann"})))
            .await
            .unwrap();
        assert!(result.success);

        let rows: serde_json::Value = serde_json::from_str(&result.output).unwrap();
        assert_eq!(rows[0]["id"], "m1");
        assert_eq!(rows[0]["title"], "Heat");
        assert_eq!(rows[0]["description"], "A group of professional bank robbers...");

        let sent = index.last_request().unwrap();
        assert_eq!(sent.data, "heist");
        assert_eq!(sent.top_k, 5);
        assert_eq!(sent.filter.as_deref(), Some("director='Michael Mann'"));
    }

    #[tokio::test]
    async fn no_filters_sends_no_filter() {
        let index = Arc::new(FakeIndex::with_hits(serde_json::json!([])));
        let tool = MovieSearchTool::new(Some(index.clone()), 5);
        let result = tool.execute(input(serde_json::json!({"query": "space"}))).await.unwrap();
        assert_eq!(result.output, "[]");
        assert!(index.last_request().unwrap().filter.is_none());
    }

    #[tokio::test]
    async fn backend_failure_is_handled() {
        let tool = MovieSearchTool::new(Some(Arc::new(FakeIndex::failing())), 5);
        let result = tool.execute(input(serde_json::json!({"query": "space"}))).await.unwrap();
        assert!(!result.success);
        assert_eq!(result.output, "Error: Failed to search for movies");
    }

    #[tokio::test]
    async fn missing_query_is_invalid() {
        let tool = MovieSearchTool::new(Some(Arc::new(FakeIndex::failing())), 5);
        let err = tool.execute(input(serde_json::json!({"genre": "Drama"}))).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }

    #[tokio::test]
    async fn unquotable_filter_is_invalid() {
        let index = Arc::new(FakeIndex::with_hits(serde_json::json!([])));
        let tool = MovieSearchTool::new(Some(index.clone()), 5);
        let err = tool
            .execute(input(serde_json::json!({"query": "x", "director": r#"a'b"c"#})))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
        assert!(index.last_request().is_none());
    }

    #[tokio::test]
    async fn unconfigured_index_is_reported() {
        let tool = MovieSearchTool::new(None, 5);
        let err = tool.execute(input(serde_json::json!({"query": "x"}))).await.unwrap_err();
        assert!(matches!(err, ToolError::NotConfigured { .. }));
    }
}
