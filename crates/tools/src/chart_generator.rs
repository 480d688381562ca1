//! Chart generator tool — renders the last tool result as a QuickChart image.
//!
//! The data source is the most recent `tool` message in the transcript, which
//! must hold a JSON array of objects (usually a movie or Reddit search result).

use async_trait::async_trait;
use parley_core::error::ToolError;
use parley_core::message::Role;
use parley_core::tool::{Tool, ToolInput, ToolResult};
use parley_core::transcript::TranscriptStore;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

pub struct ChartGeneratorTool {
    transcript: Arc<dyn TranscriptStore>,
    base_url: String,
    client: reqwest::Client,
}

impl ChartGeneratorTool {
    pub fn new(
        transcript: Arc<dyn TranscriptStore>,
        base_url: impl Into<String>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            transcript,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    async fn render(&self, chart: Value) -> Result<Option<String>, reqwest::Error> {
        #[derive(Deserialize)]
        struct CreateResponse {
            #[serde(default)]
            url: Option<String>,
        }

        let response: CreateResponse = self
            .client
            .post(format!("{}/chart/create", self.base_url))
            .json(&serde_json::json!({ "chart": chart }))
            .send()
            .await?
            .json()
            .await?;
        Ok(response.url.filter(|u| !u.is_empty()))
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
enum ChartType {
    Bar,
    Line,
    Pie,
}

impl ChartType {
    fn as_str(self) -> &'static str {
        match self {
            Self::Bar => "bar",
            Self::Line => "line",
            Self::Pie => "pie",
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Args {
    chart_type: ChartType,
    x_field: String,
    y_field: String,
    #[serde(default)]
    limit: Option<f64>,
}

/// Apply `limit` the way an array slice from zero would: absent or zero
/// keeps everything, negative counts back from the end.
fn apply_limit(rows: &[Value], limit: Option<f64>) -> &[Value] {
    let Some(limit) = limit.filter(|l| *l != 0.0 && !l.is_nan()) else {
        return rows;
    };
    let len = rows.len() as i64;
    let n = limit.trunc() as i64;
    let end = if n < 0 { (len + n).max(0) } else { n.min(len) };
    &rows[..end as usize]
}

/// Label text for a field value. Missing or null becomes an empty string.
fn label(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Numeric data point for a field value. Missing counts as zero; anything
/// that is not a number serializes as `null`.
fn data_point(value: Option<&Value>) -> Value {
    let n = match value {
        None | Some(Value::Null) => Some(0.0),
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::Bool(b)) => Some(if *b { 1.0 } else { 0.0 }),
        Some(Value::String(s)) if s.trim().is_empty() => Some(0.0),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(_) => None,
    };
    n.and_then(serde_json::Number::from_f64)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

fn chart_config(chart_type: ChartType, x_field: &str, y_field: &str, rows: &[Value]) -> Value {
    let labels: Vec<String> = rows.iter().map(|r| label(r.get(x_field))).collect();
    let data: Vec<Value> = rows.iter().map(|r| data_point(r.get(y_field))).collect();

    serde_json::json!({
        "type": chart_type.as_str(),
        "data": {
            "labels": labels,
            "datasets": [{
                "label": format!("{y_field} by {x_field}"),
                "data": data,
            }]
        }
    })
}

#[async_trait]
impl Tool for ChartGeneratorTool {
    fn name(&self) -> &str {
        "chartGenerator"
    }

    fn description(&self) -> &str {
        "Generates a chart (as an image URL) from the array of results returned by the last tool call. \
         Provide chart type and x/y fields to plot."
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "chartType": {
                    "type": "string",
                    "enum": ["bar", "line", "pie"],
                    "description": "The type of chart"
                },
                "xField": {
                    "type": "string",
                    "description": "Key in the data to map onto the x-axis"
                },
                "yField": {
                    "type": "string",
                    "description": "Key in the data to map onto the y-axis"
                },
                "limit": {
                    "type": "number",
                    "description": "Optionally limit the number of data points"
                }
            },
            "required": ["chartType", "xField", "yField"]
        })
    }

    async fn execute(&self, input: ToolInput) -> Result<ToolResult, ToolError> {
        let args: Args = input.args()?;

        let messages = match self.transcript.get_messages().await {
            Ok(m) => m,
            Err(e) => {
                warn!(error = %e, "Chart generator could not read the transcript");
                return Ok(ToolResult::failed("Error: Failed to read the transcript"));
            }
        };

        let Some(last_tool) = messages.iter().rev().find(|m| m.role == Role::Tool) else {
            return Ok(ToolResult::failed("Error: No tool messages found in the transcript"));
        };

        let parsed: Value = match serde_json::from_str(last_tool.text()) {
            Ok(v) => v,
            Err(_) => {
                return Ok(ToolResult::failed(
                    "Error: The tool message content is not valid JSON",
                ));
            }
        };
        let Value::Array(rows) = parsed else {
            return Ok(ToolResult::failed(
                "Error: The last tool message content is not an array",
            ));
        };

        let rows = apply_limit(&rows, args.limit);
        let chart = chart_config(args.chart_type, &args.x_field, &args.y_field, rows);
        debug!(points = rows.len(), chart_type = args.chart_type.as_str(), "Rendering chart");

        match self.render(chart).await {
            Ok(Some(url)) => Ok(ToolResult::ok(url)),
            Ok(None) => Ok(ToolResult::failed(
                "Error: QuickChart did not return a chart URL.",
            )),
            Err(e) => {
                warn!(error = %e, "Chart rendering failed");
                Ok(ToolResult::failed("Error: Failed to generate chart image."))
            }
        }
    }
}
