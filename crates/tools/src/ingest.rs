//! Reddit comment ingestion: loads the enriched comments CSV into the vector
//! index that `redditSearch` queries.
//!
//! Each comment is stored under its comment id as
//! `"<post title>. <comment body>"`, with the post and enrichment columns as
//! metadata. A row that fails to parse or upsert is logged and skipped.

use crate::vector::{UpsertRecord, VectorIndex};
use serde::Deserialize;
use std::io::Read;
use tracing::{info, warn};

/// One row of the enriched comments CSV.
#[derive(Debug, Deserialize)]
struct CommentRecord {
    #[serde(rename = "Comment ID")]
    comment_id: String,
    #[serde(rename = "Post ID", default)]
    post_id: String,
    #[serde(rename = "Post Title", default)]
    post_title: String,
    #[serde(rename = "Comment Body", default)]
    comment_body: String,
    #[serde(rename = "Comment Author", default)]
    author: String,
    #[serde(rename = "Comment Score", default)]
    score: String,
    #[serde(rename = "Comment Created", default)]
    created: String,
    #[serde(rename = "Sentiment", default)]
    sentiment: String,
    #[serde(rename = "Sentiment Label", default)]
    sentiment_label: String,
    #[serde(rename = "Keywords", default)]
    keywords: String,
    #[serde(rename = "AI Mentions", default)]
    ai_mentions: String,
    #[serde(rename = "Topic", default)]
    topic: String,
}

impl From<CommentRecord> for UpsertRecord {
    fn from(row: CommentRecord) -> Self {
        let data = format!("{}. {}", row.post_title, row.comment_body);
        let metadata = [
            ("postId", row.post_id),
            ("postTitle", row.post_title),
            ("author", row.author),
            ("score", row.score),
            ("created", row.created),
            ("sentiment", row.sentiment),
            ("sentimentLabel", row.sentiment_label),
            ("keywords", row.keywords),
            ("aiMentions", row.ai_mentions),
            ("topic", row.topic),
        ]
        .into_iter()
        .map(|(key, value)| (key.to_string(), serde_json::Value::String(value)))
        .collect();

        Self {
            id: row.comment_id,
            data,
            metadata,
        }
    }
}

/// Outcome of an ingest run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IngestReport {
    pub indexed: usize,
    pub failed: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("failed to read CSV header: {0}")]
    Header(#[from] csv::Error),

    #[error("CSV is missing the `Comment ID` column")]
    MissingIdColumn,
}

/// Upsert every comment in `reader` into `index`, one request per row.
pub async fn ingest_reddit_comments<R: Read>(
    index: &dyn VectorIndex,
    reader: R,
) -> Result<IngestReport, IngestError> {
    let mut rows = csv::Reader::from_reader(reader);
    if !rows.headers()?.iter().any(|h| h == "Comment ID") {
        return Err(IngestError::MissingIdColumn);
    }

    let mut report = IngestReport::default();
    for (line, row) in rows.deserialize::<CommentRecord>().enumerate() {
        let row = match row {
            Ok(row) => row,
            Err(e) => {
                warn!(row = line + 1, error = %e, "Skipping unreadable CSV row");
                report.failed += 1;
                continue;
            }
        };

        let record = UpsertRecord::from(row);
        let id = record.id.clone();
        match index.upsert(record).await {
            Ok(()) => {
                info!(comment_id = %id, "Indexed comment");
                report.indexed += 1;
            }
            Err(e) => {
                warn!(comment_id = %id, error = %e, "Error indexing comment");
                report.failed += 1;
            }
        }
    }

    info!(indexed = report.indexed, failed = report.failed, "Finished indexing Reddit data");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeIndex;
    use crate::vector::UpstashVectorClient;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const HEADER: &str = "Post ID,Post Title,Comment ID,Comment Author,Comment Score,Comment Created,\
                          Comment Body,Sentiment,Sentiment Label,Keywords,AI Mentions,Topic";

    fn csv_with(rows: &[&str]) -> String {
        let mut out = String::from(HEADER);
        for row in rows {
            out.push('\n');
            out.push_str(row);
        }
        out
    }

    #[tokio::test]
    async fn builds_text_and_metadata_per_comment() {
        let index = FakeIndex::with_hits(serde_json::json!([]));
        let data = csv_with(&[
            r#"p1,Is AI overhyped?,c1,throwaway42,17,2024-05-01,"Absolutely, yes.",-0.4,Negative,"ai, hype",True,Technology"#,
        ]);

        let report = ingest_reddit_comments(&index, data.as_bytes()).await.unwrap();
        assert_eq!(report, IngestReport { indexed: 1, failed: 0 });

        let upserts = index.upserts();
        let record = &upserts[0];
        assert_eq!(record.id, "c1");
        assert_eq!(record.data, "Is AI overhyped?. Absolutely, yes.");
        assert_eq!(record.metadata.len(), 10);
        assert_eq!(record.metadata["postId"], "p1");
        assert_eq!(record.metadata["author"], "throwaway42");
        assert_eq!(record.metadata["sentimentLabel"], "Negative");
        assert_eq!(record.metadata["keywords"], "ai, hype");
        assert_eq!(record.metadata["aiMentions"], "True");
        assert_eq!(record.metadata["topic"], "Technology");
    }

    #[tokio::test]
    async fn failed_rows_are_skipped_not_fatal() {
        let index = FakeIndex::with_hits(serde_json::json!([])).rejecting(&["c2"]);
        let data = csv_with(&[
            "p1,First,c1,a,1,t,body one,0.1,Neutral,k,False,Misc",
            "p1,First,c2,b,2,t,body two,0.2,Neutral,k,False,Misc",
            "p1,First,c3,c,3,t,body three,0.3,Neutral,k,False,Misc",
        ]);

        let report = ingest_reddit_comments(&index, data.as_bytes()).await.unwrap();
        assert_eq!(report, IngestReport { indexed: 2, failed: 1 });
        let ids: Vec<String> = index.upserts().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["c1", "c3"]);
    }

    #[tokio::test]
    async fn missing_id_column_is_an_error() {
        let index = FakeIndex::with_hits(serde_json::json!([]));
        let err = ingest_reddit_comments(&index, "Post ID,Comment Body\np1,hi".as_bytes())
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::MissingIdColumn));
        assert!(index.upserts().is_empty());
    }

    #[tokio::test]
    async fn upserts_through_upstash_client() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/upsert-data"))
            .and(body_partial_json(serde_json::json!({
                "id": "c9",
                "data": "Rust in production. Works great.",
                "metadata": { "topic": "Programming" }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"result": "Success"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = UpstashVectorClient::new(server.uri(), "tok", reqwest::Client::new());
        let data = csv_with(&["p9,Rust in production,c9,ferris,99,t,Works great.,0.9,Positive,rust,False,Programming"]);

        let report = ingest_reddit_comments(&client, data.as_bytes()).await.unwrap();
        assert_eq!(report.indexed, 1);
    }
}
