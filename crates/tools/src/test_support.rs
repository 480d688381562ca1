//! Shared fakes for tool tests.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Mutex;
use crate::vector::{QueryRequest, UpsertRecord, VectorError, VectorIndex, VectorMatch};

/// A vector index that answers every query with canned hits.
pub struct FakeIndex {
    hits: Option<Vec<VectorMatch>>,
    requests: Mutex<Vec<QueryRequest>>,
    upserts: Mutex<Vec<UpsertRecord>>,
    reject_ids: HashSet<String>,
}

impl FakeIndex {
    pub fn with_hits(hits: serde_json::Value) -> Self {
        Self {
            hits: Some(serde_json::from_value(hits).unwrap()),
            requests: Mutex::new(Vec::new()),
            upserts: Mutex::new(Vec::new()),
            reject_ids: HashSet::new(),
        }
    }

    pub fn failing() -> Self {
        Self {
            hits: None,
            requests: Mutex::new(Vec::new()),
            upserts: Mutex::new(Vec::new()),
            reject_ids: HashSet::new(),
        }
    }

    /// Fail upserts for these ids.
    pub fn rejecting(mut self, ids: &[&str]) -> Self {
        self.reject_ids = ids.iter().map(|id| id.to_string()).collect();
        self
    }

    pub fn last_request(&self) -> Option<QueryRequest> {
        self.requests.lock().unwrap().last().cloned()
    }

    pub fn upserts(&self) -> Vec<UpsertRecord> {
        self.upserts.lock().unwrap().clone()
    }
}

#[async_trait]
impl VectorIndex for FakeIndex {
    async fn query(&self, request: QueryRequest) -> Result<Vec<VectorMatch>, VectorError> {
        self.requests.lock().unwrap().push(request);
        self.hits
            .clone()
            .ok_or_else(|| VectorError::Network("connection refused".into()))
    }

    async fn upsert(&self, record: UpsertRecord) -> Result<(), VectorError> {
        if self.reject_ids.contains(&record.id) {
            return Err(VectorError::Api {
                status: 400,
                body: "bad record".into(),
            });
        }
        self.upserts.lock().unwrap().push(record);
        Ok(())
    }
}
