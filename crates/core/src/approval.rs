//! Approval gate trait — classifies a user reply as approve or deny.

use async_trait::async_trait;

/// Decides whether a user reply approves a pending gated tool call.
///
/// Always answers; implementations must turn their own failures into
/// `false` so that side-effecting tools fail closed.
#[async_trait]
pub trait ApprovalGate: Send + Sync {
    async fn is_approved(&self, user_reply: &str) -> bool;
}
