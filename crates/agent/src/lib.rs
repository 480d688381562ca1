//! The agent loop — the heart of Parley.
//!
//! One call to [`AgentLoop::run`] handles one user message:
//!
//! 1. **Resume** a paused approval-gated tool call, if the transcript ends on one
//! 2. **Append** the user message (unless it was the approval reply)
//! 3. **Ask the model** for the next message
//! 4. **If a tool call**: dispatch the first one, store its output, answer
//!    any further calls with a fixed notice, go to 3
//! 5. **If text**, or a gated tool call: return the transcript
//!
//! The transcript store, the model, the approval classifier and the tools
//! are all collaborators passed in at construction.

pub mod approval;
pub mod completion;
pub mod loop_runner;

#[cfg(test)]
mod test_helpers;

pub use approval::{ApprovalFlow, DENIAL_NOTICE, LlmApprovalGate, pending_approval};
pub use completion::ModelCompletion;
pub use loop_runner::{AgentLoop, SKIPPED_NOTICE, SUPERSEDED_NOTICE};
