//! # Parley Core
//!
//! Domain types, traits, and error definitions for the Parley agent.
//! This crate has **no HTTP or storage dependencies**: it defines the domain
//! model that every other crate implements against.
//!
//! ## Collaborators
//!
//! The agent loop talks to four seams, each a trait here:
//! - [`Provider`]: the chat-completion endpoint
//! - [`TranscriptStore`]: the persisted, append-only conversation
//! - [`Tool`] (held by a [`ToolRegistry`]): the capabilities the model may invoke
//! - [`ApprovalGate`]: the yes/no classifier for approval-gated tools

pub mod approval;
pub mod error;
pub mod event;
pub mod message;
pub mod provider;
pub mod tool;
pub mod transcript;

// Re-export key types at crate root for ergonomics
pub use approval::ApprovalGate;
pub use error::{Error, Result};
pub use event::{DomainEvent, EventBus};
pub use message::{FunctionCall, Message, Role, ToolCall};
pub use provider::{Provider, ProviderRequest, ProviderResponse, ToolDefinition};
pub use tool::{Tool, ToolInput, ToolRegistry, ToolResult, UNKNOWN_TOOL_SENTINEL};
pub use transcript::TranscriptStore;
