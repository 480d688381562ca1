//! Transcript store implementations for Parley.

pub mod file_backend;
pub mod in_memory;

pub use file_backend::FileTranscript;
pub use in_memory::InMemoryTranscript;
