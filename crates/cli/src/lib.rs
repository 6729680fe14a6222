//! Library half of the memo analyzer CLI, shared with integration tests.
pub mod export;
pub mod server;
