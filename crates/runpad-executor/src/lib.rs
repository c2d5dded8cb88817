//! HTTP client for the remote code execution service.
//!
//! Provides:
//! - Wire types for the `/run` endpoint
//! - `HttpExecutor` - `Executor` implementation over `reqwest`

pub mod client;
pub mod protocol;

pub use client::HttpExecutor;
pub use protocol::RunResponse;
