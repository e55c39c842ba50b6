//! Client side of the MCP demo.
//!
//! [`McpClient`] connects to a server either in-process or as a child
//! process speaking MCP over stdio. Tool results pass through
//! [`extract_tool_result`] so callers see plain values rather than
//! protocol envelopes. The [`demo`] module holds the scripted walkthroughs
//! run by the `mcp-demo client` command.

mod client;
pub mod demo;
pub mod envelope;
mod error;

pub use client::{IN_PROCESS_BUFFER, McpClient};
pub use envelope::{
    ContentItem, Envelope, JsonSource, coerce_numeric, display, extract_result,
    extract_tool_result,
};
pub use error::{BoxError, Error, Result};
