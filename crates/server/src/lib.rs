//! MCP servers for the calculator and data processor demos.
//!
//! Both servers are plain [`rmcp::ServerHandler`] implementations: tools and
//! prompts are registered through the `rmcp` router macros, resources are
//! served by hand. Transport is whatever the caller hands to
//! [`rmcp::ServiceExt::serve`], stdio in production and an in-memory pipe
//! in tests.
//!
//! # Example
//!
//! ```no_run
//! use rmcp::{ServiceExt, transport::stdio};
//! use server::CalculatorServer;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//! let service = CalculatorServer::new().serve(stdio()).await?;
//! service.waiting().await?;
//! # Ok(())
//! # }
//! ```

pub mod calculator;
mod content;
pub mod data_processor;
mod error;

pub use calculator::{CalculatorServer, CalculatorSettings};
pub use data_processor::{DataProcessorServer, ProductLookup, UserDetails};
pub use error::{Error, Result};
