//! MCP client over a child process or an in-process server.
//!
//! # Example
//!
//! ```no_run
//! use client::McpClient;
//! use server::CalculatorServer;
//! use serde_json::json;
//!
//! # async fn example() -> client::Result<()> {
//! let client = McpClient::in_process(CalculatorServer::new()).await?;
//!
//! for tool in client.list_tools().await? {
//!     println!("Tool: {}", tool.name);
//! }
//!
//! let sum = client.call_tool_value("add", json!({ "a": 1, "b": 2 })).await?;
//! println!("1 + 2 = {sum}");
//!
//! client.shutdown().await?;
//! # Ok(())
//! # }
//! ```

use rmcp::model::{
    CallToolRequestParams, CallToolResult, GetPromptRequestParams, JsonObject, Prompt,
    PromptMessageContent, ReadResourceRequestParams, Resource, ResourceContents, ResourceTemplate,
    Tool,
};
use rmcp::service::{RoleClient, RunningService};
use rmcp::transport::{ConfigureCommandExt, TokioChildProcess};
use rmcp::{ServerHandler, ServiceExt};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tokio::process::Command;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::envelope::extract_tool_result;
use crate::{Error, Result};

/// Buffer size of the in-memory pipe joining client and in-process server.
pub const IN_PROCESS_BUFFER: usize = 64 * 1024;

/// An MCP client connected to one server.
pub struct McpClient {
    service: RunningService<RoleClient, ()>,
    server_task: Option<JoinHandle<()>>,
}

impl McpClient {
    /// Spawn an MCP server and connect to it over its stdio.
    ///
    /// # Arguments
    ///
    /// * `command` - The command to run
    /// * `args` - Arguments to pass to the command
    pub async fn spawn(
        command: impl AsRef<str>,
        args: impl IntoIterator<Item = impl AsRef<str>>,
    ) -> Result<Self> {
        let command_str = command.as_ref().to_string();
        let args_vec: Vec<String> = args.into_iter().map(|a| a.as_ref().to_string()).collect();
        debug!(command = %command_str, args = ?args_vec, "spawning MCP server");

        let transport = TokioChildProcess::new(Command::new(&command_str).configure(|cmd| {
            for arg in &args_vec {
                cmd.arg(arg);
            }
        }))
        .map_err(Error::Spawn)?;

        let service: RunningService<RoleClient, ()> = ()
            .serve(transport)
            .await
            .map_err(|e| Error::Connect(Box::new(e)))?;

        Ok(Self {
            service,
            server_task: None,
        })
    }

    /// Run `server` on a background task and connect to it through an
    /// in-memory pipe.
    pub async fn in_process<S>(server: S) -> Result<Self>
    where
        S: ServerHandler,
    {
        let (client_io, server_io) = tokio::io::duplex(IN_PROCESS_BUFFER);

        let server_task = tokio::spawn(async move {
            match server.serve(server_io).await {
                Ok(running) => {
                    if let Err(e) = running.waiting().await {
                        warn!(error = %e, "in-process server stopped abnormally");
                    }
                }
                Err(e) => warn!(error = %e, "in-process server failed to initialize"),
            }
        });

        let service: RunningService<RoleClient, ()> = ()
            .serve(client_io)
            .await
            .map_err(|e| Error::Connect(Box::new(e)))?;

        Ok(Self {
            service,
            server_task: Some(server_task),
        })
    }

    /// List available tools from the server.
    pub async fn list_tools(&self) -> Result<Vec<Tool>> {
        Ok(self.service.list_all_tools().await?)
    }

    pub async fn list_resources(&self) -> Result<Vec<Resource>> {
        Ok(self.service.list_all_resources().await?)
    }

    pub async fn list_resource_templates(&self) -> Result<Vec<ResourceTemplate>> {
        Ok(self.service.list_all_resource_templates().await?)
    }

    pub async fn list_prompts(&self) -> Result<Vec<Prompt>> {
        Ok(self.service.list_all_prompts().await?)
    }

    /// Call a tool with the given name and arguments.
    ///
    /// A result flagged as an error is returned as [`Error::ToolFailed`].
    pub async fn call_tool(
        &self,
        name: impl Into<String>,
        arguments: Option<JsonObject>,
    ) -> Result<CallToolResult> {
        let params = CallToolRequestParams {
            name: name.into().into(),
            arguments,
            meta: None,
            task: None,
        };

        let result = self.service.call_tool(params).await?;

        if result.is_error == Some(true) {
            let error_text = result
                .content
                .iter()
                .filter_map(|c| c.as_text())
                .map(|t| t.text.as_str())
                .collect::<Vec<_>>()
                .join("\n");
            return Err(Error::ToolFailed(error_text));
        }

        Ok(result)
    }

    /// Call a tool with a JSON object of arguments and unwrap its result.
    pub async fn call_tool_value(&self, name: &str, arguments: Value) -> Result<Value> {
        let result = self.call_tool(name, as_object(arguments)).await?;
        Ok(extract_tool_result(&result))
    }

    /// Read a resource and return its first text contents.
    pub async fn read_resource_text(&self, uri: &str) -> Result<String> {
        let params: ReadResourceRequestParams = request_params(json!({ "uri": uri }))?;
        let result = self.service.read_resource(params).await?;

        result
            .contents
            .into_iter()
            .find_map(|contents| match contents {
                ResourceContents::TextResourceContents { text, .. } => Some(text),
                _ => None,
            })
            .ok_or_else(|| Error::EmptyResource {
                uri: uri.to_string(),
            })
    }

    /// Read a JSON resource into `T`.
    pub async fn read_resource_json<T: DeserializeOwned>(&self, uri: &str) -> Result<T> {
        let text = self.read_resource_text(uri).await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Fetch a prompt and return the text of its first text message.
    pub async fn get_prompt_text(&self, name: &str, arguments: Value) -> Result<String> {
        let params: GetPromptRequestParams =
            request_params(json!({ "name": name, "arguments": arguments }))?;
        let result = self.service.get_prompt(params).await?;

        result
            .messages
            .into_iter()
            .find_map(|message| match message.content {
                PromptMessageContent::Text { text, .. } => Some(text),
                _ => None,
            })
            .ok_or_else(|| Error::EmptyPrompt {
                name: name.to_string(),
            })
    }

    /// Close the connection and wait for an in-process server to stop.
    pub async fn shutdown(self) -> Result<()> {
        self.service
            .cancel()
            .await
            .map_err(|e| Error::Shutdown(Box::new(e)))?;

        if let Some(task) = self.server_task {
            task.await.map_err(|e| Error::Shutdown(Box::new(e)))?;
        }
        Ok(())
    }
}

/// Build request params from their wire form.
fn request_params<T: DeserializeOwned>(value: Value) -> Result<T> {
    Ok(serde_json::from_value(value)?)
}

fn as_object(value: Value) -> Option<JsonObject> {
    match value {
        Value::Object(map) => Some(map),
        Value::Null => None,
        other => {
            warn!(arguments = %other, "tool arguments must be an object; sending none");
            None
        }
    }
}
