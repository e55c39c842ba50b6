//! Helpers for shaping tool results and resource contents.

use rmcp::ErrorData as McpError;
use rmcp::model::{
    AnnotateAble, CallToolResult, Content, RawResource, ReadResourceResult, Resource,
    ResourceContents, ResourceTemplate,
};
use serde::Serialize;
use serde_json::json;

use crate::Error;

pub const JSON_MIME: &str = "application/json";
pub const MARKDOWN_MIME: &str = "text/markdown";

/// A fixed resource advertised by `resources/list`.
#[derive(Debug, Clone, Copy)]
pub struct StaticResource {
    pub uri: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub mime_type: &'static str,
}

impl StaticResource {
    pub fn to_resource(&self) -> Resource {
        let mut raw = RawResource::new(self.uri, self.name);
        raw.description = Some(self.description.to_string());
        raw.mime_type = Some(self.mime_type.to_string());
        raw.no_annotation()
    }
}

/// A parameterized resource advertised by `resources/templates/list`.
#[derive(Debug, Clone, Copy)]
pub struct TemplateResource {
    pub uri_template: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub mime_type: &'static str,
}

impl TemplateResource {
    pub fn to_template(&self) -> Result<ResourceTemplate, McpError> {
        serde_json::from_value(json!({
            "uriTemplate": self.uri_template,
            "name": self.name,
            "description": self.description,
            "mimeType": self.mime_type,
        }))
        .map_err(|e| Error::Unexpected(format!("resource template {}: {e}", self.name)).into())
    }
}

/// Wrap a serializable value as a single JSON text content item.
pub fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let text = to_json(value)?;
    Ok(CallToolResult::success(vec![Content::text(text)]))
}

/// Resource contents holding pretty-printed JSON.
pub fn json_contents<T: Serialize>(uri: &str, value: &T) -> Result<ReadResourceResult, McpError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| Error::Unexpected(format!("serialize {uri}: {e}")))?;
    Ok(text_contents(uri, text))
}

pub fn text_contents(uri: &str, text: impl Into<String>) -> ReadResourceResult {
    ReadResourceResult {
        contents: vec![ResourceContents::text(text, uri)],
    }
}

pub fn unknown_resource(uri: &str) -> McpError {
    McpError::resource_not_found(
        format!("unknown resource: {uri}"),
        Some(json!({ "uri": uri })),
    )
}

fn to_json<T: Serialize>(value: &T) -> Result<String, Error> {
    serde_json::to_string(value).map_err(|e| Error::Unexpected(format!("serialize result: {e}")))
}
