//! Calculator server: four arithmetic tools, settings and guide resources,
//! and an expression-evaluation prompt.

use rmcp::handler::server::router::prompt::PromptRouter;
use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, GetPromptRequestParams, GetPromptResult, Implementation,
    ListPromptsResult, ListResourceTemplatesResult, ListResourcesResult, PaginatedRequestParams,
    PromptMessage, PromptMessageRole, ReadResourceRequestParams, ReadResourceResult,
    ServerCapabilities, ServerInfo,
};
use rmcp::service::RequestContext;
use rmcp::{
    ErrorData as McpError, RoleServer, ServerHandler, prompt, prompt_handler, prompt_router, tool,
    tool_handler, tool_router,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::content::{
    JSON_MIME, MARKDOWN_MIME, StaticResource, json_contents, json_result, text_contents,
    unknown_resource,
};
use crate::Error;

pub const SETTINGS_URI: &str = "config://calculator/settings";
pub const GUIDE_URI: &str = "docs://calculator/guide";

const RESOURCES: [StaticResource; 2] = [
    StaticResource {
        uri: SETTINGS_URI,
        name: "calculator_settings",
        description: "Calculator configuration and available operations",
        mime_type: JSON_MIME,
    },
    StaticResource {
        uri: GUIDE_URI,
        name: "calculator_guide",
        description: "Usage guide for the calculator tools",
        mime_type: MARKDOWN_MIME,
    },
];

const GUIDE: &str = "\
# Calculator Server Guide

## Available Operations

1. **add(a, b)**: Returns a + b
   Example: add(5, 3) = 8

2. **subtract(a, b)**: Returns a - b
   Example: subtract(10, 4) = 6

3. **multiply(a, b)**: Returns a * b
   Example: multiply(7, 6) = 42

4. **divide(a, b)**: Returns a / b
   Example: divide(20, 4) = 5.0

## Error Handling

- Division by zero is rejected as invalid input
- Non-numeric or non-finite inputs are rejected as invalid input
- All inputs must be finite numbers (integer or decimal)

## Precision

The calculator uses IEEE 754 double precision floating-point arithmetic.
Results may contain minor rounding errors for some operations.
";

/// Two operands for a binary operation.
///
/// Operands arrive as raw JSON so a non-number is reported as invalid input
/// by [`Operands::numbers`] rather than as a decoding failure.
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct Operands {
    /// First number
    #[schemars(with = "f64")]
    pub a: Value,
    /// Second number
    #[schemars(with = "f64")]
    pub b: Value,
}

impl Operands {
    pub fn numbers(&self) -> crate::Result<(f64, f64)> {
        Ok((operand("a", &self.a)?, operand("b", &self.b)?))
    }
}

fn operand(name: &str, value: &Value) -> crate::Result<f64> {
    value
        .as_f64()
        .ok_or_else(|| Error::InvalidInput(format!("{name} must be a number, got {value}")))
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct ExpressionArgs {
    /// A mathematical expression to evaluate
    pub expression: String,
}

/// Payload of the settings resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculatorSettings {
    pub version: String,
    pub operations: Vec<String>,
    pub precision: String,
    pub max_value: f64,
    pub min_value: f64,
    pub supports_negative: bool,
    pub supports_decimals: bool,
}

impl Default for CalculatorSettings {
    fn default() -> Self {
        Self {
            version: "1.0.0".to_string(),
            operations: ["add", "subtract", "multiply", "divide"]
                .map(String::from)
                .to_vec(),
            precision: "IEEE 754 double precision".to_string(),
            max_value: f64::MAX,
            min_value: f64::MIN,
            supports_negative: true,
            supports_decimals: true,
        }
    }
}

pub fn add(a: f64, b: f64) -> crate::Result<f64> {
    check_finite(a, b)?;
    Ok(a + b)
}

pub fn subtract(a: f64, b: f64) -> crate::Result<f64> {
    check_finite(a, b)?;
    Ok(a - b)
}

pub fn multiply(a: f64, b: f64) -> crate::Result<f64> {
    check_finite(a, b)?;
    Ok(a * b)
}

pub fn divide(a: f64, b: f64) -> crate::Result<f64> {
    check_finite(a, b)?;
    if b == 0.0 {
        return Err(Error::DivisionByZero);
    }
    Ok(a / b)
}

/// Prompt text guiding step-by-step evaluation of `expression`.
pub fn expression_prompt(expression: &str) -> String {
    format!(
        "Please evaluate the following mathematical expression step by step:

Expression: {expression}

Instructions:
1. Break down the expression into individual operations
2. Use the appropriate calculator tool for each operation
3. Follow order of operations (parentheses, multiplication/division, addition/subtraction)
4. Show all intermediate steps
5. Provide the final result

Available tools: add, subtract, multiply, divide"
    )
}

fn check_finite(a: f64, b: f64) -> crate::Result<()> {
    for (name, value) in [("a", a), ("b", b)] {
        if !value.is_finite() {
            return Err(Error::InvalidInput(format!(
                "{name} must be a finite number, got {value}"
            )));
        }
    }
    Ok(())
}

/// Log the outcome of an arithmetic tool and shape it for the wire.
fn respond(
    op: &'static str,
    operands: &Operands,
    outcome: crate::Result<f64>,
) -> Result<CallToolResult, McpError> {
    let (a, b) = (&operands.a, &operands.b);
    match outcome {
        Ok(result) => {
            info!(op, %a, %b, result, "calculation performed");
            json_result(&result)
        }
        Err(e) => {
            warn!(op, %a, %b, error = %e, "calculation rejected");
            Err(e.into())
        }
    }
}

/// MCP server exposing the calculator.
#[derive(Clone)]
pub struct CalculatorServer {
    tool_router: ToolRouter<Self>,
    prompt_router: PromptRouter<Self>,
}

impl Default for CalculatorServer {
    fn default() -> Self {
        Self::new()
    }
}

#[tool_router]
impl CalculatorServer {
    pub fn new() -> Self {
        Self {
            tool_router: Self::tool_router(),
            prompt_router: Self::prompt_router(),
        }
    }

    #[tool(description = "Add two numbers together")]
    async fn add(
        &self,
        Parameters(operands): Parameters<Operands>,
    ) -> Result<CallToolResult, McpError> {
        respond("add", &operands, operands.numbers().and_then(|(a, b)| add(a, b)))
    }

    #[tool(description = "Subtract b from a")]
    async fn subtract(
        &self,
        Parameters(operands): Parameters<Operands>,
    ) -> Result<CallToolResult, McpError> {
        respond("subtract", &operands, operands.numbers().and_then(|(a, b)| subtract(a, b)))
    }

    #[tool(description = "Multiply two numbers")]
    async fn multiply(
        &self,
        Parameters(operands): Parameters<Operands>,
    ) -> Result<CallToolResult, McpError> {
        respond("multiply", &operands, operands.numbers().and_then(|(a, b)| multiply(a, b)))
    }

    #[tool(description = "Divide a by b; fails when b is zero")]
    async fn divide(
        &self,
        Parameters(operands): Parameters<Operands>,
    ) -> Result<CallToolResult, McpError> {
        respond("divide", &operands, operands.numbers().and_then(|(a, b)| divide(a, b)))
    }
}

#[prompt_router]
impl CalculatorServer {
    #[prompt(
        name = "calculate_expression",
        description = "Instructions for evaluating a mathematical expression with the calculator tools"
    )]
    async fn calculate_expression(
        &self,
        Parameters(args): Parameters<ExpressionArgs>,
    ) -> Vec<PromptMessage> {
        debug!(expression = %args.expression, "generating calculation prompt");
        vec![PromptMessage::new_text(
            PromptMessageRole::User,
            expression_prompt(&args.expression),
        )]
    }
}

#[tool_handler]
#[prompt_handler]
impl ServerHandler for CalculatorServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .enable_prompts()
                .build(),
            server_info: Implementation {
                name: "calculator".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            instructions: Some(
                "Basic arithmetic on two numbers: add, subtract, multiply, divide.".to_string(),
            ),
            ..Default::default()
        }
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParams>,
        _: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, McpError> {
        Ok(ListResourcesResult::with_all_items(
            RESOURCES.iter().map(StaticResource::to_resource).collect(),
        ))
    }

    async fn list_resource_templates(
        &self,
        _request: Option<PaginatedRequestParams>,
        _: RequestContext<RoleServer>,
    ) -> Result<ListResourceTemplatesResult, McpError> {
        Ok(ListResourceTemplatesResult::with_all_items(Vec::new()))
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParams,
        _: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        let uri = request.uri.as_str();
        match uri {
            SETTINGS_URI => {
                debug!("fetching calculator settings");
                json_contents(uri, &CalculatorSettings::default())
            }
            GUIDE_URI => {
                debug!("retrieving calculator guide");
                Ok(text_contents(uri, GUIDE))
            }
            _ => {
                warn!(uri, "unknown resource requested");
                Err(unknown_resource(uri))
            }
        }
    }
}
