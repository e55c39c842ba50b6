//! Scripted walkthroughs of the two demo servers.
//!
//! Each run prints to the given writer. A failing call is reported and
//! the sequence moves on; only output errors abort a run.

use std::io::Write;

use serde_json::{Value, json};
use server::CalculatorSettings;
use server::calculator::{GUIDE_URI, SETTINGS_URI};
use server::data_processor::USER_COUNT_URI;
use tracing::info;

use crate::envelope::display;
use crate::{McpClient, Result};

const RULE_WIDTH: usize = 60;
const GUIDE_PREVIEW_CHARS: usize = 200;

/// Walk through the calculator server.
pub async fn run_calculator_demo(client: &McpClient, out: &mut impl Write) -> Result<()> {
    info!("running calculator demo");
    section(out, "Calculator MCP demo")?;
    discover(client, out).await?;

    section(out, "Tool calls")?;
    report(out, "add(15, 27)", client.call_tool_value("add", json!({ "a": 15, "b": 27 })).await)?;
    report(
        out,
        "divide(100, 5)",
        client.call_tool_value("divide", json!({ "a": 100, "b": 5 })).await,
    )?;
    match client.call_tool_value("divide", json!({ "a": 10, "b": 0 })).await {
        Ok(value) => writeln!(out, "divide(10, 0) unexpectedly returned {}", display(&value))?,
        Err(e) => writeln!(out, "✓ Error caught correctly: {e}")?,
    }

    section(out, "Resources")?;
    match client.read_resource_json::<CalculatorSettings>(SETTINGS_URI).await {
        Ok(settings) => writeln!(out, "Calculator version: {}", settings.version)?,
        Err(e) => writeln!(out, "Failed to read settings: {e}")?,
    }
    match client.read_resource_text(GUIDE_URI).await {
        Ok(guide) => {
            let preview: String = guide.chars().take(GUIDE_PREVIEW_CHARS).collect();
            writeln!(out, "Guide preview:\n{preview}...")?;
        }
        Err(e) => writeln!(out, "Failed to read guide: {e}")?,
    }

    section(out, "Chained calculation: (10 + 5) * 3 - 7")?;
    if let Err(e) = chain(client, out).await {
        writeln!(out, "Chain failed: {e}")?;
    }

    section(out, "Prompts")?;
    match client
        .get_prompt_text(
            "calculate_expression",
            json!({ "expression": "25 * 4 + 10 / 2" }),
        )
        .await
    {
        Ok(text) => writeln!(out, "{text}")?,
        Err(e) => writeln!(out, "Failed to get prompt: {e}")?,
    }

    Ok(())
}

/// Walk through the data processor server.
pub async fn run_data_processor_demo(client: &McpClient, out: &mut impl Write) -> Result<()> {
    info!("running data processor demo");
    section(out, "Data processor MCP demo")?;
    discover(client, out).await?;

    section(out, "Tool calls")?;
    report(
        out,
        "search_users(\"bob\")",
        client
            .call_tool_value("search_users", json!({ "query": "bob" }))
            .await,
    )?;
    report(
        out,
        "get_user_details(2)",
        client
            .call_tool_value("get_user_details", json!({ "user_id": 2 }))
            .await,
    )?;
    report(
        out,
        "get_user_details(999)",
        client
            .call_tool_value("get_user_details", json!({ "user_id": 999 }))
            .await,
    )?;
    report(
        out,
        "calculate_average_product_price()",
        client
            .call_tool_value("calculate_average_product_price", Value::Null)
            .await,
    )?;

    section(out, "Resources")?;
    for uri in [USER_COUNT_URI, "data://product/102", "data://product/999"] {
        match client.read_resource_text(uri).await {
            Ok(text) => writeln!(out, "{uri}:\n{text}")?,
            Err(e) => writeln!(out, "{uri}: error: {e}")?,
        }
    }

    section(out, "Prompts")?;
    match client
        .get_prompt_text("analyze_user_data", json!({ "user_id": "2" }))
        .await
    {
        Ok(text) => writeln!(out, "{text}")?,
        Err(e) => writeln!(out, "Failed to get prompt: {e}")?,
    }

    Ok(())
}

async fn chain(client: &McpClient, out: &mut impl Write) -> Result<()> {
    let sum = client
        .call_tool_value("add", json!({ "a": 10, "b": 5 }))
        .await?;
    writeln!(out, "10 + 5 = {}", display(&sum))?;

    let product = client
        .call_tool_value("multiply", json!({ "a": sum, "b": 3 }))
        .await?;
    writeln!(out, "{} * 3 = {}", display(&sum), display(&product))?;

    let difference = client
        .call_tool_value("subtract", json!({ "a": product, "b": 7 }))
        .await?;
    writeln!(out, "{} - 7 = {}", display(&product), display(&difference))?;
    Ok(())
}

async fn discover(client: &McpClient, out: &mut impl Write) -> Result<()> {
    let tools = client.list_tools().await?;
    writeln!(out, "Tools ({}):", tools.len())?;
    for tool in &tools {
        writeln!(
            out,
            "  - {}: {}",
            tool.name,
            tool.description.as_deref().unwrap_or("")
        )?;
    }

    let resources = client.list_resources().await?;
    writeln!(out, "Resources ({}):", resources.len())?;
    for resource in &resources {
        writeln!(out, "  - {} ({})", resource.uri, resource.name)?;
    }

    let templates = client.list_resource_templates().await?;
    if !templates.is_empty() {
        writeln!(out, "Resource templates ({}):", templates.len())?;
        for template in &templates {
            writeln!(out, "  - {} ({})", template.uri_template, template.name)?;
        }
    }

    let prompts = client.list_prompts().await?;
    writeln!(out, "Prompts ({}):", prompts.len())?;
    for prompt in &prompts {
        writeln!(
            out,
            "  - {}: {}",
            prompt.name,
            prompt.description.as_deref().unwrap_or("")
        )?;
    }
    Ok(())
}

fn report(out: &mut impl Write, label: &str, outcome: Result<Value>) -> Result<()> {
    match outcome {
        Ok(value) => writeln!(out, "{label} = {}", display(&value))?,
        Err(e) => writeln!(out, "{label} failed: {e}")?,
    }
    Ok(())
}

fn section(out: &mut impl Write, title: &str) -> Result<()> {
    let rule = "=".repeat(RULE_WIDTH);
    writeln!(out, "\n{rule}\n{title}\n{rule}")?;
    Ok(())
}
