//! Tool response envelopes and best-effort result extraction.
//!
//! Servers wrap a tool's value in one of a few shapes: a bare value, a text
//! item that may hold JSON, or an item exposing a JSON rendering of itself.
//! [`extract_result`] picks the value the caller meant, preferring a
//! `result` field over a `text` field over the raw object, and falls back
//! to the envelope itself when no shape applies. Extraction never fails.

use rmcp::model::CallToolResult;
use serde_json::{Map, Number, Value, json};
use tracing::warn;

/// A tool response in one of its known shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    /// A bare value with no content list.
    Plain(Value),
    /// An ordered list of content items; only the first is consulted.
    Content(Vec<ContentItem>),
}

/// One content item of an envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentItem {
    Text(String),
    Json(JsonSource),
    /// Neither text nor JSON.
    Opaque(Value),
}

/// Where an item's JSON comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum JsonSource {
    /// Rendered JSON text, parsed on demand.
    Rendered(String),
    /// Already-decoded JSON.
    Parsed(Value),
}

impl Envelope {
    /// Classify an arbitrary JSON value by shape.
    ///
    /// An object with a non-empty `content` array becomes
    /// [`Envelope::Content`]; anything else is [`Envelope::Plain`].
    pub fn from_value(value: Value) -> Self {
        let items = match &value {
            Value::Object(map) => map
                .get("content")
                .and_then(Value::as_array)
                .filter(|items| !items.is_empty())
                .cloned(),
            _ => None,
        };

        match items {
            Some(items) => {
                Envelope::Content(items.into_iter().map(ContentItem::from_value).collect())
            }
            None => Envelope::Plain(value),
        }
    }

    /// The envelope as JSON, unchanged by extraction.
    pub fn to_value(&self) -> Value {
        match self {
            Envelope::Plain(value) => value.clone(),
            Envelope::Content(items) => {
                json!({ "content": items.iter().map(ContentItem::to_value).collect::<Vec<_>>() })
            }
        }
    }
}

impl ContentItem {
    fn from_value(item: Value) -> Self {
        let classified = match &item {
            Value::Object(map) => match (map.get("text"), map.get("json")) {
                (Some(Value::String(text)), _) => Some(ContentItem::Text(text.clone())),
                (_, Some(Value::String(rendered))) => {
                    Some(ContentItem::Json(JsonSource::Rendered(rendered.clone())))
                }
                (_, Some(Value::Null) | None) => None,
                (_, Some(parsed)) => Some(ContentItem::Json(JsonSource::Parsed(parsed.clone()))),
            },
            _ => None,
        };
        classified.unwrap_or(ContentItem::Opaque(item))
    }

    fn to_value(&self) -> Value {
        match self {
            ContentItem::Text(text) => json!({ "type": "text", "text": text }),
            ContentItem::Json(JsonSource::Rendered(rendered)) => json!({ "json": rendered }),
            ContentItem::Json(JsonSource::Parsed(parsed)) => json!({ "json": parsed }),
            ContentItem::Opaque(value) => value.clone(),
        }
    }
}

impl TryFrom<&CallToolResult> for Envelope {
    type Error = serde_json::Error;

    /// Text content stays text; every other content kind is carried as its
    /// JSON rendering.
    fn try_from(result: &CallToolResult) -> Result<Self, Self::Error> {
        let items = result
            .content
            .iter()
            .map(|content| match content.as_text() {
                Some(text) => Ok(ContentItem::Text(text.text.clone())),
                None => serde_json::to_string(&content.raw)
                    .map(|rendered| ContentItem::Json(JsonSource::Rendered(rendered))),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Envelope::Content(items))
    }
}

/// Extract the intended value from `envelope`.
///
/// Returns the envelope's own JSON when no known shape applies.
pub fn extract_result(envelope: &Envelope) -> Value {
    unwrap_first(envelope).unwrap_or_else(|| envelope.to_value())
}

/// Extract the intended value from an `rmcp` tool result.
///
/// If the result cannot be classified, a warning is logged and the result
/// itself is returned as JSON.
pub fn extract_tool_result(result: &CallToolResult) -> Value {
    match Envelope::try_from(result) {
        Ok(envelope) => unwrap_first(&envelope).unwrap_or_else(|| raw_tool_result(result)),
        Err(e) => {
            warn!(error = %e, "could not extract result");
            raw_tool_result(result)
        }
    }
}

/// Coerce text to a number when it looks like one.
///
/// Text containing a `.` is tried as a float, anything else as an integer.
/// Integers beyond `i64` widen to `u64`, then to the nearest `f64`.
/// Text that parses as neither is returned unchanged.
pub fn coerce_numeric(text: &str) -> Value {
    let trimmed = text.trim();
    let number = if trimmed.contains('.') {
        trimmed.parse::<f64>().ok().and_then(Number::from_f64)
    } else {
        trimmed
            .parse::<i64>()
            .ok()
            .map(Number::from)
            .or_else(|| trimmed.parse::<u64>().ok().map(Number::from))
            .or_else(|| wide_integer(trimmed))
    };

    match number {
        Some(n) => Value::Number(n),
        None => Value::String(text.to_string()),
    }
}

/// An integer literal too wide for `u64`, as the nearest float.
fn wide_integer(text: &str) -> Option<Number> {
    let digits = text.strip_prefix(['-', '+']).unwrap_or(text);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse::<f64>().ok().and_then(Number::from_f64)
}

/// Render a value for display: strings bare, everything else as JSON.
pub fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn unwrap_first(envelope: &Envelope) -> Option<Value> {
    let Envelope::Content(items) = envelope else {
        return None;
    };

    match items.first()? {
        ContentItem::Text(text) => Some(unwrap_text(text)),
        ContentItem::Json(source) => Some(unwrap_json(source)),
        ContentItem::Opaque(_) => None,
    }
}

fn unwrap_text(text: &str) -> Value {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(mut map)) if map.contains_key("result") => {
            map.remove("result").unwrap_or_default()
        }
        Ok(parsed) => parsed,
        Err(_) => coerce_numeric(text),
    }
}

fn unwrap_json(source: &JsonSource) -> Value {
    let parsed = match source {
        JsonSource::Rendered(rendered) => match serde_json::from_str::<Value>(rendered) {
            Ok(parsed) => parsed,
            Err(_) => return Value::String(rendered.clone()),
        },
        JsonSource::Parsed(parsed) => parsed.clone(),
    };

    match parsed {
        Value::Object(map) => match preferred_field(map) {
            Value::String(text) => coerce_numeric(&text),
            other => other,
        },
        other => other,
    }
}

/// `result`, else `text`, else the whole mapping.
fn preferred_field(mut map: Map<String, Value>) -> Value {
    if let Some(result) = map.remove("result") {
        return result;
    }
    if let Some(text) = map.remove("text") {
        return text;
    }
    Value::Object(map)
}

fn raw_tool_result(result: &CallToolResult) -> Value {
    serde_json::to_value(result).unwrap_or_else(|e| {
        warn!(error = %e, "could not serialize tool result");
        Value::Null
    })
}
