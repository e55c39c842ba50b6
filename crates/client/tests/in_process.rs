use std::sync::Arc;

use client::demo::{run_calculator_demo, run_data_processor_demo};
use client::{Error, McpClient};
use records::{Product, RecordStore};
use rmcp::model::ErrorCode;
use rmcp::service::ServiceError;
use serde_json::{Value, json};
use server::{CalculatorServer, CalculatorSettings, DataProcessorServer, ProductLookup};

async fn calculator() -> McpClient {
    McpClient::in_process(CalculatorServer::new())
        .await
        .expect("connect to calculator")
}

async fn data_processor() -> McpClient {
    McpClient::in_process(DataProcessorServer::seeded().expect("seed records"))
        .await
        .expect("connect to data processor")
}

/// Protocol error code and `kind` data of a failed request.
fn protocol_error(err: &Error) -> (ErrorCode, Option<Value>) {
    match err {
        Error::Service(ServiceError::McpError(data)) => (
            data.code,
            data.data.as_ref().and_then(|d| d.get("kind")).cloned(),
        ),
        other => panic!("expected a protocol error, got {other:?}"),
    }
}

#[tokio::test]
async fn calculator_lists_its_surface() {
    let client = calculator().await;

    let mut tools: Vec<String> = client
        .list_tools()
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.name.to_string())
        .collect();
    tools.sort();
    assert_eq!(tools, ["add", "divide", "multiply", "subtract"]);

    let resources: Vec<String> = client
        .list_resources()
        .await
        .unwrap()
        .iter()
        .map(|r| r.uri.clone())
        .collect();
    assert!(resources.contains(&"config://calculator/settings".to_string()));
    assert!(resources.contains(&"docs://calculator/guide".to_string()));

    let prompts = client.list_prompts().await.unwrap();
    assert_eq!(prompts.len(), 1);
    assert_eq!(prompts[0].name, "calculate_expression");

    client.shutdown().await.unwrap();
}

#[tokio::test]
async fn calculator_tools_return_plain_numbers() {
    let client = calculator().await;

    let sum = client
        .call_tool_value("add", json!({ "a": 15, "b": 27 }))
        .await
        .unwrap();
    assert_eq!(sum, json!(42.0));

    let quotient = client
        .call_tool_value("divide", json!({ "a": 100, "b": 5 }))
        .await
        .unwrap();
    assert_eq!(quotient, json!(20.0));

    client.shutdown().await.unwrap();
}

#[tokio::test]
async fn division_by_zero_surfaces_as_error() {
    let client = calculator().await;

    let err = client
        .call_tool_value("divide", json!({ "a": 10, "b": 0 }))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Service(_)), "unexpected error: {err:?}");
    assert!(err.to_string().contains("cannot divide by zero"));

    // The session stays usable after a failed call.
    let sum = client
        .call_tool_value("add", json!({ "a": 1, "b": 1 }))
        .await
        .unwrap();
    assert_eq!(sum, json!(2.0));

    client.shutdown().await.unwrap();
}

#[tokio::test]
async fn bad_operands_share_the_invalid_params_code() {
    let client = calculator().await;

    let zero = client
        .call_tool_value("divide", json!({ "a": 10, "b": 0 }))
        .await
        .unwrap_err();
    assert_eq!(
        protocol_error(&zero),
        (ErrorCode::INVALID_PARAMS, Some(json!("division_by_zero")))
    );

    let text = client
        .call_tool_value("add", json!({ "a": "x", "b": 1 }))
        .await
        .unwrap_err();
    assert_eq!(
        protocol_error(&text),
        (ErrorCode::INVALID_PARAMS, Some(json!("invalid_input")))
    );
    assert!(text.to_string().contains("a must be a number"));

    // JSON has no NaN or infinity; serde_json sends them as null.
    let infinite = client
        .call_tool_value("multiply", json!({ "a": 2, "b": f64::INFINITY }))
        .await
        .unwrap_err();
    assert_eq!(
        protocol_error(&infinite),
        (ErrorCode::INVALID_PARAMS, Some(json!("invalid_input")))
    );

    let missing = client
        .call_tool_value("subtract", json!({ "a": 1 }))
        .await
        .unwrap_err();
    assert_eq!(protocol_error(&missing).0, ErrorCode::INVALID_PARAMS);

    client.shutdown().await.unwrap();
}

#[tokio::test]
async fn chained_results_feed_forward() {
    let client = calculator().await;

    let sum = client
        .call_tool_value("add", json!({ "a": 10, "b": 5 }))
        .await
        .unwrap();
    let product = client
        .call_tool_value("multiply", json!({ "a": sum, "b": 3 }))
        .await
        .unwrap();
    let result = client
        .call_tool_value("subtract", json!({ "a": product, "b": 7 }))
        .await
        .unwrap();
    assert_eq!(result, json!(38.0));

    client.shutdown().await.unwrap();
}

#[tokio::test]
async fn calculator_resources_read() {
    let client = calculator().await;

    let settings: CalculatorSettings = client
        .read_resource_json("config://calculator/settings")
        .await
        .unwrap();
    assert_eq!(settings, CalculatorSettings::default());
    assert_eq!(settings.version, "1.0.0");

    let guide = client
        .read_resource_text("docs://calculator/guide")
        .await
        .unwrap();
    assert!(guide.starts_with("# Calculator Server Guide"));

    let err = client
        .read_resource_text("docs://calculator/missing")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Service(_)));

    client.shutdown().await.unwrap();
}

#[tokio::test]
async fn expression_prompt_renders() {
    let client = calculator().await;

    let text = client
        .get_prompt_text(
            "calculate_expression",
            json!({ "expression": "25 * 4 + 10 / 2" }),
        )
        .await
        .unwrap();
    assert!(text.contains("Expression: 25 * 4 + 10 / 2"));
    assert!(text.contains("add, subtract, multiply, divide"));

    client.shutdown().await.unwrap();
}

#[tokio::test]
async fn search_finds_bob() {
    let client = data_processor().await;

    let users = client
        .call_tool_value("search_users", json!({ "query": "BOB" }))
        .await
        .unwrap();
    assert_eq!(
        users,
        json!([{ "id": 2, "name": "Bob", "email": "bob@example.com" }])
    );

    let err = client
        .call_tool_value("search_users", json!({ "query": "" }))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Service(_)));

    client.shutdown().await.unwrap();
}

#[tokio::test]
async fn user_details_and_missing_user() {
    let client = data_processor().await;

    let details = client
        .call_tool_value("get_user_details", json!({ "user_id": 2 }))
        .await
        .unwrap();
    assert_eq!(details["name"], "Bob");
    assert_eq!(details["account_status"], "active");
    assert_eq!(details["created_at"], "2024-01-15");

    let err = client
        .call_tool_value("get_user_details", json!({ "user_id": 999 }))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("not found"), "unexpected error: {err}");

    client.shutdown().await.unwrap();
}

#[tokio::test]
async fn user_id_range_decides_the_error_kind() {
    let client = data_processor().await;

    let too_big = client
        .call_tool_value("get_user_details", json!({ "user_id": 4_294_967_296_i64 }))
        .await
        .unwrap_err();
    assert_eq!(
        protocol_error(&too_big),
        (ErrorCode::RESOURCE_NOT_FOUND, Some(json!("not_found")))
    );

    let negative = client
        .call_tool_value("get_user_details", json!({ "user_id": -1 }))
        .await
        .unwrap_err();
    assert_eq!(
        protocol_error(&negative),
        (ErrorCode::INVALID_PARAMS, Some(json!("invalid_input")))
    );

    client.shutdown().await.unwrap();
}

#[tokio::test]
async fn any_integer_product_id_is_a_lookup() {
    let client = data_processor().await;

    for id in ["-1", "0", "5000000000"] {
        let payload: Value = client
            .read_resource_json(&format!("data://product/{id}"))
            .await
            .unwrap();
        assert_eq!(payload["error"], format!("Product {id} not found"));
        assert_eq!(payload["available_ids"], json!([101, 102, 103]));
    }

    client.shutdown().await.unwrap();
}

#[tokio::test]
async fn average_price_over_seed_products() {
    let client = data_processor().await;

    let average = client
        .call_tool_value("calculate_average_product_price", Value::Null)
        .await
        .unwrap();
    assert_eq!(average, json!(369.99));

    client.shutdown().await.unwrap();
}

#[tokio::test]
async fn empty_catalogue_has_no_average() {
    let store = RecordStore::from_records(Vec::new(), Vec::new()).unwrap();
    let client = McpClient::in_process(DataProcessorServer::new(Arc::new(store)))
        .await
        .unwrap();

    let err = client
        .call_tool_value("calculate_average_product_price", Value::Null)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Service(_)));

    client.shutdown().await.unwrap();
}

#[tokio::test]
async fn data_resources_read() {
    let client = data_processor().await;

    let count: Value = client
        .read_resource_json("data://users/count")
        .await
        .unwrap();
    assert_eq!(count, json!({ "count": 3, "resource": "users" }));

    let found: ProductLookup = client
        .read_resource_json("data://product/102")
        .await
        .unwrap();
    assert_eq!(found, ProductLookup::Found(Product::new(102, "Mouse", 29.99)));

    let missing: Value = client
        .read_resource_json("data://product/999")
        .await
        .unwrap();
    assert_eq!(missing["error"], "Product 999 not found");
    assert_eq!(missing["available_ids"], json!([101, 102, 103]));

    let err = client
        .read_resource_text("data://product/abc")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Service(_)));

    client.shutdown().await.unwrap();
}

#[tokio::test]
async fn product_template_is_listed() {
    let client = data_processor().await;

    let templates = client.list_resource_templates().await.unwrap();
    assert_eq!(templates.len(), 1);
    assert_eq!(templates[0].uri_template, "data://product/{product_id}");

    client.shutdown().await.unwrap();
}

#[tokio::test]
async fn analysis_prompt_accepts_string_id() {
    let client = data_processor().await;

    let text = client
        .get_prompt_text("analyze_user_data", json!({ "user_id": "2" }))
        .await
        .unwrap();
    assert!(text.contains("user ID 2"));
    assert!(text.contains("calculate_average_product_price"));

    client.shutdown().await.unwrap();
}

#[tokio::test]
async fn calculator_demo_runs_to_completion() {
    let client = calculator().await;
    let mut out = Vec::new();

    run_calculator_demo(&client, &mut out).await.unwrap();
    client.shutdown().await.unwrap();

    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("add(15, 27) = 42.0"));
    assert!(text.contains("divide(100, 5) = 20.0"));
    assert!(text.contains("✓ Error caught correctly:"));
    assert!(text.contains("Calculator version: 1.0.0"));
    assert!(text.contains("45.0 - 7 = 38.0"));
    assert!(text.contains("Expression: 25 * 4 + 10 / 2"));
}

#[tokio::test]
async fn data_processor_demo_runs_to_completion() {
    let client = data_processor().await;
    let mut out = Vec::new();

    run_data_processor_demo(&client, &mut out).await.unwrap();
    client.shutdown().await.unwrap();

    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("Bob"));
    assert!(text.contains("get_user_details(999) failed:"));
    assert!(text.contains("calculate_average_product_price() = 369.99"));
    assert!(text.contains("Product 999 not found"));
    assert!(text.contains("Resource templates (1):"));
    assert!(text.contains("user ID 2"));
}
