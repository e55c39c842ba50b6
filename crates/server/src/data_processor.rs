//! Data processor server: user and product lookups over the record store.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use records::{Product, RecordId, RecordStore, User};
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
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, error, info, warn};

use crate::Error;
use crate::content::{
    JSON_MIME, StaticResource, TemplateResource, json_contents, json_result, unknown_resource,
};

pub const USER_COUNT_URI: &str = "data://users/count";
pub const PRODUCT_URI_PREFIX: &str = "data://product/";

const SEARCH_LATENCY: Duration = Duration::from_millis(100);
const DETAILS_LATENCY: Duration = Duration::from_millis(50);
const AVERAGE_LATENCY: Duration = Duration::from_millis(200);

const RESOURCES: [StaticResource; 1] = [StaticResource {
    uri: USER_COUNT_URI,
    name: "user_count",
    description: "Current number of users",
    mime_type: JSON_MIME,
}];

const TEMPLATES: [TemplateResource; 1] = [TemplateResource {
    uri_template: "data://product/{product_id}",
    name: "product_by_id",
    description: "A single product by id",
    mime_type: JSON_MIME,
}];

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct SearchArgs {
    /// Search term matched against user names and emails
    pub query: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct UserIdArgs {
    /// The unique identifier of the user
    #[serde(deserialize_with = "lenient_id")]
    pub user_id: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    Active,
}

/// A user with the computed account fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserDetails {
    #[serde(flatten)]
    pub user: User,
    pub account_status: AccountStatus,
    pub created_at: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordCount {
    pub count: usize,
    pub resource: String,
}

/// Result of reading a product resource.
///
/// A miss is reported in-band with the ids that do exist instead of as a
/// protocol error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProductLookup {
    Found(Product),
    Missing {
        error: String,
        available_ids: Vec<RecordId>,
    },
}

/// Users whose name or email contains `query`, ignoring case.
pub fn search_users<'a>(store: &'a RecordStore, query: &str) -> crate::Result<Vec<&'a User>> {
    if query.is_empty() {
        return Err(Error::InvalidInput(
            "query must be a non-empty string".to_string(),
        ));
    }
    Ok(store.search_users(query))
}

pub fn user_details(store: &RecordStore, user_id: i64) -> crate::Result<UserDetails> {
    if user_id < 0 {
        return Err(Error::InvalidInput(format!("invalid user_id: {user_id}")));
    }
    let user = RecordId::try_from(user_id)
        .ok()
        .and_then(|id| store.user(id))
        .ok_or_else(|| Error::NotFound(format!("user with id {user_id}")))?;
    let created_at = NaiveDate::from_ymd_opt(2024, 1, 15)
        .ok_or_else(|| Error::Unexpected("invalid account creation date".to_string()))?;

    Ok(UserDetails {
        user: user.clone(),
        account_status: AccountStatus::Active,
        created_at,
    })
}

/// Mean product price rounded to cents.
pub fn average_product_price(store: &RecordStore) -> crate::Result<f64> {
    let average = store
        .average_price()
        .ok_or(Error::EmptyCollection("products"))?;
    Ok((average * 100.0).round() / 100.0)
}

/// Any integer is a valid lookup; ids outside the store's range simply miss.
pub fn product_lookup(store: &RecordStore, id: i64) -> ProductLookup {
    match RecordId::try_from(id).ok().and_then(|id| store.product(id)) {
        Some(product) => ProductLookup::Found(product.clone()),
        None => ProductLookup::Missing {
            error: format!("Product {id} not found"),
            available_ids: store.product_ids(),
        },
    }
}

pub fn user_count(store: &RecordStore) -> RecordCount {
    RecordCount {
        count: store.users().len(),
        resource: "users".to_string(),
    }
}

/// Prompt text guiding analysis of one user.
pub fn analysis_prompt(user_id: i64) -> String {
    format!(
        "You are analyzing data for user ID {user_id}.

1. First, retrieve the user details using get_user_details tool with user_id={user_id}
2. Then, fetch any related products (use calculate_average_product_price for context)
3. Provide a summary of the user's profile
4. Suggest relevant products based on the data"
    )
}

/// Accept an id as a JSON number or a numeric string.
///
/// Prompt arguments always travel as strings.
fn lenient_id<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(i64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

fn parse_product_uri(uri: &str) -> Option<crate::Result<i64>> {
    let raw = uri.strip_prefix(PRODUCT_URI_PREFIX)?;
    Some(
        raw.trim()
            .parse()
            .map_err(|_| Error::InvalidInput(format!("invalid product id: {raw}"))),
    )
}

/// MCP server exposing the record store.
#[derive(Clone)]
pub struct DataProcessorServer {
    store: Arc<RecordStore>,
    tool_router: ToolRouter<Self>,
    prompt_router: PromptRouter<Self>,
}

#[tool_router]
impl DataProcessorServer {
    pub fn new(store: Arc<RecordStore>) -> Self {
        Self {
            store,
            tool_router: Self::tool_router(),
            prompt_router: Self::prompt_router(),
        }
    }

    /// Server over the bundled seed records.
    pub fn seeded() -> crate::Result<Self> {
        Ok(Self::new(Arc::new(RecordStore::seeded()?)))
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    #[tool(description = "Search for users by name or email (case-insensitive)")]
    async fn search_users(
        &self,
        Parameters(args): Parameters<SearchArgs>,
    ) -> Result<CallToolResult, McpError> {
        tokio::time::sleep(SEARCH_LATENCY).await;
        match search_users(&self.store, &args.query) {
            Ok(matches) => {
                info!(query = %args.query, matches = matches.len(), "user search completed");
                json_result(&matches)
            }
            Err(e) => {
                error!(error = %e, "invalid search query");
                Err(e.into())
            }
        }
    }

    #[tool(description = "Retrieve detailed information for a specific user")]
    async fn get_user_details(
        &self,
        Parameters(args): Parameters<UserIdArgs>,
    ) -> Result<CallToolResult, McpError> {
        tokio::time::sleep(DETAILS_LATENCY).await;
        match user_details(&self.store, args.user_id) {
            Ok(details) => {
                info!(user_id = args.user_id, "retrieved user details");
                json_result(&details)
            }
            Err(e) => {
                warn!(user_id = args.user_id, error = %e, "error getting user details");
                Err(e.into())
            }
        }
    }

    #[tool(description = "Calculate the average price of all products")]
    async fn calculate_average_product_price(&self) -> Result<CallToolResult, McpError> {
        tokio::time::sleep(AVERAGE_LATENCY).await;
        match average_product_price(&self.store) {
            Ok(average) => {
                info!(average, "calculated average product price");
                json_result(&average)
            }
            Err(e) => {
                warn!(error = %e, "average price calculation failed");
                Err(e.into())
            }
        }
    }
}

#[prompt_router]
impl DataProcessorServer {
    #[prompt(
        name = "analyze_user_data",
        description = "Prompt template for analyzing user data"
    )]
    async fn analyze_user_data(
        &self,
        Parameters(args): Parameters<UserIdArgs>,
    ) -> Vec<PromptMessage> {
        debug!(user_id = args.user_id, "generating analysis prompt");
        vec![PromptMessage::new_text(
            PromptMessageRole::User,
            analysis_prompt(args.user_id),
        )]
    }
}

#[tool_handler]
#[prompt_handler]
impl ServerHandler for DataProcessorServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .enable_prompts()
                .build(),
            server_info: Implementation {
                name: "data-processor".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            instructions: Some(
                "Search users, fetch user details and compute product statistics.".to_string(),
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
        let templates = TEMPLATES
            .iter()
            .map(TemplateResource::to_template)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ListResourceTemplatesResult::with_all_items(templates))
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParams,
        _: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        let uri = request.uri.as_str();
        if uri == USER_COUNT_URI {
            let count = user_count(&self.store);
            debug!(count = count.count, "retrieving user count");
            return json_contents(uri, &count);
        }

        match parse_product_uri(uri) {
            Some(Ok(id)) => {
                debug!(product_id = id, "fetching product");
                let lookup = product_lookup(&self.store, id);
                if matches!(lookup, ProductLookup::Missing { .. }) {
                    warn!(product_id = id, "product not found");
                }
                json_contents(uri, &lookup)
            }
            Some(Err(e)) => {
                warn!(uri, error = %e, "malformed product uri");
                Err(e.into())
            }
            None => {
                warn!(uri, "unknown resource requested");
                Err(unknown_resource(uri))
            }
        }
    }
}
