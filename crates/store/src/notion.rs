//! HTTP client for the hosted document database API.

use async_trait::async_trait;
use relay_core::{OpenItem, Ticket};
use reqwest::{Client, ClientBuilder, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::schema::NotionSchema;
use crate::trait_::{CreatedPage, Result, StoreError, TicketStore};

/// Default API base URL.
pub const DEFAULT_API_URL: &str = "https://api.notion.com";

/// API version header value the property mapping is written against.
pub const DEFAULT_API_VERSION: &str = "2022-06-28";

/// Largest page size the query endpoint accepts.
const PAGE_SIZE: u32 = 100;

/// Connection settings for [`NotionStore`].
#[derive(Debug, Clone)]
pub struct NotionConfig {
    /// API base URL, without trailing slash
    pub api_url: String,

    /// Integration token
    pub token: String,

    /// Ticket database id
    pub database_id: String,

    /// `Notion-Version` header
    pub api_version: String,

    /// Per-request timeout
    pub timeout: Duration,

    /// Property names
    pub schema: NotionSchema,
}

impl NotionConfig {
    /// Config with default URL, version, timeout and schema.
    pub fn new(token: impl Into<String>, database_id: impl Into<String>) -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token: token.into(),
            database_id: database_id.into(),
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout: Duration::from_secs(30),
            schema: NotionSchema::default(),
        }
    }
}

/// Ticket store backed by a hosted database.
///
/// The client applies a request timeout but never retries; callers decide
/// what to do with a failed call.
#[derive(Clone)]
pub struct NotionStore {
    /// HTTP client
    client: Client,

    /// Connection settings
    config: NotionConfig,
}

#[derive(Deserialize)]
struct QueryResponse {
    results: Vec<Value>,
    #[serde(default)]
    has_more: bool,
    #[serde(default)]
    next_cursor: Option<String>,
}

#[derive(Deserialize)]
struct PageResponse {
    id: String,
    #[serde(default)]
    url: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

impl NotionStore {
    /// Create a new store client.
    pub fn new(mut config: NotionConfig) -> Result<Self> {
        if config.token.trim().is_empty() {
            return Err(StoreError::Config("integration token is not set".to_string()));
        }
        if config.database_id.trim().is_empty() {
            return Err(StoreError::Config("database id is not set".to_string()));
        }
        config.api_url = config.api_url.trim_end_matches('/').to_string();

        let client = ClientBuilder::new().timeout(config.timeout).build()?;

        Ok(Self { client, config })
    }

    fn request(&self, method: reqwest::Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.config.api_url, path))
            .bearer_auth(&self.config.token)
            .header("Notion-Version", &self.config.api_version)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let (code, message) = match serde_json::from_slice::<ErrorBody>(&body) {
                Ok(err) => (err.code, err.message),
                Err(_) => (String::new(), String::from_utf8_lossy(&body).into_owned()),
            };
            return Err(StoreError::Api {
                status: status.as_u16(),
                code,
                message,
            });
        }

        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl TicketStore for NotionStore {
    async fn query_open_assigned(&self) -> Result<Vec<OpenItem>> {
        let path = format!("/v1/databases/{}/query", self.config.database_id);
        let filter = self.config.schema.open_assigned_filter();

        let mut items = Vec::new();
        let mut cursor: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let mut body = json!({
                "filter": filter,
                "page_size": PAGE_SIZE,
            });
            if let Some(cursor) = &cursor {
                body["start_cursor"] = json!(cursor);
            }

            let response: QueryResponse = self
                .send(self.request(reqwest::Method::POST, &path).json(&body))
                .await?;
            pages += 1;

            for page in &response.results {
                let page_id = page
                    .get("id")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                items.push(OpenItem::new(page_id, self.config.schema.owner_ids(page)));
            }

            match (response.has_more, response.next_cursor) {
                (true, Some(next)) if cursor.as_deref() == Some(next.as_str()) => {
                    warn!("Query returned the same cursor twice, stopping after {} page(s)", pages);
                    break;
                }
                (true, Some(next)) => cursor = Some(next),
                _ => break,
            }
        }

        debug!("Queried {} open assigned tickets in {} page(s)", items.len(), pages);
        Ok(items)
    }

    async fn create_ticket(&self, ticket: &Ticket) -> Result<CreatedPage> {
        let body = json!({
            "parent": { "database_id": self.config.database_id },
            "properties": self.config.schema.page_properties(ticket),
        });

        let page: PageResponse = self
            .send(self.request(reqwest::Method::POST, "/v1/pages").json(&body))
            .await?;

        info!("Created page {} for ticket {}", page.id, ticket.id);
        Ok(CreatedPage {
            page_id: page.id,
            url: page.url,
        })
    }

    async fn health_check(&self) -> Result<()> {
        let path = format!("/v1/databases/{}", self.config.database_id);
        let _: Value = self.send(self.request(reqwest::Method::GET, &path)).await?;
        Ok(())
    }
}
