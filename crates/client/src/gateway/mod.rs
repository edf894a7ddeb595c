//! Remote data gateway for the hosted backend.
//!
//! # Architecture
//!
//! - Table-oriented REST calls via `reqwest` against the backend's
//!   `/rest/v1/{table}` surface
//! - The backend is source of truth - no local sync, direct API calls
//! - In-memory caching via `moka` for single-product lookups (5 minute TTL);
//!   collection reads always hit the backend so the realtime managers see
//!   exact state
//! - The gateway performs no retries; every failure surfaces as a
//!   [`RemoteError`] for the caller to handle
//!
//! # Access paths
//!
//! - Customer reads are restricted to `active = true` rows
//! - User-scoped reads/writes (cart, favorites, addresses, orders) carry the
//!   session's bearer token (see [`account`])
//! - The administrative path (see [`admin`]) authenticates with the
//!   service-role key and bypasses the active filter

mod account;
mod admin;
pub mod rows;

pub use admin::AdminGateway;

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};

use souq_core::ProductId;

use crate::config::ClientConfig;
use crate::models::{Banner, Category, ContactInfo, Product, Session};

use rows::{BannerRow, CategoryRow, ContactInfoRow, ProductRow};

/// Errors that can occur when talking to the hosted backend.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body could not be decoded.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Backend rejected the request.
    #[error("Backend error ({status}): {message}")]
    Backend { status: u16, message: String },

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Sort direction for a query's single order column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// A filtered, ordered read against one table.
///
/// Supports the subset of the backend's query language this client uses:
/// equality/range filters, one order column, a row limit, and a column
/// projection.
#[derive(Debug, Clone, Default)]
pub struct QuerySpec {
    select: Option<String>,
    filters: Vec<(String, String)>,
    order: Option<(String, SortDirection)>,
    limit: Option<u32>,
}

impl QuerySpec {
    /// An unfiltered query returning all columns.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Project specific columns (backend `select` syntax, may embed).
    #[must_use]
    pub fn select(mut self, columns: impl Into<String>) -> Self {
        self.select = Some(columns.into());
        self
    }

    /// Keep rows where `column` equals `value`.
    #[must_use]
    pub fn eq(mut self, column: &str, value: impl ToString) -> Self {
        self.filters
            .push((column.to_string(), format!("eq.{}", value.to_string())));
        self
    }

    /// Keep rows where `column >= value`.
    #[must_use]
    pub fn gte(mut self, column: &str, value: impl ToString) -> Self {
        self.filters
            .push((column.to_string(), format!("gte.{}", value.to_string())));
        self
    }

    /// Keep rows where `column <= value`.
    #[must_use]
    pub fn lte(mut self, column: &str, value: impl ToString) -> Self {
        self.filters
            .push((column.to_string(), format!("lte.{}", value.to_string())));
        self
    }

    /// Order by one column.
    #[must_use]
    pub fn order_by(mut self, column: &str, direction: SortDirection) -> Self {
        self.order = Some((column.to_string(), direction));
        self
    }

    /// Cap the number of returned rows.
    #[must_use]
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Render as query-string pairs.
    fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::with_capacity(self.filters.len() + 3);
        if let Some(select) = &self.select {
            pairs.push(("select".to_string(), select.clone()));
        }
        pairs.extend(self.filters.iter().cloned());
        if let Some((column, direction)) = &self.order {
            let suffix = match direction {
                SortDirection::Ascending => "asc",
                SortDirection::Descending => "desc",
            };
            pairs.push(("order".to_string(), format!("{column}.{suffix}")));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }
        pairs
    }
}

/// Credential attached to a request.
#[derive(Clone, Copy)]
pub(crate) enum Auth<'a> {
    /// Anonymous: the public key doubles as the bearer.
    Anon,
    /// A signed-in user's bearer token.
    User(&'a Session),
    /// The service-role key (admin path).
    Service(&'a SecretString),
}

// =============================================================================
// RemoteGateway
// =============================================================================

/// Client for the hosted backend's REST surface.
///
/// Cheaply cloneable; all clones share one HTTP pool and product cache.
#[derive(Clone)]
pub struct RemoteGateway {
    inner: Arc<GatewayInner>,
}

struct GatewayInner {
    http: reqwest::Client,
    rest_root: String,
    anon_key: String,
    product_cache: Cache<ProductId, Product>,
}

impl RemoteGateway {
    /// Create a new gateway from configuration.
    #[must_use]
    pub fn new(config: &ClientConfig) -> Self {
        let product_cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        let rest_root = format!(
            "{}/rest/v1",
            config.backend_url.as_str().trim_end_matches('/')
        );

        Self {
            inner: Arc::new(GatewayInner {
                http: reqwest::Client::new(),
                rest_root,
                anon_key: config.anon_key.clone(),
                product_cache,
            }),
        }
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/{table}", self.inner.rest_root)
    }

    fn bearer(&self, auth: Auth<'_>) -> String {
        let token = match auth {
            Auth::Anon => self.inner.anon_key.as_str(),
            Auth::User(session) => session.access_token.expose_secret(),
            Auth::Service(key) => key.expose_secret(),
        };
        format!("Bearer {token}")
    }

    /// Decode a response, mapping non-success statuses to `RemoteError`.
    async fn decode<T: DeserializeOwned>(
        &self,
        table: &str,
        response: reqwest::Response,
    ) -> Result<T, RemoteError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = backend_message(&body);
            tracing::error!(
                table,
                status = %status,
                message = %message,
                "backend returned non-success status"
            );
            return Err(RemoteError::Backend {
                status: status.as_u16(),
                message,
            });
        }

        match serde_json::from_str(&body) {
            Ok(decoded) => Ok(decoded),
            Err(e) => {
                tracing::error!(
                    table,
                    error = %e,
                    body = %body.chars().take(500).collect::<String>(),
                    "failed to decode backend response"
                );
                Err(RemoteError::Parse(e))
            }
        }
    }

    /// Fetch rows from `table`.
    pub(crate) async fn get_rows<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &QuerySpec,
        auth: Auth<'_>,
    ) -> Result<Vec<T>, RemoteError> {
        let response = self
            .inner
            .http
            .get(self.table_url(table))
            .query(&query.to_pairs())
            .header("apikey", &self.inner.anon_key)
            .header("Authorization", self.bearer(auth))
            .send()
            .await?;

        self.decode(table, response).await
    }

    /// Insert a row into `table`, returning the created rows.
    pub(crate) async fn insert_rows<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        table: &str,
        body: &B,
        auth: Auth<'_>,
    ) -> Result<Vec<T>, RemoteError> {
        let response = self
            .inner
            .http
            .post(self.table_url(table))
            .header("apikey", &self.inner.anon_key)
            .header("Authorization", self.bearer(auth))
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .await?;

        self.decode(table, response).await
    }

    /// Insert a row and return the single created record.
    pub(crate) async fn insert_one<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        table: &str,
        body: &B,
        auth: Auth<'_>,
    ) -> Result<T, RemoteError> {
        let mut rows: Vec<T> = self.insert_rows(table, body, auth).await?;
        rows.pop()
            .ok_or_else(|| RemoteError::NotFound(format!("{table} insert returned no rows")))
    }

    /// Update rows matched by `query` with the partial `body`.
    pub(crate) async fn patch_rows<B: Serialize + Sync>(
        &self,
        table: &str,
        query: &QuerySpec,
        body: &B,
        auth: Auth<'_>,
    ) -> Result<(), RemoteError> {
        let response = self
            .inner
            .http
            .patch(self.table_url(table))
            .query(&query.to_pairs())
            .header("apikey", &self.inner.anon_key)
            .header("Authorization", self.bearer(auth))
            .json(body)
            .send()
            .await?;

        check_status(table, response).await
    }

    /// Delete rows matched by `query`.
    pub(crate) async fn delete_rows(
        &self,
        table: &str,
        query: &QuerySpec,
        auth: Auth<'_>,
    ) -> Result<(), RemoteError> {
        let response = self
            .inner
            .http
            .delete(self.table_url(table))
            .query(&query.to_pairs())
            .header("apikey", &self.inner.anon_key)
            .header("Authorization", self.bearer(auth))
            .send()
            .await?;

        check_status(table, response).await
    }

    // =========================================================================
    // Catalog Methods
    // =========================================================================

    /// Get all active products.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn active_products(&self) -> Result<Vec<Product>, RemoteError> {
        let rows: Vec<ProductRow> = self
            .get_rows("products", &QuerySpec::new().eq("active", true), Auth::Anon)
            .await?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Get a single active product by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found or the API request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn product(&self, id: ProductId) -> Result<Product, RemoteError> {
        // Check cache
        if let Some(product) = self.inner.product_cache.get(&id).await {
            debug!("Cache hit for product");
            return Ok(product);
        }

        let query = QuerySpec::new().eq("id", id).eq("active", true).limit(1);
        let mut rows: Vec<ProductRow> = self.get_rows("products", &query, Auth::Anon).await?;

        let product = rows
            .pop()
            .map(Product::from)
            .ok_or_else(|| RemoteError::NotFound(format!("Product not found: {id}")))?;

        // Cache the result
        self.inner.product_cache.insert(id, product.clone()).await;

        Ok(product)
    }

    /// Get all categories with their derived product counts.
    ///
    /// The count is recomputed on every fetch from the active products that
    /// reference each category; it is never stored.
    ///
    /// # Errors
    ///
    /// Returns an error if either API request fails.
    #[instrument(skip(self))]
    pub async fn active_categories(&self) -> Result<Vec<Category>, RemoteError> {
        let rows: Vec<CategoryRow> = self
            .get_rows("categories", &QuerySpec::new(), Auth::Anon)
            .await?;

        let refs: Vec<ProductCategoryRef> = self
            .get_rows(
                "products",
                &QuerySpec::new().select("category_id").eq("active", true),
                Auth::Anon,
            )
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let count = refs
                    .iter()
                    .filter(|r| r.category_id == Some(row.id))
                    .count();
                row.into_category(count)
            })
            .collect())
    }

    /// Get all active banners in display order.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn active_banners(&self) -> Result<Vec<Banner>, RemoteError> {
        let query = QuerySpec::new()
            .eq("active", true)
            .order_by("sort_order", SortDirection::Ascending);
        let rows: Vec<BannerRow> = self.get_rows("banners", &query, Auth::Anon).await?;
        Ok(rows.into_iter().map(Banner::from).collect())
    }

    /// Get the store contact details.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails. An empty table yields the
    /// default (all fields unset).
    #[instrument(skip(self))]
    pub async fn contact_info(&self) -> Result<ContactInfo, RemoteError> {
        let mut rows: Vec<ContactInfoRow> = self
            .get_rows("contact_info", &QuerySpec::new().limit(1), Auth::Anon)
            .await?;
        Ok(rows.pop().map(ContactInfo::from).unwrap_or_default())
    }

    // =========================================================================
    // Cache Management
    // =========================================================================

    /// Invalidate a cached product.
    pub async fn invalidate_product(&self, id: ProductId) {
        self.inner.product_cache.invalidate(&id).await;
    }

    /// Invalidate all cached products.
    pub async fn invalidate_all_products(&self) {
        self.inner.product_cache.invalidate_all();
        self.inner.product_cache.run_pending_tasks().await;
    }
}

/// Projection row used for category counting.
#[derive(Debug, serde::Deserialize)]
struct ProductCategoryRef {
    #[serde(default)]
    category_id: Option<i64>,
}

/// Map a non-success write response to `RemoteError`.
async fn check_status(table: &str, response: reqwest::Response) -> Result<(), RemoteError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response.text().await?;
    let message = backend_message(&body);
    tracing::error!(
        table,
        status = %status,
        message = %message,
        "backend rejected write"
    );
    Err(RemoteError::Backend {
        status: status.as_u16(),
        message,
    })
}

/// Extract the backend's error message from a response body.
///
/// Error bodies are JSON objects with a `message` field; anything else is
/// passed through truncated.
fn backend_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("message")
                .and_then(|m| m.as_str())
                .map(ToString::to_string)
        })
        .unwrap_or_else(|| body.chars().take(200).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_spec_pairs() {
        let query = QuerySpec::new()
            .select("id,name_ar")
            .eq("active", true)
            .gte("price", 10)
            .order_by("sort_order", SortDirection::Ascending)
            .limit(20);
        let pairs = query.to_pairs();
        assert_eq!(
            pairs,
            vec![
                ("select".to_string(), "id,name_ar".to_string()),
                ("active".to_string(), "eq.true".to_string()),
                ("price".to_string(), "gte.10".to_string()),
                ("order".to_string(), "sort_order.asc".to_string()),
                ("limit".to_string(), "20".to_string()),
            ]
        );
    }

    #[test]
    fn test_query_spec_empty() {
        assert!(QuerySpec::new().to_pairs().is_empty());
    }

    #[test]
    fn test_backend_message_extracts_json() {
        let body = r#"{"message": "permission denied", "code": "42501"}"#;
        assert_eq!(backend_message(body), "permission denied");
    }

    #[test]
    fn test_backend_message_falls_back_to_body() {
        assert_eq!(backend_message("gateway timeout"), "gateway timeout");
    }

    #[test]
    fn test_remote_error_display() {
        let err = RemoteError::NotFound("product 9".to_string());
        assert_eq!(err.to_string(), "Not found: product 9");

        let err = RemoteError::Backend {
            status: 403,
            message: "permission denied".to_string(),
        };
        assert_eq!(err.to_string(), "Backend error (403): permission denied");
    }
}
