//! HTTP client for the hosted row-level query API.
//!
//! Tables are exposed under `{backend}/rest/v1/{table}`. Rows are filtered
//! with `column=eq.value` query parameters and ordered with
//! `order=column.desc`. Every request carries the public `apikey` header and
//! a bearer token: the signed-in user's token when there is one, so that
//! row-level security applies, otherwise the public key.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::instrument;
use url::Url;

use teeshop_core::{
    NewOrder, NewOrderLine, NewReview, NewWishlistEntry, Order, OrderId, OrderLine, ProductId,
    Profile, Review, UserId, WishlistEntry,
};

use super::{OrderStore, ProfileStore, RemoteError, ReviewStore, WishlistBackend};
use crate::config::BackendConfig;

const ORDERS: &str = "orders";
const ORDER_ITEMS: &str = "order_items";
const WISHLISTS: &str = "wishlists";
const REVIEWS: &str = "product_reviews";
const PROFILES: &str = "profiles";

/// Error body returned by the query API.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Client for the hosted backend.
#[derive(Clone)]
pub struct RestBackend {
    inner: Arc<RestBackendInner>,
}

struct RestBackendInner {
    client: reqwest::Client,
    rest_url: String,
    anon_key: SecretString,
    access_token: Option<SecretString>,
}

impl RestBackend {
    /// Create a client. Pass the signed-in user's access token, if any.
    ///
    /// # Errors
    ///
    /// Returns `RemoteError::Http` if the HTTP client cannot be built.
    pub fn new(
        config: &BackendConfig,
        access_token: Option<SecretString>,
    ) -> Result<Self, RemoteError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(RestBackendInner {
                client,
                rest_url: config.rest_url(),
                anon_key: config.anon_key.clone(),
                access_token,
            }),
        })
    }

    /// Build the URL of a table with equality filters and extra parameters.
    fn table_url(&self, table: &str, params: &[(&str, String)]) -> Result<Url, RemoteError> {
        let mut url = Url::parse(&format!("{}/{table}", self.inner.rest_url))
            .map_err(|e| RemoteError::Unavailable(format!("invalid backend url: {e}")))?;
        if !params.is_empty() {
            let mut query = url.query_pairs_mut();
            for (key, value) in params {
                query.append_pair(key, value);
            }
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let bearer = self
            .inner
            .access_token
            .as_ref()
            .unwrap_or(&self.inner.anon_key)
            .expose_secret();

        self.inner
            .client
            .request(method, url)
            .header("apikey", self.inner.anon_key.expose_secret())
            .bearer_auth(bearer)
            .header("Content-Type", "application/json")
    }

    /// Send a request and return the body of a successful response.
    async fn send(&self, request: RequestBuilder) -> Result<String, RemoteError> {
        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(RemoteError::RateLimited(retry_after));
        }

        let body = response.text().await.map_err(transport_error)?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "Backend returned non-success status"
            );
            return Err(RemoteError::Status {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        Ok(body)
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        table: &str,
        params: &[(&str, String)],
    ) -> Result<Vec<T>, RemoteError> {
        let url = self.table_url(table, params)?;
        let body = self.send(self.request(Method::GET, url)).await?;
        parse(&body)
    }

    async fn insert<B: serde::Serialize + Sync + ?Sized>(
        &self,
        table: &str,
        rows: &B,
        returning: bool,
    ) -> Result<String, RemoteError> {
        let url = self.table_url(table, &[])?;
        let prefer = if returning {
            "return=representation"
        } else {
            "return=minimal"
        };
        let request = self
            .request(Method::POST, url)
            .header("Prefer", prefer)
            .json(rows);
        self.send(request).await
    }

    async fn delete(&self, table: &str, filters: &[(&str, String)]) -> Result<(), RemoteError> {
        let url = self.table_url(table, filters)?;
        self.send(self.request(Method::DELETE, url)).await?;
        Ok(())
    }
}

fn eq(value: impl std::fmt::Display) -> String {
    format!("eq.{value}")
}

fn transport_error(err: reqwest::Error) -> RemoteError {
    if err.is_timeout() {
        RemoteError::Timeout
    } else {
        RemoteError::Http(err)
    }
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .unwrap_or_else(|| body.chars().take(200).collect())
}

fn parse<T: DeserializeOwned>(body: &str) -> Result<T, RemoteError> {
    serde_json::from_str(body).map_err(|e| {
        tracing::error!(
            error = %e,
            body = %body.chars().take(500).collect::<String>(),
            "Failed to parse backend response"
        );
        RemoteError::Parse(e)
    })
}

/// First row of a `return=representation` response.
fn first_row<T: DeserializeOwned>(body: &str, what: &str) -> Result<T, RemoteError> {
    parse::<Vec<T>>(body)?
        .into_iter()
        .next()
        .ok_or_else(|| RemoteError::NotFound(format!("{what} missing from response")))
}

#[async_trait]
impl OrderStore for RestBackend {
    #[instrument(skip(self, order), fields(user_id = %order.user_id))]
    async fn create_order(&self, order: &NewOrder) -> Result<Order, RemoteError> {
        let body = self.insert(ORDERS, order, true).await?;
        first_row(&body, "created order")
    }

    #[instrument(skip(self, lines), fields(lines = lines.len()))]
    async fn create_order_lines(&self, lines: &[NewOrderLine]) -> Result<(), RemoteError> {
        self.insert(ORDER_ITEMS, lines, false).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_order(&self, order_id: OrderId) -> Result<(), RemoteError> {
        self.delete(ORDERS, &[("id", eq(order_id))]).await
    }

    #[instrument(skip(self))]
    async fn orders_for(&self, user_id: UserId) -> Result<Vec<Order>, RemoteError> {
        self.fetch(
            ORDERS,
            &[
                ("select", "*".to_string()),
                ("user_id", eq(user_id)),
                ("order", "created_at.desc".to_string()),
            ],
        )
        .await
    }

    #[instrument(skip(self))]
    async fn lines_for(&self, order_id: OrderId) -> Result<Vec<OrderLine>, RemoteError> {
        self.fetch(
            ORDER_ITEMS,
            &[("select", "*".to_string()), ("order_id", eq(order_id))],
        )
        .await
    }
}

#[async_trait]
impl WishlistBackend for RestBackend {
    #[instrument(skip(self, entry), fields(product_id = %entry.product_id))]
    async fn insert_entry(&self, entry: &NewWishlistEntry) -> Result<(), RemoteError> {
        self.insert(WISHLISTS, entry, false).await?;
        Ok(())
    }

    #[instrument(skip(self), fields(product_id = %product_id))]
    async fn delete_entry(
        &self,
        user_id: UserId,
        product_id: &ProductId,
    ) -> Result<(), RemoteError> {
        self.delete(
            WISHLISTS,
            &[("user_id", eq(user_id)), ("product_id", eq(product_id))],
        )
        .await
    }

    #[instrument(skip(self))]
    async fn entries_for(&self, user_id: UserId) -> Result<Vec<WishlistEntry>, RemoteError> {
        self.fetch(
            WISHLISTS,
            &[("select", "*".to_string()), ("user_id", eq(user_id))],
        )
        .await
    }
}

#[async_trait]
impl ReviewStore for RestBackend {
    #[instrument(skip(self, review), fields(product_id = %review.product_id))]
    async fn insert_review(&self, review: &NewReview) -> Result<Review, RemoteError> {
        let body = self.insert(REVIEWS, review, true).await?;
        first_row(&body, "created review")
    }

    #[instrument(skip(self), fields(product_id = %product_id))]
    async fn reviews_for(&self, product_id: &ProductId) -> Result<Vec<Review>, RemoteError> {
        self.fetch(
            REVIEWS,
            &[
                ("select", "*".to_string()),
                ("product_id", eq(product_id)),
                ("order", "created_at.desc".to_string()),
            ],
        )
        .await
    }
}

#[async_trait]
impl ProfileStore for RestBackend {
    #[instrument(skip(self))]
    async fn profile(&self, user_id: UserId) -> Result<Option<Profile>, RemoteError> {
        let rows: Vec<Profile> = self
            .fetch(
                PROFILES,
                &[("select", "*".to_string()), ("id", eq(user_id))],
            )
            .await?;
        Ok(rows.into_iter().next())
    }

    #[instrument(skip(self, full_name))]
    async fn update_full_name(
        &self,
        user_id: UserId,
        full_name: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<(), RemoteError> {
        let url = self.table_url(PROFILES, &[("id", eq(user_id))])?;
        let request = self.request(Method::PATCH, url).json(&serde_json::json!({
            "full_name": full_name,
            "updated_at": updated_at,
        }));
        self.send(request).await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn backend() -> RestBackend {
        let config = BackendConfig {
            url: Url::parse("https://abc.supabase.co").unwrap(),
            anon_key: SecretString::from("anon"),
            request_timeout: Duration::from_secs(5),
        };
        RestBackend::new(&config, None).unwrap()
    }

    #[test]
    fn test_table_url_encodes_filters() {
        let url = backend()
            .table_url(
                WISHLISTS,
                &[
                    ("user_id", eq("7c9e6679-7425-40de-944b-e07fc1f90ae7")),
                    ("product_id", eq("tshirt-001")),
                ],
            )
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://abc.supabase.co/rest/v1/wishlists?user_id=eq.7c9e6679-7425-40de-944b-e07fc1f90ae7&product_id=eq.tshirt-001"
        );
    }

    #[test]
    fn test_table_url_without_params() {
        let url = backend().table_url(ORDERS, &[]).unwrap();
        assert_eq!(url.as_str(), "https://abc.supabase.co/rest/v1/orders");
    }

    #[test]
    fn test_error_message_prefers_backend_message() {
        let body = r#"{"code":"23505","message":"duplicate key value violates unique constraint","details":null}"#;
        assert_eq!(
            error_message(body),
            "duplicate key value violates unique constraint"
        );
        assert_eq!(error_message("Bad Gateway"), "Bad Gateway");
    }

    #[test]
    fn test_first_row() {
        let body = r#"[{"id":"0f8fad5b-d9cb-469f-a165-70867728950e","user_id":"7c9e6679-7425-40de-944b-e07fc1f90ae7","created_at":"2024-03-01T12:00:00+00:00","status":"pending","total":"25.00"}]"#;
        let order: Order = first_row(body, "created order").unwrap();
        assert_eq!(order.total.to_string(), "25.00");

        let empty: Result<Order, _> = first_row("[]", "created order");
        assert!(matches!(empty, Err(RemoteError::NotFound(_))));
    }
}
