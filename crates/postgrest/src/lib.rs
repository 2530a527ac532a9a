//! PostgREST client for Rust
//!
//! Builds PostgREST requests through a staged, fluent API and sends them over
//! a pluggable [`Sender`].
//!
//! # Features
//!
//! - Query API (`select`, `insert`, `upsert`, `update`, `delete`)
//! - Filtering (`eq`, `gt`, `in_list`, range and array operators, `not`)
//! - Ordering and pagination (`order`, `range`, `limit`, `offset`)
//! - Single-object responses (`single`)
//! - RPC function calls
//!
//! ```no_run
//! use supa_postgrest::{Order, PostgrestClient};
//! use serde_json::Value;
//!
//! # async fn run() -> supa_postgrest::Result<()> {
//! let client = PostgrestClient::new("https://project.supabase.co/rest/v1")?
//!     .with_api_key("anon-key")?;
//!
//! let rows: Option<Vec<Value>> = client
//!     .from("users")
//!     .select(["id", "name"])
//!     .gte("age", 18)
//!     .order("name", Order::Asc)
//!     .limit(10)
//!     .execute()
//!     .await?;
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use http::header::{HeaderMap, AUTHORIZATION};
use serde::Serialize;
use url::Url;

mod builder;
pub mod error;
mod execute;
pub mod fetch;
pub mod filter;
pub mod params;
mod rpc;
pub mod types;

pub use builder::{
    FilterBuilder, Mutation, QueryBuilder, RequestBuilder, SelectBuilder, Selection,
};
pub use error::{PostgrestApiErrorDetails, PostgrestError, Result};
pub use fetch::{HttpRequest, HttpResponse, ReqwestSender, Sender};
pub use filter::FilterOperator;
pub use rpc::RpcBuilder;
pub use types::{HeaderOption, Order};

use execute::{header_pair, QueryRequest};

/// Entry point for PostgREST requests.
///
/// Holds the REST base URL, headers sent with every request and the
/// transport. Cloning is cheap; builders take their own clone.
#[derive(Clone)]
pub struct PostgrestClient {
    base_url: Url,
    default_headers: HeaderMap,
    sender: Arc<dyn Sender>,
}

impl fmt::Debug for PostgrestClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostgrestClient")
            .field("base_url", &self.base_url.as_str())
            .field("default_headers", &self.default_headers)
            .finish_non_exhaustive()
    }
}

impl PostgrestClient {
    /// Create a client for `rest_url`, e.g. `https://<ref>.supabase.co/rest/v1`.
    pub fn new(rest_url: &str) -> Result<Self> {
        Ok(Self {
            base_url: Url::parse(rest_url)?,
            default_headers: HeaderMap::new(),
            sender: Arc::new(ReqwestSender::default()),
        })
    }

    /// Add a header sent with every request.
    pub fn with_header(mut self, key: &str, value: &str) -> Result<Self> {
        let (name, value) = header_pair(key, value)?;
        self.default_headers.insert(name, value);
        Ok(self)
    }

    /// `Authorization: Bearer <token>` on every request.
    pub fn with_token(self, token: &str) -> Result<Self> {
        self.with_header(AUTHORIZATION.as_str(), &format!("Bearer {}", token))
    }

    /// `apikey` and `Authorization` headers as the Supabase gateway expects.
    pub fn with_api_key(self, api_key: &str) -> Result<Self> {
        self.with_header("apikey", api_key)?.with_token(api_key)
    }

    /// `Authorization: Basic <base64(user:password)>` on every request.
    pub fn with_basic_auth(self, user: &str, password: &str) -> Result<Self> {
        let credentials = STANDARD.encode(format!("{}:{}", user, password));
        self.with_header(AUTHORIZATION.as_str(), &format!("Basic {}", credentials))
    }

    /// Replace the transport.
    pub fn with_sender<S: Sender + 'static>(mut self, sender: S) -> Self {
        self.sender = Arc::new(sender);
        self
    }

    /// Send through `client`, adding `headers` to every request.
    pub fn with_http_client(self, client: reqwest::Client, headers: HeaderMap) -> Self {
        self.with_sender(ReqwestSender::new(client).with_headers(headers))
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Headers sent with every request.
    pub fn headers(&self) -> &HeaderMap {
        &self.default_headers
    }

    pub fn sender(&self) -> &dyn Sender {
        self.sender.as_ref()
    }

    /// Start a request against a table or view.
    pub fn from(&self, table: &str) -> RequestBuilder {
        self.from_with(table, &[])
    }

    /// Like [`from`](Self::from), with headers for this request only.
    pub fn from_with(&self, table: &str, options: &[HeaderOption]) -> RequestBuilder {
        RequestBuilder::new(QueryRequest::new(
            self.clone(),
            format!("/{}", table),
            options.to_vec(),
        ))
    }

    /// Call a stored procedure with `params` as the JSON body.
    pub fn rpc<T: Serialize>(&self, function: &str, params: T) -> RpcBuilder {
        self.rpc_with(function, params, &[])
    }

    /// Like [`rpc`](Self::rpc), with headers for this request only.
    pub fn rpc_with<T: Serialize>(
        &self,
        function: &str,
        params: T,
        options: &[HeaderOption],
    ) -> RpcBuilder {
        RpcBuilder::new(
            QueryRequest::new(
                self.clone(),
                format!("/rpc/{}", function),
                options.to_vec(),
            ),
            params,
        )
    }
}
