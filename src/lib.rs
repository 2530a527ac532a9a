//! Supabase client for Rust
//!
//! Bundles the PostgREST query builder, the auth client and the storage
//! client behind a single [`Supabase`] value.
//!
//! ```no_run
//! use supa::{Config, Supabase};
//! use serde_json::Value;
//!
//! # async fn run() -> supa::Result<()> {
//! let supabase = Supabase::new(Config::new("anon-key", "project-ref").with_bucket("avatars"))?;
//!
//! let rows: Option<Vec<Value>> = supabase
//!     .from("countries")
//!     .select(["id", "name"])
//!     .eq("continent", "Asia")
//!     .execute()
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;

use log::debug;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use serde::Serialize;

pub use supa_auth as auth;
pub use supa_postgrest as postgrest;
pub use supa_storage as storage;

pub use config::Config;
pub use error::{Error, Result};

use supa_auth::Auth;
use supa_postgrest::{PostgrestClient, ReqwestSender, RequestBuilder, RpcBuilder};
use supa_storage::StorageClient;

const REST_PATH: &str = "/rest/v1";
const AUTH_PATH: &str = "/auth/v1";
const STORAGE_PATH: &str = "/storage/v1";

/// The main entry point for the supa client
#[derive(Debug, Clone)]
pub struct Supabase {
    /// Auth client for sign-in, sign-up and user lookups
    pub auth: Auth,
    /// PostgREST client for table, view and RPC requests
    pub db: PostgrestClient,
    /// Storage client bound to the configured bucket
    pub storage: StorageClient,
}

impl Supabase {
    /// Create a client from `config`.
    ///
    /// Fails with [`Error::EmptyApiKey`] when the API key is blank.
    pub fn new(config: Config) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(Error::EmptyApiKey);
        }
        let api_host = config.api_host()?;
        let headers = extra_headers(&config)?;

        let http_client = Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        let sender = ReqwestSender::new(http_client.clone())
            .with_headers(headers.clone())
            .with_debug(config.debug);
        let db = PostgrestClient::new(&format!("{}{}", api_host, REST_PATH))?
            .with_api_key(&config.api_key)?
            .with_sender(sender);

        let side_client = Client::builder()
            .timeout(config.request_timeout)
            .default_headers(headers)
            .build()?;
        let auth = Auth::new(
            &config.api_key,
            &format!("{}{}", api_host, AUTH_PATH),
            side_client.clone(),
        );
        let storage = StorageClient::new(
            &config.api_key,
            &format!("{}{}", api_host, STORAGE_PATH),
            &config.bucket,
            side_client,
        );

        debug!("supabase client ready for {}", api_host);
        Ok(Self { auth, db, storage })
    }

    /// Apply further options to the data client.
    ///
    /// ```no_run
    /// # fn run() -> supa::Result<()> {
    /// let supabase = supa::Supabase::new(supa::Config::new("anon-key", "ref"))?
    ///     .with_postgrest(|db| db.with_header("x-client-info", "my-app"))?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn with_postgrest<F>(mut self, configure: F) -> Result<Self>
    where
        F: FnOnce(PostgrestClient) -> supa_postgrest::Result<PostgrestClient>,
    {
        self.db = configure(self.db)?;
        Ok(self)
    }

    /// Start a request against a table or view.
    pub fn from(&self, table: &str) -> RequestBuilder {
        self.db.from(table)
    }

    /// Call a stored procedure.
    pub fn rpc<T: Serialize>(&self, function: &str, params: T) -> RpcBuilder {
        self.db.rpc(function, params)
    }

    pub fn auth(&self) -> &Auth {
        &self.auth
    }

    pub fn storage(&self) -> &StorageClient {
        &self.storage
    }

    pub fn db(&self) -> &PostgrestClient {
        &self.db
    }
}

fn extra_headers(config: &Config) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    for (key, value) in &config.headers {
        let name = HeaderName::from_bytes(key.as_bytes())
            .map_err(|_| Error::config(format!("Invalid header name: {}", key)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|_| Error::config(format!("Invalid header value: {}", value)))?;
        headers.insert(name, value);
    }
    Ok(headers)
}

/// A convenience module for common imports
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::Error;
    pub use crate::Supabase;
    pub use supa_postgrest::{HeaderOption, Order, PostgrestClient};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_api_key_is_rejected() {
        assert!(matches!(
            Supabase::new(Config::new("  ", "ref")),
            Err(Error::EmptyApiKey)
        ));
    }

    #[test]
    fn test_service_urls() {
        let supabase = Supabase::new(Config::new("key", "abcd").with_bucket("avatars")).unwrap();
        assert_eq!(
            supabase.db().base_url().as_str(),
            "https://abcd.supabase.co/rest/v1"
        );
        assert_eq!(supabase.auth().url(), "https://abcd.supabase.co/auth/v1");
        assert_eq!(
            supabase.storage().get_public_url("a.png"),
            "https://abcd.supabase.co/storage/v1/object/public/avatars/a.png"
        );
        assert_eq!(supabase.db().headers().get("apikey").unwrap(), "key");
        assert_eq!(
            supabase.db().headers().get("authorization").unwrap(),
            "Bearer key"
        );
    }

    #[test]
    fn test_invalid_extra_header() {
        let config = Config::new("key", "abcd").with_header("bad header", "x");
        assert!(matches!(Supabase::new(config), Err(Error::Config(_))));
    }
}
