//! Configuration for the supa client

use std::collections::BTreeMap;
use std::env;
use std::time::Duration;

use crate::error::{Error, Result};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Configuration for [`Supabase::new`](crate::Supabase::new)
#[derive(Debug, Clone)]
pub struct Config {
    /// Project API key (anon or service role)
    pub api_key: String,

    /// Project reference, the `<ref>` in `https://<ref>.supabase.co`
    pub project_ref: String,

    /// Overrides the URL derived from `project_ref`
    pub base_url: Option<String>,

    /// Storage bucket used by the storage client
    pub bucket: String,

    /// Log request and response lines of the data client
    pub debug: bool,

    pub request_timeout: Duration,

    /// Extra headers sent with every request
    pub headers: BTreeMap<String, String>,
}

impl Config {
    pub fn new(api_key: &str, project_ref: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            project_ref: project_ref.to_string(),
            base_url: None,
            bucket: String::new(),
            debug: false,
            request_timeout: DEFAULT_TIMEOUT,
            headers: BTreeMap::new(),
        }
    }

    /// Read `SUPABASE_API_KEY`, `SUPABASE_PROJECT_REF` and the optional
    /// `SUPABASE_URL`, `SUPABASE_BUCKET` and `SUPABASE_DEBUG`.
    pub fn from_env() -> Result<Self> {
        let api_key = env::var("SUPABASE_API_KEY").map_err(|_| Error::EmptyApiKey)?;
        let project_ref = env::var("SUPABASE_PROJECT_REF").unwrap_or_default();
        let mut config = Self::new(&api_key, &project_ref);
        if let Ok(url) = env::var("SUPABASE_URL") {
            config = config.with_base_url(&url);
        }
        if let Ok(bucket) = env::var("SUPABASE_BUCKET") {
            config = config.with_bucket(&bucket);
        }
        if let Ok(debug) = env::var("SUPABASE_DEBUG") {
            config = config.with_debug(matches!(debug.as_str(), "1" | "true"));
        }
        Ok(config)
    }

    pub fn with_base_url(mut self, value: &str) -> Self {
        self.base_url = Some(value.trim_end_matches('/').to_string());
        self
    }

    pub fn with_bucket(mut self, value: &str) -> Self {
        self.bucket = value.to_string();
        self
    }

    pub fn with_debug(mut self, value: bool) -> Self {
        self.debug = value;
        self
    }

    pub fn with_request_timeout(mut self, value: Duration) -> Self {
        self.request_timeout = value;
        self
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }

    /// `https://{project_ref}.supabase.co`, unless `base_url` is set.
    pub fn api_host(&self) -> Result<String> {
        match &self.base_url {
            Some(url) => Ok(url.clone()),
            None if self.project_ref.trim().is_empty() => {
                Err(Error::config("either project_ref or base_url must be set"))
            }
            None => Ok(format!("https://{}.supabase.co", self.project_ref)),
        }
    }
}
