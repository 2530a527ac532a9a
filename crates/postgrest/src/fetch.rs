//! HTTP transport used by the executor

use async_trait::async_trait;
use http::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use http::{Method, StatusCode};
use log::{debug, error};
use url::Url;

use crate::error::PostgrestError;

const APPLICATION_JSON: &str = "application/json;charset=UTF-8";
const MAX_LOGGED_BODY: usize = 500;

/// A fully assembled request, ready for the wire.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

/// Raw response envelope.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Body as text, for diagnostics.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Performs one request/response cycle. No retries.
#[async_trait]
pub trait Sender: Send + Sync {
    async fn call(&self, request: HttpRequest) -> Result<HttpResponse, PostgrestError>;
}

/// [`Sender`] backed by a `reqwest::Client`.
///
/// Every request starts from `Content-Type`/`Accept: application/json`, then the
/// sender's own headers, then the request headers.
#[derive(Debug, Clone, Default)]
pub struct ReqwestSender {
    client: reqwest::Client,
    headers: HeaderMap,
    debug: bool,
}

impl ReqwestSender {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            headers: HeaderMap::new(),
            debug: false,
        }
    }

    /// Headers sent with every request through this sender.
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Log request and response lines at debug level.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    fn build_headers(&self, request_headers: HeaderMap) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON));
        headers.insert(ACCEPT, HeaderValue::from_static(APPLICATION_JSON));
        for (name, value) in self.headers.iter() {
            headers.insert(name.clone(), value.clone());
        }
        for (name, value) in request_headers.iter() {
            headers.insert(name.clone(), value.clone());
        }
        headers
    }
}

#[async_trait]
impl Sender for ReqwestSender {
    async fn call(&self, request: HttpRequest) -> Result<HttpResponse, PostgrestError> {
        let HttpRequest {
            method,
            url,
            headers,
            body,
        } = request;
        let headers = self.build_headers(headers);

        if self.debug {
            debug!(
                "-------> {} {}: header:{:?} body:{}",
                method,
                url,
                headers,
                truncated(body.as_deref().unwrap_or_default())
            );
        }

        let mut builder = self
            .client
            .request(method, url.clone())
            .headers(headers);
        if let Some(body) = body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(PostgrestError::NetworkError)?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(|e| {
            error!("failed in reading response body with err: {}", e);
            PostgrestError::NetworkError(e)
        })?;

        if self.debug {
            debug!("<------- {}: {}: {}", url, status.as_u16(), truncated(&body));
        }

        Ok(HttpResponse {
            status,
            headers,
            body: body.to_vec(),
        })
    }
}

fn truncated(body: &[u8]) -> String {
    String::from_utf8_lossy(&body[..body.len().min(MAX_LOGGED_BODY)]).into_owned()
}
