//! Request assembly and the single round trip behind every `execute`

use http::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT};
use http::{Method, StatusCode};
use log::{error, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::error::{PostgrestApiErrorDetails, PostgrestError, Result};
use crate::fetch::{HttpRequest, HttpResponse};
use crate::params::QueryParams;
use crate::types::HeaderOption;
use crate::PostgrestClient;

const PREFER: &str = "prefer";

/// Request body, serialized when the builder is created.
///
/// A value that cannot be represented as JSON is kept as the error and
/// reported by `execute`.
#[derive(Debug)]
pub(crate) enum Payload {
    Empty,
    Json(Vec<u8>),
    Invalid(serde_json::Error),
}

impl Payload {
    pub(crate) fn from_serialize<T: Serialize>(values: T) -> Self {
        match serde_json::to_vec(&values) {
            Ok(body) => Payload::Json(body),
            Err(e) => Payload::Invalid(e),
        }
    }

    fn into_body(self) -> Result<Option<Vec<u8>>> {
        match self {
            Payload::Empty => Ok(None),
            Payload::Json(body) => Ok(Some(body)),
            Payload::Invalid(e) => Err(PostgrestError::SerializationError(e)),
        }
    }
}

/// State shared by every builder stage.
#[derive(Debug)]
pub(crate) struct QueryRequest {
    pub(crate) client: PostgrestClient,
    pub(crate) path: String,
    pub(crate) method: Method,
    pub(crate) params: QueryParams,
    pub(crate) options: Vec<HeaderOption>,
    pub(crate) overrides: HeaderMap,
    pub(crate) payload: Payload,
}

impl QueryRequest {
    pub(crate) fn new(client: PostgrestClient, path: String, options: Vec<HeaderOption>) -> Self {
        Self {
            client,
            path,
            method: Method::GET,
            params: QueryParams::new(),
            options,
            overrides: HeaderMap::new(),
            payload: Payload::Empty,
        }
    }

    pub(crate) fn set_prefer(&mut self, value: &'static str) {
        self.overrides.insert(PREFER, HeaderValue::from_static(value));
    }

    pub(crate) fn set_accept(&mut self, value: &'static str) {
        self.overrides.insert(ACCEPT, HeaderValue::from_static(value));
    }

    /// Base URL + builder path + encoded query.
    ///
    /// `Url` escapes `'` as `%27` in http(s) queries.
    pub(crate) fn url(&self) -> Url {
        let mut url = self.client.base_url().clone();
        let path = format!("{}{}", url.path().trim_end_matches('/'), self.path);
        url.set_path(&path);
        if self.params.is_empty() {
            url.set_query(None);
        } else {
            url.set_query(Some(&self.params.encode()));
        }
        url
    }

    pub(crate) fn headers(&self, want_representation: bool) -> Result<HeaderMap> {
        compose_headers(
            self.client.headers(),
            &self.options,
            &self.overrides,
            want_representation,
        )
    }

    async fn send(self, want_representation: bool) -> Result<HttpResponse> {
        let url = self.url();
        let headers = self.headers(want_representation)?;
        let body = self.payload.into_body()?;
        let request = HttpRequest {
            method: self.method,
            url,
            headers,
            body,
        };

        let response = self.client.sender().call(request).await.map_err(|e| {
            error!("failed in httpclient call with err: {}", e);
            e
        })?;

        if !response.is_success() {
            warn!(
                "getting {} in execute due to err: {}",
                response.status.as_u16(),
                response.text()
            );
            // An undecodable error body shadows the API error.
            let details: PostgrestApiErrorDetails = serde_json::from_slice(&response.body)
                .map_err(PostgrestError::DeserializationError)?;
            return Err(PostgrestError::ApiError {
                details,
                status: response.status,
            });
        }
        Ok(response)
    }

    /// `Ok(None)` when the server answered 204 No Content.
    pub(crate) async fn execute<T: DeserializeOwned>(self) -> Result<Option<T>> {
        let response = self.send(true).await?;
        if response.status == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        serde_json::from_slice(&response.body)
            .map(Some)
            .map_err(PostgrestError::DeserializationError)
    }

    pub(crate) async fn execute_no_return(self) -> Result<()> {
        self.send(false).await.map(|_| ())
    }
}

/// Merge header layers; later layers win per key.
///
/// Order: client defaults, per-call options, builder overrides. When no
/// representation is wanted, `Accept` and `Prefer` are blanked last.
pub(crate) fn compose_headers(
    defaults: &HeaderMap,
    options: &[HeaderOption],
    overrides: &HeaderMap,
    want_representation: bool,
) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    for (name, value) in defaults.iter() {
        headers.insert(name.clone(), value.clone());
    }
    for option in options {
        let (name, value) = header_pair(&option.key, &option.value)?;
        headers.insert(name, value);
    }
    for (name, value) in overrides.iter() {
        headers.insert(name.clone(), value.clone());
    }
    if !want_representation {
        headers.insert(ACCEPT, HeaderValue::from_static(""));
        headers.insert(PREFER, HeaderValue::from_static(""));
    }
    Ok(headers)
}

pub(crate) fn header_pair(key: &str, value: &str) -> Result<(HeaderName, HeaderValue)> {
    let name = HeaderName::from_bytes(key.as_bytes())
        .map_err(|_| PostgrestError::InvalidParameters(format!("Invalid header name: {}", key)))?;
    let value = HeaderValue::from_str(value).map_err(|_| {
        PostgrestError::InvalidParameters(format!("Invalid header value: {}", value))
    })?;
    Ok((name, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{RETURN_REPRESENTATION, SINGLE_OBJECT};

    fn defaults() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("apikey", HeaderValue::from_static("anon"));
        headers.insert("authorization", HeaderValue::from_static("Bearer anon"));
        headers
    }

    #[test]
    fn test_compose_layers_in_order() {
        let options = vec![HeaderOption::auth_token("user-jwt")];
        let mut overrides = HeaderMap::new();
        overrides.insert(PREFER, HeaderValue::from_static(RETURN_REPRESENTATION));
        overrides.insert(ACCEPT, HeaderValue::from_static(SINGLE_OBJECT));

        let headers = compose_headers(&defaults(), &options, &overrides, true).unwrap();
        assert_eq!(headers.get("apikey").unwrap(), "anon");
        assert_eq!(headers.get("Authorization").unwrap(), "Bearer user-jwt");
        assert_eq!(headers.get("Prefer").unwrap(), RETURN_REPRESENTATION);
        assert_eq!(headers.get("accept").unwrap(), SINGLE_OBJECT);
    }

    #[test]
    fn test_builder_overrides_beat_options() {
        let options = vec![HeaderOption::new("Accept", "text/csv")];
        let mut overrides = HeaderMap::new();
        overrides.insert(ACCEPT, HeaderValue::from_static(SINGLE_OBJECT));

        let headers = compose_headers(&defaults(), &options, &overrides, true).unwrap();
        assert_eq!(headers.get(ACCEPT).unwrap(), SINGLE_OBJECT);
        assert_eq!(headers.get_all(ACCEPT).iter().count(), 1);
    }

    #[test]
    fn test_no_representation_blanks_accept_and_prefer() {
        let mut overrides = HeaderMap::new();
        overrides.insert(PREFER, HeaderValue::from_static(RETURN_REPRESENTATION));
        overrides.insert(ACCEPT, HeaderValue::from_static(SINGLE_OBJECT));

        let headers = compose_headers(&defaults(), &[], &overrides, false).unwrap();
        assert_eq!(headers.get(ACCEPT).unwrap(), "");
        assert_eq!(headers.get(PREFER).unwrap(), "");
        assert_eq!(headers.get("apikey").unwrap(), "anon");
    }

    #[test]
    fn test_invalid_option_is_reported() {
        let options = vec![HeaderOption::new("bad header", "x")];
        let err = compose_headers(&defaults(), &options, &HeaderMap::new(), true).unwrap_err();
        assert!(matches!(err, PostgrestError::InvalidParameters(_)));

        let options = vec![HeaderOption::new("x-ok", "line\nbreak")];
        let err = compose_headers(&defaults(), &options, &HeaderMap::new(), true).unwrap_err();
        assert!(matches!(err, PostgrestError::InvalidParameters(_)));
    }

    #[test]
    fn test_invalid_payload_is_deferred() {
        use std::collections::HashMap;

        // Maps with non-string keys cannot be represented as JSON objects.
        let mut bad = HashMap::new();
        bad.insert((1, 2), "x");
        let payload = Payload::from_serialize(&bad);
        assert!(matches!(payload, Payload::Invalid(_)));
        assert!(matches!(
            payload.into_body(),
            Err(PostgrestError::SerializationError(_))
        ));
        assert!(matches!(Payload::Empty.into_body(), Ok(None)));
    }

    #[test]
    fn test_payload_is_serialized_once_up_front() {
        let payload = Payload::from_serialize(serde_json::json!({"name": "Ann", "age": 3}));
        match payload {
            Payload::Json(ref body) => {
                let value: serde_json::Value = serde_json::from_slice(body).unwrap();
                assert_eq!(value, serde_json::json!({"name": "Ann", "age": 3}));
            }
            ref other => panic!("unexpected payload: {:?}", other),
        }
        let body = payload.into_body().unwrap().unwrap();
        assert!(body.starts_with(b"{"));
    }
}
