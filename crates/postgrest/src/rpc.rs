use http::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Result;
use crate::execute::{Payload, QueryRequest};

/// Call to a stored procedure: `POST {base}/rpc/{function}` with the
/// parameters as a JSON body.
#[derive(Debug)]
pub struct RpcBuilder {
    request: QueryRequest,
}

impl RpcBuilder {
    pub(crate) fn new<T: Serialize>(mut request: QueryRequest, params: T) -> Self {
        request.method = Method::POST;
        request.payload = Payload::from_serialize(params);
        Self { request }
    }

    /// Call the function and decode its result into `T`.
    ///
    /// Returns `Ok(None)` on `204 No Content` (a `void` function).
    pub async fn execute<T: DeserializeOwned>(self) -> Result<Option<T>> {
        self.request.execute().await
    }

    /// Call the function and discard its result.
    pub async fn execute_no_return(self) -> Result<()> {
        self.request.execute_no_return().await
    }
}

#[cfg(test)]
mod tests {
    use crate::PostgrestClient;
    use http::Method;
    use serde_json::json;

    #[test]
    fn test_rpc_request_shape() {
        let client = PostgrestClient::new("http://localhost:3000/rest/v1/").unwrap();
        let rpc = client.rpc("add_them", json!({"a": 1, "b": 2}));
        assert_eq!(rpc.request.method, Method::POST);
        assert_eq!(
            rpc.request.url().as_str(),
            "http://localhost:3000/rest/v1/rpc/add_them"
        );
        assert!(rpc.request.params.is_empty());
    }
}
