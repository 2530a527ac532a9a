//! Supabase Storage client for Rust
//!
//! Uploads objects into a single bucket and builds public URLs for them.

use std::path::Path;

use bytes::Bytes;
use log::{error, warn};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, StorageError>;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("API error: {message} (Status: {status})")]
    ApiError { status: StatusCode, message: String },

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl StorageError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            StorageError::ApiError { status, .. } => Some(*status),
            StorageError::NetworkError(e) => e.status(),
            StorageError::IoError(_) => None,
        }
    }
}

/// Client bound to one bucket under `https://<ref>.supabase.co/storage/v1`.
#[derive(Debug, Clone)]
pub struct StorageClient {
    api_key: String,
    storage_url: String,
    bucket: String,
    http_client: Client,
}

impl StorageClient {
    pub fn new(api_key: &str, storage_url: &str, bucket: &str, http_client: Client) -> Self {
        Self {
            api_key: api_key.to_string(),
            storage_url: storage_url.trim_end_matches('/').to_string(),
            bucket: bucket.to_string(),
            http_client,
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Same client, other bucket.
    pub fn with_bucket(&self, bucket: &str) -> Self {
        Self {
            bucket: bucket.to_string(),
            ..self.clone()
        }
    }

    /// Upload `data` to `{bucket}/{target_path}` as `mime_type`.
    pub async fn upload_file(
        &self,
        target_path: &str,
        mime_type: &str,
        data: impl Into<Bytes>,
    ) -> Result<()> {
        let url = format!("{}/object/{}/{}", self.storage_url, self.bucket, target_path);

        let response = self
            .http_client
            .post(&url)
            .header("apikey", &self.api_key)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(CONTENT_TYPE, mime_type)
            .body(data.into())
            .send()
            .await
            .map_err(|e| {
                error!("failed in httpclient call with err: {}", e);
                StorageError::NetworkError(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await?;
            warn!(
                "getting {} in upload file due to err: {}",
                status.as_u16(),
                message
            );
            return Err(StorageError::ApiError { status, message });
        }
        Ok(())
    }

    /// Read a local file and upload it with [`upload_file`](Self::upload_file).
    pub async fn upload_from_path(
        &self,
        target_path: &str,
        mime_type: &str,
        file_path: &Path,
    ) -> Result<()> {
        let contents = tokio::fs::read(file_path).await?;
        self.upload_file(target_path, mime_type, contents).await
    }

    /// Public URL of an object in a public bucket. No request is made.
    pub fn get_public_url(&self, media_path: &str) -> String {
        format!(
            "{}/object/public/{}/{}",
            self.storage_url, self.bucket, media_path
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use wiremock::matchers::{body_bytes, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn storage_client(server: &MockServer) -> StorageClient {
        StorageClient::new(
            "fake-key",
            &format!("{}/storage/v1", server.uri()),
            "avatars",
            Client::new(),
        )
    }

    #[test]
    fn test_get_public_url() {
        let client = StorageClient::new(
            "fake-key",
            "https://ref.supabase.co/storage/v1/",
            "avatars",
            Client::new(),
        );
        assert_eq!(
            client.get_public_url("users/1.png"),
            "https://ref.supabase.co/storage/v1/object/public/avatars/users/1.png"
        );
        assert_eq!(
            client.with_bucket("docs").get_public_url("a.pdf"),
            "https://ref.supabase.co/storage/v1/object/public/docs/a.pdf"
        );
    }

    #[tokio::test]
    async fn test_upload_file() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/storage/v1/object/avatars/users/1.png"))
            .and(header("apikey", "fake-key"))
            .and(header("authorization", "Bearer fake-key"))
            .and(header("content-type", "image/png"))
            .and(body_bytes(vec![0x89, b'P', b'N', b'G']))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"Key":"avatars/users/1.png"}"#))
            .expect(1)
            .mount(&mock_server)
            .await;

        let result = storage_client(&mock_server)
            .upload_file("users/1.png", "image/png", vec![0x89, b'P', b'N', b'G'])
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_upload_file_conflict() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(409).set_body_string(
                r#"{"statusCode":"409","error":"Duplicate","message":"The resource already exists"}"#,
            ))
            .mount(&mock_server)
            .await;

        let err = storage_client(&mock_server)
            .upload_file("users/1.png", "image/png", Bytes::from_static(b"png"))
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(StatusCode::CONFLICT));
        match err {
            StorageError::ApiError { message, .. } => {
                assert!(message.contains("already exists"))
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_upload_from_path() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/storage/v1/object/avatars/notes.txt"))
            .and(body_bytes(b"hello storage".to_vec()))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"hello storage").unwrap();

        storage_client(&mock_server)
            .upload_from_path("notes.txt", "text/plain", file.path())
            .await
            .unwrap();

        let missing = storage_client(&mock_server)
            .upload_from_path("x", "text/plain", Path::new("/definitely/not/here"))
            .await
            .unwrap_err();
        assert!(matches!(missing, StorageError::IoError(_)));
    }
}
