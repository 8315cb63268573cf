//! Hosted backend over HTTP: Supabase-compatible REST endpoints.
//!
//! - `auth/v1`       current user, sign-out
//! - `rest/v1`       table select / insert / update / delete
//! - `storage/v1`    blob upload / removal
//! - `functions/v1`  remote function invocation

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::Value;
use std::time::Duration;

use crate::backend::{AuthProvider, BackendError, BlobStore, FunctionInvoker, TableStore};
use crate::config::BackendConfig;
use crate::models::{Identity, Ordering};

// ============================================================================
// Config
// ============================================================================

#[derive(Debug, Clone)]
pub struct HostedConfig {
    pub base_url: String,
    pub anon_key: String,
    pub access_token: String,
    pub timeout: Option<Duration>,
}

impl HostedConfig {
    pub fn new(base_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        let anon_key = anon_key.into();
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            access_token: anon_key.clone(),
            anon_key,
            timeout: None,
        }
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = token.into();
        self
    }
}

impl From<&BackendConfig> for HostedConfig {
    fn from(config: &BackendConfig) -> Self {
        Self {
            timeout: config.timeout_seconds.map(Duration::from_secs),
            ..Self::new(config.url.clone(), config.resolved_anon_key())
                .with_access_token(config.resolved_access_token())
        }
    }
}

// ============================================================================
// HostedBackend
// ============================================================================

#[derive(Debug, Clone)]
pub struct HostedBackend {
    client: Client,
    config: HostedConfig,
}

impl HostedBackend {
    pub fn new(config: HostedConfig) -> Result<Self, BackendError> {
        if config.anon_key.is_empty() {
            return Err(BackendError::MissingApiKey);
        }

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            config,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url, path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.config.anon_key)
            .bearer_auth(&self.config.access_token)
    }

    /// Passes successful responses through; turns the rest into `BackendError::Api`.
    async fn check(response: Response) -> Result<Response, BackendError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body).unwrap_or_else(|| {
            if body.is_empty() {
                status.canonical_reason().unwrap_or("request failed").to_string()
            } else {
                body
            }
        });

        tracing::error!(code = status.as_u16(), message = %message, "Backend API error");

        Err(BackendError::Api {
            code: status.as_u16(),
            message,
        })
    }
}

/// First message-bearing field of a JSON error body.
fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["message", "msg", "error_description", "error"]
        .iter()
        .find_map(|key| value.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}

fn order_param(order: Ordering) -> String {
    let direction = if order.ascending { "asc" } else { "desc" };
    format!("{}.{}", order.column, direction)
}

#[async_trait]
impl AuthProvider for HostedBackend {
    async fn current_user(&self) -> Result<Option<Identity>, BackendError> {
        let response = self
            .authorized(self.client.get(self.url("auth/v1/user")))
            .send()
            .await?;

        if matches!(
            response.status(),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
        ) {
            return Ok(None);
        }

        let user: Identity = Self::check(response).await?.json().await?;
        Ok(Some(user))
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        let response = self
            .authorized(self.client.post(self.url("auth/v1/logout")))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}

#[async_trait]
impl TableStore for HostedBackend {
    async fn select(&self, table: &str, order: Ordering) -> Result<Vec<Value>, BackendError> {
        let response = self
            .authorized(self.client.get(self.url(&format!("rest/v1/{}", table))))
            .query(&[("select", "*".to_string()), ("order", order_param(order))])
            .send()
            .await?;

        let rows: Vec<Value> = Self::check(response).await?.json().await?;
        tracing::debug!(table = table, rows = rows.len(), "Selected rows");
        Ok(rows)
    }

    async fn insert(&self, table: &str, row: Value) -> Result<(), BackendError> {
        let response = self
            .authorized(self.client.post(self.url(&format!("rest/v1/{}", table))))
            .header("Prefer", "return=minimal")
            .json(&row)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn update(&self, table: &str, id: &str, fields: Value) -> Result<(), BackendError> {
        let response = self
            .authorized(self.client.patch(self.url(&format!("rest/v1/{}", table))))
            .query(&[("id", format!("eq.{}", id))])
            .header("Prefer", "return=minimal")
            .json(&fields)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn delete(&self, table: &str, id: &str) -> Result<(), BackendError> {
        let response = self
            .authorized(self.client.delete(self.url(&format!("rest/v1/{}", table))))
            .query(&[("id", format!("eq.{}", id))])
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}

#[async_trait]
impl BlobStore for HostedBackend {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<(), BackendError> {
        let size = bytes.len();
        let response = self
            .authorized(
                self.client
                    .post(self.url(&format!("storage/v1/object/{}/{}", bucket, path))),
            )
            .header("Content-Type", content_type)
            .body(bytes)
            .send()
            .await?;
        Self::check(response).await?;
        tracing::info!(bucket = bucket, path = path, size = size, "Uploaded blob");
        Ok(())
    }

    async fn remove(&self, bucket: &str, path: &str) -> Result<(), BackendError> {
        let response = self
            .authorized(
                self.client
                    .delete(self.url(&format!("storage/v1/object/{}", bucket))),
            )
            .json(&serde_json::json!({ "prefixes": [path] }))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}

#[async_trait]
impl FunctionInvoker for HostedBackend {
    async fn invoke(&self, name: &str, body: Value) -> Result<Value, BackendError> {
        let response = self
            .authorized(self.client.post(self.url(&format!("functions/v1/{}", name))))
            .json(&body)
            .send()
            .await?;
        let value: Value = Self::check(response).await?.json().await?;
        Ok(value)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn backend(server: &MockServer) -> HostedBackend {
        let config = HostedConfig::new(server.uri(), "anon-key").with_access_token("user-jwt");
        HostedBackend::new(config).expect("Failed to create backend")
    }

    #[test]
    fn test_missing_api_key() {
        let result = HostedBackend::new(HostedConfig::new("http://localhost", ""));
        assert!(matches!(result, Err(BackendError::MissingApiKey)));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let config = HostedConfig::new("http://localhost:54321/", "k");
        assert_eq!(config.base_url, "http://localhost:54321");
        assert_eq!(config.access_token, "k");
    }

    #[test]
    fn test_error_message_field_precedence() {
        assert_eq!(
            error_message(r#"{"message":"row violates policy","code":"42501"}"#).as_deref(),
            Some("row violates policy")
        );
        assert_eq!(
            error_message(r#"{"msg":"invalid JWT"}"#).as_deref(),
            Some("invalid JWT")
        );
        assert_eq!(
            error_message(r#"{"error":"Bucket not found","statusCode":"404"}"#).as_deref(),
            Some("Bucket not found")
        );
        assert_eq!(error_message("plain text"), None);
    }

    #[tokio::test]
    async fn test_current_user_sends_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .and(header("apikey", "anon-key"))
            .and(header("authorization", "Bearer user-jwt"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "5f1c0c1e-0000-4000-8000-000000000001",
                "email": "ada@example.com",
                "aud": "authenticated"
            })))
            .mount(&server)
            .await;

        let user = backend(&server).current_user().await.unwrap();
        let user = user.expect("Expected an identity");
        assert_eq!(user.id, "5f1c0c1e-0000-4000-8000-000000000001");
        assert_eq!(user.email.as_deref(), Some("ada@example.com"));
    }

    #[tokio::test]
    async fn test_current_user_unauthorized_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "msg": "invalid JWT"
            })))
            .mount(&server)
            .await;

        let user = backend(&server).current_user().await.unwrap();
        assert!(user.is_none());
    }

    #[tokio::test]
    async fn test_select_sends_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/notifications"))
            .and(query_param("select", "*"))
            .and(query_param("order", "created_at.desc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "id": "n-2", "message": "b", "is_read": false, "created_at": "2026-01-02T00:00:00Z" },
                { "id": "n-1", "message": "a", "is_read": true, "created_at": "2026-01-01T00:00:00Z" }
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let rows = backend(&server)
            .select("notifications", Ordering::desc("created_at"))
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["id"], "n-2");
    }

    #[tokio::test]
    async fn test_insert_posts_row() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/calendar_events"))
            .and(header("prefer", "return=minimal"))
            .and(body_json(serde_json::json!({
                "user_id": "u-1",
                "title": "Standup",
                "description": "",
                "event_date": "2026-05-01T09:00"
            })))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        backend(&server)
            .insert(
                "calendar_events",
                serde_json::json!({
                    "user_id": "u-1",
                    "title": "Standup",
                    "description": "",
                    "event_date": "2026-05-01T09:00"
                }),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_update_and_delete_filter_by_id() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/rest/v1/notifications"))
            .and(query_param("id", "eq.n-7"))
            .and(body_json(serde_json::json!({ "is_read": true })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/rest/v1/notifications"))
            .and(query_param("id", "eq.n-7"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let backend = backend(&server);
        backend
            .update("notifications", "n-7", serde_json::json!({ "is_read": true }))
            .await
            .unwrap();
        backend.delete("notifications", "n-7").await.unwrap();
    }

    #[tokio::test]
    async fn test_api_error_carries_backend_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/files"))
            .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
                "code": "42501",
                "message": "new row violates row-level security policy"
            })))
            .mount(&server)
            .await;

        let result = backend(&server)
            .insert("files", serde_json::json!({ "filename": "a.txt" }))
            .await;

        match result {
            Err(BackendError::Api { code, message }) => {
                assert_eq!(code, 403);
                assert_eq!(message, "new row violates row-level security policy");
            }
            other => panic!("Expected Api error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_upload_posts_bytes_to_bucket_path() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/storage/v1/object/documents/u-1/1700000000000.txt"))
            .and(header("content-type", "text/plain"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "Key": "documents/u-1/1700000000000.txt"
            })))
            .expect(1)
            .mount(&server)
            .await;

        backend(&server)
            .upload(
                "documents",
                "u-1/1700000000000.txt",
                Bytes::from_static(b"hello"),
                "text/plain",
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_remove_sends_prefixes() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/storage/v1/object/documents"))
            .and(body_json(serde_json::json!({ "prefixes": ["u-1/1.pdf"] })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .expect(1)
            .mount(&server)
            .await;

        backend(&server).remove("documents", "u-1/1.pdf").await.unwrap();
    }

    #[tokio::test]
    async fn test_invoke_function_returns_json() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/functions/v1/chat"))
            .and(body_json(serde_json::json!({ "message": "hello" })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "response": "hi" })),
            )
            .mount(&server)
            .await;

        let value = backend(&server)
            .invoke("chat", serde_json::json!({ "message": "hello" }))
            .await
            .unwrap();
        assert_eq!(value["response"], "hi");
    }

    #[tokio::test]
    async fn test_invoke_function_error_without_body_uses_status_reason() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/functions/v1/summarize"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = backend(&server)
            .invoke("summarize", serde_json::json!({ "text": "x" }))
            .await
            .unwrap_err();
        assert_eq!(err.message(), "Internal Server Error");
    }
}
