//! JSON-over-HTTP transport shared by every client.

use crate::config::{AuthConfig, ClientConfig};
use crate::error::{ApiClientError, ClientResult};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use warrant_core::{unwrap_envelope, ValidationError};

/// One configured `reqwest` client plus the base URL and auth headers.
///
/// Every call is a single round trip. Nothing is retried.
#[derive(Clone)]
pub struct RestClient {
    client: reqwest::Client,
    base_url: String,
    headers: HeaderMap,
}

impl RestClient {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let timeout = Duration::from_millis(config.request_timeout_ms);
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        let mut headers = build_auth_headers(&config.auth)?;
        if let Some(tenant_id) = config.tenant_id {
            headers.insert(
                HeaderName::from_static("x-tenant-id"),
                HeaderValue::from_str(&tenant_id.to_string())
                    .map_err(|e| ApiClientError::Config(e.to_string()))?,
            );
        }
        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            headers,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[tracing::instrument(skip(self, body), fields(base = %self.base_url))]
    pub async fn post_json<T, B>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let response = self
            .client
            .post(self.url(path))
            .headers(self.headers.clone())
            .json(body)
            .send()
            .await?;
        let data = read_body(response).await?;
        Ok(serde_json::from_value(data)?)
    }

    /// POST where only success matters. The response payload is discarded.
    #[tracing::instrument(skip(self, body), fields(base = %self.base_url))]
    pub async fn post_ack<B>(&self, path: &str, body: &B) -> ClientResult<()>
    where
        B: Serialize + ?Sized,
    {
        let response = self
            .client
            .post(self.url(path))
            .headers(self.headers.clone())
            .json(body)
            .send()
            .await?;
        read_body(response).await?;
        Ok(())
    }

    /// POST without a request body.
    #[tracing::instrument(skip(self), fields(base = %self.base_url))]
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let response = self
            .client
            .post(self.url(path))
            .headers(self.headers.clone())
            .send()
            .await?;
        let data = read_body(response).await?;
        Ok(serde_json::from_value(data)?)
    }

    #[tracing::instrument(skip(self), fields(base = %self.base_url))]
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let response = self
            .client
            .get(self.url(path))
            .headers(self.headers.clone())
            .send()
            .await?;
        let data = read_body(response).await?;
        Ok(serde_json::from_value(data)?)
    }

    #[tracing::instrument(skip(self), fields(base = %self.base_url))]
    pub async fn delete(&self, path: &str) -> ClientResult<()> {
        let response = self
            .client
            .delete(self.url(path))
            .headers(self.headers.clone())
            .send()
            .await?;
        read_body(response).await?;
        Ok(())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Read a response into its payload.
///
/// Envelopes are stripped and a non-zero code becomes [`ApiClientError::Service`]
/// regardless of HTTP status. An empty body reads as `null`.
async fn read_body(response: reqwest::Response) -> ClientResult<Value> {
    let status = response.status();
    let text = response.text().await?;
    if status.is_success() {
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        let body: Value = serde_json::from_str(&text)?;
        return Ok(unwrap_envelope(body)?);
    }

    tracing::debug!(status = status.as_u16(), "non-success response");
    if let Ok(body) = serde_json::from_str::<Value>(&text) {
        unwrap_envelope(body)?;
    }
    Err(ApiClientError::Status {
        status: status.as_u16(),
        body: text,
    })
}

fn build_auth_headers(auth: &AuthConfig) -> ClientResult<HeaderMap> {
    let mut headers = HeaderMap::new();
    if let Some(api_key) = &auth.api_key {
        headers.insert(
            HeaderName::from_static("x-api-key"),
            HeaderValue::from_str(api_key).map_err(|e| ApiClientError::Config(e.to_string()))?,
        );
    }
    if let Some(jwt) = &auth.jwt {
        let value = format!("Bearer {}", jwt);
        headers.insert(
            HeaderName::from_static("authorization"),
            HeaderValue::from_str(&value).map_err(|e| ApiClientError::Config(e.to_string()))?,
        );
    }
    Ok(headers)
}

/// Check that `id` can be placed in a URL path as a single segment.
pub(crate) fn path_segment<'a>(field: &str, id: &'a str) -> Result<&'a str, ValidationError> {
    if id.trim().is_empty() {
        return Err(ValidationError::RequiredFieldMissing {
            field: field.to_string(),
        });
    }
    if id.contains(['/', '?', '#']) {
        return Err(ValidationError::InvalidValue {
            field: field.to_string(),
            reason: "must not contain '/', '?' or '#'".to_string(),
        });
    }
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_headers_from_config() {
        let auth = AuthConfig {
            api_key: Some("key-1".to_string()),
            jwt: Some("token".to_string()),
        };
        let headers = build_auth_headers(&auth).unwrap();
        assert_eq!(headers.get("x-api-key").unwrap(), "key-1");
        assert_eq!(headers.get("authorization").unwrap(), "Bearer token");
    }

    #[test]
    fn invalid_header_value_is_config_error() {
        let auth = AuthConfig {
            api_key: Some("bad\nkey".to_string()),
            jwt: None,
        };
        assert!(matches!(
            build_auth_headers(&auth),
            Err(ApiClientError::Config(_))
        ));
    }

    #[test]
    fn path_segments_are_checked() {
        assert_eq!(path_segment("id", "g-1").unwrap(), "g-1");
        assert!(path_segment("id", "").is_err());
        assert!(path_segment("id", "a/b").is_err());
        assert!(path_segment("id", "a?b").is_err());
    }
}
