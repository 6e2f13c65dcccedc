//! HTTP layer: basic auth, cancellation, status mapping.
//!
//! This is the ONLY place for status code handling. client/mod.rs never
//! interprets status codes.

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::context::CallContext;
use crate::error::{ProviderError, ProviderResult};

use super::helpers::endpoint;

/// HTTP backend for making requests (holds reqwest client, base URL, credentials).
#[derive(Clone)]
pub(crate) struct HttpBackend {
    pub(crate) client: reqwest::Client,
    pub(crate) base_url: Url,
    pub(crate) username: String,
    pub(crate) password: String,
}

impl std::fmt::Debug for HttpBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpBackend")
            .field("base_url", &self.base_url.as_str())
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl HttpBackend {
    /// Send a request and require exactly `expected` back.
    ///
    /// 404 maps to `NotFound`; every other status (including other 2xx codes)
    /// maps to `ServerProtocol` with the body attached.
    pub(crate) async fn exchange<B: Serialize + ?Sized>(
        &self,
        ctx: &CallContext,
        method: Method,
        segments: &[&str],
        body: Option<&B>,
        expected: StatusCode,
    ) -> ProviderResult<reqwest::Response> {
        let url = endpoint(&self.base_url, segments)?;
        debug!(method = %method, url = %url, "nexus request");

        let mut request = self
            .client
            .request(method, url.clone())
            .basic_auth(&self.username, Some(&self.password));
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = ctx
            .run(async { request.send().await.map_err(ProviderError::from) })
            .await?;
        let status = response.status();

        if status == expected {
            return Ok(response);
        }

        if status == StatusCode::NOT_FOUND {
            return Err(ProviderError::NotFound {
                what: url.path().to_string(),
            });
        }

        let body = ctx
            .run(async { Ok(body_text(response.text().await)) })
            .await?;
        debug!(status = status.as_u16(), url = %url, "unexpected response status");
        Err(ProviderError::ServerProtocol {
            status: status.as_u16(),
            body,
        })
    }

    /// Send a request expecting 200 with a JSON body.
    pub(crate) async fn json<B, T>(
        &self,
        ctx: &CallContext,
        method: Method,
        segments: &[&str],
        body: Option<&B>,
    ) -> ProviderResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .exchange(ctx, method, segments, body, StatusCode::OK)
            .await?;
        let bytes = ctx
            .run(async { response.bytes().await.map_err(ProviderError::from) })
            .await?;
        serde_json::from_slice(&bytes).map_err(|e| ProviderError::InvalidResponse {
            message: format!("failed to parse {} response: {}", segments.join("/"), e),
        })
    }

    /// Send a request expecting 204 No Content.
    pub(crate) async fn no_content<B: Serialize + ?Sized>(
        &self,
        ctx: &CallContext,
        method: Method,
        segments: &[&str],
        body: Option<&B>,
    ) -> ProviderResult<()> {
        self.exchange(ctx, method, segments, body, StatusCode::NO_CONTENT)
            .await
            .map(|_| ())
    }

    /// Send a GET expecting 200 and return the `Server` header.
    pub(crate) async fn server_header(
        &self,
        ctx: &CallContext,
        segments: &[&str],
    ) -> ProviderResult<Option<String>> {
        let response = self
            .exchange::<()>(ctx, Method::GET, segments, None, StatusCode::OK)
            .await?;
        Ok(response
            .headers()
            .get(reqwest::header::SERVER)
            .and_then(|v| v.to_str().ok())
            .map(String::from))
    }
}

/// Response body for error reports; a failed read is noted in place of the body.
fn body_text<E: std::fmt::Display>(read: Result<String, E>) -> String {
    read.unwrap_or_else(|e| format!("<response body unreadable: {e}>"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_text_keeps_read_failure() {
        assert_eq!(body_text::<String>(Ok("boom".to_string())), "boom");
        let text = body_text(Err("connection reset"));
        assert!(text.contains("unreadable"));
        assert!(text.contains("connection reset"));
    }
}
