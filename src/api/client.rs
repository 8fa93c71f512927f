use crate::controller::{Retryable, UserMessage};
use crate::model::{Comment, CreateResponse, NewsArticle, Page};
use crate::util::{validate_base_url, UrlValidationError};
use futures::StreamExt;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use url::Url;

const MAX_RESPONSE_SIZE: usize = 5 * 1024 * 1024; // 5MB
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("İstek zaman aşımına uğradı ({0}s)")]
    Timeout(u64),
    #[error("Ağ hatası: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Sunucu hatası: durum {status}")]
    HttpStatus { status: u16, message: Option<String> },
    #[error("Yanıt çok büyük ({0} bayt sınırı aşıldı)")]
    ResponseTooLarge(usize),
    #[error("JSON hatası: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Geçersiz API adresi: {0}")]
    InvalidBaseUrl(#[from] UrlValidationError),
}

impl UserMessage for ApiError {
    /// The server's own message when it sent one.
    fn user_message(&self) -> String {
        match self {
            ApiError::HttpStatus {
                message: Some(message),
                ..
            } => message.clone(),
            other => other.to_string(),
        }
    }
}

impl Retryable for ApiError {
    fn is_retryable(&self) -> bool {
        match self {
            ApiError::Timeout(_) | ApiError::Network(_) => true,
            ApiError::HttpStatus { status, .. } => *status >= 500 || *status == 429,
            ApiError::ResponseTooLarge(_) | ApiError::Json(_) | ApiError::InvalidBaseUrl(_) => false,
        }
    }
}

/// Query parameters for news listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewsQuery {
    pub category: Option<String>,
    pub search: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NewCommentBody<'a> {
    content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent_id: Option<&'a str>,
}

/// Error body shape used by the API for non-2xx responses.
#[derive(serde::Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Thin client for the site's REST API.
///
/// Cloning is cheap: `reqwest::Client` is reference counted.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
    token: Option<SecretString>,
    timeout: Duration,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base", &self.base.as_str())
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ApiClient {
    /// Create a client for `base_url` (HTTPS, or plain HTTP on localhost).
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("manset/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Self::with_client(http, base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: &str) -> Result<Self, ApiError> {
        let base = validate_base_url(base_url)?;
        Ok(Self {
            http,
            base,
            token: None,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn with_token(mut self, token: Option<SecretString>) -> Self {
        self.token = token;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// `GET /news?page&limit[&category][&search]`
    pub async fn list_news(
        &self,
        query: &NewsQuery,
        page: u32,
        limit: u32,
    ) -> Result<Page<NewsArticle>, ApiError> {
        let mut params = vec![("page", page.to_string()), ("limit", limit.to_string())];
        if let Some(category) = &query.category {
            params.push(("category", category.clone()));
        }
        if let Some(search) = query.search.as_deref().map(str::trim) {
            if !search.is_empty() {
                params.push(("search", search.to_string()));
            }
        }
        self.get_json(&["news"], &params).await
    }

    /// `GET /news/{id}/comments?page&limit`
    pub async fn list_comments(
        &self,
        news_id: &str,
        page: u32,
        limit: u32,
    ) -> Result<Page<Comment>, ApiError> {
        let params = [("page", page.to_string()), ("limit", limit.to_string())];
        self.get_json(&["news", news_id, "comments"], &params)
            .await
    }

    /// `POST /news/{id}/comments` with `{ content, parentId? }`.
    pub async fn create_comment(
        &self,
        news_id: &str,
        text: &str,
        parent_id: Option<&str>,
    ) -> Result<CreateResponse<Comment>, ApiError> {
        let body = serde_json::to_vec(&NewCommentBody {
            content: text,
            parent_id,
        })?;
        let url = self.endpoint(&["news", news_id, "comments"])?;
        let request = self
            .http
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body);

        tracing::debug!(news_id = %news_id, reply = parent_id.is_some(), "Creating comment");
        self.send_json(request).await
    }

    /// Append percent-encoded path segments to the base URL.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| UrlValidationError::CannotBeABase)?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        params: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let mut url = self.endpoint(segments)?;
        url.query_pairs_mut()
            .extend_pairs(params.iter().map(|(k, v)| (*k, v.as_str())));

        tracing::debug!(url = %url, "GET");
        self.send_json(self.http.get(url)).await
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        mut request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        request = request.header(reqwest::header::ACCEPT, "application/json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = tokio::time::timeout(self.timeout, request.send())
            .await
            .map_err(|_| ApiError::Timeout(self.timeout.as_secs()))??;

        let status = response.status();
        let bytes = read_limited(response, MAX_RESPONSE_SIZE).await?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorBody>(&bytes)
                .ok()
                .and_then(|b| b.message);
            tracing::debug!(status = status.as_u16(), message = ?message, "API returned error status");
            return Err(ApiError::HttpStatus {
                status: status.as_u16(),
                message,
            });
        }

        Ok(serde_json::from_slice(&bytes)?)
    }
}

async fn read_limited(response: reqwest::Response, limit: usize) -> Result<Vec<u8>, ApiError> {
    // Fast path: check Content-Length header
    if let Some(len) = response.content_length() {
        if len as usize > limit {
            return Err(ApiError::ResponseTooLarge(limit));
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(ApiError::ResponseTooLarge(limit));
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_plain_http_remote_base() {
        let result = ApiClient::new("http://haber.example.com/api");
        assert!(matches!(result, Err(ApiError::InvalidBaseUrl(_))));
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let client = ApiClient::new("https://haber.example.com/api/v1").unwrap();
        let url = client.endpoint(&["news"]).unwrap();
        assert_eq!(url.as_str(), "https://haber.example.com/api/v1/news");

        let client = ApiClient::new("https://haber.example.com/api/").unwrap();
        let url = client.endpoint(&["news", "n1", "comments"]).unwrap();
        assert_eq!(url.as_str(), "https://haber.example.com/api/news/n1/comments");
    }

    #[test]
    fn test_endpoint_encodes_ids() {
        let client = ApiClient::new("https://haber.example.com/api").unwrap();
        let url = client.endpoint(&["news", "a/b?c", "comments"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://haber.example.com/api/news/a%2Fb%3Fc/comments"
        );
    }

    #[test]
    fn test_retry_classification() {
        assert!(ApiError::Timeout(20).is_retryable());
        assert!(ApiError::HttpStatus {
            status: 503,
            message: None
        }
        .is_retryable());
        assert!(ApiError::HttpStatus {
            status: 429,
            message: None
        }
        .is_retryable());
        assert!(!ApiError::HttpStatus {
            status: 404,
            message: None
        }
        .is_retryable());
        assert!(!ApiError::ResponseTooLarge(10).is_retryable());
    }

    #[test]
    fn test_user_message_prefers_server_text() {
        let err = ApiError::HttpStatus {
            status: 401,
            message: Some("Oturum süresi doldu".to_string()),
        };
        assert_eq!(err.user_message(), "Oturum süresi doldu");
    }

    #[test]
    fn test_debug_masks_token() {
        let client = ApiClient::new("https://haber.example.com/api")
            .unwrap()
            .with_token(Some(SecretString::from("gizli-anahtar".to_string())));
        let debug = format!("{:?}", client);
        assert!(!debug.contains("gizli-anahtar"));
        assert!(debug.contains("[REDACTED]"));
    }
}
