//! Thin client for the agent service.
//!
//! Only the calls the feed itself needs: the event feed URL, session
//! creation for bootstrap, and the full message list for refetch.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use crate::error::{FeedError, FeedResult, NetworkError};
use crate::models::{ConversationEntry, SessionInfo};
use crate::traits::{Headers, HttpClient, HttpError, Response, SessionProvisioner};

/// Default base URL of a locally running agent service.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:4096";

/// Errors from agent service calls.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: HttpError,
    },

    #[error("{url} returned HTTP {status}: {body}")]
    Status { url: String, status: u16, body: String },

    #[error("Unexpected response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl From<ApiError> for FeedError {
    fn from(e: ApiError) -> Self {
        match e {
            ApiError::Transport { url, source } => {
                FeedError::Network(NetworkError::from_http(source, &url))
            }
            ApiError::Status { status, body, .. } => {
                FeedError::Network(NetworkError::HttpStatus {
                    status,
                    message: body,
                })
            }
            ApiError::Decode { url, source } => FeedError::decode(url, source),
        }
    }
}

/// Client for the agent service REST surface.
#[derive(Debug, Clone)]
pub struct AgentApiClient<C: HttpClient> {
    base_url: String,
    client: C,
}

impl<C: HttpClient> AgentApiClient<C> {
    /// Trailing slashes on `base_url` are ignored.
    pub fn new(client: C, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, client }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL of the event feed, scoped to a workspace directory when given.
    pub fn event_url(&self, workspace: Option<&str>) -> String {
        self.with_directory(format!("{}/event", self.base_url), workspace)
    }

    /// `POST /session`
    pub async fn create_session(&self, workspace: Option<&str>) -> Result<SessionInfo, ApiError> {
        let url = self.with_directory(format!("{}/session", self.base_url), workspace);
        debug!("Creating session at {}", url);

        let response = self
            .client
            .post(&url, "{}", &Headers::new())
            .await
            .map_err(|source| ApiError::Transport {
                url: url.clone(),
                source,
            })?;
        decode(&url, response)
    }

    /// `GET /session/{id}/message`
    pub async fn list_messages(&self, session_id: &str) -> Result<Vec<ConversationEntry>, ApiError> {
        let url = format!(
            "{}/session/{}/message",
            self.base_url,
            urlencoding::encode(session_id)
        );
        debug!("Fetching messages from {}", url);

        let response = self
            .client
            .get(&url, &Headers::new())
            .await
            .map_err(|source| ApiError::Transport {
                url: url.clone(),
                source,
            })?;
        decode(&url, response)
    }

    fn with_directory(&self, url: String, workspace: Option<&str>) -> String {
        match workspace {
            Some(dir) => format!("{}?directory={}", url, urlencoding::encode(dir)),
            None => url,
        }
    }
}

fn decode<T: DeserializeOwned>(url: &str, response: Response) -> Result<T, ApiError> {
    if !response.is_success() {
        return Err(ApiError::Status {
            url: url.to_string(),
            status: response.status,
            body: response.body_text(),
        });
    }
    response.json().map_err(|source| ApiError::Decode {
        url: url.to_string(),
        source,
    })
}

#[async_trait]
impl<C: HttpClient + 'static> SessionProvisioner for AgentApiClient<C> {
    async fn create_session(&self, workspace: Option<&str>) -> FeedResult<SessionInfo> {
        Ok(AgentApiClient::create_session(self, workspace).await?)
    }

    async fn list_messages(&self, session_id: &str) -> FeedResult<Vec<ConversationEntry>> {
        Ok(AgentApiClient::list_messages(self, session_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{MockHttpClient, ReqwestHttpClient};
    use crate::adapters::mock::MockResponse;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_event_url_encodes_directory() {
        let api = AgentApiClient::new(MockHttpClient::new(), "http://agent:4096/");
        assert_eq!(api.event_url(None), "http://agent:4096/event");
        assert_eq!(
            api.event_url(Some("/home/me/my repo")),
            "http://agent:4096/event?directory=%2Fhome%2Fme%2Fmy%20repo"
        );
    }

    #[tokio::test]
    async fn test_create_session_posts_to_session() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/session"))
            .and(query_param("directory", "/work/repo"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "ses_42",
                "title": "New session",
                "directory": "/work/repo"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let api = AgentApiClient::new(ReqwestHttpClient::new(), server.uri());
        let session = api.create_session(Some("/work/repo")).await.unwrap();

        assert_eq!(session.id, "ses_42");
        assert_eq!(session.directory.as_deref(), Some("/work/repo"));
    }

    #[tokio::test]
    async fn test_list_messages_decodes_entries() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/session/ses_42/message"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {
                    "info": {"id": "m1", "sessionID": "ses_42", "role": "user"},
                    "parts": [{"id": "p1", "messageID": "m1", "type": "text", "text": "hi"}]
                },
                {
                    "info": {"id": "m2", "sessionID": "ses_42", "role": "assistant"},
                    "parts": []
                }
            ])))
            .mount(&server)
            .await;

        let api = AgentApiClient::new(ReqwestHttpClient::new(), server.uri());
        let entries = api.list_messages("ses_42").await.unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id(), "m1");
        assert_eq!(entries[0].parts[0].text_content(), Some("hi"));
    }

    #[tokio::test]
    async fn test_non_success_maps_to_http_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/session/missing/message"))
            .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
            .mount(&server)
            .await;

        let api = AgentApiClient::new(ReqwestHttpClient::new(), server.uri());
        let err = SessionProvisioner::list_messages(&api, "missing")
            .await
            .unwrap_err();

        assert_eq!(
            err,
            FeedError::Network(NetworkError::HttpStatus {
                status: 404,
                message: "not found".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_garbage_body_is_decode_error() {
        let client = MockHttpClient::new();
        client.set_response(
            "http://agent/session",
            MockResponse::json(200, &json!({"unexpected": true})),
        );

        let api = AgentApiClient::new(client, "http://agent");
        let err = SessionProvisioner::create_session(&api, None)
            .await
            .unwrap_err();
        assert!(matches!(err, FeedError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_transport_failure_maps_to_network_error() {
        let client = MockHttpClient::new();
        let api = AgentApiClient::new(client, "http://agent");
        let err = SessionProvisioner::list_messages(&api, "ses_1")
            .await
            .unwrap_err();
        assert!(matches!(err, FeedError::Network(NetworkError::Other { .. })));
    }
}
