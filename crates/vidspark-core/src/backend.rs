//! HTTP client for the idea generation backend.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use tracing::{info, warn};

use crate::entitlement::EntitlementStatus;
use crate::error::BackendError;
use crate::request::GenerationRequest;

/// Error value the backend uses when the free allowance is used up.
pub const LIMIT_REACHED: &str = "LIMIT_REACHED";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Decoded body of a generate/refine call.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum GenerateReply {
    Idea {
        idea: String,
    },
    Error {
        error: String,
        #[serde(default)]
        message: Option<String>,
    },
}

impl GenerateReply {
    pub fn is_limit_reached(&self) -> bool {
        matches!(self, GenerateReply::Error { error, .. } if error == LIMIT_REACHED)
    }
}

/// The three calls the client makes against the backend.
#[async_trait]
pub trait IdeaBackend: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerateReply, BackendError>;

    async fn status(&self) -> Result<EntitlementStatus, BackendError>;

    async fn subscribe(&self) -> Result<(), BackendError>;
}

/// Backend reached over HTTP with a cookie session.
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: &str) -> Result<Self, BackendError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// `base_url` should be like `http://localhost:5000`; a trailing slash is dropped.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, BackendError> {
        let client = Client::builder()
            .cookie_store(true)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Log in with the form the web app uses. The session cookie is kept for
    /// later calls.
    pub async fn login(&self, username: &str, password: &str) -> Result<(), BackendError> {
        let url = self.url("/login");
        info!(url = %url, username, "logging in");

        let response = self
            .client
            .post(&url)
            .form(&[("username", username), ("password", password)])
            .send()
            .await?;

        // A rejected login re-renders the login page instead of redirecting.
        if landed_on_login(&response) {
            return Err(BackendError::LoginRejected(username.to_string()));
        }
        let response = ensure_success(response).await?;
        info!(final_url = %response.url(), "logged in");
        Ok(())
    }
}

fn landed_on_login(response: &Response) -> bool {
    response.url().path() == "/login"
}

async fn ensure_success(response: Response) -> Result<Response, BackendError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(BackendError::Server {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response)
}

#[async_trait]
impl IdeaBackend for HttpBackend {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerateReply, BackendError> {
        let url = self.url("/api/generate");
        info!(
            url = %url,
            business = %request.business_type,
            refinement = request.is_refinement(),
            "requesting idea"
        );

        let response = self.client.post(&url).json(request).send().await?;
        if landed_on_login(&response) {
            return Err(BackendError::Unauthenticated);
        }

        // Error replies come with 4xx/5xx statuses but still carry a JSON body.
        let status = response.status();
        let body = response.text().await?;
        match serde_json::from_str::<GenerateReply>(&body) {
            Ok(reply) => {
                if let GenerateReply::Error { error, .. } = &reply {
                    warn!(status = status.as_u16(), error = %error, "backend refused generation");
                }
                Ok(reply)
            }
            Err(_) if !status.is_success() => Err(BackendError::Server {
                status: status.as_u16(),
                body,
            }),
            Err(_) => Err(BackendError::UnexpectedBody(body)),
        }
    }

    async fn status(&self) -> Result<EntitlementStatus, BackendError> {
        let url = self.url("/api/check_status");
        info!(url = %url, "fetching entitlement status");

        let response = ensure_success(self.client.get(&url).send().await?).await?;
        let body = response.text().await?;
        Ok(EntitlementStatus::from_json(&body))
    }

    async fn subscribe(&self) -> Result<(), BackendError> {
        let url = self.url("/api/subscribe");
        info!(url = %url, "subscribing");

        let response = self.client.post(&url).send().await?;
        if landed_on_login(&response) {
            return Err(BackendError::Unauthenticated);
        }
        ensure_success(response).await?;
        info!("subscription active");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_idea() {
        let reply: GenerateReply = serde_json::from_str(r#"{"idea":"THE BIG IDEA\nx"}"#).unwrap();
        assert_eq!(
            reply,
            GenerateReply::Idea {
                idea: "THE BIG IDEA\nx".to_string()
            }
        );
        assert!(!reply.is_limit_reached());
    }

    #[test]
    fn test_reply_limit_reached() {
        let reply: GenerateReply = serde_json::from_str(
            r#"{"error":"LIMIT_REACHED","message":"Free trial expired. Please upgrade."}"#,
        )
        .unwrap();
        assert!(reply.is_limit_reached());
    }

    #[test]
    fn test_reply_generic_error_without_message() {
        let reply: GenerateReply =
            serde_json::from_str(r#"{"error":"Business type is required"}"#).unwrap();
        assert_eq!(
            reply,
            GenerateReply::Error {
                error: "Business type is required".to_string(),
                message: None,
            }
        );
        assert!(!reply.is_limit_reached());
    }

    #[test]
    fn test_reply_rejects_other_shapes() {
        assert!(serde_json::from_str::<GenerateReply>(r#"{"status":"ok"}"#).is_err());
    }

    #[test]
    fn test_base_url_trailing_slash_dropped() {
        let backend = HttpBackend::new("http://localhost:5000/").unwrap();
        assert_eq!(backend.base_url(), "http://localhost:5000");
        assert_eq!(backend.url("/api/generate"), "http://localhost:5000/api/generate");
    }
}
