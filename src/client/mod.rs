//! HTTP client for the admin API.
//!
//! Mirrors what the admin panel does over the wire: it keeps the session token after
//! login and caches the merged site content by revision.

mod cache;

pub use cache::ContentCache;

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::api::ApiResponse;
use crate::errors::ErrorResponse;
use crate::models::{
    ContactSubmission, CreateContactRequest, CreatedContact, LoginRequest, LoginResponse,
    RevisionInfo, SiteContent, VerifyResponse,
};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{status}: {code}: {message}")]
    Api {
        status: StatusCode,
        code: String,
        message: String,
    },
    #[error("not logged in")]
    NotAuthenticated,
}

impl ClientError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Http(e) => e.status(),
            ClientError::NotAuthenticated => None,
        }
    }
}

pub struct AdminClient {
    http: Client,
    base_url: String,
    token: Option<String>,
    cache: ContentCache,
}

impl AdminClient {
    /// `base_url` is the server root, e.g. `http://127.0.0.1:8080`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
            cache: ContentCache::new(),
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn cache(&self) -> &ContentCache {
        &self.cache
    }

    pub async fn login(&mut self, username: &str, password: &str) -> Result<LoginResponse, ClientError> {
        let request = self.http.post(self.url("/api/auth/login")).json(&LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        });
        let login: LoginResponse = send(request).await?.data;
        self.token = Some(login.token.clone());
        Ok(login)
    }

    pub async fn verify(&self) -> Result<VerifyResponse, ClientError> {
        let request = self.authed(self.http.get(self.url("/api/auth/verify")))?;
        Ok(send(request).await?.data)
    }

    /// Forget the token locally. The server keeps no session state to revoke.
    pub fn logout(&mut self) {
        self.token = None;
    }

    /// Merged site content, served from the cache while the server revision is unchanged.
    pub async fn content(&mut self) -> Result<SiteContent, ClientError> {
        let info: RevisionInfo = send(self.http.get(self.url("/api/content/revision")))
            .await?
            .data;
        if let Some(content) = self.cache.get(info.revision_id) {
            return Ok(content.clone());
        }

        let response: ApiResponse<SiteContent> =
            send(self.http.get(self.url("/api/content"))).await?;
        let revision_id = response.revision_id.unwrap_or(info.revision_id);
        self.cache.store(revision_id, response.data.clone());
        Ok(response.data)
    }

    pub async fn update_content(&mut self, patch: &Value) -> Result<SiteContent, ClientError> {
        let request = self.authed(self.http.put(self.url("/api/content")).json(patch))?;
        let response: ApiResponse<SiteContent> = send(request).await?;
        self.cache.invalidate();
        Ok(response.data)
    }

    /// Submit the public contact form. Returns the new submission id.
    pub async fn submit_contact(&mut self, contact: &CreateContactRequest) -> Result<i64, ClientError> {
        let request = self.http.post(self.url("/api/contacts")).json(contact);
        let created: CreatedContact = send(request).await?.data;
        self.cache.invalidate();
        Ok(created.id)
    }

    pub async fn list_contacts(&self) -> Result<Vec<ContactSubmission>, ClientError> {
        let request = self.authed(self.http.get(self.url("/api/contacts")))?;
        Ok(send(request).await?.data)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authed(&self, request: RequestBuilder) -> Result<RequestBuilder, ClientError> {
        let token = self.token.as_deref().ok_or(ClientError::NotAuthenticated)?;
        Ok(request.bearer_auth(token))
    }
}

async fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<ApiResponse<T>, ClientError> {
    let response = request.send().await?;
    let status = response.status();

    if status.is_success() {
        return Ok(response.json().await?);
    }

    let body = response.text().await?;
    match serde_json::from_str::<ErrorResponse>(&body) {
        Ok(err) => Err(ClientError::Api {
            status,
            code: err.error.code,
            message: err.error.message,
        }),
        Err(_) => Err(ClientError::Api {
            status,
            code: String::new(),
            message: body,
        }),
    }
}
