//! Typed HTTP client over the blog REST API.

use reqwest::{Method, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use quill_shared::FieldErrorBody;
use quill_shared::dto::{
    AuthResponse, CategoryResponse, CommentResponse, CreateCategoryRequest, CreateCommentRequest,
    CreatePostRequest, LoginRequest, PostDetailResponse, PostResponse, RegisterRequest,
    UpdateCategoryRequest, UpdatePostRequest, UserResponse,
};

use crate::error::ClientError;

/// Either half of the response envelope.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    data: Option<T>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    errors: Option<Vec<FieldErrorBody>>,
}

/// Unwrap an envelope body into its payload or the server's error.
pub(crate) fn decode_envelope<T: DeserializeOwned>(
    status: u16,
    body: &[u8],
) -> Result<T, ClientError> {
    let failed = !(200..300).contains(&status);

    let envelope: Envelope<T> = match serde_json::from_slice(body) {
        Ok(envelope) => envelope,
        Err(_) if failed => {
            return Err(ClientError::Api {
                status,
                message: format!("Request failed with status {}", status),
                errors: Vec::new(),
            });
        }
        Err(e) => return Err(ClientError::Decode(e.to_string())),
    };

    if failed || !envelope.success {
        return Err(ClientError::Api {
            status,
            message: envelope
                .error
                .unwrap_or_else(|| format!("Request failed with status {}", status)),
            errors: envelope.errors.unwrap_or_default(),
        });
    }

    envelope
        .data
        .ok_or_else(|| ClientError::Decode("response has no data".to_string()))
}

/// HTTP client for the blog API.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct BlogClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl BlogClient {
    /// `base_url` is the server origin, e.g. `http://localhost:8080`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_http(reqwest::Client::new(), base_url)
    }

    pub fn with_http(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http,
            base_url,
            token: None,
        }
    }

    /// A copy of this client that sends `token` as a bearer credential.
    pub fn authenticated(&self, token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            ..self.clone()
        }
    }

    /// A copy of this client without credentials.
    pub fn anonymous(&self) -> Self {
        Self {
            token: None,
            ..self.clone()
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let req = self
            .http
            .request(method, format!("{}/api{}", self.base_url, path));
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, ClientError> {
        let response = req.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;

        let result = decode_envelope(status, &body);
        if let Err(ClientError::Api { message, .. }) = &result {
            tracing::debug!(status, error = %message, "API request failed");
        }
        result
    }

    // -- Health ------------------------------------------------------------

    pub async fn health(&self) -> Result<serde_json::Value, ClientError> {
        self.send(self.request(Method::GET, "/health")).await
    }

    // -- Auth --------------------------------------------------------------

    pub async fn register(&self, req: &RegisterRequest) -> Result<AuthResponse, ClientError> {
        self.send(self.request(Method::POST, "/auth/register").json(req))
            .await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ClientError> {
        let req = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.send(self.request(Method::POST, "/auth/login").json(&req))
            .await
    }

    pub async fn me(&self) -> Result<UserResponse, ClientError> {
        self.send(self.request(Method::GET, "/auth/me")).await
    }

    // -- Categories --------------------------------------------------------

    pub async fn list_categories(&self) -> Result<Vec<CategoryResponse>, ClientError> {
        self.send(self.request(Method::GET, "/categories")).await
    }

    pub async fn get_category(&self, id: Uuid) -> Result<CategoryResponse, ClientError> {
        self.send(self.request(Method::GET, &format!("/categories/{}", id)))
            .await
    }

    pub async fn create_category(
        &self,
        req: &CreateCategoryRequest,
    ) -> Result<CategoryResponse, ClientError> {
        self.send(self.request(Method::POST, "/categories").json(req))
            .await
    }

    pub async fn update_category(
        &self,
        id: Uuid,
        req: &UpdateCategoryRequest,
    ) -> Result<CategoryResponse, ClientError> {
        self.send(
            self.request(Method::PUT, &format!("/categories/{}", id))
                .json(req),
        )
        .await
    }

    pub async fn delete_category(&self, id: Uuid) -> Result<(), ClientError> {
        self.send::<serde_json::Value>(
            self.request(Method::DELETE, &format!("/categories/{}", id)),
        )
        .await
        .map(|_| ())
    }

    // -- Posts -------------------------------------------------------------

    pub async fn list_posts(&self) -> Result<Vec<PostResponse>, ClientError> {
        self.send(self.request(Method::GET, "/posts")).await
    }

    pub async fn search_posts(&self, query: &str) -> Result<Vec<PostResponse>, ClientError> {
        self.send(
            self.request(Method::GET, "/posts/search")
                .query(&[("q", query)]),
        )
        .await
    }

    pub async fn get_post(&self, id: Uuid) -> Result<PostDetailResponse, ClientError> {
        self.send(self.request(Method::GET, &format!("/posts/{}", id)))
            .await
    }

    pub async fn create_post(&self, req: &CreatePostRequest) -> Result<PostResponse, ClientError> {
        self.send(self.request(Method::POST, "/posts").json(req))
            .await
    }

    pub async fn update_post(
        &self,
        id: Uuid,
        req: &UpdatePostRequest,
    ) -> Result<PostResponse, ClientError> {
        self.send(self.request(Method::PUT, &format!("/posts/{}", id)).json(req))
            .await
    }

    pub async fn delete_post(&self, id: Uuid) -> Result<(), ClientError> {
        self.send::<serde_json::Value>(self.request(Method::DELETE, &format!("/posts/{}", id)))
            .await
            .map(|_| ())
    }

    pub async fn add_comment(
        &self,
        post_id: Uuid,
        content: &str,
    ) -> Result<CommentResponse, ClientError> {
        let req = CreateCommentRequest {
            content: content.to_string(),
        };
        self.send(
            self.request(Method::POST, &format!("/posts/{}/comments", post_id))
                .json(&req),
        )
        .await
    }
}
