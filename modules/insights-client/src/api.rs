use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use insights_common::wire::{
    AuthResponse, AuthUser, FiltersResponse, LoginRequest, MessageResponse, RecordListResponse,
    RecordResponse, RegisterRequest,
};
use insights_common::{FacetLists, Record, RecordFields};

use crate::error::{ClientError, Result};
use crate::query::FilterSelection;

/// The two reads the dashboard view needs.
#[async_trait]
pub trait DashboardApi: Send + Sync {
    async fn fetch_records(&self, selection: &FilterSelection) -> Result<Vec<Record>>;

    async fn fetch_facets(&self) -> Result<FacetLists>;
}

/// A bearer token issued by login or register. Passed to the client
/// explicitly; nothing is read from ambient state.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    token: String,
}

impl Credentials {
    pub fn bearer(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    /// Credentials carried by an auth response, if it included a token.
    pub fn from_user(user: &AuthUser) -> Option<Self> {
        user.token.as_deref().map(Self::bearer)
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials").field("token", &"***").finish()
    }
}

pub struct HttpDashboardApi {
    client: reqwest::Client,
    base_url: String,
    credentials: Option<Credentials>,
}

impl HttpDashboardApi {
    /// `base_url` is the API root, e.g. `http://localhost:5000/api`.
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials: None,
        })
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn set_credentials(&mut self, credentials: Option<Credentials>) {
        self.credentials = credentials;
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!(%method, %url, "Dashboard API request");
        let builder = self.client.request(method, url);
        match &self.credentials {
            Some(credentials) => builder.bearer_auth(credentials.token()),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T> {
        let resp = builder.send().await?;
        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<MessageResponse>(&body)
                .map(|m| m.message)
                .unwrap_or(body);
            if status == StatusCode::UNAUTHORIZED {
                return Err(ClientError::Unauthorized(message));
            }
            return Err(ClientError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }

    async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        Self::send(self.request(Method::POST, path).json(body)).await
    }

    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<AuthUser> {
        let body = RegisterRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        let resp: AuthResponse = self.post("/auth/register", &body).await?;
        Ok(resp.data)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthUser> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let resp: AuthResponse = self.post("/auth/login", &body).await?;
        Ok(resp.data)
    }

    /// The account behind the current credentials.
    pub async fn me(&self) -> Result<AuthUser> {
        let resp: AuthResponse = Self::send(self.request(Method::GET, "/auth/me")).await?;
        Ok(resp.data)
    }

    pub async fn create_record(&self, fields: &RecordFields) -> Result<Record> {
        let resp: RecordResponse = self.post("/data", fields).await?;
        Ok(resp.data)
    }

    /// Replace the fields present in `patch`; others keep their values.
    pub async fn update_record(&self, id: Uuid, patch: &Value) -> Result<Record> {
        let path = format!("/data/{id}");
        let resp: RecordResponse = Self::send(self.request(Method::PUT, &path).json(patch)).await?;
        Ok(resp.data)
    }

    pub async fn delete_record(&self, id: Uuid) -> Result<()> {
        let path = format!("/data/{id}");
        let _: MessageResponse = Self::send(self.request(Method::DELETE, &path)).await?;
        Ok(())
    }
}

#[async_trait]
impl DashboardApi for HttpDashboardApi {
    async fn fetch_records(&self, selection: &FilterSelection) -> Result<Vec<Record>> {
        let resp: RecordListResponse =
            Self::send(self.request(Method::GET, &selection.data_path())).await?;
        Ok(resp.data)
    }

    async fn fetch_facets(&self) -> Result<FacetLists> {
        let resp: FiltersResponse = Self::send(self.request(Method::GET, "/filters")).await?;
        Ok(resp.lists)
    }
}
