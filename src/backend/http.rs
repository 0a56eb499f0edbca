//! reqwest implementation of the hosted-backend collaborators

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    config::{BackendConfig, HttpConfig},
    error::{AppError, AppResult},
    models::Session,
};

use super::{AuthProvider, DocumentStore, FileStorage};

#[derive(Debug, Deserialize)]
struct SessionPayload {
    uid: String,
    token: String,
    email: String,
}

impl From<SessionPayload> for Session {
    fn from(payload: SessionPayload) -> Self {
        Session {
            uid: payload.uid,
            token: payload.token,
            email: payload.email,
        }
    }
}

#[derive(Debug, Deserialize)]
struct UploadPayload {
    url: String,
}

/// HTTP client for the hosted auth+document-store backend.
#[derive(Clone)]
pub struct HostedBackend {
    http: reqwest::Client,
    base: String,
}

impl HostedBackend {
    pub fn new(config: &BackendConfig, http_config: &HttpConfig) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(http_config.timeout_secs))
            .user_agent(http_config.user_agent.clone())
            .build()?;
        Ok(Self::with_client(http, config))
    }

    pub fn with_client(http: reqwest::Client, config: &BackendConfig) -> Self {
        Self {
            http,
            base: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    fn expect_success(
        &self,
        response: reqwest::Response,
        context: &str,
    ) -> AppResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(AppError::from_status(status, context))
        }
    }
}

#[async_trait]
impl AuthProvider for HostedBackend {
    async fn create_account(&self, email: &str, password: &str) -> AppResult<Session> {
        let response = self
            .http
            .post(self.url("/auth/accounts"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        let payload: SessionPayload = self
            .expect_success(response, "create account")?
            .json()
            .await?;
        Ok(payload.into())
    }

    async fn sign_in(&self, email: &str, password: &str) -> AppResult<Session> {
        let response = self
            .http
            .post(self.url("/auth/sessions"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        let payload: SessionPayload = self.expect_success(response, "sign in")?.json().await?;
        Ok(payload.into())
    }

    async fn sign_out(&self, session: &Session) -> AppResult<()> {
        let response = self
            .http
            .delete(self.url("/auth/sessions"))
            .bearer_auth(&session.token)
            .send()
            .await?;
        self.expect_success(response, "sign out")?;
        Ok(())
    }

    async fn send_verification_email(&self, session: &Session) -> AppResult<()> {
        let response = self
            .http
            .post(self.url("/auth/verification"))
            .bearer_auth(&session.token)
            .send()
            .await?;
        self.expect_success(response, "send verification email")?;
        Ok(())
    }

    async fn send_password_reset(&self, email: &str) -> AppResult<()> {
        let response = self
            .http
            .post(self.url("/auth/password-resets"))
            .json(&json!({ "email": email }))
            .send()
            .await?;
        self.expect_success(response, "send password reset")?;
        Ok(())
    }

    async fn update_password(&self, session: &Session, new_password: &str) -> AppResult<()> {
        let response = self
            .http
            .put(self.url("/auth/password"))
            .bearer_auth(&session.token)
            .json(&json!({ "password": new_password }))
            .send()
            .await?;
        self.expect_success(response, "update password")?;
        Ok(())
    }

    async fn delete_account(&self, session: &Session) -> AppResult<()> {
        let response = self
            .http
            .delete(self.url("/auth/account"))
            .bearer_auth(&session.token)
            .send()
            .await?;
        self.expect_success(response, "delete account")?;
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for HostedBackend {
    async fn get(&self, session: &Session, collection: &str, id: &str) -> AppResult<Value> {
        let response = self
            .http
            .get(self.url(&format!("/documents/{}/{}", collection, id)))
            .bearer_auth(&session.token)
            .send()
            .await?;
        Ok(self.expect_success(response, "get document")?.json().await?)
    }

    async fn set(
        &self,
        session: &Session,
        collection: &str,
        id: &str,
        data: Value,
        merge: bool,
    ) -> AppResult<()> {
        let request = if merge {
            self.http
                .patch(self.url(&format!("/documents/{}/{}", collection, id)))
        } else {
            self.http
                .put(self.url(&format!("/documents/{}/{}", collection, id)))
        };
        let response = request
            .bearer_auth(&session.token)
            .json(&data)
            .send()
            .await?;
        self.expect_success(response, "set document")?;
        Ok(())
    }

    async fn array_union(
        &self,
        session: &Session,
        collection: &str,
        id: &str,
        field: &str,
        values: Vec<String>,
    ) -> AppResult<()> {
        self.array_transform(session, collection, id, "arrayUnion", field, values)
            .await
    }

    async fn array_remove(
        &self,
        session: &Session,
        collection: &str,
        id: &str,
        field: &str,
        values: Vec<String>,
    ) -> AppResult<()> {
        self.array_transform(session, collection, id, "arrayRemove", field, values)
            .await
    }
}

impl HostedBackend {
    async fn array_transform(
        &self,
        session: &Session,
        collection: &str,
        id: &str,
        op: &str,
        field: &str,
        values: Vec<String>,
    ) -> AppResult<()> {
        let response = self
            .http
            .post(self.url(&format!("/documents/{}/{}/transform", collection, id)))
            .bearer_auth(&session.token)
            .json(&json!({ "op": op, "field": field, "values": values }))
            .send()
            .await?;
        self.expect_success(response, "array transform")?;
        Ok(())
    }
}

#[async_trait]
impl FileStorage for HostedBackend {
    async fn upload(
        &self,
        session: &Session,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> AppResult<String> {
        let response = self
            .http
            .post(self.url(&format!("/storage/{}", path)))
            .bearer_auth(&session.token)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;
        let payload: UploadPayload = self.expect_success(response, "upload")?.json().await?;
        Ok(payload.url)
    }
}
