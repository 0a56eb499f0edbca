//! Hosted backend collaborators
//!
//! Authentication, the per-user document store and file storage live in a
//! hosted backend. Services depend on these seams only; [`http`] carries the
//! wire implementation.

pub mod http;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::{error::AppResult, models::Session};

/// Account lifecycle and session management.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn create_account(&self, email: &str, password: &str) -> AppResult<Session>;
    async fn sign_in(&self, email: &str, password: &str) -> AppResult<Session>;
    async fn sign_out(&self, session: &Session) -> AppResult<()>;
    async fn send_verification_email(&self, session: &Session) -> AppResult<()>;
    async fn send_password_reset(&self, email: &str) -> AppResult<()>;
    async fn update_password(&self, session: &Session, new_password: &str) -> AppResult<()>;
    async fn delete_account(&self, session: &Session) -> AppResult<()>;
}

/// Document access with array-field transforms.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, session: &Session, collection: &str, id: &str) -> AppResult<Value>;

    /// Write a document; `merge` leaves fields absent from `data` untouched.
    async fn set(
        &self,
        session: &Session,
        collection: &str,
        id: &str,
        data: Value,
        merge: bool,
    ) -> AppResult<()>;

    /// Append values to an array field, skipping ones already present.
    async fn array_union(
        &self,
        session: &Session,
        collection: &str,
        id: &str,
        field: &str,
        values: Vec<String>,
    ) -> AppResult<()>;

    /// Remove all occurrences of the values from an array field.
    async fn array_remove(
        &self,
        session: &Session,
        collection: &str,
        id: &str,
        field: &str,
        values: Vec<String>,
    ) -> AppResult<()>;
}

/// Object upload returning a public download URL.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FileStorage: Send + Sync {
    async fn upload(
        &self,
        session: &Session,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> AppResult<String>;
}

/// One handle per collaborator, shared across services.
#[derive(Clone)]
pub struct Backend {
    pub auth: Arc<dyn AuthProvider>,
    pub documents: Arc<dyn DocumentStore>,
    pub storage: Arc<dyn FileStorage>,
}
