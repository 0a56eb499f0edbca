//! Profile service

use serde_json::{Map, Value};
use uuid::Uuid;

use crate::{
    backend::Backend,
    config::BackendConfig,
    error::AppResult,
    models::{user::UpdateProfile, UserProfile},
    services::auth::SessionStore,
    validation,
};

#[derive(Clone)]
pub struct ProfileService {
    backend: Backend,
    sessions: SessionStore,
    config: BackendConfig,
}

impl ProfileService {
    pub fn new(backend: Backend, sessions: SessionStore, config: BackendConfig) -> Self {
        Self {
            backend,
            sessions,
            config,
        }
    }

    /// The caller's user document.
    pub async fn me(&self) -> AppResult<UserProfile> {
        let session = self.sessions.current().await?;
        let document = self
            .backend
            .documents
            .get(&session, &self.config.user_collection, &session.uid)
            .await?;
        Ok(serde_json::from_value(document)?)
    }

    /// Merge-update the caller's profile fields.
    ///
    /// When a new profile picture is supplied it is uploaded first and the
    /// document update carries its download URL; an upload failure aborts
    /// the whole update.
    pub async fn update(&self, update: UpdateProfile) -> AppResult<()> {
        let session = self.sessions.current().await?;

        let mut fields = Map::new();
        if let Some(username) = update.username {
            validation::validate_username(&username)?;
            fields.insert("username".to_string(), Value::String(username));
        }
        if let Some(signature) = update.signature {
            fields.insert("signature".to_string(), Value::String(signature));
        }
        if let Some(image) = update.profile_image {
            let object = format!("profile_images/{}.jpg", Uuid::new_v4());
            let url = self
                .backend
                .storage
                .upload(&session, &object, image, "image/jpeg")
                .await?;
            fields.insert("profilePictureURL".to_string(), Value::String(url));
        }

        if fields.is_empty() {
            return Ok(());
        }

        self.backend
            .documents
            .set(
                &session,
                &self.config.user_collection,
                &session.uid,
                Value::Object(fields),
                true,
            )
            .await
    }

    /// The caller's friend list.
    pub async fn friends(&self) -> AppResult<Vec<String>> {
        Ok(self.me().await?.friend_list)
    }
}
