//! User profile, session and auth request models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Authenticated session against the hosted backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub uid: String,
    pub token: String,
    pub email: String,
}

/// Per-user document stored in the hosted document store.
///
/// Field names follow the document-store schema, not Rust convention.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProfile {
    pub username: String,
    pub name: String,
    pub email: String,
    pub is_email_verified: bool,
    pub signature: String,
    #[serde(rename = "profilePictureURL")]
    pub profile_picture_url: String,
    pub friend_list: Vec<String>,
    pub bookmarks: Vec<String>,
    pub loaned_books: Vec<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl UserProfile {
    /// Fresh document written at registration time.
    pub fn new_registration(username: &str, email: &str) -> Self {
        Self {
            username: username.to_string(),
            email: email.to_string(),
            created_at: Some(Utc::now()),
            ..Default::default()
        }
    }
}

/// Registration request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 4, max = 24))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6, max = 32))]
    pub password: String,
}

/// Login request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Own-profile update; unset fields are left untouched
#[derive(Debug, Clone, Default)]
pub struct UpdateProfile {
    pub username: Option<String>,
    pub signature: Option<String>,
    /// JPEG bytes to upload as the new profile picture.
    pub profile_image: Option<Vec<u8>>,
}

/// Password change request; the current password re-authenticates first
#[derive(Debug, Clone)]
pub struct ChangePassword {
    pub current_password: String,
    pub new_password: String,
}
