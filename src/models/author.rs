//! Author wire payload

use serde::Deserialize;

/// Author record from the catalog author endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthorPayload {
    pub name: Option<String>,
}
