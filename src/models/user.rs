// src/models/user.rs

use serde::{Deserialize, Serialize};

/// A verified caller, as produced by the identity verifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub username: String,
}

/// Minimal public projection of a user. Never carries credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorView {
    pub id: String,
    pub username: String,
}

impl From<&Identity> for AuthorView {
    fn from(identity: &Identity) -> Self {
        Self {
            id: identity.id.clone(),
            username: identity.username.clone(),
        }
    }
}

/// Response for the caller's profile: who they are and what they posted.
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user: AuthorView,
    pub feeds: Vec<crate::models::post::PostResponse>,
}
