//! Wire types for the session and profile endpoints

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The signed-in principal as reported by the identity endpoint
///
/// Fields the client does not interpret are kept in `extra` so that the
/// record can be passed back to views unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(default)]
    pub pk: u64,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub profile_id: Option<u64>,
    #[serde(default)]
    pub profile_image: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Identity {
    pub fn new(pk: u64, username: impl Into<String>) -> Self {
        Self {
            pk,
            username: username.into(),
            profile_id: None,
            profile_image: None,
            extra: Map::new(),
        }
    }

    #[must_use]
    pub fn with_profile_id(mut self, profile_id: u64) -> Self {
        self.profile_id = Some(profile_id);
        self
    }
}

/// Profile type string marking shelter accounts
pub const SHELTER_PROFILE_TYPE: &str = "shelter";

/// A profile record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: String,
}

impl Profile {
    /// Shelter accounts may create and manage dog listings
    pub fn is_shelter(&self) -> bool {
        self.kind == SHELTER_PROFILE_TYPE
    }
}

/// Editable profile fields; unset fields are left untouched by the server
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignInRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignInResponse {
    pub user: Identity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationRequest {
    pub username: String,
    pub password1: String,
    pub password2: String,
}
