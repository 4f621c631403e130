use crate::models::identity::display_name_from_email;
use crate::{NewProfile, Role};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Authenticated session issued by the remote identity provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Unix timestamp (seconds) after which the access token is rejected.
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: SessionUser,
}

impl Session {
    pub fn user_id(&self) -> Uuid {
        self.user.id
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at
            .is_some_and(|expires_at| expires_at <= now.timestamp())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: UserMetadata,
}

/// Free-form attributes captured at sign-up.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl SessionUser {
    /// Profile row to create when none exists yet. New accounts always
    /// start as farmers; promotion to admin happens server-side.
    pub fn default_profile(&self) -> NewProfile {
        let email = self.email.clone().unwrap_or_default();
        let metadata = &self.user_metadata;

        let full_name = metadata
            .full_name
            .clone()
            .filter(|name| !name.trim().is_empty())
            .or_else(|| {
                let joined = [metadata.first_name.as_deref(), metadata.last_name.as_deref()]
                    .into_iter()
                    .flatten()
                    .collect::<Vec<_>>()
                    .join(" ");
                (!joined.trim().is_empty()).then_some(joined)
            })
            .unwrap_or_else(|| display_name_from_email(&email));

        NewProfile {
            id: self.id,
            email,
            full_name,
            phone: metadata.phone.clone(),
            role: Role::Farmer,
        }
    }
}
