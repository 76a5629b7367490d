//! User profile and authentication models.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use super::common::empty_as_none;

/// Role derived from a profile's admin flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

/// Cached copy of a server-side user profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(alias = "ID")]
    pub id: u64,
    pub name: String,
    pub email: String,
    #[serde(rename = "isAdmin", alias = "is_admin", default)]
    pub is_admin: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(
        rename = "dob",
        alias = "date_of_birth",
        alias = "dateOfBirth",
        default,
        deserialize_with = "lenient_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
}

impl UserProfile {
    pub fn role(&self) -> Role {
        if self.is_admin {
            Role::Admin
        } else {
            Role::User
        }
    }
}

/// Minimal user reference embedded in registrations and contributions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    #[serde(alias = "ID")]
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserProfile,
    #[serde(default)]
    pub message: Option<String>,
}

/// Body of `POST /api/register`
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dob: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
}

impl RegisterRequest {
    /// Credentials to log in with once the account exists
    pub fn credentials(&self) -> LoginRequest {
        LoginRequest {
            email: self.email.clone(),
            password: self.password.clone(),
        }
    }
}

/// Body of `PUT /api/admin/users/{id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserUpdate {
    pub name: String,
    pub email: String,
    #[serde(rename = "isAdmin")]
    pub is_admin: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dob: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
}

impl From<&UserProfile> for UserUpdate {
    fn from(user: &UserProfile) -> Self {
        Self {
            name: user.name.clone(),
            email: user.email.clone(),
            is_admin: user.is_admin,
            address: user.address.clone(),
            dob: user.date_of_birth,
            gender: user.gender.clone(),
        }
    }
}

/// Accepts `YYYY-MM-DD`, a full RFC 3339 timestamp, or an empty string.
fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    let Some(raw) = raw else {
        return Ok(None);
    };
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    let date_part = raw.split('T').next().unwrap_or(raw);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map(Some)
        .map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_accepts_drifted_field_names() {
        let user: UserProfile = serde_json::from_str(
            r#"{"ID":3,"name":"Maria","email":"maria@example.com","is_admin":true,
                "date_of_birth":"1985-04-12T00:00:00Z","gender":""}"#,
        )
        .unwrap();

        assert_eq!(user.id, 3);
        assert_eq!(user.role(), Role::Admin);
        assert_eq!(user.date_of_birth, NaiveDate::from_ymd_opt(1985, 4, 12));
        assert_eq!(user.gender, None);
    }

    #[test]
    fn test_profile_defaults_to_regular_user() {
        let user: UserProfile =
            serde_json::from_str(r#"{"id":1,"name":"João","email":"joao@example.com"}"#).unwrap();
        assert!(!user.is_admin);
        assert_eq!(user.role(), Role::User);
        assert_eq!(user.address, None);
    }

    #[test]
    fn test_update_uses_canonical_admin_flag() {
        let user: UserProfile =
            serde_json::from_str(r#"{"id":1,"name":"Ana","email":"ana@example.com","isAdmin":false}"#)
                .unwrap();
        let mut update = UserUpdate::from(&user);
        update.is_admin = true;

        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json["isAdmin"], true);
        assert!(json.get("dob").is_none());
    }
}
