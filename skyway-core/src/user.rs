use serde::{Deserialize, Serialize};
use skyway_shared::Masked;
use std::fmt;
use std::str::FromStr;

use crate::CoreError;

/// Account role. Drives room selection on the socket and route gating.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", try_from = "String")]
pub enum Role {
    User,
    Manager,
    Administrator,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Manager => "MANAGER",
            Role::Administrator => "ADMINISTRATOR",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Python enums sometimes leak through as "Role.USER"
        let value = s.trim().trim_start_matches("Role.");
        match value.to_ascii_uppercase().as_str() {
            "USER" => Ok(Role::User),
            "MANAGER" => Ok(Role::Manager),
            "ADMINISTRATOR" => Ok(Role::Administrator),
            _ => Err(CoreError::UnknownVariant { kind: "role", value: s.to_string() }),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gender {
    Male,
    Female,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub user_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub birth_date: Option<String>,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub house_number: Option<i64>,
    #[serde(default)]
    pub account_balance: f64,
    pub role: Role,
    /// Base64 data URL or plain URL.
    #[serde(default)]
    pub profile_picture: Option<String>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Administrator
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: Masked<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: Masked<String>,
    /// `YYYY-MM-DD`
    pub birth_date: String,
    pub gender: Gender,
    pub country: String,
    pub city: String,
    pub street: String,
    pub house_number: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
}

/// Response of `auth/login` and `auth/register`.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub token: Masked<String>,
    pub user: User,
}

/// Partial profile update sent to `PATCH users/`. Unset fields are omitted.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<Masked<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub house_number: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoleUpdate {
    pub role: Role,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Transaction {
    pub amount: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_deserialization_with_sparse_fields() {
        let json = r#"{
            "user_id": 5,
            "first_name": "Ana",
            "last_name": "Kovac",
            "email": "ana@example.com",
            "role": "MANAGER",
            "account_balance": 120.5,
            "gender": "FEMALE"
        }"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.role, Role::Manager);
        assert_eq!(user.gender, Some(Gender::Female));
        assert_eq!(user.full_name(), "Ana Kovac");
        assert!(user.profile_picture.is_none());
    }

    #[test]
    fn test_role_accepts_enum_prefix() {
        assert_eq!("Role.ADMINISTRATOR".parse::<Role>().unwrap(), Role::Administrator);
        assert!("PILOT".parse::<Role>().is_err());
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"USER\"");
    }

    #[test]
    fn test_profile_update_omits_unset_fields() {
        let update = ProfileUpdate {
            city: Some("Novi Sad".to_string()),
            ..Default::default()
        };
        assert_eq!(serde_json::to_string(&update).unwrap(), r#"{"city":"Novi Sad"}"#);
    }

    #[test]
    fn test_login_request_keeps_password_out_of_debug() {
        let req = LoginRequest {
            email: "a@b.c".to_string(),
            password: Masked::from("hunter22"),
        };
        assert!(!format!("{:?}", req).contains("hunter22"));
        assert!(serde_json::to_string(&req).unwrap().contains("hunter22"));
    }
}
