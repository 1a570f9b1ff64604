use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

use crate::auth::Principal;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// Stored user. `password_hash` never leaves the service; use [`UserOutput`].
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub user_name: String,
    pub email: String,
    pub role: Role,
    pub password_hash: String,
}

impl User {
    pub fn output(&self) -> UserOutput {
        UserOutput {
            id: self.id,
            user_name: self.user_name.clone(),
            email: self.email.clone(),
        }
    }

    pub fn principal(&self) -> Principal {
        Principal {
            id: self.id,
            role: self.role,
        }
    }
}

/// Public user shape
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserOutput {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub user_name: String,
    pub email: String,
}

/// Registration body
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub user_name: String,
    pub email: String,
    pub password: String,
}

/// Update body for the current user. Role is not accepted here.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserUpdate {
    pub user_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Insert payload handed to the store, password already hashed.
#[derive(Debug, Clone)]
pub struct NewUserRecord {
    pub user_name: String,
    pub email: String,
    pub role: Role,
    pub password_hash: String,
}

/// Partial update handed to the store; `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub user_name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub role: Option<Role>,
}

impl UserChanges {
    pub fn is_empty(&self) -> bool {
        self.user_name.is_none()
            && self.email.is_none()
            && self.password_hash.is_none()
            && self.role.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_text() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!(Role::User.to_string(), "user");
        assert!("root".parse::<Role>().is_err());
    }

    #[test]
    fn output_hides_password_and_role() {
        let user = User {
            id: Uuid::new_v4(),
            user_name: "tester".into(),
            email: "tester@example.com".into(),
            role: Role::Admin,
            password_hash: "secret".into(),
        };
        let value = serde_json::to_value(user.output()).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj.len(), 3);
        assert!(obj.contains_key("_id"));
        assert!(!obj.contains_key("password"));
        assert!(!obj.contains_key("role"));
    }
}
