use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

use super::UnknownVariant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Player,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Player => "player",
            Role::Admin => "admin",
        }
    }
}

impl TryFrom<String> for Role {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "player" => Ok(Role::Player),
            "admin" => Ok(Role::Admin),
            _ => Err(UnknownVariant { kind: "role", value }),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub user_id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[sqlx(try_from = "String")]
    pub role: Role,
    pub date_registered: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role) -> User {
        User {
            user_id: 1,
            username: "player_one".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            role,
            date_registered: Utc::now(),
        }
    }

    #[test]
    fn test_role_try_from_db_string() {
        assert_eq!(Role::try_from("admin".to_string()).unwrap(), Role::Admin);
        assert_eq!(Role::try_from("player".to_string()).unwrap(), Role::Player);
        assert!(Role::try_from("root".to_string()).is_err());
    }

    #[test]
    fn test_is_admin() {
        assert!(user(Role::Admin).is_admin());
        assert!(!user(Role::Player).is_admin());
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let json = serde_json::to_string(&user(Role::Player)).unwrap();
        assert!(json.contains("player_one"));
        assert!(json.contains("\"role\":\"player\""));
        assert!(!json.contains("argon2"));
    }
}
