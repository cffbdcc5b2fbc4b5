//! Application user accounts.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::id::UserAccountId;
use super::role::Role;

/// An application user account as listed by the backend.
///
/// The password is write-only and never part of this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    /// Backend-assigned ID, when the backend exposes one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<UserAccountId>,
    /// Login name.
    pub username: String,
    /// Permission level.
    pub role: Role,
}

impl UserAccount {
    /// The reference used to address this account in update/delete calls.
    ///
    /// Prefers the numeric ID and falls back to the username.
    #[must_use]
    pub fn reference(&self) -> UserRef {
        self.id.map_or_else(
            || UserRef::Username(self.username.clone()),
            UserRef::Id,
        )
    }
}

/// How an account is addressed on the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserRef {
    /// Numeric account ID.
    Id(UserAccountId),
    /// Login name, for backends without numeric IDs.
    Username(String),
}

/// Renders the backend path segment (not URL-encoded).
impl fmt::Display for UserRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Username(name) => f.write_str(name),
        }
    }
}

impl std::str::FromStr for UserRef {
    type Err = std::convert::Infallible;

    /// All-digit input is read as an ID, anything else as a username.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.parse::<i64>().map_or_else(
            |_| Self::Username(s.to_owned()),
            |id| Self::Id(UserAccountId::new(id)),
        ))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_account_from_backend_with_id() {
        let account: UserAccount =
            serde_json::from_value(json!({"id": 3, "username": "maria", "role": "user"}))
                .unwrap();
        assert_eq!(account.reference(), UserRef::Id(UserAccountId::new(3)));
    }

    #[test]
    fn test_account_without_id_uses_username() {
        let account: UserAccount =
            serde_json::from_value(json!({"username": "admin", "role": "admin"})).unwrap();
        assert_eq!(account.reference(), UserRef::Username("admin".to_string()));
        assert_eq!(account.reference().to_string(), "admin");
    }

    #[test]
    fn test_user_ref_from_str() {
        assert_eq!(
            "12".parse::<UserRef>().unwrap(),
            UserRef::Id(UserAccountId::new(12))
        );
        assert_eq!(
            "joao".parse::<UserRef>().unwrap(),
            UserRef::Username("joao".to_string())
        );
    }
}
