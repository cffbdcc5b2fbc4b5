//! Wire types for the backend API.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use roster_core::{CustomerRecord, RecordId, Role, Username};

/// Successful `POST /login` response.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    /// Role of the authenticated account.
    pub role: Role,
    /// Bearer token for subsequent calls.
    #[serde(default)]
    pub token: Option<String>,
}

/// A record as listed by the backend.
///
/// `id` is only present on backends that assign stable identifiers.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordRow {
    #[serde(default)]
    pub id: Option<RecordId>,
    #[serde(flatten)]
    pub record: CustomerRecord,
}

/// Fields for creating an application user account.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone)]
pub struct NewUserAccount {
    pub username: Username,
    pub password: SecretString,
    pub role: Role,
}

impl std::fmt::Debug for NewUserAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewUserAccount")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("role", &self.role)
            .finish()
    }
}

/// Password and/or role change for an existing account.
#[derive(Clone, Default)]
pub struct UserAccountPatch {
    pub password: Option<SecretString>,
    pub role: Option<Role>,
}

impl UserAccountPatch {
    /// Returns `true` if the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.password.is_none() && self.role.is_none()
    }
}

impl std::fmt::Debug for UserAccountPatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserAccountPatch")
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("role", &self.role)
            .finish()
    }
}

#[derive(Serialize)]
pub(crate) struct LoginBody<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Serialize)]
pub(crate) struct NewUserBody<'a> {
    pub username: &'a str,
    pub password: &'a str,
    pub role: Role,
}

impl<'a> From<&'a NewUserAccount> for NewUserBody<'a> {
    fn from(account: &'a NewUserAccount) -> Self {
        Self {
            username: account.username.as_str(),
            password: account.password.expose_secret(),
            role: account.role,
        }
    }
}

#[derive(Serialize)]
pub(crate) struct UserPatchBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

impl<'a> From<&'a UserAccountPatch> for UserPatchBody<'a> {
    fn from(patch: &'a UserAccountPatch) -> Self {
        Self {
            password: patch.password.as_ref().map(ExposeSecret::expose_secret),
            role: patch.role,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_row_with_and_without_id() {
        let with_id: RecordRow = serde_json::from_value(json!({
            "id": 9, "Nome Completo": "Ana", "CPF": "1", "Numero": "2"
        }))
        .unwrap();
        assert_eq!(with_id.id, Some(RecordId::new(9)));
        assert_eq!(with_id.record.full_name, "Ana");
        assert!(with_id.record.extra.is_empty());

        let without_id: RecordRow =
            serde_json::from_value(json!({"Nome Completo": "Bia"})).unwrap();
        assert_eq!(without_id.id, None);
        assert_eq!(without_id.record.full_name, "Bia");
    }

    #[test]
    fn test_new_user_debug_redacts_password() {
        let account = NewUserAccount {
            username: Username::parse("maria").unwrap(),
            password: SecretString::from("hunter2-super-secret"),
            role: Role::User,
        };

        let debug_output = format!("{account:?}");

        assert!(debug_output.contains("maria"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("hunter2-super-secret"));
    }

    #[test]
    fn test_user_patch_body_skips_absent_fields() {
        let patch = UserAccountPatch {
            role: Some(Role::Admin),
            ..UserAccountPatch::default()
        };
        let body = serde_json::to_value(UserPatchBody::from(&patch)).unwrap();
        assert_eq!(body, json!({"role": "admin"}));
    }
}
