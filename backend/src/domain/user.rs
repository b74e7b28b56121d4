//! User data model.
//!
//! Users are owned by the backing store and are read-only from the
//! perspective of the pay-cycle manager. Rows arrive as loosely shaped records
//! and are decoded explicitly through [`UserRecord`], failing on missing
//! required fields instead of carrying empty values forward.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::company::CompanyId;

/// Validation errors returned when decoding user records.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    #[error("user id must not be empty")]
    EmptyId,
    #[error("user id must not contain surrounding whitespace")]
    InvalidId,
    #[error("user name must not be empty")]
    EmptyName,
    #[error("user email must not be empty")]
    EmptyEmail,
    #[error("unknown user role: {value}")]
    UnknownRole { value: String },
    #[error("user record is missing required field `{field}`")]
    MissingField { field: &'static str },
}

/// Stable user identifier.
///
/// Identifiers are opaque strings: UUIDs for database rows and short keys
/// for the fallback roster.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Validate and construct a [`UserId`].
    ///
    /// # Examples
    /// ```
    /// use backend::domain::UserId;
    ///
    /// assert!(UserId::new("u-1").is_ok());
    /// assert!(UserId::new("").is_err());
    /// ```
    pub fn new(id: impl Into<String>) -> Result<Self, UserValidationError> {
        Self::from_owned(id.into())
    }

    fn from_owned(id: String) -> Result<Self, UserValidationError> {
        if id.is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        if id.trim() != id {
            return Err(UserValidationError::InvalidId);
        }
        Ok(Self(id))
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0
    }
}

impl From<uuid::Uuid> for UserId {
    fn from(value: uuid::Uuid) -> Self {
        Self(value.to_string())
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Role a user holds inside their company.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Manager,
    #[default]
    Employee,
}

impl UserRole {
    /// Lowercase storage representation.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Manager => "manager",
            Self::Employee => "employee",
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = UserValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "admin" => Ok(Self::Admin),
            "manager" => Ok(Self::Manager),
            "employee" => Ok(Self::Employee),
            other => Err(UserValidationError::UnknownRole {
                value: other.to_owned(),
            }),
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Company employee as seen by the pay-cycle manager.
///
/// ## Invariants
/// - `name` and `email` are non-empty once trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(try_from = "UserRecord", into = "UserRecord")]
pub struct User {
    id: UserId,
    name: String,
    email: String,
    role: UserRole,
    department: Option<String>,
    manager_id: Option<UserId>,
    company_id: Option<CompanyId>,
}

impl User {
    /// Build a user with the required fields; optional fields start empty.
    pub fn try_new(
        id: UserId,
        name: impl Into<String>,
        email: impl Into<String>,
        role: UserRole,
    ) -> Result<Self, UserValidationError> {
        let name = name.into();
        let email = email.into();
        if name.trim().is_empty() {
            return Err(UserValidationError::EmptyName);
        }
        if email.trim().is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        Ok(Self {
            id,
            name,
            email,
            role,
            department: None,
            manager_id: None,
            company_id: None,
        })
    }

    /// Attach the owning company.
    pub fn with_company(mut self, company_id: CompanyId) -> Self {
        self.company_id = Some(company_id);
        self
    }

    /// Attach a department label.
    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }

    /// Attach the reporting manager.
    pub fn with_manager(mut self, manager_id: UserId) -> Self {
        self.manager_id = Some(manager_id);
        self
    }

    pub fn id(&self) -> &UserId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn role(&self) -> UserRole {
        self.role
    }

    pub fn department(&self) -> Option<&str> {
        self.department.as_deref()
    }

    pub fn manager_id(&self) -> Option<&UserId> {
        self.manager_id.as_ref()
    }

    pub fn company_id(&self) -> Option<&CompanyId> {
        self.company_id.as_ref()
    }

    /// Avatar initials: first letter of up to two name words, upper-cased.
    ///
    /// # Examples
    /// ```
    /// use backend::domain::{User, UserId, UserRole};
    ///
    /// let user = User::try_new(
    ///     UserId::new("1").expect("id"),
    ///     "Alice Johnson",
    ///     "alice@example.com",
    ///     UserRole::Employee,
    /// )
    /// .expect("user");
    /// assert_eq!(user.initials(), "AJ");
    /// ```
    pub fn initials(&self) -> String {
        self.name
            .split_whitespace()
            .filter_map(|part| part.chars().next())
            .take(2)
            .flat_map(char::to_uppercase)
            .collect()
    }

    /// Case-insensitive substring match over name and email.
    ///
    /// `needle` is expected to be trimmed and lower-cased already.
    pub(crate) fn matches_search(&self, needle: &str) -> bool {
        needle.is_empty()
            || self.name.to_lowercase().contains(needle)
            || self.email.to_lowercase().contains(needle)
    }
}

/// Wire and row shape for users.
///
/// Optional fields may be absent or `null`; required fields must be present.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, alias = "manager_id", skip_serializing_if = "Option::is_none")]
    pub manager_id: Option<String>,
    #[serde(default, alias = "company_id", skip_serializing_if = "Option::is_none")]
    pub company_id: Option<String>,
}

impl TryFrom<UserRecord> for User {
    type Error = UserValidationError;

    fn try_from(record: UserRecord) -> Result<Self, Self::Error> {
        let UserRecord {
            id,
            name,
            email,
            role,
            department,
            manager_id,
            company_id,
        } = record;

        let id = UserId::new(id.ok_or(UserValidationError::MissingField { field: "id" })?)?;
        let name = name.ok_or(UserValidationError::MissingField { field: "name" })?;
        let email = email.ok_or(UserValidationError::MissingField { field: "email" })?;
        let role = role
            .ok_or(UserValidationError::MissingField { field: "role" })?
            .parse::<UserRole>()?;

        let mut user = User::try_new(id, name, email, role)?;
        user.department = department;
        user.manager_id = manager_id.map(UserId::new).transpose()?;
        user.company_id = company_id.map(CompanyId::from);
        Ok(user)
    }
}

impl From<User> for UserRecord {
    fn from(user: User) -> Self {
        Self {
            id: Some(user.id.into()),
            name: Some(user.name),
            email: Some(user.email),
            role: Some(user.role.as_str().to_owned()),
            department: user.department,
            manager_id: user.manager_id.map(String::from),
            company_id: user.company_id.map(String::from),
        }
    }
}
