//! Generated roster types.
//!
//! These types mirror the backend's company, user and pay-cycle shapes
//! without depending on the backend crate.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role of a generated user.
///
/// Mirrors the backend's `UserRole`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleSeed {
    /// Company administrator.
    Admin,
    /// Team manager.
    Manager,
    /// Regular employee.
    #[default]
    Employee,
}

impl RoleSeed {
    /// Lowercase wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Manager => "manager",
            Self::Employee => "employee",
        }
    }
}

/// Pay cycle a generated user starts out assigned to.
///
/// Mirrors the backend's `PayCycle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayCycleSeed {
    /// Paid every week.
    Weekly,
    /// Paid every second week.
    Biweekly,
    /// Paid twice a month.
    Semimonthly,
    /// Paid once a month.
    Monthly,
}

impl PayCycleSeed {
    /// Every cycle, in dashboard tab order.
    pub const ALL: [Self; 4] = [Self::Weekly, Self::Biweekly, Self::Semimonthly, Self::Monthly];

    /// Lowercase wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Biweekly => "biweekly",
            Self::Semimonthly => "semimonthly",
            Self::Monthly => "monthly",
        }
    }
}

/// The company a roster belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExampleCompanySeed {
    /// Unique identifier for the company.
    pub id: Uuid,
    /// Display name shown in the company switcher.
    pub name: String,
}

/// A generated example user record.
///
/// # Example
///
/// ```
/// use example_data::{ExampleUserSeed, PayCycleSeed, RoleSeed};
/// use uuid::Uuid;
///
/// let user = ExampleUserSeed {
///     id: Uuid::new_v4(),
///     name: "Ada Lovelace".to_owned(),
///     email: "ada.lovelace@example.com".to_owned(),
///     role: RoleSeed::Manager,
///     department: Some("Engineering".to_owned()),
///     pay_cycle: Some(PayCycleSeed::Monthly),
/// };
///
/// assert_eq!(user.role.as_str(), "manager");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExampleUserSeed {
    /// Unique identifier for the user.
    pub id: Uuid,
    /// Full name.
    pub name: String,
    /// Unique email address within the roster.
    pub email: String,
    /// Role within the company.
    pub role: RoleSeed,
    /// Department label, when the registry defines departments.
    pub department: Option<String>,
    /// Initial pay-cycle bucket; `None` leaves the user unassigned.
    pub pay_cycle: Option<PayCycleSeed>,
}

/// A company and its generated employees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExampleRoster {
    /// The owning company.
    pub company: ExampleCompanySeed,
    /// Employees in generation order.
    pub users: Vec<ExampleUserSeed>,
}

impl ExampleRoster {
    /// Users starting in `pay_cycle`, in generation order.
    pub fn assigned_to(&self, pay_cycle: PayCycleSeed) -> impl Iterator<Item = &ExampleUserSeed> {
        self.users
            .iter()
            .filter(move |user| user.pay_cycle == Some(pay_cycle))
    }
}
