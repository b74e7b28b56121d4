//! Pay-cycle keys.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Recurring payroll period used to bucket a company's users.
///
/// Treated as an opaque key: a pay cycle has no lifecycle of its own beyond
/// the assignment rows that reference it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayCycle {
    Weekly,
    Biweekly,
    Semimonthly,
    Monthly,
}

impl PayCycle {
    /// Every known pay cycle, shortest period first.
    pub const ALL: [Self; 4] = [Self::Weekly, Self::Biweekly, Self::Semimonthly, Self::Monthly];

    /// Storage representation.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Biweekly => "biweekly",
            Self::Semimonthly => "semimonthly",
            Self::Monthly => "monthly",
        }
    }
}

impl fmt::Display for PayCycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a pay-cycle string does not name a known cycle.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown pay cycle: {value}")]
pub struct UnknownPayCycle {
    pub value: String,
}

impl FromStr for PayCycle {
    type Err = UnknownPayCycle;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalised = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|cycle| cycle.as_str() == normalised)
            .ok_or_else(|| UnknownPayCycle {
                value: value.to_owned(),
            })
    }
}
