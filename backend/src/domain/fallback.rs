//! Sample roster shown when the initial load cannot reach the store.

use crate::domain::{Error, User, UserId, UserRole};

const SAMPLE_USERS: [(&str, &str, &str); 5] = [
    ("1", "Alice Johnson", "alice@example.com"),
    ("2", "Bob Smith", "bob@example.com"),
    ("3", "Charlie Davis", "charlie@example.com"),
    ("4", "Diana Roberts", "diana@example.com"),
    ("5", "Ethan Brown", "ethan@example.com"),
];

/// Number of sample users pre-assigned in the fallback dataset.
pub const FALLBACK_ASSIGNED_COUNT: usize = 2;

/// Roster and assigned set substituted for a failed initial load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackRoster {
    pub roster: Vec<User>,
    pub assigned: Vec<User>,
}

/// Build the deterministic five-user sample dataset.
///
/// The values are compile-time constants; a validation failure signals a
/// programming error and is surfaced as an internal error.
pub fn fallback_roster() -> Result<FallbackRoster, Error> {
    let roster = SAMPLE_USERS
        .iter()
        .map(|(id, name, email)| {
            let user_id = UserId::new(*id)
                .map_err(|err| Error::internal(format!("invalid sample user id: {err}")))?;
            User::try_new(user_id, *name, *email, UserRole::Employee)
                .map_err(|err| Error::internal(format!("invalid sample user: {err}")))
        })
        .collect::<Result<Vec<_>, _>>()?;
    let assigned = roster.iter().take(FALLBACK_ASSIGNED_COUNT).cloned().collect();
    Ok(FallbackRoster { roster, assigned })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn fallback_has_five_users_with_first_two_assigned() {
        let fallback = fallback_roster().expect("sample data is valid");
        let names: Vec<&str> = fallback.roster.iter().map(User::name).collect();
        assert_eq!(
            names,
            [
                "Alice Johnson",
                "Bob Smith",
                "Charlie Davis",
                "Diana Roberts",
                "Ethan Brown"
            ]
        );
        let assigned: Vec<&str> = fallback.assigned.iter().map(|u| u.id().as_ref()).collect();
        assert_eq!(assigned, ["1", "2"]);
    }
}
