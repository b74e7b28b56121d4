//! Wire-level payloads pushed to WebSocket clients.

use serde::Serialize;

use crate::domain::CompanyId;

/// Server push telling the client to re-fetch a company's assignments.
///
/// Serialises as `{"type":"assignmentsChanged","companyId":"..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    #[serde(rename_all = "camelCase")]
    AssignmentsChanged { company_id: CompanyId },
}

impl ServerMessage {
    pub fn assignments_changed(company_id: CompanyId) -> Self {
        Self::AssignmentsChanged { company_id }
    }
}
