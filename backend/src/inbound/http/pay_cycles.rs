//! Pay-cycle membership endpoints.
//!
//! ```text
//! GET /api/v1/companies/{companyId}/pay-cycles/{payCycle}/users
//! PUT /api/v1/companies/{companyId}/pay-cycles/{payCycle}/assignments {"userIds":["..."]}
//! ```

use actix_web::{get, put, web};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::{CompanyId, Error, PayCycle, ReconcileOutcome, User, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::companies::parse_company_id;
use crate::inbound::http::state::HttpState;

/// Desired membership for `PUT .../assignments`.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceAssignmentsRequest {
    pub user_ids: Vec<String>,
}

impl ReplaceAssignmentsRequest {
    fn into_user_ids(self) -> Result<Vec<UserId>, Error> {
        self.user_ids
            .into_iter()
            .enumerate()
            .map(|(index, raw)| {
                UserId::new(raw).map_err(|err| {
                    Error::invalid_request(err.to_string())
                        .with_details(json!({ "field": "userIds", "index": index }))
                })
            })
            .collect()
    }
}

fn parse_target(company: &str, pay_cycle: &str) -> Result<(CompanyId, PayCycle), Error> {
    let company_id = parse_company_id(company)?;
    let pay_cycle = pay_cycle.parse::<PayCycle>().map_err(|err| {
        Error::invalid_request(err.to_string()).with_details(json!({
            "field": "payCycle",
            "allowed": PayCycle::ALL.iter().map(PayCycle::as_str).collect::<Vec<_>>(),
        }))
    })?;
    Ok((company_id, pay_cycle))
}

/// Users currently assigned to a pay cycle.
#[get("/companies/{company_id}/pay-cycles/{pay_cycle}/users")]
pub async fn list_assigned_users(
    state: web::Data<HttpState>,
    path: web::Path<(String, String)>,
) -> ApiResult<web::Json<Vec<User>>> {
    let (company, pay_cycle) = path.into_inner();
    let (company_id, pay_cycle) = parse_target(&company, &pay_cycle)?;
    let users = state
        .pay_cycles
        .list_assigned_users(&company_id, pay_cycle)
        .await?;
    Ok(web::Json(users))
}

/// Replace the membership of a pay cycle with `userIds`.
///
/// Returns how many rows were inserted and deleted; a repeat of the same
/// request reports zero of each.
#[put("/companies/{company_id}/pay-cycles/{pay_cycle}/assignments")]
pub async fn replace_assignments(
    state: web::Data<HttpState>,
    path: web::Path<(String, String)>,
    payload: web::Json<ReplaceAssignmentsRequest>,
) -> ApiResult<web::Json<ReconcileOutcome>> {
    let (company, pay_cycle) = path.into_inner();
    let (company_id, pay_cycle) = parse_target(&company, &pay_cycle)?;
    let desired = payload.into_inner().into_user_ids()?;
    let outcome = state
        .pay_cycles
        .reconcile_assignments(&company_id, pay_cycle, &desired)
        .await?;
    Ok(web::Json(outcome))
}
