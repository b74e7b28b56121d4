//! Company-level read endpoints.
//!
//! ```text
//! GET /api/v1/companies
//! GET /api/v1/companies/{companyId}/users
//! GET /api/v1/companies/{companyId}/assignments
//! ```

use actix_web::{get, web};
use serde_json::json;

use crate::domain::{Assignment, Company, CompanyId, Error, User};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Parse a `{companyId}` path segment.
pub(crate) fn parse_company_id(raw: &str) -> Result<CompanyId, Error> {
    CompanyId::parse(raw).ok_or_else(|| {
        Error::invalid_request("company id must not be empty")
            .with_details(json!({ "field": "companyId", "code": "empty_company_id" }))
    })
}

/// List every company ordered by name.
#[get("/companies")]
pub async fn list_companies(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<Company>>> {
    let companies = state.pay_cycles.list_companies().await?;
    Ok(web::Json(companies))
}

/// List the full roster of a company ordered by name.
#[get("/companies/{company_id}/users")]
pub async fn list_company_users(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<User>>> {
    let company_id = parse_company_id(&path)?;
    let users = state.pay_cycles.list_company_users(&company_id).await?;
    Ok(web::Json(users))
}

/// List every assignment row of a company across pay cycles.
#[get("/companies/{company_id}/assignments")]
pub async fn list_company_assignments(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<Assignment>>> {
    let company_id = parse_company_id(&path)?;
    let assignments = state.pay_cycles.list_company_assignments(&company_id).await?;
    Ok(web::Json(assignments))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};
    use rstest::{fixture, rstest};
    use serde_json::Value;

    use crate::domain::{PayCycle, UserId, UserRole};
    use crate::outbound::memory::InMemoryPayCycleStore;
    use crate::outbound::realtime::ChangeBroadcaster;

    #[fixture]
    fn store() -> InMemoryPayCycleStore {
        let store = InMemoryPayCycleStore::new();
        store.add_company(Company::new(CompanyId::from("c2"), "Globex"));
        store.add_company(Company::new(CompanyId::from("c1"), "Acme"));
        for (id, name) in [("u2", "Bob Smith"), ("u1", "Alice Johnson")] {
            let user = User::try_new(
                UserId::new(id).expect("id"),
                name,
                format!("{id}@example.com"),
                UserRole::Employee,
            )
            .expect("user")
            .with_company(CompanyId::from("c1"));
            store.add_user(user);
        }
        store.assign(
            UserId::new("u1").expect("id"),
            CompanyId::from("c1"),
            PayCycle::Weekly,
        );
        store
    }

    fn state_for(store: &InMemoryPayCycleStore) -> web::Data<HttpState> {
        web::Data::new(HttpState::from_ports(
            Arc::new(store.clone()),
            Arc::new(ChangeBroadcaster::new()),
            Arc::new(store.clone()),
        ))
    }

    async fn get_json(store: &InMemoryPayCycleStore, uri: &str) -> (StatusCode, Value) {
        let app = actix_test::init_service(
            App::new()
                .app_data(state_for(store))
                .service(
                    web::scope("/api/v1")
                        .service(list_companies)
                        .service(list_company_users)
                        .service(list_company_assignments),
                ),
        )
        .await;
        let res = actix_test::call_service(&app, actix_test::TestRequest::get().uri(uri).to_request()).await;
        let status = res.status();
        let body = actix_test::read_body_json(res).await;
        (status, body)
    }

    #[rstest]
    #[actix_web::test]
    async fn companies_are_listed_by_name(store: InMemoryPayCycleStore) {
        let (status, body) = get_json(&store, "/api/v1/companies").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["name"], "Acme");
        assert_eq!(body[0]["isActive"], true);
        assert_eq!(body[1]["name"], "Globex");
    }

    #[rstest]
    #[actix_web::test]
    async fn company_users_use_camel_case(store: InMemoryPayCycleStore) {
        let (status, body) = get_json(&store, "/api/v1/companies/c1/users").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["name"], "Alice Johnson");
        assert_eq!(body[0]["companyId"], "c1");
        assert_eq!(body[1]["name"], "Bob Smith");
    }

    #[rstest]
    #[actix_web::test]
    async fn company_assignments_include_pay_cycle(store: InMemoryPayCycleStore) {
        let (status, body) = get_json(&store, "/api/v1/companies/c1/assignments").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["userId"], "u1");
        assert_eq!(body[0]["payCycle"], "weekly");
    }

    #[rstest]
    #[actix_web::test]
    async fn offline_store_maps_to_service_unavailable(store: InMemoryPayCycleStore) {
        store.set_offline(true);
        let (status, body) = get_json(&store, "/api/v1/companies/c1/users").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["code"], "service_unavailable");
        assert_eq!(body["details"]["operation"], "list_company_users");
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn blank_company_ids_are_rejected(#[case] raw: &str) {
        let err = parse_company_id(raw).expect_err("blank id");
        assert_eq!(err.code(), crate::domain::ErrorCode::InvalidRequest);
    }
}
