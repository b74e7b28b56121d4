//! Server construction and middleware wiring.

mod config;
mod settings;
mod state_builders;

pub use config::ServerConfig;
pub use settings::ServerSettings;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

use backend::inbound::http::companies::{list_companies, list_company_assignments, list_company_users};
use backend::inbound::http::health::{HealthState, live, ready};
use backend::inbound::http::pay_cycles::{list_assigned_users, replace_assignments};
use backend::inbound::http::request_trace::RequestTrace;
use backend::inbound::http::state::HttpState;
use backend::inbound::ws;
use backend::inbound::ws::state::WsState;

use state_builders::build_pay_cycle_service;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    ws_state: web::Data<WsState>,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        ws_state,
    } = deps;

    let api = web::scope("/api/v1")
        .service(list_companies)
        .service(list_company_users)
        .service(list_company_assignments)
        .service(list_assigned_users)
        .service(replace_assignments);

    App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(ws_state)
        .wrap(RequestTrace)
        .service(api)
        .service(ws::ws_entry)
        .service(ready)
        .service(live)
}

/// Construct the Actix HTTP server.
///
/// Readiness flips to true once the listener is bound.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let service = build_pay_cycle_service(&config.backend);
    let http_state = web::Data::new(HttpState::new(service.clone()));
    let ws_state =
        web::Data::new(WsState::new(service).with_allowed_host(config.allowed_origin_host));
    let server_health_state = health_state.clone();

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            ws_state: ws_state.clone(),
        })
    })
    .bind(config.bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
