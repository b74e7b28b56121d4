//! WebSocket inbound adapter pushing assignment change notifications.
//!
//! Responsibilities:
//! - validate upgrade requests (origin allow-list)
//! - subscribe to the company's change feed for the connection's lifetime
//! - keep WebSocket framing and heartbeats at the edge of the system

use std::sync::Arc;

use actix_web::web::{self, Payload};
use actix_web::{
    HttpRequest, HttpResponse, get,
    http::header::{HeaderValue, ORIGIN},
};
use tokio::sync::mpsc;
use tracing::{debug, error, warn};
use url::Url;

use crate::domain::Error;
use crate::domain::ports::ChangeListener;
use crate::inbound::http::companies::parse_company_id;

mod session;

pub mod messages;
pub mod state;

/// Upgrade to a WebSocket streaming `assignmentsChanged` frames for one company.
#[get("/ws/companies/{company_id}/assignments")]
pub async fn ws_entry(
    state: web::Data<state::WsState>,
    path: web::Path<String>,
    req: HttpRequest,
    stream: Payload,
) -> actix_web::Result<HttpResponse> {
    let mut origin_iter = req.headers().get_all(ORIGIN);
    let origin_header = origin_iter.next().ok_or_else(|| {
        error!("Missing Origin header on WebSocket upgrade");
        actix_web::error::ErrorForbidden("Origin not allowed")
    })?;
    if origin_iter.next().is_some() {
        error!("Multiple Origin headers on WebSocket upgrade");
        return Err(actix_web::error::ErrorBadRequest("Invalid Origin header"));
    }
    validate_origin(origin_header, &state.allowed_host)?;

    let company_id = parse_company_id(&path)?;

    let (tx, rx) = mpsc::unbounded_channel();
    let listener: ChangeListener = Arc::new(move || {
        if tx.send(()).is_err() {
            debug!("WebSocket session gone; dropping change notification");
        }
    });
    let subscription = state
        .pay_cycles
        .subscribe_to_assignment_changes(&company_id, listener)
        .await
        .map_err(Error::from)?;

    let (response, ws_session, msg_stream) = actix_ws::handle(&req, stream).map_err(|error| {
        error!(error = %error, "WebSocket upgrade failed");
        actix_web::error::ErrorBadRequest("WebSocket upgrade failed")
    })?;

    let feed = session::AssignmentFeedSession::new(company_id, rx, subscription);
    actix_web::rt::spawn(feed.run(ws_session, msg_stream));
    Ok(response)
}

fn validate_origin(origin_header: &HeaderValue, allowed_host: &str) -> actix_web::Result<()> {
    let origin_value = match origin_header.to_str() {
        Ok(value) => value,
        Err(error) => {
            error!(error = %error, "Failed to parse Origin header as string");
            return Err(actix_web::error::ErrorBadRequest("Invalid Origin header"));
        }
    };

    let origin = Url::parse(origin_value).map_err(|error| {
        error!(error = %error, "Failed to parse Origin header as URL");
        actix_web::error::ErrorBadRequest("Invalid Origin header")
    })?;

    if is_allowed_origin(&origin, allowed_host) {
        Ok(())
    } else {
        warn!(
            origin = origin_value,
            "Rejected WS upgrade due to disallowed Origin"
        );
        Err(actix_web::error::ErrorForbidden("Origin not allowed"))
    }
}

const LOCALHOST: &str = "localhost";

/// HTTPS on `allowed_host` or any subdomain, or HTTP on localhost with an
/// explicit non-zero port.
fn is_allowed_origin(origin: &Url, allowed_host: &str) -> bool {
    let Some(host) = origin.host_str() else {
        return false;
    };
    let is_subdomain = host
        .strip_suffix(allowed_host)
        .is_some_and(|prefix| prefix.ends_with('.') && prefix.len() > 1);

    match origin.scheme() {
        "http" if host == LOCALHOST => matches!(origin.port(), Some(port) if port != 0),
        "https" => host == allowed_host || is_subdomain,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::{StatusCode, header};
    use actix_web::{App, test as actix_test};
    use rstest::{fixture, rstest};

    use crate::domain::PayCycleService;
    use crate::domain::ports::{ChangeFeedError, MockAssignmentChangeFeed};
    use crate::inbound::ws::state::WsState;
    use crate::outbound::memory::InMemoryPayCycleStore;
    use crate::outbound::realtime::ChangeBroadcaster;

    const HOST: &str = "timesheet.example";

    #[rstest]
    #[case("http://localhost:3000", true)]
    #[case("http://localhost:0", false)]
    #[case("http://localhost", false)]
    #[case("https://timesheet.example", true)]
    #[case("https://admin.timesheet.example", true)]
    #[case("https://timesheet.example.evil.com", false)]
    #[case("https://eviltimesheet.example", false)]
    #[case("wss://timesheet.example", false)]
    fn evaluates_allow_list(#[case] origin: &str, #[case] expected: bool) {
        let parsed = Url::parse(origin).expect("url should parse");
        assert_eq!(is_allowed_origin(&parsed, HOST), expected);
    }

    #[rstest]
    fn rejects_unparsable_origin_header() {
        let error = validate_origin(&HeaderValue::from_static("not a url"), HOST)
            .expect_err("origin should be rejected");
        assert_eq!(
            error.as_response_error().status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[rstest]
    fn rejects_non_utf8_origin_header() {
        let value = HeaderValue::from_bytes(&[0x80]).expect("opaque header value");
        let error = validate_origin(&value, HOST).expect_err("origin should be rejected");
        assert_eq!(
            error.as_response_error().status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[fixture]
    fn broadcaster_state() -> WsState {
        let broadcaster = ChangeBroadcaster::new();
        let store = InMemoryPayCycleStore::new().with_broadcaster(broadcaster.clone());
        WsState::new(PayCycleService::new(Arc::new(store), Arc::new(broadcaster)))
    }

    fn upgrade_request(origin: &str) -> actix_test::TestRequest {
        actix_test::TestRequest::get()
            .uri("/ws/companies/c1/assignments")
            .insert_header((header::ORIGIN, origin))
            .insert_header((header::UPGRADE, "websocket"))
            .insert_header((header::CONNECTION, "upgrade"))
            .insert_header((header::SEC_WEBSOCKET_VERSION, "13"))
            .insert_header((header::SEC_WEBSOCKET_KEY, "dGhlIHNhbXBsZSBub25jZQ=="))
    }

    async fn upgrade_status(state: WsState, request: actix_test::TestRequest) -> StatusCode {
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .service(ws_entry),
        )
        .await;
        actix_test::call_service(&app, request.to_request()).await.status()
    }

    #[rstest]
    #[actix_web::test]
    async fn upgrades_allowed_origin(broadcaster_state: WsState) {
        let status = upgrade_status(broadcaster_state, upgrade_request("http://localhost:3000")).await;
        assert_eq!(status, StatusCode::SWITCHING_PROTOCOLS);
    }

    #[rstest]
    #[actix_web::test]
    async fn refuses_foreign_origin(broadcaster_state: WsState) {
        let status = upgrade_status(broadcaster_state, upgrade_request("https://example.com")).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[rstest]
    #[actix_web::test]
    async fn missing_origin_is_forbidden(broadcaster_state: WsState) {
        let request = actix_test::TestRequest::get().uri("/ws/companies/c1/assignments");
        assert_eq!(
            upgrade_status(broadcaster_state, request).await,
            StatusCode::FORBIDDEN
        );
    }

    #[rstest]
    #[actix_web::test]
    async fn unavailable_feed_fails_the_upgrade() {
        let mut feed = MockAssignmentChangeFeed::new();
        feed.expect_subscribe()
            .times(1)
            .return_once(|_, _| Err(ChangeFeedError::unavailable("bus offline")));
        let state = WsState::new(PayCycleService::new(
            Arc::new(InMemoryPayCycleStore::new()),
            Arc::new(feed),
        ));

        let status = upgrade_status(state, upgrade_request("http://localhost:3000")).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }
}
