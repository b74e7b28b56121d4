//! Per-connection assignment change push loop.
//!
//! Forwards company-scoped change notifications to the client as
//! `assignmentsChanged` frames. The connection pings every 5s and is
//! considered idle after 10s without client traffic; tests shorten both.
//! The change subscription lives as long as the loop and is released when
//! it ends.

use std::time::{Duration, Instant};

use actix_ws::{CloseCode, CloseReason, Closed, Message, MessageStream, ProtocolError, Session};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time;
use tracing::{debug, warn};

use crate::domain::CompanyId;
use crate::domain::ports::Subscription;
use crate::inbound::ws::messages::ServerMessage;

#[cfg(not(test))]
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);
#[cfg(test)]
const HEARTBEAT_INTERVAL: Duration = Duration::from_millis(50);

#[cfg(not(test))]
const CLIENT_TIMEOUT: Duration = Duration::from_secs(10);
#[cfg(test)]
const CLIENT_TIMEOUT: Duration = Duration::from_millis(100);

enum CloseAction {
    None,
    Close(Option<CloseReason>),
}

enum SessionError {
    ClientClosed(Option<CloseReason>),
    StreamClosed,
    FeedClosed,
    HeartbeatTimeout,
    Protocol(ProtocolError),
    Network(Closed),
}

pub(super) struct AssignmentFeedSession {
    company_id: CompanyId,
    notifications: UnboundedReceiver<()>,
    subscription: Subscription,
}

impl AssignmentFeedSession {
    pub(super) fn new(
        company_id: CompanyId,
        notifications: UnboundedReceiver<()>,
        subscription: Subscription,
    ) -> Self {
        Self {
            company_id,
            notifications,
            subscription,
        }
    }

    pub(super) async fn run(mut self, mut session: Session, mut stream: MessageStream) {
        let mut last_heartbeat = Instant::now();
        let mut heartbeat = time::interval(HEARTBEAT_INTERVAL);

        loop {
            let result = tokio::select! {
                _ = heartbeat.tick() => {
                    handle_heartbeat_tick(&mut session, &last_heartbeat).await
                }
                message = stream.recv() => {
                    handle_stream_message(&mut session, &mut last_heartbeat, message).await
                }
                notice = self.notifications.recv() => {
                    self.handle_notification(&mut session, notice).await
                }
            };

            if let Err(error) = result {
                self.subscription.unsubscribe();
                log_shutdown_reason(&self.company_id, &error);
                close_session(session, close_action_for(error)).await;
                return;
            }
        }
    }

    async fn handle_notification(
        &mut self,
        session: &mut Session,
        notice: Option<()>,
    ) -> Result<(), SessionError> {
        if notice.is_none() {
            return Err(SessionError::FeedClosed);
        }
        while self.notifications.try_recv().is_ok() {}

        let payload = ServerMessage::assignments_changed(self.company_id.clone());
        match serde_json::to_string(&payload) {
            Ok(body) => session.text(body).await.map_err(SessionError::Network),
            Err(error) => {
                warn!(error = %error, "failed to serialise WebSocket payload");
                Ok(())
            }
        }
    }
}

async fn handle_heartbeat_tick(
    session: &mut Session,
    last_heartbeat: &Instant,
) -> Result<(), SessionError> {
    if Instant::now().duration_since(*last_heartbeat) > CLIENT_TIMEOUT {
        return Err(SessionError::HeartbeatTimeout);
    }
    session.ping(b"").await.map_err(SessionError::Network)
}

async fn handle_stream_message(
    session: &mut Session,
    last_heartbeat: &mut Instant,
    message: Option<Result<Message, ProtocolError>>,
) -> Result<(), SessionError> {
    let Some(message) = message else {
        return Err(SessionError::StreamClosed);
    };
    match message.map_err(SessionError::Protocol)? {
        Message::Ping(payload) => {
            *last_heartbeat = Instant::now();
            session.pong(&payload).await.map_err(SessionError::Network)
        }
        Message::Close(reason) => Err(SessionError::ClientClosed(reason)),
        Message::Text(_)
        | Message::Pong(_)
        | Message::Binary(_)
        | Message::Continuation(_)
        | Message::Nop => {
            *last_heartbeat = Instant::now();
            Ok(())
        }
    }
}

fn log_shutdown_reason(company_id: &CompanyId, error: &SessionError) {
    match error {
        SessionError::HeartbeatTimeout => {
            warn!(company_id = %company_id, "WebSocket heartbeat timeout; closing connection");
        }
        SessionError::Protocol(error) => {
            warn!(company_id = %company_id, error = %error, "WebSocket protocol error");
        }
        SessionError::Network(error) => {
            warn!(company_id = %company_id, error = %error, "WebSocket send failed");
        }
        SessionError::FeedClosed => {
            warn!(company_id = %company_id, "assignment change feed closed");
        }
        SessionError::ClientClosed(_) | SessionError::StreamClosed => {
            debug!(company_id = %company_id, "WebSocket client disconnected");
        }
    }
}

fn close_action_for(error: SessionError) -> CloseAction {
    let reason = |code, description: &str| {
        CloseAction::Close(Some(CloseReason {
            code,
            description: Some(description.to_owned()),
        }))
    };
    match error {
        SessionError::HeartbeatTimeout => reason(CloseCode::Normal, "heartbeat timeout"),
        SessionError::Protocol(_) => reason(CloseCode::Protocol, "protocol error"),
        SessionError::FeedClosed => reason(CloseCode::Away, "change feed closed"),
        SessionError::ClientClosed(reason) => CloseAction::Close(reason),
        SessionError::StreamClosed | SessionError::Network(_) => CloseAction::None,
    }
}

async fn close_session(session: Session, action: CloseAction) {
    if let CloseAction::Close(reason) = action {
        if let Err(error) = session.close(reason).await {
            warn!(error = %error, "failed to close WebSocket session");
        }
    }
}
