//! WebSocket handler for UI notification clients
//!
//! Streams reservation events as JSON text frames. A client only ever sees
//! events of its own business; platform admins see every business.
//! Browsers cannot set headers on the upgrade request, so the JWT may also
//! be passed as `?token=`.

use axum::{
    extract::{
        ws::{rejection::WebSocketUpgradeRejection, Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::select;
use tracing::{debug, error, info, warn};

use crate::application::events::{EventMessage, SharedEventBus};
use crate::domain::Actor;
use crate::infrastructure::crypto::jwt::JwtConfig;
use crate::interfaces::http::middleware::{auth_error_response, authenticate, AuthError};

/// Query parameters of the upgrade request
#[derive(Debug, Default, Deserialize)]
pub struct NotificationQuery {
    pub token: Option<String>,
    /// Comma-separated event types, e.g. `reservation_created,reservation_cancelled`
    pub event_types: Option<String>,
    /// Admins only: narrow the stream to one business
    pub business_id: Option<String>,
}

/// What a single connection receives
#[derive(Debug, Clone, PartialEq)]
pub struct EventFilter {
    /// `None` streams every business
    pub business_id: Option<String>,
    pub event_types: Option<Vec<String>>,
}

impl EventFilter {
    /// Non-admins are pinned to their own business whatever they ask for.
    pub fn for_actor(actor: &Actor, query: &NotificationQuery) -> Self {
        let business_id = if actor.is_admin() {
            query.business_id.clone()
        } else {
            Some(actor.business_id.clone().unwrap_or_default())
        };
        let event_types = query.event_types.as_ref().map(|types| {
            types
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        });
        Self {
            business_id,
            event_types,
        }
    }

    pub fn matches(&self, message: &EventMessage) -> bool {
        if let Some(ref business_id) = self.business_id {
            if message.event.business_id() != business_id {
                return false;
            }
        }
        if let Some(ref types) = self.event_types {
            let event_type = message.event.event_type();
            if !types.iter().any(|t| t == event_type) {
                return false;
            }
        }
        true
    }
}

/// State for notification WebSocket handler
#[derive(Clone)]
pub struct NotificationState {
    pub event_bus: SharedEventBus,
    pub jwt_config: JwtConfig,
}

/// `GET /api/v1/notifications/ws`
pub async fn ws_notifications_handler(
    State(state): State<NotificationState>,
    Query(query): Query<NotificationQuery>,
    headers: HeaderMap,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Response {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "));
    let Some(token) = query.token.as_deref().or(bearer) else {
        return auth_error_response(AuthError::MissingToken);
    };
    let user = match authenticate(token, &state.jwt_config) {
        Ok(user) => user,
        Err(e) => return auth_error_response(e),
    };

    let ws = match ws {
        Ok(ws) => ws,
        Err(rejection) => return rejection.into_response(),
    };

    let filter = EventFilter::for_actor(user.actor(), &query);
    info!(
        username = %user.actor().username,
        business_id = ?filter.business_id,
        event_types = ?filter.event_types,
        "New notification WebSocket connection"
    );

    ws.on_upgrade(move |socket| handle_notification_socket(socket, state, filter))
}

async fn handle_notification_socket(
    socket: WebSocket,
    state: NotificationState,
    filter: EventFilter,
) {
    let (mut sender, mut receiver) = socket.split();
    let mut subscriber = state.event_bus.subscribe();

    let welcome = serde_json::json!({
        "type": "connected",
        "message": "Connected to notification stream",
        "filter": {
            "business_id": filter.business_id,
            "event_types": filter.event_types,
        }
    });

    if let Err(e) = sender
        .send(Message::Text(welcome.to_string().into()))
        .await
    {
        error!("Failed to send welcome message: {}", e);
        return;
    }

    loop {
        select! {
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Ping(data))) => {
                        if let Err(e) = sender.send(Message::Pong(data)).await {
                            error!("Failed to send pong: {}", e);
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        warn!("WebSocket error: {}", e);
                        break;
                    }
                    Some(Ok(_)) => {}
                }
            }

            event = subscriber.recv() => {
                let Some(event_msg) = event else {
                    warn!("Event bus closed");
                    break;
                };
                if !filter.matches(&event_msg) {
                    continue;
                }

                match serde_json::to_string(&event_msg) {
                    Ok(json) => {
                        if let Err(e) = sender.send(Message::Text(json.into())).await {
                            error!("Failed to send event: {}", e);
                            break;
                        }
                        debug!(event_type = event_msg.event.event_type(), "Event sent to client");
                    }
                    Err(e) => error!("Failed to serialize event: {}", e),
                }
            }
        }
    }

    info!("Notification WebSocket client disconnected");
}
