//! Canal de notificaciones en tiempo real para los paneles abiertos.
//!
//! Difusión como mucho una vez por sesión conectada, sin persistencia ni
//! reenvío: una sesión que se conecta tarde vuelve a pedir el estado por REST.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::app_state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    OrderCreated,
    InventoryUpdated,
    CampaignCreated,
    ContentCreated,
    AiInsightCreated,
}

/// Mensaje enviado a cada sesión: `{"type": ..., "data": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardEvent {
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub data: Value,
}

#[derive(Clone)]
pub struct Notifier {
    tx: broadcast::Sender<DashboardEvent>,
}

impl Notifier {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DashboardEvent> {
        self.tx.subscribe()
    }

    /// Envía el evento sin esperar ni propagar errores.
    pub fn notify<T: Serialize>(&self, kind: EventKind, payload: &T) {
        let data = match serde_json::to_value(payload) {
            Ok(data) => data,
            Err(e) => {
                warn!("No se pudo serializar el evento {:?}: {}", kind, e);
                return;
            }
        };
        match self.tx.send(DashboardEvent { kind, data }) {
            Ok(receivers) => debug!("Evento {:?} enviado a {} sesiones", kind, receivers),
            Err(_) => debug!("Evento {:?} descartado: no hay sesiones conectadas", kind),
        }
    }
}

#[axum::debug_handler]
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let events = state.notifier.subscribe();
    ws.on_upgrade(move |socket| handle_socket(socket, events))
}

async fn handle_socket(socket: WebSocket, mut events: broadcast::Receiver<DashboardEvent>) {
    let (mut sender, mut receiver) = socket.split();
    info!("Sesión de panel conectada al canal de eventos.");

    let mut send_task = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => {
                    let text = match serde_json::to_string(&event) {
                        Ok(text) => text,
                        Err(e) => {
                            warn!("No se pudo serializar el evento: {}", e);
                            continue;
                        }
                    };
                    if sender.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!("La sesión perdió {n} eventos por ir retrasada");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    // Los mensajes entrantes sólo se leen para detectar el cierre.
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            if matches!(msg, Message::Close(_)) {
                break;
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }
    info!("Sesión de panel desconectada.");
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn every_subscriber_receives_the_event() {
        let notifier = Notifier::new(8);
        let mut first = notifier.subscribe();
        let mut second = notifier.subscribe();

        notifier.notify(EventKind::AiInsightCreated, &json!({ "title": "Trend Report" }));

        for rx in [&mut first, &mut second] {
            let event = rx.recv().await.unwrap();
            assert_eq!(event.kind, EventKind::AiInsightCreated);
            assert_eq!(event.data["title"], "Trend Report");
        }
    }

    #[test]
    fn notify_without_subscribers_is_silent() {
        let notifier = Notifier::new(8);
        notifier.notify(EventKind::ContentCreated, &json!({ "id": "1" }));
    }

    #[tokio::test]
    async fn late_subscribers_get_no_replay() {
        let notifier = Notifier::new(8);
        notifier.notify(EventKind::OrderCreated, &json!({ "id": 1 }));
        let mut late = notifier.subscribe();
        assert!(late.try_recv().is_err());
    }

    #[test]
    fn events_serialize_with_type_tag() {
        let event = DashboardEvent {
            kind: EventKind::InventoryUpdated,
            data: json!({ "sku": "ahi" }),
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "inventory_updated");
        assert_eq!(value["data"]["sku"], "ahi");
    }
}
