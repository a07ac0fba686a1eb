// src/state.rs
use crate::{
    models::attendance::RosterEvent,
    services::{store::SqliteKvStore, tracker::Tracker},
};
use axum::extract::ws::Message;
use sqlx::SqlitePool;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::{broadcast, mpsc, Mutex};
use uuid::Uuid;

// Tipo para o 'sender' de uma conexão WebSocket individual
type WsTx = mpsc::Sender<Message>;

pub type SharedTracker = Arc<Mutex<Tracker<SqliteKvStore>>>;

/// Conexões WebSocket que recebem os eventos de mudança do roster.
#[derive(Debug, Clone, Default)]
pub struct LiveFeed {
    pub connections: Arc<Mutex<HashMap<Uuid, WsTx>>>,
}

impl LiveFeed {
    /// Envia uma mensagem para todas as conexões ativas.
    pub async fn broadcast(&self, message_text: String) {
        let connections = self.connections.lock().await;
        let message = Message::Text(message_text.into());
        for tx in connections.values() {
            // Cliente lento ou desligado: a mensagem perde-se, não é erro
            let _ = tx.try_send(message.clone());
        }
    }

    pub async fn connection_count(&self) -> usize {
        self.connections.lock().await.len()
    }

    /// Reencaminha os eventos do roster para os clientes ligados, até o
    /// canal de eventos fechar.
    pub fn spawn_forwarder(&self, mut events: broadcast::Receiver<RosterEvent>) {
        let feed = self.clone();
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => match serde_json::to_string(&event) {
                        Ok(text) => feed.broadcast(text).await,
                        Err(e) => tracing::error!("Erro ao serializar evento do roster: {:?}", e),
                    },
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!("Live feed atrasado, {} eventos perdidos", skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
            tracing::debug!("Forwarder de eventos terminado.");
        });
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub tracker: SharedTracker,
    pub live_feed: LiveFeed,
}

impl AppState {
    pub fn new(db_pool: SqlitePool, tracker: Tracker<SqliteKvStore>) -> Self {
        Self {
            db_pool,
            tracker: Arc::new(Mutex::new(tracker)),
            live_feed: LiveFeed::default(),
        }
    }
}

impl axum::extract::FromRef<AppState> for LiveFeed {
    fn from_ref(state: &AppState) -> LiveFeed {
        state.live_feed.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::Config, db, models::student::NewStudent};
    use axum::extract::FromRef;

    #[tokio::test]
    async fn cloned_state_shares_tracker_and_feed() {
        let config = Config::in_memory();
        let pool = db::create_db_pool(&config).await.unwrap();
        let tracker = Tracker::open(SqliteKvStore::new(pool.clone()), &config)
            .await
            .unwrap();
        let state = AppState::new(pool, tracker);
        let clone = state.clone();

        clone
            .tracker
            .lock()
            .await
            .add_student(NewStudent::new("Asha", "101"))
            .await
            .unwrap();
        assert_eq!(state.tracker.lock().await.students().len(), 1);

        let (tx, _rx) = mpsc::channel(1);
        clone.live_feed.connections.lock().await.insert(Uuid::new_v4(), tx);
        assert_eq!(LiveFeed::from_ref(&state).connection_count().await, 1);
    }

    #[tokio::test]
    async fn broadcast_reaches_every_connection() {
        let feed = LiveFeed::default();
        let (tx_a, mut rx_a) = mpsc::channel(4);
        let (tx_b, mut rx_b) = mpsc::channel(4);
        feed.connections.lock().await.insert(Uuid::new_v4(), tx_a);
        feed.connections.lock().await.insert(Uuid::new_v4(), tx_b);

        feed.broadcast("hello".to_string()).await;

        for rx in [&mut rx_a, &mut rx_b] {
            match rx.recv().await {
                Some(Message::Text(text)) => assert_eq!(text.as_str(), "hello"),
                other => panic!("unexpected message: {:?}", other),
            }
        }
        assert_eq!(feed.connection_count().await, 2);
    }

    #[tokio::test]
    async fn forwarder_serializes_roster_events() {
        let feed = LiveFeed::default();
        let (tx, mut rx) = mpsc::channel(4);
        feed.connections.lock().await.insert(Uuid::new_v4(), tx);

        let (events_tx, events_rx) = broadcast::channel(4);
        feed.spawn_forwarder(events_rx);
        events_tx
            .send(RosterEvent::StudentsImported { added: 2 })
            .unwrap();

        match rx.recv().await {
            Some(Message::Text(text)) => {
                let json: serde_json::Value = serde_json::from_str(text.as_str()).unwrap();
                assert_eq!(json["type"], "studentsImported");
                assert_eq!(json["added"], 2);
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }
}
