// src/web/live_handlers.rs
use crate::state::LiveFeed;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use uuid::Uuid;

/// GET /live - upgrade para WebSocket. O cliente só recebe: cada evento do
/// roster chega como JSON.
pub async fn live_websocket_handler(
    ws: WebSocketUpgrade,
    State(feed): State<LiveFeed>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, feed))
}

async fn handle_socket(socket: WebSocket, feed: LiveFeed) {
    let conn_id = Uuid::new_v4();
    tracing::info!("🔌 Nova conexão ao live feed: {}", conn_id);

    let (mut ws_sender, mut ws_receiver) = socket.split();

    // O feed escreve em 'tx'; a task abaixo passa as mensagens para o socket
    let (tx, mut rx) = mpsc::channel::<Message>(32);
    feed.connections.lock().await.insert(conn_id, tx);

    // --- Task 1: canal MPSC -> cliente ---
    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if ws_sender.send(msg).await.is_err() {
                tracing::warn!("Falha ao enviar para {}, terminando send_task.", conn_id);
                break;
            }
        }
    });

    // --- Task 2: só escuta o Close do cliente ---
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = ws_receiver.next().await {
            match msg {
                Message::Close(_) => {
                    tracing::debug!("Cliente {} enviou Close frame.", conn_id);
                    break;
                }
                _ => tracing::trace!("Ignorando mensagem do cliente {}", conn_id),
            }
        }
    });

    // Quando uma termina, aborta a outra
    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    feed.connections.lock().await.remove(&conn_id);
    tracing::info!("🔌 Conexão {} ao live feed fechada.", conn_id);
}
