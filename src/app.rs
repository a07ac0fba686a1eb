// src/app.rs
use crate::{
    config::Config,
    db,
    error::AppResult,
    services::{store::SqliteKvStore, tracker::Tracker},
    state::AppState,
    web,
};
use axum::Router;
use time::Duration;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::SqliteStore;

/// Liga à base de dados, carrega o roster e prepara o estado partilhado.
pub async fn build_state(config: Config) -> AppResult<AppState> {
    let db_pool = db::create_db_pool(&config).await?;
    let tracker = Tracker::open(SqliteKvStore::new(db_pool.clone()), &config).await?;

    let events = tracker.subscribe();
    let state = AppState::new(db_pool, tracker);
    // Eventos do roster -> clientes WebSocket
    state.live_feed.spawn_forwarder(events);
    Ok(state)
}

/// Cria o store de sessões (tabela própria no mesmo SQLite).
pub async fn session_store(state: &AppState) -> AppResult<SqliteStore> {
    let store = SqliteStore::new(state.db_pool.clone())
        .with_table_name("sessions")
        .map_err(|e| crate::error::AppError::SessionError(format!("Falha ao criar session store: {}", e)))?;
    store.migrate().await?;
    Ok(store)
}

/// Router completo com sessões (histórico de navegação) e tracing HTTP.
pub async fn build_app(state: AppState) -> AppResult<Router> {
    let store = session_store(&state).await?;
    let session_layer = SessionManagerLayer::new(store)
        .with_secure(false)
        .with_http_only(true)
        .with_expiry(Expiry::OnInactivity(Duration::days(1)));
    tracing::info!("🔑 Camada de sessão configurada.");

    Ok(web::routes::create_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(session_layer),
    ))
}
