// src/services/store.rs
use crate::error::{AppError, AppResult};
use sqlx::SqlitePool;
use std::future::Future;

/// Armazenamento chave/valor durável. Cada chave guarda um documento
/// inteiro, sempre reescrito por completo.
pub trait PersistentStore: Send + Sync {
    fn read(&self, key: &str) -> impl Future<Output = AppResult<Option<String>>> + Send;
    fn write(&self, key: &str, value: &str) -> impl Future<Output = AppResult<()>> + Send;
}

/// Implementação sobre a tabela `kv_store` do SQLite.
#[derive(Debug, Clone)]
pub struct SqliteKvStore {
    db_pool: SqlitePool,
}

impl SqliteKvStore {
    pub fn new(db_pool: SqlitePool) -> Self {
        Self { db_pool }
    }
}

impl PersistentStore for SqliteKvStore {
    async fn read(&self, key: &str) -> AppResult<Option<String>> {
        tracing::debug!("Lendo chave '{}' do kv_store", key);
        sqlx::query_scalar::<_, String>("SELECT value FROM kv_store WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.db_pool)
            .await
            .map_err(|e| AppError::StorageUnavailable(e.to_string()))
    }

    async fn write(&self, key: &str, value: &str) -> AppResult<()> {
        tracing::debug!("Gravando chave '{}' ({} bytes)", key, value.len());
        // UPSERT: substitui sempre o documento inteiro
        sqlx::query(
            r#"
            INSERT INTO kv_store (key, value, updated_at)
            VALUES (?1, ?2, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
            ON CONFLICT(key) DO UPDATE SET
               value = excluded.value,
               updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.db_pool)
        .await
        .map_err(|e| AppError::StorageUnavailable(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
pub use memory::MemoryStore;


#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::Config, db};

    #[tokio::test]
    async fn sqlite_store_overwrites_whole_value() {
        let pool = db::create_db_pool(&Config::in_memory()).await.unwrap();
        let store = SqliteKvStore::new(pool);

        assert_eq!(store.read("roster").await.unwrap(), None);
        store.write("roster", "[1]").await.unwrap();
        store.write("roster", "[1,2]").await.unwrap();
        assert_eq!(store.read("roster").await.unwrap().as_deref(), Some("[1,2]"));
        assert_eq!(store.read("other").await.unwrap(), None);
    }

    #[tokio::test]
    async fn memory_store_can_fail_writes() {
        let store = MemoryStore::with_entry("k", "v");
        store.set_fail_writes(true);
        assert!(matches!(
            store.write("k", "w").await,
            Err(AppError::StorageUnavailable(_))
        ));
        assert_eq!(store.read("k").await.unwrap().as_deref(), Some("v"));
    }
}
