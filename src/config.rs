// src/config.rs
use std::{env, net::SocketAddr, str::FromStr, time::Duration};

/// Chave fixa onde o roster serializado é guardado.
pub const DEFAULT_STORAGE_KEY: &str = "nexgen_students_v1";
pub const DEFAULT_DEDUP_WINDOW_MS: u64 = 3000;
pub const DEFAULT_ABSENT_STREAK_THRESHOLD: u32 = 3;

/// Configuração da aplicação, lida do ambiente (e do `.env`, via dotenvy).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub db_max_connections: u32,
    pub bind_addr: SocketAddr,
    pub storage_key: String,
    pub dedup_window: Duration,
    pub absent_streak_threshold: u32,
    pub scanner_enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite://rollcall.db".to_string(),
            db_max_connections: 5,
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            dedup_window: Duration::from_millis(DEFAULT_DEDUP_WINDOW_MS),
            absent_streak_threshold: DEFAULT_ABSENT_STREAK_THRESHOLD,
            scanner_enabled: true,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok(); // Carrega .env se existir
        let defaults = Config::default();

        Self {
            database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            db_max_connections: parse_var("DB_MAX_CONNECTIONS", defaults.db_max_connections),
            bind_addr: parse_var("BIND_ADDR", defaults.bind_addr),
            storage_key: env::var("STORAGE_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty())
                .unwrap_or(defaults.storage_key),
            dedup_window: Duration::from_millis(parse_var(
                "DEDUP_WINDOW_MS",
                DEFAULT_DEDUP_WINDOW_MS,
            )),
            absent_streak_threshold: parse_var(
                "ABSENT_STREAK_THRESHOLD",
                defaults.absent_streak_threshold,
            ),
            scanner_enabled: parse_var("SCANNER_ENABLED", defaults.scanner_enabled),
        }
    }

    /// Configuração para testes: SQLite em memória com uma única conexão
    /// (cada conexão a `sqlite::memory:` abre uma base de dados diferente).
    pub fn in_memory() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            db_max_connections: 1,
            ..Config::default()
        }
    }
}

// Lê uma variável e faz parse; valores inválidos caem no default com aviso
fn parse_var<T>(name: &str, default: T) -> T
where
    T: FromStr + std::fmt::Debug,
{
    match env::var(name) {
        Ok(raw) => match raw.trim().parse::<T>() {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!(
                    "⚠️ Valor inválido para {}: '{}'. Usando default {:?}.",
                    name,
                    raw,
                    default
                );
                default
            }
        },
        Err(_) => default,
    }
}
