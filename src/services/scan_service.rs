// src/services/scan_service.rs
use crate::error::{AppError, AppResult};
use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

/// Filtra leituras repetidas do mesmo código dentro de uma janela de tempo.
/// A tabela vive só em memória (perde-se ao reiniciar).
#[derive(Debug)]
pub struct ScanDeduplicator {
    window: Duration,
    last_accepted: HashMap<String, Instant>,
}

impl ScanDeduplicator {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_accepted: HashMap::new(),
        }
    }

    /// `true` se a leitura deve seguir para a marcação. Uma leitura aceite
    /// regista `now`; uma rejeitada não mexe no estado.
    pub fn accept(&mut self, identifier: &str, now: Instant) -> bool {
        if let Some(last) = self.last_accepted.get(identifier) {
            if now.saturating_duration_since(*last) < self.window {
                tracing::trace!("Leitura repetida de '{}' ignorada", identifier);
                return false;
            }
        }
        self.last_accepted.insert(identifier.to_string(), now);
        true
    }
}

/// Estado do scanner de câmara (ligado/desligado).
#[derive(Debug)]
pub struct ScannerSession {
    enabled: bool,
    running: bool,
}

impl ScannerSession {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            running: false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Arranca o scanner (reinicia se já estava ligado).
    pub fn start(&mut self) -> AppResult<()> {
        if !self.enabled {
            tracing::warn!("Scanner desativado na configuração; arranque recusado.");
            return Err(AppError::DeviceUnavailable("scanner disabled".to_string()));
        }
        if self.running {
            tracing::debug!("Scanner já estava ligado, reiniciando.");
        }
        self.running = true;
        Ok(())
    }

    /// Pára o scanner. Seguro quando já está parado; devolve se estava ligado.
    pub fn stop(&mut self) -> bool {
        std::mem::replace(&mut self.running, false)
    }

    pub fn ensure_running(&self) -> AppResult<()> {
        if self.running {
            Ok(())
        } else {
            Err(AppError::DeviceUnavailable("scanner is not running".to_string()))
        }
    }
}
