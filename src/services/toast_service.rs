// src/services/toast_service.rs
use serde::Serialize;
use std::{
    collections::VecDeque,
    time::{Duration, Instant},
};

/// Tempo de vida de um toast no ecrã.
pub const TOAST_TTL: Duration = Duration::from_millis(4200);
const MAX_TOASTS: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
    pub id: u64,
    pub message: String,
}

/// Fila transitória de mensagens. Não é persistida nem registada.
#[derive(Debug, Default)]
pub struct ToastQueue {
    next_id: u64,
    items: VecDeque<(Toast, Instant)>,
}

impl ToastQueue {
    pub fn push(&mut self, message: impl Into<String>, now: Instant) {
        self.next_id += 1;
        self.items.push_back((
            Toast {
                id: self.next_id,
                message: message.into(),
            },
            now,
        ));
        while self.items.len() > MAX_TOASTS {
            self.items.pop_front();
        }
    }

    /// Entrega os toasts ainda válidos e esvazia a fila.
    pub fn drain_active(&mut self, now: Instant) -> Vec<Toast> {
        self.items
            .drain(..)
            .filter(|(_, created)| now.saturating_duration_since(*created) < TOAST_TTL)
            .map(|(toast, _)| toast)
            .collect()
    }
}
