// src/models/attendance.rs
use serde::{Deserialize, Serialize};
use std::fmt;

/// Origem de uma marcação de presença.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkSource {
    Manual,
    #[serde(rename = "QR")]
    Qr,
}

impl fmt::Display for MarkSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarkSource::Manual => write!(f, "Manual"),
            MarkSource::Qr => write!(f, "QR"),
        }
    }
}

/// Evento emitido após cada marcação (para a camada de notificações).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceEvent {
    pub roll_no: String,
    pub name: String,
    pub is_present: bool,
    pub source: MarkSource,
}

impl AttendanceEvent {
    /// Ex: "Asha marked Present (QR)"
    pub fn message(&self) -> String {
        format!(
            "{} marked {} ({})",
            self.name,
            if self.is_present { "Present" } else { "Absent" },
            self.source
        )
    }
}

/// Eventos de mudança do roster, difundidos aos subscritores (ex: WebSocket).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RosterEvent {
    #[serde(rename_all = "camelCase")]
    StudentAdded { roll_no: String, name: String },
    StudentsImported { added: usize },
    #[serde(rename_all = "camelCase")]
    StudentDeleted { roll_no: String },
    AttendanceMarked(AttendanceEvent),
}

/// Resultado de uma leitura de QR, devolvido ao cliente como JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScanOutcome {
    /// Leitura aceite e presença marcada.
    Accepted { event: AttendanceEvent },
    /// Mesmo código lido dentro da janela de deduplicação; ignorado.
    Duplicate { code: String },
    /// Leitura aceite, mas nenhum aluno tem este número.
    NotFound { code: String },
}

impl ScanOutcome {
    pub fn message(&self) -> String {
        match self {
            ScanOutcome::Accepted { event } => format!("Scanned: {}", event.roll_no),
            ScanOutcome::Duplicate { code } => format!("Already scanned: {}", code),
            ScanOutcome::NotFound { code } => format!("Scanned code not found: {}", code),
        }
    }
}

/// Contagem diária de marcações (histórico para os gráficos).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayTally {
    pub present: u32,
    pub absent: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_message_names_source() {
        let event = AttendanceEvent {
            roll_no: "101".into(),
            name: "Asha".into(),
            is_present: true,
            source: MarkSource::Qr,
        };
        assert_eq!(event.message(), "Asha marked Present (QR)");
    }

    #[test]
    fn roster_event_json_is_tagged() {
        let json = serde_json::to_value(RosterEvent::StudentDeleted { roll_no: "7".into() }).unwrap();
        assert_eq!(json["type"], "studentDeleted");
        assert_eq!(json["rollNo"], "7");

        let json = serde_json::to_value(ScanOutcome::Duplicate { code: "7".into() }).unwrap();
        assert_eq!(json["status"], "duplicate");
    }
}
