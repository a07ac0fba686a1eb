// src/services/attendance_service.rs
use crate::{
    error::AppResult,
    models::attendance::{AttendanceEvent, MarkSource, RosterEvent},
    services::{roster::Roster, store::PersistentStore},
};

/// Marca presença (`is_present = true`) ou falta para um aluno.
/// Persiste de imediato e difunde `AttendanceMarked`; número desconhecido
/// dá `NotFound` sem qualquer mutação.
pub async fn mark_attendance<S: PersistentStore>(
    roster: &mut Roster<S>,
    roll_no: &str,
    is_present: bool,
    source: MarkSource,
) -> AppResult<AttendanceEvent> {
    tracing::debug!(
        "Marcando {} para {} (origem {})",
        if is_present { "PRESENÇA" } else { "FALTA" },
        roll_no,
        source
    );

    let student = roster
        .update(roll_no, |s| s.apply_mark(is_present))
        .await?;

    let event = AttendanceEvent {
        roll_no: student.roll_no,
        name: student.name,
        is_present,
        source,
    };
    tracing::info!("{}", event.message());
    roster.emit(RosterEvent::AttendanceMarked(event.clone()));
    Ok(event)
}
