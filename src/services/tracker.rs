// src/services/tracker.rs
use crate::{
    config::Config,
    error::AppResult,
    models::{
        attendance::{AttendanceEvent, MarkSource, RosterEvent, ScanOutcome},
        navigation::EntryHook,
        student::{NewStudent, Student},
    },
    services::{
        attendance_service,
        history_service::{history_key, AttendanceHistory},
        import_service,
        roster::Roster,
        scan_service::{ScanDeduplicator, ScannerSession},
        store::PersistentStore,
        toast_service::{Toast, ToastQueue},
    },
};
use chrono::NaiveDate;
use std::time::Instant;
use tokio::sync::broadcast;

/// Estado completo de uma sessão de chamada: roster, histórico, scanner,
/// deduplicador e fila de toasts. Vive atrás de um único Mutex, o que
/// serializa todos os eventos.
pub struct Tracker<S> {
    roster: Roster<S>,
    store: S,
    history_key: String,
    history: AttendanceHistory,
    dedup: ScanDeduplicator,
    scanner: ScannerSession,
    toasts: ToastQueue,
    absent_streak_threshold: u32,
}

impl<S: PersistentStore + Clone> Tracker<S> {
    pub async fn open(store: S, config: &Config) -> AppResult<Self> {
        let roster = Roster::load(store.clone(), &config.storage_key).await?;
        let history_key = history_key(&config.storage_key);
        let history = AttendanceHistory::load(&store, &history_key).await?;

        Ok(Self {
            roster,
            store,
            history_key,
            history,
            dedup: ScanDeduplicator::new(config.dedup_window),
            scanner: ScannerSession::new(config.scanner_enabled),
            toasts: ToastQueue::default(),
            absent_streak_threshold: config.absent_streak_threshold,
        })
    }

    pub fn students(&self) -> &[Student] {
        self.roster.all()
    }

    pub fn find(&self, roll_no: &str) -> AppResult<&Student> {
        self.roster.find(roll_no)
    }

    pub fn history(&self) -> &AttendanceHistory {
        &self.history
    }

    pub fn absent_streak_threshold(&self) -> u32 {
        self.absent_streak_threshold
    }

    pub fn scanner_running(&self) -> bool {
        self.scanner.is_running()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RosterEvent> {
        self.roster.subscribe()
    }

    // --- Toasts ---

    pub fn toast(&mut self, message: impl Into<String>) {
        self.toasts.push(message, Instant::now());
    }

    pub fn take_toasts(&mut self) -> Vec<Toast> {
        self.toasts.drain_active(Instant::now())
    }

    /// Converte o resultado de uma ação do utilizador num toast (sucesso ou
    /// erro) e devolve-o sem alterações.
    pub fn report<T>(&mut self, result: AppResult<T>, on_ok: impl FnOnce(&T) -> String) -> AppResult<T> {
        match &result {
            Ok(value) => self.toast(on_ok(value)),
            Err(e) if e.is_user_facing() => self.toast(e.user_message()),
            Err(_) => self.toast("An unexpected error occurred"),
        }
        result
    }

    // --- Alunos ---

    pub async fn add_student(&mut self, record: NewStudent) -> AppResult<Student> {
        let result = self.roster.add_student(record).await;
        self.report(result, |_| "Student saved".to_string())
    }

    pub async fn import_csv(&mut self, text: &str) -> AppResult<usize> {
        let records = import_service::parse_roster_csv(text);
        let result = self.roster.bulk_add(records).await;
        self.report(result, |added| format!("CSV processed: {} new students", added))
    }

    pub async fn delete_student(&mut self, roll_no: &str) -> AppResult<Option<Student>> {
        let result = self.roster.delete_student(roll_no).await;
        self.report(result, |_| "Student deleted".to_string())
    }

    // --- Presenças ---

    pub async fn mark_attendance(
        &mut self,
        roll_no: &str,
        is_present: bool,
        source: MarkSource,
        today: NaiveDate,
    ) -> AppResult<AttendanceEvent> {
        let result =
            attendance_service::mark_attendance(&mut self.roster, roll_no, is_present, source).await;
        if result.is_ok() {
            self.record_history(today, is_present).await;
        }
        self.report(result, AttendanceEvent::message)
    }

    // O histórico é secundário: uma falha de gravação não anula a marcação
    async fn record_history(&mut self, today: NaiveDate, is_present: bool) {
        self.history.record(today, is_present);
        if let Err(e) = self.history.persist(&self.store, &self.history_key).await {
            tracing::warn!("⚠️ Falha ao gravar histórico de presenças: {}", e);
            self.history.unrecord(today, is_present);
        }
    }

    /// Leitura de QR vinda da câmara. A deduplicação corre antes da procura
    /// no roster; um código desconhecido fica igualmente registado na janela.
    pub async fn scan(&mut self, code: &str, now: Instant, today: NaiveDate) -> AppResult<ScanOutcome> {
        let code = code.trim();
        self.scanner.ensure_running()?;

        if !self.dedup.accept(code, now) {
            return Ok(ScanOutcome::Duplicate {
                code: code.to_string(),
            });
        }

        if !self.roster.contains(code) {
            tracing::warn!("Código lido não corresponde a nenhum aluno: {}", code);
            self.toast("Scanned roll not found");
            return Ok(ScanOutcome::NotFound {
                code: code.to_string(),
            });
        }

        let event = self.mark_attendance(code, true, MarkSource::Qr, today).await?;
        Ok(ScanOutcome::Accepted { event })
    }

    pub fn start_scanner(&mut self) -> AppResult<()> {
        let result = self.scanner.start();
        if let Err(e) = &result {
            self.toast(e.user_message());
        }
        result
    }

    /// Idempotente: parar um scanner parado não faz nada.
    pub fn stop_scanner(&mut self) -> bool {
        let was_running = self.scanner.stop();
        if was_running {
            tracing::info!("Scanner parado.");
        }
        was_running
    }

    /// Executa os hooks de entrada de um ecrã que mexem em estado. Os hooks
    /// de render são tratados pela camada web.
    pub fn run_entry_hooks(&mut self, hooks: &[EntryHook]) {
        for hook in hooks {
            if let EntryHook::StartScanner = hook {
                // O erro já ficou na fila de toasts
                let _ = self.start_scanner();
            }
        }
    }

    /// Simula o aviso ao encarregado de educação de um aluno faltoso.
    pub fn alert_parent(&mut self, roll_no: &str) -> AppResult<String> {
        let result = self.roster.find(roll_no).map(|s| {
            let target = if s.contact.is_empty() { "parent" } else { s.contact.as_str() };
            format!("WhatsApp message simulated to {}", target)
        });
        self.report(result, |msg| msg.clone())
    }
}
