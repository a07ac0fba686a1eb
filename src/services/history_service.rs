// src/services/history_service.rs
use crate::{
    error::AppResult,
    models::attendance::DayTally,
    services::store::PersistentStore,
};
use chrono::{Duration, NaiveDate};
use std::collections::BTreeMap;

/// Histórico diário de marcações, guardado numa chave própria
/// (`<chave do roster>_history`). Alimenta os gráficos semanal e mensal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttendanceHistory {
    days: BTreeMap<NaiveDate, DayTally>,
}

pub fn history_key(storage_key: &str) -> String {
    format!("{}_history", storage_key)
}

impl AttendanceHistory {
    /// Lê o histórico; dados corrompidos dão histórico vazio.
    pub async fn load<S: PersistentStore>(store: &S, key: &str) -> AppResult<Self> {
        let days = match store.read(key).await? {
            Some(raw) => serde_json::from_str::<BTreeMap<NaiveDate, DayTally>>(&raw)
                .unwrap_or_else(|e| {
                    tracing::warn!("⚠️ Histórico em '{}' corrompido, ignorando: {}", key, e);
                    BTreeMap::new()
                }),
            None => BTreeMap::new(),
        };
        Ok(Self { days })
    }

    pub async fn persist<S: PersistentStore>(&self, store: &S, key: &str) -> AppResult<()> {
        let raw = serde_json::to_string(&self.days)?;
        store.write(key, &raw).await
    }

    pub fn record(&mut self, date: NaiveDate, is_present: bool) {
        let tally = self.days.entry(date).or_default();
        if is_present {
            tally.present += 1;
        } else {
            tally.absent += 1;
        }
    }

    /// Desfaz um `record` (usado quando a gravação falha).
    pub fn unrecord(&mut self, date: NaiveDate, is_present: bool) {
        if let Some(tally) = self.days.get_mut(&date) {
            if is_present {
                tally.present = tally.present.saturating_sub(1);
            } else {
                tally.absent = tally.absent.saturating_sub(1);
            }
            if *tally == DayTally::default() {
                self.days.remove(&date);
            }
        }
    }

    pub fn day(&self, date: NaiveDate) -> DayTally {
        self.days.get(&date).copied().unwrap_or_default()
    }

    /// Os últimos `days` dias até `today` (inclusive), do mais antigo para o
    /// mais recente; dias sem marcações aparecem a zero.
    pub fn last_days(&self, today: NaiveDate, days: u32) -> Vec<(NaiveDate, DayTally)> {
        (0..i64::from(days))
            .rev()
            .map(|offset| {
                let date = today - Duration::days(offset);
                (date, self.day(date))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::store::MemoryStore;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn last_days_zero_fills_and_orders_oldest_first() {
        let mut history = AttendanceHistory::default();
        history.record(date("2026-10-14"), true);
        history.record(date("2026-10-14"), false);
        history.record(date("2026-10-09"), true);

        let week = history.last_days(date("2026-10-15"), 7);
        assert_eq!(week.len(), 7);
        assert_eq!(week[0].0, date("2026-10-09"));
        assert_eq!(week[0].1, DayTally { present: 1, absent: 0 });
        assert_eq!(week[5].1, DayTally { present: 1, absent: 1 });
        assert_eq!(week[6].1, DayTally::default());
    }

    #[test]
    fn unrecord_reverts_record() {
        let mut history = AttendanceHistory::default();
        history.record(date("2026-10-15"), false);
        history.unrecord(date("2026-10-15"), false);
        assert_eq!(history, AttendanceHistory::default());
    }

    #[tokio::test]
    async fn persists_and_reloads() {
        let store = MemoryStore::new();
        let mut history = AttendanceHistory::default();
        history.record(date("2026-10-15"), true);
        history.persist(&store, "h").await.unwrap();

        let reloaded = AttendanceHistory::load(&store, "h").await.unwrap();
        assert_eq!(reloaded, history);
    }

    #[tokio::test]
    async fn corrupted_history_loads_empty() {
        let store = MemoryStore::with_entry("h", "[oops");
        let history = AttendanceHistory::load(&store, "h").await.unwrap();
        assert_eq!(history, AttendanceHistory::default());
    }
}
