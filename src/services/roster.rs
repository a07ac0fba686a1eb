// src/services/roster.rs
use crate::{
    error::{AppError, AppResult},
    models::{
        attendance::RosterEvent,
        student::{NewStudent, Student},
    },
    services::store::PersistentStore,
};
use std::collections::HashSet;
use tokio::sync::broadcast;

// Capacidade do canal de eventos; subscritores lentos perdem eventos antigos
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Roster em memória: a única fonte de verdade durante a sessão.
/// Carrega do store no arranque e reescreve-o após cada mutação.
pub struct Roster<S> {
    store: S,
    key: String,
    students: Vec<Student>,
    events: broadcast::Sender<RosterEvent>,
}

impl<S: PersistentStore> Roster<S> {
    /// Lê o roster guardado. Dados em falta ou corrompidos dão um roster
    /// vazio (com aviso no log); só uma falha do próprio store é erro.
    pub async fn load(store: S, key: &str) -> AppResult<Self> {
        let students = match store.read(key).await? {
            Some(raw) => match serde_json::from_str::<Vec<Student>>(&raw) {
                Ok(students) => students,
                Err(e) => {
                    tracing::warn!(
                        "⚠️ Roster guardado em '{}' está corrompido, começando vazio: {}",
                        key,
                        e
                    );
                    Vec::new()
                }
            },
            None => Vec::new(),
        };
        tracing::info!("Roster carregado de '{}' ({} alunos).", key, students.len());

        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Ok(Self {
            store,
            key: key.to_string(),
            students,
            events,
        })
    }

    pub fn all(&self) -> &[Student] {
        &self.students
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }

    pub fn contains(&self, roll_no: &str) -> bool {
        self.position(roll_no).is_some()
    }

    pub fn find(&self, roll_no: &str) -> AppResult<&Student> {
        self.students
            .iter()
            .find(|s| s.roll_no == roll_no)
            .ok_or_else(|| AppError::NotFound(roll_no.to_string()))
    }

    /// Observador das mutações do roster.
    pub fn subscribe(&self) -> broadcast::Receiver<RosterEvent> {
        self.events.subscribe()
    }

    /// Difunde um evento; sem subscritores não é erro.
    pub fn emit(&self, event: RosterEvent) {
        let _ = self.events.send(event);
    }

    pub async fn add_student(&mut self, record: NewStudent) -> AppResult<Student> {
        let student = record.into_student()?;
        if self.contains(&student.roll_no) {
            tracing::warn!("Falha ao criar aluno: número '{}' já existe.", student.roll_no);
            return Err(AppError::DuplicateIdentifier(student.roll_no));
        }

        self.students.push(student.clone());
        if let Err(e) = self.persist().await {
            self.students.pop();
            return Err(e);
        }

        tracing::info!("✅ Aluno '{}' ({}) criado.", student.name, student.roll_no);
        self.emit(RosterEvent::StudentAdded {
            roll_no: student.roll_no.clone(),
            name: student.name.clone(),
        });
        Ok(student)
    }

    /// Adiciona vários registos; duplicados e inválidos são ignorados sem
    /// abortar o lote. Devolve quantos foram realmente adicionados.
    pub async fn bulk_add(&mut self, records: Vec<NewStudent>) -> AppResult<usize> {
        let before = self.students.len();
        let mut seen: HashSet<String> = self.students.iter().map(|s| s.roll_no.clone()).collect();

        for record in records {
            let student = match record.into_student() {
                Ok(s) => s,
                Err(_) => continue,
            };
            if !seen.insert(student.roll_no.clone()) {
                tracing::debug!("Import: ignorando número duplicado '{}'", student.roll_no);
                continue;
            }
            self.students.push(student);
        }

        if let Err(e) = self.persist().await {
            self.students.truncate(before);
            return Err(e);
        }

        let added = self.students.len() - before;
        tracing::info!("✅ Import concluído: {} alunos novos.", added);
        self.emit(RosterEvent::StudentsImported { added });
        Ok(added)
    }

    /// Remove o aluno, se existir. Número desconhecido não é erro.
    /// Devolve o registo removido.
    pub async fn delete_student(&mut self, roll_no: &str) -> AppResult<Option<Student>> {
        let removed = self.position(roll_no).map(|idx| (idx, self.students.remove(idx)));

        if let Err(e) = self.persist().await {
            if let Some((idx, student)) = removed {
                self.students.insert(idx, student);
            }
            return Err(e);
        }

        match removed {
            Some((_, student)) => {
                tracing::info!("🗑️ Aluno '{}' removido.", roll_no);
                self.emit(RosterEvent::StudentDeleted {
                    roll_no: roll_no.to_string(),
                });
                Ok(Some(student))
            }
            None => {
                tracing::debug!("Remoção ignorada: '{}' não existe.", roll_no);
                Ok(None)
            }
        }
    }

    /// Aplica `change` ao registo indicado e persiste; se a escrita falhar o
    /// registo volta ao estado anterior.
    pub async fn update<F>(&mut self, roll_no: &str, change: F) -> AppResult<Student>
    where
        F: FnOnce(&mut Student),
    {
        let idx = self
            .position(roll_no)
            .ok_or_else(|| AppError::NotFound(roll_no.to_string()))?;
        let previous = self.students[idx].clone();
        change(&mut self.students[idx]);

        if let Err(e) = self.persist().await {
            self.students[idx] = previous;
            return Err(e);
        }
        Ok(self.students[idx].clone())
    }

    /// Serializa o roster inteiro e sobrescreve a chave no store.
    pub async fn persist(&self) -> AppResult<()> {
        let raw = serde_json::to_string(&self.students)?;
        self.store.write(&self.key, &raw).await
    }

    fn position(&self, roll_no: &str) -> Option<usize> {
        self.students.iter().position(|s| s.roll_no == roll_no)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::store::MemoryStore;

    const KEY: &str = "students";

    async fn empty_roster() -> (Roster<MemoryStore>, MemoryStore) {
        let store = MemoryStore::new();
        let roster = Roster::load(store.clone(), KEY).await.unwrap();
        (roster, store)
    }

    #[tokio::test]
    async fn add_then_find_starts_with_zero_counters() {
        let (mut roster, _) = empty_roster().await;
        roster.add_student(NewStudent::new("Asha", "101")).await.unwrap();

        let found = roster.find("101").unwrap();
        assert_eq!(found.name, "Asha");
        assert_eq!((found.present, found.total, found.absent_streak), (0, 0, 0));
    }

    #[tokio::test]
    async fn duplicate_roll_is_rejected_and_roster_unchanged() {
        let (mut roster, _) = empty_roster().await;
        roster.add_student(NewStudent::new("Asha", "101")).await.unwrap();

        let err = roster
            .add_student(NewStudent::new("Someone Else", "101"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DuplicateIdentifier(ref r) if r == "101"));
        assert_eq!(roster.len(), 1);
        assert_eq!(roster.find("101").unwrap().name, "Asha");
    }

    #[tokio::test]
    async fn find_unknown_is_not_found() {
        let (roster, _) = empty_roster().await;
        assert!(matches!(roster.find("nope"), Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn bulk_add_skips_duplicates_and_invalid_rows() {
        let (mut roster, _) = empty_roster().await;
        roster.add_student(NewStudent::new("Asha", "101")).await.unwrap();

        let added = roster
            .bulk_add(vec![
                NewStudent::new("Asha Again", "101"),
                NewStudent::new("Bilal", "102"),
                NewStudent::new("Bilal Twin", "102"),
                NewStudent::new("", "103"),
                NewStudent::new("Chen", "104"),
            ])
            .await
            .unwrap();

        assert_eq!(added, 2);
        let rolls: Vec<&str> = roster.all().iter().map(|s| s.roll_no.as_str()).collect();
        assert_eq!(rolls, vec!["101", "102", "104"]);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let (mut roster, _) = empty_roster().await;
        roster.add_student(NewStudent::new("Asha", "101")).await.unwrap();

        assert!(roster.delete_student("999").await.unwrap().is_none());
        assert_eq!(roster.len(), 1);
        assert!(roster.delete_student("101").await.unwrap().is_some());
        assert!(roster.delete_student("101").await.unwrap().is_none());
        assert!(roster.is_empty());
    }

    #[tokio::test]
    async fn persist_then_reload_keeps_order() {
        let (mut roster, store) = empty_roster().await;
        for (name, roll) in [("Zed", "3"), ("Asha", "1"), ("Mina", "2")] {
            roster.add_student(NewStudent::new(name, roll)).await.unwrap();
        }
        roster.update("1", |s| s.apply_mark(false)).await.unwrap();

        let reloaded = Roster::load(store, KEY).await.unwrap();
        assert_eq!(reloaded.all(), roster.all());
    }

    #[tokio::test]
    async fn malformed_storage_loads_empty() {
        let store = MemoryStore::with_entry(KEY, "{not json");
        let roster = Roster::load(store, KEY).await.unwrap();
        assert!(roster.is_empty());
    }

    #[tokio::test]
    async fn failed_write_rolls_back_mutation() {
        let (mut roster, store) = empty_roster().await;
        roster.add_student(NewStudent::new("Asha", "101")).await.unwrap();
        store.set_fail_writes(true);

        assert!(matches!(
            roster.add_student(NewStudent::new("Bilal", "102")).await,
            Err(AppError::StorageUnavailable(_))
        ));
        assert!(roster.delete_student("101").await.is_err());
        assert!(roster.update("101", |s| s.apply_mark(true)).await.is_err());

        assert_eq!(roster.len(), 1);
        assert_eq!(roster.find("101").unwrap().total, 0);
    }

    #[tokio::test]
    async fn failed_bulk_write_drops_whole_batch() {
        let (mut roster, store) = empty_roster().await;
        roster.add_student(NewStudent::new("Asha", "101")).await.unwrap();
        let saved = store.get(KEY);
        let mut rx = roster.subscribe();
        store.set_fail_writes(true);

        let batch = vec![NewStudent::new("Bilal", "102"), NewStudent::new("Chen", "103")];
        assert!(matches!(
            roster.bulk_add(batch).await,
            Err(AppError::StorageUnavailable(_))
        ));

        assert_eq!(roster.len(), 1);
        assert!(!roster.contains("102"));
        assert!(!roster.contains("103"));
        assert_eq!(store.get(KEY), saved);
        assert!(rx.try_recv().is_err());

        // O lote pode ser repetido depois de a escrita voltar
        store.set_fail_writes(false);
        let batch = vec![NewStudent::new("Bilal", "102"), NewStudent::new("Chen", "103")];
        assert_eq!(roster.bulk_add(batch).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn mutations_are_broadcast() {
        let (mut roster, _) = empty_roster().await;
        let mut rx = roster.subscribe();

        roster.add_student(NewStudent::new("Asha", "101")).await.unwrap();
        roster.delete_student("101").await.unwrap();

        assert_eq!(
            rx.recv().await.unwrap(),
            RosterEvent::StudentAdded { roll_no: "101".into(), name: "Asha".into() }
        );
        assert_eq!(
            rx.recv().await.unwrap(),
            RosterEvent::StudentDeleted { roll_no: "101".into() }
        );
    }
}
