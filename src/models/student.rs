// src/models/student.rs
use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Registo de um aluno tal como fica guardado no armazenamento persistente.
/// Os nomes dos campos (camelCase) mantêm o formato JSON já existente.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub name: String,
    pub roll_no: String,
    #[serde(default)]
    pub father: String,
    #[serde(default)]
    pub contact: String,
    // Contadores em falta no JSON antigo contam como 0
    #[serde(default)]
    pub present: u32,
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub absent_streak: u32,
}

impl Student {
    /// Aplica uma marcação de presença/falta aos contadores. Os contadores
    /// saturam no máximo, mantendo `present <= total`.
    pub fn apply_mark(&mut self, is_present: bool) {
        self.total = self.total.saturating_add(1);
        if is_present {
            self.present = self.present.saturating_add(1).min(self.total);
            self.absent_streak = 0;
        } else {
            self.absent_streak = self.absent_streak.saturating_add(1);
        }
    }

    /// Percentagem de presenças (0 quando ainda não houve marcações).
    pub fn attendance_percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            f64::from(self.present) * 100.0 / f64::from(self.total)
        }
    }
}

/// Dados de entrada para criar um aluno (formulário ou linha de CSV).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewStudent {
    // Campos em falta no formulário viram erro de validação, não 422
    #[serde(default)]
    pub name: String,
    #[serde(default, alias = "rollNo")]
    pub roll_no: String,
    #[serde(default)]
    pub father: String,
    #[serde(default)]
    pub contact: String,
}

impl NewStudent {
    pub fn new(name: &str, roll_no: &str) -> Self {
        Self {
            name: name.to_string(),
            roll_no: roll_no.to_string(),
            ..Default::default()
        }
    }

    pub fn with_details(mut self, father: &str, contact: &str) -> Self {
        self.father = father.to_string();
        self.contact = contact.to_string();
        self
    }

    /// Valida e normaliza (trim) os campos, produzindo um registo com
    /// contadores a zero.
    pub fn into_student(self) -> AppResult<Student> {
        let name = self.name.trim();
        let roll_no = self.roll_no.trim();
        if name.is_empty() || roll_no.is_empty() {
            return Err(AppError::Validation("Please enter Name and Roll".to_string()));
        }
        Ok(Student {
            name: name.to_string(),
            roll_no: roll_no.to_string(),
            father: self.father.trim().to_string(),
            contact: self.contact.trim().to_string(),
            present: 0,
            total: 0,
            absent_streak: 0,
        })
    }
}
