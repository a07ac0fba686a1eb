// src/services/view_service.rs
use crate::{models::student::Student, services::history_service::AttendanceHistory};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Linha da tabela "todos os alunos".
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRow {
    pub name: String,
    pub roll_no: String,
    /// Número já codificado para uso em URLs.
    pub roll_path: String,
    pub father: String,
    pub contact: String,
    pub present: u32,
    pub total: u32,
    pub absent_streak: u32,
    pub attendance_percent: String,
}

/// Linha da grelha de marcação manual.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualRow {
    pub name: String,
    pub roll_no: String,
}

/// Aluno com faltas consecutivas a partir do limiar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AbsenteeRow {
    pub name: String,
    pub roll_no: String,
    pub roll_path: String,
    pub father: String,
    pub contact: String,
    pub absent_streak: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartPeriod {
    #[default]
    Today,
    Weekly,
    Monthly,
}

impl ChartPeriod {
    pub fn days(&self) -> u32 {
        match self {
            ChartPeriod::Today => 1,
            ChartPeriod::Weekly => 7,
            ChartPeriod::Monthly => 30,
        }
    }
}

/// Resumo de hoje: alunos com pelo menos uma presença vs. os restantes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TodaySummary {
    pub present: usize,
    pub absent: usize,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartPoint {
    pub label: String,
    pub present: u32,
    pub absent: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartSeries {
    pub period: ChartPeriod,
    pub points: Vec<ChartPoint>,
}

impl ChartSeries {
    /// Maior valor da série (para escalar as barras no HTML).
    pub fn max_value(&self) -> u32 {
        self.points
            .iter()
            .map(|p| p.present.max(p.absent))
            .max()
            .unwrap_or(0)
    }
}

/// `needle` já deve vir em minúsculas.
pub fn matches_filter(student: &Student, needle: &str) -> bool {
    student.name.to_lowercase().contains(needle) || student.roll_no.to_lowercase().contains(needle)
}

/// Projeção da tabela; `filter` (opcional) procura no nome ou no número,
/// sem distinguir maiúsculas.
pub fn table_rows(students: &[Student], filter: Option<&str>) -> Vec<StudentRow> {
    let needle = filter
        .map(|f| f.trim().to_lowercase())
        .filter(|f| !f.is_empty());

    students
        .iter()
        .filter(|s| needle.as_deref().map_or(true, |n| matches_filter(s, n)))
        .map(|s| StudentRow {
            name: s.name.clone(),
            roll_no: s.roll_no.clone(),
            roll_path: urlencoding::encode(&s.roll_no).into_owned(),
            father: s.father.clone(),
            contact: s.contact.clone(),
            present: s.present,
            total: s.total,
            absent_streak: s.absent_streak,
            attendance_percent: format!("{:.0}%", s.attendance_percent()),
        })
        .collect()
}

pub fn manual_rows(students: &[Student]) -> Vec<ManualRow> {
    students
        .iter()
        .map(|s| ManualRow {
            name: s.name.clone(),
            roll_no: s.roll_no.clone(),
        })
        .collect()
}

/// Alunos com `absent_streak >= threshold`, pela ordem do roster.
/// Calculado de novo a cada chamada.
pub fn absentees(students: &[Student], threshold: u32) -> Vec<AbsenteeRow> {
    students
        .iter()
        .filter(|s| s.absent_streak >= threshold)
        .map(|s| AbsenteeRow {
            name: s.name.clone(),
            roll_no: s.roll_no.clone(),
            roll_path: urlencoding::encode(&s.roll_no).into_owned(),
            father: s.father.clone(),
            contact: s.contact.clone(),
            absent_streak: s.absent_streak,
        })
        .collect()
}

pub fn today_summary(students: &[Student]) -> TodaySummary {
    let present = students.iter().filter(|s| s.present > 0).count();
    TodaySummary {
        present,
        absent: students.len() - present,
        total: students.len(),
    }
}

/// Série do gráfico de comparação. `Today` usa o resumo do roster; semanal
/// e mensal vêm do histórico diário real (dias sem registo a zero).
pub fn comparison_series(
    period: ChartPeriod,
    students: &[Student],
    history: &AttendanceHistory,
    today: NaiveDate,
) -> ChartSeries {
    let points = match period {
        ChartPeriod::Today => {
            let summary = today_summary(students);
            vec![ChartPoint {
                label: "Today".to_string(),
                present: summary.present as u32,
                absent: summary.absent as u32,
            }]
        }
        ChartPeriod::Weekly | ChartPeriod::Monthly => history
            .last_days(today, period.days())
            .into_iter()
            .map(|(date, tally)| ChartPoint {
                label: date.format("%d/%m").to_string(),
                present: tally.present,
                absent: tally.absent,
            })
            .collect(),
    };
    ChartSeries { period, points }
}
