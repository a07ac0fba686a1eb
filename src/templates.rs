// src/templates.rs
use crate::services::{
    toast_service::Toast,
    view_service::{AbsenteeRow, ChartSeries, ManualRow, StudentRow, TodaySummary},
};
use askama::Template;

/// Página de erro genérica (sem o layout base).
#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorPage {
    pub status_code: u16,
    pub message: String,
}

#[derive(Template)]
#[template(path = "landing.html")]
pub struct LandingPage {
    pub toasts: Vec<Toast>,
}

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardPage {
    pub toasts: Vec<Toast>,
    pub student_count: usize,
    pub absentee_count: usize,
    pub threshold: u32,
}

/// Cartão mostrado depois de guardar um aluno (com pré-visualização do QR).
#[derive(Clone, Debug)]
pub struct SavedStudent {
    pub name: String,
    pub roll_no: String,
    pub roll_path: String,
    pub father: String,
    pub contact: String,
}

#[derive(Template)]
#[template(path = "add_student.html")]
pub struct AddStudentPage {
    pub toasts: Vec<Toast>,
    pub saved: Option<SavedStudent>,
    pub preview_size: u32,
}

#[derive(Template)]
#[template(path = "all_students.html")]
pub struct AllStudentsPage {
    pub toasts: Vec<Toast>,
    pub rows: Vec<StudentRow>,
    pub filter: String,
    pub qr_size: u32,
}

#[derive(Template)]
#[template(path = "mark_attendance.html")]
pub struct MarkAttendancePage {
    pub toasts: Vec<Toast>,
    pub rows: Vec<ManualRow>,
    pub scanner_running: bool,
}

#[derive(Template)]
#[template(path = "absent_students.html")]
pub struct AbsentStudentsPage {
    pub toasts: Vec<Toast>,
    pub rows: Vec<AbsenteeRow>,
    pub threshold: u32,
}

/// Barra de gráfico já escalada (percentagens para a largura CSS).
#[derive(Clone, Debug)]
pub struct ChartBar {
    pub label: String,
    pub present: u32,
    pub absent: u32,
    pub present_width: u32,
    pub absent_width: u32,
}

impl ChartBar {
    pub fn from_series(series: &ChartSeries) -> Vec<ChartBar> {
        let max = series.max_value().max(1);
        series
            .points
            .iter()
            .map(|p| ChartBar {
                label: p.label.clone(),
                present: p.present,
                absent: p.absent,
                present_width: p.present * 100 / max,
                absent_width: p.absent * 100 / max,
            })
            .collect()
    }
}

#[derive(Template)]
#[template(path = "attendance_dashboard.html")]
pub struct AttendanceDashboardPage {
    pub toasts: Vec<Toast>,
    pub summary: TodaySummary,
    pub present_share: usize,
    pub period: String,
    pub bars: Vec<ChartBar>,
}
