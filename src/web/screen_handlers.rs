// src/web/screen_handlers.rs
use crate::{
    error::{AppError, AppResult},
    models::navigation::{EntryHook, Navigator, Screen},
    services::{qr_service, view_service},
    state::AppState,
    templates::{
        AbsentStudentsPage, AddStudentPage, AllStudentsPage, AttendanceDashboardPage, ChartBar,
        DashboardPage, LandingPage, MarkAttendancePage, SavedStudent,
    },
    web::render_page,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;

const NAV_SESSION_KEY: &str = "nav_history";

#[derive(Deserialize, Debug, Default)]
pub struct ScreenQuery {
    /// Filtro da tabela de alunos.
    q: Option<String>,
    period: Option<view_service::ChartPeriod>,
    /// Número do aluno acabado de guardar (mostra o cartão com o QR).
    saved: Option<String>,
}

// O histórico de navegação fica na sessão do browser
async fn load_navigator(session: &Session) -> AppResult<Navigator> {
    session
        .get::<Navigator>(NAV_SESSION_KEY)
        .await
        .map(Option::unwrap_or_default)
        .map_err(|e| AppError::SessionError(format!("Falha ao ler navegação: {}", e)))
}

async fn save_navigator(session: &Session, navigator: &Navigator) -> AppResult<()> {
    session
        .insert(NAV_SESSION_KEY, navigator)
        .await
        .map_err(|e| AppError::SessionError(format!("Falha ao gravar navegação: {}", e)))
}

/// GET / - ecrã inicial
pub async fn landing_handler(State(state): State<AppState>, session: Session) -> AppResult<Response> {
    show_screen(&state, &session, Screen::Landing, ScreenQuery::default()).await
}

/// GET /screen/{id}
pub async fn screen_handler(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Query(params): Query<ScreenQuery>,
) -> AppResult<Response> {
    match Screen::from_id(&id) {
        Some(screen) => show_screen(&state, &session, screen, params).await,
        None => {
            tracing::debug!("Ecrã desconhecido pedido: {}", id);
            Ok((StatusCode::NOT_FOUND, "Unknown screen").into_response())
        }
    }
}

/// GET /back - volta um nível no histórico
pub async fn back_handler(session: Session) -> AppResult<Redirect> {
    let mut navigator = load_navigator(&session).await?;
    let previous = navigator.back();
    save_navigator(&session, &navigator).await?;
    tracing::debug!("Voltando para '{}'", previous.id());
    Ok(Redirect::to(&previous.path()))
}

async fn show_screen(
    state: &AppState,
    session: &Session,
    screen: Screen,
    params: ScreenQuery,
) -> AppResult<Response> {
    let mut navigator = load_navigator(session).await?;
    let hooks = navigator.navigate(screen);
    save_navigator(session, &navigator).await?;

    tracing::debug!("GET {}: hooks {:?}", screen.path(), hooks);

    let mut tracker = state.tracker.lock().await;
    tracker.run_entry_hooks(hooks);
    let toasts = tracker.take_toasts();
    let students = tracker.students();
    let threshold = tracker.absent_streak_threshold();
    let wants = |hook: EntryHook| hooks.contains(&hook);

    match screen {
        Screen::Landing => render_page(&LandingPage { toasts }, "LandingPage"),
        Screen::Dashboard => render_page(
            &DashboardPage {
                toasts,
                student_count: students.len(),
                absentee_count: view_service::absentees(students, threshold).len(),
                threshold,
            },
            "DashboardPage",
        ),
        Screen::AddStudent => {
            let saved = params
                .saved
                .as_deref()
                .and_then(|roll| tracker.find(roll).ok())
                .map(|s| SavedStudent {
                    name: s.name.clone(),
                    roll_no: s.roll_no.clone(),
                    roll_path: urlencoding::encode(&s.roll_no).into_owned(),
                    father: s.father.clone(),
                    contact: s.contact.clone(),
                });
            render_page(
                &AddStudentPage {
                    toasts,
                    saved,
                    preview_size: qr_service::PREVIEW_SIZE,
                },
                "AddStudentPage",
            )
        }
        Screen::AllStudents => {
            let filter = params.q.unwrap_or_default();
            let rows = if wants(EntryHook::RenderStudentsTable) {
                view_service::table_rows(students, Some(&filter))
            } else {
                Vec::new()
            };
            render_page(
                &AllStudentsPage {
                    toasts,
                    rows,
                    filter,
                    qr_size: qr_service::TABLE_SIZE,
                },
                "AllStudentsPage",
            )
        }
        Screen::MarkAttendance => {
            let rows = if wants(EntryHook::RenderManualGrid) {
                view_service::manual_rows(students)
            } else {
                Vec::new()
            };
            render_page(
                &MarkAttendancePage {
                    toasts,
                    rows,
                    scanner_running: tracker.scanner_running(),
                },
                "MarkAttendancePage",
            )
        }
        Screen::AbsentStudents => {
            let rows = if wants(EntryHook::RenderAbsentees) {
                view_service::absentees(students, threshold)
            } else {
                Vec::new()
            };
            render_page(&AbsentStudentsPage { toasts, rows, threshold }, "AbsentStudentsPage")
        }
        Screen::AttendanceDashboard => {
            let period = params.period.unwrap_or_default();
            let summary = view_service::today_summary(students);
            let bars = if wants(EntryHook::DrawCharts) {
                let today = chrono::Local::now().date_naive();
                let series =
                    view_service::comparison_series(period, students, tracker.history(), today);
                ChartBar::from_series(&series)
            } else {
                Vec::new()
            };
            let present_share = if summary.total == 0 {
                0
            } else {
                summary.present * 100 / summary.total
            };
            render_page(
                &AttendanceDashboardPage {
                    toasts,
                    summary,
                    present_share,
                    period: period_id(period).to_string(),
                    bars,
                },
                "AttendanceDashboardPage",
            )
        }
    }
}

fn period_id(period: view_service::ChartPeriod) -> &'static str {
    match period {
        view_service::ChartPeriod::Today => "today",
        view_service::ChartPeriod::Weekly => "weekly",
        view_service::ChartPeriod::Monthly => "monthly",
    }
}
