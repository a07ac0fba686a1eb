// src/models/navigation.rs
use serde::{Deserialize, Serialize};

/// Ecrãs da aplicação. O id (camelCase) aparece no URL `/screen/{id}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Screen {
    Landing,
    Dashboard,
    AddStudent,
    AllStudents,
    MarkAttendance,
    AbsentStudents,
    AttendanceDashboard,
}

/// Efeitos disparados ao entrar num ecrã.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryHook {
    RenderStudentsTable,
    StartScanner,
    RenderManualGrid,
    RenderAbsentees,
    DrawCharts,
}

impl Screen {
    pub const ALL: [Screen; 7] = [
        Screen::Landing,
        Screen::Dashboard,
        Screen::AddStudent,
        Screen::AllStudents,
        Screen::MarkAttendance,
        Screen::AbsentStudents,
        Screen::AttendanceDashboard,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Screen::Landing => "landing",
            Screen::Dashboard => "dashboard",
            Screen::AddStudent => "addStudent",
            Screen::AllStudents => "allStudents",
            Screen::MarkAttendance => "markAttendance",
            Screen::AbsentStudents => "absentStudents",
            Screen::AttendanceDashboard => "attendanceDashboard",
        }
    }

    pub fn from_id(id: &str) -> Option<Screen> {
        Screen::ALL.into_iter().find(|s| s.id() == id)
    }

    pub fn path(&self) -> String {
        match self {
            Screen::Landing => "/".to_string(),
            other => format!("/screen/{}", other.id()),
        }
    }

    /// Tabela de hooks de entrada, explícita por ecrã.
    pub fn entry_hooks(&self) -> &'static [EntryHook] {
        match self {
            Screen::AllStudents => &[EntryHook::RenderStudentsTable],
            Screen::MarkAttendance => &[EntryHook::StartScanner, EntryHook::RenderManualGrid],
            Screen::AbsentStudents => &[EntryHook::RenderAbsentees],
            Screen::AttendanceDashboard => &[EntryHook::DrawCharts],
            Screen::Landing | Screen::Dashboard | Screen::AddStudent => &[],
        }
    }
}

/// Histórico linear de ecrãs visitados (um por sessão do browser).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Navigator {
    history: Vec<Screen>,
}

impl Default for Navigator {
    fn default() -> Self {
        Self {
            history: vec![Screen::Landing],
        }
    }
}

impl Navigator {
    pub fn current(&self) -> Screen {
        self.history.last().copied().unwrap_or(Screen::Landing)
    }

    pub fn history(&self) -> &[Screen] {
        &self.history
    }

    /// Entra num ecrã. Reentrar no ecrã atual não empilha de novo.
    /// Devolve os hooks a executar (correm sempre, mesmo na reentrada).
    pub fn navigate(&mut self, screen: Screen) -> &'static [EntryHook] {
        if self.history.last() != Some(&screen) {
            self.history.push(screen);
        }
        screen.entry_hooks()
    }

    /// Volta um nível; com uma entrada ou menos, reinicia em `[Landing]`.
    pub fn back(&mut self) -> Screen {
        if self.history.len() <= 1 {
            self.history = vec![Screen::Landing];
            return Screen::Landing;
        }
        self.history.pop();
        self.current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_on_landing() {
        let nav = Navigator::default();
        assert_eq!(nav.current(), Screen::Landing);
        assert_eq!(nav.history(), &[Screen::Landing]);
    }

    #[test]
    fn reentering_current_screen_does_not_push() {
        let mut nav = Navigator::default();
        nav.navigate(Screen::Dashboard);
        nav.navigate(Screen::Dashboard);
        assert_eq!(nav.history(), &[Screen::Landing, Screen::Dashboard]);
    }

    #[test]
    fn back_pops_and_falls_back_to_landing() {
        let mut nav = Navigator::default();
        nav.navigate(Screen::Dashboard);
        nav.navigate(Screen::AllStudents);
        assert_eq!(nav.back(), Screen::Dashboard);
        assert_eq!(nav.back(), Screen::Landing);
        assert_eq!(nav.back(), Screen::Landing);
        assert_eq!(nav.history(), &[Screen::Landing]);
    }

    #[test]
    fn hooks_follow_table() {
        let mut nav = Navigator::default();
        assert_eq!(
            nav.navigate(Screen::MarkAttendance),
            &[EntryHook::StartScanner, EntryHook::RenderManualGrid]
        );
        assert!(nav.navigate(Screen::AddStudent).is_empty());
        assert_eq!(Screen::AbsentStudents.entry_hooks(), &[EntryHook::RenderAbsentees]);
    }

    #[test]
    fn screen_ids_round_trip() {
        for screen in Screen::ALL {
            assert_eq!(Screen::from_id(screen.id()), Some(screen));
        }
        assert_eq!(Screen::from_id("teacherLogin"), None);
        assert_eq!(Screen::Landing.path(), "/");
        assert_eq!(Screen::AllStudents.path(), "/screen/allStudents");
    }
}
