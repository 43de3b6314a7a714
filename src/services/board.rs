use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{NaiveDate, Utc};
use tracing::{debug, error, info, warn};

use crate::error::ApiError;
use crate::models::{AttendanceRecord, ClassSummary, Student, StudentId};
use crate::services::notifier::{Notification, Notifier, Severity};
use crate::state::Clients;

pub const MSG_CLASSES_FAILED: &str = "Failed to load classes. Check that the backend is running.";
pub const MSG_NO_STUDENTS: &str = "No students found in this class";
pub const MSG_CLASS_NOT_FOUND: &str = "Class not found or has no students";
pub const MSG_ROSTER_FAILED: &str = "Failed to load students. Check the backend.";
pub const MSG_ALL_PRESENT: &str = "All students marked present";
pub const MSG_ALL_ABSENT: &str = "All students marked absent";
pub const MSG_SELECT_CLASS: &str = "Select a class first";
pub const MSG_NOTHING_TO_SAVE: &str = "No students to save";
pub const MSG_SAVED: &str = "✓ Attendance saved successfully!";
pub const MSG_NO_RESPONSE: &str = "✗ No response from server. Is the backend running?";
pub const MSG_SEND_FAILED: &str = "✗ Failed to send data";

/// Derived roster counts. Recomputed on every read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Totals {
    pub students: usize,
    pub present: usize,
    pub absent: usize,
}

impl Totals {
    pub fn of(roster: &[Student]) -> Self {
        let students = roster.len();
        let present = roster.iter().filter(|s| s.present).count();
        Self {
            students,
            present,
            absent: students - present,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub class_id: Option<i64>,
    pub date: NaiveDate,
}

#[derive(Debug)]
struct BoardState {
    classes: Vec<ClassSummary>,
    roster: Vec<Student>,
    selection: Selection,
    loading_classes: bool,
    loading_roster: bool,
    submitting: bool,
    roster_generation: u64,
}

impl BoardState {
    fn new(date: NaiveDate) -> Self {
        Self {
            classes: Vec::new(),
            roster: Vec::new(),
            selection: Selection {
                class_id: None,
                date,
            },
            loading_classes: false,
            loading_roster: false,
            submitting: false,
            roster_generation: 0,
        }
    }
}

/// Owned copy of everything a renderer needs.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardSnapshot {
    pub classes: Vec<ClassSummary>,
    pub roster: Vec<Student>,
    pub selection: Selection,
    pub loading_classes: bool,
    pub loading_roster: bool,
    pub submitting: bool,
    pub notification: Option<Notification>,
}

impl BoardSnapshot {
    pub fn totals(&self) -> Totals {
        Totals::of(&self.roster)
    }
}

#[derive(Debug, Clone, Copy)]
enum Busy {
    Classes,
    Roster { generation: u64 },
    Submitting,
}

/// Sets a busy flag for its lifetime. A roster guard only clears the flag
/// while its generation is still current, since a newer load owns it then.
struct BusyGuard<'a> {
    state: &'a Mutex<BoardState>,
    busy: Busy,
}

impl<'a> BusyGuard<'a> {
    fn new(state: &'a Mutex<BoardState>, busy: Busy) -> Self {
        set_busy(&mut lock(state), busy, true);
        Self { state, busy }
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        let mut state = lock(self.state);
        if let Busy::Roster { generation } = self.busy {
            if state.roster_generation != generation {
                return;
            }
        }
        set_busy(&mut state, self.busy, false);
    }
}

fn set_busy(state: &mut BoardState, busy: Busy, value: bool) {
    match busy {
        Busy::Classes => state.loading_classes = value,
        Busy::Roster { .. } => state.loading_roster = value,
        Busy::Submitting => state.submitting = value,
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// The attendance screen: directory, roster, selection and toast, plus the
/// operations a teacher performs on them. Every failure ends up as a
/// notification; nothing here returns an error.
pub struct AttendanceBoard {
    clients: Clients,
    state: Mutex<BoardState>,
    notifier: Notifier,
}

impl AttendanceBoard {
    pub fn new(clients: Clients) -> Self {
        Self::with_notifier(clients, Notifier::new())
    }

    pub fn with_notifier(clients: Clients, notifier: Notifier) -> Self {
        Self {
            clients,
            state: Mutex::new(BoardState::new(Utc::now().date_naive())),
            notifier,
        }
    }

    /// Builds the board and loads the class directory. The roster waits for
    /// a selection.
    pub async fn mount(clients: Clients) -> Self {
        let board = Self::new(clients);
        info!("Attendance board mounted");
        board.load_classes().await;
        board
    }

    fn state(&self) -> MutexGuard<'_, BoardState> {
        lock(&self.state)
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        let state = self.state();
        BoardSnapshot {
            classes: state.classes.clone(),
            roster: state.roster.clone(),
            selection: state.selection.clone(),
            loading_classes: state.loading_classes,
            loading_roster: state.loading_roster,
            submitting: state.submitting,
            notification: self.notifier.current(),
        }
    }

    pub fn totals(&self) -> Totals {
        Totals::of(&self.state().roster)
    }

    pub fn selection(&self) -> Selection {
        self.state().selection.clone()
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn notify(&self, message: impl Into<String>, severity: Severity) {
        self.notifier.notify(message, severity);
    }

    pub async fn load_classes(&self) {
        let _busy = BusyGuard::new(&self.state, Busy::Classes);

        match self.clients.directory.fetch_classes().await {
            Ok(classes) => {
                info!("Loaded {} classes", classes.len());
                self.state().classes = classes;
            }
            Err(e) => {
                error!("Failed to load classes: {}", e);
                self.notify(MSG_CLASSES_FAILED, Severity::Error);
                self.state().classes = ClassSummary::placeholders();
            }
        }
    }

    /// Changes the selected class and reloads the roster. `None` clears the
    /// selection without touching the network.
    pub async fn select_class(&self, class_id: Option<i64>) {
        self.state().selection.class_id = class_id;
        self.load_roster().await;
    }

    pub async fn load_roster(&self) {
        let (class_id, generation) = {
            let mut state = self.state();
            state.roster_generation += 1;
            state.roster.clear();
            match state.selection.class_id {
                Some(id) => (id, state.roster_generation),
                None => {
                    state.loading_roster = false;
                    return;
                }
            }
        };

        let _busy = BusyGuard::new(&self.state, Busy::Roster { generation });
        let result = self.clients.roster.fetch_roster(class_id).await;

        let mut state = self.state();
        if state.roster_generation != generation {
            warn!("Discarding stale roster response for class {}", class_id);
            return;
        }

        let message = match result {
            Ok(entries) => {
                state.roster = entries.into_iter().map(Student::from).collect();
                info!("Loaded {} students for class {}", state.roster.len(), class_id);
                state.roster.is_empty().then_some(MSG_NO_STUDENTS)
            }
            Err(e) => {
                error!("Failed to load students for class {}: {}", class_id, e);
                state.roster.clear();
                if e.is_not_found() {
                    Some(MSG_CLASS_NOT_FOUND)
                } else {
                    Some(MSG_ROSTER_FAILED)
                }
            }
        };
        drop(state);

        if let Some(message) = message {
            self.notify(message, Severity::Error);
        }
    }

    pub fn set_date(&self, date: NaiveDate) {
        debug!("Attendance date set to {}", date);
        self.state().selection.date = date;
    }

    /// Sets one student's flag. Unknown ids are ignored; returns whether a
    /// student matched.
    pub fn toggle_presence(&self, student_id: &StudentId, present: bool) -> bool {
        let mut state = self.state();
        match state.roster.iter_mut().find(|s| &s.id == student_id) {
            Some(student) => {
                student.present = present;
                debug!(
                    "{}: {}",
                    student.name,
                    if present { "PRESENT" } else { "ABSENT" }
                );
                true
            }
            None => {
                debug!("toggle ignored, student {} not in roster", student_id);
                false
            }
        }
    }

    pub fn mark_all_present(&self) {
        self.mark_all(true);
        self.notify(MSG_ALL_PRESENT, Severity::Success);
    }

    pub fn mark_all_absent(&self) {
        self.mark_all(false);
        self.notify(MSG_ALL_ABSENT, Severity::Error);
    }

    fn mark_all(&self, present: bool) {
        for student in self.state().roster.iter_mut() {
            student.present = present;
        }
    }

    /// Sends the day's attendance, then reloads the roster to pick up
    /// whatever the backend normalized.
    pub async fn submit(&self) {
        let prepared = {
            let state = self.state();
            match state.selection.class_id {
                None => Err(MSG_SELECT_CLASS),
                Some(_) if state.roster.is_empty() => Err(MSG_NOTHING_TO_SAVE),
                Some(class_id) => Ok(AttendanceRecord::from_roster(
                    class_id,
                    state.selection.date,
                    &state.roster,
                )),
            }
        };

        let record = match prepared {
            Ok(record) => record,
            Err(message) => {
                warn!("Submit rejected: {}", message);
                self.notify(message, Severity::Error);
                return;
            }
        };

        let _busy = BusyGuard::new(&self.state, Busy::Submitting);
        info!(
            "Saving attendance for class {} on {} ({} students)",
            record.class_id,
            record.date,
            record.entries.len()
        );

        match self.clients.submitter.submit_attendance(&record).await {
            Ok(message) => {
                self.notify(MSG_SAVED, Severity::Success);
                info!("Server response: {}", message.as_deref().unwrap_or("-"));
                self.load_roster().await;
            }
            Err(e) => {
                error!("Failed to save attendance: {}", e);
                self.notify(submit_failure_message(&e), Severity::Error);
            }
        }
    }
}

fn submit_failure_message(e: &ApiError) -> String {
    match e {
        ApiError::Server { .. } | ApiError::Decode(_) => {
            format!("✗ {}", e.server_message().unwrap_or("Server error"))
        }
        ApiError::Transport(_) => MSG_NO_RESPONSE.to_string(),
        ApiError::Request(_) => MSG_SEND_FAILED.to_string(),
    }
}
