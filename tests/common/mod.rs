#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use attendance_board::client::{AttendanceSubmitter, ClassDirectoryClient, RosterClient};
use attendance_board::error::ApiError;
use attendance_board::models::{AttendanceRecord, ClassSummary, RosterEntry, StudentId};
use attendance_board::state::Clients;
use tokio::sync::Notify;

#[derive(Debug, Clone)]
pub enum Failure {
    Transport,
    Request,
    Server(u16, Option<String>),
}

impl Failure {
    fn to_error(&self) -> ApiError {
        match self {
            Failure::Transport => ApiError::Transport("connection refused".to_string()),
            Failure::Request => ApiError::Request("bad url".to_string()),
            Failure::Server(status, message) => ApiError::Server {
                status: *status,
                message: message.clone(),
            },
        }
    }
}

/// Backend double with canned answers, call counters and optional gates
/// that hold a roster response until released.
pub struct ScriptedClient {
    pub classes: Mutex<Result<Vec<ClassSummary>, Failure>>,
    pub rosters: Mutex<HashMap<i64, Result<Vec<RosterEntry>, Failure>>>,
    pub submit_reply: Mutex<Result<Option<String>, Failure>>,
    pub gates: Mutex<HashMap<i64, Arc<Notify>>>,
    pub class_gate: Mutex<Option<Arc<Notify>>>,
    pub submit_gate: Mutex<Option<Arc<Notify>>>,
    pub class_calls: AtomicUsize,
    pub roster_calls: AtomicUsize,
    pub submitted: Mutex<Vec<AttendanceRecord>>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self {
            classes: Mutex::new(Ok(vec![
                ClassSummary::new(1, "1A"),
                ClassSummary::new(2, "1B"),
            ])),
            rosters: Mutex::new(HashMap::new()),
            submit_reply: Mutex::new(Ok(Some("saved".to_string()))),
            gates: Mutex::new(HashMap::new()),
            class_gate: Mutex::new(None),
            submit_gate: Mutex::new(None),
            class_calls: AtomicUsize::new(0),
            roster_calls: AtomicUsize::new(0),
            submitted: Mutex::new(Vec::new()),
        }
    }

    pub fn with_roster(self, class_id: i64, roster: Vec<RosterEntry>) -> Self {
        self.rosters.lock().unwrap().insert(class_id, Ok(roster));
        self
    }

    pub fn with_roster_failure(self, class_id: i64, failure: Failure) -> Self {
        self.rosters.lock().unwrap().insert(class_id, Err(failure));
        self
    }

    pub fn with_class_failure(self, failure: Failure) -> Self {
        *self.classes.lock().unwrap() = Err(failure);
        self
    }

    pub fn with_submit_reply(self, reply: Result<Option<String>, Failure>) -> Self {
        *self.submit_reply.lock().unwrap() = reply;
        self
    }

    /// Holds roster responses for `class_id` until the returned handle is notified.
    pub fn gate(&self, class_id: i64) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.gates.lock().unwrap().insert(class_id, gate.clone());
        gate
    }

    /// Holds the class directory response until released.
    pub fn gate_classes(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.class_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    /// Holds the submit response until released.
    pub fn gate_submit(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.submit_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn roster_calls(&self) -> usize {
        self.roster_calls.load(Ordering::SeqCst)
    }

    pub fn class_calls(&self) -> usize {
        self.class_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ClassDirectoryClient for ScriptedClient {
    async fn fetch_classes(&self) -> Result<Vec<ClassSummary>, ApiError> {
        self.class_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.class_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.classes.lock().unwrap().clone().map_err(|f| f.to_error())
    }
}

#[async_trait]
impl RosterClient for ScriptedClient {
    async fn fetch_roster(&self, class_id: i64) -> Result<Vec<RosterEntry>, ApiError> {
        self.roster_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.gates.lock().unwrap().get(&class_id).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        match self.rosters.lock().unwrap().get(&class_id) {
            Some(reply) => reply.clone().map_err(|f| f.to_error()),
            None => Err(ApiError::not_found("Route not found")),
        }
    }
}

#[async_trait]
impl AttendanceSubmitter for ScriptedClient {
    async fn submit_attendance(&self, record: &AttendanceRecord) -> Result<Option<String>, ApiError> {
        self.submitted.lock().unwrap().push(record.clone());
        let gate = self.submit_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.submit_reply.lock().unwrap().clone().map_err(|f| f.to_error())
    }
}

pub fn clients(client: &Arc<ScriptedClient>) -> Clients {
    Clients::from_shared(client.clone())
}

pub fn entry(id: impl Into<StudentId>, name: &str, present: Option<bool>) -> RosterEntry {
    RosterEntry {
        id: id.into(),
        name: name.to_string(),
        enrollment_code: None,
        class_id: None,
        present,
    }
}

/// Lets spawned tasks run to their next await point.
pub async fn settle() {
    for _ in 0..5 {
        tokio::task::yield_now().await;
    }
}
