use crate::editor::domain::document::Document;
use crate::transcript::domain::task::Task;

use super::session_status::SessionStatus;

/// Where a worker's session stands. Later states carry what earlier ones
/// fetched; a task in progress owns the document built from it.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionState {
    Initial,
    FetchingSessionStatus,
    Idle {
        status: SessionStatus,
    },
    InProgress {
        status: SessionStatus,
        task: Task,
        document: Document,
    },
    Publishing {
        status: SessionStatus,
        task: Task,
        document: Document,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub enum SessionEvent {
    FetchSessionStatus,
    SetSessionStatus(SessionStatus),
    SessionStatusFailed,
    RequestTask,
    SetTask(Task),
    PublishTask,
    TaskPublished,
    PublishFailed,
}

impl SessionEvent {
    pub fn name(&self) -> &'static str {
        match self {
            SessionEvent::FetchSessionStatus => "fetch-session-status",
            SessionEvent::SetSessionStatus(_) => "set-session-status",
            SessionEvent::SessionStatusFailed => "session-status-failed",
            SessionEvent::RequestTask => "request-task",
            SessionEvent::SetTask(_) => "set-task",
            SessionEvent::PublishTask => "publish-task",
            SessionEvent::TaskPublished => "task-published",
            SessionEvent::PublishFailed => "publish-failed",
        }
    }
}

/// Data-free view of a [`SessionState`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SessionPhase {
    Initial,
    FetchingSessionStatus,
    Idle,
    InProgress,
    Publishing,
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SessionPhase::Initial => "initial",
            SessionPhase::FetchingSessionStatus => "fetching-session-status",
            SessionPhase::Idle => "idle",
            SessionPhase::InProgress => "inprogress",
            SessionPhase::Publishing => "publishing",
        };
        f.write_str(name)
    }
}

/// Work a state asks for when it is entered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Effect {
    FetchSessionStatus,
    RequestTask,
}

impl SessionState {
    pub fn phase(&self) -> SessionPhase {
        match self {
            SessionState::Initial => SessionPhase::Initial,
            SessionState::FetchingSessionStatus => SessionPhase::FetchingSessionStatus,
            SessionState::Idle { .. } => SessionPhase::Idle,
            SessionState::InProgress { .. } => SessionPhase::InProgress,
            SessionState::Publishing { .. } => SessionPhase::Publishing,
        }
    }

    pub fn status(&self) -> Option<&SessionStatus> {
        match self {
            SessionState::Initial | SessionState::FetchingSessionStatus => None,
            SessionState::Idle { status }
            | SessionState::InProgress { status, .. }
            | SessionState::Publishing { status, .. } => Some(status),
        }
    }

    pub fn task(&self) -> Option<&Task> {
        match self {
            SessionState::InProgress { task, .. } | SessionState::Publishing { task, .. } => {
                Some(task)
            }
            _ => None,
        }
    }

    pub fn document(&self) -> Option<&Document> {
        match self {
            SessionState::InProgress { document, .. }
            | SessionState::Publishing { document, .. } => Some(document),
            _ => None,
        }
    }

    /// The document, while it may still be edited.
    pub fn document_mut(&mut self) -> Option<&mut Document> {
        match self {
            SessionState::InProgress { document, .. } => Some(document),
            _ => None,
        }
    }
}

/// Applies `event` to `state`. Events the state does not handle leave it
/// unchanged.
pub fn transition(state: SessionState, event: SessionEvent) -> SessionState {
    use SessionEvent as E;
    use SessionState as S;

    match (state, event) {
        (S::Initial, E::FetchSessionStatus) => S::FetchingSessionStatus,
        (S::FetchingSessionStatus, E::SetSessionStatus(status)) => S::Idle { status },
        (S::FetchingSessionStatus, E::SessionStatusFailed) => S::Initial,
        (state @ S::Idle { .. }, E::RequestTask) => state,
        (S::Idle { status } | S::InProgress { status, .. }, E::SetTask(task)) => {
            let document = Document::from_task(&task);
            S::InProgress {
                status,
                task,
                document,
            }
        }
        (
            S::InProgress {
                status,
                task,
                document,
            },
            E::PublishTask,
        ) => S::Publishing {
            status,
            task,
            document,
        },
        (S::Publishing { status, .. }, E::TaskPublished) => S::Idle { status },
        (
            S::Publishing {
                status,
                task,
                document,
            },
            E::PublishFailed,
        ) => S::InProgress {
            status,
            task,
            document,
        },
        (state, event) => {
            log::debug!("Ignoring {} while {}", event.name(), state.phase());
            state
        }
    }
}

pub fn entry_effect(state: &SessionState) -> Option<Effect> {
    match state {
        SessionState::Initial => Some(Effect::FetchSessionStatus),
        SessionState::Idle { .. } => Some(Effect::RequestTask),
        _ => None,
    }
}
