use thiserror::Error;

use crate::editor::domain::document::{Document, EditError, Point};
use crate::playback::domain::audio_clip::AudioClip;
use crate::transcript::domain::task::{Task, TaskType};

use super::domain::glossary::{Glossary, GlossaryTerm, TermRequest};
use super::domain::session_status::{SessionStatus, WorkerId};
use super::domain::state_machine::{
    entry_effect, transition, Effect, SessionEvent, SessionPhase, SessionState,
};
use super::domain::transport::{Transport, TransportError};

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("cannot {operation} while {phase}")]
    InvalidState {
        operation: &'static str,
        phase: SessionPhase,
    },
    #[error("worker is not authenticated")]
    NotAuthenticated,
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Edit(#[from] EditError),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequestKind {
    SessionStatus,
    Task,
    Publish,
}

/// Ticket for an outbound request. Only the newest ticket is honoured.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PendingRequest {
    pub generation: u64,
    pub kind: RequestKind,
}

/// Outcome of handing a response back to the controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Delivery {
    /// The response advanced the session; the new state may ask for work.
    Applied(Option<Effect>),
    /// A newer request or transition superseded the response.
    Stale,
}

/// Drives one worker's session: owns the state machine, the transport and
/// the glossary.
///
/// Requests are split into `begin_*` and `complete_*` so responses can be
/// delivered out of order; the blocking `start`, `request_task` and
/// `publish` wrappers run both halves and follow entry effects.
pub struct SessionController {
    transport: Box<dyn Transport>,
    task_types: Vec<TaskType>,
    state: SessionState,
    worker_id: Option<WorkerId>,
    generation: u64,
    pending: Option<PendingRequest>,
    glossary: Glossary,
}

impl SessionController {
    pub fn new(transport: Box<dyn Transport>, task_types: Vec<TaskType>) -> Self {
        Self {
            transport,
            task_types,
            state: SessionState::Initial,
            worker_id: None,
            generation: 0,
            pending: None,
            glossary: Glossary::default(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn phase(&self) -> SessionPhase {
        self.state.phase()
    }

    pub fn worker_id(&self) -> Option<&WorkerId> {
        self.worker_id.as_ref()
    }

    pub fn status(&self) -> Option<&SessionStatus> {
        self.state.status()
    }

    pub fn task(&self) -> Option<&Task> {
        self.state.task()
    }

    pub fn document(&self) -> Option<&Document> {
        self.state.document()
    }

    pub fn document_mut(&mut self) -> Result<&mut Document, SessionError> {
        let phase = self.state.phase();
        self.state
            .document_mut()
            .ok_or(SessionError::InvalidState {
                operation: "edit",
                phase,
            })
    }

    pub fn glossary(&self) -> &Glossary {
        &self.glossary
    }

    pub fn pending(&self) -> Option<PendingRequest> {
        self.pending
    }

    /// Audio for the task in progress, clipped to its words.
    pub fn audio_clip(&self) -> Option<AudioClip> {
        let status = self.state.status()?;
        let task = self.state.task()?;
        Some(AudioClip::for_task(status.audio_url.clone(), task))
    }

    // ── Blocking drivers ─────────────────────────────────────────────

    pub fn authenticate(&mut self) -> Result<&WorkerId, SessionError> {
        let id = self.transport.authenticate(&self.task_types)?;
        log::info!("Authenticated as worker {id}");
        Ok(self.worker_id.insert(id))
    }

    /// Authenticates if needed and runs the session up to a task in
    /// progress.
    pub fn start(&mut self) -> Result<(), SessionError> {
        if self.worker_id.is_none() {
            self.authenticate()?;
        }
        match entry_effect(&self.state) {
            Some(effect) => self.perform(effect),
            None => Err(self.invalid("start")),
        }
    }

    pub fn fetch_session_status(&mut self) -> Result<(), SessionError> {
        let request = self.begin_status_fetch()?;
        let worker_id = self.require_worker()?.clone();
        let result = self.transport.get_session_status(&worker_id);
        let delivery = self.complete_status_fetch(request, result)?;
        self.follow(delivery)
    }

    pub fn request_task(&mut self) -> Result<(), SessionError> {
        let request = self.begin_task_request()?;
        let worker_id = self.require_worker()?.clone();
        let result = self.transport.request_new_task(&worker_id);
        let delivery = self.complete_task_request(request, result)?;
        self.follow(delivery)
    }

    /// Publishes the task in progress, then asks for the next one.
    pub fn publish(&mut self) -> Result<(), SessionError> {
        let (request, task, words) = self.begin_publish()?;
        let worker_id = self.require_worker()?.clone();
        let result = self.transport.publish_task(&task, &words, &worker_id);
        let delivery = self.complete_publish(request, result)?;
        self.follow(delivery)
    }

    /// Re-issues the request the current state waits on: the status fetch
    /// from `Initial`, a task from `Idle`, the publish from `InProgress`.
    pub fn retry(&mut self) -> Result<(), SessionError> {
        log::info!("Retrying from {}", self.phase());
        match self.state.phase() {
            SessionPhase::Initial => self.start(),
            SessionPhase::Idle => self.request_task(),
            SessionPhase::InProgress => self.publish(),
            SessionPhase::FetchingSessionStatus | SessionPhase::Publishing => {
                Err(self.invalid("retry"))
            }
        }
    }

    // ── Split requests ───────────────────────────────────────────────

    pub fn begin_status_fetch(&mut self) -> Result<PendingRequest, SessionError> {
        if self.phase() != SessionPhase::Initial {
            return Err(self.invalid("fetch the session status"));
        }
        self.require_worker()?;
        self.dispatch(SessionEvent::FetchSessionStatus);
        Ok(self.issue(RequestKind::SessionStatus))
    }

    pub fn complete_status_fetch(
        &mut self,
        request: PendingRequest,
        result: Result<SessionStatus, TransportError>,
    ) -> Result<Delivery, SessionError> {
        if !self.accepts(
            request,
            RequestKind::SessionStatus,
            &[SessionPhase::FetchingSessionStatus],
        ) {
            return Ok(Delivery::Stale);
        }
        self.pending = None;
        match result {
            Ok(status) => Ok(Delivery::Applied(
                self.dispatch(SessionEvent::SetSessionStatus(status)),
            )),
            Err(e) => {
                log::warn!("Fetching session status failed: {e}");
                self.dispatch(SessionEvent::SessionStatusFailed);
                Err(e.into())
            }
        }
    }

    pub fn begin_task_request(&mut self) -> Result<PendingRequest, SessionError> {
        match self.phase() {
            SessionPhase::Idle | SessionPhase::InProgress => {}
            _ => return Err(self.invalid("request a task")),
        }
        self.require_worker()?;
        self.dispatch(SessionEvent::RequestTask);
        Ok(self.issue(RequestKind::Task))
    }

    pub fn complete_task_request(
        &mut self,
        request: PendingRequest,
        result: Result<Task, TransportError>,
    ) -> Result<Delivery, SessionError> {
        if !self.accepts(
            request,
            RequestKind::Task,
            &[SessionPhase::Idle, SessionPhase::InProgress],
        ) {
            return Ok(Delivery::Stale);
        }
        self.pending = None;
        match result {
            Ok(task) => {
                log::info!("Received {} task {}", task.task_type, task.id);
                Ok(Delivery::Applied(self.dispatch(SessionEvent::SetTask(task))))
            }
            Err(e) => {
                log::warn!("Requesting a task failed: {e}");
                Err(e.into())
            }
        }
    }

    /// Freezes the document and returns what must be sent.
    pub fn begin_publish(&mut self) -> Result<(PendingRequest, Task, Vec<String>), SessionError> {
        if self.phase() != SessionPhase::InProgress {
            return Err(self.invalid("publish"));
        }
        self.require_worker()?;
        self.dispatch(SessionEvent::PublishTask);
        let (task, words) = match (self.state.task(), self.state.document()) {
            (Some(task), Some(document)) => (task.clone(), document.editable_tokens()),
            _ => return Err(self.invalid("publish")),
        };
        Ok((self.issue(RequestKind::Publish), task, words))
    }

    pub fn complete_publish(
        &mut self,
        request: PendingRequest,
        result: Result<(), TransportError>,
    ) -> Result<Delivery, SessionError> {
        if !self.accepts(request, RequestKind::Publish, &[SessionPhase::Publishing]) {
            return Ok(Delivery::Stale);
        }
        self.pending = None;
        match result {
            Ok(()) => {
                log::info!("Task published");
                Ok(Delivery::Applied(self.dispatch(SessionEvent::TaskPublished)))
            }
            Err(e) => {
                log::warn!("Publishing failed, edits kept: {e}");
                self.dispatch(SessionEvent::PublishFailed);
                Err(e.into())
            }
        }
    }

    // ── Glossary and editing ─────────────────────────────────────────

    pub fn load_glossary(&mut self) -> Result<&Glossary, SessionError> {
        self.glossary = self.transport.get_glossary()?;
        log::debug!("Loaded {} glossary terms", self.glossary.len());
        Ok(&self.glossary)
    }

    pub fn add_glossary_term(&mut self, body: &TermRequest) -> Result<GlossaryTerm, SessionError> {
        let term = self.transport.add_glossary_term(body)?;
        self.glossary.insert(term.clone());
        Ok(term)
    }

    /// Inserts a glossary term's text at the document caret.
    pub fn insert_term(&mut self, term: &GlossaryTerm) -> Result<Point, SessionError> {
        Ok(self.document_mut()?.insert_at_caret(&term.text)?)
    }

    // ── Internals ────────────────────────────────────────────────────

    /// Applies `event` and returns the entry effect of a newly entered
    /// state.
    fn dispatch(&mut self, event: SessionEvent) -> Option<Effect> {
        let before = self.state.phase();
        let state = std::mem::replace(&mut self.state, SessionState::Initial);
        self.state = transition(state, event);
        let after = self.state.phase();
        if before == after {
            return None;
        }
        log::debug!("Session {before} -> {after}");
        entry_effect(&self.state)
    }

    fn issue(&mut self, kind: RequestKind) -> PendingRequest {
        self.generation += 1;
        let request = PendingRequest {
            generation: self.generation,
            kind,
        };
        self.pending = Some(request);
        request
    }

    fn accepts(&self, request: PendingRequest, kind: RequestKind, phases: &[SessionPhase]) -> bool {
        let current = self.pending == Some(request) && request.kind == kind;
        if current && phases.contains(&self.phase()) {
            return true;
        }
        log::warn!(
            "Dropping stale {:?} response (generation {}, current {}, state {})",
            kind,
            request.generation,
            self.generation,
            self.phase()
        );
        false
    }

    fn follow(&mut self, delivery: Delivery) -> Result<(), SessionError> {
        match delivery {
            Delivery::Applied(Some(effect)) => self.perform(effect),
            Delivery::Applied(None) | Delivery::Stale => Ok(()),
        }
    }

    fn perform(&mut self, effect: Effect) -> Result<(), SessionError> {
        match effect {
            Effect::FetchSessionStatus => self.fetch_session_status(),
            Effect::RequestTask => self.request_task(),
        }
    }

    fn require_worker(&self) -> Result<&WorkerId, SessionError> {
        self.worker_id.as_ref().ok_or(SessionError::NotAuthenticated)
    }

    fn invalid(&self, operation: &'static str) -> SessionError {
        SessionError::InvalidState {
            operation,
            phase: self.phase(),
        }
    }
}
