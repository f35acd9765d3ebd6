use thiserror::Error;

use crate::transcript::domain::task::{Task, TaskType};

use super::glossary::{Glossary, GlossaryTerm, TermRequest};
use super::session_status::{SessionStatus, WorkerId};

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("request to {url} failed: {message}")]
    Request { url: String, message: String },
    #[error("server answered {status} for {url}")]
    Status { url: String, status: u16 },
    #[error("malformed response from {url}: {message}")]
    Decode { url: String, message: String },
}

/// Domain interface to the task server.
pub trait Transport: Send {
    fn authenticate(&self, task_types: &[TaskType]) -> Result<WorkerId, TransportError>;

    fn get_session_status(&self, worker_id: &WorkerId) -> Result<SessionStatus, TransportError>;

    fn request_new_task(&self, worker_id: &WorkerId) -> Result<Task, TransportError>;

    /// Sends the edited word list for `task`.
    fn publish_task(
        &self,
        task: &Task,
        words: &[String],
        worker_id: &WorkerId,
    ) -> Result<(), TransportError>;

    fn get_glossary(&self) -> Result<Glossary, TransportError>;

    fn add_glossary_term(&self, body: &TermRequest) -> Result<GlossaryTerm, TransportError>;
}
