use reqwest::blocking::{Client, RequestBuilder};
use reqwest::Url;
use serde::de::DeserializeOwned;

use crate::network::domain::responses::{
    AuthRequest, AuthResponse, GlossaryJson, GlossaryTermJson, NewTaskRequest, PublishPayload,
    TaskJson,
};
use crate::session::domain::glossary::{Glossary, GlossaryTerm, TermRequest};
use crate::session::domain::session_status::{SessionStatus, WorkerId};
use crate::session::domain::transport::{Transport, TransportError};
use crate::transcript::domain::task::{Task, TaskType};

/// Blocking JSON client for the task server.
pub struct HttpTransport {
    client: Client,
    base_url: Url,
}

impl HttpTransport {
    pub fn new(base_url: &str) -> Result<Self, TransportError> {
        let parsed = Url::parse(base_url).map_err(|e| TransportError::Request {
            url: base_url.to_string(),
            message: e.to_string(),
        })?;
        if parsed.cannot_be_a_base() {
            return Err(TransportError::Request {
                url: base_url.to_string(),
                message: "base url cannot hold a path".to_string(),
            });
        }
        let client = Client::builder()
            .build()
            .map_err(|e| TransportError::Request {
                url: base_url.to_string(),
                message: e.to_string(),
            })?;
        Ok(Self {
            client,
            base_url: parsed,
        })
    }

    /// Appends path segments to the base url, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, TransportError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| TransportError::Request {
                url: self.base_url.to_string(),
                message: "base url cannot hold a path".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn send(&self, request: RequestBuilder, url: &str) -> Result<String, TransportError> {
        log::debug!("HTTP {url}");
        let response = request.send().map_err(|e| TransportError::Request {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        response.text().map_err(|e| TransportError::Request {
            url: url.to_string(),
            message: e.to_string(),
        })
    }

    fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        url: &str,
    ) -> Result<T, TransportError> {
        let body = self.send(request, url)?;
        serde_json::from_str(&body).map_err(|e| TransportError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}

impl Transport for HttpTransport {
    fn authenticate(&self, task_types: &[TaskType]) -> Result<WorkerId, TransportError> {
        let url = self.endpoint(&["auth"])?;
        let body = AuthRequest {
            task_types: task_types.to_vec(),
        };
        let response: AuthResponse =
            self.send_json(self.client.post(url.as_str()).json(&body), url.as_str())?;
        Ok(response.id)
    }

    fn get_session_status(&self, worker_id: &WorkerId) -> Result<SessionStatus, TransportError> {
        let url = self.endpoint(&["workers", worker_id.as_str(), "status"])?;
        self.send_json(self.client.get(url.as_str()), url.as_str())
    }

    fn request_new_task(&self, worker_id: &WorkerId) -> Result<Task, TransportError> {
        let url = self.endpoint(&["tasks"])?;
        let body = NewTaskRequest {
            worker_id: worker_id.clone(),
        };
        let task: TaskJson =
            self.send_json(self.client.post(url.as_str()).json(&body), url.as_str())?;
        Ok(task.into())
    }

    fn publish_task(
        &self,
        task: &Task,
        words: &[String],
        worker_id: &WorkerId,
    ) -> Result<(), TransportError> {
        let id = task.id.to_string();
        let url = self.endpoint(&["tasks", &id])?;
        let payload = PublishPayload::new(task, words, worker_id);
        self.send(self.client.put(url.as_str()).json(&payload), url.as_str())?;
        Ok(())
    }

    fn get_glossary(&self) -> Result<Glossary, TransportError> {
        let url = self.endpoint(&["glossary"])?;
        let glossary: GlossaryJson = self.send_json(self.client.get(url.as_str()), url.as_str())?;
        Ok(glossary.into())
    }

    fn add_glossary_term(&self, body: &TermRequest) -> Result<GlossaryTerm, TransportError> {
        let url = self.endpoint(&["glossary"])?;
        let term: GlossaryTermJson =
            self.send_json(self.client.post(url.as_str()).json(body), url.as_str())?;
        Ok(term.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    /// Serves one canned response and hands back the request line and body.
    fn serve_once(status: &str, body: &str) -> (String, JoinHandle<(String, String)>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream);
            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();
            let mut content_length = 0;
            loop {
                let mut header = String::new();
                reader.read_line(&mut header).unwrap();
                if header == "\r\n" || header.is_empty() {
                    break;
                }
                if let Some((name, value)) = header.split_once(':') {
                    if name.eq_ignore_ascii_case("content-length") {
                        content_length = value.trim().parse().unwrap();
                    }
                }
            }
            let mut request_body = vec![0; content_length];
            reader.read_exact(&mut request_body).unwrap();
            reader.get_mut().write_all(response.as_bytes()).unwrap();
            (
                request_line.trim_end().to_string(),
                String::from_utf8(request_body).unwrap(),
            )
        });
        (base, handle)
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            HttpTransport::new("not a url"),
            Err(TransportError::Request { .. })
        ));
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let transport = HttpTransport::new("http://localhost:8000/").unwrap();
        assert_eq!(
            transport.endpoint(&["tasks"]).unwrap().as_str(),
            "http://localhost:8000/tasks"
        );
        let nested = HttpTransport::new("http://localhost:8000/api/").unwrap();
        assert_eq!(
            nested.endpoint(&["tasks", "42"]).unwrap().as_str(),
            "http://localhost:8000/api/tasks/42"
        );
    }

    #[test]
    fn test_base_url_without_path_is_rejected() {
        assert!(matches!(
            HttpTransport::new("mailto:ops@example.com"),
            Err(TransportError::Request { .. })
        ));
    }

    #[test]
    fn test_worker_id_is_escaped_in_path() {
        let (base, server) = serve_once(
            "200 OK",
            r#"{"worker_id": "w/1 x", "active": true, "started_at": "2024-03-01T09:30:00Z", "glossary_modified_at": "2024-02-28T18:00:00Z", "audio_url": "https://cdn.example/a.wav"}"#,
        );
        let transport = HttpTransport::new(&base).unwrap();
        let status = transport
            .get_session_status(&WorkerId::new("w/1 x"))
            .unwrap();
        assert_eq!(status.worker_id, WorkerId::new("w/1 x"));
        assert_eq!(server.join().unwrap().0, "GET /workers/w%2F1%20x/status HTTP/1.1");
    }

    #[test]
    fn test_authenticate_posts_task_types() {
        let (base, server) = serve_once("200 OK", r#"{"id": "w-9"}"#);
        let transport = HttpTransport::new(&base).unwrap();
        let id = transport.authenticate(&[TaskType::Review]).unwrap();
        assert_eq!(id, WorkerId::new("w-9"));

        let (line, body) = server.join().unwrap();
        assert_eq!(line, "POST /auth HTTP/1.1");
        assert_eq!(body, r#"{"task_types":["review"]}"#);
    }

    #[test]
    fn test_get_glossary_decodes_gloss() {
        let (base, server) = serve_once(
            "200 OK",
            r#"{"gloss": [{"id": "1", "text": "Rust", "comment": null}]}"#,
        );
        let transport = HttpTransport::new(&base).unwrap();
        let glossary = transport.get_glossary().unwrap();
        assert_eq!(glossary.terms[0].text, "Rust");
        assert_eq!(server.join().unwrap().0, "GET /glossary HTTP/1.1");
    }

    #[test]
    fn test_add_glossary_term_posts_fields() {
        let (base, server) = serve_once(
            "201 Created",
            r#"{"id": "7", "text": "Tokio", "comment": "runtime", "url": null}"#,
        );
        let transport = HttpTransport::new(&base).unwrap();
        let mut request = TermRequest::new("Tokio");
        request.fields.comment = Some("runtime".to_string());
        let term = transport.add_glossary_term(&request).unwrap();
        assert_eq!(term.id, "7");
        assert_eq!(term.fields.comment.as_deref(), Some("runtime"));

        let (line, body) = server.join().unwrap();
        assert_eq!(line, "POST /glossary HTTP/1.1");
        assert_eq!(
            body,
            r#"{"text":"Tokio","fields":{"comment":"runtime","url":null}}"#
        );
    }

    #[test]
    fn test_error_status_is_reported() {
        let (base, server) = serve_once("503 Service Unavailable", "{}");
        let transport = HttpTransport::new(&base).unwrap();
        let err = transport.request_new_task(&WorkerId::new("w-1")).unwrap_err();
        assert!(matches!(err, TransportError::Status { status: 503, .. }));
        server.join().unwrap();
    }

    #[test]
    fn test_malformed_task_is_a_decode_error() {
        let (base, server) = serve_once("200 OK", r#"{"id": "nope"}"#);
        let transport = HttpTransport::new(&base).unwrap();
        let err = transport.request_new_task(&WorkerId::new("w-1")).unwrap_err();
        assert!(matches!(err, TransportError::Decode { .. }));
        let (line, body) = server.join().unwrap();
        assert_eq!(line, "POST /tasks HTTP/1.1");
        assert_eq!(body, r#"{"worker_id":"w-1"}"#);
    }
}
