#![allow(dead_code)]

use async_trait::async_trait;
use ptsl_client::transport::{PtslTransport, ResponseStream};
use ptsl_client::{CommandId, Dispatcher, Permissions, SessionContext};
use ptsl_protos::{Request, Response, ResponseHeader, TaskStatus as WireStatus};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tonic::Status;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn header(command: CommandId, status: WireStatus, task_id: &str) -> ResponseHeader {
    ResponseHeader {
        task_id: task_id.to_string(),
        command: command as i32,
        status: status as i32,
        progress: 0,
        version: 5,
        version_minor: 0,
        version_revision: 0,
    }
}

pub fn reply(command: CommandId, status: WireStatus, body: &str) -> Response {
    Response {
        header: Some(header(command, status, "")),
        response_body_json: body.to_string(),
        response_error_json: String::new(),
    }
}

pub fn task_reply(command: CommandId, status: WireStatus, task_id: &str, body: &str) -> Response {
    Response {
        header: Some(header(command, status, task_id)),
        response_body_json: body.to_string(),
        response_error_json: String::new(),
    }
}

pub fn error_reply(command: CommandId, error_json: &str) -> Response {
    Response {
        header: Some(header(command, WireStatus::Failed, "")),
        response_body_json: String::new(),
        response_error_json: error_json.to_string(),
    }
}

pub fn headerless() -> Response {
    Response {
        header: None,
        response_body_json: String::new(),
        response_error_json: String::new(),
    }
}

/// A `GetTaskStatus` reply: the header carries the status, the body the progress.
pub fn poll_reply(status: WireStatus, progress: i32) -> Response {
    let mut response = reply(
        CommandId::GetTaskStatus,
        status,
        &format!(r#"{{"progress":{}}}"#, progress),
    );
    if let Some(header) = response.header.as_mut() {
        header.progress = progress;
    }
    response
}

type Scripted = (Duration, Result<Response, Status>);
type PollFn = Box<dyn Fn(usize) -> Result<Response, Status> + Send + Sync>;

/// In-memory host. Unary replies and streams are consumed in order;
/// `GetTaskStatus` polls are answered by a closure given the poll number.
pub struct ScriptedTransport {
    unary: Mutex<VecDeque<Scripted>>,
    streams: Mutex<VecDeque<Vec<Scripted>>>,
    on_poll: PollFn,
    polls: AtomicUsize,
    requests: Mutex<Vec<Request>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self {
            unary: Mutex::new(VecDeque::new()),
            streams: Mutex::new(VecDeque::new()),
            on_poll: Box::new(|_| Ok(poll_reply(WireStatus::InProgress, 50))),
            polls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_poll_replies(
        mut self,
        on_poll: impl Fn(usize) -> Result<Response, Status> + Send + Sync + 'static,
    ) -> Self {
        self.on_poll = Box::new(on_poll);
        self
    }

    pub fn push_unary(self, response: Response) -> Self {
        self.push_unary_after(Duration::ZERO, Ok(response))
    }

    pub fn push_unary_after(self, delay: Duration, response: Result<Response, Status>) -> Self {
        self.unary.lock().unwrap().push_back((delay, response));
        self
    }

    pub fn push_stream(self, events: Vec<Scripted>) -> Self {
        self.streams.lock().unwrap().push_back(events);
        self
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }

    /// Requests other than task status polls.
    pub fn command_requests(&self) -> Vec<Request> {
        self.requests()
            .into_iter()
            .filter(|r| command_of(r) != CommandId::GetTaskStatus)
            .collect()
    }

    pub fn poll_count(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }
}

pub fn command_of(request: &Request) -> CommandId {
    let command = request.header.as_ref().map(|h| h.command).unwrap_or_default();
    CommandId::try_from(command).unwrap()
}

#[async_trait]
impl PtslTransport for ScriptedTransport {
    async fn unary(&self, request: Request) -> Result<Response, Status> {
        let is_poll = command_of(&request) == CommandId::GetTaskStatus;
        self.requests.lock().unwrap().push(request);

        if is_poll {
            let n = self.polls.fetch_add(1, Ordering::SeqCst) + 1;
            return (self.on_poll)(n);
        }

        let next = self.unary.lock().unwrap().pop_front();
        match next {
            Some((delay, response)) => {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                response
            }
            None => Err(Status::unavailable("no scripted reply")),
        }
    }

    async fn server_streaming(&self, request: Request) -> Result<ResponseStream, Status> {
        self.requests.lock().unwrap().push(request);
        let events = self
            .streams
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| Status::unavailable("no scripted stream"))?;

        let stream = async_stream::stream! {
            for (delay, event) in events {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                yield event;
            }
        };
        Ok(Box::pin(stream))
    }
}

/// A dispatcher whose host already passed the readiness check.
pub fn ready_dispatcher(transport: Arc<ScriptedTransport>) -> Dispatcher {
    let session = Arc::new(SessionContext::new());
    session.set_host_ready(true);
    Dispatcher::new(transport, session)
        .with_permissions(Permissions::all())
        .with_poll_interval(Duration::from_millis(10))
}
