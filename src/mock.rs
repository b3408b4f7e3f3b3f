use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use bytes::Bytes;
use reqwest::Method;

use super::adapter::{
    RestBytes, RestError, RestErrorKind, RestFuture, RestRequest, RestResponse, RestResult,
    RestTransport,
};

/// Request state of the mock, mirroring what a live transport would be doing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MockTransportState {
    Idle,
    Busy,
    Error,
}

#[derive(Clone, Debug, Default)]
pub enum MockBehavior {
    #[default]
    Pass,
    Delay(Duration),
    ConnectError {
        reason: String,
    },
    SendError {
        reason: String,
    },
    ReceiveError {
        reason: String,
    },
    TimeoutError {
        reason: String,
    },
    InternalError {
        reason: String,
    },
}

impl MockBehavior {
    pub fn pass() -> Self {
        Self::Pass
    }

    pub fn delay(ms: u64) -> Self {
        Self::Delay(Duration::from_millis(ms))
    }

    pub fn connect_error(reason: impl Into<String>) -> Self {
        Self::ConnectError {
            reason: reason.into(),
        }
    }

    pub fn send_error(reason: impl Into<String>) -> Self {
        Self::SendError {
            reason: reason.into(),
        }
    }

    pub fn receive_error(reason: impl Into<String>) -> Self {
        Self::ReceiveError {
            reason: reason.into(),
        }
    }

    pub fn timeout_error(reason: impl Into<String>) -> Self {
        Self::TimeoutError {
            reason: reason.into(),
        }
    }

    pub fn internal_error(reason: impl Into<String>) -> Self {
        Self::InternalError {
            reason: reason.into(),
        }
    }

    fn failure(&self) -> Option<(RestErrorKind, &str)> {
        match self {
            Self::ConnectError { reason } => Some((RestErrorKind::Connect, reason)),
            Self::SendError { reason } => Some((RestErrorKind::Send, reason)),
            Self::ReceiveError { reason } => Some((RestErrorKind::Receive, reason)),
            Self::TimeoutError { reason } => Some((RestErrorKind::Timeout, reason)),
            Self::InternalError { reason } => Some((RestErrorKind::Internal, reason)),
            Self::Pass | Self::Delay(_) => None,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct MockBehaviorPlan {
    request: VecDeque<MockBehavior>,
}

impl MockBehaviorPlan {
    pub fn push(&mut self, behavior: MockBehavior) -> &mut Self {
        self.request.push_back(behavior);
        self
    }

    fn pop(&mut self) -> MockBehavior {
        self.request.pop_front().unwrap_or_default()
    }
}

#[derive(Clone, Debug)]
pub struct MockResponse {
    pub status: u16,
    pub body: RestBytes,
}

impl MockResponse {
    pub fn new(status: u16, body: impl Into<RestBytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn text(status: u16, body: impl Into<String>) -> Self {
        Self::new(status, body.into())
    }
}

#[derive(Clone, Debug)]
pub struct MockRestStateSnapshot {
    pub state: MockTransportState,
    pub request_count: usize,
    pub last_url: Option<String>,
    pub last_status: Option<u16>,
    pub behavior_remaining: usize,
    pub response_queue_len: usize,
    pub last_error: Option<String>,
}

#[derive(Debug)]
struct MockRestAdapterState {
    state: MockTransportState,
    request_count: usize,
    last_url: Option<String>,
    last_status: Option<u16>,
    behavior_plan: MockBehaviorPlan,
    default_response_queue: VecDeque<MockResponse>,
    route_response_queues: HashMap<(Method, String), VecDeque<MockResponse>>,
    outbound_log: Vec<RestRequest>,
    last_error: Option<String>,
}

impl MockRestAdapterState {
    fn snapshot(&self) -> MockRestStateSnapshot {
        MockRestStateSnapshot {
            state: self.state,
            request_count: self.request_count,
            last_url: self.last_url.clone(),
            last_status: self.last_status,
            behavior_remaining: self.behavior_plan.request.len(),
            response_queue_len: self.default_response_queue.len()
                + self.route_response_queues.values().map(VecDeque::len).sum::<usize>(),
            last_error: self.last_error.clone(),
        }
    }

    fn next_response(&mut self, request: &RestRequest) -> Option<MockResponse> {
        let route_key = (request.method.clone(), request.url.clone());
        if let Some(response) = self
            .route_response_queues
            .get_mut(&route_key)
            .and_then(VecDeque::pop_front)
        {
            return Some(response);
        }
        self.default_response_queue.pop_front()
    }
}

impl Default for MockRestAdapterState {
    fn default() -> Self {
        Self {
            state: MockTransportState::Idle,
            request_count: 0,
            last_url: None,
            last_status: None,
            behavior_plan: MockBehaviorPlan::default(),
            default_response_queue: VecDeque::new(),
            route_response_queues: HashMap::new(),
            outbound_log: Vec::new(),
            last_error: None,
        }
    }
}

/// In-memory transport. Records every outbound request and answers from
/// queued responses; an empty queue answers `200` with an empty body.
#[derive(Clone, Debug)]
pub struct MockRestAdapter {
    state: Arc<Mutex<MockRestAdapterState>>,
}

impl MockRestAdapter {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockRestAdapterState::default())),
        }
    }

    pub fn with_behavior_plan(behavior_plan: MockBehaviorPlan) -> Self {
        let state = MockRestAdapterState {
            behavior_plan,
            ..MockRestAdapterState::default()
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub fn with_behavior(behavior: MockBehavior) -> Self {
        let mut plan = MockBehaviorPlan::default();
        plan.push(behavior);
        Self::with_behavior_plan(plan)
    }

    pub fn snapshot(&self) -> MockRestStateSnapshot {
        self.state
            .lock()
            .expect("mock-restapi mutex poisoned while taking snapshot")
            .snapshot()
    }

    pub fn queue_response(&self, response: MockResponse) {
        self.state
            .lock()
            .expect("mock-restapi mutex poisoned while queueing response")
            .default_response_queue
            .push_back(response);
    }

    pub fn queue_response_for(
        &self,
        method: Method,
        url: impl Into<String>,
        response: MockResponse,
    ) {
        let key = (method, url.into());
        self.state
            .lock()
            .expect("mock-restapi mutex poisoned while queueing response by route")
            .route_response_queues
            .entry(key)
            .or_default()
            .push_back(response);
    }

    pub fn queue_post_response(&self, url: impl Into<String>, response: MockResponse) {
        self.queue_response_for(Method::POST, url, response);
    }

    pub fn outbound_requests(&self) -> Vec<RestRequest> {
        self.state
            .lock()
            .expect("mock-restapi mutex poisoned while reading outbound log")
            .outbound_log
            .clone()
    }

    pub fn outbound_count(&self) -> usize {
        self.state
            .lock()
            .expect("mock-restapi mutex poisoned while reading outbound count")
            .outbound_log
            .len()
    }

    fn record_error(&self, kind: RestErrorKind, message: &str) -> RestError {
        let mut state = self
            .state
            .lock()
            .expect("mock-restapi mutex poisoned while recording error");
        state.state = MockTransportState::Error;
        state.last_error = Some(message.to_string());
        state.last_status = None;
        RestError::new(kind, None, message)
    }
}

impl Default for MockRestAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl RestTransport for MockRestAdapter {
    fn execute(&self, request: RestRequest) -> RestFuture<RestResult<RestResponse>> {
        let adapter = self.clone();
        Box::pin(async move {
            let behavior = {
                let mut state = adapter
                    .state
                    .lock()
                    .expect("mock-restapi mutex poisoned while updating state before execute");
                state.outbound_log.push(request.clone());
                state.request_count += 1;
                state.last_url = Some(request.url.clone());
                state.state = MockTransportState::Busy;
                state.last_error = None;
                state.behavior_plan.pop()
            };

            if let MockBehavior::Delay(duration) = behavior {
                tokio::time::sleep(duration).await;
            }

            if let Some((kind, reason)) = behavior.failure() {
                return Err(adapter.record_error(kind, reason));
            }

            let start = Instant::now();
            let mut state = adapter
                .state
                .lock()
                .expect("mock-restapi mutex poisoned while recording inbound response");
            let response = state
                .next_response(&request)
                .unwrap_or_else(|| MockResponse::new(200, Bytes::new()));
            state.last_status = Some(response.status);
            state.state = MockTransportState::Idle;

            Ok(RestResponse {
                status: response.status,
                body: response.body,
                elapsed: start.elapsed(),
            })
        })
    }
}
