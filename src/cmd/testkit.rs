//! Test doubles for the command pipeline: a recording request client and a
//! fixed token provider.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::auth::{Connection, Service, Session, TokenProvider};
use crate::error::CommandError;
use crate::request::{ApiRequest, RequestClient, RequestError};

type Responder = dyn Fn(&ApiRequest) -> Result<Value, RequestError> + Send + Sync;

pub struct FakeClient {
    responder: Box<Responder>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl FakeClient {
    pub fn new(
        responder: impl Fn(&ApiRequest) -> Result<Value, RequestError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            responder: Box::new(responder),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Client whose every call is rejected with `reason`.
    pub fn rejecting(reason: &'static str) -> Self {
        Self::new(move |_| Err(RequestError::Transport(reason.to_string())))
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl RequestClient for FakeClient {
    async fn send(&self, request: ApiRequest) -> Result<Value, RequestError> {
        let result = (self.responder)(&request);
        self.requests.lock().unwrap().push(request);
        result
    }
}

pub struct StaticTokens {
    result: Result<String, String>,
    calls: AtomicUsize,
}

impl StaticTokens {
    pub fn ok(token: &str) -> Self {
        Self {
            result: Ok(token.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            result: Err(message.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenProvider for StaticTokens {
    async fn access_token(&self, _: Service, _: &str) -> Result<String, CommandError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone().map_err(CommandError::Authentication)
    }
}

/// Session with `service` connected to `resource`.
pub fn connected(service: Service, resource: &str) -> Session {
    let mut session = Session::default();
    *session.connection_mut(service) = Connection::connected_to(resource, "ABC");
    session
}

pub fn context<'a>(
    session: &'a Session,
    tokens: &'a StaticTokens,
    client: &'a FakeClient,
    output: crate::cmd::format::OutputMode,
) -> crate::cmd::shared::CommandContext<'a> {
    crate::cmd::shared::CommandContext {
        session,
        tokens,
        client,
        output,
    }
}
