//! In-process stand-in for a ledger node's JSON-RPC surface.
//!
//! A [`StubNode`] answers every POST by looking up the envelope's `method`
//! in a script of [`Reply`]s and records what it received, so tests can check
//! both what the clients decoded and what they put on the wire.

use std::{
    collections::{HashMap, VecDeque},
    net::{Ipv4Addr, SocketAddr},
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use anyhow::Context as _;
use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::{StatusCode, Uri, header},
    response::{IntoResponse as _, Response},
};
use ledger_testing_core::nodes::NodeClient;
use serde_json::{Value, json};
use tokio::{net::TcpListener, sync::oneshot, task::JoinHandle, time::sleep};

/// What the stub answers for one call.
#[derive(Clone, Debug)]
pub enum Reply {
    /// `{"result": value}` echoing the request id.
    Result(Value),
    /// `{"error": {code, message}}` echoing the request id, sent with
    /// `status`.
    Error {
        code: i64,
        message: String,
        status: StatusCode,
    },
    /// Bare HTTP status with a plain-text body.
    Status(StatusCode, String),
    /// Body sent verbatim with status 200.
    Raw(String),
    /// Wait before answering with the inner reply.
    Delayed(Duration, Box<Reply>),
}

impl Reply {
    #[must_use]
    pub fn result(value: Value) -> Self {
        Self::Result(value)
    }

    #[must_use]
    pub fn error(code: i64, message: impl Into<String>) -> Self {
        Self::Error {
            code,
            message: message.into(),
            status: StatusCode::OK,
        }
    }

    #[must_use]
    pub fn delayed(self, delay: Duration) -> Self {
        Self::Delayed(delay, Box::new(self))
    }
}

/// A request as the stub received it.
#[derive(Clone, Debug)]
pub struct Recorded {
    pub path: String,
    pub body: Value,
}

impl Recorded {
    #[must_use]
    pub fn method(&self) -> Option<&str> {
        self.body.get("method").and_then(Value::as_str)
    }

    #[must_use]
    pub fn params(&self) -> &Value {
        self.body.get("params").unwrap_or(&Value::Null)
    }
}

/// Replies are consumed in order; the last one repeats forever.
#[derive(Default)]
struct Script {
    replies: VecDeque<Reply>,
}

impl Script {
    fn next(&mut self) -> Option<Reply> {
        if self.replies.len() > 1 {
            self.replies.pop_front()
        } else {
            self.replies.front().cloned()
        }
    }
}

#[derive(Default)]
struct StubState {
    scripts: Mutex<HashMap<String, Script>>,
    received: Mutex<Vec<Recorded>>,
}

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub struct StubNode {
    addr: SocketAddr,
    state: Arc<StubState>,
    shutdown: Option<oneshot::Sender<()>>,
    server: JoinHandle<()>,
}

impl StubNode {
    /// Serves on an ephemeral localhost port until dropped.
    pub async fn start() -> anyhow::Result<Self> {
        let state = Arc::new(StubState::default());
        let app = Router::new()
            .fallback(handle)
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0))
            .await
            .context("failed to bind stub node")?;
        let addr = listener.local_addr().context("stub node has no address")?;

        let (shutdown, stopped) = oneshot::channel::<()>();
        let server = tokio::spawn(async move {
            let serve = axum::serve(listener, app).with_graceful_shutdown(async {
                let _ = stopped.await;
            });
            if let Err(err) = serve.await {
                tracing::warn!(%err, "stub node terminated");
            }
        });

        Ok(Self {
            addr,
            state,
            shutdown: Some(shutdown),
            server,
        })
    }

    #[must_use]
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Clients for this node with the given request timeout.
    pub fn client(&self, label: &str, timeout: Duration) -> anyhow::Result<NodeClient> {
        NodeClient::new(label, &self.url(), timeout).context("failed to build node client")
    }

    /// Answer `method` (namespace-qualified) with `reply` from now on.
    pub fn on(&self, method: &str, reply: Reply) -> &Self {
        self.on_sequence(method, vec![reply])
    }

    /// Answer successive calls with `replies`, repeating the last one.
    pub fn on_sequence(&self, method: &str, replies: Vec<Reply>) -> &Self {
        locked(&self.state.scripts).insert(
            method.to_owned(),
            Script {
                replies: replies.into(),
            },
        );
        self
    }

    #[must_use]
    pub fn requests(&self) -> Vec<Recorded> {
        locked(&self.state.received).clone()
    }

    #[must_use]
    pub fn requests_for(&self, method: &str) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|request| request.method() == Some(method))
            .collect()
    }
}

impl Drop for StubNode {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        self.server.abort();
    }
}

async fn handle(State(state): State<Arc<StubState>>, uri: Uri, body: Bytes) -> Response {
    let Ok(envelope) = serde_json::from_slice::<Value>(&body) else {
        return (StatusCode::BAD_REQUEST, "body is not JSON").into_response();
    };
    locked(&state.received).push(Recorded {
        path: uri.path().to_owned(),
        body: envelope.clone(),
    });

    let id = envelope.get("id").cloned().unwrap_or(Value::Null);
    let method = envelope
        .get("method")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let scripted = locked(&state.scripts)
        .get_mut(method)
        .and_then(Script::next);

    let mut reply =
        scripted.unwrap_or_else(|| Reply::error(-32601, format!("method {method} not found")));
    loop {
        match reply {
            Reply::Delayed(delay, inner) => {
                sleep(delay).await;
                reply = *inner;
            }
            Reply::Result(result) => {
                return json_response(
                    StatusCode::OK,
                    &json!({ "jsonrpc": "2.0", "result": result, "id": id }),
                );
            }
            Reply::Error {
                code,
                message,
                status,
            } => {
                return json_response(
                    status,
                    &json!({
                        "jsonrpc": "2.0",
                        "error": { "code": code, "message": message },
                        "id": id,
                    }),
                );
            }
            Reply::Status(status, body) => return (status, body).into_response(),
            Reply::Raw(body) => {
                return (
                    StatusCode::OK,
                    [(header::CONTENT_TYPE, "application/json")],
                    body,
                )
                    .into_response();
            }
        }
    }
}

fn json_response(status: StatusCode, body: &Value) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        body.to_string(),
    )
        .into_response()
}
