use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context as TaskContext, Poll};

use gate_auth::StageVariables;
use serde_json::Value;
use tokio::sync::oneshot;
use tracing::debug;
use uuid::Uuid;

use crate::error::InvocationError;

/// Final result of one invocation.
pub type Outcome = Result<Value, InvocationError>;

/// Single-resolution `succeed` / `fail` handle.
///
/// Clones share one slot; the first call to [`succeed`](Self::succeed) or
/// [`fail`](Self::fail) resolves the invocation and every later call is a
/// no-op that returns `false`.
#[derive(Clone)]
pub struct Completion {
    slot: Arc<Mutex<Option<oneshot::Sender<Outcome>>>>,
}

impl Completion {
    fn channel() -> (Self, Pending) {
        let (sender, receiver) = oneshot::channel();
        let completion = Self {
            slot: Arc::new(Mutex::new(Some(sender))),
        };
        (completion, Pending { receiver })
    }

    pub fn succeed(&self, result: impl Into<Value>) -> bool {
        self.resolve(Ok(result.into()))
    }

    pub fn fail(&self, error: impl Into<InvocationError>) -> bool {
        self.resolve(Err(error.into()))
    }

    pub fn is_resolved(&self) -> bool {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    fn resolve(&self, outcome: Outcome) -> bool {
        let sender = self
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        match sender {
            Some(sender) => {
                // The host may have stopped waiting; the invocation still
                // counts as resolved.
                let _ = sender.send(outcome);
                true
            }
            None => {
                debug!(
                    success = outcome.is_ok(),
                    "completion already resolved, ignoring"
                );
                false
            }
        }
    }
}

/// Host side of an invocation: resolves once the completion is used, or with
/// [`InvocationError::Abandoned`] when every completion handle is dropped.
#[derive(Debug)]
pub struct Pending {
    receiver: oneshot::Receiver<Outcome>,
}

impl Future for Pending {
    type Output = Outcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut TaskContext<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.receiver)
            .poll(cx)
            .map(|received| received.unwrap_or(Err(InvocationError::Abandoned)))
    }
}

/// Per-invocation context handed to handlers.
#[derive(Clone)]
pub struct Context {
    invocation_id: Uuid,
    completion: Completion,
    stage_variables: Option<StageVariables>,
}

impl Context {
    /// Create a context together with the future that yields its outcome.
    pub fn channel() -> (Self, Pending) {
        let (completion, pending) = Completion::channel();
        let context = Self {
            invocation_id: Uuid::new_v4(),
            completion,
            stage_variables: None,
        };
        (context, pending)
    }

    pub fn with_stage_variables(mut self, stage_variables: StageVariables) -> Self {
        self.stage_variables = Some(stage_variables);
        self
    }

    pub fn invocation_id(&self) -> Uuid {
        self.invocation_id
    }

    pub fn stage_variables(&self) -> Option<&StageVariables> {
        self.stage_variables.as_ref()
    }

    pub fn completion(&self) -> Completion {
        self.completion.clone()
    }

    pub fn succeed(&self, result: impl Into<Value>) -> bool {
        self.completion.succeed(result)
    }

    pub fn fail(&self, error: impl Into<InvocationError>) -> bool {
        self.completion.fail(error)
    }

    pub fn is_resolved(&self) -> bool {
        self.completion.is_resolved()
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("invocation_id", &self.invocation_id)
            .field("resolved", &self.is_resolved())
            .field("stage_variables", &self.stage_variables)
            .finish()
    }
}
