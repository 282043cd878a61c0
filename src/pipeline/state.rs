use std::time::Instant;
use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;
use crate::errors::CrmBotError;

/// Lifecycle of one command invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InvocationState {
    Received,
    Authorized,
    Querying,
    Enriching,
    Rendering,
    BackingUp,
    Delivered,
    Unauthorized,
    QueryFailed,
    RenderFailed,
    BackupFailed,
}

impl InvocationState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Delivered | Self::Unauthorized | Self::QueryFailed | Self::RenderFailed | Self::BackupFailed
        )
    }

    pub fn is_failure(&self) -> bool {
        self.is_terminal() && *self != Self::Delivered
    }

    pub fn can_transition_to(&self, next: InvocationState) -> bool {
        use InvocationState::*;
        matches!(
            (self, next),
            (Received, Authorized | Unauthorized)
                // Informational commands are answered straight after authorization.
                | (Authorized, Querying | BackingUp | Delivered)
                | (Querying, Enriching | QueryFailed)
                | (Enriching, Rendering | QueryFailed)
                | (Rendering, Delivered | RenderFailed)
                | (BackingUp, Delivered | BackupFailed)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::Authorized => "authorized",
            Self::Querying => "querying",
            Self::Enriching => "enriching",
            Self::Rendering => "rendering",
            Self::BackingUp => "backing_up",
            Self::Delivered => "delivered",
            Self::Unauthorized => "unauthorized",
            Self::QueryFailed => "query_failed",
            Self::RenderFailed => "render_failed",
            Self::BackupFailed => "backup_failed",
        }
    }
}

impl std::fmt::Display for InvocationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One inbound command and the states it passed through. Invocations share
/// nothing with each other.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub id: String,
    /// `None` for local operator runs (CLI), which bypass the allow-list.
    pub caller_id: Option<i64>,
    pub command: String,
    history: Vec<InvocationState>,
    started: Instant,
}

impl Invocation {
    pub fn new(caller_id: i64, command: impl Into<String>) -> Self {
        Self::build(Some(caller_id), command.into())
    }

    /// An invocation started by the local operator; already authorized.
    pub fn local(command: impl Into<String>) -> Self {
        let mut invocation = Self::build(None, command.into());
        invocation.history.push(InvocationState::Authorized);
        invocation
    }

    fn build(caller_id: Option<i64>, command: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            caller_id,
            command,
            history: vec![InvocationState::Received],
            started: Instant::now(),
        }
    }

    pub fn state(&self) -> InvocationState {
        self.history.last().copied().unwrap_or(InvocationState::Received)
    }

    pub fn history(&self) -> &[InvocationState] {
        &self.history
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }

    /// Move to `next`, rejecting transitions the lifecycle does not allow.
    pub fn advance(&mut self, next: InvocationState) -> Result<(), CrmBotError> {
        let current = self.state();
        if !current.can_transition_to(next) {
            return Err(CrmBotError::Internal(format!(
                "invocation {} cannot move from {} to {}",
                self.id, current, next
            )));
        }
        debug!(invocation_id = %self.id, from = %current, to = %next, "Invocation state");
        self.history.push(next);
        Ok(())
    }

    /// Record a failure state and hand the error back for propagation.
    pub fn fail(&mut self, state: InvocationState, err: CrmBotError) -> CrmBotError {
        if let Err(e) = self.advance(state) {
            warn!(error = %e, "Failure recorded out of order");
        }
        err
    }
}
