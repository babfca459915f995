use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionMode {
    Viewer,
    Editor,
}

/// Result of the single password submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOutcome {
    Editor,
    /// Empty input: the user chose to view only.
    ViewerByChoice,
    /// Non-empty input that did not match; the session is read-only.
    Rejected,
}

impl GateOutcome {
    pub fn mode(self) -> SessionMode {
        match self {
            GateOutcome::Editor => SessionMode::Editor,
            GateOutcome::ViewerByChoice | GateOutcome::Rejected => SessionMode::Viewer,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    #[error("session mode is already {0:?}")]
    AlreadyResolved(SessionMode),
}

/// Password gate resolved once per session.
#[derive(Debug, Clone)]
pub struct AccessGate {
    secret: Option<String>,
    mode: Option<SessionMode>,
}

impl AccessGate {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: Some(secret.into()),
            mode: None,
        }
    }

    /// A gate with no secret, resolved to Editor from the start.
    pub fn always_editor() -> Self {
        Self {
            secret: None,
            mode: Some(SessionMode::Editor),
        }
    }

    pub fn from_secret(secret: Option<&str>) -> Self {
        match secret {
            Some(secret) => Self::new(secret),
            None => Self::always_editor(),
        }
    }

    pub fn mode(&self) -> Option<SessionMode> {
        self.mode
    }

    pub fn is_resolved(&self) -> bool {
        self.mode.is_some()
    }

    pub fn can_mutate(&self) -> bool {
        self.mode == Some(SessionMode::Editor)
    }

    pub fn submit(&mut self, input: &str) -> Result<GateOutcome, AccessError> {
        if let Some(mode) = self.mode {
            return Err(AccessError::AlreadyResolved(mode));
        }
        let input = input.trim();
        let outcome = match self.secret.as_deref() {
            _ if input.is_empty() => GateOutcome::ViewerByChoice,
            Some(secret) if secret_matches(secret, input) => GateOutcome::Editor,
            _ => GateOutcome::Rejected,
        };
        match outcome {
            GateOutcome::Rejected => warn!("password rejected, continuing read-only"),
            _ => info!(mode = ?outcome.mode(), "session mode resolved"),
        }
        self.mode = Some(outcome.mode());
        Ok(outcome)
    }
}

fn secret_matches(secret: &str, input: &str) -> bool {
    bool::from(secret.as_bytes().ct_eq(input.as_bytes()))
}
