use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, put},
};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::access::{AccessGate, GateOutcome};
use crate::calendar::ViewCursor;
use crate::class_type::ClassType;
use crate::date_key::DateKey;
use crate::persistence::SaveQueue;
use crate::schedule::{AssignOutcome, ScheduleStore};
use crate::session::{self, MonthView, SessionError};

pub const PASSWORD_HEADER: &str = "x-calendar-password";

#[derive(Clone)]
pub struct AppState {
    schedule: Arc<RwLock<ScheduleStore>>,
    saves: Arc<SaveQueue>,
    secret: Option<Arc<str>>,
}

impl AppState {
    /// `secret` of `None` leaves every request free to edit.
    pub fn new(schedule: ScheduleStore, saves: SaveQueue, secret: Option<&str>) -> Self {
        Self {
            schedule: Arc::new(RwLock::new(schedule)),
            saves: Arc::new(saves),
            secret: secret.map(Arc::from),
        }
    }

    pub fn schedule(&self) -> Arc<RwLock<ScheduleStore>> {
        self.schedule.clone()
    }

    pub fn saves(&self) -> &SaveQueue {
        &self.saves
    }

    /// Each request resolves its own gate from the password header.
    fn resolve_gate(&self, headers: &HeaderMap) -> (AccessGate, Option<GateOutcome>) {
        let mut gate = AccessGate::from_secret(self.secret.as_deref());
        if gate.is_resolved() {
            return (gate, None);
        }
        let input = headers
            .get(PASSWORD_HEADER)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("");
        let outcome = gate.submit(input).ok();
        (gate, outcome)
    }

    fn editor_gate(&self, headers: &HeaderMap) -> Result<AccessGate, ApiError> {
        match self.resolve_gate(headers) {
            (_, Some(GateOutcome::Rejected)) => Err(ApiError::PasswordRejected),
            (gate, _) if gate.can_mutate() => Ok(gate),
            _ => Err(ApiError::ReadOnly),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

#[derive(Debug)]
enum ApiError {
    ReadOnly,
    PasswordRejected,
    UnknownClassType(String),
    NotFound(String),
    Invalid(String),
}

impl From<SessionError> for ApiError {
    fn from(value: SessionError) -> Self {
        match value {
            SessionError::GatePending | SessionError::ReadOnly => ApiError::ReadOnly,
            SessionError::InvalidDate(err) => ApiError::Invalid(err.to_string()),
            SessionError::Access(err) => ApiError::Invalid(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::ReadOnly => (
                StatusCode::FORBIDDEN,
                "read_only",
                "editing requires the calendar password".to_string(),
            ),
            ApiError::PasswordRejected => (
                StatusCode::FORBIDDEN,
                "password_rejected",
                "password rejected, calendar is read-only".to_string(),
            ),
            ApiError::UnknownClassType(id) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "unknown_class_type",
                format!("class type '{id}' is not in the catalog"),
            ),
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, "not_found", message),
            ApiError::Invalid(message) => (StatusCode::BAD_REQUEST, "invalid_request", message),
        };
        (status, Json(ErrorBody { error, message })).into_response()
    }
}

#[derive(Debug, Deserialize)]
struct AssignPayload {
    class_type: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AssignResponse {
    pub date: DateKey,
    pub class_type: String,
    pub previous: Option<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/catalog", get(get_catalog))
        .route("/months/:year/:month", get(get_month))
        .route(
            "/days/:year/:month/:day",
            put(assign_day).delete(unassign_day),
        )
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "class calendar HTTP API listening");
    axum::serve(listener, app).await
}

/// Path months are 1-based.
fn month_index(month: u32) -> Result<u32, ApiError> {
    match month {
        1..=12 => Ok(month - 1),
        _ => Err(ApiError::Invalid(format!("month {month} is outside 1..=12"))),
    }
}

fn date_key(year: i32, month: u32, day: u32) -> Result<DateKey, ApiError> {
    DateKey::new(year, month_index(month)?, day).map_err(|err| ApiError::Invalid(err.to_string()))
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn get_catalog(State(state): State<AppState>) -> Json<Vec<ClassType>> {
    let schedule = state.schedule();
    let entries = {
        let guard = schedule.read();
        guard.catalog().iter().cloned().collect()
    };
    Json(entries)
}

async fn get_month(
    State(state): State<AppState>,
    Path((year, month)): Path<(i32, u32)>,
    headers: HeaderMap,
) -> Result<Json<MonthView>, ApiError> {
    let cursor = ViewCursor::new(year, month_index(month)?);
    let (gate, _) = state.resolve_gate(&headers);
    let schedule = state.schedule();
    let view = {
        let guard = schedule.read();
        MonthView::build(&guard, cursor, gate.can_mutate())
    };
    Ok(Json(view))
}

async fn assign_day(
    State(state): State<AppState>,
    Path((year, month, day)): Path<(i32, u32, u32)>,
    headers: HeaderMap,
    Json(payload): Json<AssignPayload>,
) -> Result<Json<AssignResponse>, ApiError> {
    let key = date_key(year, month, day)?;
    let gate = state.editor_gate(&headers)?;
    let schedule = state.schedule();
    let outcome = {
        let mut guard = schedule.write();
        session::gated_assign(&gate, &mut guard, &state.saves, key, &payload.class_type)?
    };
    match outcome {
        AssignOutcome::Assigned { previous } => Ok(Json(AssignResponse {
            date: key,
            class_type: payload.class_type,
            previous,
        })),
        AssignOutcome::UnknownClassType => Err(ApiError::UnknownClassType(payload.class_type)),
    }
}

async fn unassign_day(
    State(state): State<AppState>,
    Path((year, month, day)): Path<(i32, u32, u32)>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let key = date_key(year, month, day)?;
    let gate = state.editor_gate(&headers)?;
    let schedule = state.schedule();
    let removed = {
        let mut guard = schedule.write();
        session::gated_unassign(&gate, &mut guard, &state.saves, &key)?
    };
    match removed {
        Some(_) => Ok(StatusCode::NO_CONTENT),
        None => Err(ApiError::NotFound(format!("{key} has no class assigned"))),
    }
}
