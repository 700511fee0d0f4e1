//! API Routes
//!
//! HTTP endpoint definitions.

use axum::{
    extract::{Extension, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Account, OperationContext};
use crate::error::AppError;
use crate::handlers::{AuthHandler, RegisterCommand, TransferCommand, TransferHandler};
use crate::state::AppState;

use super::extract::ApiJson;
use super::middleware::AuthenticatedAccount;

// =========================================================================
// Request/Response types
// =========================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub id: Uuid,
    pub email: String,
    pub points: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

/// Public view of an account; the password hash is never included
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub birthday: NaiveDate,
    pub points: i64,
    pub created_at: DateTime<Utc>,
}

impl From<Account> for ProfileResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            email: account.email.into_inner(),
            first_name: account.first_name,
            last_name: account.last_name,
            phone: account.phone,
            birthday: account.birthday,
            points: account.points.value(),
            created_at: account.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TransferRequest {
    pub to_email: String,
    pub amount: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TransferResponse {
    pub status: String,
}

// =========================================================================
// API Router
// =========================================================================

/// Routes reachable without a token
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

/// Routes that require a verified bearer token
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(me))
        .route("/transfer", post(transfer))
}

// =========================================================================
// POST /register
// =========================================================================

async fn register(
    State(state): State<AppState>,
    ApiJson(command): ApiJson<RegisterCommand>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    let account = AuthHandler::new(&state).register(command).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            id: account.id,
            email: account.email.into_inner(),
            points: account.points.value(),
        }),
    ))
}

// =========================================================================
// POST /login
// =========================================================================

async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let token = AuthHandler::new(&state)
        .login(&request.email, request.password)
        .await?;

    Ok(Json(LoginResponse { token }))
}

// =========================================================================
// GET /me
// =========================================================================

async fn me(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedAccount>,
) -> Result<Json<ProfileResponse>, AppError> {
    let account = AuthHandler::new(&state).profile(caller.account_id).await?;
    Ok(Json(account.into()))
}

// =========================================================================
// POST /transfer
// =========================================================================

async fn transfer(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedAccount>,
    Extension(context): Extension<OperationContext>,
    ApiJson(request): ApiJson<TransferRequest>,
) -> Result<Json<TransferResponse>, AppError> {
    let command = TransferCommand::new(caller.account_id, request.to_email, request.amount);

    TransferHandler::new(&state).execute(command, &context).await?;

    Ok(Json(TransferResponse {
        status: "ok".to_string(),
    }))
}
