//! # Account Commands

use mehfil_core::{User, UserRole};
use mehfil_db::RecordStore;
use serde::Deserialize;
use tracing::debug;

use crate::error::ApiError;
use crate::state::AppState;

/// The signup form.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

pub async fn signup<S: RecordStore>(
    state: &AppState<S>,
    request: SignupRequest,
) -> Result<User, ApiError> {
    debug!(email = %request.email, "signup command");
    Ok(state
        .repos()
        .users()
        .signup(
            &request.email,
            &request.password,
            &request.confirm_password,
            &request.name,
        )
        .await?)
}

pub async fn login<S: RecordStore>(
    state: &AppState<S>,
    email: &str,
    password: &str,
) -> Result<User, ApiError> {
    Ok(state.repos().users().login(email, password).await?)
}

/// Admin-created account; `role` is `user` or `admin`.
pub async fn create_user<S: RecordStore>(
    state: &AppState<S>,
    email: &str,
    password: &str,
    name: &str,
    role: &str,
) -> Result<User, ApiError> {
    let role: UserRole = role.parse()?;
    Ok(state
        .repos()
        .users()
        .create_user(email, password, name, role)
        .await?)
}

/// Creates `admin@cafemehfil.com` unless an admin already exists.
pub async fn ensure_default_admin<S: RecordStore>(
    state: &AppState<S>,
    password: &str,
) -> Result<Option<User>, ApiError> {
    Ok(state.repos().users().ensure_default_admin(password).await?)
}

pub async fn list_users<S: RecordStore>(state: &AppState<S>) -> Result<Vec<User>, ApiError> {
    Ok(state.repos().users().list().await?)
}
