use axum::Json;
use axum::extract::Path;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, post};
use axum::{Router, extract::State, routing::get};
use serde::{Deserialize, Serialize};

use crate::auth::{AdminIdentity, clear_session_cookie, session_cookie, session_token};
use crate::db::repository;
use crate::error::AppError;
use crate::models::*;
use crate::services::RegistrationService;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/courses", get(list_courses))
        .route("/register", post(register))
        .route("/admin/login", post(admin_login))
        .route("/admin/logout", post(admin_logout))
        .route("/admin/check", get(admin_check))
        .route("/admin/users", get(list_registrations))
        .route("/admin/users/{id}/status", post(update_registration_status))
        .route("/admin/courses", post(add_course))
        .route("/admin/courses/{name}", delete(remove_course))
        .with_state(state)
}

#[derive(Deserialize)]
struct LoginRequest {
    username: String,
    password: String,
}

#[derive(Serialize)]
struct MessageResponse {
    message: String,
}

#[derive(Serialize)]
struct AuthResponse {
    success: bool,
    message: String,
}

#[derive(Serialize)]
struct CheckResponse {
    #[serde(rename = "loggedIn")]
    logged_in: bool,
}

#[derive(Serialize)]
struct StatusUpdateResponse {
    message: String,
    notified: bool,
}

#[derive(Serialize)]
struct CatalogResponse {
    courses: Vec<Course>,
}

fn registration_service(state: &AppState) -> RegistrationService {
    RegistrationService::new(state.db.clone(), state.mailer.clone(), state.sheets.clone())
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    sqlx::query("select 1").execute(&state.db).await?;
    Ok(StatusCode::OK)
}

async fn list_courses(State(state): State<AppState>) -> Result<Json<Vec<Course>>, AppError> {
    let courses = repository::fetch_courses(&state.db).await?;
    Ok(Json(courses))
}

async fn register(
    State(state): State<AppState>,
    Json(req): Json<NewRegistrationRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    registration_service(&state).submit(req).await?;
    Ok(Json(MessageResponse {
        message: "Registered successfully, pending approval!".to_string(),
    }))
}

async fn admin_login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Response {
    if req.username == state.config.admin_username
        && req.password == state.config.admin_password
    {
        let token = state.tokens.issue(&req.username);
        (
            [(header::SET_COOKIE, session_cookie(&token))],
            Json(AuthResponse {
                success: true,
                message: "Login successful".to_string(),
            }),
        )
            .into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(AuthResponse {
                success: false,
                message: "Invalid credentials".to_string(),
            }),
        )
            .into_response()
    }
}

async fn admin_logout() -> impl IntoResponse {
    (
        [(header::SET_COOKIE, clear_session_cookie())],
        Json(AuthResponse {
            success: true,
            message: "Logged out".to_string(),
        }),
    )
}

/// Reports whether the request carries a live session; never errors.
async fn admin_check(State(state): State<AppState>, headers: HeaderMap) -> Json<CheckResponse> {
    let logged_in = session_token(&headers)
        .and_then(|token| state.tokens.verify(&token))
        .is_some();
    Json(CheckResponse { logged_in })
}

async fn list_registrations(
    _admin: AdminIdentity,
    State(state): State<AppState>,
) -> Result<Json<Vec<Registration>>, AppError> {
    let registrations = registration_service(&state).list().await?;
    Ok(Json(registrations))
}

async fn update_registration_status(
    _admin: AdminIdentity,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<StatusUpdateResponse>, AppError> {
    let change = registration_service(&state).set_status(&id, req.status).await?;
    Ok(Json(StatusUpdateResponse {
        message: format!("User {} successfully", change.registration.status),
        notified: change.notified,
    }))
}

async fn add_course(
    _admin: AdminIdentity,
    State(state): State<AppState>,
    Json(req): Json<NewCourseRequest>,
) -> Result<Json<CatalogResponse>, AppError> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("Invalid course name".to_string()));
    }

    repository::insert_course(&state.db, name, req.description.as_deref()).await?;

    let courses = repository::fetch_courses(&state.db).await?;
    Ok(Json(CatalogResponse { courses }))
}

async fn remove_course(
    _admin: AdminIdentity,
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<CatalogResponse>, AppError> {
    repository::delete_course(&state.db, &name).await?;

    let courses = repository::fetch_courses(&state.db).await?;
    Ok(Json(CatalogResponse { courses }))
}
