//! Project API Endpoints
//! Mission: Public portfolio reads plus admin-gated content management

use crate::projects::store::{ProjectInput, ProjectStore};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

/// Get all projects - GET /api/projects (public)
pub async fn list_projects(
    State(store): State<Arc<ProjectStore>>,
) -> Result<Json<Vec<crate::projects::store::Project>>, ProjectApiError> {
    let projects = store.list_all().map_err(internal)?;
    Ok(Json(projects))
}

/// Get featured projects - GET /api/projects/featured (public)
pub async fn list_featured(
    State(store): State<Arc<ProjectStore>>,
) -> Result<Json<Vec<crate::projects::store::Project>>, ProjectApiError> {
    let projects = store.list_featured().map_err(internal)?;
    Ok(Json(projects))
}

/// Get project by id - GET /api/projects/:id (public)
pub async fn get_project(
    State(store): State<Arc<ProjectStore>>,
    Path(id): Path<String>,
) -> Result<Json<crate::projects::store::Project>, ProjectApiError> {
    let id = Uuid::parse_str(&id).map_err(|_| ProjectApiError::NotFound)?;
    let project = store
        .get(&id)
        .map_err(internal)?
        .ok_or(ProjectApiError::NotFound)?;
    Ok(Json(project))
}

/// Create project - POST /api/projects (admin only)
pub async fn create_project(
    State(store): State<Arc<ProjectStore>>,
    Json(payload): Json<ProjectInput>,
) -> Result<(StatusCode, Json<crate::projects::store::Project>), ProjectApiError> {
    let input = validate_input(payload)?;
    let project = store.create(&input).map_err(internal)?;
    Ok((StatusCode::CREATED, Json(project)))
}

/// Update project - PUT /api/projects/:id (admin only)
pub async fn update_project(
    State(store): State<Arc<ProjectStore>>,
    Path(id): Path<String>,
    Json(payload): Json<ProjectInput>,
) -> Result<Json<crate::projects::store::Project>, ProjectApiError> {
    let id = Uuid::parse_str(&id).map_err(|_| ProjectApiError::NotFound)?;
    let input = validate_input(payload)?;
    let project = store
        .update(&id, &input)
        .map_err(internal)?
        .ok_or(ProjectApiError::NotFound)?;
    Ok(Json(project))
}

/// Delete project - DELETE /api/projects/:id (admin only)
pub async fn delete_project(
    State(store): State<Arc<ProjectStore>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ProjectApiError> {
    let id = Uuid::parse_str(&id).map_err(|_| ProjectApiError::NotFound)?;
    let deleted = store.delete(&id).map_err(internal)?;
    if !deleted {
        return Err(ProjectApiError::NotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}

fn validate_input(mut input: ProjectInput) -> Result<ProjectInput, ProjectApiError> {
    input.title = input.title.trim().to_string();
    input.description = input.description.trim().to_string();

    if input.title.is_empty() || input.title.len() > 255 {
        return Err(ProjectApiError::Validation(
            "Title must be between 1 and 255 characters",
        ));
    }
    if input.description.is_empty() {
        return Err(ProjectApiError::Validation("Description is required"));
    }
    for url in [&input.project_url, &input.github_url].into_iter().flatten() {
        let url = url.trim();
        if !url.is_empty() && !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ProjectApiError::Validation(
                "URLs must be valid HTTP/HTTPS URLs",
            ));
        }
    }

    Ok(input)
}

fn internal(e: anyhow::Error) -> ProjectApiError {
    warn!("Project store error: {}", e);
    ProjectApiError::InternalError
}

/// Project API errors
#[derive(Debug)]
pub enum ProjectApiError {
    NotFound,
    Validation(&'static str),
    InternalError,
}

impl IntoResponse for ProjectApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ProjectApiError::NotFound => (StatusCode::NOT_FOUND, "Project not found"),
            ProjectApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            ProjectApiError::InternalError => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}
