use axum::{Json, extract::State, http::StatusCode};

use crate::{
    AppState,
    api::{
        extract::{ApiJson, ApiPath},
        models::{
            DataResponse,
            projects::{ProjectCreate, ProjectResponse},
        },
    },
    auth::current_user::CurrentUser,
    errors::Result,
    types::ProjectId,
};

#[utoipa::path(
    post,
    path = "/api/projects",
    tag = "projects",
    summary = "Create a project",
    description = "Creates a project for the caller if they are below their plan's quota.",
    request_body = ProjectCreate,
    responses(
        (status = 201, description = "Project created", body = ProjectResponse),
        (status = 400, description = "Invalid name or description"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Project quota reached"),
        (status = 409, description = "A project with the same slug exists"),
        (status = 500, description = "Internal server error")
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all, fields(user_id = current_user.id))]
pub async fn create_project(
    State(state): State<AppState>,
    current_user: CurrentUser,
    ApiJson(request): ApiJson<ProjectCreate>,
) -> Result<(StatusCode, Json<DataResponse<ProjectResponse>>)> {
    let request = request.validate()?;

    let project = state
        .projects
        .create(current_user.id, &request.name, request.description.as_deref())
        .await?;

    Ok((StatusCode::CREATED, Json(DataResponse::new(project.into()))))
}

#[utoipa::path(
    get,
    path = "/api/projects",
    tag = "projects",
    summary = "List projects",
    description = "The caller's projects, newest first.",
    responses(
        (status = 200, description = "Projects", body = Vec<ProjectResponse>),
        (status = 401, description = "Missing or invalid token"),
        (status = 500, description = "Internal server error")
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all, fields(user_id = current_user.id))]
pub async fn list_projects(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> Result<Json<DataResponse<Vec<ProjectResponse>>>> {
    let projects = state.projects.list(current_user.id).await?;

    Ok(Json(DataResponse::new(projects.into_iter().map(ProjectResponse::from).collect())))
}

#[utoipa::path(
    get,
    path = "/api/projects/{id}",
    tag = "projects",
    summary = "Get a project",
    params(("id" = i64, Path, description = "Project id")),
    responses(
        (status = 200, description = "Project", body = ProjectResponse),
        (status = 400, description = "Invalid project id"),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "No such project owned by the caller"),
        (status = 500, description = "Internal server error")
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all, fields(user_id = current_user.id, project_id = id))]
pub async fn get_project(
    State(state): State<AppState>,
    current_user: CurrentUser,
    ApiPath(id): ApiPath<ProjectId>,
) -> Result<Json<DataResponse<ProjectResponse>>> {
    let project = state.projects.get(id, current_user.id).await?;

    Ok(Json(DataResponse::new(project.into())))
}

#[utoipa::path(
    delete,
    path = "/api/projects/{id}",
    tag = "projects",
    summary = "Delete a project",
    params(("id" = i64, Path, description = "Project id")),
    responses(
        (status = 204, description = "Project deleted"),
        (status = 400, description = "Invalid project id"),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "No such project owned by the caller"),
        (status = 500, description = "Internal server error")
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all, fields(user_id = current_user.id, project_id = id))]
pub async fn delete_project(
    State(state): State<AppState>,
    current_user: CurrentUser,
    ApiPath(id): ApiPath<ProjectId>,
) -> Result<StatusCode> {
    state.projects.delete(id, current_user.id).await?;

    Ok(StatusCode::NO_CONTENT)
}
