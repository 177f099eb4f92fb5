use super::session::Session;
use super::state::ServerState;
use crate::errors::{ErrorCatalog, JobError, JobResult};
use crate::job::{JobDetailsUpdate, NewJob};
use crate::job_store::{Pagination, SearchCriteria};
use crate::jobs::{Permission, Transition};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::error;

#[derive(Deserialize, Debug, Default)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

#[derive(Deserialize, Debug, Default)]
pub struct SearchQuery {
    pub query: Option<String>,
    pub title: Option<String>,
    pub position: Option<String>,
    pub posted_by: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

#[derive(Deserialize, Debug)]
pub struct BulkRequest {
    pub ids: Vec<String>,
    pub tenant_id: String,
}

pub fn error_response(catalog: &ErrorCatalog, err: &JobError) -> Response {
    let rendered = catalog.render(err);
    if rendered.http_status >= 500 {
        error!("Request failed: {}", err);
    }
    let status =
        StatusCode::from_u16(rendered.http_status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(rendered)).into_response()
}

fn respond<T: Serialize>(catalog: &ErrorCatalog, result: JobResult<T>, status: StatusCode) -> Response {
    match result {
        Ok(value) => (status, Json(value)).into_response(),
        Err(err) => error_response(catalog, &err),
    }
}

fn require_view(session: &Session) -> JobResult<()> {
    if session.has_permission(Permission::ViewJobs) {
        Ok(())
    } else {
        Err(JobError::InsufficientPermissions)
    }
}

impl ServerState {
    fn pagination(&self, page: Option<u32>, page_size: Option<u32>) -> Pagination {
        Pagination::clamped(page, page_size, &self.config.page_limits)
    }
}

async fn create_job(
    session: Session,
    State(state): State<ServerState>,
    Json(body): Json<NewJob>,
) -> Response {
    let cancel = state.shutdown.child_token();
    let result = state.job_service.create_job(session.actor(), body, &cancel);
    respond(&state.error_catalog, result, StatusCode::CREATED)
}

async fn get_job(
    session: Session,
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Response {
    let cancel = state.shutdown.child_token();
    let result = require_view(&session).and_then(|_| state.job_service.get_job(&id, &cancel));
    respond(&state.error_catalog, result, StatusCode::OK)
}

async fn update_job(
    session: Session,
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(body): Json<JobDetailsUpdate>,
) -> Response {
    let cancel = state.shutdown.child_token();
    let result = state
        .job_service
        .update_job(session.actor(), &id, body, &cancel);
    respond(&state.error_catalog, result, StatusCode::OK)
}

async fn delete_job(
    session: Session,
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Response {
    let cancel = state.shutdown.child_token();
    match state.job_service.delete_job(session.actor(), &id, &cancel) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(&state.error_catalog, &err),
    }
}

async fn apply_transition(
    state: ServerState,
    session: Session,
    id: String,
    transition: Transition,
) -> Response {
    let cancel = state.shutdown.child_token();
    let result = state
        .job_service
        .apply(transition, session.actor(), &id, &cancel);
    respond(&state.error_catalog, result, StatusCode::OK)
}

async fn publish_job(
    session: Session,
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Response {
    apply_transition(state, session, id, Transition::Publish).await
}

async fn unpublish_job(
    session: Session,
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Response {
    apply_transition(state, session, id, Transition::Unpublish).await
}

async fn close_job(
    session: Session,
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Response {
    apply_transition(state, session, id, Transition::Close).await
}

async fn archive_job(
    session: Session,
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Response {
    apply_transition(state, session, id, Transition::Archive).await
}

async fn unarchive_job(
    session: Session,
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Response {
    apply_transition(state, session, id, Transition::Unarchive).await
}

async fn get_job_stats(
    session: Session,
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Response {
    let cancel = state.shutdown.child_token();
    let result = require_view(&session).and_then(|_| state.job_service.job_stats(&id, &cancel));
    respond(&state.error_catalog, result, StatusCode::OK)
}

async fn list_jobs(
    session: Session,
    State(state): State<ServerState>,
    Query(query): Query<PageQuery>,
) -> Response {
    let cancel = state.shutdown.child_token();
    let pagination = state.pagination(query.page, query.page_size);
    let result =
        require_view(&session).and_then(|_| state.job_service.list_jobs(pagination, &cancel));
    respond(&state.error_catalog, result, StatusCode::OK)
}

async fn list_published(
    session: Session,
    State(state): State<ServerState>,
    Query(query): Query<PageQuery>,
) -> Response {
    let cancel = state.shutdown.child_token();
    let pagination = state.pagination(query.page, query.page_size);
    let result = require_view(&session)
        .and_then(|_| state.job_service.list_published(pagination, &cancel));
    respond(&state.error_catalog, result, StatusCode::OK)
}

async fn list_archived(
    session: Session,
    State(state): State<ServerState>,
    Query(query): Query<PageQuery>,
) -> Response {
    let cancel = state.shutdown.child_token();
    let pagination = state.pagination(query.page, query.page_size);
    let result = require_view(&session)
        .and_then(|_| state.job_service.list_archived(pagination, &cancel));
    respond(&state.error_catalog, result, StatusCode::OK)
}

async fn list_my_jobs(
    session: Session,
    State(state): State<ServerState>,
    Query(query): Query<PageQuery>,
) -> Response {
    let cancel = state.shutdown.child_token();
    let pagination = state.pagination(query.page, query.page_size);
    let result = match session.actor() {
        Some(actor) => state
            .job_service
            .list_by_user(&actor.user_id, pagination, &cancel),
        None => Err(JobError::InsufficientPermissions),
    };
    respond(&state.error_catalog, result, StatusCode::OK)
}

async fn search_jobs(
    session: Session,
    State(state): State<ServerState>,
    Query(query): Query<SearchQuery>,
) -> Response {
    let cancel = state.shutdown.child_token();
    let criteria = SearchCriteria {
        pagination: state.pagination(query.page, query.page_size),
        query: query.query,
        title: query.title,
        position: query.position,
        posted_by: query.posted_by,
    };
    let result =
        require_view(&session).and_then(|_| state.job_service.search_jobs(&criteria, &cancel));
    respond(&state.error_catalog, result, StatusCode::OK)
}

async fn bulk_publish(
    session: Session,
    State(state): State<ServerState>,
    Json(body): Json<BulkRequest>,
) -> Response {
    let cancel = state.shutdown.child_token();
    let result =
        state
            .job_service
            .bulk_publish(&body.ids, session.actor(), &body.tenant_id, &cancel);
    Json(result).into_response()
}

async fn bulk_archive(
    session: Session,
    State(state): State<ServerState>,
    Json(body): Json<BulkRequest>,
) -> Response {
    let cancel = state.shutdown.child_token();
    let result =
        state
            .job_service
            .bulk_archive(&body.ids, session.actor(), &body.tenant_id, &cancel);
    Json(result).into_response()
}

pub fn make_job_routes(state: ServerState) -> Router {
    Router::new()
        .route("/v1/jobs", post(create_job).get(list_jobs))
        .route("/v1/jobs/published", get(list_published))
        .route("/v1/jobs/archived", get(list_archived))
        .route("/v1/jobs/mine", get(list_my_jobs))
        .route("/v1/jobs/search", get(search_jobs))
        .route("/v1/jobs/bulk/publish", post(bulk_publish))
        .route("/v1/jobs/bulk/archive", post(bulk_archive))
        .route(
            "/v1/jobs/{id}",
            get(get_job).put(update_job).delete(delete_job),
        )
        .route("/v1/jobs/{id}/stats", get(get_job_stats))
        .route("/v1/jobs/{id}/publish", post(publish_job))
        .route("/v1/jobs/{id}/unpublish", post(unpublish_job))
        .route("/v1/jobs/{id}/close", post(close_job))
        .route("/v1/jobs/{id}/archive", post(archive_job))
        .route("/v1/jobs/{id}/unarchive", post(unarchive_job))
        .with_state(state)
}
