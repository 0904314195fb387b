//! # Forum routes
//!
//! One handler per service operation. Handlers only check that required
//! fields are present; everything else is the service's job.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{MatchedPath, Path, Query, Request, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use domains::{CourseSummary, DomainError, Forum, Reply, Thread};
use serde_json::{json, Value};
use services::ForumService;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::dto::{
    require, CreateForumRequest, CreateReplyRequest, CreateThreadRequest, SearchParams,
};
use crate::error::ApiError;
use crate::metrics::Metrics;

/// State shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: ForumService,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(service: ForumService) -> Self {
        Self {
            service,
            metrics: Metrics::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RouterOptions {
    pub cors_allow_any_origin: bool,
}

type ApiResult<T> = Result<T, ApiError>;

/// Builds the full application router with tracing, request ids and metrics.
pub fn router(state: AppState, options: RouterOptions) -> Router {
    let forums = Router::new()
        .route("/forums", get(list_forums).post(create_forum))
        .route("/forums/search", get(search_forums))
        .route("/forums/search-courses", get(search_courses))
        .route("/forums/course/{course_id}", get(get_forum_by_course))
        .route("/forums/{course_id}/threads", post(add_thread))
        .route("/forums/{course_id}/search-threads", get(search_threads))
        .route(
            "/forums/{course_id}/threads/{thread_id}",
            get(get_thread).delete(delete_thread),
        )
        .route("/forums/{course_id}/threads/{thread_id}/replies", post(add_reply))
        .route(
            "/forums/{course_id}/threads/{thread_id}/replies/{reply_id}",
            delete(delete_reply),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), track_requests));

    let app = Router::new()
        .merge(forums)
        .route("/healthz", get(health))
        .route("/metrics", get(render_metrics))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
                    let request_id = request
                        .headers()
                        .get("x-request-id")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("-");
                    tracing::info_span!(
                        "http",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id
                    )
                }))
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
        .with_state(state);

    if options.cors_allow_any_origin {
        app.layer(CorsLayer::permissive())
    } else {
        app
    }
}

async fn track_requests(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| "unmatched".to_string(), |p| p.as_str().to_string());
    let response = next.run(request).await;
    state
        .metrics
        .observe(&method, &route, response.status().as_u16());
    response
}

/// Ids that cannot be parsed cannot name an existing resource.
fn parse_id(raw: &str, entity: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw)
        .map_err(|_| DomainError::NotFound(entity.to_string(), raw.to_string()).into())
}

fn deleted() -> Json<Value> {
    Json(json!({ "deleted": true }))
}

// ========== Forums ==========

async fn list_forums(State(state): State<AppState>) -> ApiResult<Json<Vec<Forum>>> {
    Ok(Json(state.service.list_forums().await?))
}

async fn create_forum(
    State(state): State<AppState>,
    body: Result<Json<CreateForumRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Forum>)> {
    let Json(body) = body?;
    let course_id = require(body.course_id, "courseId")?;
    let course_name = require(body.course_name, "courseName")?;

    let forum = state.service.create_forum(&course_id, &course_name).await?;
    Ok((StatusCode::CREATED, Json(forum)))
}

async fn get_forum_by_course(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
) -> ApiResult<Json<Forum>> {
    Ok(Json(state.service.get_forum_by_course(&course_id).await?))
}

async fn search_forums(
    State(state): State<AppState>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> ApiResult<Json<Vec<Forum>>> {
    let Query(params) = params?;
    Ok(Json(state.service.search_forums(params.query()).await?))
}

async fn search_courses(
    State(state): State<AppState>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> ApiResult<Json<Vec<CourseSummary>>> {
    let Query(params) = params?;
    Ok(Json(state.service.search_courses(params.query()).await?))
}

// ========== Threads ==========

async fn add_thread(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
    body: Result<Json<CreateThreadRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Thread>)> {
    let Json(body) = body?;
    let title = require(body.title, "title")?;
    let description = require(body.description, "description")?;
    let created_by = require(body.created_by, "createdBy")?;

    let thread = state
        .service
        .add_thread(&course_id, &title, &description, &created_by)
        .await?;
    Ok((StatusCode::CREATED, Json(thread)))
}

async fn get_thread(
    State(state): State<AppState>,
    Path((course_id, thread_id)): Path<(String, String)>,
) -> ApiResult<Json<Thread>> {
    let thread_id = parse_id(&thread_id, "Thread")?;
    Ok(Json(state.service.get_thread(&course_id, thread_id).await?))
}

async fn delete_thread(
    State(state): State<AppState>,
    Path((course_id, thread_id)): Path<(String, String)>,
) -> ApiResult<Json<Value>> {
    let thread_id = parse_id(&thread_id, "Thread")?;
    state.service.delete_thread(&course_id, thread_id).await?;
    Ok(deleted())
}

async fn search_threads(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> ApiResult<Json<Vec<Thread>>> {
    let Query(params) = params?;
    let threads = state
        .service
        .search_threads_in_course(&course_id, params.query())
        .await?;
    Ok(Json(threads))
}

// ========== Replies ==========

async fn add_reply(
    State(state): State<AppState>,
    Path((course_id, thread_id)): Path<(String, String)>,
    body: Result<Json<CreateReplyRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Reply>)> {
    let thread_id = parse_id(&thread_id, "Thread")?;
    let Json(body) = body?;
    let user_id = require(body.user_id, "userId")?;
    let message = require(body.message, "message")?;

    let reply = state
        .service
        .add_reply(&course_id, thread_id, &user_id, &message)
        .await?;
    Ok((StatusCode::CREATED, Json(reply)))
}

async fn delete_reply(
    State(state): State<AppState>,
    Path((course_id, thread_id, reply_id)): Path<(String, String, String)>,
) -> ApiResult<Json<Value>> {
    let thread_id = parse_id(&thread_id, "Thread")?;
    let reply_id = parse_id(&reply_id, "Reply")?;
    state
        .service
        .delete_reply(&course_id, thread_id, reply_id)
        .await?;
    Ok(deleted())
}

// ========== Operational ==========

async fn health() -> &'static str {
    "ok"
}

async fn render_metrics(State(state): State<AppState>) -> Response {
    match state.metrics.render() {
        Ok(body) => (
            [(
                header::CONTENT_TYPE,
                HeaderValue::from_static(
                    "application/openmetrics-text; version=1.0.0; charset=utf-8",
                ),
            )],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to encode metrics: {e}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
