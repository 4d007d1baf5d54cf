// rest/routes/tasks.rs — Task JSON API.
//
// Every handler resolves the visitor identity from the request cookies
// first; responses set the identity cookie whenever a new token was
// generated for this request.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::identity::Identity;
use crate::tasks::TaskError;
use crate::AppContext;

fn error_response(err: TaskError) -> (StatusCode, Json<Value>) {
    match err {
        TaskError::NotFound => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Task not found" })),
        ),
        TaskError::Unauthorized => (
            StatusCode::FORBIDDEN,
            Json(json!({ "error": "Not authorized" })),
        ),
        TaskError::Database(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": e.to_string() })),
        ),
    }
}

pub async fn list_tasks(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
) -> Result<Response, (StatusCode, Json<Value>)> {
    let identity = Identity::resolve(&headers);
    let tasks = ctx
        .tasks
        .list_visible(&identity.visitor)
        .await
        .map_err(error_response)?;
    Ok(identity.apply(Json(tasks).into_response()))
}

#[derive(Deserialize)]
pub struct CreateTaskRequest {
    pub title: String,
}

pub async fn create_task(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
    Json(body): Json<CreateTaskRequest>,
) -> Result<Response, (StatusCode, Json<Value>)> {
    let identity = Identity::resolve(&headers);
    let task = ctx
        .tasks
        .create(&body.title, &identity.visitor)
        .await
        .map_err(error_response)?;
    Ok(identity.apply(Json(task).into_response()))
}

pub async fn toggle_task(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<Response, (StatusCode, Json<Value>)> {
    let identity = Identity::resolve(&headers);
    let task = ctx
        .tasks
        .toggle(id, &identity.visitor)
        .await
        .map_err(error_response)?;
    Ok(identity.apply(Json(task).into_response()))
}

pub async fn delete_task(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<Response, (StatusCode, Json<Value>)> {
    let identity = Identity::resolve(&headers);
    ctx.tasks
        .delete(id, &identity.visitor)
        .await
        .map_err(error_response)?;
    Ok(identity.apply(Json(json!({ "ok": true })).into_response()))
}
