// rest/routes/pages.rs — server-rendered index page.
//
// The page is a single task list; it is rendered with format! and an
// HTML-escape helper rather than a template engine. The frontend script
// takes over after load and talks to the JSON API.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::identity::Identity;
use crate::tasks::TaskRow;
use crate::AppContext;

pub async fn index(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
) -> Result<Response, (StatusCode, Json<Value>)> {
    let identity = Identity::resolve(&headers);
    let tasks = ctx.tasks.list_visible(&identity.visitor).await.map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": e.to_string() })),
        )
    })?;
    Ok(identity.apply(Html(render_index(&tasks)).into_response()))
}

fn render_index(tasks: &[TaskRow]) -> String {
    let items: String = tasks
        .iter()
        .map(|t| {
            format!(
                r#"            <li class="task-item{completed}" data-id="{id}">
                <div class="task-content">
                    <div class="checkbox"></div>
                    <span>{title}</span>
                </div>
                <button class="delete-btn">&times;</button>
            </li>
"#,
                completed = if t.is_complete { " completed" } else { "" },
                id = t.id,
                title = escape_html(&t.title),
            )
        })
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Tasks</title>
    <link rel="stylesheet" href="/static/css/style.css">
</head>
<body>
    <main class="app">
        <header>
            <h1>Tasks</h1>
            <p id="date-display"></p>
        </header>
        <div class="input-row">
            <input id="task-input" type="text" placeholder="Add a task" autocomplete="off">
            <button id="add-btn">Add</button>
        </div>
        <ul id="task-list">
{items}        </ul>
    </main>
    <script src="/static/js/script.js"></script>
    <script>
        if ('serviceWorker' in navigator) {{
            navigator.serviceWorker.register('/sw.js');
        }}
    </script>
</body>
</html>
"#
    )
}

/// Minimal HTML entity escaping for user-supplied titles.
fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
