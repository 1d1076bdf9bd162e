use axum::http::{self, Request, StatusCode};
use axum::Router;
use clockwork_mock_server::{app, Category, ErrorBody, Project, TimeEntry};
use http_body_util::BodyExt;
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(String::new())
        .unwrap()
}

async fn send(app: &Router, request: Request<String>) -> axum::response::Response {
    app.clone().oneshot(request).await.unwrap()
}

async fn expect_error(app: &Router, request: Request<String>, status: StatusCode, code: &str) {
    let resp = send(app, request).await;
    assert_eq!(resp.status(), status);
    let err: ErrorBody = body_json(resp).await;
    assert_eq!(err.code, code);
    assert!(!err.request_id.is_empty());
}

async fn create_project(app: &Router, name: &str) -> Project {
    let body = serde_json::json!({ "name": name }).to_string();
    let resp = send(app, json_request("POST", "/api/projects", &body)).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    body_json(resp).await
}

async fn create_category(app: &Router, project: &Project, name: &str, parent: Option<&Category>) -> Category {
    let body = serde_json::json!({
        "name": name,
        "parentCategoryId": parent.map(|p| p.id),
    })
    .to_string();
    let uri = format!("/api/projects/{}/categories", project.id);
    let resp = send(app, json_request("POST", &uri, &body)).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    body_json(resp).await
}

// --- health ---

#[tokio::test]
async fn healthz_reports_up() {
    let app = app();
    let resp = send(&app, empty_request("GET", "/healthz")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["ok"], true);
    assert_eq!(body["db"], "up");
}

// --- projects ---

#[tokio::test]
async fn list_projects_empty() {
    let app = app();
    let resp = send(&app, empty_request("GET", "/api/projects")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let projects: Vec<Project> = body_json(resp).await;
    assert!(projects.is_empty());
}

#[tokio::test]
async fn create_project_returns_201() {
    let app = app();
    let project = create_project(&app, "Clockwork").await;
    assert_eq!(project.name, "Clockwork");
    assert!(project.description.is_none());
}

#[tokio::test]
async fn blank_project_name_is_rejected() {
    let app = app();
    expect_error(
        &app,
        json_request("POST", "/api/projects", r#"{"name":"   "}"#),
        StatusCode::BAD_REQUEST,
        "invalid_project_name",
    )
    .await;
}

#[tokio::test]
async fn malformed_json_returns_invalid_json() {
    let app = app();
    expect_error(
        &app,
        json_request("POST", "/api/projects", "{not json"),
        StatusCode::BAD_REQUEST,
        "invalid_json",
    )
    .await;
}

#[tokio::test]
async fn bad_uuid_returns_invalid_id() {
    let app = app();
    expect_error(
        &app,
        empty_request("GET", "/api/projects/not-a-uuid"),
        StatusCode::BAD_REQUEST,
        "invalid_id",
    )
    .await;
}

#[tokio::test]
async fn missing_project_returns_not_found() {
    let app = app();
    expect_error(
        &app,
        empty_request("GET", "/api/projects/00000000-0000-0000-0000-000000000000"),
        StatusCode::NOT_FOUND,
        "not_found",
    )
    .await;
}

#[tokio::test]
async fn patch_project_renames() {
    let app = app();
    let project = create_project(&app, "Old").await;
    let uri = format!("/api/projects/{}", project.id);
    let resp = send(&app, json_request("PATCH", &uri, r#"{"name":"New","description":"d"}"#)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Project = body_json(resp).await;
    assert_eq!(updated.name, "New");
    assert_eq!(updated.description.as_deref(), Some("d"));
    assert_eq!(updated.id, project.id);
}

#[tokio::test]
async fn delete_project_returns_204_and_empty_body() {
    let app = app();
    let project = create_project(&app, "Doomed").await;
    let uri = format!("/api/projects/{}", project.id);
    let resp = send(&app, empty_request("DELETE", &uri)).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(resp).await.is_empty());

    expect_error(&app, empty_request("DELETE", &uri), StatusCode::NOT_FOUND, "not_found").await;
}

// --- categories ---

#[tokio::test]
async fn categories_nest_under_parent() {
    let app = app();
    let project = create_project(&app, "P").await;
    let parent = create_category(&app, &project, "Parent", None).await;
    let child = create_category(&app, &project, "Child", Some(&parent)).await;
    assert_eq!(child.parent_category_id, Some(parent.id));

    let uri = format!("/api/projects/{}/categories", project.id);
    let resp = send(&app, empty_request("GET", &uri)).await;
    let all: Vec<Category> = body_json(resp).await;
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn unknown_parent_is_invalid_parent() {
    let app = app();
    let project = create_project(&app, "P").await;
    let uri = format!("/api/projects/{}/categories", project.id);
    expect_error(
        &app,
        json_request(
            "POST",
            &uri,
            r#"{"name":"x","parentCategoryId":"99999999-9999-4999-8999-999999999999"}"#,
        ),
        StatusCode::BAD_REQUEST,
        "invalid_parent",
    )
    .await;
}

#[tokio::test]
async fn parent_from_other_project_is_rejected() {
    let app = app();
    let first = create_project(&app, "First").await;
    let second = create_project(&app, "Second").await;
    let foreign = create_category(&app, &first, "Foreign", None).await;
    let uri = format!("/api/projects/{}/categories", second.id);
    let body = serde_json::json!({ "name": "x", "parentCategoryId": foreign.id }).to_string();
    expect_error(
        &app,
        json_request("POST", &uri, &body),
        StatusCode::BAD_REQUEST,
        "cross_project_parent",
    )
    .await;
}

#[tokio::test]
async fn reparenting_under_descendant_is_a_cycle() {
    let app = app();
    let project = create_project(&app, "P").await;
    let root = create_category(&app, &project, "Root", None).await;
    let child = create_category(&app, &project, "Child", Some(&root)).await;
    let uri = format!("/api/projects/{}/categories/{}", project.id, root.id);

    let body = serde_json::json!({ "name": "Root", "parentCategoryId": child.id }).to_string();
    expect_error(&app, json_request("PATCH", &uri, &body), StatusCode::CONFLICT, "category_cycle").await;

    let body = serde_json::json!({ "name": "Root", "parentCategoryId": root.id }).to_string();
    expect_error(&app, json_request("PATCH", &uri, &body), StatusCode::CONFLICT, "category_cycle").await;
}

#[tokio::test]
async fn deleting_category_removes_descendants() {
    let app = app();
    let project = create_project(&app, "P").await;
    let root = create_category(&app, &project, "Root", None).await;
    let child = create_category(&app, &project, "Child", Some(&root)).await;

    let uri = format!("/api/projects/{}/categories/{}", project.id, root.id);
    let resp = send(&app, empty_request("DELETE", &uri)).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let child_uri = format!("/api/projects/{}/categories/{}", project.id, child.id);
    expect_error(&app, empty_request("GET", &child_uri), StatusCode::NOT_FOUND, "not_found").await;
}

// --- timer ---

#[tokio::test]
async fn active_is_null_when_idle() {
    let app = app();
    let resp = send(&app, empty_request("GET", "/api/time/active")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(&body_bytes(resp).await[..], b"null");
}

#[tokio::test]
async fn stop_without_timer_is_conflict() {
    let app = app();
    expect_error(
        &app,
        empty_request("POST", "/api/time/stop"),
        StatusCode::CONFLICT,
        "no_active_timer",
    )
    .await;
}

#[tokio::test]
async fn start_unknown_category_is_not_found() {
    let app = app();
    expect_error(
        &app,
        json_request(
            "POST",
            "/api/time/start",
            r#"{"categoryId":"99999999-9999-4999-8999-999999999999"}"#,
        ),
        StatusCode::NOT_FOUND,
        "not_found",
    )
    .await;
}

#[tokio::test]
async fn starting_again_stops_the_running_timer() {
    let app = app();
    let project = create_project(&app, "P").await;
    let a = create_category(&app, &project, "A", None).await;
    let b = create_category(&app, &project, "B", None).await;

    let start = |id: uuid::Uuid| json_request("POST", "/api/time/start", &format!(r#"{{"categoryId":"{id}"}}"#));
    let resp = send(&app, start(a.id)).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let first: TimeEntry = body_json(resp).await;
    assert!(first.stopped_at.is_none());

    let resp = send(&app, start(b.id)).await;
    let second: TimeEntry = body_json(resp).await;

    let resp = send(&app, empty_request("GET", "/api/time/active")).await;
    let active: Option<TimeEntry> = body_json(resp).await;
    assert_eq!(active.unwrap().id, second.id);

    let uri = format!("/api/time/entries?categoryId={}", a.id);
    let resp = send(&app, empty_request("GET", &uri)).await;
    let entries: Vec<TimeEntry> = body_json(resp).await;
    assert_eq!(entries.len(), 1);
    assert!(entries[0].stopped_at.is_some());
    assert!(entries[0].duration_seconds.is_some());

    let resp = send(&app, empty_request("POST", "/api/time/stop")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let stopped: TimeEntry = body_json(resp).await;
    assert_eq!(stopped.id, second.id);
    assert!(stopped.stopped_at.is_some());
}

// --- entries ---

#[tokio::test]
async fn entries_require_category_id() {
    let app = app();
    expect_error(
        &app,
        empty_request("GET", "/api/time/entries"),
        StatusCode::BAD_REQUEST,
        "invalid_id",
    )
    .await;
}

#[tokio::test]
async fn entries_reject_bad_timestamps() {
    let app = app();
    expect_error(
        &app,
        empty_request(
            "GET",
            "/api/time/entries?categoryId=22222222-2222-4222-8222-222222222222&from=yesterday",
        ),
        StatusCode::BAD_REQUEST,
        "invalid_time",
    )
    .await;
}

#[tokio::test]
async fn entries_reject_inverted_range() {
    let app = app();
    expect_error(
        &app,
        empty_request(
            "GET",
            "/api/time/entries?categoryId=22222222-2222-4222-8222-222222222222\
             &from=2025-11-02T00%3A00%3A00Z&to=2025-11-01T00%3A00%3A00Z",
        ),
        StatusCode::BAD_REQUEST,
        "invalid_time_range",
    )
    .await;
}

#[tokio::test]
async fn entries_accept_encoded_range() {
    let app = app();
    let resp = send(
        &app,
        empty_request(
            "GET",
            "/api/time/entries?categoryId=22222222-2222-4222-8222-222222222222\
             &from=2025-11-01T00%3A00%3A00Z&to=2025-11-02T00%3A00%3A00Z",
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let entries: Vec<TimeEntry> = body_json(resp).await;
    assert!(entries.is_empty());
}
