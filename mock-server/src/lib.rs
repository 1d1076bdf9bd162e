use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    pub project_id: Uuid,
    pub parent_category_id: Option<Uuid>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeEntry {
    pub id: Uuid,
    pub category_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub stopped_at: Option<DateTime<Utc>>,
    pub duration_seconds: Option<u32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    pub request_id: String,
}

#[derive(Deserialize)]
pub struct ProjectCreate {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Deserialize)]
pub struct ProjectUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryWrite {
    pub name: String,
    pub description: Option<String>,
    pub parent_category_id: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartRequest {
    pub category_id: String,
}

#[derive(Default)]
pub struct Store {
    projects: HashMap<Uuid, Project>,
    categories: HashMap<Uuid, Category>,
    entries: Vec<TimeEntry>,
}

impl Store {
    fn active_mut(&mut self) -> Option<&mut TimeEntry> {
        self.entries.iter_mut().find(|e| e.stopped_at.is_none())
    }

    /// True if `candidate` is `id` itself or lies beneath it.
    fn is_self_or_descendant(&self, id: Uuid, candidate: Uuid) -> bool {
        let mut cursor = Some(candidate);
        let mut hops = 0;
        while let Some(current) = cursor {
            if current == id {
                return true;
            }
            hops += 1;
            if hops > self.categories.len() {
                return false;
            }
            cursor = self.categories.get(&current).and_then(|c| c.parent_category_id);
        }
        false
    }

    fn subtree(&self, root: Uuid) -> Vec<Uuid> {
        let mut out = vec![root];
        let mut i = 0;
        while i < out.len() {
            let current = out[i];
            out.extend(
                self.categories
                    .values()
                    .filter(|c| c.parent_category_id == Some(current))
                    .map(|c| c.id),
            );
            i += 1;
        }
        out
    }

    fn remove_categories(&mut self, ids: &[Uuid]) {
        for id in ids {
            self.categories.remove(id);
        }
        self.entries.retain(|e| !ids.contains(&e.category_id));
    }
}

pub type Db = Arc<RwLock<Store>>;

/// An API failure rendered as the `{code, message, requestId}` envelope.
#[derive(Debug)]
pub struct ApiFailure {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiFailure {
    fn new(status: StatusCode, code: &'static str, message: &str) -> Self {
        Self {
            status,
            code,
            message: message.to_string(),
        }
    }

    fn not_found(what: &str) -> Self {
        Self::new(StatusCode::NOT_FOUND, "not_found", &format!("{what} not found"))
    }

    fn invalid_id(what: &str) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "invalid_id", &format!("invalid {what}"))
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            code: self.code.to_string(),
            message: self.message,
            request_id: Uuid::new_v4().to_string(),
        };
        tracing::debug!(status = %self.status, code = self.code, request_id = %body.request_id, "request failed");
        (self.status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiFailure {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(error = %rejection, "rejected request body");
        Self::new(StatusCode::BAD_REQUEST, "invalid_json", "invalid JSON payload")
    }
}

type ApiResult<T> = Result<T, ApiFailure>;

fn parse_id(raw: &str, what: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiFailure::invalid_id(what))
}

fn parse_time(raw: &str) -> ApiResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| ApiFailure::new(StatusCode::BAD_REQUEST, "invalid_time", "invalid time"))
}

fn validate_name(name: &str) -> ApiResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ApiFailure::new(
            StatusCode::BAD_REQUEST,
            "invalid_project_name",
            "service: invalid project name",
        ));
    }
    Ok(trimmed.to_string())
}

fn duration_since(start: DateTime<Utc>, end: DateTime<Utc>) -> u32 {
    u32::try_from((end - start).num_seconds().max(0)).unwrap_or(u32::MAX)
}

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/projects", get(list_projects).post(create_project))
        .route(
            "/api/projects/{id}",
            get(get_project).patch(update_project).delete(delete_project),
        )
        .route(
            "/api/projects/{project_id}/categories",
            get(list_categories).post(create_category),
        )
        .route(
            "/api/projects/{project_id}/categories/{id}",
            get(get_category).patch(update_category).delete(delete_category),
        )
        .route("/api/time/start", post(start_timer))
        .route("/api/time/stop", post(stop_timer))
        .route("/api/time/active", get(active_timer))
        .route("/api/time/entries", get(list_entries))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn healthz() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "ok": true, "db": "up", "time": Utc::now() }))
}

// --- projects ---

async fn list_projects(State(db): State<Db>) -> Json<Vec<Project>> {
    let store = db.read().await;
    let mut projects: Vec<Project> = store.projects.values().cloned().collect();
    projects.sort_by_key(|p| p.created_at);
    Json(projects)
}

async fn create_project(
    State(db): State<Db>,
    input: Result<Json<ProjectCreate>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Project>)> {
    let Json(input) = input?;
    let now = Utc::now();
    let project = Project {
        id: Uuid::new_v4(),
        name: validate_name(&input.name)?,
        description: input.description,
        created_at: now,
        updated_at: now,
    };
    db.write().await.projects.insert(project.id, project.clone());
    Ok((StatusCode::CREATED, Json(project)))
}

async fn get_project(State(db): State<Db>, Path(id): Path<String>) -> ApiResult<Json<Project>> {
    let id = parse_id(&id, "projectId")?;
    let store = db.read().await;
    store
        .projects
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiFailure::not_found("project"))
}

async fn update_project(
    State(db): State<Db>,
    Path(id): Path<String>,
    input: Result<Json<ProjectUpdate>, JsonRejection>,
) -> ApiResult<Json<Project>> {
    let id = parse_id(&id, "projectId")?;
    let Json(input) = input?;
    let name = input.name.as_deref().map(validate_name).transpose()?;
    let mut store = db.write().await;
    let project = store
        .projects
        .get_mut(&id)
        .ok_or_else(|| ApiFailure::not_found("project"))?;
    if let Some(name) = name {
        project.name = name;
    }
    if input.description.is_some() {
        project.description = input.description;
    }
    project.updated_at = Utc::now();
    Ok(Json(project.clone()))
}

async fn delete_project(State(db): State<Db>, Path(id): Path<String>) -> ApiResult<StatusCode> {
    let id = parse_id(&id, "projectId")?;
    let mut store = db.write().await;
    store
        .projects
        .remove(&id)
        .ok_or_else(|| ApiFailure::not_found("project"))?;
    let owned: Vec<Uuid> = store
        .categories
        .values()
        .filter(|c| c.project_id == id)
        .map(|c| c.id)
        .collect();
    store.remove_categories(&owned);
    Ok(StatusCode::NO_CONTENT)
}

// --- categories ---

/// Resolves and checks a requested parent for a category in `project_id`.
fn check_parent(
    store: &Store,
    project_id: Uuid,
    raw_parent: Option<&str>,
) -> ApiResult<Option<Uuid>> {
    let Some(raw) = raw_parent else {
        return Ok(None);
    };
    let parent_id = parse_id(raw, "parentCategoryId")?;
    let parent = store.categories.get(&parent_id).ok_or_else(|| {
        ApiFailure::new(
            StatusCode::BAD_REQUEST,
            "invalid_parent",
            "service: invalid parent category",
        )
    })?;
    if parent.project_id != project_id {
        return Err(ApiFailure::new(
            StatusCode::BAD_REQUEST,
            "cross_project_parent",
            "service: parent category belongs to a different project",
        ));
    }
    Ok(Some(parent_id))
}

fn category_in_project(store: &Store, project_id: Uuid, id: Uuid) -> ApiResult<&Category> {
    store
        .categories
        .get(&id)
        .filter(|c| c.project_id == project_id)
        .ok_or_else(|| ApiFailure::not_found("category"))
}

async fn list_categories(
    State(db): State<Db>,
    Path(project_id): Path<String>,
) -> ApiResult<Json<Vec<Category>>> {
    let project_id = parse_id(&project_id, "projectId")?;
    let store = db.read().await;
    if !store.projects.contains_key(&project_id) {
        return Err(ApiFailure::not_found("project"));
    }
    let mut categories: Vec<Category> = store
        .categories
        .values()
        .filter(|c| c.project_id == project_id)
        .cloned()
        .collect();
    categories.sort_by_key(|c| c.created_at);
    Ok(Json(categories))
}

async fn create_category(
    State(db): State<Db>,
    Path(project_id): Path<String>,
    input: Result<Json<CategoryWrite>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Category>)> {
    let project_id = parse_id(&project_id, "projectId")?;
    let Json(input) = input?;
    let mut store = db.write().await;
    if !store.projects.contains_key(&project_id) {
        return Err(ApiFailure::not_found("project"));
    }
    let parent = check_parent(&store, project_id, input.parent_category_id.as_deref())?;
    let now = Utc::now();
    let category = Category {
        id: Uuid::new_v4(),
        project_id,
        parent_category_id: parent,
        name: input.name,
        description: input.description,
        created_at: now,
        updated_at: now,
    };
    store.categories.insert(category.id, category.clone());
    Ok((StatusCode::CREATED, Json(category)))
}

async fn get_category(
    State(db): State<Db>,
    Path((project_id, id)): Path<(String, String)>,
) -> ApiResult<Json<Category>> {
    let project_id = parse_id(&project_id, "projectId")?;
    let id = parse_id(&id, "categoryId")?;
    let store = db.read().await;
    category_in_project(&store, project_id, id).cloned().map(Json)
}

async fn update_category(
    State(db): State<Db>,
    Path((project_id, id)): Path<(String, String)>,
    input: Result<Json<CategoryWrite>, JsonRejection>,
) -> ApiResult<Json<Category>> {
    let project_id = parse_id(&project_id, "projectId")?;
    let id = parse_id(&id, "categoryId")?;
    let Json(input) = input?;
    let mut store = db.write().await;
    category_in_project(&store, project_id, id)?;
    let parent = check_parent(&store, project_id, input.parent_category_id.as_deref())?;
    if let Some(parent_id) = parent {
        if store.is_self_or_descendant(id, parent_id) {
            return Err(ApiFailure::new(
                StatusCode::CONFLICT,
                "category_cycle",
                "service: category cycle detected",
            ));
        }
    }
    let category = store
        .categories
        .get_mut(&id)
        .ok_or_else(|| ApiFailure::not_found("category"))?;
    category.name = input.name;
    category.description = input.description;
    category.parent_category_id = parent;
    category.updated_at = Utc::now();
    Ok(Json(category.clone()))
}

async fn delete_category(
    State(db): State<Db>,
    Path((project_id, id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    let project_id = parse_id(&project_id, "projectId")?;
    let id = parse_id(&id, "categoryId")?;
    let mut store = db.write().await;
    category_in_project(&store, project_id, id)?;
    let doomed = store.subtree(id);
    store.remove_categories(&doomed);
    Ok(StatusCode::NO_CONTENT)
}

// --- time ---

async fn start_timer(
    State(db): State<Db>,
    input: Result<Json<StartRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<TimeEntry>)> {
    let Json(input) = input?;
    let category_id = parse_id(&input.category_id, "categoryId")?;
    let mut store = db.write().await;
    if !store.categories.contains_key(&category_id) {
        return Err(ApiFailure::not_found("category"));
    }
    let now = Utc::now();
    if let Some(active) = store.active_mut() {
        active.duration_seconds = Some(duration_since(active.started_at, now));
        active.stopped_at = Some(now);
        active.updated_at = now;
    }
    let entry = TimeEntry {
        id: Uuid::new_v4(),
        category_id,
        started_at: now,
        stopped_at: None,
        duration_seconds: None,
        created_at: now,
        updated_at: now,
    };
    store.entries.push(entry.clone());
    Ok((StatusCode::CREATED, Json(entry)))
}

async fn stop_timer(State(db): State<Db>) -> ApiResult<Json<TimeEntry>> {
    let mut store = db.write().await;
    let active = store.active_mut().ok_or_else(|| {
        ApiFailure::new(
            StatusCode::CONFLICT,
            "no_active_timer",
            "service: no active timer",
        )
    })?;
    let now = Utc::now();
    active.duration_seconds = Some(duration_since(active.started_at, now));
    active.stopped_at = Some(now);
    active.updated_at = now;
    Ok(Json(active.clone()))
}

async fn active_timer(State(db): State<Db>) -> Json<Option<TimeEntry>> {
    let store = db.read().await;
    Json(store.entries.iter().find(|e| e.stopped_at.is_none()).cloned())
}

async fn list_entries(
    State(db): State<Db>,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult<Json<Vec<TimeEntry>>> {
    let raw_category = query.get("categoryId").map(String::as_str).unwrap_or("");
    let category_id = parse_id(raw_category, "categoryId")?;
    let from = query
        .get("from")
        .filter(|s| !s.is_empty())
        .map(|s| parse_time(s))
        .transpose()?;
    let to = query
        .get("to")
        .filter(|s| !s.is_empty())
        .map(|s| parse_time(s))
        .transpose()?;
    if let (Some(from), Some(to)) = (from, to) {
        if from > to {
            return Err(ApiFailure::new(
                StatusCode::BAD_REQUEST,
                "invalid_time_range",
                "invalid time range",
            ));
        }
    }
    let store = db.read().await;
    let mut entries: Vec<TimeEntry> = store
        .entries
        .iter()
        .filter(|e| e.category_id == category_id)
        .filter(|e| from.map_or(true, |from| e.started_at >= from))
        .filter(|e| to.map_or(true, |to| e.started_at <= to))
        .cloned()
        .collect();
    entries.sort_by_key(|e| e.started_at);
    Ok(Json(entries))
}
