use uuid::Uuid;

use crate::client::{Endpoint, RequestOptions};
use crate::error::ClientError;
use crate::http::HttpMethod;
use crate::schema::{Json, NoContent};
use crate::types::{Category, CategoryInput};

fn collection(project_id: Uuid) -> String {
    format!("/api/projects/{project_id}/categories")
}

fn item(project_id: Uuid, category_id: Uuid) -> String {
    format!("/api/projects/{project_id}/categories/{category_id}")
}

pub fn list(project_id: Uuid) -> Endpoint<Json<Vec<Category>>> {
    Endpoint::get(collection(project_id), Json::new())
}

/// May fail with `invalid_parent`, `cross_project_parent` or `category_cycle`.
pub fn create(project_id: Uuid, input: &CategoryInput) -> Result<Endpoint<Json<Category>>, ClientError> {
    let options = RequestOptions::new(HttpMethod::Post).json(input)?;
    Ok(Endpoint::new(collection(project_id), options, Json::new()))
}

pub fn get(project_id: Uuid, category_id: Uuid) -> Endpoint<Json<Category>> {
    Endpoint::get(item(project_id, category_id), Json::new())
}

pub fn update(
    project_id: Uuid,
    category_id: Uuid,
    input: &CategoryInput,
) -> Result<Endpoint<Json<Category>>, ClientError> {
    let options = RequestOptions::new(HttpMethod::Patch).json(input)?;
    Ok(Endpoint::new(item(project_id, category_id), options, Json::new()))
}

pub fn delete(project_id: Uuid, category_id: Uuid) -> Endpoint<NoContent> {
    Endpoint::new(
        item(project_id, category_id),
        RequestOptions::new(HttpMethod::Delete),
        NoContent,
    )
}
