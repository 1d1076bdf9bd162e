use uuid::Uuid;

use crate::client::{Endpoint, RequestOptions};
use crate::error::ClientError;
use crate::http::HttpMethod;
use crate::schema::{Json, NoContent};
use crate::types::{Project, ProjectInput};

const BASE: &str = "/api/projects";

pub fn list() -> Endpoint<Json<Vec<Project>>> {
    Endpoint::get(BASE, Json::new())
}

pub fn create(input: &ProjectInput) -> Result<Endpoint<Json<Project>>, ClientError> {
    let options = RequestOptions::new(HttpMethod::Post).json(input)?;
    Ok(Endpoint::new(BASE, options, Json::new()))
}

pub fn get(id: Uuid) -> Endpoint<Json<Project>> {
    Endpoint::get(format!("{BASE}/{id}"), Json::new())
}

pub fn update(id: Uuid, input: &ProjectInput) -> Result<Endpoint<Json<Project>>, ClientError> {
    let options = RequestOptions::new(HttpMethod::Patch).json(input)?;
    Ok(Endpoint::new(format!("{BASE}/{id}"), options, Json::new()))
}

pub fn delete(id: Uuid) -> Endpoint<NoContent> {
    Endpoint::new(format!("{BASE}/{id}"), RequestOptions::new(HttpMethod::Delete), NoContent)
}
