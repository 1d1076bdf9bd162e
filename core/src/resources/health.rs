use crate::client::Endpoint;
use crate::schema::Json;
use crate::types::Health;

pub fn get() -> Endpoint<Json<Health>> {
    Endpoint::get("/healthz", Json::new())
}
