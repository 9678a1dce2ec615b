use std::sync::Arc;

use rocket::data::{Limits, ToByteUnit};
use rocket::fairing::{Fairing, Info, Kind};
use rocket::figment::Figment;
use rocket::http::{Header, Status};
use rocket::serde::json::Json;
use rocket::{Build, Request, Rocket};
use serde_json::{json, Value};

use crate::auth::AdminVerifier;
use crate::config::AppConfig;
use crate::error::GuardDetail;
use crate::routes;
use crate::store::Store;

/// Mount point of every route.
pub const API_BASE: &str = "/api/homepage";

/// Adds CORS headers to every response.
pub struct Cors {
    allow_origin: String,
}

impl Cors {
    pub fn new(allow_origin: &str) -> Self {
        Cors {
            allow_origin: allow_origin.to_string(),
        }
    }
}

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "CORS headers",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, _req: &'r Request<'_>, res: &mut rocket::Response<'r>) {
        res.set_header(Header::new(
            "Access-Control-Allow-Origin",
            self.allow_origin.clone(),
        ));
        res.set_header(Header::new(
            "Access-Control-Allow-Methods",
            "GET, HEAD, PUT, POST, OPTIONS",
        ));
        res.set_header(Header::new(
            "Access-Control-Allow-Headers",
            "Authorization, Content-Type",
        ));
    }
}

#[catch(401)]
fn unauthorized() -> Json<Value> {
    Json(json!({ "detail": "Not authenticated" }))
}

#[catch(default)]
fn default_catcher(status: Status, req: &Request) -> (Status, Json<Value>) {
    let detail = match &req.local_cache(|| GuardDetail(None)).0 {
        Some(detail) => detail.clone(),
        None => status.reason().unwrap_or("Error").to_string(),
    };
    (status, Json(json!({ "detail": detail })))
}

/// Rocket's default figment with upload limits raised to the configured size.
pub fn figment(config: &AppConfig) -> Figment {
    let limit = config.uploads.request_limit_bytes();
    let limits = Limits::default()
        .limit("file", limit.bytes())
        .limit("data-form", limit.bytes());
    rocket::Config::figment().merge(("limits", limits))
}

pub fn build(
    figment: Figment,
    config: AppConfig,
    store: Arc<dyn Store>,
    verifier: Arc<dyn AdminVerifier>,
) -> Rocket<Build> {
    let cors = Cors::new(&config.cors.allow_origin);

    rocket::custom(figment)
        .manage(store)
        .manage(verifier)
        .manage(config)
        .attach(cors)
        .mount(API_BASE, routes::routes())
        .mount("/", routes::upload_routes())
        .register("/", catchers![unauthorized, default_catcher])
}
