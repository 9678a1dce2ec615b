use std::sync::Arc;

use rocket::serde::json::Json;
use rocket::State;

use crate::auth::AdminUser;
use crate::content;
use crate::error::ApiError;
use crate::models::homepage::{HomepageContent, HomepageUpdate};
use crate::store::Store;

// ── Public reads ────────────────────────────────────────

#[get("/content")]
pub fn get_content(store: &State<Arc<dyn Store>>) -> Result<Json<HomepageContent>, ApiError> {
    Ok(Json(content::get(&**store.inner())?))
}

/// Same document as `/content`; the admin preview pane polls this one.
#[get("/content/preview")]
pub fn preview_content(store: &State<Arc<dyn Store>>) -> Result<Json<HomepageContent>, ApiError> {
    get_content(store)
}

// ── Admin writes ────────────────────────────────────────

#[put("/content", data = "<update>")]
pub fn update_content(
    _admin: AdminUser,
    store: &State<Arc<dyn Store>>,
    update: Json<HomepageUpdate>,
) -> Result<Json<HomepageContent>, ApiError> {
    Ok(Json(content::replace(&**store.inner(), update.into_inner())?))
}

#[post("/content/reset")]
pub fn reset_content(
    _admin: AdminUser,
    store: &State<Arc<dyn Store>>,
) -> Result<Json<HomepageContent>, ApiError> {
    Ok(Json(content::reset(&**store.inner())?))
}
