use std::path::Path;
use std::sync::Arc;

use log::info;
use rocket::form::Form;
use rocket::fs::TempFile;
use rocket::request::{FromRequest, Outcome};
use rocket::serde::json::Json;
use rocket::tokio::io::AsyncReadExt;
use rocket::{Request, State};
use serde::Serialize;

use crate::auth::AdminUser;
use crate::config::{AppConfig, StorageStrategy, UploadConfig};
use crate::content::{self, DemoSlot};
use crate::error::ApiError;
use crate::store::Store;
use crate::uploads::{self, StoredAsset, UploadError};

#[derive(FromForm)]
pub struct UploadForm<'f> {
    pub file: TempFile<'f>,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub image_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size: Option<String>,
}

impl UploadResponse {
    fn new(message: String, asset: StoredAsset) -> Self {
        match asset {
            StoredAsset::Disk {
                reference,
                kind,
                size,
                ..
            } => UploadResponse {
                message,
                image_url: reference,
                file_type: Some(kind.label()),
                file_size: Some(uploads::human_size(size)),
            },
            StoredAsset::Inline { reference } => UploadResponse {
                message,
                image_url: reference,
                file_type: None,
                file_size: None,
            },
        }
    }
}

/// An upload read fully into memory.
struct Incoming {
    bytes: Vec<u8>,
    file_name: Option<String>,
    content_type: Option<String>,
}

async fn read_upload(file: &TempFile<'_>) -> Result<Incoming, UploadError> {
    let mut bytes = Vec::with_capacity(file.len() as usize);
    let reader = file.open().await?;
    rocket::tokio::pin!(reader);
    reader.read_to_end(&mut bytes).await?;

    Ok(Incoming {
        bytes,
        file_name: file
            .raw_name()
            .map(|n| n.dangerous_unsafe_unsanitized_raw().as_str().to_string()),
        content_type: file.content_type().map(|ct| ct.to_string()),
    })
}

fn store_asset(
    config: &UploadConfig,
    prefix: &str,
    incoming: &Incoming,
) -> Result<StoredAsset, UploadError> {
    match config.strategy {
        StorageStrategy::Disk => uploads::store_on_disk(
            Path::new(&config.dir),
            prefix,
            incoming.file_name.as_deref(),
            &incoming.bytes,
        ),
        StorageStrategy::Inline => Ok(uploads::store_inline(
            incoming.content_type.as_deref(),
            &incoming.bytes,
        )),
    }
}

// ── Hero ────────────────────────────────────────────────

#[post("/upload/hero", data = "<form>")]
pub async fn upload_hero(
    _admin: AdminUser,
    store: &State<Arc<dyn Store>>,
    config: &State<AppConfig>,
    form: Form<UploadForm<'_>>,
) -> Result<Json<UploadResponse>, ApiError> {
    let upload_config = &config.uploads;
    if upload_config.strategy == StorageStrategy::Disk {
        uploads::check_size(form.file.len(), upload_config.hero_max_bytes())?;
    }

    let incoming = read_upload(&form.file).await?;
    let asset = store_asset(upload_config, "hero", &incoming)?;
    content::set_hero_image(&**store.inner(), asset.reference().to_string())?;

    info!("Hero asset stored ({} bytes)", incoming.bytes.len());
    Ok(Json(UploadResponse::new(
        "Hero image uploaded successfully".to_string(),
        asset,
    )))
}

// ── Demo items ──────────────────────────────────────────

/// Position of `<_>` in `/upload/demo/<_>`, counted after the mount point.
const DEMO_INDEX_SEGMENT: usize = 2;

/// Resolved from the path before the multipart body is read, so a bad index
/// never spools an upload.
#[rocket::async_trait]
impl<'r> FromRequest<'r> for DemoSlot {
    type Error = ApiError;

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let slot = match request.param::<i64>(DEMO_INDEX_SEGMENT) {
            Some(Ok(raw)) => DemoSlot::try_from(raw).map_err(ApiError::from),
            _ => Err(ApiError::BadRequest(
                "Invalid demo item index. Must be 0, 1, or 2".to_string(),
            )),
        };
        match slot {
            Ok(slot) => Outcome::Success(slot),
            Err(e) => e.fail_guard(request),
        }
    }
}

#[post("/upload/demo/<_>", data = "<form>")]
pub async fn upload_demo(
    _admin: AdminUser,
    slot: DemoSlot,
    store: &State<Arc<dyn Store>>,
    config: &State<AppConfig>,
    form: Form<UploadForm<'_>>,
) -> Result<Json<UploadResponse>, ApiError> {
    let incoming = read_upload(&form.file).await?;
    let asset = store_asset(&config.uploads, &format!("demo{}", slot.index()), &incoming)?;
    content::set_demo_image(&**store.inner(), slot, asset.reference().to_string())?;

    info!(
        "Demo item {} asset stored ({} bytes)",
        slot.index(),
        incoming.bytes.len()
    );
    Ok(Json(UploadResponse::new(
        format!("Demo image {} uploaded successfully", slot.index()),
        asset,
    )))
}
