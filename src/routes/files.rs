use std::path::Path;

use rocket::fs::NamedFile;
use rocket::http::{Header, Status};
use rocket::response::{self, Responder};
use rocket::{Request, State};

use crate::config::AppConfig;
use crate::error::ApiError;
use crate::uploads;

/// A stored upload with the content type from the extension table,
/// replacing whatever `NamedFile` guessed.
pub struct UploadedFile {
    file: NamedFile,
    content_type: &'static str,
}

impl<'r> Responder<'r, 'static> for UploadedFile {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        let mut resp = self.file.respond_to(req)?;
        resp.set_header(Header::new("Content-Type", self.content_type));
        Ok(resp)
    }
}

fn not_found() -> ApiError {
    ApiError::NotFound("File not found".to_string())
}

async fn open_upload(config: &AppConfig, filename: &str) -> Result<UploadedFile, ApiError> {
    let path = uploads::resolve(Path::new(&config.uploads.dir), filename).ok_or_else(not_found)?;
    let file = NamedFile::open(&path).await.map_err(|_| not_found())?;
    Ok(UploadedFile {
        file,
        content_type: uploads::mime_for(filename),
    })
}

#[get("/uploads/<filename>")]
pub async fn serve_upload(
    config: &State<AppConfig>,
    filename: &str,
) -> Result<UploadedFile, ApiError> {
    open_upload(config, filename).await
}

/// Same lookup as GET; Rocket drops the body and keeps the headers.
#[head("/uploads/<filename>")]
pub async fn probe_upload(
    config: &State<AppConfig>,
    filename: &str,
) -> Result<UploadedFile, ApiError> {
    open_upload(config, filename).await
}

/// CORS preflight for any path under the API base.
#[options("/<_..>")]
pub fn preflight() -> Status {
    Status::NoContent
}
