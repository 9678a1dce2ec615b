pub mod content;
pub mod files;
pub mod upload;

/// Everything served under `/api/homepage`.
pub fn routes() -> Vec<rocket::Route> {
    routes![
        content::get_content,
        content::preview_content,
        content::update_content,
        content::reset_content,
        upload::upload_hero,
        upload::upload_demo,
        files::serve_upload,
        files::probe_upload,
        files::preflight,
    ]
}

/// Upload serving mounted at the root, so stored `/uploads/<name>` references
/// resolve without the API prefix.
pub fn upload_routes() -> Vec<rocket::Route> {
    routes![files::serve_upload, files::probe_upload]
}
