use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::features::files::handlers;
use crate::features::files::services::FileService;
use crate::shared::constants::MAX_UPLOAD_SIZE;

pub fn routes(file_service: Arc<FileService>) -> Router {
    Router::new()
        .route(
            "/api/files/upload",
            // Multipart framing adds a little on top of the file itself
            post(handlers::upload_file).layer(DefaultBodyLimit::max(MAX_UPLOAD_SIZE + 1024 * 1024)),
        )
        .route("/api/files/download-url", get(handlers::download_url))
        .route("/api/files/upload-url", post(handlers::upload_url))
        .route("/api/files/metadata", get(handlers::file_metadata))
        .route("/api/files/copy", post(handlers::copy_file))
        .route("/api/files", axum::routing::delete(handlers::delete_file))
        .with_state(file_service)
}
