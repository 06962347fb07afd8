/*
 * Responsibility
 * - Poster upload/download handlers
 * - Upload requires ADMIN, download any authenticated user (access table)
 */
use axum::{
    extract::{Multipart, Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

use crate::{
    error::AppError,
    services::files::{self, FileStoreError},
    state::AppState,
};

fn file_error(e: FileStoreError) -> AppError {
    match e {
        FileStoreError::InvalidName => AppError::InvalidRequest("invalid file name".into()),
        FileStoreError::NotFound => AppError::NotFound("file"),
        FileStoreError::Io(e) => {
            tracing::error!(error = %e, "file storage failure");
            AppError::Internal
        }
    }
}

/// Accepts a multipart body with a `file` field and answers with the stored
/// file name as plain text.
pub async fn upload_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, String), AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| AppError::InvalidRequest("malformed multipart body".into()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let original_name = field.file_name().unwrap_or("upload").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|_| AppError::InvalidRequest("malformed multipart body".into()))?;

        let stored = state
            .files
            .save(&original_name, &bytes)
            .await
            .map_err(file_error)?;
        return Ok((StatusCode::CREATED, stored));
    }

    Err(AppError::InvalidRequest("missing file field".into()))
}

pub async fn download_file(
    State(state): State<AppState>,
    Path(file_name): Path<String>,
) -> Result<Response, AppError> {
    let bytes = state.files.open(&file_name).await.map_err(file_error)?;
    let content_type = files::content_type_for(&file_name);

    Ok((
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        bytes,
    )
        .into_response())
}
