//! `/cvs/*` — CV ingestion (C6).

use axum::extract::{Multipart, State};
use axum::Json;

use crate::errors::AppError;
use crate::ingestion::{self, IngestionSummary, UploadedFile};
use crate::state::AppState;

pub async fn handle_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<IngestionSummary>, AppError> {
    let mut files = Vec::new();
    let mut batch_tag: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or("").to_string();
        if name == "batch_tag" {
            batch_tag = Some(
                field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("invalid batch_tag field: {e}")))?,
            );
            continue;
        }
        if name != "files" && name != "file" {
            continue;
        }
        let filename = field
            .file_name()
            .map(str::to_string)
            .unwrap_or_else(|| "upload.pdf".to_string());
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("failed to read upload body: {e}")))?;
        files.push(UploadedFile {
            filename,
            bytes: bytes.to_vec(),
        });
    }

    if files.is_empty() {
        return Err(AppError::Validation("no files in upload".to_string()));
    }

    let summary = ingestion::run_batch(
        &state.db,
        &state.llm,
        &state.config.cv_storage_dir,
        state.config.upload_concurrency,
        batch_tag,
        files,
    )
    .await;

    Ok(Json(summary))
}
