use std::sync::Arc;

use axum::Json;
use axum::extract::multipart::{Multipart, MultipartRejection};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use serde_json::json;

use super::{AppState, error_response};
use crate::commands;
use crate::import::{ManualEntry, UploadSource};
use crate::{ClientError, ClientResult};

const UPLOAD_FIELD: &str = "file";

pub(super) async fn ping() -> Response {
    Json(json!({"status": "ok"})).into_response()
}

/// Requests that are not multipart at all are treated like a form without a file.
pub(super) async fn score_upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let multipart = match multipart {
        Ok(multipart) => multipart,
        Err(rejection) => {
            log::debug!("upload is not a multipart form: {}", rejection.body_text());
            return error_response(&ClientError::upload_empty());
        }
    };
    let upload = match read_upload(multipart).await {
        Ok(Some(upload)) => upload,
        Ok(None) => return error_response(&ClientError::upload_empty()),
        Err(error) => return error_response(&error),
    };

    log::info!(
        "scoring upload {} ({} bytes)",
        upload.file_name.as_deref().unwrap_or("<unnamed>"),
        upload.bytes.len()
    );
    let store = Arc::clone(&state.store);
    let scored =
        tokio::task::spawn_blocking(move || commands::score::run_upload(&upload, &store)).await;
    match scored {
        Ok(Ok(data)) => Json(data).into_response(),
        Ok(Err(error)) => error_response(&error),
        Err(join_error) => error_response(&ClientError::internal_scoring_task(
            &join_error.to_string(),
        )),
    }
}

pub(super) async fn score_manual(
    payload: Result<Json<ManualEntry>, JsonRejection>,
) -> Response {
    let entry = match payload {
        Ok(Json(entry)) => entry,
        Err(rejection) => {
            return error_response(&ClientError::invalid_argument(&format!(
                "Manual entry body must be a JSON object: {}",
                rejection.body_text()
            )));
        }
    };

    match commands::manual::score(&entry) {
        Ok(data) => Json(data).into_response(),
        Err(error) => error_response(&error),
    }
}

pub(super) async fn customer_detail(
    State(state): State<AppState>,
    Path(customer_id): Path<String>,
) -> Response {
    customer_response(state.store.find_customer(None, &customer_id))
}

pub(super) async fn batch_customer_detail(
    State(state): State<AppState>,
    Path((batch_id, customer_id)): Path<(String, String)>,
) -> Response {
    customer_response(state.store.find_customer(Some(&batch_id), &customer_id))
}

fn customer_response(record: ClientResult<crate::engine::ScoredRecord>) -> Response {
    match record.and_then(|found| found.to_json()) {
        Ok(value) => Json(value).into_response(),
        Err(error) => error_response(&error),
    }
}

/// Pulls the `file` field out of the form; `None` when it is absent or empty.
async fn read_upload(mut multipart: Multipart) -> ClientResult<Option<UploadSource>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|error| malformed_form(&error.body_text()))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let file_name = field
            .file_name()
            .map(str::to_string)
            .filter(|name| !name.trim().is_empty());
        let bytes = field
            .bytes()
            .await
            .map_err(|error| malformed_form(&error.body_text()))?;
        if bytes.is_empty() && file_name.is_none() {
            return Ok(None);
        }
        return Ok(Some(UploadSource::from_upload(file_name, bytes.to_vec())));
    }
    Ok(None)
}

fn malformed_form(detail: &str) -> ClientError {
    ClientError::invalid_argument_with_recovery(
        &format!("Upload body is not a readable multipart form: {detail}"),
        vec!["Send the workbook as multipart/form-data in a `file` field.".to_string()],
    )
}
