use crate::error::MediaError;
use crate::models::{DownloadQuery, UploadResponse};
use crate::Media;
use atelier_domain::constants::MEDIA_TAG;
use atelier_identity::Session;
use atelier_kernel::server::ApiState;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

pub fn router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new().routes(routes!(upload)).routes(routes!(download))
}

fn media(state: &ApiState) -> Result<&Media, MediaError> {
    state.try_get_slice::<Media>().map_err(|e| MediaError::Internal {
        message: e.to_string().into(),
        context: Some("Media slice not registered".into()),
    })
}

#[utoipa::path(
    post,
    path = "/v1/media",
    request_body(content = String, content_type = "multipart/form-data"),
    responses(
        (status = OK, description = "Attachment stored", body = UploadResponse),
        (status = UNPROCESSABLE_ENTITY, description = "Missing file or size cap exceeded"),
    ),
    tag = MEDIA_TAG,
)]
async fn upload(
    State(state): State<ApiState>,
    session: Session,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, MediaError> {
    let max_bytes = state.config.storage.max_upload_mb.saturating_mul(1024 * 1024);

    while let Some(field) = multipart.next_field().await.map_err(|e| MediaError::Validation {
        message: e.to_string().into(),
        context: Some("Reading multipart body".into()),
    })? {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().unwrap_or("attachment").to_owned();
        let content_type =
            field.content_type().unwrap_or("application/octet-stream").to_owned();

        let bytes = field.bytes().await.map_err(|e| MediaError::Validation {
            message: e.to_string().into(),
            context: Some("Reading file field".into()),
        })?;

        if bytes.len() as u64 > max_bytes {
            return Err(MediaError::Validation {
                message: format!(
                    "file: exceeds the {} MB upload limit",
                    state.config.storage.max_upload_mb
                )
                .into(),
                context: None,
            });
        }

        let row =
            media(&state)?.store().save(&session.user_id, &file_name, &content_type, &bytes).await?;

        return Ok(Json(UploadResponse {
            id: row.id,
            file_name: row.file_name,
            content_type: row.content_type,
            length: row.length,
        }));
    }

    Err(MediaError::Validation { message: "file: field missing".into(), context: None })
}

#[utoipa::path(
    get,
    path = "/v1/media/{id}",
    params(DownloadQuery),
    responses(
        (status = OK, description = "Attachment payload"),
        (status = NOT_FOUND, description = "Unknown attachment"),
    ),
    tag = MEDIA_TAG,
)]
async fn download(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Query(query): Query<DownloadQuery>,
) -> Result<Response, MediaError> {
    let (row, bytes) = media(&state)?.store().load(&id).await?;

    let as_attachment = query.mode.as_deref() == Some("attachment")
        || !row.content_type.starts_with("image/");

    let encoded_name: String = row
        .file_name
        .chars()
        .map(|c| if c == '"' || c.is_control() { '_' } else { c })
        .collect();

    let mut headers = vec![
        (header::CONTENT_TYPE, row.content_type.clone()),
        (header::CONTENT_LENGTH, bytes.len().to_string()),
    ];
    if as_attachment {
        headers.push((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{encoded_name}\""),
        ));
    }

    let mut response = bytes.into_response();
    let header_map = response.headers_mut();
    header_map.clear();
    for (name, value) in headers {
        if let Ok(parsed) = value.parse() {
            header_map.insert(name, parsed);
        }
    }
    header_map.insert("x-file-name", encoded_name.parse().unwrap_or_else(|_| {
        header::HeaderValue::from_static("attachment")
    }));

    Ok(response)
}
