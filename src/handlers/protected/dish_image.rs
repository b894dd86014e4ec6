use axum::extract::State;
use tracing::debug;

use crate::api::{ApiMultipart, ApiPath, DishResponse};
use crate::error::ApiError;
use crate::media::ImageUpload;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::DishService;
use crate::state::AppState;
use crate::validation::FieldErrors;

const IMAGE_FIELD: &str = "image";
const NO_FILE: &str = "No file was submitted.";

/// POST /dishes/:id/image - Attach an image (multipart field `image`)
pub async fn post(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiMultipart(mut multipart): ApiMultipart,
) -> ApiResult<DishResponse> {
    let mut upload: Option<ImageUpload> = None;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(IMAGE_FIELD) {
            debug!("Ignoring multipart field {:?}", field.name());
            continue;
        }
        if upload.is_some() {
            return Err(ApiError::validation_error(
                "Invalid image",
                Some(FieldErrors::single(IMAGE_FIELD, "Upload a single image file.")),
            ));
        }

        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await?.to_vec();
        upload = Some(ImageUpload {
            file_name,
            content_type,
            bytes,
        });
    }

    let upload = upload.ok_or_else(|| {
        ApiError::validation_error("Invalid image", Some(FieldErrors::single(IMAGE_FIELD, NO_FILE)))
    })?;

    let dish = DishService::new(&state).upload_image(id, upload).await?;
    Ok(ApiResponse::success(dish))
}

/// DELETE /dishes/:id/image - Detach and discard the image
pub async fn delete(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> ApiResult<DishResponse> {
    let dish = DishService::new(&state).remove_image(id).await?;
    Ok(ApiResponse::success(dish))
}
