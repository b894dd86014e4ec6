use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};

use crate::error::ApiError;
use crate::services::DishService;
use crate::state::AppState;

/// GET /media/*reference - Serve a stored image
pub async fn get(
    State(state): State<AppState>,
    Path(reference): Path<String>,
) -> Result<Response, ApiError> {
    let image = DishService::new(&state).load_image(&reference).await?;
    Ok(([(header::CONTENT_TYPE, image.content_type)], image.bytes).into_response())
}
