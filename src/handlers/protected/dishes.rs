use axum::extract::State;

use crate::api::{ApiJson, ApiPath, DishPayload, DishResponse};
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::DishService;
use crate::state::AppState;

/// GET /dishes/:id
pub async fn get(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> ApiResult<DishResponse> {
    let dish = DishService::new(&state).get(id).await?;
    Ok(ApiResponse::success(dish))
}

/// PUT /dishes/:id
pub async fn put(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(payload): ApiJson<DishPayload>,
) -> ApiResult<DishResponse> {
    let dish = DishService::new(&state).replace(id, payload).await?;
    Ok(ApiResponse::success(dish))
}

/// PATCH /dishes/:id
pub async fn patch(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(payload): ApiJson<DishPayload>,
) -> ApiResult<DishResponse> {
    let dish = DishService::new(&state).update(id, payload).await?;
    Ok(ApiResponse::success(dish))
}

/// DELETE /dishes/:id
pub async fn delete(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> ApiResult<()> {
    DishService::new(&state).delete(id).await?;
    Ok(ApiResponse::no_content())
}
