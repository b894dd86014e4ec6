use axum::extract::State;

use crate::api::{ApiJson, ApiPath, DishPayload, DishResponse};
use crate::auth::AuthUser;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::DishService;
use crate::state::AppState;

/// POST /menus/:menu_id/dishes - Add a dish to a menu
pub async fn post(
    _user: AuthUser,
    State(state): State<AppState>,
    ApiPath(menu_id): ApiPath<i64>,
    ApiJson(payload): ApiJson<DishPayload>,
) -> ApiResult<DishResponse> {
    let dish = DishService::new(&state).create(menu_id, payload).await?;
    Ok(ApiResponse::created(dish))
}
