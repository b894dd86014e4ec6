use axum::extract::State;

use crate::api::{ApiPath, DishResponse};
use crate::auth::AuthUser;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::DishService;
use crate::state::AppState;

/// GET /menus/:menu_id/dishes - Dishes of one menu; 404 when the menu is missing
pub async fn list(
    user: Option<AuthUser>,
    State(state): State<AppState>,
    ApiPath(menu_id): ApiPath<i64>,
) -> ApiResult<Vec<DishResponse>> {
    let dishes = DishService::new(&state)
        .list_for_menu(menu_id, user.as_ref().into())
        .await?;
    Ok(ApiResponse::success(dishes))
}
