use axum::extract::State;

use crate::api::{ApiPath, MenuDetail};
use crate::auth::AuthUser;
use crate::database::models::MenuSummary;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::MenuService;
use crate::state::AppState;

/// GET /menus - List every menu
pub async fn list(
    user: Option<AuthUser>,
    State(state): State<AppState>,
) -> ApiResult<Vec<MenuSummary>> {
    let menus = MenuService::new(&state).list(user.as_ref().into()).await?;
    Ok(ApiResponse::success(menus))
}

/// GET /menus/:id - One menu with its dishes
pub async fn get(
    user: Option<AuthUser>,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<MenuDetail> {
    let menu = MenuService::new(&state).get(id, user.as_ref().into()).await?;
    Ok(ApiResponse::success(menu))
}
