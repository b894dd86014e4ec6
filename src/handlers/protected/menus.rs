use axum::extract::State;
use axum::http::Method;

use crate::api::{ApiJson, ApiPath, MenuPayload};
use crate::auth::AuthUser;
use crate::database::models::Menu;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::MenuService;
use crate::state::AppState;

/// POST /menus - Create a menu
pub async fn post(
    _user: AuthUser,
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<MenuPayload>,
) -> ApiResult<Menu> {
    let menu = MenuService::new(&state).create(payload).await?;
    Ok(ApiResponse::created(menu))
}

/// PUT /menus/:id - Replace a menu
pub async fn put(
    _user: AuthUser,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(payload): ApiJson<MenuPayload>,
) -> ApiResult<Menu> {
    let menu = MenuService::new(&state).replace(id, payload).await?;
    Ok(ApiResponse::success(menu))
}

/// PATCH /menus/:id - Partially update a menu
pub async fn patch(
    _user: AuthUser,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(payload): ApiJson<MenuPayload>,
) -> ApiResult<Menu> {
    let menu = MenuService::new(&state).update(id, payload).await?;
    Ok(ApiResponse::success(menu))
}

/// DELETE /menus/:id - Delete a menu together with its dishes
pub async fn delete(
    _user: AuthUser,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<()> {
    MenuService::new(&state).delete(id).await?;
    Ok(ApiResponse::no_content())
}

/// Writes to `/menus/:id` other than PUT/PATCH/DELETE. Authentication is
/// checked first so anonymous callers see 401, not 405.
pub async fn not_allowed(_user: AuthUser, method: Method) -> ApiError {
    ApiError::method_not_allowed(format!("Method \"{}\" not allowed.", method))
}
