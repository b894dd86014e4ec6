use std::sync::Arc;

use tracing::info;

use super::{release_images, Viewer};
use crate::api::{DishResponse, MenuDetail, MenuPayload};
use crate::database::models::{Menu, MenuSummary};
use crate::database::MenuStore;
use crate::error::ApiError;
use crate::media::ImageStore;
use crate::state::{AppState, ServiceOptions};
use crate::validation::FieldErrors;

const NAME_TAKEN: &str = "menu with this name already exists.";

pub struct MenuService {
    store: Arc<dyn MenuStore>,
    images: Arc<dyn ImageStore>,
    options: ServiceOptions,
}

impl MenuService {
    pub fn new(state: &AppState) -> Self {
        Self {
            store: state.store.clone(),
            images: state.images.clone(),
            options: state.options,
        }
    }

    fn hides_empty(&self, viewer: Viewer) -> bool {
        viewer == Viewer::Anonymous && self.options.hide_empty_menus_from_public
    }

    pub async fn list(&self, viewer: Viewer) -> Result<Vec<MenuSummary>, ApiError> {
        let mut menus = self.store.list_menus().await?;
        if self.hides_empty(viewer) {
            menus.retain(|m| m.dish_count > 0);
        }
        Ok(menus)
    }

    pub async fn get(&self, id: i64, viewer: Viewer) -> Result<MenuDetail, ApiError> {
        let menu = self.find(id).await?;
        let dishes = self.store.list_dishes(id).await?.unwrap_or_default();
        if dishes.is_empty() && self.hides_empty(viewer) {
            return Err(menu_not_found(id));
        }

        let dishes = dishes
            .into_iter()
            .map(|d| DishResponse::new(d, self.images.as_ref()))
            .collect();
        Ok(MenuDetail { menu, dishes })
    }

    pub async fn create(&self, payload: MenuPayload) -> Result<Menu, ApiError> {
        let new = payload.validate_full()?;
        self.ensure_name_free(&new.name, None).await?;

        let menu = self.store.insert_menu(new).await?;
        info!("Created menu {} ({})", menu.id, menu.name);
        Ok(menu)
    }

    /// `PUT`: required fields are replaced, omitted optional ones kept
    pub async fn replace(&self, id: i64, payload: MenuPayload) -> Result<Menu, ApiError> {
        self.find(id).await?;
        let changes = payload.validate_replace()?;
        if let Some(name) = &changes.name {
            self.ensure_name_free(name, Some(id)).await?;
        }

        self.store
            .update_menu(id, changes)
            .await?
            .ok_or_else(|| menu_not_found(id))
    }

    /// `PATCH`: only the fields present are changed
    pub async fn update(&self, id: i64, payload: MenuPayload) -> Result<Menu, ApiError> {
        let current = self.find(id).await?;
        let changes = payload.validate_partial()?;
        if changes.is_empty() {
            return Ok(current);
        }
        if let Some(name) = &changes.name {
            self.ensure_name_free(name, Some(id)).await?;
        }

        self.store
            .update_menu(id, changes)
            .await?
            .ok_or_else(|| menu_not_found(id))
    }

    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        let images = self
            .store
            .delete_menu(id)
            .await?
            .ok_or_else(|| menu_not_found(id))?;

        info!("Deleted menu {} and its dishes", id);
        release_images(self.images.as_ref(), images).await;
        Ok(())
    }

    async fn find(&self, id: i64) -> Result<Menu, ApiError> {
        self.store
            .get_menu(id)
            .await?
            .ok_or_else(|| menu_not_found(id))
    }

    async fn ensure_name_free(&self, name: &str, exclude: Option<i64>) -> Result<(), ApiError> {
        if self.store.menu_name_taken(name, exclude).await? {
            return Err(FieldErrors::single("name", NAME_TAKEN).into());
        }
        Ok(())
    }
}

pub(crate) fn menu_not_found(id: i64) -> ApiError {
    ApiError::not_found(format!("Menu {} not found", id))
}
