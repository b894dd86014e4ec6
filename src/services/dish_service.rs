use std::sync::Arc;

use tracing::info;

use super::menu_service::menu_not_found;
use super::{release_images, Viewer};
use crate::api::{DishPayload, DishResponse};
use crate::database::models::{Dish, DishChanges};
use crate::database::MenuStore;
use crate::error::ApiError;
use crate::media::{ImageStore, ImageUpload, StoredImage};
use crate::state::{AppState, ServiceOptions};

pub struct DishService {
    store: Arc<dyn MenuStore>,
    images: Arc<dyn ImageStore>,
    options: ServiceOptions,
}

impl DishService {
    pub fn new(state: &AppState) -> Self {
        Self {
            store: state.store.clone(),
            images: state.images.clone(),
            options: state.options,
        }
    }

    fn respond(&self, dish: Dish) -> DishResponse {
        DishResponse::new(dish, self.images.as_ref())
    }

    pub async fn list_for_menu(&self, menu_id: i64, viewer: Viewer) -> Result<Vec<DishResponse>, ApiError> {
        let dishes = self
            .store
            .list_dishes(menu_id)
            .await?
            .ok_or_else(|| menu_not_found(menu_id))?;

        let hidden = viewer == Viewer::Anonymous && self.options.hide_empty_menus_from_public;
        if dishes.is_empty() && hidden {
            return Err(menu_not_found(menu_id));
        }

        Ok(dishes.into_iter().map(|d| self.respond(d)).collect())
    }

    pub async fn create(&self, menu_id: i64, payload: DishPayload) -> Result<DishResponse, ApiError> {
        if self.store.get_menu(menu_id).await?.is_none() {
            return Err(menu_not_found(menu_id));
        }
        let new = payload.validate_full()?;

        let dish = self
            .store
            .insert_dish(menu_id, new)
            .await?
            .ok_or_else(|| menu_not_found(menu_id))?;
        info!("Created dish {} on menu {}", dish.id, menu_id);
        Ok(self.respond(dish))
    }

    pub async fn get(&self, id: i64) -> Result<DishResponse, ApiError> {
        self.find(id).await.map(|d| self.respond(d))
    }

    /// `PUT`: required fields are replaced, omitted optional ones kept
    pub async fn replace(&self, id: i64, payload: DishPayload) -> Result<DishResponse, ApiError> {
        self.find(id).await?;
        let changes = payload.validate_replace()?;
        self.apply(id, changes).await
    }

    /// `PATCH`: only the fields present are changed
    pub async fn update(&self, id: i64, payload: DishPayload) -> Result<DishResponse, ApiError> {
        let current = self.find(id).await?;
        let changes = payload.validate_partial()?;
        if changes.is_empty() {
            return Ok(self.respond(current));
        }
        self.apply(id, changes).await
    }

    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        let dish = self
            .store
            .delete_dish(id)
            .await?
            .ok_or_else(|| dish_not_found(id))?;

        info!("Deleted dish {}", id);
        release_images(self.images.as_ref(), dish.image).await;
        Ok(())
    }

    /// Store the blob and point the dish at it; the replaced blob is released
    pub async fn upload_image(&self, id: i64, upload: ImageUpload) -> Result<DishResponse, ApiError> {
        self.find(id).await?;
        let reference = self.images.store(upload).await?;

        let swap = match self.store.set_dish_image(id, Some(reference.clone())).await {
            Ok(Some(swap)) => swap,
            Ok(None) => {
                release_images(self.images.as_ref(), Some(reference)).await;
                return Err(dish_not_found(id));
            }
            Err(e) => {
                release_images(self.images.as_ref(), Some(reference)).await;
                return Err(e.into());
            }
        };

        info!("Attached image {} to dish {}", reference, id);
        release_images(self.images.as_ref(), swap.previous).await;
        Ok(self.respond(swap.dish))
    }

    pub async fn remove_image(&self, id: i64) -> Result<DishResponse, ApiError> {
        let swap = self
            .store
            .set_dish_image(id, None)
            .await?
            .ok_or_else(|| dish_not_found(id))?;

        release_images(self.images.as_ref(), swap.previous).await;
        Ok(self.respond(swap.dish))
    }

    /// Read back a stored image for serving
    pub async fn load_image(&self, reference: &str) -> Result<StoredImage, ApiError> {
        self.images
            .load(reference)
            .await?
            .ok_or_else(|| ApiError::not_found("Image not found"))
    }

    async fn apply(&self, id: i64, changes: DishChanges) -> Result<DishResponse, ApiError> {
        self.store
            .update_dish(id, changes)
            .await?
            .map(|d| self.respond(d))
            .ok_or_else(|| dish_not_found(id))
    }

    async fn find(&self, id: i64) -> Result<Dish, ApiError> {
        self.store
            .get_dish(id)
            .await?
            .ok_or_else(|| dish_not_found(id))
    }
}

fn dish_not_found(id: i64) -> ApiError {
    ApiError::not_found(format!("Dish {} not found", id))
}
