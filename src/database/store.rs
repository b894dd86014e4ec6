use async_trait::async_trait;
use thiserror::Error;

use super::models::{Dish, DishChanges, ImageSwap, Menu, MenuChanges, MenuSummary, NewDish, NewMenu};

/// Errors from a `MenuStore` backend
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Unique constraint violated on {0}")]
    UniqueViolation(&'static str),

    #[error("Corrupt row: {0}")]
    CorruptRow(String),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Durable storage for menus and their dishes.
///
/// Lookups of a missing row return `Ok(None)`; errors are reserved for
/// constraint violations and backend failures. Deleting a menu removes its
/// dishes in the same atomic step.
#[async_trait]
pub trait MenuStore: Send + Sync {
    async fn ping(&self) -> Result<(), StoreError>;

    /// All menus in id order, each with its current dish count
    async fn list_menus(&self) -> Result<Vec<MenuSummary>, StoreError>;

    async fn get_menu(&self, id: i64) -> Result<Option<Menu>, StoreError>;

    /// Whether `name` is used by a menu other than `exclude`
    async fn menu_name_taken(&self, name: &str, exclude: Option<i64>) -> Result<bool, StoreError>;

    async fn insert_menu(&self, menu: NewMenu) -> Result<Menu, StoreError>;

    async fn update_menu(&self, id: i64, changes: MenuChanges) -> Result<Option<Menu>, StoreError>;

    /// Removes the menu and every dish it owns. Returns the image references
    /// the removed dishes held so the caller can release the blobs.
    async fn delete_menu(&self, id: i64) -> Result<Option<Vec<String>>, StoreError>;

    /// `None` when the menu itself does not exist
    async fn list_dishes(&self, menu_id: i64) -> Result<Option<Vec<Dish>>, StoreError>;

    async fn get_dish(&self, id: i64) -> Result<Option<Dish>, StoreError>;

    /// `None` when the owning menu does not exist
    async fn insert_dish(&self, menu_id: i64, dish: NewDish) -> Result<Option<Dish>, StoreError>;

    async fn update_dish(&self, id: i64, changes: DishChanges) -> Result<Option<Dish>, StoreError>;

    async fn delete_dish(&self, id: i64) -> Result<Option<Dish>, StoreError>;

    /// Replace the dish's image reference, returning the one it held before
    async fn set_dish_image(&self, id: i64, image: Option<String>) -> Result<Option<ImageSwap>, StoreError>;
}

/// Date stamp used for `added_on` / `updated_on`
pub fn today() -> chrono::NaiveDate {
    chrono::Utc::now().date_naive()
}
