use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::models::{Dish, DishChanges, ImageSwap, Menu, MenuChanges, MenuSummary, NewDish, NewMenu};
use super::store::{today, MenuStore, StoreError};

#[derive(Default)]
struct Tables {
    menus: BTreeMap<i64, Menu>,
    dishes: BTreeMap<i64, Dish>,
    last_menu_id: i64,
    last_dish_id: i64,
}

impl Tables {
    fn name_taken(&self, name: &str, exclude: Option<i64>) -> bool {
        self.menus
            .values()
            .any(|m| m.name == name && Some(m.id) != exclude)
    }
}

/// Process-local store used when no database is configured and in tests.
///
/// Every mutation runs under one write lock, so the menu cascade is atomic.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MenuStore for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn list_menus(&self) -> Result<Vec<MenuSummary>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .menus
            .values()
            .map(|menu| MenuSummary {
                menu: menu.clone(),
                dish_count: tables.dishes.values().filter(|d| d.menu_id == menu.id).count() as i64,
            })
            .collect())
    }

    async fn get_menu(&self, id: i64) -> Result<Option<Menu>, StoreError> {
        Ok(self.tables.read().await.menus.get(&id).cloned())
    }

    async fn menu_name_taken(&self, name: &str, exclude: Option<i64>) -> Result<bool, StoreError> {
        Ok(self.tables.read().await.name_taken(name, exclude))
    }

    async fn insert_menu(&self, menu: NewMenu) -> Result<Menu, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.name_taken(&menu.name, None) {
            return Err(StoreError::UniqueViolation("name"));
        }

        tables.last_menu_id += 1;
        let now = today();
        let menu = Menu {
            id: tables.last_menu_id,
            name: menu.name,
            description: menu.description,
            added_on: now,
            updated_on: now,
        };
        tables.menus.insert(menu.id, menu.clone());
        Ok(menu)
    }

    async fn update_menu(&self, id: i64, changes: MenuChanges) -> Result<Option<Menu>, StoreError> {
        let mut tables = self.tables.write().await;
        if let Some(name) = &changes.name {
            if tables.name_taken(name, Some(id)) {
                return Err(StoreError::UniqueViolation("name"));
            }
        }

        let Some(menu) = tables.menus.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = changes.name {
            menu.name = name;
        }
        if let Some(description) = changes.description {
            menu.description = description;
        }
        menu.updated_on = today();
        Ok(Some(menu.clone()))
    }

    async fn delete_menu(&self, id: i64) -> Result<Option<Vec<String>>, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.menus.remove(&id).is_none() {
            return Ok(None);
        }

        let mut images = Vec::new();
        tables.dishes.retain(|_, dish| {
            if dish.menu_id != id {
                return true;
            }
            images.extend(dish.image.take());
            false
        });
        Ok(Some(images))
    }

    async fn list_dishes(&self, menu_id: i64) -> Result<Option<Vec<Dish>>, StoreError> {
        let tables = self.tables.read().await;
        if !tables.menus.contains_key(&menu_id) {
            return Ok(None);
        }
        Ok(Some(
            tables
                .dishes
                .values()
                .filter(|d| d.menu_id == menu_id)
                .cloned()
                .collect(),
        ))
    }

    async fn get_dish(&self, id: i64) -> Result<Option<Dish>, StoreError> {
        Ok(self.tables.read().await.dishes.get(&id).cloned())
    }

    async fn insert_dish(&self, menu_id: i64, dish: NewDish) -> Result<Option<Dish>, StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.menus.contains_key(&menu_id) {
            return Ok(None);
        }

        tables.last_dish_id += 1;
        let now = today();
        let dish = Dish {
            id: tables.last_dish_id,
            menu_id,
            name: dish.name,
            description: dish.description,
            price: dish.price,
            preparation_time: dish.preparation_time,
            is_vegetarian: dish.is_vegetarian,
            image: None,
            added_on: now,
            updated_on: now,
        };
        tables.dishes.insert(dish.id, dish.clone());
        Ok(Some(dish))
    }

    async fn update_dish(&self, id: i64, changes: DishChanges) -> Result<Option<Dish>, StoreError> {
        let mut tables = self.tables.write().await;
        let Some(dish) = tables.dishes.get_mut(&id) else {
            return Ok(None);
        };
        changes.apply(dish);
        dish.updated_on = today();
        Ok(Some(dish.clone()))
    }

    async fn delete_dish(&self, id: i64) -> Result<Option<Dish>, StoreError> {
        Ok(self.tables.write().await.dishes.remove(&id))
    }

    async fn set_dish_image(&self, id: i64, image: Option<String>) -> Result<Option<ImageSwap>, StoreError> {
        let mut tables = self.tables.write().await;
        let Some(dish) = tables.dishes.get_mut(&id) else {
            return Ok(None);
        };
        let previous = std::mem::replace(&mut dish.image, image);
        dish.updated_on = today();
        Ok(Some(ImageSwap {
            dish: dish.clone(),
            previous,
        }))
    }
}
