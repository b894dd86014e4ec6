use chrono::NaiveDate;
use serde::Serialize;

use crate::database::models::{Dish, Menu};
use crate::media::ImageStore;
use crate::types::{PrepTime, Price};

/// Public wire form of a dish; `image` is a URL path rather than a store reference
#[derive(Debug, Clone, Serialize)]
pub struct DishResponse {
    pub id: i64,
    pub menu: i64,
    pub name: String,
    pub description: String,
    pub price: Price,
    pub preparation_time: PrepTime,
    pub is_vegetarian: bool,
    pub image: Option<String>,
    pub added_on: NaiveDate,
    pub updated_on: NaiveDate,
}

impl DishResponse {
    pub fn new(dish: Dish, images: &dyn ImageStore) -> Self {
        Self {
            id: dish.id,
            menu: dish.menu_id,
            image: dish.image.as_deref().map(|reference| images.url(reference)),
            name: dish.name,
            description: dish.description,
            price: dish.price,
            preparation_time: dish.preparation_time,
            is_vegetarian: dish.is_vegetarian,
            added_on: dish.added_on,
            updated_on: dish.updated_on,
        }
    }
}

/// Single menu with the dishes it owns
#[derive(Debug, Clone, Serialize)]
pub struct MenuDetail {
    #[serde(flatten)]
    pub menu: Menu,
    pub dishes: Vec<DishResponse>,
}
