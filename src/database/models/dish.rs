use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::postgres::types::PgInterval;
use sqlx::FromRow;

use crate::types::{PrepTime, Price};

/// A dish as stored. `image` is the store reference, not a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dish {
    pub id: i64,
    pub menu_id: i64,
    pub name: String,
    pub description: String,
    pub price: Price,
    pub preparation_time: PrepTime,
    pub is_vegetarian: bool,
    pub image: Option<String>,
    pub added_on: NaiveDate,
    pub updated_on: NaiveDate,
}

/// Raw `dishes` row as Postgres returns it
#[derive(Debug, FromRow)]
pub struct DishRow {
    pub id: i64,
    pub menu_id: i64,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub preparation_time: PgInterval,
    pub is_vegetarian: bool,
    pub image: Option<String>,
    pub added_on: NaiveDate,
    pub updated_on: NaiveDate,
}

impl TryFrom<DishRow> for Dish {
    type Error = crate::types::PriceError;

    fn try_from(row: DishRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            menu_id: row.menu_id,
            name: row.name,
            description: row.description,
            price: Price::new(row.price)?,
            preparation_time: PrepTime::from(row.preparation_time),
            is_vegetarian: row.is_vegetarian,
            image: row.image,
            added_on: row.added_on,
            updated_on: row.updated_on,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDish {
    pub name: String,
    pub description: String,
    pub price: Price,
    pub preparation_time: PrepTime,
    pub is_vegetarian: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DishChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Price>,
    pub preparation_time: Option<PrepTime>,
    pub is_vegetarian: Option<bool>,
}

impl DishChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.preparation_time.is_none()
            && self.is_vegetarian.is_none()
    }

    pub fn apply(self, dish: &mut Dish) {
        if let Some(name) = self.name {
            dish.name = name;
        }
        if let Some(description) = self.description {
            dish.description = description;
        }
        if let Some(price) = self.price {
            dish.price = price;
        }
        if let Some(preparation_time) = self.preparation_time {
            dish.preparation_time = preparation_time;
        }
        if let Some(is_vegetarian) = self.is_vegetarian {
            dish.is_vegetarian = is_vegetarian;
        }
    }
}


/// Result of pointing a dish at a new image (or none)
#[derive(Debug, Clone)]
pub struct ImageSwap {
    pub dish: Dish,
    pub previous: Option<String>,
}
