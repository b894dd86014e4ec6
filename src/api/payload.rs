//! Request bodies for the menu and dish endpoints.
//!
//! Every field is optional at the serde level so that a missing or mistyped
//! field turns into a per-field validation message rather than a body
//! rejection.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::database::models::{DishChanges, MenuChanges, NewDish, NewMenu};
use crate::validation::{self, FieldErrors, DESCRIPTION_MAX_LEN, NAME_MAX_LEN};

/// Keeps an explicit `null` as `Some(Value::Null)`; only a missing key is `None`
fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

#[derive(Debug, Default, Deserialize)]
pub struct MenuPayload {
    #[serde(default, deserialize_with = "present")]
    pub name: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Value>,
}

impl MenuPayload {
    /// Full representation, as for create
    pub fn validate_full(self) -> Result<NewMenu, FieldErrors> {
        let mut errors = FieldErrors::new();
        let name = validation::required_text(&mut errors, "name", self.name, NAME_MAX_LEN);
        let description =
            validation::optional_text(&mut errors, "description", self.description, DESCRIPTION_MAX_LEN);

        errors.finish(|| NewMenu {
            name: name.unwrap_or_default(),
            description: description.unwrap_or_default(),
        })
    }

    /// `PUT`: required fields must be present; omitted optional ones keep
    /// their stored value
    pub fn validate_replace(self) -> Result<MenuChanges, FieldErrors> {
        let keep_description = self.description.is_none();
        let new = self.validate_full()?;

        Ok(MenuChanges {
            name: Some(new.name),
            description: (!keep_description).then_some(new.description),
        })
    }

    /// Only the fields present are checked and changed
    pub fn validate_partial(self) -> Result<MenuChanges, FieldErrors> {
        let mut errors = FieldErrors::new();
        let name = self
            .name
            .and_then(|n| validation::required_text(&mut errors, "name", Some(n), NAME_MAX_LEN));
        let description = self.description.and_then(|d| {
            validation::optional_text(&mut errors, "description", Some(d), DESCRIPTION_MAX_LEN)
        });

        errors.finish(|| MenuChanges { name, description })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct DishPayload {
    #[serde(default, deserialize_with = "present")]
    pub name: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub price: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub preparation_time: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub is_vegetarian: Option<Value>,
}

impl DishPayload {
    pub fn validate_full(self) -> Result<NewDish, FieldErrors> {
        let mut errors = FieldErrors::new();
        let name = validation::required_text(&mut errors, "name", self.name, NAME_MAX_LEN);
        let description =
            validation::optional_text(&mut errors, "description", self.description, DESCRIPTION_MAX_LEN);
        let price = validation::price(&mut errors, "price", self.price);
        let preparation_time =
            validation::duration(&mut errors, "preparation_time", self.preparation_time);
        let is_vegetarian = match self.is_vegetarian {
            Some(v) => validation::boolean(&mut errors, "is_vegetarian", v),
            None => Some(false),
        };

        match (name, description, price, preparation_time, is_vegetarian) {
            (Some(name), Some(description), Some(price), Some(preparation_time), Some(is_vegetarian))
                if errors.is_empty() =>
            {
                Ok(NewDish {
                    name,
                    description,
                    price,
                    preparation_time,
                    is_vegetarian,
                })
            }
            _ => Err(errors),
        }
    }

    /// `PUT`: required fields must be present; omitted optional ones keep
    /// their stored value
    pub fn validate_replace(self) -> Result<DishChanges, FieldErrors> {
        let keep_description = self.description.is_none();
        let keep_vegetarian = self.is_vegetarian.is_none();
        let new = self.validate_full()?;

        Ok(DishChanges {
            name: Some(new.name),
            description: (!keep_description).then_some(new.description),
            price: Some(new.price),
            preparation_time: Some(new.preparation_time),
            is_vegetarian: (!keep_vegetarian).then_some(new.is_vegetarian),
        })
    }

    pub fn validate_partial(self) -> Result<DishChanges, FieldErrors> {
        let mut errors = FieldErrors::new();
        let name = self
            .name
            .and_then(|n| validation::required_text(&mut errors, "name", Some(n), NAME_MAX_LEN));
        let description = self.description.and_then(|d| {
            validation::optional_text(&mut errors, "description", Some(d), DESCRIPTION_MAX_LEN)
        });
        let price = self
            .price
            .and_then(|p| validation::price(&mut errors, "price", Some(p)));
        let preparation_time = self
            .preparation_time
            .and_then(|t| validation::duration(&mut errors, "preparation_time", Some(t)));
        let is_vegetarian = self
            .is_vegetarian
            .and_then(|v| validation::boolean(&mut errors, "is_vegetarian", v));

        errors.finish(|| DishChanges {
            name,
            description,
            price,
            preparation_time,
            is_vegetarian,
        })
    }
}
