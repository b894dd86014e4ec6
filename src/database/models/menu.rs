use chrono::NaiveDate;
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Menu {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub added_on: NaiveDate,
    pub updated_on: NaiveDate,
}

/// Menu row as listed, with the number of dishes it currently owns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct MenuSummary {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub menu: Menu,
    pub dish_count: i64,
}

/// Validated input for a new menu
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMenu {
    pub name: String,
    pub description: String,
}

/// Validated partial update; `None` leaves the column untouched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MenuChanges {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl MenuChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none()
    }
}
