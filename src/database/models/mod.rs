pub mod dish;
pub mod menu;

pub use dish::{Dish, DishChanges, DishRow, ImageSwap, NewDish};
pub use menu::{Menu, MenuChanges, MenuSummary, NewMenu};
