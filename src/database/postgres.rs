use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::types::PgInterval;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::info;

use super::models::{Dish, DishChanges, DishRow, ImageSwap, Menu, MenuChanges, MenuSummary, NewDish, NewMenu};
use super::store::{MenuStore, StoreError};
use crate::config::DatabaseConfig;

const MENU_COLUMNS: &str = "id, name, description, added_on, updated_on";
const DISH_COLUMNS: &str =
    "id, menu_id, name, description, price, preparation_time, is_vegetarian, image, added_on, updated_on";

/// Postgres-backed store; the `dishes.menu_id` foreign key carries
/// `ON DELETE CASCADE`.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(url: &str, config: &DatabaseConfig) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url)
            .await?;
        info!("Connected to Postgres (max_connections={})", config.max_connections);
        Ok(Self::new(pool))
    }

    /// Apply the embedded migrations under `migrations/`
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("Database migrations applied");
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn unique_violation(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::UniqueViolation("name"),
        _ => StoreError::Sqlx(err),
    }
}

fn into_dish(row: DishRow) -> Result<Dish, StoreError> {
    let id = row.id;
    Dish::try_from(row).map_err(|e| StoreError::CorruptRow(format!("dish {}: {}", id, e)))
}

#[async_trait]
impl MenuStore for PgStore {
    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn list_menus(&self) -> Result<Vec<MenuSummary>, StoreError> {
        let rows = sqlx::query_as::<_, MenuSummary>(
            r#"
            SELECT m.id, m.name, m.description, m.added_on, m.updated_on,
                   COUNT(d.id) AS dish_count
            FROM menus m
            LEFT JOIN dishes d ON d.menu_id = m.id
            GROUP BY m.id
            ORDER BY m.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get_menu(&self, id: i64) -> Result<Option<Menu>, StoreError> {
        let sql = format!("SELECT {} FROM menus WHERE id = $1", MENU_COLUMNS);
        let menu = sqlx::query_as::<_, Menu>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(menu)
    }

    async fn menu_name_taken(&self, name: &str, exclude: Option<i64>) -> Result<bool, StoreError> {
        let taken: (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM menus WHERE name = $1 AND ($2::BIGINT IS NULL OR id <> $2))",
        )
        .bind(name)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await?;
        Ok(taken.0)
    }

    async fn insert_menu(&self, menu: NewMenu) -> Result<Menu, StoreError> {
        let sql = format!(
            "INSERT INTO menus (name, description) VALUES ($1, $2) RETURNING {}",
            MENU_COLUMNS
        );
        sqlx::query_as::<_, Menu>(&sql)
            .bind(&menu.name)
            .bind(&menu.description)
            .fetch_one(&self.pool)
            .await
            .map_err(unique_violation)
    }

    async fn update_menu(&self, id: i64, changes: MenuChanges) -> Result<Option<Menu>, StoreError> {
        let sql = format!(
            r#"
            UPDATE menus
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                updated_on = CURRENT_DATE
            WHERE id = $1
            RETURNING {}
            "#,
            MENU_COLUMNS
        );
        sqlx::query_as::<_, Menu>(&sql)
            .bind(id)
            .bind(changes.name)
            .bind(changes.description)
            .fetch_optional(&self.pool)
            .await
            .map_err(unique_violation)
    }

    async fn delete_menu(&self, id: i64) -> Result<Option<Vec<String>>, StoreError> {
        let mut tx = self.pool.begin().await?;

        // Lock the dishes so none can be added or re-imaged mid-cascade
        let images: Vec<(String,)> = sqlx::query_as(
            "SELECT image FROM dishes WHERE menu_id = $1 AND image IS NOT NULL FOR UPDATE",
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;

        let deleted = sqlx::query("DELETE FROM menus WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if deleted.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        tx.commit().await?;
        Ok(Some(images.into_iter().map(|(image,)| image).collect()))
    }

    async fn list_dishes(&self, menu_id: i64) -> Result<Option<Vec<Dish>>, StoreError> {
        if self.get_menu(menu_id).await?.is_none() {
            return Ok(None);
        }

        let sql = format!("SELECT {} FROM dishes WHERE menu_id = $1 ORDER BY id", DISH_COLUMNS);
        let rows = sqlx::query_as::<_, DishRow>(&sql)
            .bind(menu_id)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(into_dish).collect::<Result<Vec<_>, _>>().map(Some)
    }

    async fn get_dish(&self, id: i64) -> Result<Option<Dish>, StoreError> {
        let sql = format!("SELECT {} FROM dishes WHERE id = $1", DISH_COLUMNS);
        sqlx::query_as::<_, DishRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(into_dish)
            .transpose()
    }

    async fn insert_dish(&self, menu_id: i64, dish: NewDish) -> Result<Option<Dish>, StoreError> {
        // INSERT .. SELECT yields no row when the menu is gone
        let sql = format!(
            r#"
            INSERT INTO dishes (menu_id, name, description, price, preparation_time, is_vegetarian)
            SELECT m.id, $2, $3, $4, $5, $6 FROM menus m WHERE m.id = $1
            RETURNING {}
            "#,
            DISH_COLUMNS
        );
        sqlx::query_as::<_, DishRow>(&sql)
            .bind(menu_id)
            .bind(&dish.name)
            .bind(&dish.description)
            .bind(dish.price.amount())
            .bind(PgInterval::from(dish.preparation_time))
            .bind(dish.is_vegetarian)
            .fetch_optional(&self.pool)
            .await?
            .map(into_dish)
            .transpose()
    }

    async fn update_dish(&self, id: i64, changes: DishChanges) -> Result<Option<Dish>, StoreError> {
        let sql = format!(
            r#"
            UPDATE dishes
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                price = COALESCE($4, price),
                preparation_time = COALESCE($5, preparation_time),
                is_vegetarian = COALESCE($6, is_vegetarian),
                updated_on = CURRENT_DATE
            WHERE id = $1
            RETURNING {}
            "#,
            DISH_COLUMNS
        );
        sqlx::query_as::<_, DishRow>(&sql)
            .bind(id)
            .bind(changes.name)
            .bind(changes.description)
            .bind(changes.price.map(|p| p.amount()))
            .bind(changes.preparation_time.map(PgInterval::from))
            .bind(changes.is_vegetarian)
            .fetch_optional(&self.pool)
            .await?
            .map(into_dish)
            .transpose()
    }

    async fn delete_dish(&self, id: i64) -> Result<Option<Dish>, StoreError> {
        let sql = format!("DELETE FROM dishes WHERE id = $1 RETURNING {}", DISH_COLUMNS);
        sqlx::query_as::<_, DishRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(into_dish)
            .transpose()
    }

    async fn set_dish_image(&self, id: i64, image: Option<String>) -> Result<Option<ImageSwap>, StoreError> {
        let mut tx = self.pool.begin().await?;

        let previous: Option<(Option<String>,)> =
            sqlx::query_as("SELECT image FROM dishes WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some((previous,)) = previous else {
            tx.rollback().await?;
            return Ok(None);
        };

        let sql = format!(
            "UPDATE dishes SET image = $2, updated_on = CURRENT_DATE WHERE id = $1 RETURNING {}",
            DISH_COLUMNS
        );
        let row = sqlx::query_as::<_, DishRow>(&sql)
            .bind(id)
            .bind(image)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(ImageSwap {
            dish: into_dish(row)?,
            previous,
        }))
    }
}
