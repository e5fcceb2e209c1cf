use anyhow::Result;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::domain::models::redemption::ShopItem;
use crate::storage::DbConnection;

/// Repository for the point shop catalog
#[derive(Clone)]
pub struct ShopItemRepository {
    db: DbConnection,
}

impl ShopItemRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    pub async fn insert_item(&self, item: &ShopItem) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO shop_items (id, name, cost, image_url)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&item.id)
        .bind(&item.name)
        .bind(item.cost)
        .bind(&item.image_url)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    pub async fn get_item(&self, item_id: &str) -> Result<Option<ShopItem>> {
        let row = sqlx::query("SELECT id, name, cost, image_url FROM shop_items WHERE id = ?")
            .bind(item_id)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(row.as_ref().map(item_from_row))
    }

    /// Catalog ordered by cost, then name
    pub async fn list_items(&self) -> Result<Vec<ShopItem>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, cost, image_url
            FROM shop_items
            ORDER BY cost ASC, name ASC
            "#,
        )
        .fetch_all(self.db.pool())
        .await?;
        Ok(rows.iter().map(item_from_row).collect())
    }
}

fn item_from_row(row: &SqliteRow) -> ShopItem {
    ShopItem {
        id: row.get("id"),
        name: row.get("name"),
        cost: row.get("cost"),
        image_url: row.get("image_url"),
    }
}
