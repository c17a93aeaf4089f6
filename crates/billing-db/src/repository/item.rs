//! # Item Repository
//!
//! Stock columns hold bags as decimal text. `product_name` is UNIQUE.

use billing_core::{Bags, Item, ItemCategory, Money, BARDANA_PRODUCT_NAME};
use sqlx::SqlitePool;
use tracing::debug;

use super::{decimal, from_micros, to_micros, with_value};
use crate::error::{DbError, DbResult};

#[derive(sqlx::FromRow)]
struct ItemRow {
    id: String,
    product_name: String,
    category: ItemCategory,
    purchase_price: String,
    sale_price: String,
    opening_stock: String,
    low_stock_alert: String,
    is_universal: bool,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<ItemRow> for Item {
    type Error = DbError;

    fn try_from(row: ItemRow) -> DbResult<Self> {
        Ok(Item {
            purchase_price: Money::new(decimal("purchase_price", &row.purchase_price)?),
            sale_price: Money::new(decimal("sale_price", &row.sale_price)?),
            opening_stock: Bags::new(decimal("opening_stock", &row.opening_stock)?),
            low_stock_alert: Bags::new(decimal("low_stock_alert", &row.low_stock_alert)?),
            created_at: from_micros(row.created_at)?,
            updated_at: from_micros(row.updated_at)?,
            id: row.id,
            product_name: row.product_name,
            category: row.category,
            is_universal: row.is_universal,
        })
    }
}

const SELECT_ITEM: &str = r#"
    SELECT id, product_name, category, purchase_price, sale_price, opening_stock,
           low_stock_alert, is_universal, created_at, updated_at
    FROM items
"#;

#[derive(Debug, Clone)]
pub struct ItemRepository {
    pool: SqlitePool,
}

impl ItemRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ItemRepository { pool }
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Item>> {
        self.fetch_one_where("id = ?1", id).await
    }

    pub async fn find_by_name(&self, product_name: &str) -> DbResult<Option<Item>> {
        self.fetch_one_where("product_name = ?1", product_name).await
    }

    /// The universal Bardana item, if it has been created.
    pub async fn find_universal(&self) -> DbResult<Option<Item>> {
        self.fetch_one_where("is_universal = 1 AND product_name = ?1", BARDANA_PRODUCT_NAME)
            .await
    }

    async fn fetch_one_where(&self, condition: &str, value: &str) -> DbResult<Option<Item>> {
        sqlx::query_as::<_, ItemRow>(&format!("{SELECT_ITEM} WHERE {condition}"))
            .bind(value)
            .fetch_optional(&self.pool)
            .await?
            .map(Item::try_from)
            .transpose()
    }

    pub async fn insert(&self, item: &Item) -> DbResult<()> {
        debug!(id = %item.id, product_name = %item.product_name, "Inserting item");

        sqlx::query(
            r#"
            INSERT INTO items (
                id, product_name, category, purchase_price, sale_price, opening_stock,
                low_stock_alert, is_universal, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&item.id)
        .bind(&item.product_name)
        .bind(item.category)
        .bind(item.purchase_price.amount().to_string())
        .bind(item.sale_price.amount().to_string())
        .bind(item.opening_stock.value().to_string())
        .bind(item.low_stock_alert.value().to_string())
        .bind(item.is_universal)
        .bind(to_micros(item.created_at))
        .bind(to_micros(item.updated_at))
        .execute(&self.pool)
        .await
        .map_err(|e| with_value(e, &item.product_name))?;

        Ok(())
    }

    pub async fn update(&self, item: &Item) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE items
            SET product_name = ?2, category = ?3, purchase_price = ?4, sale_price = ?5,
                opening_stock = ?6, low_stock_alert = ?7, is_universal = ?8, updated_at = ?9
            WHERE id = ?1
            "#,
        )
        .bind(&item.id)
        .bind(&item.product_name)
        .bind(item.category)
        .bind(item.purchase_price.amount().to_string())
        .bind(item.sale_price.amount().to_string())
        .bind(item.opening_stock.value().to_string())
        .bind(item.low_stock_alert.value().to_string())
        .bind(item.is_universal)
        .bind(to_micros(item.updated_at))
        .execute(&self.pool)
        .await
        .map_err(|e| with_value(e, &item.product_name))?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Item", &item.id));
        }
        debug!(id = %item.id, stock = %item.opening_stock, "Item updated");
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM items WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Item", id));
        }
        Ok(())
    }

    /// All items in creation order.
    pub async fn list(&self) -> DbResult<Vec<Item>> {
        sqlx::query_as::<_, ItemRow>(&format!("{SELECT_ITEM} ORDER BY created_at, rowid"))
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Item::try_from)
            .collect()
    }
}
