//! # Item Catalog
//!
//! Inventory items, and the one-time bootstrap of the universal Bardana item.
//!
//! ## Bardana Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  • Exactly one item with isUniversal = true AND productName "Bardana"  │
//! │  • Created at startup if absent (idempotent)                           │
//! │  • Its stock moves with every sale and purchase batch                  │
//! │  • It cannot be deleted or renamed                                     │
//! │  • Its stock, prices and alert level CAN be edited by hand             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use billing_core::query::contains_ignore_case;
use billing_core::requests::{CreateItemRequest, UpdateItemRequest};
use billing_core::{new_id, Item, ItemCategory, ValidationError, BARDANA_PRODUCT_NAME};

use crate::error::{LedgerError, LedgerResult};
use crate::store::{ItemStore, StoreError};

pub struct ItemCatalog<S> {
    store: Arc<S>,
}

impl<S> Clone for ItemCatalog<S> {
    fn clone(&self) -> Self {
        ItemCatalog {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: ItemStore> ItemCatalog<S> {
    pub fn new(store: Arc<S>) -> Self {
        ItemCatalog { store }
    }

    /// Finds the universal Bardana item, creating it if absent.
    ///
    /// ## When This Occurs
    /// Once, when the ledger opens. An existing plain item that happens to be
    /// named "Bardana" is promoted to universal instead of duplicated.
    pub async fn ensure_universal_item(&self) -> LedgerResult<Item> {
        if let Some(item) = self.store.find_universal_item().await? {
            debug!(item_id = %item.id, "Bardana item present");
            return Ok(item);
        }

        let bardana = Item::bardana();
        match self.store.insert_item(&bardana).await {
            Ok(()) => {
                info!(item_id = %bardana.id, "Created universal Bardana item");
                Ok(bardana)
            }
            Err(StoreError::Duplicate { .. }) => {
                let mut existing = self
                    .store
                    .find_item_by_name(BARDANA_PRODUCT_NAME)
                    .await?
                    .ok_or_else(|| LedgerError::not_found("Item", BARDANA_PRODUCT_NAME))?;
                if !existing.is_universal {
                    existing.is_universal = true;
                    existing.updated_at = Utc::now();
                    self.store.update_item(&existing).await?;
                    info!(item_id = %existing.id, "Promoted existing Bardana item to universal");
                }
                Ok(existing)
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn create(&self, request: CreateItemRequest) -> LedgerResult<Item> {
        request.validate()?;

        let product_name = request.product_name.trim().to_string();
        if self.store.find_item_by_name(&product_name).await?.is_some() {
            return Err(LedgerError::conflict("productName", product_name));
        }

        let now = Utc::now();
        let item = Item {
            id: new_id(),
            product_name,
            category: request.category,
            purchase_price: request.purchase_price,
            sale_price: request.sale_price,
            opening_stock: request.opening_stock.normalized(),
            low_stock_alert: request.low_stock_alert.normalized(),
            is_universal: false,
            created_at: now,
            updated_at: now,
        };
        self.store.insert_item(&item).await?;

        info!(item_id = %item.id, product = %item.product_name, "Item created");
        Ok(item)
    }

    pub async fn update(&self, id: &str, request: UpdateItemRequest) -> LedgerResult<Item> {
        request.validate()?;
        let mut item = self.get(id).await?;

        if let Some(name) = request.product_name.map(|n| n.trim().to_string()) {
            if name != item.product_name {
                if item.is_bardana() {
                    return Err(ValidationError::Immutable {
                        field: "productName".to_string(),
                        reason: "the universal Bardana item cannot be renamed".to_string(),
                    }
                    .into());
                }
                if self.store.find_item_by_name(&name).await?.is_some() {
                    return Err(LedgerError::conflict("productName", name));
                }
                item.product_name = name;
            }
        }

        if let Some(category) = request.category {
            item.category = category;
        }
        if let Some(price) = request.purchase_price {
            item.purchase_price = price;
        }
        if let Some(price) = request.sale_price {
            item.sale_price = price;
        }
        if let Some(stock) = request.opening_stock {
            item.opening_stock = stock.normalized();
        }
        if let Some(alert) = request.low_stock_alert {
            item.low_stock_alert = alert.normalized();
        }
        item.updated_at = Utc::now();
        self.store.update_item(&item).await?;

        debug!(item_id = %item.id, "Item updated");
        Ok(item)
    }

    pub async fn get(&self, id: &str) -> LedgerResult<Item> {
        self.store
            .get_item(id)
            .await?
            .ok_or_else(|| LedgerError::not_found("Item", id))
    }

    /// Items matching `query` (and `category`, if given), sorted by name.
    pub async fn list(
        &self,
        query: Option<&str>,
        category: Option<ItemCategory>,
    ) -> LedgerResult<Vec<Item>> {
        let query = query.unwrap_or("").trim();
        let mut items: Vec<Item> = self
            .store
            .list_items()
            .await?
            .into_iter()
            .filter(|i| contains_ignore_case(&i.product_name, query))
            .filter(|i| category.map_or(true, |c| i.category == c))
            .collect();
        items.sort_by(|a, b| {
            a.product_name
                .to_lowercase()
                .cmp(&b.product_name.to_lowercase())
        });
        Ok(items)
    }

    /// Items at or below their alert level, Bardana included.
    pub async fn low_stock(&self) -> LedgerResult<Vec<Item>> {
        Ok(self
            .list(None, None)
            .await?
            .into_iter()
            .filter(Item::is_low_on_stock)
            .collect())
    }

    pub async fn delete(&self, id: &str) -> LedgerResult<Item> {
        let item = self.get(id).await?;
        if item.is_bardana() {
            return Err(ValidationError::Immutable {
                field: "item".to_string(),
                reason: "the universal Bardana item cannot be deleted".to_string(),
            }
            .into());
        }
        self.store.delete_item(id).await?;

        info!(item_id = %id, product = %item.product_name, "Item deleted");
        Ok(item)
    }
}
