//! # Stock Adjuster
//!
//! Turns a kilogram quantity into a bag movement on one item, or on Bardana.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  line { id, itemName, quantity: 90 kg }                                 │
//! │        │                                                                │
//! │        ▼  resolve: item id ──► else product name ──► else skip (logged)│
//! │  Item  openingStock: 2 bags                                            │
//! │        │  Decrease 90 / 30 = 3 bags                                    │
//! │        ▼                                                                │
//! │  Item  openingStock: 0 bags   (clamped, 1 bag shortfall dropped)       │
//! │                                                                         │
//! │  Bardana gets ONE movement per batch: Σ quantity of every line,        │
//! │  whether or not the named items resolved.                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use tracing::debug;

use billing_core::{Item, Kilograms, StockDirection};

use crate::error::{LedgerError, LedgerResult};
use crate::store::ItemStore;

/// Applies stock movements through the item store.
pub struct StockAdjuster<S> {
    store: Arc<S>,
    bardana_id: String,
}

impl<S> Clone for StockAdjuster<S> {
    fn clone(&self) -> Self {
        StockAdjuster {
            store: Arc::clone(&self.store),
            bardana_id: self.bardana_id.clone(),
        }
    }
}

impl<S: ItemStore> StockAdjuster<S> {
    /// `bardana_id` is the universal item resolved at startup.
    pub fn new(store: Arc<S>, bardana_id: impl Into<String>) -> Self {
        StockAdjuster {
            store,
            bardana_id: bardana_id.into(),
        }
    }

    pub fn bardana_id(&self) -> &str {
        &self.bardana_id
    }

    /// Moves one line's quantity on the item it references.
    ///
    /// The line's `id` is tried as an item id first, then `item_name` as a
    /// product name.
    ///
    /// ## Errors
    /// `NotFound` when neither resolves. Callers treat this as a skipped line.
    pub async fn adjust(
        &self,
        item_ref: &str,
        item_name: &str,
        quantity: Kilograms,
        direction: StockDirection,
    ) -> LedgerResult<Item> {
        let item = match self.store.get_item(item_ref).await? {
            Some(item) => item,
            None => self
                .store
                .find_item_by_name(item_name)
                .await?
                .ok_or_else(|| LedgerError::not_found("Item", item_name))?,
        };
        self.apply(item, quantity, direction).await
    }

    /// Moves the batch quantity on the universal Bardana item.
    pub async fn adjust_bardana(
        &self,
        quantity: Kilograms,
        direction: StockDirection,
    ) -> LedgerResult<Item> {
        let item = self
            .store
            .get_item(&self.bardana_id)
            .await?
            .ok_or_else(|| LedgerError::not_found("Item", self.bardana_id.clone()))?;
        self.apply(item, quantity, direction).await
    }

    async fn apply(
        &self,
        mut item: Item,
        quantity: Kilograms,
        direction: StockDirection,
    ) -> LedgerResult<Item> {
        let before = item.opening_stock;
        item.move_stock(quantity.to_bags(), direction);
        self.store.update_item(&item).await?;

        debug!(
            item = %item.product_name,
            %direction,
            %quantity,
            %before,
            after = %item.opening_stock,
            "Stock adjusted"
        );
        Ok(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use billing_core::Bags;
    use rust_decimal_macros::dec;

    async fn setup(stock: Bags) -> (Arc<MemoryStore>, StockAdjuster<MemoryStore>, Item) {
        let store = Arc::new(MemoryStore::new());
        let bardana = Item::bardana();
        store.insert_item(&bardana).await.unwrap();

        let mut rice = Item::bardana();
        rice.id = billing_core::new_id();
        rice.product_name = "Rice".into();
        rice.is_universal = false;
        rice.opening_stock = stock;
        store.insert_item(&rice).await.unwrap();

        let adjuster = StockAdjuster::new(Arc::clone(&store), bardana.id.clone());
        (store, adjuster, rice)
    }

    #[tokio::test]
    async fn test_decrease_by_id_clamps() {
        let (_store, adjuster, rice) = setup(Bags::new(dec!(2))).await;
        let after = adjuster
            .adjust(&rice.id, "ignored", Kilograms::new(dec!(90)), StockDirection::Decrease)
            .await
            .unwrap();
        assert_eq!(after.opening_stock, Bags::zero());
    }

    #[tokio::test]
    async fn test_falls_back_to_product_name() {
        let (store, adjuster, rice) = setup(Bags::new(dec!(1))).await;
        adjuster
            .adjust("line-7", "Rice", Kilograms::new(dec!(60)), StockDirection::Increase)
            .await
            .unwrap();
        let stored = store.get_item(&rice.id).await.unwrap().unwrap();
        assert_eq!(stored.opening_stock, Bags::new(dec!(3)));
    }

    #[tokio::test]
    async fn test_unknown_item_is_not_found() {
        let (_store, adjuster, _) = setup(Bags::zero()).await;
        let err = adjuster
            .adjust("x", "Saffron", Kilograms::new(dec!(30)), StockDirection::Decrease)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::NotFound { entity: "Item", .. }));
    }

    #[tokio::test]
    async fn test_bardana_moves() {
        let (store, adjuster, _) = setup(Bags::zero()).await;
        adjuster
            .adjust_bardana(Kilograms::new(dec!(45)), StockDirection::Increase)
            .await
            .unwrap();
        let bardana = store.find_universal_item().await.unwrap().unwrap();
        assert_eq!(bardana.opening_stock, Bags::new(dec!(1.5)));
    }
}
