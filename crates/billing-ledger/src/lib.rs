//! # billing-ledger: Ledger Consistency Core
//!
//! Keeps `Party.balance` and `Item.openingStock` consistent as sales,
//! purchases and payments are created, edited and deleted.
//!
//! ## How a Write Flows
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  request ──► validate ──► (conflict check) ──► find-or-create party    │
//! │                                                    │                    │
//! │                                                    ▼                    │
//! │                                      primary document write (store)    │
//! │                                                    │                    │
//! │                                                    ▼                    │
//! │                 compensation plan: balance step, stock steps, Bardana  │
//! │                   each step independent, failures logged + reported    │
//! │                                                    │                    │
//! │                                                    ▼                    │
//! │                              LifecycleOutcome { record, compensation }  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! There is no transaction around a write. A failure part way leaves partial
//! state; [`reconcile::Reconciler`] reports and repairs balance drift.
//!
//! ## Usage
//! ```rust,no_run
//! use billing_ledger::{Ledger, MemoryStore};
//!
//! # async fn run() -> Result<(), billing_ledger::LedgerError> {
//! let ledger = Ledger::open(MemoryStore::new()).await?;
//! let parties = ledger.parties().list(None).await?;
//! # let _ = parties;
//! # Ok(())
//! # }
//! ```

pub mod balance;
pub mod compensation;
pub mod error;
pub mod item;
pub mod memory;
pub mod party;
pub mod payment;
pub mod purchase;
pub mod reconcile;
pub mod sale;
pub mod stock;
pub mod store;

use std::sync::Arc;

use tracing::info;

pub use compensation::{CompensationReport, LifecycleOutcome};
pub use error::{LedgerError, LedgerResult};
pub use memory::MemoryStore;
pub use store::{LedgerStore, StoreError, StoreResult};

use balance::BalanceAdjuster;
use compensation::CompensationRunner;
use item::ItemCatalog;
use party::PartyDirectory;
use payment::PaymentLifecycle;
use purchase::PurchaseLifecycle;
use reconcile::Reconciler;
use sale::SaleLifecycle;
use stock::StockAdjuster;

/// Entry point to every ledger operation over one store.
///
/// Cheap to clone; clones share the store.
pub struct Ledger<S> {
    store: Arc<S>,
    bardana_id: String,
}

impl<S> Clone for Ledger<S> {
    fn clone(&self) -> Self {
        Ledger {
            store: Arc::clone(&self.store),
            bardana_id: self.bardana_id.clone(),
        }
    }
}

impl<S: LedgerStore> Ledger<S> {
    /// Opens the ledger, making sure the universal Bardana item exists.
    pub async fn open(store: S) -> LedgerResult<Self> {
        Self::open_shared(Arc::new(store)).await
    }

    /// Like [`Ledger::open`] for a store the caller keeps a handle to.
    pub async fn open_shared(store: Arc<S>) -> LedgerResult<Self> {
        let bardana = ItemCatalog::new(Arc::clone(&store))
            .ensure_universal_item()
            .await?;
        info!(bardana_id = %bardana.id, "Ledger opened");

        Ok(Ledger {
            store,
            bardana_id: bardana.id,
        })
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Id of the universal Bardana item.
    pub fn bardana_id(&self) -> &str {
        &self.bardana_id
    }

    pub fn parties(&self) -> PartyDirectory<S> {
        PartyDirectory::new(Arc::clone(&self.store))
    }

    pub fn items(&self) -> ItemCatalog<S> {
        ItemCatalog::new(Arc::clone(&self.store))
    }

    pub fn sales(&self) -> SaleLifecycle<S> {
        SaleLifecycle::new(Arc::clone(&self.store), self.parties(), self.runner())
    }

    pub fn purchases(&self) -> PurchaseLifecycle<S> {
        PurchaseLifecycle::new(Arc::clone(&self.store), self.parties(), self.runner())
    }

    pub fn payments(&self) -> PaymentLifecycle<S> {
        PaymentLifecycle::new(Arc::clone(&self.store), self.parties(), self.runner())
    }

    pub fn reconciler(&self) -> Reconciler<S> {
        Reconciler::new(Arc::clone(&self.store))
    }

    fn runner(&self) -> CompensationRunner<S> {
        CompensationRunner::new(
            StockAdjuster::new(Arc::clone(&self.store), self.bardana_id.as_str()),
            BalanceAdjuster::new(Arc::clone(&self.store)),
        )
    }
}

#[cfg(test)]
mod tests;
