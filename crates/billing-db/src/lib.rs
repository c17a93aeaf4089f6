//! # billing-db: SQLite Ledger Store
//!
//! Persists parties, items, sales, purchases and payments in SQLite and
//! implements the `billing-ledger` store ports on top of them.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  billing-api handler                                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Ledger<Database>  (billing-ledger: lifecycles, compensation)          │
//! │       │  PartyStore / ItemStore / SaleStore / PurchaseStore / ...       │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   billing-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐   │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │   │   │
//! │  │   │   (pool.rs)   │◄───│ party, item,  │    │  (embedded)  │   │   │
//! │  │   │  SqlitePool   │    │ sale, purch., │    │ 001_init.sql │   │   │
//! │  │   │               │    │ payment       │    │              │   │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ./data/billing.db                                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use billing_db::{Database, DbConfig};
//! use billing_ledger::Ledger;
//!
//! let db = Database::new(DbConfig::new("./data/billing.db")).await?;
//! let ledger = Ledger::open(db).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::item::ItemRepository;
pub use repository::party::PartyRepository;
pub use repository::payment::PaymentRepository;
pub use repository::purchase::PurchaseRepository;
pub use repository::sale::SaleRepository;
