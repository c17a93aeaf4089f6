//! # billing-dispatch: Outbound Document Path
//!
//! Stores a generated document and notifies the party, best effort.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  POST /api/documents/share                                              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DocumentDispatcher                                                    │
//! │   ├── phone::normalize_phone     "98765 43210" → "+919876543210"       │
//! │   ├── ObjectStorage              LocalDiskStorage → /uploads/...       │
//! │   └── NotificationSender         WebhookSender (reqwest)               │
//! │                                                                         │
//! │  30 s per step, no retry. Nothing here touches the ledger.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod dispatcher;
pub mod error;
pub mod notify;
pub mod phone;
pub mod source;
pub mod storage;

pub use dispatcher::{DocumentDispatcher, ShareOutcome, ShareRequest, DEFAULT_TIMEOUT};
pub use error::{DispatchError, DispatchResult};
pub use notify::{DocumentType, Notification, NotificationSender, SendOutcome, WebhookSender};
pub use phone::{normalize_phone, DEFAULT_COUNTRY_CODE};
pub use source::DocumentSource;
pub use storage::{LocalDiskStorage, ObjectStorage, StoredObject, UPLOADS_ROUTE};
