//! # Document Dispatcher
//!
//! Upload, then notify. Each step gets its own deadline and runs once.
//!
//! ```text
//! ShareRequest
//!     │
//!     ├─► normalize phone        (bad number → Err, nothing uploaded)
//!     ├─► source.resolve         (outside the documents dir → Err)
//!     ├─► storage.upload  ≤ 30s  (failure or timeout → Err)
//!     └─► sender.send     ≤ 30s  (failure or timeout → SendOutcome { success: false })
//! ```
//!
//! A stored document whose notification failed stays stored; the caller
//! gets its URL and can share it by other means.

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{DispatchError, DispatchResult};
use crate::notify::{DocumentType, Notification, NotificationSender, SendOutcome};
use crate::phone::{normalize_phone, DEFAULT_COUNTRY_CODE};
use crate::source::DocumentSource;
use crate::storage::{ObjectStorage, StoredObject};

/// Deadline for each outbound step.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A document to store and announce.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareRequest {
    /// Path of the generated document, relative to the documents directory
    /// (an absolute path must point inside it).
    pub file_path: PathBuf,
    pub file_name: String,
    #[serde(default = "default_folder")]
    pub folder: String,
    pub phone_number: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub document_type: DocumentType,
}

fn default_folder() -> String {
    "documents".to_string()
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareOutcome {
    #[serde(flatten)]
    pub stored: StoredObject,
    pub phone_number: String,
    pub notification: SendOutcome,
}

pub struct DocumentDispatcher {
    source: DocumentSource,
    storage: Arc<dyn ObjectStorage>,
    sender: Option<Arc<dyn NotificationSender>>,
    timeout: Duration,
    default_country_code: String,
}

impl DocumentDispatcher {
    /// Shares files found under `source` through `storage`.
    pub fn new(source: DocumentSource, storage: Arc<dyn ObjectStorage>) -> Self {
        DocumentDispatcher {
            source,
            storage,
            sender: None,
            timeout: DEFAULT_TIMEOUT,
            default_country_code: DEFAULT_COUNTRY_CODE.to_string(),
        }
    }

    pub fn with_sender(mut self, sender: Arc<dyn NotificationSender>) -> Self {
        self.sender = Some(sender);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn default_country_code(mut self, code: impl Into<String>) -> Self {
        self.default_country_code = code.into();
        self
    }

    pub fn has_sender(&self) -> bool {
        self.sender.is_some()
    }

    /// Stores the document and sends the notification.
    ///
    /// Only storage problems are errors; a failed send is reported in
    /// [`ShareOutcome::notification`].
    pub async fn share(&self, request: ShareRequest) -> DispatchResult<ShareOutcome> {
        let phone_number = normalize_phone(&request.phone_number, &self.default_country_code)?;
        let local_file = self.source.resolve(&request.file_path).await?;

        let stored = self
            .deadline(
                "upload",
                self.storage
                    .upload(&local_file, &request.file_name, &request.folder),
            )
            .await?;

        let notification = Notification {
            phone_number: phone_number.clone(),
            document_url: stored.url.clone(),
            file_name: request.file_name,
            message: request.message,
            document_type: request.document_type,
        };
        let outcome = self.notify(&notification).await;

        info!(
            public_id = %stored.public_id,
            phone = %phone_number,
            sent = outcome.success,
            "Document shared"
        );
        Ok(ShareOutcome {
            stored,
            phone_number,
            notification: outcome,
        })
    }

    async fn notify(&self, notification: &Notification) -> SendOutcome {
        let Some(sender) = &self.sender else {
            return SendOutcome::failed(DispatchError::NotConfigured("notify_webhook_url"));
        };

        match self.deadline("notification", sender.send(notification)).await {
            Ok(message_id) => SendOutcome::sent(message_id),
            Err(e) => {
                warn!(error = %e, phone = %notification.phone_number, "Notification not sent");
                SendOutcome::failed(e)
            }
        }
    }

    async fn deadline<T>(
        &self,
        step: &'static str,
        work: impl Future<Output = DispatchResult<T>>,
    ) -> DispatchResult<T> {
        tokio::time::timeout(self.timeout, work)
            .await
            .map_err(|_| DispatchError::Timeout {
                step,
                after: self.timeout,
            })?
    }
}
