//! # Notification Sender
//!
//! Tells a party that a document is ready. The shipped sender posts JSON to
//! a webhook (a messaging gateway that delivers over WhatsApp/SMS):
//!
//! ```text
//! POST {notify_webhook_url}
//! {
//!   "phoneNumber":  "+919876543210",
//!   "documentUrl":  "http://host/uploads/invoices/inv-7.pdf",
//!   "fileName":     "inv-7.pdf",
//!   "message":      "Invoice 7 from Bardana Traders",
//!   "documentType": "invoice"
//! }
//! ← 2xx  { "messageId": "..." }     (body optional)
//! ```

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{DispatchError, DispatchResult};

/// What kind of document is being sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    Invoice,
    Bill,
    PaymentReceipt,
    Statement,
    #[default]
    Other,
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DocumentType::Invoice => "invoice",
            DocumentType::Bill => "bill",
            DocumentType::PaymentReceipt => "payment_receipt",
            DocumentType::Statement => "statement",
            DocumentType::Other => "other",
        };
        f.write_str(name)
    }
}

/// One outbound message. `phone_number` is already normalized.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub phone_number: String,
    pub document_url: String,
    pub file_name: String,
    pub message: String,
    pub document_type: DocumentType,
}

/// Result of a send as reported to API callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SendOutcome {
    pub fn sent(message_id: Option<String>) -> Self {
        SendOutcome {
            success: true,
            message_id,
            error: None,
        }
    }

    pub fn failed(error: impl ToString) -> Self {
        SendOutcome {
            success: false,
            message_id: None,
            error: Some(error.to_string()),
        }
    }
}

#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// Delivers one notification; returns the gateway's message id if any.
    async fn send(&self, notification: &Notification) -> DispatchResult<Option<String>>;
}

// =============================================================================
// Webhook Sender
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WebhookReply {
    message_id: Option<String>,
}

/// Posts notifications to an HTTP endpoint.
///
/// No client-level timeout: the dispatcher owns the deadline.
#[derive(Debug, Clone)]
pub struct WebhookSender {
    client: reqwest::Client,
    url: String,
}

impl WebhookSender {
    pub fn new(url: impl Into<String>) -> DispatchResult<Self> {
        let url = url.into();
        if url.trim().is_empty() {
            return Err(DispatchError::NotConfigured("notify_webhook_url"));
        }
        Ok(WebhookSender {
            client: reqwest::Client::new(),
            url,
        })
    }
}

#[async_trait]
impl NotificationSender for WebhookSender {
    async fn send(&self, notification: &Notification) -> DispatchResult<Option<String>> {
        debug!(
            phone = %notification.phone_number,
            document_type = %notification.document_type,
            "Posting notification webhook"
        );

        let response = self.client.post(&self.url).json(notification).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DispatchError::Http(format!("{status}: {body}")));
        }

        // an empty or non-JSON body still counts as delivered
        let body = response.text().await?;
        let message_id = serde_json::from_str::<WebhookReply>(&body)
            .ok()
            .and_then(|reply| reply.message_id);
        Ok(message_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/notify")
    }

    fn notification() -> Notification {
        Notification {
            phone_number: "+919876543210".into(),
            document_url: "http://localhost:8080/uploads/invoices/inv-7.pdf".into(),
            file_name: "inv-7.pdf".into(),
            message: "Invoice 7".into(),
            document_type: DocumentType::Invoice,
        }
    }

    #[tokio::test]
    async fn test_webhook_returns_message_id() {
        let app = Router::new().route(
            "/notify",
            post(|Json(body): Json<serde_json::Value>| async move {
                assert_eq!(body["phoneNumber"], "+919876543210");
                assert_eq!(body["documentType"], "invoice");
                Json(serde_json::json!({ "messageId": "msg-1" }))
            }),
        );
        let sender = WebhookSender::new(serve(app).await).unwrap();

        let id = sender.send(&notification()).await.unwrap();
        assert_eq!(id.as_deref(), Some("msg-1"));
    }

    #[tokio::test]
    async fn test_webhook_error_status() {
        let app = Router::new().route(
            "/notify",
            post(|| async { (StatusCode::BAD_GATEWAY, "gateway down") }),
        );
        let sender = WebhookSender::new(serve(app).await).unwrap();

        let err = sender.send(&notification()).await.unwrap_err();
        assert!(matches!(err, DispatchError::Http(ref m) if m.contains("502")));
    }

    #[test]
    fn test_blank_url_is_not_configured() {
        assert!(matches!(
            WebhookSender::new("  "),
            Err(DispatchError::NotConfigured(_))
        ));
    }

    #[test]
    fn test_outcome_serialization() {
        let json = serde_json::to_value(SendOutcome::failed("timed out")).unwrap();
        assert_eq!(json, serde_json::json!({ "success": false, "error": "timed out" }));
    }
}
