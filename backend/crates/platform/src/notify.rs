//! Best-Effort E-mail Notification
//!
//! Moderation decisions emit e-mails through an external mail
//! collaborator. Delivery is strictly best-effort: dispatch happens on
//! a detached task, and failures are logged and swallowed so a mail
//! outage can never fail a moderation decision.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

/// Outbound notification payload
#[derive(Debug, Clone, Serialize)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Notification delivery errors
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Mail webhook request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Mail webhook rejected the message: HTTP {0}")]
    Rejected(u16),
}

/// Notification sink contract
#[async_trait]
pub trait EmailNotifier: Send + Sync {
    async fn send(&self, message: EmailMessage) -> Result<(), NotifyError>;
}

/// Fire-and-forget dispatch
///
/// Spawns the send on a detached task; the returned handle is ignored
/// by production callers and only awaited by tests.
pub fn dispatch(
    notifier: Arc<dyn EmailNotifier>,
    message: EmailMessage,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let to = message.to.clone();
        if let Err(e) = notifier.send(message).await {
            tracing::warn!(recipient = %to, error = %e, "Notification delivery failed");
        }
    })
}

// ============================================================================
// Webhook implementation
// ============================================================================

/// Posts messages as JSON to the configured mail-service endpoint
pub struct WebhookNotifier {
    client: reqwest::Client,
    endpoint: String,
}

impl WebhookNotifier {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl EmailNotifier for WebhookNotifier {
    async fn send(&self, message: EmailMessage) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&message)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(NotifyError::Rejected(response.status().as_u16()))
        }
    }
}

// ============================================================================
// No-op implementation
// ============================================================================

/// Logs instead of sending (development without a mail service)
#[derive(Clone, Default)]
pub struct NoopNotifier;

#[async_trait]
impl EmailNotifier for NoopNotifier {
    async fn send(&self, message: EmailMessage) -> Result<(), NotifyError> {
        tracing::info!(
            recipient = %message.to,
            subject = %message.subject,
            "Notification suppressed (no mail service configured)"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Recording {
        sent: Mutex<Vec<EmailMessage>>,
        fail: bool,
    }

    #[async_trait]
    impl EmailNotifier for Recording {
        async fn send(&self, message: EmailMessage) -> Result<(), NotifyError> {
            if self.fail {
                return Err(NotifyError::Rejected(502));
            }
            self.sent.lock().unwrap().push(message);
            Ok(())
        }
    }

    fn message() -> EmailMessage {
        EmailMessage {
            to: "author@example.com".into(),
            subject: "Application approved".into(),
            body: "Welcome aboard".into(),
        }
    }

    #[tokio::test]
    async fn test_dispatch_delivers() {
        let notifier = Arc::new(Recording {
            sent: Mutex::new(Vec::new()),
            fail: false,
        });
        dispatch(notifier.clone(), message()).await.unwrap();
        assert_eq!(notifier.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_dispatch_swallows_failure() {
        let notifier = Arc::new(Recording {
            sent: Mutex::new(Vec::new()),
            fail: true,
        });
        // The task completes without panicking even when delivery fails.
        dispatch(notifier.clone(), message()).await.unwrap();
        assert!(notifier.sent.lock().unwrap().is_empty());
    }
}
