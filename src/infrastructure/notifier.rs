use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::ports::{NotificationKind, NotificationReceipt, Notifier};

/// Writes notifications to the log instead of delivering them.
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(
        &self,
        to: &str,
        kind: NotificationKind,
        data: &Value,
    ) -> Result<NotificationReceipt, DomainError> {
        if to.trim().is_empty() {
            return Err(DomainError::invalid("notification recipient is empty"));
        }
        let id = Uuid::new_v4().to_string();
        log::info!(
            "Notification {} [{}] to {}: {}",
            id,
            kind.template(),
            to,
            data
        );
        Ok(NotificationReceipt { id })
    }
}
