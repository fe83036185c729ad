use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::{DomainEvent, OrderCompleted};
use crate::ports::CompletionNotifierPort;
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info};

/// 通过 HTTP POST 推送完成事件给内部消费方
#[derive(Clone)]
pub struct HttpCompletionNotifier {
    endpoint: Option<String>,
    client: Client,
}

impl HttpCompletionNotifier {
    pub fn new(endpoint: Option<String>) -> Self {
        Self {
            endpoint,
            client: Client::new(),
        }
    }
}

#[async_trait]
impl CompletionNotifierPort for HttpCompletionNotifier {
    async fn notify_completion(&self, event: &OrderCompleted) -> DomainResult<()> {
        let Some(endpoint) = self.endpoint.as_deref() else {
            debug!("No consumer endpoint configured, skipping {} for {}", event.event_type(), event.order_id);
            return Ok(());
        };

        let response = self.client.post(endpoint).json(event).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DomainError::NotifierError(format!(
                "consumer returned {}: {}",
                status, body
            )));
        }

        info!(
            "{} event {} (at {}) delivered for order {}",
            event.event_type(),
            event.event_id,
            event.occurred_at(),
            event.order_id
        );
        Ok(())
    }
}
