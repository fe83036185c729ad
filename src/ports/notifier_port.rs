use crate::domain::errors::DomainResult;
use crate::domain::OrderCompleted;
use async_trait::async_trait;

/// 订单完成通知端口
#[async_trait]
pub trait CompletionNotifierPort: Send + Sync {
    async fn notify_completion(&self, event: &OrderCompleted) -> DomainResult<()>;
}
