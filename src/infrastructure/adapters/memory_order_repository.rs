use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::{OrderStatus, PaymentOrder};
use crate::ports::order_repository_port::OrderRepositoryPort;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

/// 内存订单仓储，未配置数据库时使用
#[derive(Default)]
pub struct InMemoryOrderRepository {
    orders: RwLock<HashMap<String, PaymentOrder>>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderRepositoryPort for InMemoryOrderRepository {
    async fn create_order(&self, order: &PaymentOrder) -> DomainResult<()> {
        let mut orders = self.orders.write().await;

        if orders.contains_key(&order.order_id)
            || orders.values().any(|o| o.trade_id == order.trade_id)
        {
            return Err(DomainError::DuplicateOrder(order.order_id.clone()));
        }

        orders.insert(order.order_id.clone(), order.clone());
        debug!("Payment order saved: {}", order.order_id);
        Ok(())
    }

    async fn update_order(&self, order: &PaymentOrder, expected: OrderStatus) -> DomainResult<bool> {
        let mut orders = self.orders.write().await;
        let stored = orders
            .get_mut(&order.order_id)
            .ok_or_else(|| DomainError::OrderNotFound(order.order_id.clone()))?;

        if stored.status != expected {
            debug!(
                "Order {} is {}, not {}; update skipped",
                order.order_id, stored.status, expected
            );
            return Ok(false);
        }

        stored.status = order.status;
        stored.actual_amount = order.actual_amount;
        stored.block_transaction_id = order.block_transaction_id.clone();
        stored.updated_at = order.updated_at;

        debug!("Payment order updated: {}", order.order_id);
        Ok(true)
    }

    async fn find_by_order_id(&self, order_id: &str) -> DomainResult<Option<PaymentOrder>> {
        Ok(self.orders.read().await.get(order_id).cloned())
    }

    async fn find_by_trade_id(&self, trade_id: &str) -> DomainResult<Option<PaymentOrder>> {
        Ok(self
            .orders
            .read()
            .await
            .values()
            .find(|o| o.trade_id == trade_id)
            .cloned())
    }
}
