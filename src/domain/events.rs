use crate::domain::entities::PaymentOrder;
use crate::domain::value_objects::OrderStatus;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 领域事件trait
pub trait DomainEvent {
    fn event_type(&self) -> &'static str;
    fn occurred_at(&self) -> i64;
}

/// 订单完成事件，推送给内部消费方
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderCompleted {
    pub event_id: Uuid,
    pub event_type: String,
    pub order_id: String,
    pub trade_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub amount: Decimal,
    pub actual_amount: Decimal,
    pub status: OrderStatus,
    pub block_transaction_id: String,
    pub occurred_at: i64,
}

impl DomainEvent for OrderCompleted {
    fn event_type(&self) -> &'static str {
        "order.completed"
    }

    fn occurred_at(&self) -> i64 {
        self.occurred_at
    }
}

impl OrderCompleted {
    pub fn from_order(order: &PaymentOrder) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            event_type: "order.completed".to_string(),
            order_id: order.order_id.clone(),
            trade_id: order.trade_id.clone(),
            user_id: order.user_id.clone(),
            amount: order.amount,
            actual_amount: order.actual_amount,
            status: order.status,
            block_transaction_id: order.block_transaction_id.clone(),
            occurred_at: order.updated_at,
        }
    }
}
