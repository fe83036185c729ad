use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 订单状态（与网关回调中的 status 数值一致）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "i32", try_from = "i32")]
pub enum OrderStatus {
    /// 等待支付
    Created,
    /// 支付完成
    Completed,
    /// 已过期（网关判定支付失败）
    Expired,
}

impl OrderStatus {
    pub fn code(self) -> i32 {
        match self {
            OrderStatus::Created => 1,
            OrderStatus::Completed => 2,
            OrderStatus::Expired => 3,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(OrderStatus::Created),
            2 => Some(OrderStatus::Completed),
            3 => Some(OrderStatus::Expired),
            _ => None,
        }
    }

    /// 终态不再迁移
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Expired)
    }
}

impl From<OrderStatus> for i32 {
    fn from(status: OrderStatus) -> Self {
        status.code()
    }
}

impl TryFrom<i32> for OrderStatus {
    type Error = String;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        OrderStatus::from_code(code as i64).ok_or_else(|| format!("unknown order status: {}", code))
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatus::Created => write!(f, "created"),
            OrderStatus::Completed => write!(f, "completed"),
            OrderStatus::Expired => write!(f, "expired"),
        }
    }
}

/// 支付通道，如 `usdt.trc20`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TradeType(String);

impl TradeType {
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TradeType {
    fn default() -> Self {
        Self("usdt.trc20".to_string())
    }
}

impl fmt::Display for TradeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 金额必须为正
pub fn ensure_positive(amount: Decimal) -> Option<Decimal> {
    if amount > Decimal::ZERO {
        Some(amount)
    } else {
        None
    }
}
