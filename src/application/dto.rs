use crate::domain::{OrderStatus, PaymentOrder};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

/// 创建支付请求
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateOrderRequest {
    /// 商户订单号
    pub order_id: Option<String>,

    /// 支付金额，数字或数字字符串
    pub amount: Option<Decimal>,

    /// 支付通道，缺省取配置
    pub trade_type: Option<String>,

    /// 下单用户
    #[serde(deserialize_with = "string_or_number")]
    pub user_id: Option<String>,
}

/// 下单成功返回给调用方的字段
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderCreatedResponse {
    pub trade_id: String,
    pub order_id: String,
    pub amount: Decimal,
    pub actual_amount: Decimal,
    pub token: String,
    pub payment_url: String,
    pub expiration_time: Option<i64>,
}

impl From<&PaymentOrder> for OrderCreatedResponse {
    fn from(order: &PaymentOrder) -> Self {
        Self {
            trade_id: order.trade_id.clone(),
            order_id: order.order_id.clone(),
            amount: order.amount,
            actual_amount: order.actual_amount,
            token: order.token.clone(),
            payment_url: order.payment_url.clone(),
            expiration_time: order.expiration_time,
        }
    }
}

/// 订单查询结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderSnapshot {
    pub order_id: String,
    pub trade_id: String,
    pub status: OrderStatus,
    pub amount: Decimal,
    pub actual_amount: Decimal,
    pub payment_url: String,
}

impl From<PaymentOrder> for OrderSnapshot {
    fn from(order: PaymentOrder) -> Self {
        Self {
            order_id: order.order_id,
            trade_id: order.trade_id,
            status: order.status,
            amount: order.amount,
            actual_amount: order.actual_amount,
            payment_url: order.payment_url,
        }
    }
}

/// 网关回调内容（验签通过后再解析）
#[derive(Debug, Clone, Deserialize)]
pub struct CallbackPayload {
    pub trade_id: String,
    pub order_id: String,
    #[serde(default)]
    pub amount: Option<Decimal>,
    pub actual_amount: Decimal,
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub block_transaction_id: String,
    pub status: i64,
}

/// 支付完成跳转参数
#[derive(Debug, Default, Deserialize)]
pub struct ReturnQuery {
    pub order_id: Option<String>,
}

/// 统一响应信封
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

impl ApiResponse<()> {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) if !s.is_empty() => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
