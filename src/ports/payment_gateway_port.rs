use crate::domain::errors::DomainResult;
use crate::domain::{GatewayTrade, TradeType};
use async_trait::async_trait;
use rust_decimal::Decimal;

/// 网关下单请求
#[derive(Debug, Clone, PartialEq)]
pub struct CreateTransactionRequest {
    pub order_id: String,
    pub amount: Decimal,
    pub trade_type: TradeType,
    pub user_id: Option<String>,
    pub notify_url: String,
    pub redirect_url: String,
}

/// 支付网关端口接口
#[async_trait]
pub trait PaymentGatewayPort: Send + Sync {
    /// 在网关创建交易
    async fn create_transaction(&self, request: CreateTransactionRequest) -> DomainResult<GatewayTrade>;

    /// 校验回调签名
    fn verify_callback(&self, params: &serde_json::Map<String, serde_json::Value>) -> DomainResult<bool>;
}
