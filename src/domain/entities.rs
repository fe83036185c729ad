use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::value_objects::{OrderStatus, TradeType};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 支付订单实体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentOrder {
    /// 商户订单号（调用方分配）
    pub order_id: String,

    /// 网关交易号（创建时分配，之后不变）
    pub trade_id: String,

    /// 下单用户
    pub user_id: Option<String>,

    /// 请求金额
    pub amount: Decimal,

    /// 网关报价/实付金额
    pub actual_amount: Decimal,

    /// 支付通道
    pub trade_type: TradeType,

    /// 订单状态
    pub status: OrderStatus,

    /// 收银台地址
    pub payment_url: String,

    /// 收款地址/回调关联令牌
    pub token: String,

    /// 链上交易哈希，完成前为空
    pub block_transaction_id: String,

    /// 网关给出的过期时间
    pub expiration_time: Option<i64>,

    /// 创建时间（毫秒时间戳）
    pub created_at: i64,

    /// 更新时间（毫秒时间戳）
    pub updated_at: i64,
}

/// 网关创建交易后返回的数据
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayTrade {
    pub trade_id: String,
    pub actual_amount: Decimal,
    pub payment_url: String,
    pub token: String,
    pub expiration_time: Option<i64>,
}

/// 回调带来的状态变更
#[derive(Debug, Clone, PartialEq)]
pub struct SettlementUpdate {
    pub status: OrderStatus,
    pub actual_amount: Decimal,
    pub block_transaction_id: String,
}

/// 应用回调后的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// 与已存储状态一致，无需写入
    Unchanged,
    /// 已覆盖写入
    Applied { previous: OrderStatus },
}

impl Transition {
    /// 本次回调是否使订单进入完成状态
    pub fn entered(&self, status: OrderStatus, target: OrderStatus) -> bool {
        match self {
            Transition::Applied { previous } => *previous != target && status == target,
            Transition::Unchanged => false,
        }
    }
}

impl PaymentOrder {
    /// 网关创建成功后生成本地订单
    pub fn new(
        order_id: String,
        amount: Decimal,
        trade_type: TradeType,
        user_id: Option<String>,
        trade: GatewayTrade,
        now_millis: i64,
    ) -> DomainResult<Self> {
        if order_id.is_empty() {
            return Err(DomainError::ValidationError("order_id is required".to_string()));
        }
        if trade.trade_id.is_empty() {
            return Err(DomainError::GatewayError("gateway returned empty trade_id".to_string()));
        }

        Ok(Self {
            order_id,
            trade_id: trade.trade_id,
            user_id,
            amount,
            actual_amount: trade.actual_amount,
            trade_type,
            status: OrderStatus::Created,
            payment_url: trade.payment_url,
            token: trade.token,
            block_transaction_id: String::new(),
            expiration_time: trade.expiration_time,
            created_at: now_millis,
            updated_at: now_millis,
        })
    }

    /// 应用网关回调。终态订单不会迁移到其他状态
    pub fn apply_settlement(
        &mut self,
        update: SettlementUpdate,
        now_millis: i64,
    ) -> DomainResult<Transition> {
        if self.status.is_terminal() && update.status != self.status {
            return Err(DomainError::InvalidState {
                expected: self.status.to_string(),
                actual: update.status.to_string(),
            });
        }

        if self.status == update.status
            && self.actual_amount == update.actual_amount
            && self.block_transaction_id == update.block_transaction_id
        {
            return Ok(Transition::Unchanged);
        }

        let previous = self.status;
        self.status = update.status;
        self.actual_amount = update.actual_amount;
        self.block_transaction_id = update.block_transaction_id;
        self.updated_at = now_millis;

        Ok(Transition::Applied { previous })
    }
}
