use crate::domain::errors::DomainResult;
use crate::domain::{OrderStatus, PaymentOrder};
use async_trait::async_trait;

/// 支付订单仓储端口接口
#[async_trait]
pub trait OrderRepositoryPort: Send + Sync {
    /// 新建订单，order_id 已存在时返回 `DuplicateOrder`
    async fn create_order(&self, order: &PaymentOrder) -> DomainResult<()>;

    /// 覆盖写入回调可变字段（status、actual_amount、block_transaction_id、updated_at）。
    /// 仅当已存储状态仍为 `expected` 时写入，返回是否写入成功
    async fn update_order(&self, order: &PaymentOrder, expected: OrderStatus) -> DomainResult<bool>;

    /// 根据商户订单号查找
    async fn find_by_order_id(&self, order_id: &str) -> DomainResult<Option<PaymentOrder>>;

    /// 根据网关交易号查找
    async fn find_by_trade_id(&self, trade_id: &str) -> DomainResult<Option<PaymentOrder>>;
}
