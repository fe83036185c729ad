use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::{OrderStatus, PaymentOrder, TradeType};
use crate::ports::order_repository_port::OrderRepositoryPort;
use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{MySql, Pool};
use std::sync::Arc;
use tracing::{debug, warn};

const SELECT_COLUMNS: &str = r#"
    SELECT order_id, trade_id, user_id, amount, actual_amount,
           trade_type, status, payment_url, token,
           block_transaction_id, expiration_time, created_at, updated_at
    FROM pay_orders
"#;

/// MySQL支付订单仓储实现
#[derive(Clone)]
pub struct MySqlOrderRepository {
    pool: Arc<Pool<MySql>>,
}

impl MySqlOrderRepository {
    pub fn new(pool: Arc<Pool<MySql>>) -> Self {
        Self { pool }
    }

    async fn find_one(&self, column: &str, value: &str) -> DomainResult<Option<PaymentOrder>> {
        let query = format!("{} WHERE {} = ?", SELECT_COLUMNS, column);

        let result = sqlx::query_as::<_, PaymentOrderRow>(&query)
            .bind(value)
            .fetch_optional(self.pool.as_ref())
            .await?;

        result.map(PaymentOrderRow::into_order).transpose()
    }
}

#[async_trait]
impl OrderRepositoryPort for MySqlOrderRepository {
    /// 新建订单
    async fn create_order(&self, order: &PaymentOrder) -> DomainResult<()> {
        let query = r#"
            INSERT INTO pay_orders (
                order_id, trade_id, user_id, amount, actual_amount,
                trade_type, status, payment_url, token,
                block_transaction_id, expiration_time, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#;

        let result = sqlx::query(query)
            .bind(&order.order_id)
            .bind(&order.trade_id)
            .bind(&order.user_id)
            .bind(order.amount)
            .bind(order.actual_amount)
            .bind(order.trade_type.as_str())
            .bind(order.status.code())
            .bind(&order.payment_url)
            .bind(&order.token)
            .bind(&order.block_transaction_id)
            .bind(order.expiration_time)
            .bind(order.created_at)
            .bind(order.updated_at)
            .execute(self.pool.as_ref())
            .await;

        match result {
            Ok(_) => {
                debug!("Payment order saved: {}", order.order_id);
                Ok(())
            }
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(DomainError::DuplicateOrder(order.order_id.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// 覆盖写入回调字段，以当前状态作为写入条件
    async fn update_order(&self, order: &PaymentOrder, expected: OrderStatus) -> DomainResult<bool> {
        let query = r#"
            UPDATE pay_orders
            SET status = ?, actual_amount = ?, block_transaction_id = ?, updated_at = ?
            WHERE order_id = ? AND status = ?
        "#;

        let rows_affected = sqlx::query(query)
            .bind(order.status.code())
            .bind(order.actual_amount)
            .bind(&order.block_transaction_id)
            .bind(order.updated_at)
            .bind(&order.order_id)
            .bind(expected.code())
            .execute(self.pool.as_ref())
            .await?
            .rows_affected();

        if rows_affected == 0 {
            warn!(
                "Order {} no longer {}, update skipped",
                order.order_id, expected
            );
            return Ok(false);
        }

        debug!("Payment order updated: {}", order.order_id);
        Ok(true)
    }

    async fn find_by_order_id(&self, order_id: &str) -> DomainResult<Option<PaymentOrder>> {
        self.find_one("order_id", order_id).await
    }

    async fn find_by_trade_id(&self, trade_id: &str) -> DomainResult<Option<PaymentOrder>> {
        self.find_one("trade_id", trade_id).await
    }
}

/// 数据库行结构体
#[derive(Debug, sqlx::FromRow)]
struct PaymentOrderRow {
    order_id: String,
    trade_id: String,
    user_id: Option<String>,
    amount: Decimal,
    actual_amount: Decimal,
    trade_type: String,
    status: i32,
    payment_url: String,
    token: String,
    block_transaction_id: String,
    expiration_time: Option<i64>,
    created_at: i64,
    updated_at: i64,
}

impl PaymentOrderRow {
    fn into_order(self) -> DomainResult<PaymentOrder> {
        let status = OrderStatus::from_code(self.status as i64).ok_or_else(|| {
            DomainError::InternalError(format!(
                "order {} has unknown status {}",
                self.order_id, self.status
            ))
        })?;
        let trade_type = TradeType::new(self.trade_type).ok_or_else(|| {
            DomainError::InternalError(format!("order {} has empty trade_type", self.order_id))
        })?;

        Ok(PaymentOrder {
            order_id: self.order_id,
            trade_id: self.trade_id,
            user_id: self.user_id,
            amount: self.amount,
            actual_amount: self.actual_amount,
            trade_type,
            status,
            payment_url: self.payment_url,
            token: self.token,
            block_transaction_id: self.block_transaction_id,
            expiration_time: self.expiration_time,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
