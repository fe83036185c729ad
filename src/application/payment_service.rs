use crate::application::dto::{CallbackPayload, CreateOrderRequest, OrderCreatedResponse, OrderSnapshot};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::value_objects::ensure_positive;
use crate::domain::{now_millis, OrderCompleted, OrderStatus, PaymentOrder, SettlementUpdate, TradeType, Transition};
use crate::infrastructure::config::PayConfig;
use crate::ports::{CompletionNotifierPort, CreateTransactionRequest, OrderRepositoryPort, PaymentGatewayPort};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

const SETTLE_ATTEMPTS: usize = 3;

/// 回调处理结果，均应答网关 `ok`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackOutcome {
    /// 已写入新状态
    Applied { status: OrderStatus, notified: bool },
    /// 重复回调，状态未变
    Unchanged,
    /// 订单已处于终态，忽略迁移
    IgnoredTerminal,
    /// 写库失败但按配置仍应答
    StoreFailureAcknowledged,
}

/// 支付服务
pub struct PaymentService<G: PaymentGatewayPort, R: OrderRepositoryPort, N: CompletionNotifierPort> {
    gateway: Arc<G>,
    repository: Arc<R>,
    notifier: Arc<N>,
    config: Arc<PayConfig>,
}

impl<G: PaymentGatewayPort, R: OrderRepositoryPort, N: CompletionNotifierPort> PaymentService<G, R, N> {
    pub fn new(gateway: Arc<G>, repository: Arc<R>, notifier: Arc<N>, config: Arc<PayConfig>) -> Self {
        Self {
            gateway,
            repository,
            notifier,
            config,
        }
    }

    /// 创建支付订单
    pub async fn create_order(&self, request: CreateOrderRequest) -> DomainResult<OrderCreatedResponse> {
        let order_id = request
            .order_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .ok_or_else(|| DomainError::ValidationError("缺少必要参数: order_id".to_string()))?;
        let amount = request
            .amount
            .ok_or_else(|| DomainError::ValidationError("缺少必要参数: amount".to_string()))?;
        let amount = ensure_positive(amount)
            .ok_or_else(|| DomainError::ValidationError("amount must be greater than 0".to_string()))?;

        // 网关配置缺失时不发起请求
        self.config.gateway()?;

        info!("Creating payment for order: {}", order_id);

        if self.repository.find_by_order_id(&order_id).await?.is_some() {
            warn!("Duplicate creation request for order: {}", order_id);
            return Err(DomainError::DuplicateOrder(order_id));
        }

        let trade_type = request
            .trade_type
            .and_then(TradeType::new)
            .unwrap_or_else(|| self.config.default_trade_type.clone());

        let trade = self
            .gateway
            .create_transaction(CreateTransactionRequest {
                order_id: order_id.clone(),
                amount,
                trade_type: trade_type.clone(),
                user_id: request.user_id.clone(),
                notify_url: self.config.notify_url(),
                redirect_url: self.config.return_url(&order_id)?,
            })
            .await?;

        let order = PaymentOrder::new(order_id, amount, trade_type, request.user_id, trade, now_millis())?;

        self.repository.create_order(&order).await.map_err(|e| {
            error!("Failed to persist order {}: {}", order.order_id, e);
            e
        })?;

        info!("Payment created: order {} trade {}", order.order_id, order.trade_id);
        Ok(OrderCreatedResponse::from(&order))
    }

    /// 按网关交易号查询
    pub async fn get_by_trade_id(&self, trade_id: &str) -> DomainResult<OrderSnapshot> {
        debug!("Querying payment by trade_id: {}", trade_id);

        self.repository
            .find_by_trade_id(trade_id)
            .await?
            .map(OrderSnapshot::from)
            .ok_or_else(|| DomainError::OrderNotFound(trade_id.to_string()))
    }

    /// 处理网关回调。验签失败时不触碰存储
    pub async fn handle_callback(&self, params: Map<String, Value>) -> DomainResult<CallbackOutcome> {
        if !self.gateway.verify_callback(&params)? {
            let order_id = params.get("order_id").and_then(Value::as_str).unwrap_or("-");
            let trade_id = params.get("trade_id").and_then(Value::as_str).unwrap_or("-");
            warn!(
                "Rejected callback with bad signature: order_id={} trade_id={}",
                order_id, trade_id
            );
            return Err(DomainError::SignatureVerificationFailed);
        }

        let payload: CallbackPayload = serde_json::from_value(Value::Object(params))?;
        let status = OrderStatus::from_code(payload.status).ok_or_else(|| {
            DomainError::ValidationError(format!("unknown callback status: {}", payload.status))
        })?;

        info!(
            "Handling callback for order {} (trade {}, status {})",
            payload.order_id, payload.trade_id, status
        );

        match self.settle(&payload, status).await {
            Err(e) if e.is_persistence() && self.config.ack_on_store_failure => {
                error!("Callback for order {} not persisted, acknowledging anyway: {}", payload.order_id, e);
                Ok(CallbackOutcome::StoreFailureAcknowledged)
            }
            other => other,
        }
    }

    /// 以存储层的条件写入裁决并发回调，写入落空时重新读取订单
    async fn settle(&self, payload: &CallbackPayload, status: OrderStatus) -> DomainResult<CallbackOutcome> {
        for _ in 0..SETTLE_ATTEMPTS {
            if let Some(outcome) = self.try_settle(payload, status).await? {
                return Ok(outcome);
            }
            debug!("Order {} changed concurrently, re-reading", payload.order_id);
        }

        Err(DomainError::InternalError(format!(
            "order {} kept changing during callback",
            payload.order_id
        )))
    }

    async fn try_settle(
        &self,
        payload: &CallbackPayload,
        status: OrderStatus,
    ) -> DomainResult<Option<CallbackOutcome>> {
        let mut order = self
            .repository
            .find_by_order_id(&payload.order_id)
            .await?
            .ok_or_else(|| DomainError::OrderNotFound(payload.order_id.clone()))?;

        if order.trade_id != payload.trade_id {
            return Err(DomainError::ValidationError(format!(
                "trade_id {} does not belong to order {}",
                payload.trade_id, payload.order_id
            )));
        }

        if payload.amount.is_some_and(|amount| amount != order.amount) || payload.token != order.token {
            warn!(
                "Callback for order {} disagrees with stored amount/token (amount {:?}, token {})",
                order.order_id, payload.amount, payload.token
            );
        }

        let update = SettlementUpdate {
            status,
            actual_amount: payload.actual_amount,
            block_transaction_id: payload.block_transaction_id.clone(),
        };

        let transition = match order.apply_settlement(update, now_millis()) {
            Ok(transition) => transition,
            Err(DomainError::InvalidState { expected, actual }) => {
                warn!(
                    "Ignoring callback moving order {} from {} to {}",
                    order.order_id, expected, actual
                );
                return Ok(Some(CallbackOutcome::IgnoredTerminal));
            }
            Err(e) => return Err(e),
        };

        let Transition::Applied { previous } = transition else {
            debug!("Duplicate callback for order {}, nothing to write", order.order_id);
            return Ok(Some(CallbackOutcome::Unchanged));
        };

        let written = self.repository.update_order(&order, previous).await.map_err(|e| {
            error!("Failed to update order {}: {}", order.order_id, e);
            e
        })?;
        if !written {
            return Ok(None);
        }

        let notified = if transition.entered(order.status, OrderStatus::Completed) {
            self.notify(&order).await
        } else {
            false
        };

        info!("Order {} is now {}", order.order_id, order.status);
        Ok(Some(CallbackOutcome::Applied {
            status: order.status,
            notified,
        }))
    }

    /// 推送完成事件，失败只记录日志
    async fn notify(&self, order: &PaymentOrder) -> bool {
        let event = OrderCompleted::from_order(order);
        match self.notifier.notify_completion(&event).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Completion notification failed for order {}: {}", order.order_id, e);
                false
            }
        }
    }

    /// 支付完成后的前端跳转地址
    pub fn return_redirect(&self, order_id: Option<&str>) -> DomainResult<String> {
        let order_id = order_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| DomainError::ValidationError("缺少必要参数: order_id".to_string()))?;
        self.config.redirect_target(order_id)
    }
}
