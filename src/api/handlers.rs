use crate::application::{ApiResponse, CreateOrderRequest, PaymentService, ReturnQuery};
use crate::domain::errors::DomainError;
use crate::ports::{CompletionNotifierPort, OrderRepositoryPort, PaymentGatewayPort};
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{error, info, warn};

/// 应用状态
pub struct AppState<G: PaymentGatewayPort, R: OrderRepositoryPort, N: CompletionNotifierPort> {
    pub payment_service: Arc<PaymentService<G, R, N>>,
}

impl<G: PaymentGatewayPort, R: OrderRepositoryPort, N: CompletionNotifierPort> Clone for AppState<G, R, N> {
    fn clone(&self) -> Self {
        Self {
            payment_service: self.payment_service.clone(),
        }
    }
}

/// 错误到HTTP状态码的映射
pub fn status_for(error: &DomainError) -> StatusCode {
    match error {
        DomainError::ValidationError(_)
        | DomainError::GatewayError(_)
        | DomainError::SerializationError(_)
        | DomainError::SignatureVerificationFailed => StatusCode::BAD_REQUEST,
        DomainError::OrderNotFound(_) => StatusCode::NOT_FOUND,
        DomainError::DuplicateOrder(_) | DomainError::InvalidState { .. } => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

type EnvelopeError = (StatusCode, Json<ApiResponse<()>>);

fn envelope_error(error: &DomainError) -> EnvelopeError {
    (status_for(error), Json(ApiResponse::error(error.to_string())))
}

/// 创建支付订单
pub async fn create_order<G: PaymentGatewayPort, R: OrderRepositoryPort, N: CompletionNotifierPort>(
    State(state): State<AppState<G, R, N>>,
    payload: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<impl IntoResponse, EnvelopeError> {
    let Json(request) = payload.map_err(|rejection| {
        warn!("Rejected malformed create request: {}", rejection.body_text());
        (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error(rejection.body_text())),
        )
    })?;

    info!("Received payment creation request: {:?}", request.order_id);

    state
        .payment_service
        .create_order(request)
        .await
        .map(|data| (StatusCode::OK, Json(ApiResponse::ok(data))))
        .map_err(|e| {
            error!("Payment creation error: {}", e);
            envelope_error(&e)
        })
}

/// 网关支付回调，应答纯文本
pub async fn payment_notify<G: PaymentGatewayPort, R: OrderRepositoryPort, N: CompletionNotifierPort>(
    State(state): State<AppState<G, R, N>>,
    body: String,
) -> Response {
    info!("Received gateway callback");

    let params: Map<String, Value> = match serde_json::from_str(&body) {
        Ok(params) => params,
        Err(e) => {
            warn!("Failed to parse callback body: {}", e);
            return (StatusCode::BAD_REQUEST, "fail").into_response();
        }
    };

    match state.payment_service.handle_callback(params).await {
        Ok(outcome) => {
            info!("Callback processed: {:?}", outcome);
            (StatusCode::OK, "ok").into_response()
        }
        Err(e) => {
            error!("Callback handling error: {}", e);
            (status_for(&e), e.to_string()).into_response()
        }
    }
}

/// 按交易号查询订单
pub async fn order_status<G: PaymentGatewayPort, R: OrderRepositoryPort, N: CompletionNotifierPort>(
    State(state): State<AppState<G, R, N>>,
    Path(trade_id): Path<String>,
) -> Result<impl IntoResponse, EnvelopeError> {
    info!("Received payment query request: {}", trade_id);

    state
        .payment_service
        .get_by_trade_id(&trade_id)
        .await
        .map(|snapshot| (StatusCode::OK, Json(ApiResponse::ok(snapshot))))
        .map_err(|e| match e {
            DomainError::OrderNotFound(_) => (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::error("订单不存在")),
            ),
            other => {
                error!("Payment query error: {}", other);
                envelope_error(&other)
            }
        })
}

/// 支付完成后跳转回前端
pub async fn payment_return<G: PaymentGatewayPort, R: OrderRepositoryPort, N: CompletionNotifierPort>(
    State(state): State<AppState<G, R, N>>,
    Query(query): Query<ReturnQuery>,
) -> Result<impl IntoResponse, EnvelopeError> {
    let target = state
        .payment_service
        .return_redirect(query.order_id.as_deref())
        .map_err(|e| {
            warn!("Payment return error: {}", e);
            envelope_error(&e)
        })?;

    Ok((StatusCode::FOUND, [(header::LOCATION, target)]))
}

/// 健康检查
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
}
