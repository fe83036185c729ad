use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::signature;
use crate::domain::GatewayTrade;
use crate::infrastructure::config::PayConfig;
use crate::ports::payment_gateway_port::*;
use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Map, Number, Value};
use std::sync::Arc;
use tracing::{debug, error};

const CREATE_TRANSACTION_PATH: &str = "/api/v1/order/create-transaction";

/// 网关统一响应
#[derive(Debug, Deserialize)]
struct GatewayEnvelope {
    status_code: i64,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<GatewayTradeData>,
}

#[derive(Debug, Deserialize)]
struct GatewayTradeData {
    trade_id: String,
    actual_amount: Decimal,
    payment_url: String,
    token: String,
    #[serde(default)]
    expiration_time: Option<i64>,
}

/// 支付网关适配器实现
#[derive(Clone)]
pub struct GatewayAdapter {
    config: Arc<PayConfig>,
    client: Client,
}

impl GatewayAdapter {
    pub fn new(config: Arc<PayConfig>) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    /// 组装待签名的下单参数，请求体与签名使用同一份字段集
    fn build_payload(request: &CreateTransactionRequest) -> DomainResult<Map<String, Value>> {
        // 网关以 JSON 数字接收金额，无法被 f64 精确表示的金额直接拒绝
        let amount = request
            .amount
            .to_f64()
            .filter(|value| Decimal::try_from(*value).is_ok_and(|back| back == request.amount))
            .and_then(Number::from_f64)
            .ok_or_else(|| {
                DomainError::ValidationError(format!("amount not representable: {}", request.amount))
            })?;

        let mut payload = Map::new();
        payload.insert("order_id".into(), Value::String(request.order_id.clone()));
        payload.insert("amount".into(), Value::Number(amount));
        payload.insert("trade_type".into(), Value::String(request.trade_type.to_string()));
        payload.insert("notify_url".into(), Value::String(request.notify_url.clone()));
        payload.insert("redirect_url".into(), Value::String(request.redirect_url.clone()));
        if let Some(user_id) = &request.user_id {
            payload.insert("user_id".into(), Value::String(user_id.clone()));
        }
        Ok(payload)
    }

    /// 从失败响应中提取网关消息
    fn gateway_message(status: reqwest::StatusCode, body: &str) -> String {
        serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|v| v["message"].as_str().map(String::from))
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| format!("gateway returned HTTP {}", status))
    }
}

#[async_trait]
impl PaymentGatewayPort for GatewayAdapter {
    /// 在网关创建交易
    async fn create_transaction(&self, request: CreateTransactionRequest) -> DomainResult<GatewayTrade> {
        let settings = self.config.gateway()?;
        let url = format!("{}{}", settings.base_url, CREATE_TRANSACTION_PATH);

        let mut payload = Self::build_payload(&request)?;
        let digest = signature::sign(&payload, settings.secret.reveal());
        payload.insert(signature::SIGNATURE_FIELD.into(), Value::String(digest));

        debug!("Gateway create-transaction payload for order {}: {}", request.order_id, signature::canonical_string(&payload));

        let response = self
            .client
            .post(&url)
            .header("Accept", "application/json")
            .json(&Value::Object(payload))
            .send()
            .await
            .map_err(|e| {
                error!("Gateway unreachable: {}", e);
                DomainError::GatewayError(format!("gateway unreachable: {}", e))
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| DomainError::GatewayError(format!("failed to read gateway response: {}", e)))?;

        if !status.is_success() {
            error!("Gateway API error: {} - {}", status, body);
            return Err(DomainError::GatewayError(Self::gateway_message(status, &body)));
        }

        let envelope: GatewayEnvelope = serde_json::from_str(&body).map_err(|e| {
            error!("Malformed gateway response: {} - {}", e, body);
            DomainError::GatewayError(format!("malformed gateway response: {}", e))
        })?;
        debug!("Gateway response status_code: {}", envelope.status_code);

        if envelope.status_code != 200 {
            let message = envelope
                .message
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| format!("gateway status_code {}", envelope.status_code));
            return Err(DomainError::GatewayError(message));
        }

        let data = envelope
            .data
            .ok_or_else(|| DomainError::GatewayError("gateway response missing data".to_string()))?;

        Ok(GatewayTrade {
            trade_id: data.trade_id,
            actual_amount: data.actual_amount,
            payment_url: data.payment_url,
            token: data.token,
            expiration_time: data.expiration_time,
        })
    }

    /// 校验回调签名
    fn verify_callback(&self, params: &Map<String, Value>) -> DomainResult<bool> {
        let secret = self.config.gateway_secret.as_ref().ok_or_else(|| {
            DomainError::ConfigurationError("PAY_GATEWAY_SECRET is not set".to_string())
        })?;
        Ok(signature::verify_embedded(params, secret.reveal()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TradeType;
    use crate::infrastructure::config::Secret;
    use axum::{routing::post, Json, Router};
    use rust_decimal_macros::dec;
    use serde_json::json;
    use tokio::sync::Mutex;

    async fn spawn_gateway(
        status: axum::http::StatusCode,
        reply: Value,
    ) -> (String, Arc<Mutex<Vec<Value>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let captured = seen.clone();
        let app = Router::new().route(
            CREATE_TRANSACTION_PATH,
            post(move |Json(body): Json<Value>| {
                let captured = captured.clone();
                let reply = reply.clone();
                async move {
                    captured.lock().await.push(body);
                    (status, Json(reply))
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{}", addr), seen)
    }

    fn adapter(base_url: &str) -> GatewayAdapter {
        GatewayAdapter::new(Arc::new(PayConfig {
            gateway_base_url: Some(base_url.to_string()),
            gateway_secret: Some(Secret::new("secret123")),
            ..PayConfig::default()
        }))
    }

    fn request() -> CreateTransactionRequest {
        CreateTransactionRequest {
            order_id: "ORD1001".to_string(),
            amount: dec!(10.50),
            trade_type: TradeType::new("usdt.trc20").unwrap(),
            user_id: None,
            notify_url: "http://localhost:3000/api/pay/notify".to_string(),
            redirect_url: "http://localhost:3000/api/pay/return?order_id=ORD1001".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_transaction_signs_payload() {
        let (base_url, seen) = spawn_gateway(
            axum::http::StatusCode::OK,
            json!({
                "status_code": 200,
                "message": "success",
                "data": {
                    "trade_id": "T1",
                    "order_id": "ORD1001",
                    "amount": 10.5,
                    "actual_amount": "10.50",
                    "token": "tok1",
                    "expiration_time": 1700000600,
                    "payment_url": "https://pay/T1"
                }
            }),
        )
        .await;

        let trade = adapter(&base_url).create_transaction(request()).await.unwrap();
        assert_eq!(trade.trade_id, "T1");
        assert_eq!(trade.actual_amount, dec!(10.50));
        assert_eq!(trade.payment_url, "https://pay/T1");
        assert_eq!(trade.token, "tok1");
        assert_eq!(trade.expiration_time, Some(1_700_000_600));

        let bodies = seen.lock().await;
        assert_eq!(bodies.len(), 1);
        let body = bodies[0].as_object().unwrap();
        assert_eq!(body["amount"], json!(10.5));
        assert_eq!(body["notify_url"], json!("http://localhost:3000/api/pay/notify"));
        assert!(!body.contains_key("user_id"));
        assert!(signature::verify_embedded(body, "secret123"));
    }

    #[tokio::test]
    async fn test_gateway_rejection_carries_message() {
        let (base_url, _) = spawn_gateway(
            axum::http::StatusCode::OK,
            json!({ "status_code": 401, "message": "签名认证错误", "data": null }),
        )
        .await;

        let err = adapter(&base_url).create_transaction(request()).await.unwrap_err();
        match err {
            DomainError::GatewayError(message) => assert_eq!(message, "签名认证错误"),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[tokio::test]
    async fn test_gateway_http_failure() {
        let (base_url, _) = spawn_gateway(
            axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            json!({ "message": "maintenance" }),
        )
        .await;

        let err = adapter(&base_url).create_transaction(request()).await.unwrap_err();
        assert!(matches!(err, DomainError::GatewayError(ref m) if m == "maintenance"));
    }

    #[tokio::test]
    async fn test_malformed_response() {
        let (base_url, _) =
            spawn_gateway(axum::http::StatusCode::OK, json!({ "unexpected": true })).await;

        let err = adapter(&base_url).create_transaction(request()).await.unwrap_err();
        assert!(matches!(err, DomainError::GatewayError(_)));
    }

    #[tokio::test]
    async fn test_unreachable_gateway() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = adapter(&format!("http://{}", addr))
            .create_transaction(request())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::GatewayError(_)));
    }

    #[tokio::test]
    async fn test_missing_configuration_fails_fast() {
        let adapter = GatewayAdapter::new(Arc::new(PayConfig::default()));
        let err = adapter.create_transaction(request()).await.unwrap_err();
        assert!(matches!(err, DomainError::ConfigurationError(_)));
        assert!(matches!(
            adapter.verify_callback(&Map::new()),
            Err(DomainError::ConfigurationError(_))
        ));
    }

    #[test]
    fn test_build_payload_includes_user() {
        let mut request = request();
        request.user_id = Some("42".to_string());
        let payload = GatewayAdapter::build_payload(&request).unwrap();
        assert_eq!(payload["user_id"], json!("42"));
        assert_eq!(payload["trade_type"], json!("usdt.trc20"));
    }

    #[test]
    fn test_build_payload_rejects_lossy_amount() {
        let mut request = request();
        request.amount = dec!(12345678901234567.891);
        let err = GatewayAdapter::build_payload(&request).unwrap_err();
        assert!(matches!(err, DomainError::ValidationError(_)));

        request.amount = dec!(0.000001);
        let payload = GatewayAdapter::build_payload(&request).unwrap();
        assert_eq!(payload["amount"], json!(0.000001));
    }
}
