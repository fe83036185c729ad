use super::handlers::*;
use super::middleware::{cors_layer, preflight};
use crate::ports::{CompletionNotifierPort, OrderRepositoryPort, PaymentGatewayPort};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub fn create_router<G, R, N>(state: AppState<G, R, N>) -> Router
where
    G: PaymentGatewayPort + 'static,
    R: OrderRepositoryPort + 'static,
    N: CompletionNotifierPort + 'static,
{
    Router::new()
        .route("/health", get(health_check))
        .route("/api/pay/create", post(create_order::<G, R, N>))
        .route("/api/pay/notify", post(payment_notify::<G, R, N>))
        .route("/api/pay/status/:trade_id", get(order_status::<G, R, N>))
        .route("/api/pay/return", get(payment_return::<G, R, N>))
        .with_state(state)
        .layer(cors_layer())
        .layer(middleware::from_fn(preflight))
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::payment_service::tests::{
        create_request, service, service_with, signed_callback, test_config, CountingNotifier,
        RecordingGateway, TestService,
    };
    use crate::domain::OrderStatus;
    use crate::infrastructure::config::PayConfig;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn router(service: &Arc<TestService>) -> Router {
        create_router(AppState {
            payment_service: service.clone(),
        })
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, axum::http::HeaderMap, String) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, headers, String::from_utf8(body.to_vec()).unwrap())
    }

    fn post_json(uri: &str, body: &Value) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::ORIGIN, "https://app.example")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header(header::ORIGIN, "https://app.example")
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_order_envelope() {
        let service = Arc::new(service());
        let (status, headers, body) = send(
            router(&service),
            post_json(
                "/api/pay/create",
                &json!({ "order_id": "ORD1001", "amount": 10.50, "trade_type": "usdt.trc20" }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        let body: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["trade_id"], "T1");
        assert_eq!(body["data"]["order_id"], "ORD1001");
        assert_eq!(body["data"]["payment_url"], "https://pay/T1");
        assert_eq!(body["data"]["token"], "tok1");
    }

    #[tokio::test]
    async fn test_create_order_missing_amount() {
        let service = Arc::new(service());
        let (status, _, body) = send(
            router(&service),
            post_json("/api/pay/create", &json!({ "order_id": "ORD1001" })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let body: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().contains("amount"));
        assert_eq!(service.gateway_calls(), 0);
    }

    #[tokio::test]
    async fn test_create_order_malformed_json() {
        let service = Arc::new(service());
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/pay/create")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, _, body) = send(router(&service), request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let body: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_create_order_misconfigured() {
        let config = PayConfig {
            gateway_base_url: None,
            ..test_config()
        };
        let service = Arc::new(service_with(config, RecordingGateway::new(), CountingNotifier::default()));
        let (status, _, body) = send(
            router(&service),
            post_json("/api/pay/create", &json!({ "order_id": "ORD1001", "amount": "10.50" })),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_notify_lifecycle() {
        let service = Arc::new(service());
        service.create_order(create_request()).await.unwrap();
        let callback = Value::Object(signed_callback(2, "0xabc"));

        let (status, _, body) = send(router(&service), post_json("/api/pay/notify", &callback)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "ok");

        let (status, _, body) = send(router(&service), post_json("/api/pay/notify", &callback)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "ok");
        assert_eq!(service.completion_events(), 1);

        let (status, _, body) = send(router(&service), get("/api/pay/status/T1")).await;
        assert_eq!(status, StatusCode::OK);
        let body: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["status"], OrderStatus::Completed.code());
        assert_eq!(body["data"]["order_id"], "ORD1001");
    }

    #[tokio::test]
    async fn test_notify_bad_signature() {
        let service = Arc::new(service());
        service.create_order(create_request()).await.unwrap();
        let mut callback = signed_callback(2, "0xabc");
        callback.insert("signature".into(), json!("00000000000000000000000000000000"));

        let (status, _, _) = send(
            router(&service),
            post_json("/api/pay/notify", &Value::Object(callback)),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let stored = service.order("ORD1001").await;
        assert_eq!(stored.status, OrderStatus::Created);
    }

    #[tokio::test]
    async fn test_notify_unparseable_body() {
        let service = Arc::new(service());
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/pay/notify")
            .body(Body::from("garbage"))
            .unwrap();
        let (status, _, body) = send(router(&service), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, "fail");
    }

    #[tokio::test]
    async fn test_notify_store_failure_is_retryable() {
        let service = Arc::new(service());
        service.create_order(create_request()).await.unwrap();
        service.fail_updates();

        let (status, _, _) = send(
            router(&service),
            post_json("/api/pay/notify", &Value::Object(signed_callback(2, "0xabc"))),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_status_not_found() {
        let service = Arc::new(service());
        let (status, headers, body) = send(router(&service), get("/api/pay/status/T404")).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        let body: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(body, json!({ "success": false, "error": "订单不存在" }));
    }

    #[tokio::test]
    async fn test_payment_return_redirects() {
        let service = Arc::new(service());
        let (status, headers, _) = send(router(&service), get("/api/pay/return?order_id=ORD1001")).await;

        assert_eq!(status, StatusCode::FOUND);
        assert_eq!(
            headers[header::LOCATION],
            "https://app.example/recharge?payment_success=1&order_id=ORD1001"
        );
    }

    #[tokio::test]
    async fn test_preflight() {
        let service = Arc::new(service());
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/pay/create")
            .body(Body::empty())
            .unwrap();
        let (status, headers, _) = send(router(&service), request).await;

        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(headers[header::ACCESS_CONTROL_MAX_AGE], "86400");
    }

    #[tokio::test]
    async fn test_health() {
        let service = Arc::new(service());
        let (status, _, body) = send(router(&service), get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, r#"{"status":"ok"}"#);
    }
}
