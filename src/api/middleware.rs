use axum::{
    extract::Request,
    http::{header, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};

/// 预检缓存时间
pub const PREFLIGHT_MAX_AGE: Duration = Duration::from_secs(24 * 60 * 60);

const ALLOWED_METHODS: &str = "GET, POST, OPTIONS";
const ALLOWED_HEADERS: &str = "Content-Type, Authorization";

/// 所有 OPTIONS 请求直接返回 204
pub async fn preflight(request: Request, next: Next) -> Response {
    if request.method() != Method::OPTIONS {
        return next.run(request).await;
    }

    (
        StatusCode::NO_CONTENT,
        [
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*".to_string()),
            (header::ACCESS_CONTROL_ALLOW_METHODS, ALLOWED_METHODS.to_string()),
            (header::ACCESS_CONTROL_ALLOW_HEADERS, ALLOWED_HEADERS.to_string()),
            (header::ACCESS_CONTROL_MAX_AGE, PREFLIGHT_MAX_AGE.as_secs().to_string()),
        ],
    )
        .into_response()
}

/// 普通响应附带 `Access-Control-Allow-Origin: *`
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
        .max_age(PREFLIGHT_MAX_AGE)
}
