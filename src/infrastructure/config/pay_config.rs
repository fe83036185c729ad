use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::TradeType;
use std::fmt;
use std::sync::Arc;

/// 日志中隐藏内容的密钥
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn reveal(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("****")
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("****")
    }
}

/// 支付配置
#[derive(Debug, Clone)]
pub struct PayConfig {
    /// 网关基础URL
    pub gateway_base_url: Option<String>,

    /// 网关签名密钥
    pub gateway_secret: Option<Secret>,

    /// 内部消费方通知地址
    pub notify_consumer_url: Option<String>,

    /// 支付完成后跳转的前端地址
    pub redirect_base_url: Option<String>,

    /// 本服务对外地址，用于拼接回调与跳转URL
    pub public_base_url: String,

    /// 调用方未指定时的支付通道
    pub default_trade_type: TradeType,

    /// 回调写库失败时仍然应答 ok
    pub ack_on_store_failure: bool,
}

/// 网关调用所需的配置
#[derive(Debug, Clone)]
pub struct GatewaySettings<'a> {
    pub base_url: &'a str,
    pub secret: &'a Secret,
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_flag(value: Option<String>) -> bool {
    matches!(
        value.as_deref().map(str::to_ascii_lowercase).as_deref(),
        Some("1" | "true" | "yes" | "on")
    )
}

impl PayConfig {
    pub fn from_env() -> Arc<Self> {
        Arc::new(Self {
            gateway_base_url: non_empty_var("PAY_GATEWAY_BASE_URL"),
            gateway_secret: non_empty_var("PAY_GATEWAY_SECRET").map(Secret::new),
            notify_consumer_url: non_empty_var("PAY_NOTIFY_CONSUMER_URL"),
            redirect_base_url: non_empty_var("PAY_REDIRECT_BASE_URL"),
            public_base_url: non_empty_var("BASE_URL")
                .unwrap_or_else(|| "http://localhost:3000".to_string()),
            default_trade_type: non_empty_var("PAY_DEFAULT_TRADE_TYPE")
                .and_then(TradeType::new)
                .unwrap_or_default(),
            ack_on_store_failure: parse_flag(non_empty_var("PAY_ACK_ON_STORE_FAILURE")),
        })
    }

    /// 网关地址与密钥缺一不可
    pub fn gateway(&self) -> DomainResult<GatewaySettings<'_>> {
        let base_url = self.gateway_base_url.as_deref().ok_or_else(|| {
            DomainError::ConfigurationError("PAY_GATEWAY_BASE_URL is not set".to_string())
        })?;
        let secret = self.gateway_secret.as_ref().ok_or_else(|| {
            DomainError::ConfigurationError("PAY_GATEWAY_SECRET is not set".to_string())
        })?;

        Ok(GatewaySettings {
            base_url: base_url.trim_end_matches('/'),
            secret,
        })
    }

    /// 网关回调地址
    pub fn notify_url(&self) -> String {
        format!("{}/api/pay/notify", self.public_base_url.trim_end_matches('/'))
    }

    /// 支付完成后网关跳回本服务的地址
    pub fn return_url(&self, order_id: &str) -> DomainResult<String> {
        let base = format!("{}/api/pay/return", self.public_base_url.trim_end_matches('/'));
        let mut url = url::Url::parse(&base)
            .map_err(|e| DomainError::ConfigurationError(format!("invalid BASE_URL: {}", e)))?;
        url.query_pairs_mut().append_pair("order_id", order_id);
        Ok(url.into())
    }

    /// 前端跳转地址 `<redirect_base>?payment_success=1&order_id=<id>`
    pub fn redirect_target(&self, order_id: &str) -> DomainResult<String> {
        let base = self.redirect_base_url.as_deref().ok_or_else(|| {
            DomainError::ConfigurationError("PAY_REDIRECT_BASE_URL is not set".to_string())
        })?;
        let mut url = url::Url::parse(base).map_err(|e| {
            DomainError::ConfigurationError(format!("invalid PAY_REDIRECT_BASE_URL: {}", e))
        })?;
        url.query_pairs_mut()
            .append_pair("payment_success", "1")
            .append_pair("order_id", order_id);
        Ok(url.into())
    }
}

impl Default for PayConfig {
    fn default() -> Self {
        Self {
            gateway_base_url: None,
            gateway_secret: None,
            notify_consumer_url: None,
            redirect_base_url: None,
            public_base_url: "http://localhost:3000".to_string(),
            default_trade_type: TradeType::default(),
            ack_on_store_failure: false,
        }
    }
}
