use thiserror::Error;

/// 领域层错误类型
#[derive(Error, Debug)]
pub enum DomainError {
    /// 验证错误
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 订单未找到
    #[error("Payment order not found: {0}")]
    OrderNotFound(String),

    /// 订单号重复
    #[error("Payment order already exists: {0}")]
    DuplicateOrder(String),

    /// 订单状态错误
    #[error("Invalid payment state: expected {expected}, got {actual}")]
    InvalidState { expected: String, actual: String },

    /// 签名验证失败
    #[error("Signature verification failed")]
    SignatureVerificationFailed,

    /// 支付网关返回失败
    #[error("Gateway error: {0}")]
    GatewayError(String),

    /// 数据库错误
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    /// 序列化错误
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// HTTP请求错误
    #[error("HTTP request error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// 下游通知失败
    #[error("Notifier error: {0}")]
    NotifierError(String),

    /// 配置错误
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// 内部错误
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// 是否为存储层故障
    pub fn is_persistence(&self) -> bool {
        matches!(self, DomainError::DatabaseError(_) | DomainError::InternalError(_))
    }
}

/// 领域结果类型
pub type DomainResult<T> = Result<T, DomainError>;
