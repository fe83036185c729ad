pub mod entities;
pub mod errors;
pub mod events;
pub mod signature;
pub mod value_objects;

pub use entities::{GatewayTrade, PaymentOrder, SettlementUpdate, Transition};
pub use events::*;
pub use value_objects::{OrderStatus, TradeType};

/// 当前毫秒时间戳
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
