pub mod dto;
pub mod payment_service;

pub use dto::{ApiResponse, CreateOrderRequest, ReturnQuery};
pub use payment_service::PaymentService;
