pub mod notifier_port;
pub mod order_repository_port;
pub mod payment_gateway_port;

pub use notifier_port::CompletionNotifierPort;
pub use order_repository_port::OrderRepositoryPort;
pub use payment_gateway_port::{CreateTransactionRequest, PaymentGatewayPort};
