pub mod gateway_adapter;
pub mod http_notifier;
pub mod memory_order_repository;
pub mod mysql_order_repository;

pub use gateway_adapter::GatewayAdapter;
pub use http_notifier::HttpCompletionNotifier;
pub use memory_order_repository::InMemoryOrderRepository;
pub use mysql_order_repository::MySqlOrderRepository;
