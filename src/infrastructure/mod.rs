pub mod adapters;
pub mod config;

pub use adapters::{GatewayAdapter, HttpCompletionNotifier, InMemoryOrderRepository, MySqlOrderRepository};
pub use config::PayConfig;
