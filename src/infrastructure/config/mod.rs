pub mod pay_config;

pub use pay_config::{PayConfig, Secret};
