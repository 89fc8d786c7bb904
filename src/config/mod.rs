pub mod schema;

pub use schema::{Config, GatewayConfig, PreviewConfig};
