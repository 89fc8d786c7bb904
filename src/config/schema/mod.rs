mod core;
mod gateway;
mod preview;

pub use self::core::Config;
pub use gateway::GatewayConfig;
pub use preview::PreviewConfig;
