use super::Config;

impl Config {
    pub fn apply_env_overrides(&mut self) {
        if let Ok(port_str) =
            std::env::var("CHATLINE_GATEWAY_PORT").or_else(|_| std::env::var("PORT"))
            && let Ok(port) = port_str.parse::<u16>()
        {
            self.gateway.port = port;
        }

        if let Ok(host) =
            std::env::var("CHATLINE_GATEWAY_HOST").or_else(|_| std::env::var("HOST"))
            && !host.is_empty()
        {
            self.gateway.host = host;
        }

        if let Ok(timeout_str) = std::env::var("CHATLINE_PREVIEW_TIMEOUT_SECS")
            && let Ok(timeout) = timeout_str.parse::<u64>()
            && timeout > 0
        {
            self.preview.timeout_secs = timeout;
        }

        if let Ok(capacity_str) = std::env::var("CHATLINE_PREVIEW_CACHE_CAPACITY")
            && let Ok(capacity) = capacity_str.parse::<usize>()
        {
            self.preview.cache_capacity = capacity;
        }
    }
}
