use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub upi: UpiConfig,
    pub client: ClientConfig,
    #[serde(default)]
    pub menu: MenuConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
}

fn default_host() -> String { "0.0.0.0".to_string() }

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    pub orders_file: PathBuf,
    #[serde(default = "default_first_order_number")]
    pub first_order_number: u64,
}

fn default_first_order_number() -> u64 { 1001 }

#[derive(Debug, Deserialize, Clone)]
pub struct UpiConfig {
    pub payee_address: String,
    pub payee_name: String,
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String { "INR".to_string() }

#[derive(Debug, Deserialize, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    #[serde(default = "default_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_timeout_ms() -> u64 { 5000 }

impl ClientConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct MenuConfig {
    /// JSON menu file; the built-in café menu is used when absent
    pub file: Option<PathBuf>,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Per-environment overrides, optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Machine-local settings, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(environment())
            .build()?;

        s.try_deserialize()
    }
}

/// `CAFE__SERVER__PORT=8080` sets `server.port`
fn environment() -> config::Environment {
    config::Environment::with_prefix("CAFE")
        .prefix_separator("__")
        .separator("__")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_optional_fields() {
        let raw = r#"
            [server]
            port = 5000

            [store]
            orders_file = "orders.json"

            [upi]
            payee_address = "cafe@okbank"
            payee_name = "Corner Cafe"

            [client]
            base_url = "http://127.0.0.1:5000"
        "#;

        let config: Config = config::Config::builder()
            .add_source(config::File::from_str(raw, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.store.first_order_number, 1001);
        assert_eq!(config.upi.currency, "INR");
        assert_eq!(config.client.request_timeout(), Duration::from_secs(5));
        assert!(config.menu.file.is_none());
    }

    #[test]
    fn test_environment_overrides_use_double_underscores() {
        let vars: config::Map<String, String> = [
            ("CAFE__SERVER__PORT", "8080"),
            ("CAFE__STORE__ORDERS_FILE", "orders.json"),
            ("CAFE__UPI__PAYEE_ADDRESS", "cafe@okbank"),
            ("CAFE__UPI__PAYEE_NAME", "Corner Cafe"),
            ("CAFE__CLIENT__BASE_URL", "http://127.0.0.1:8080"),
            ("CAFE__CLIENT__REQUEST_TIMEOUT_MS", "777"),
            ("CAFE_MENU__FILE", "ignored.json"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let config: Config = config::Config::builder()
            .add_source(environment().source(Some(vars)))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.client.request_timeout(), Duration::from_millis(777));
        assert!(config.menu.file.is_none());
    }
}
