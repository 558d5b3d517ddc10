use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - At least one catalog endpoint, each an http(s) URL
/// - Catalog timeout is positive
/// - Page size override is positive
/// - Realtime URL is ws(s) and the backoff cap is not below the base delay
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.catalog.endpoints.is_empty() {
        return Err(ConfigError::ValidationError(
            "catalog.endpoints must list at least one URL".to_string(),
        ));
    }

    for endpoint in &config.catalog.endpoints {
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(ConfigError::ValidationError(format!(
                "catalog endpoint '{}' must be an http(s) URL",
                endpoint
            )));
        }
    }

    if config.catalog.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "catalog.timeout_secs must be greater than 0".to_string(),
        ));
    }

    if config.storefront.page_size == Some(0) {
        return Err(ConfigError::ValidationError(
            "storefront.page_size must be greater than 0".to_string(),
        ));
    }

    let url = &config.realtime.url;
    if !(url.starts_with("ws://") || url.starts_with("wss://")) {
        return Err(ConfigError::ValidationError(format!(
            "realtime.url '{}' must be a ws:// or wss:// URL",
            url
        )));
    }

    if config.realtime.max_delay_ms < config.realtime.base_delay_ms {
        return Err(ConfigError::ValidationError(
            "realtime.max_delay_ms cannot be less than realtime.base_delay_ms".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        CatalogConfig, CorsConfig, RealtimeConfig, ServerConfig, StorefrontConfig,
        StorefrontVariant,
    };

    fn valid_config() -> Config {
        Config {
            storefront: StorefrontConfig {
                variant: StorefrontVariant::Vervida,
                page_size: None,
                display_name: None,
            },
            server: ServerConfig::default(),
            catalog: CatalogConfig::default(),
            cors: CorsConfig::default(),
            realtime: RealtimeConfig::default(),
        }
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let mut config = valid_config();
        config.server.port = 0;
        let result = validate_config(&config);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_validate_no_endpoints_fails() {
        let mut config = valid_config();
        config.catalog.endpoints.clear();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_non_http_endpoint_fails() {
        let mut config = valid_config();
        config.catalog.endpoints = vec!["ftp://catalog.example.com".to_string()];
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("ftp://catalog.example.com"));
    }

    #[test]
    fn test_validate_zero_timeout_fails() {
        let mut config = valid_config();
        config.catalog.timeout_secs = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_zero_page_size_fails() {
        let mut config = valid_config();
        config.storefront.page_size = Some(0);
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_realtime_url_scheme() {
        let mut config = valid_config();
        config.realtime.url = "http://localhost:5217/ws".to_string();
        assert!(validate_config(&config).is_err());

        config.realtime.url = "wss://shop.example.com/ws".to_string();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_backoff_cap_below_base_fails() {
        let mut config = valid_config();
        config.realtime.base_delay_ms = 5_000;
        config.realtime.max_delay_ms = 1_000;
        assert!(validate_config(&config).is_err());
    }
}
