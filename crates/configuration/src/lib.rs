use crate::error::ConfigError;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{Auth, Config, Pagination, Server};

/// Loads the application configuration from the `config.toml` file.
///
/// This function is the primary entry point for this crate. It reads the
/// configuration file, applies any `PAWHAVEN_*` environment overrides
/// (e.g. `PAWHAVEN_SERVER__PORT=8080`), and deserializes the result into
/// our strongly-typed `Config` struct.
pub fn load_config() -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        // Tells the builder to look for a file named `config.toml`
        .add_source(config::File::with_name("config.toml"))
        .add_source(config::Environment::with_prefix("PAWHAVEN").separator("__"))
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;

    if config.pagination.default_limit == 0 || config.pagination.max_limit == 0 {
        return Err(ConfigError::ValidationError(
            "pagination limits must be greater than zero".to_string(),
        ));
    }
    if config.pagination.default_limit > config.pagination.max_limit {
        return Err(ConfigError::ValidationError(
            "pagination.default_limit cannot exceed pagination.max_limit".to_string(),
        ));
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml: &str) -> Result<Config, ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?;
        Ok(config.try_deserialize::<Config>()?)
    }

    #[test]
    fn full_config_parses() {
        let config = parse(
            r#"
            [server]
            host = "0.0.0.0"
            port = 3001
            body_limit_mb = 10

            [auth]
            token_ttl_hours = 24
            bcrypt_cost = 10

            [pagination]
            default_limit = 10
            max_limit = 50
            "#,
        )
        .expect("config parses");

        assert_eq!(config.server.port, 3001);
        assert_eq!(config.auth.token_ttl_hours, 24);
        assert_eq!(config.pagination.max_limit, 50);
    }

    #[test]
    fn missing_section_is_an_error() {
        let result = parse(
            r#"
            [server]
            host = "0.0.0.0"
            port = 3001
            body_limit_mb = 10
            "#,
        );
        assert!(result.is_err());
    }
}
