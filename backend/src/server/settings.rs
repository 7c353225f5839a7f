//! Application settings loaded via OrthoConfig.
//!
//! Values come from CLI flags, `RELAY_*` environment variables and an
//! optional configuration file, in that order of precedence.

use std::net::SocketAddr;

use alias_relay::domain::{DEFAULT_MAX_RECIPIENTS, RecipientLimit, ZeroRecipientLimit};
use alias_relay::outbound::persistence::PoolConfig;
use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Errors raised while turning raw settings into server configuration.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to load settings: {0}")]
    Load(String),
    #[error("invalid bind address '{value}': {source}")]
    BindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
    #[error("invalid max_recipients_per_alias: {0}")]
    RecipientLimit(#[from] ZeroRecipientLimit),
}

/// Runtime settings for the HTTP server.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "RELAY")]
pub struct AppSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL connection string. Fixture ports are served without one.
    pub database_url: Option<String>,
    /// Maximum pooled database connections.
    pub pool_max_size: Option<u32>,
    /// Cap on recipients linked to a single alias.
    pub max_recipients_per_alias: Option<u16>,
}

impl AppSettings {
    /// Load settings from the process arguments and environment.
    ///
    /// # Errors
    /// Returns [`SettingsError::Load`] when a layer cannot be parsed.
    pub fn load_from_process() -> Result<Self, SettingsError> {
        Self::load().map_err(|err| SettingsError::Load(err.to_string()))
    }

    /// Parsed bind address, falling back to the default.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value.parse().map_err(|source| SettingsError::BindAddr {
            value: value.to_owned(),
            source,
        })
    }

    /// Configured recipient cap, falling back to the default.
    pub fn recipient_limit(&self) -> Result<RecipientLimit, SettingsError> {
        let limit = self
            .max_recipients_per_alias
            .unwrap_or(DEFAULT_MAX_RECIPIENTS);
        Ok(RecipientLimit::new(limit)?)
    }

    /// Pool configuration when a database URL is set.
    pub fn pool_config(&self) -> Option<PoolConfig> {
        let url = self.database_url.as_deref()?;
        let config = PoolConfig::new(url);
        Some(match self.pool_max_size {
            Some(size) => config.with_max_size(size),
            None => config,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 4] = [
        "RELAY_BIND_ADDR",
        "RELAY_DATABASE_URL",
        "RELAY_POOL_MAX_SIZE",
        "RELAY_MAX_RECIPIENTS_PER_ALIAS",
    ];

    fn load_from_empty_args() -> AppSettings {
        AppSettings::load_from_iter([OsString::from("alias-relay")])
            .expect("settings should load")
    }

    fn cleared() -> Vec<(&'static str, Option<String>)> {
        VARS.iter().map(|name| (*name, None)).collect()
    }

    #[rstest]
    fn defaults_apply_when_unset() {
        let _guard = lock_env(cleared());

        let settings = load_from_empty_args();

        assert_eq!(
            settings.bind_addr().expect("default parses"),
            DEFAULT_BIND_ADDR.parse::<SocketAddr>().expect("valid")
        );
        assert_eq!(
            settings.recipient_limit().expect("default limit").get(),
            DEFAULT_MAX_RECIPIENTS
        );
        assert!(settings.pool_config().is_none());
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let mut vars = cleared();
        vars[0].1 = Some("127.0.0.1:9090".to_owned());
        vars[1].1 = Some("postgres://relay@localhost/relay".to_owned());
        vars[2].1 = Some("4".to_owned());
        vars[3].1 = Some("3".to_owned());
        let _guard = lock_env(vars);

        let settings = load_from_empty_args();

        assert_eq!(
            settings.bind_addr().expect("override parses").port(),
            9090
        );
        assert_eq!(settings.recipient_limit().expect("limit").get(), 3);
        let pool = settings.pool_config().expect("pool configured");
        assert_eq!(pool.database_url(), "postgres://relay@localhost/relay");
        assert_eq!(pool.max_size(), 4);
    }

    #[rstest]
    fn zero_recipient_limit_is_rejected() {
        let settings = AppSettings {
            bind_addr: None,
            database_url: None,
            pool_max_size: None,
            max_recipients_per_alias: Some(0),
        };

        assert!(matches!(
            settings.recipient_limit(),
            Err(SettingsError::RecipientLimit(_))
        ));
    }

    #[rstest]
    fn malformed_bind_addr_is_reported() {
        let settings = AppSettings {
            bind_addr: Some("not-an-address".to_owned()),
            database_url: None,
            pool_max_size: None,
            max_recipients_per_alias: None,
        };

        let error = settings.bind_addr().expect_err("invalid address");
        assert!(error.to_string().contains("not-an-address"));
    }
}
