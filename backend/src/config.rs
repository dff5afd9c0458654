//! Server configuration loaded via OrthoConfig.
//!
//! Values come from `--flags`, `BOOKSHELF_*` environment variables or a
//! configuration file, in that order of precedence. Session secrets are read
//! separately by [`crate::inbound::http::session_config`].

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

use crate::domain::CoverUrls;
use crate::outbound::open_library::DEFAULT_BASE_URL;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// Errors raised while interpreting loaded settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// Neither `BOOKSHELF_DATABASE_URL` nor `DATABASE_URL` is set.
    #[error("database URL missing; set BOOKSHELF_DATABASE_URL or DATABASE_URL")]
    MissingDatabaseUrl,
    /// `host` is not an IP address.
    #[error("invalid host '{value}': {source}")]
    InvalidHost {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
    /// The Open Library base URL does not parse.
    #[error("invalid Open Library URL '{value}': {source}")]
    InvalidUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },
}

/// Settings for the API server.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "BOOKSHELF")]
pub struct AppSettings {
    /// PostgreSQL connection string.
    pub database_url: Option<String>,
    /// Listen address; defaults to all interfaces.
    pub host: Option<String>,
    /// Listen port; defaults to 8080.
    pub port: Option<u16>,
    /// Open Library API host.
    pub open_library_base_url: Option<String>,
    /// Open Library covers host.
    pub covers_base_url: Option<String>,
    /// Per-request timeout for Open Library calls.
    pub http_timeout_secs: Option<u64>,
    /// Apply embedded migrations before serving.
    #[ortho_config(default = true)]
    pub run_migrations: bool,
}

impl AppSettings {
    /// Connection string, falling back to the conventional `DATABASE_URL`.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::MissingDatabaseUrl`] when neither is set.
    pub fn database_url(&self) -> Result<String, SettingsError> {
        self.database_url
            .clone()
            .or_else(|| std::env::var("DATABASE_URL").ok())
            .filter(|url| !url.trim().is_empty())
            .ok_or(SettingsError::MissingDatabaseUrl)
    }

    /// Socket address to bind.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidHost`] when `host` is not an IP.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let ip = match self.host.as_deref() {
            Some(host) => host
                .parse::<IpAddr>()
                .map_err(|source| SettingsError::InvalidHost {
                    value: host.to_owned(),
                    source,
                })?,
            None => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        };
        Ok(SocketAddr::new(ip, self.port.unwrap_or(DEFAULT_PORT)))
    }

    /// Open Library API root.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidUrl`] when the override does not parse.
    pub fn open_library_base_url(&self) -> Result<Url, SettingsError> {
        let raw = self
            .open_library_base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL);
        Url::parse(raw).map_err(|source| SettingsError::InvalidUrl {
            value: raw.to_owned(),
            source,
        })
    }

    /// Cover and portrait URL builder.
    #[must_use]
    pub fn cover_urls(&self) -> CoverUrls {
        self.covers_base_url
            .as_deref()
            .map(CoverUrls::new)
            .unwrap_or_default()
    }

    /// Timeout applied to each Open Library request.
    #[must_use]
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs.unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS))
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for settings parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 8] = [
        "BOOKSHELF_DATABASE_URL",
        "BOOKSHELF_HOST",
        "BOOKSHELF_PORT",
        "BOOKSHELF_OPEN_LIBRARY_BASE_URL",
        "BOOKSHELF_COVERS_BASE_URL",
        "BOOKSHELF_HTTP_TIMEOUT_SECS",
        "BOOKSHELF_RUN_MIGRATIONS",
        "DATABASE_URL",
    ];

    fn load(args: &[&str]) -> AppSettings {
        let argv = std::iter::once(OsString::from("bookshelf")).chain(args.iter().map(OsString::from));
        AppSettings::load_from_iter(argv).expect("config should load")
    }

    fn cleared() -> Vec<(&'static str, Option<String>)> {
        VARS.iter().map(|name| (*name, None)).collect()
    }

    #[rstest]
    fn defaults_apply_when_nothing_is_set() {
        let _guard = lock_env(cleared());

        let settings = load(&[]);

        assert!(settings.run_migrations);
        assert_eq!(
            settings.bind_addr().expect("default address"),
            SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT))
        );
        assert_eq!(settings.http_timeout(), Duration::from_secs(10));
        assert_eq!(
            settings.open_library_base_url().expect("default url").as_str(),
            "https://openlibrary.org/"
        );
        assert!(matches!(
            settings.database_url(),
            Err(SettingsError::MissingDatabaseUrl)
        ));
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let mut vars = cleared();
        vars.extend([
            ("BOOKSHELF_DATABASE_URL", Some("postgres://db/books".to_owned())),
            ("BOOKSHELF_HOST", Some("127.0.0.1".to_owned())),
            ("BOOKSHELF_PORT", Some("9090".to_owned())),
            ("BOOKSHELF_HTTP_TIMEOUT_SECS", Some("3".to_owned())),
            ("BOOKSHELF_RUN_MIGRATIONS", Some("false".to_owned())),
        ]);
        let _guard = lock_env(vars);

        let settings = load(&[]);

        assert!(!settings.run_migrations);
        assert_eq!(
            settings.database_url().expect("url"),
            "postgres://db/books"
        );
        assert_eq!(
            settings.bind_addr().expect("address"),
            SocketAddr::from(([127, 0, 0, 1], 9090))
        );
        assert_eq!(settings.http_timeout(), Duration::from_secs(3));
    }

    #[rstest]
    fn database_url_falls_back_to_the_conventional_variable() {
        let mut vars = cleared();
        vars.push(("DATABASE_URL", Some("postgres://fallback/books".to_owned())));
        let _guard = lock_env(vars);

        assert_eq!(
            load(&[]).database_url().expect("fallback url"),
            "postgres://fallback/books"
        );
    }

    #[rstest]
    fn invalid_hosts_are_reported() {
        let mut vars = cleared();
        vars.push(("BOOKSHELF_HOST", Some("books.local".to_owned())));
        let _guard = lock_env(vars);

        let err = load(&[]).bind_addr().expect_err("hostname rejected");
        assert!(err.to_string().contains("books.local"));
    }
}
