//! Server settings loaded via OrthoConfig from `RECIPES_*` variables,
//! configuration files and command-line flags.

use std::net::SocketAddr;
use std::path::PathBuf;

use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_BIND_ADDR: SocketAddr =
    SocketAddr::V4(std::net::SocketAddrV4::new(std::net::Ipv4Addr::UNSPECIFIED, 8080));
const DEFAULT_MEDIA_ROOT: &str = "media";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;

/// Configuration values for the `recipes` server.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "RECIPES")]
pub struct AppSettings {
    /// PostgreSQL connection string. Without one the server keeps its data
    /// in memory.
    pub database_url: Option<String>,
    /// Socket address to listen on.
    pub bind_addr: Option<SocketAddr>,
    /// Directory holding uploaded images.
    pub media_root: Option<PathBuf>,
    /// Upper bound on pooled database connections.
    pub db_max_connections: Option<u32>,
    /// Leave pending migrations unapplied at startup.
    #[ortho_config(default = false)]
    pub skip_migrations: bool,
}

impl AppSettings {
    /// Configured database URL, ignoring blank values.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// Listen address, `0.0.0.0:8080` unless configured.
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr.unwrap_or(DEFAULT_BIND_ADDR)
    }

    /// Root directory for uploaded images, `media` unless configured.
    pub fn media_root(&self) -> PathBuf {
        self.media_root
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MEDIA_ROOT))
    }

    /// Pool size; zero or unset falls back to 10.
    pub fn db_max_connections(&self) -> u32 {
        self.db_max_connections
            .filter(|size| *size > 0)
            .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS)
    }

    /// Whether embedded migrations run at startup. True unless
    /// `skip_migrations` is set.
    pub const fn run_migrations(&self) -> bool {
        !self.skip_migrations
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for settings parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 5] = [
        "RECIPES_DATABASE_URL",
        "RECIPES_BIND_ADDR",
        "RECIPES_MEDIA_ROOT",
        "RECIPES_DB_MAX_CONNECTIONS",
        "RECIPES_SKIP_MIGRATIONS",
    ];

    fn load_from_empty_args() -> AppSettings {
        AppSettings::load_from_iter([OsString::from("recipes")]).expect("config should load")
    }

    #[rstest]
    fn defaults_apply_when_unset() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load_from_empty_args();
        assert!(settings.database_url().is_none());
        assert_eq!(settings.bind_addr(), DEFAULT_BIND_ADDR);
        assert_eq!(settings.media_root(), PathBuf::from("media"));
        assert_eq!(settings.db_max_connections(), 10);
        assert!(settings.run_migrations());
    }

    #[rstest]
    fn migrations_run_when_only_the_database_is_configured() {
        let mut vars = VARS.map(|name| (name, None::<String>));
        vars[0].1 = Some("postgres://cook@db/recipes".to_owned());
        let _guard = lock_env(vars);

        let settings = load_from_empty_args();
        assert_eq!(settings.database_url(), Some("postgres://cook@db/recipes"));
        assert!(settings.run_migrations());
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            (
                "RECIPES_DATABASE_URL",
                Some("postgres://cook@db/recipes".to_owned()),
            ),
            ("RECIPES_BIND_ADDR", Some("127.0.0.1:9000".to_owned())),
            ("RECIPES_MEDIA_ROOT", Some("/srv/media".to_owned())),
            ("RECIPES_DB_MAX_CONNECTIONS", Some("3".to_owned())),
            ("RECIPES_SKIP_MIGRATIONS", Some("true".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(settings.database_url(), Some("postgres://cook@db/recipes"));
        assert_eq!(
            settings.bind_addr(),
            "127.0.0.1:9000".parse::<SocketAddr>().expect("address")
        );
        assert_eq!(settings.media_root(), PathBuf::from("/srv/media"));
        assert_eq!(settings.db_max_connections(), 3);
        assert!(!settings.run_migrations());
    }

    #[rstest]
    #[case("true", false)]
    #[case("false", true)]
    fn skip_migrations_is_read_from_the_environment(#[case] raw: &str, #[case] runs: bool) {
        let mut vars = VARS.map(|name| (name, None::<String>));
        vars[4].1 = Some(raw.to_owned());
        let _guard = lock_env(vars);

        let settings = load_from_empty_args();
        assert_eq!(settings.run_migrations(), runs);
    }

    #[rstest]
    #[case(Some("   "))]
    #[case(None)]
    fn blank_database_url_means_memory(#[case] raw: Option<&str>) {
        let settings = AppSettings {
            database_url: raw.map(str::to_owned),
            bind_addr: None,
            media_root: None,
            db_max_connections: Some(0),
            skip_migrations: false,
        };
        assert!(settings.database_url().is_none());
        assert_eq!(settings.db_max_connections(), 10);
        assert!(settings.run_migrations());
    }
}
