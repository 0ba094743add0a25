//! Configuration resolution.
//!
//! This module turns [`ConnectionSettings`] into the flat property bag the
//! external ORM/connection-pool stack consumes at construction time. The bag
//! is built once, handed off, and never mutated afterwards.

use crate::backend::{BackendKind, PLUGIN_PLACEHOLDER};
use crate::error::{ConfigError, ConfigResult};
use crate::settings::{ConnectionSettings, PoolProfile};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

// Property keys consumed by the external ORM.
pub const KEY_DRIVER_CLASS: &str = "hibernate.connection.driver_class";
pub const KEY_PROVIDER_CLASS: &str = "hibernate.connection.provider_class";
pub const KEY_URL: &str = "hibernate.connection.url";
pub const KEY_USERNAME: &str = "hibernate.connection.username";
pub const KEY_PASSWORD: &str = "hibernate.connection.password";
pub const KEY_DIALECT: &str = "hibernate.dialect";
pub const KEY_SESSION_CONTEXT: &str = "hibernate.current_session_context_class";
pub const KEY_SCHEMA_UPDATE: &str = "hibernate.hbm2ddl.auto";
pub const KEY_SHOW_SQL: &str = "hibernate.show_sql";
pub const KEY_FORMAT_SQL: &str = "hibernate.format_sql";
pub const KEY_SQL_COMMENTS: &str = "hibernate.use_sql_comments";
pub const KEY_POOL_CONNECTION_TIMEOUT: &str = "hibernate.hikari.connectionTimeout";
pub const KEY_POOL_MIN_IDLE: &str = "hibernate.hikari.minimumIdle";
pub const KEY_POOL_MAX_SIZE: &str = "hibernate.hikari.maximumPoolSize";
pub const KEY_POOL_IDLE_TIMEOUT: &str = "hibernate.hikari.idleTimeout";

const PROVIDER_CLASS: &str = "org.hibernate.hikaricp.internal.HikariCPConnectionProvider";
const SESSION_CONTEXT: &str = "thread";
// Auto-migrates the schema on every startup.
const SCHEMA_UPDATE: &str = "update";

/// The resolved property bag.
///
/// Backed by an ordered map so iteration (and serialized output) is
/// deterministic. Override keys are not validated against any schema;
/// whatever the caller supplies is passed through to the ORM.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ResolvedConfiguration {
    properties: BTreeMap<String, String>,
}

impl ResolvedConfiguration {
    /// Look up a property value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// Iterate properties in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.properties
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Consume the bag, yielding the underlying map.
    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.properties
    }

    /// A copy safe for logging or display: the password value, if present,
    /// is replaced with `****`.
    pub fn masked(&self) -> ResolvedConfiguration {
        let mut properties = self.properties.clone();
        if let Some(password) = properties.get_mut(KEY_PASSWORD) {
            *password = "****".to_string();
        }
        ResolvedConfiguration { properties }
    }

    fn set(&mut self, key: &str, value: impl Into<String>) {
        self.properties.insert(key.to_string(), value.into());
    }
}

/// Resolves user settings into the ORM property bag.
///
/// Carries the hosting application's identifier, which namespaces embedded
/// backends' storage directories via the `%plugin%` placeholder.
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    app_name: String,
    pool_profile_embedded: PoolProfile,
    pool_profile_networked: PoolProfile,
}

impl ConfigResolver {
    /// Create a resolver for the named hosting application.
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            pool_profile_embedded: PoolProfile::EMBEDDED,
            pool_profile_networked: PoolProfile::NETWORKED,
        }
    }

    /// Replace both pool presets' idle timeout.
    pub fn with_idle_timeout(mut self, idle_timeout_ms: u64) -> Self {
        self.pool_profile_embedded = self.pool_profile_embedded.with_idle_timeout(idle_timeout_ms);
        self.pool_profile_networked =
            self.pool_profile_networked.with_idle_timeout(idle_timeout_ms);
        self
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    /// Resolve settings into the final property bag.
    ///
    /// Overrides are merged last and win on key collision; they are the only
    /// extension mechanism. The assembled URL is plain string concatenation
    /// of the substituted prefix and the configured target, with no
    /// syntactic validation.
    pub fn resolve(
        &self,
        settings: &ConnectionSettings,
        overrides: &HashMap<String, String>,
    ) -> ConfigResult<ResolvedConfiguration> {
        let kind = BackendKind::lookup(&settings.backend)?;
        self.validate_required(kind, settings)?;

        let prefix = kind.url_prefix().replace(PLUGIN_PLACEHOLDER, &self.app_name);
        let url = format!("{prefix}{}", settings.target);
        let profile = if kind.is_embedded() {
            self.pool_profile_embedded
        } else {
            self.pool_profile_networked
        };

        debug!(
            backend = %kind,
            url = %url,
            min_idle = profile.min_idle,
            max_pool_size = profile.max_pool_size,
            "Resolved backend configuration"
        );

        let mut config = ResolvedConfiguration::default();

        config.set(KEY_DRIVER_CLASS, kind.driver_class());
        config.set(KEY_PROVIDER_CLASS, PROVIDER_CLASS);

        config.set(KEY_URL, url);
        if !kind.is_embedded() {
            // validate_required guarantees both are present here
            config.set(KEY_USERNAME, settings.username.clone().unwrap_or_default());
            config.set(KEY_PASSWORD, settings.password.clone().unwrap_or_default());
        }

        config.set(KEY_DIALECT, kind.dialect());
        config.set(KEY_SESSION_CONTEXT, SESSION_CONTEXT);
        config.set(KEY_SCHEMA_UPDATE, SCHEMA_UPDATE);

        let show_sql = settings.show_sql.to_string();
        config.set(KEY_SHOW_SQL, show_sql.clone());
        config.set(KEY_FORMAT_SQL, show_sql.clone());
        config.set(KEY_SQL_COMMENTS, show_sql);

        config.set(
            KEY_POOL_CONNECTION_TIMEOUT,
            profile.connection_timeout_ms.to_string(),
        );
        config.set(KEY_POOL_MIN_IDLE, profile.min_idle.to_string());
        config.set(KEY_POOL_MAX_SIZE, profile.max_pool_size.to_string());
        config.set(KEY_POOL_IDLE_TIMEOUT, profile.idle_timeout_ms.to_string());

        for (key, value) in overrides {
            config.set(key, value.clone());
        }

        Ok(config)
    }

    fn validate_required(&self, kind: BackendKind, settings: &ConnectionSettings) -> ConfigResult<()> {
        if settings.target.is_empty() {
            return Err(ConfigError::missing_setting("path"));
        }
        if !kind.is_embedded() {
            if settings.username.as_deref().is_none_or(str::is_empty) {
                return Err(ConfigError::missing_setting("username"));
            }
            if settings.password.as_deref().is_none_or(str::is_empty) {
                return Err(ConfigError::missing_setting("password"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_overrides() -> HashMap<String, String> {
        HashMap::new()
    }

    #[test]
    fn test_sqlite_url_substitutes_plugin_name() {
        let resolver = ConfigResolver::new("plugin1");
        let settings = ConnectionSettings::embedded("sqlite", "mydb");
        let config = resolver.resolve(&settings, &no_overrides()).unwrap();
        assert_eq!(
            config.get(KEY_URL),
            Some("jdbc:sqlite:./plugins/plugin1/mydb")
        );
    }

    #[test]
    fn test_networked_url_is_prefix_plus_target() {
        let resolver = ConfigResolver::new("plugin1");
        let settings = ConnectionSettings::networked("mysql", "localhost:3306/db", "root", "admin");
        let config = resolver.resolve(&settings, &no_overrides()).unwrap();
        assert_eq!(config.get(KEY_URL), Some("jdbc:mysql:localhost:3306/db"));
    }

    #[test]
    fn test_mysql_bag_contents() {
        let resolver = ConfigResolver::new("plugin1");
        let settings = ConnectionSettings::networked("mysql", "localhost:3306/db", "root", "admin");
        let config = resolver.resolve(&settings, &no_overrides()).unwrap();

        assert_eq!(config.get(KEY_DRIVER_CLASS), Some("com.mysql.cj.jdbc.Driver"));
        assert_eq!(
            config.get(KEY_DIALECT),
            Some("org.hibernate.dialect.MySQLDialect")
        );
        assert_eq!(config.get(KEY_POOL_MIN_IDLE), Some("20"));
        assert_eq!(config.get(KEY_POOL_MAX_SIZE), Some("300"));
        assert_eq!(config.get(KEY_USERNAME), Some("root"));
        assert_eq!(config.get(KEY_PASSWORD), Some("admin"));
        assert_eq!(config.get(KEY_SESSION_CONTEXT), Some("thread"));
        assert_eq!(config.get(KEY_SCHEMA_UPDATE), Some("update"));
    }

    #[test]
    fn test_embedded_bag_omits_credentials() {
        let resolver = ConfigResolver::new("plugin1");
        let settings = ConnectionSettings::embedded("h2", "storage");
        let config = resolver.resolve(&settings, &no_overrides()).unwrap();

        assert!(config.get(KEY_USERNAME).is_none());
        assert!(config.get(KEY_PASSWORD).is_none());
        assert_eq!(config.get(KEY_POOL_MIN_IDLE), Some("5"));
        assert_eq!(config.get(KEY_POOL_MAX_SIZE), Some("20"));
    }

    #[test]
    fn test_embedded_missing_path_fails() {
        let resolver = ConfigResolver::new("plugin1");
        let settings = ConnectionSettings::embedded("sqlite", "");
        let err = resolver.resolve(&settings, &no_overrides()).unwrap_err();
        assert_eq!(err.missing_field(), Some("path"));
    }

    #[test]
    fn test_networked_missing_password_fails() {
        let resolver = ConfigResolver::new("plugin1");
        let mut settings =
            ConnectionSettings::networked("mysql", "localhost:3306/db", "root", "");
        let err = resolver.resolve(&settings, &no_overrides()).unwrap_err();
        assert_eq!(err.missing_field(), Some("password"));

        settings.password = None;
        let err = resolver.resolve(&settings, &no_overrides()).unwrap_err();
        assert_eq!(err.missing_field(), Some("password"));
    }

    #[test]
    fn test_networked_missing_username_fails() {
        let resolver = ConfigResolver::new("plugin1");
        let settings = ConnectionSettings {
            username: None,
            ..ConnectionSettings::networked("postgresql", "localhost:5432/db", "", "pw")
        };
        let err = resolver.resolve(&settings, &no_overrides()).unwrap_err();
        assert_eq!(err.missing_field(), Some("username"));
    }

    #[test]
    fn test_unsupported_backend_propagates() {
        let resolver = ConfigResolver::new("plugin1");
        let settings = ConnectionSettings::embedded("oracle", "mydb");
        let err = resolver.resolve(&settings, &no_overrides()).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedBackend { .. }));
    }

    #[test]
    fn test_show_sql_sets_all_three_flags() {
        let resolver = ConfigResolver::new("plugin1");

        let settings = ConnectionSettings::embedded("sqlite", "mydb").with_show_sql(true);
        let config = resolver.resolve(&settings, &no_overrides()).unwrap();
        for key in [KEY_SHOW_SQL, KEY_FORMAT_SQL, KEY_SQL_COMMENTS] {
            assert_eq!(config.get(key), Some("true"));
        }

        let settings = settings.with_show_sql(false);
        let config = resolver.resolve(&settings, &no_overrides()).unwrap();
        for key in [KEY_SHOW_SQL, KEY_FORMAT_SQL, KEY_SQL_COMMENTS] {
            assert_eq!(config.get(key), Some("false"));
        }
    }

    #[test]
    fn test_overrides_win_on_collision() {
        let resolver = ConfigResolver::new("plugin1");
        let overrides = HashMap::from([(KEY_POOL_MAX_SIZE.to_string(), "50".to_string())]);

        let settings = ConnectionSettings::networked("mysql", "localhost:3306/db", "root", "admin");
        let config = resolver.resolve(&settings, &overrides).unwrap();
        assert_eq!(config.get(KEY_POOL_MAX_SIZE), Some("50"));

        let settings = ConnectionSettings::embedded("sqlite", "mydb");
        let config = resolver.resolve(&settings, &overrides).unwrap();
        assert_eq!(config.get(KEY_POOL_MAX_SIZE), Some("50"));
    }

    #[test]
    fn test_override_keys_are_not_validated() {
        let resolver = ConfigResolver::new("plugin1");
        let overrides = HashMap::from([(
            "hibernate.jdbc.batch_size".to_string(),
            "32".to_string(),
        )]);
        let settings = ConnectionSettings::embedded("sqlite", "mydb");
        let config = resolver.resolve(&settings, &overrides).unwrap();
        assert_eq!(config.get("hibernate.jdbc.batch_size"), Some("32"));
    }

    #[test]
    fn test_no_url_validation() {
        // Garbage targets flow through untouched.
        let resolver = ConfigResolver::new("plugin1");
        let settings =
            ConnectionSettings::networked("postgresql", ":::not a url:::", "u", "p");
        let config = resolver.resolve(&settings, &no_overrides()).unwrap();
        assert_eq!(config.get(KEY_URL), Some("jdbc:postgresql::::not a url:::"));
    }

    #[test]
    fn test_idle_timeout_override() {
        let resolver = ConfigResolver::new("plugin1").with_idle_timeout(200_000);
        let settings = ConnectionSettings::embedded("sqlite", "mydb");
        let config = resolver.resolve(&settings, &no_overrides()).unwrap();
        assert_eq!(config.get(KEY_POOL_IDLE_TIMEOUT), Some("200000"));
    }

    #[test]
    fn test_masked_hides_password() {
        let resolver = ConfigResolver::new("plugin1");
        let settings = ConnectionSettings::networked("mysql", "localhost:3306/db", "root", "hunter2");
        let config = resolver.resolve(&settings, &no_overrides()).unwrap();

        let masked = config.masked();
        assert_eq!(masked.get(KEY_PASSWORD), Some("****"));
        // Everything else untouched
        assert_eq!(masked.get(KEY_USERNAME), Some("root"));
        assert_eq!(config.get(KEY_PASSWORD), Some("hunter2"));
    }

    #[test]
    fn test_iteration_is_key_ordered() {
        let resolver = ConfigResolver::new("plugin1");
        let settings = ConnectionSettings::embedded("sqlite", "mydb");
        let config = resolver.resolve(&settings, &no_overrides()).unwrap();

        let keys: Vec<&str> = config.iter().map(|(k, _)| k).collect();
        let mut sorted = keys.clone();
        sorted.sort_unstable();
        assert_eq!(keys, sorted);
    }
}
