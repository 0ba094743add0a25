//! Connection settings and pool sizing.
//!
//! This module provides the user-facing side of configuration: the typed
//! settings object read from a host config section, the derived pool-sizing
//! profiles, and the default-config generator.

use crate::backend::BackendKind;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// Pool sizing defaults
pub const EMBEDDED_MIN_IDLE: u32 = 5;
pub const EMBEDDED_MAX_POOL_SIZE: u32 = 20;
pub const NETWORKED_MIN_IDLE: u32 = 20;
pub const NETWORKED_MAX_POOL_SIZE: u32 = 300;
pub const DEFAULT_CONNECTION_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_IDLE_TIMEOUT_MS: u64 = 120_000;

/// User-supplied connection settings, constructed once from the host's
/// config and never mutated.
///
/// The backend is kept as the raw configured string; the resolver performs
/// the registry lookup so that an unknown name surfaces as a configuration
/// error at resolution time rather than at parse time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionSettings {
    /// Backend name, matched case-insensitively against the registry.
    #[serde(alias = "type", alias = "format")]
    pub backend: String,
    /// File path for embedded backends, host:port/schema for networked ones.
    #[serde(alias = "path", alias = "url", default)]
    pub target: String,
    /// Required for networked backends, ignored for embedded ones.
    #[serde(alias = "user", default)]
    pub username: Option<String>,
    /// Required for networked backends, ignored for embedded ones.
    #[serde(default)]
    pub password: Option<String>,
    /// Echo, format, and comment generated SQL.
    #[serde(default)]
    pub show_sql: bool,
}

impl ConnectionSettings {
    /// Create settings for an embedded backend.
    pub fn embedded(backend: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            backend: backend.into(),
            target: path.into(),
            username: None,
            password: None,
            show_sql: false,
        }
    }

    /// Create settings for a networked backend.
    pub fn networked(
        backend: impl Into<String>,
        url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            backend: backend.into(),
            target: url.into(),
            username: Some(username.into()),
            password: Some(password.into()),
            show_sql: false,
        }
    }

    /// Enable SQL logging.
    pub fn with_show_sql(mut self, show_sql: bool) -> Self {
        self.show_sql = show_sql;
        self
    }

    /// Read settings from a generic key-value section.
    ///
    /// Key aliases, both accepted: `type`/`format` for the backend,
    /// `path`/`url` for the target, `username`/`user` for the username.
    /// Absent keys are left empty; required-field validation is the
    /// resolver's job, not the parser's.
    pub fn from_section(section: &HashMap<String, String>) -> Self {
        let get = |keys: &[&str]| keys.iter().find_map(|k| section.get(*k)).cloned();

        Self {
            backend: get(&["type", "format"]).unwrap_or_default(),
            target: get(&["path", "url"]).unwrap_or_default(),
            username: get(&["username", "user"]),
            password: get(&["password"]),
            show_sql: get(&["show-sql", "show_sql"])
                .is_some_and(|v| v.eq_ignore_ascii_case("true")),
        }
    }
}

/// Derived pool sizing, selected by backend category. Not user-facing;
/// callers adjust the final values via overrides on the resolved bag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolProfile {
    pub min_idle: u32,
    pub max_pool_size: u32,
    pub connection_timeout_ms: u64,
    pub idle_timeout_ms: u64,
}

impl PoolProfile {
    pub const EMBEDDED: PoolProfile = PoolProfile {
        min_idle: EMBEDDED_MIN_IDLE,
        max_pool_size: EMBEDDED_MAX_POOL_SIZE,
        connection_timeout_ms: DEFAULT_CONNECTION_TIMEOUT_MS,
        idle_timeout_ms: DEFAULT_IDLE_TIMEOUT_MS,
    };

    pub const NETWORKED: PoolProfile = PoolProfile {
        min_idle: NETWORKED_MIN_IDLE,
        max_pool_size: NETWORKED_MAX_POOL_SIZE,
        connection_timeout_ms: DEFAULT_CONNECTION_TIMEOUT_MS,
        idle_timeout_ms: DEFAULT_IDLE_TIMEOUT_MS,
    };

    /// Select the preset for a backend's category.
    pub fn for_backend(kind: BackendKind) -> Self {
        if kind.is_embedded() {
            Self::EMBEDDED
        } else {
            Self::NETWORKED
        }
    }

    /// Override the idle timeout.
    pub fn with_idle_timeout(mut self, idle_timeout_ms: u64) -> Self {
        self.idle_timeout_ms = idle_timeout_ms;
        self
    }
}

/// Default settings section: MySQL with placeholder host and credentials.
pub fn default_config_section() -> HashMap<String, String> {
    HashMap::from([
        ("type".to_string(), BackendKind::MySql.name().to_string()),
        ("url".to_string(), "localhost:3306/database".to_string()),
        ("username".to_string(), "root".to_string()),
        ("password".to_string(), "admin".to_string()),
    ])
}

/// Render the default settings section as a commented YAML snippet for the
/// host's config file. Comments cannot be expressed through a serializer, so
/// the snippet is assembled by hand; the output is deterministic.
pub fn default_config_yaml() -> String {
    let names: Vec<&str> = BackendKind::ALL.iter().map(|k| k.name()).collect();
    format!(
        "# Possible types: [{}]\n\
         type: {}\n\
         url: localhost:3306/database\n\
         username: root # Ignored by sqlite and h2\n\
         password: admin # Ignored by sqlite and h2\n",
        names.join(", "),
        BackendKind::MySql.name(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_section_canonical_keys() {
        let section = HashMap::from([
            ("type".to_string(), "postgresql".to_string()),
            ("url".to_string(), "localhost:5432/app".to_string()),
            ("username".to_string(), "app".to_string()),
            ("password".to_string(), "secret".to_string()),
            ("show-sql".to_string(), "true".to_string()),
        ]);
        let settings = ConnectionSettings::from_section(&section);
        assert_eq!(settings.backend, "postgresql");
        assert_eq!(settings.target, "localhost:5432/app");
        assert_eq!(settings.username.as_deref(), Some("app"));
        assert_eq!(settings.password.as_deref(), Some("secret"));
        assert!(settings.show_sql);
    }

    #[test]
    fn test_from_section_alias_keys() {
        let section = HashMap::from([
            ("format".to_string(), "sqlite".to_string()),
            ("path".to_string(), "storage".to_string()),
            ("user".to_string(), "ignored".to_string()),
        ]);
        let settings = ConnectionSettings::from_section(&section);
        assert_eq!(settings.backend, "sqlite");
        assert_eq!(settings.target, "storage");
        assert_eq!(settings.username.as_deref(), Some("ignored"));
        assert!(settings.password.is_none());
        assert!(!settings.show_sql);
    }

    #[test]
    fn test_from_section_prefers_canonical_over_alias() {
        let section = HashMap::from([
            ("type".to_string(), "mysql".to_string()),
            ("format".to_string(), "sqlite".to_string()),
            ("path".to_string(), "a".to_string()),
            ("url".to_string(), "b".to_string()),
        ]);
        let settings = ConnectionSettings::from_section(&section);
        assert_eq!(settings.backend, "mysql");
        assert_eq!(settings.target, "a");
    }

    #[test]
    fn test_from_section_empty() {
        let settings = ConnectionSettings::from_section(&HashMap::new());
        assert!(settings.backend.is_empty());
        assert!(settings.target.is_empty());
        assert!(settings.username.is_none());
        assert!(!settings.show_sql);
    }

    #[test]
    fn test_show_sql_parsing() {
        let mut section = default_config_section();
        section.insert("show-sql".to_string(), "TRUE".to_string());
        assert!(ConnectionSettings::from_section(&section).show_sql);

        section.insert("show-sql".to_string(), "yes".to_string());
        assert!(!ConnectionSettings::from_section(&section).show_sql);
    }

    #[test]
    fn test_pool_profile_presets() {
        let embedded = PoolProfile::for_backend(BackendKind::Sqlite);
        assert_eq!(embedded.min_idle, 5);
        assert_eq!(embedded.max_pool_size, 20);

        let networked = PoolProfile::for_backend(BackendKind::MariaDb);
        assert_eq!(networked.min_idle, 20);
        assert_eq!(networked.max_pool_size, 300);

        assert_eq!(embedded.connection_timeout_ms, 10_000);
        assert_eq!(embedded.idle_timeout_ms, 120_000);
    }

    #[test]
    fn test_pool_profile_idle_timeout_override() {
        let profile = PoolProfile::NETWORKED.with_idle_timeout(200_000);
        assert_eq!(profile.idle_timeout_ms, 200_000);
        assert_eq!(profile.max_pool_size, 300);
    }

    #[test]
    fn test_default_config_yaml_lists_backends() {
        let yaml = default_config_yaml();
        for kind in BackendKind::ALL {
            assert!(yaml.contains(kind.name()), "missing {}", kind.name());
        }
        assert!(yaml.contains("type: mysql"));
        assert!(yaml.contains("localhost:3306/database"));
    }
}
