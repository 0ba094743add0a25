//! Supported database backends.
//!
//! This module is the single source of truth for backend-specific strings:
//! driver class, connection-URL prefix template, and ORM dialect. No other
//! module may duplicate them.

use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};

/// Placeholder in embedded URL prefix templates, substituted with the hosting
/// application's name to namespace per-application storage directories.
pub const PLUGIN_PLACEHOLDER: &str = "%plugin%";

/// Supported database backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Embedded, file-based.
    Sqlite,
    /// Embedded, file-based.
    H2,
    MySql,
    MariaDb,
    PostgreSql,
}

impl BackendKind {
    /// All supported backends, in declaration order.
    pub const ALL: [BackendKind; 5] = [
        Self::Sqlite,
        Self::H2,
        Self::MySql,
        Self::MariaDb,
        Self::PostgreSql,
    ];

    /// Look up a backend by name, case-insensitively.
    ///
    /// Anything other than the five canonical names (including the empty
    /// string) is a configuration error.
    pub fn lookup(name: &str) -> ConfigResult<Self> {
        match name.to_ascii_lowercase().as_str() {
            "sqlite" => Ok(Self::Sqlite),
            "h2" => Ok(Self::H2),
            "mysql" => Ok(Self::MySql),
            "mariadb" => Ok(Self::MariaDb),
            "postgresql" => Ok(Self::PostgreSql),
            _ => Err(ConfigError::unsupported_backend(name)),
        }
    }

    /// Canonical lowercase name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Sqlite => "sqlite",
            Self::H2 => "h2",
            Self::MySql => "mysql",
            Self::MariaDb => "mariadb",
            Self::PostgreSql => "postgresql",
        }
    }

    /// JDBC driver class loaded by the ORM.
    pub fn driver_class(&self) -> &'static str {
        match self {
            Self::Sqlite => "org.sqlite.JDBC",
            Self::H2 => "org.h2.Driver",
            Self::MySql => "com.mysql.cj.jdbc.Driver",
            Self::MariaDb => "org.mariadb.jdbc.Driver",
            Self::PostgreSql => "org.postgresql.Driver",
        }
    }

    /// Connection-URL prefix template. Embedded templates contain
    /// [`PLUGIN_PLACEHOLDER`]; networked ones do not.
    pub fn url_prefix(&self) -> &'static str {
        match self {
            Self::Sqlite => "jdbc:sqlite:./plugins/%plugin%/",
            Self::H2 => "jdbc:h2:./plugins/%plugin%/",
            Self::MySql => "jdbc:mysql:",
            Self::MariaDb => "jdbc:mariadb:",
            Self::PostgreSql => "jdbc:postgresql:",
        }
    }

    /// ORM dialect identifier.
    pub fn dialect(&self) -> &'static str {
        match self {
            Self::Sqlite => "org.hibernate.community.dialect.SQLiteDialect",
            Self::H2 => "org.hibernate.dialect.H2Dialect",
            Self::MySql => "org.hibernate.dialect.MySQLDialect",
            Self::MariaDb => "org.hibernate.dialect.MariaDBDialect",
            Self::PostgreSql => "org.hibernate.dialect.PostgreSQLDialect",
        }
    }

    /// True for file-based backends that need no credentials and store data
    /// under the application's own directory.
    pub fn is_embedded(&self) -> bool {
        matches!(self, Self::Sqlite | Self::H2)
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
