//! Runtime artifact manifests and dependency provisioning.
//!
//! The ORM, its connection pool, and the backend driver are fetched at
//! runtime by an external artifact service. This module declares the
//! coordinates each backend needs and the seam through which the host
//! injects its fetcher. Fetch failures are terminal; nothing here retries.

use crate::backend::BackendKind;
use crate::error::BoxedError;
use serde::{Deserialize, Serialize};

/// A Maven coordinate triple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    pub group: String,
    pub artifact: String,
    pub version: String,
}

impl Artifact {
    pub fn new(
        group: impl Into<String>,
        artifact: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            artifact: artifact.into(),
            version: version.into(),
        }
    }
}

impl std::fmt::Display for Artifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.artifact, self.version)
    }
}

/// The serialized form handed to the external artifact-fetching service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyManifest {
    pub dependencies: Vec<Artifact>,
}

impl DependencyManifest {
    /// The full manifest for a backend: ORM core stack plus driver.
    pub fn for_backend(kind: BackendKind) -> Self {
        Self {
            dependencies: runtime_artifacts(kind),
        }
    }

    pub fn to_json(&self) -> String {
        // Serialization of a string-only struct cannot fail
        serde_json::to_string(self).expect("manifest serialization")
    }

    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).expect("manifest serialization")
    }
}

/// ORM core, pooling library, and the backend-specific driver.
pub fn runtime_artifacts(kind: BackendKind) -> Vec<Artifact> {
    let mut artifacts = vec![
        Artifact::new("org.hibernate.orm", "hibernate-core", "6.1.6.Final"),
        Artifact::new(
            "org.hibernate.common",
            "hibernate-commons-annotations",
            "6.0.2.Final",
        ),
        Artifact::new("org.hibernate.orm", "hibernate-hikaricp", "6.1.6.Final"),
        Artifact::new("com.zaxxer", "HikariCP", "5.0.1"),
        Artifact::new("jakarta.persistence", "jakarta.persistence-api", "3.1.0"),
        Artifact::new("jakarta.transaction", "jakarta.transaction-api", "2.0.0"),
        Artifact::new("jakarta.xml.bind", "jakarta.xml.bind-api", "3.0.1"),
        Artifact::new("jakarta.activation", "jakarta.activation-api", "2.1.0"),
        Artifact::new("org.jboss.logging", "jboss-logging", "3.4.3.Final"),
        Artifact::new("com.fasterxml", "classmate", "1.5.1"),
        Artifact::new("net.bytebuddy", "byte-buddy", "1.12.18"),
        Artifact::new("org.glassfish.jaxb", "jaxb-runtime", "3.0.2"),
        Artifact::new("org.glassfish.jaxb", "jaxb-core", "3.0.2"),
        Artifact::new("org.antlr", "antlr4-runtime", "4.10.1"),
        Artifact::new("com.sun.istack", "istack-commons-runtime", "4.1.1"),
    ];

    match kind {
        BackendKind::Sqlite => {
            // The SQLite dialect ships separately from hibernate-core
            artifacts.push(Artifact::new(
                "org.hibernate.orm",
                "hibernate-community-dialects",
                "6.1.6.Final",
            ));
            artifacts.push(Artifact::new("org.xerial", "sqlite-jdbc", "3.39.3.0"));
        }
        BackendKind::H2 => {
            artifacts.push(Artifact::new("com.h2database", "h2", "2.1.214"));
        }
        BackendKind::MySql => {
            artifacts.push(Artifact::new("mysql", "mysql-connector-java", "8.0.31"));
        }
        BackendKind::MariaDb => {
            artifacts.push(Artifact::new(
                "org.mariadb.jdbc",
                "mariadb-java-client",
                "3.0.8",
            ));
        }
        BackendKind::PostgreSql => {
            artifacts.push(Artifact::new("org.postgresql", "postgresql", "42.5.0"));
        }
    }

    artifacts
}

/// Makes a set of artifacts available to the hosting application before
/// configuration proceeds.
///
/// The host injects its fetcher here; the previous reflective construction
/// of a loader class is gone. A failed fetch surfaces as
/// [`ConfigError::DependencyLoad`](crate::error::ConfigError) and aborts
/// startup.
pub trait DependencyProvider {
    fn ensure_available(&self, artifacts: &[Artifact]) -> Result<(), BoxedError>;
}

/// Provider for hosts whose classpath is already complete. Always succeeds.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProvider;

impl DependencyProvider for NoopProvider {
    fn ensure_available(&self, _artifacts: &[Artifact]) -> Result<(), BoxedError> {
        Ok(())
    }
}
