//! ORM session-factory bootstrap.
//!
//! This library selects among five database backends (embedded file-based
//! and networked), resolves user settings into the flat property bag an
//! external ORM/connection-pool stack consumes, declares the runtime
//! artifacts each backend needs, and orchestrates one-shot session-factory
//! construction at application startup.

pub mod backend;
pub mod dependency;
pub mod error;
pub mod factory;
pub mod resolver;
pub mod settings;

pub use backend::BackendKind;
pub use dependency::{Artifact, DependencyManifest, DependencyProvider, NoopProvider};
pub use error::{ConfigError, ConfigResult};
pub use factory::{SessionBootstrap, SessionFactoryBuilder};
pub use resolver::{ConfigResolver, ResolvedConfiguration};
pub use settings::{ConnectionSettings, PoolProfile};
