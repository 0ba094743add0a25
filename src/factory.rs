//! Session-factory construction.
//!
//! Startup is synchronous and run-to-completion: look the backend up,
//! provision its runtime artifacts, resolve the property bag, hand it to
//! the builder. Each phase failure is terminal. The built factory belongs
//! to the caller for the application's lifetime; closing it is the
//! caller's explicit, once-only action and is not guarded here.

use crate::backend::BackendKind;
use crate::dependency::{DependencyProvider, runtime_artifacts};
use crate::error::{BoxedError, ConfigError, ConfigResult};
use crate::resolver::{ConfigResolver, KEY_URL, ResolvedConfiguration};
use crate::settings::ConnectionSettings;
use std::collections::HashMap;
use tracing::info;

/// Builds the long-lived session factory from a resolved property bag and
/// the caller's mapped entity types. Implemented by the host over whatever
/// ORM binding it embeds; failures are opaque to this crate.
pub trait SessionFactoryBuilder {
    type Factory;

    fn build(
        &self,
        config: &ResolvedConfiguration,
        entities: &[String],
    ) -> Result<Self::Factory, BoxedError>;
}

/// One-shot startup orchestration: dependencies, resolution, construction.
pub struct SessionBootstrap<P, B> {
    resolver: ConfigResolver,
    provider: P,
    builder: B,
}

impl<P, B> SessionBootstrap<P, B>
where
    P: DependencyProvider,
    B: SessionFactoryBuilder,
{
    pub fn new(app_name: impl Into<String>, provider: P, builder: B) -> Self {
        Self {
            resolver: ConfigResolver::new(app_name),
            provider,
            builder,
        }
    }

    /// Use a preconfigured resolver (custom idle timeout).
    pub fn with_resolver(resolver: ConfigResolver, provider: P, builder: B) -> Self {
        Self {
            resolver,
            provider,
            builder,
        }
    }

    pub fn resolver(&self) -> &ConfigResolver {
        &self.resolver
    }

    /// Run the full startup sequence and return the built factory.
    ///
    /// The backend lookup happens before any dependency fetch, so an
    /// unknown backend name fails without touching the artifact service.
    pub fn start(
        &self,
        settings: &ConnectionSettings,
        overrides: &HashMap<String, String>,
        entities: &[String],
    ) -> ConfigResult<B::Factory> {
        let kind = BackendKind::lookup(&settings.backend)?;

        let artifacts = runtime_artifacts(kind);
        info!(
            backend = %kind,
            count = artifacts.len(),
            "Provisioning runtime dependencies"
        );
        self.provider
            .ensure_available(&artifacts)
            .map_err(ConfigError::dependency_load)?;

        let config = self.resolver.resolve(settings, overrides)?;

        info!(
            backend = %kind,
            url = config.get(KEY_URL).unwrap_or_default(),
            entities = entities.len(),
            "Building session factory"
        );
        self.builder
            .build(&config, entities)
            .map_err(ConfigError::factory_build)
    }
}
