//! orm-bootstrap CLI.
//!
//! Resolves database settings into the ORM property bag and prints it as
//! JSON, or emits the commented default config section / the dependency
//! manifest for a backend. Useful for inspecting what a host application
//! would hand to its session-factory builder.

use clap::Parser;
use orm_bootstrap::dependency::DependencyManifest;
use orm_bootstrap::resolver::ConfigResolver;
use orm_bootstrap::settings::{ConnectionSettings, default_config_yaml};
use orm_bootstrap::BackendKind;
use std::collections::HashMap;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Debug, Parser)]
#[command(
    name = "orm-bootstrap",
    about = "Resolve database backend settings into an ORM property bag",
    version
)]
struct Cli {
    /// Database backend (sqlite, h2, mysql, mariadb, postgresql)
    #[arg(short = 'b', long, env = "ORM_BACKEND")]
    backend: Option<String>,

    /// File path (embedded backends) or host:port/schema (networked)
    #[arg(short = 'p', long, value_name = "PATH_OR_URL", env = "ORM_PATH")]
    path: Option<String>,

    /// Ignored by sqlite and h2
    #[arg(short = 'u', long, env = "ORM_USERNAME")]
    username: Option<String>,

    /// Ignored by sqlite and h2
    #[arg(long, env = "ORM_PASSWORD")]
    password: Option<String>,

    /// Echo, format, and comment generated SQL
    #[arg(long, env = "ORM_SHOW_SQL")]
    show_sql: bool,

    /// Extra property overrides, merged last. Can be repeated.
    #[arg(long = "set", value_name = "KEY=VALUE")]
    overrides: Vec<String>,

    /// Hosting application name, substituted into embedded storage paths
    #[arg(long, default_value = "plugin", env = "ORM_APP_NAME")]
    app_name: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "ORM_LOG_LEVEL")]
    log_level: String,

    /// Enable JSON logging format
    #[arg(long, env = "ORM_JSON_LOGS")]
    json_logs: bool,

    /// Print a commented default settings section and exit
    #[arg(long)]
    print_default_config: bool,

    /// Print the runtime dependency manifest for the backend and exit
    #[arg(long)]
    print_dependencies: bool,
}

/// Initialize the tracing subscriber for logging.
fn init_tracing(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        subscriber.with(fmt::layer().json()).init();
    } else {
        subscriber
            .with(fmt::layer().with_target(true).with_thread_ids(false))
            .init();
    }
}

fn parse_overrides(raw: &[String]) -> Result<HashMap<String, String>, String> {
    raw.iter()
        .map(|entry| {
            entry
                .split_once('=')
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .ok_or_else(|| format!("Invalid override '{entry}', expected KEY=VALUE"))
        })
        .collect()
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    if cli.print_default_config {
        print!("{}", default_config_yaml());
        return Ok(());
    }

    let Some(backend) = cli.backend.as_deref() else {
        eprintln!("Error: a backend must be selected.");
        eprintln!();
        eprintln!("Usage: orm-bootstrap --backend <name> --path <path-or-url> [options]");
        eprintln!();
        eprintln!("Examples:");
        eprintln!("  orm-bootstrap --backend sqlite --path data.db --app-name plugin1");
        eprintln!("  orm-bootstrap --backend mysql --path localhost:3306/db \\");
        eprintln!("      --username root --password admin");
        eprintln!("  orm-bootstrap --backend postgresql --print-dependencies");
        eprintln!("  orm-bootstrap --print-default-config");
        std::process::exit(1);
    };

    if cli.print_dependencies {
        let kind = BackendKind::lookup(backend)?;
        println!("{}", DependencyManifest::for_backend(kind).to_json_pretty());
        return Ok(());
    }

    let settings = ConnectionSettings {
        backend: backend.to_string(),
        target: cli.path.clone().unwrap_or_default(),
        username: cli.username.clone(),
        password: cli.password.clone(),
        show_sql: cli.show_sql,
    };
    let overrides = parse_overrides(&cli.overrides)?;

    let resolver = ConfigResolver::new(cli.app_name.as_str());
    let config = resolver.resolve(&settings, &overrides)?;

    info!(
        backend = %backend,
        properties = config.len(),
        "Resolved configuration"
    );

    // Never print credentials
    println!("{}", serde_json::to_string_pretty(&config.masked())?);
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_tracing(&cli);

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
