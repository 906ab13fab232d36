//! Layered connection settings.
//!
//! Values are resolved in this order, later layers winning: built-in
//! defaults, the optional `--config` file, `CLICKHOUSE_*` environment
//! variables, command-line flags.

use anyhow::{Context, Result};
use clap::Args;
use config::{Config, Environment, File};
use querybench_adapters::ClickHouseConfig;
use std::path::Path;

/// Prefix of the environment variables read for connection settings.
pub const ENV_PREFIX: &str = "CLICKHOUSE";

/// Connection flags shared by every command that talks to ClickHouse.
#[derive(Args, Debug, Clone, Default)]
pub struct ConnectionArgs {
    /// ClickHouse host (overrides CLICKHOUSE_HOST).
    #[arg(long)]
    pub host: Option<String>,

    /// ClickHouse HTTP(S) port (overrides CLICKHOUSE_PORT).
    #[arg(long)]
    pub port: Option<u16>,

    /// User name (overrides CLICKHOUSE_USER).
    #[arg(long, visible_alias = "username")]
    pub user: Option<String>,

    /// Password (overrides CLICKHOUSE_PASSWORD).
    #[arg(long)]
    pub password: Option<String>,

    /// Database (overrides CLICKHOUSE_DATABASE).
    #[arg(long)]
    pub database: Option<String>,

    /// Use HTTPS: true or false (overrides CLICKHOUSE_SECURE).
    #[arg(long)]
    pub secure: Option<bool>,

    /// Client-side request timeout in seconds.
    #[arg(long = "timeout", value_name = "SECS")]
    pub query_timeout_secs: Option<u64>,

    /// Server-side max_execution_time for benchmark queries, in seconds.
    #[arg(long, value_name = "SECS")]
    pub max_execution_time: Option<u64>,

    /// Keep the mark and uncompressed caches between runs.
    #[arg(long)]
    pub no_drop_caches: bool,
}

/// Resolve the connection settings from every layer.
pub fn load(config_file: Option<&Path>, args: &ConnectionArgs) -> Result<ClickHouseConfig> {
    resolve(
        config_file,
        Environment::with_prefix(ENV_PREFIX).try_parsing(true),
        args,
    )
}

fn resolve(
    config_file: Option<&Path>,
    environment: Environment,
    args: &ConnectionArgs,
) -> Result<ClickHouseConfig> {
    let mut builder = Config::builder();
    if let Some(path) = config_file {
        builder = builder.add_source(File::from(path).required(true));
    }

    let builder = builder
        .add_source(environment)
        .set_override_option("host", args.host.clone())?
        .set_override_option("port", args.port.map(u64::from))?
        .set_override_option("user", args.user.clone())?
        .set_override_option("password", args.password.clone())?
        .set_override_option("database", args.database.clone())?
        .set_override_option("secure", args.secure)?
        .set_override_option("query_timeout_secs", args.query_timeout_secs)?
        .set_override_option("max_execution_time", args.max_execution_time)?
        .set_override_option("drop_caches", args.no_drop_caches.then_some(false))?;

    let settings: ClickHouseConfig = builder
        .build()
        .context("failed to read connection settings")?
        .try_deserialize()
        .context("invalid connection settings")?;
    settings.validate()?;
    Ok(settings)
}
