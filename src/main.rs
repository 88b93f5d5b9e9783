//! quarry-acceptance - acceptance-run configuration and host orchestration

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::collections::HashMap;
use tracing::info;

use quarry_acceptance::cli::{Cli, Commands};
use quarry_acceptance::{
    collect_logs, defaults_var, initialize_tls, BuildToolArtifactInstaller, BuildToolQuery,
    ConfigCell, GitDescribeOracle, Host, InstallDispatcher, InstallStrategy, RawOptions,
    RemotePackageInstaller, RunConfig, SshTransport,
};

/// Vendored base-runtime submodule queried for the fallback Quarry version
const RUNTIME_SUBMODULE: &str = "runtime/quarry";

static CONFIG: ConfigCell = ConfigCell::new();

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();

    let raw = match &cli.options {
        Some(path) => RawOptions::load_from_file(path)
            .with_context(|| format!("failed to load options file {}", path.display()))?,
        None => RawOptions::default(),
    };

    let oracle = GitDescribeOracle::new(RUNTIME_SUBMODULE);
    let config = RunConfig::build(&raw, &oracle)
        .context("failed to resolve the run configuration")?;
    let config = CONFIG
        .install(config)
        .context("run configuration double-build")?;

    let transport = SshTransport;

    match cli.command {
        Commands::Config => {
            println!("{config:#?}");
        }
        Commands::Install {
            host,
            platform,
            strategy,
        } => {
            let host = Host::new(host, platform);
            let mut strategy = match strategy {
                Some(kind) => InstallStrategy::parse(&kind)?,
                None => config.install_strategy(HashMap::new()),
            };
            // A bare --strategy git still honors the configured version
            if let InstallStrategy::Artifact { version, .. } = &mut strategy {
                if version.is_none() {
                    version.clone_from(&config.server_version);
                }
            }

            let packages = RemotePackageInstaller { runner: &transport };
            let artifacts = BuildToolArtifactInstaller;
            let versions = BuildToolQuery;
            let dispatcher = InstallDispatcher {
                packages: &packages,
                artifacts: &artifacts,
                versions: &versions,
            };
            dispatcher.install_server(&host, &strategy)?;
            info!(host = %host.name, "server installed");
        }
        Commands::CollectLogs {
            host,
            platform,
            dest,
            log_root,
        } => {
            let host = Host::new(host, platform);
            let collection = collect_logs(&transport, &transport, &host, &log_root, &dest)?;
            let primary = collection.finish(&host)?;
            info!(path = %primary.display(), "server log collected");
        }
        Commands::DefaultsVar {
            host,
            platform,
            package,
            var,
        } => {
            let host = Host::new(host, platform);
            match defaults_var(&transport, &host, &package, &var)? {
                Some(value) => println!("{value}"),
                None => bail!("platform '{}' has no defaults directory", host.platform),
            }
        }
        Commands::InitTls {
            server,
            platform,
            agent,
        } => {
            let server = Host::new(server, platform);
            let agents = agent
                .iter()
                .map(|spec| parse_host_spec(spec))
                .collect::<Result<Vec<_>>>()?;
            initialize_tls(&transport, &server, &agents)?;
            info!("TLS trust material bootstrapped");
        }
    }

    Ok(())
}

/// Parse an agent spec of the form "name=platform"
fn parse_host_spec(spec: &str) -> Result<Host> {
    match spec.split_once('=') {
        Some((name, platform)) if !name.is_empty() && !platform.is_empty() => {
            Ok(Host::new(name, platform))
        }
        _ => bail!("invalid host spec '{spec}', expected name=platform"),
    }
}
