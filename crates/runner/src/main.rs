use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::info;
use stampede_runner::{HarnessConfig, Supervisor};
use std::path::PathBuf;

/// Concurrent trading load harness
#[derive(Parser, Debug)]
#[command(name = "stampede", version, about)]
struct Cli {
    /// JSON config file; defaults apply when absent
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Service host (overrides config and STAMPEDE_HOST)
    #[arg(long)]
    host: Option<String>,

    /// Service port (overrides config and STAMPEDE_PORT)
    #[arg(long)]
    port: Option<u16>,

    /// Stop after this many seconds instead of waiting for Ctrl-C
    #[arg(long)]
    duration_secs: Option<u64>,

    /// Print the effective configuration and exit
    #[arg(long)]
    print_config: bool,
}

impl Cli {
    fn resolve_config(&self) -> anyhow::Result<HarnessConfig> {
        let config = match &self.config {
            Some(path) => HarnessConfig::load(path)?,
            None => HarnessConfig::default(),
        };
        let mut config = config.apply_env()?;
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(secs) = self.duration_secs {
            config.run.duration_secs = Some(secs);
        }
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = cli.resolve_config().context("invalid configuration")?;

    if cli.print_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    info!(
        "Targeting {}:{} with {} trading agents",
        config.server.host,
        config.server.port,
        config.trading_agents()
    );

    let report = Supervisor::new(config)
        .run()
        .await
        .context("harness failed to start")?;
    report.log_summary();
    Ok(())
}
