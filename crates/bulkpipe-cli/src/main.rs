use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "bulkpipe",
    about = "bulkpipe — HTTP latency and bulk transfer client",
    version,
    propagate_version = true,
)]
struct Cli {
    /// Optional bulkpipe.toml; flags override its [probe] section.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Measure heartbeat round-trip time at a fixed interval.
    ///
    /// Runs until Ctrl-C (or --count probes), then prints a summary.
    /// Failed probes are logged and the loop keeps going.
    Ping {
        /// Server base URL; `/ping` is appended.
        #[arg(short, long)]
        url: Option<String>,
        /// Seconds between probes.
        #[arg(short, long)]
        interval: Option<u64>,
        /// Per-probe deadline, e.g. "10s" or "500ms".
        #[arg(short, long)]
        timeout: Option<String>,
        /// Stop after this many probes.
        #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
        count: Option<u64>,
    },
    /// Fetch the full download and check it matches the declared length.
    Download {
        /// Server base URL; `/download` is appended.
        #[arg(short, long)]
        url: Option<String>,
        /// Deadline for connecting and receiving headers.
        #[arg(short, long)]
        timeout: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("bulkpipe=info".parse()?)
                .add_directive("bulkpipe_probe=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let config = bulkpipe_core::BulkpipeConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Ping {
            url,
            interval,
            timeout,
            count,
        } => {
            let settings = commands::ping::PingSettings::resolve(
                &config,
                url,
                interval,
                timeout.as_deref(),
                count,
            )?;
            commands::ping::ping(settings).await
        }
        Commands::Download { url, timeout } => {
            commands::download::download(&config, url, timeout.as_deref()).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ping_count_must_be_positive() {
        assert!(Cli::try_parse_from(["bulkpipe", "ping", "--count", "0"]).is_err());

        let cli = Cli::try_parse_from(["bulkpipe", "ping", "--count", "3"]).unwrap();
        match cli.command {
            Commands::Ping { count, .. } => assert_eq!(count, Some(3)),
            _ => panic!("expected ping"),
        }
    }
}
