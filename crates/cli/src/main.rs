use clap::Parser;
use splitroute_domain::CliOverrides;
use splitroute_infrastructure::dns::DnsServerHandler;
use tracing::{error, info};

mod bootstrap;
mod di;
mod server;

#[derive(Parser)]
#[command(name = "splitroute")]
#[command(version)]
#[command(about = "splitroute - DNS proxy that routes queries between a primary and an alternative upstream group")]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<String>,

    /// DNS server port
    #[arg(short = 'p', long)]
    port: Option<u16>,

    /// Bind address
    #[arg(short = 'b', long)]
    bind: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Number of UDP/TCP listener pairs (defaults to available cores)
    #[arg(long)]
    workers: Option<usize>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cli_overrides = CliOverrides {
        dns_port: cli.port,
        bind_address: cli.bind.clone(),
        log_level: cli.log_level.clone(),
    };

    let config = bootstrap::load_config(cli.config.as_deref(), cli_overrides.clone())?;
    bootstrap::init_logging(&config);

    info!("Starting splitroute v{}", env!("CARGO_PKG_VERSION"));

    let services = di::DnsServices::new(&config)?;
    let handler = DnsServerHandler::new(services.dispatcher.clone());

    let reload = server::spawn_reload_on_sighup(
        services.dispatcher.clone(),
        cli.config.clone(),
        cli_overrides,
    );

    let num_workers = cli.workers.unwrap_or_else(|| {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    });
    let dns_addr = config.server.listen_addr();

    tokio::select! {
        result = server::start_dns_server(dns_addr, handler, num_workers) => {
            if let Err(e) = result {
                error!(error = %e, "DNS server error");
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
    }

    reload.abort();
    info!("Server shutdown complete");
    Ok(())
}
