mod config;
mod error;
mod handlers;
mod state;

use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;

use crate::config::ServerSection;
use crate::state::AppState;

#[derive(Parser)]
#[command(name = "fitsync-server", version, about = "fitsync backup API server")]
struct Cli {
    /// Address to listen on
    #[arg(short, long, default_value = "localhost:8686")]
    listen: String,

    /// Directory where backup rows are stored
    #[arg(short, long, default_value = "/var/lib/fitsync")]
    data_dir: String,

    /// Log output format: "json" or "pretty"
    #[arg(long, default_value = "pretty")]
    log_format: String,

    /// Number of rows retained per insert (oldest beyond this are removed)
    #[arg(long, default_value_t = 5, value_parser = parse_min_one)]
    max_backups: usize,

    /// Number of tokio worker threads (minimum 1)
    #[arg(long, default_value_t = 2, value_parser = parse_min_one)]
    worker_threads: usize,
}

fn parse_min_one(s: &str) -> Result<usize, String> {
    let n: usize = s.parse().map_err(|e| format!("{e}"))?;
    if n == 0 {
        return Err("value must be at least 1".into());
    }
    Ok(n)
}

fn main() {
    let cli = Cli::parse();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(cli.worker_threads)
        .enable_all()
        .build()
        .unwrap_or_else(|e| {
            eprintln!("Error: failed to build tokio runtime: {e}");
            std::process::exit(1);
        });

    runtime.block_on(async_main(cli));
}

async fn async_main(cli: Cli) {
    // Optional bearer token; the API is open when unset.
    let token = std::env::var("FITSYNC_TOKEN").unwrap_or_default();

    let config = ServerSection {
        listen: cli.listen,
        data_dir: cli.data_dir,
        token,
        log_format: cli.log_format,
        max_backups: cli.max_backups,
    };

    match config.log_format.as_str() {
        "json" => {
            tracing_subscriber::fmt().json().init();
        }
        _ => {
            tracing_subscriber::fmt().init();
        }
    }

    if config.token.is_empty() {
        tracing::warn!("FITSYNC_TOKEN not set; backup API runs unauthenticated");
    }

    std::fs::create_dir_all(&config.data_dir).unwrap_or_else(|e| {
        eprintln!(
            "Error: cannot create data directory '{}': {e}",
            config.data_dir
        );
        std::process::exit(1);
    });

    let listen_addr = config.listen.clone();
    let state = AppState::new(config);
    let app = handlers::router(state);

    info!("fitsync-server listening on {listen_addr}");
    let listener = TcpListener::bind(&listen_addr).await.unwrap_or_else(|e| {
        eprintln!("Error: cannot bind to {listen_addr}: {e}");
        std::process::exit(1);
    });
    axum::serve(listener, app).await.unwrap_or_else(|e| {
        eprintln!("Error: server terminated: {e}");
        std::process::exit(1);
    });
}
