use std::path::{Path, PathBuf};

use clap::Parser;
use tower_lsp::{LspService, Server};
use tracing::info;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use factory_analyzer::FactoryLanguageServer;

#[derive(Parser, Debug)]
#[command(name = "factory-analyzer", version, about)]
struct Args {
    #[arg(long, short)]
    verbose: bool,

    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn default_log_path() -> PathBuf {
    log_dir().join("factory-analyzer.log")
}

fn log_dir() -> PathBuf {
    if let Some(home) = std::env::var_os("HOME") {
        let dir = PathBuf::from(home).join(".factory-analyzer");
        if std::fs::create_dir_all(&dir).is_ok() {
            return dir;
        }
    }
    std::env::temp_dir()
}

fn filters(verbose: bool) -> (EnvFilter, EnvFilter) {
    if verbose {
        (
            EnvFilter::new("factory_analyzer=debug,tower_lsp=debug"),
            EnvFilter::new("factory_analyzer=debug,tower_lsp=info"),
        )
    } else {
        (
            EnvFilter::new("factory_analyzer=info,tower_lsp=warn"),
            EnvFilter::new("factory_analyzer=info,tower_lsp=warn"),
        )
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let (stderr_filter, file_filter) = filters(args.verbose);

    let log_path = args.log_file.clone().unwrap_or_else(default_log_path);
    let file_appender = tracing_appender::rolling::never(
        log_path.parent().unwrap_or(Path::new(".")),
        log_path.file_name().unwrap_or(std::ffi::OsStr::new("factory-analyzer.log")),
    );

    let file_layer =
        fmt::layer().with_writer(file_appender).with_ansi(false).with_target(false).with_filter(file_filter);

    // stdout carries the protocol; diagnostics go to stderr.
    let stderr_layer =
        fmt::layer().with_writer(std::io::stderr).with_ansi(false).with_target(false).with_filter(stderr_filter);

    tracing_subscriber::registry().with(file_layer).with(stderr_layer).init();

    info!("Starting factory-analyzer v{}", env!("CARGO_PKG_VERSION"));
    info!("Log file: {}", log_path.display());

    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();
    let (service, socket) = LspService::new(FactoryLanguageServer::new);

    Server::new(stdin, stdout, socket).serve(service).await;

    info!("factory-analyzer stopped");
}
