use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand, ValueEnum};
use gke_pods::config::{Overrides, Settings};
use gke_pods::kubernetes::{http::format_kube_error, Context, KubeClient, Pod};
use gke_pods::{msgsrv, VERSION};
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Kubernetes pod lister and message timestamping service
#[derive(Parser, Debug)]
#[command(name = "gke-pods", version, about, long_about = None)]
struct Args {
    /// Log level for debugging
    #[arg(long, value_enum, global = true)]
    log_level: Option<LogLevel>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the pods of the default namespace
    Pods {
        /// Cluster master URL, e.g. https://35.1.2.3
        #[arg(long)]
        base_url: Option<String>,

        /// Basic auth username
        #[arg(short, long)]
        username: Option<String>,

        /// Basic auth password
        #[arg(short, long)]
        password: Option<String>,

        /// Give up after this many seconds
        #[arg(long, default_value_t = 30)]
        timeout: u64,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        output: Output,

        /// Remember the base URL and username for next time
        #[arg(long)]
        save: bool,
    },
    /// Run the message timestamping service
    Serve {
        /// Address to listen on
        #[arg(long, default_value = "0.0.0.0:8080")]
        addr: SocketAddr,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Output {
    Table,
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(level: LogLevel) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let Some(tracing_level) = level.to_tracing_level() else {
        return Ok(None);
    };

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {:?}", log_path))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("gke-pods {} started with log level: {:?}", VERSION, level);
    tracing::info!("Log file: {:?}", log_path);

    Ok(Some(guard))
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = Settings::config_dir() {
        return config_dir.join("gke-pods.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".gke-pods").join("gke-pods.log");
    }
    PathBuf::from("gke-pods.log")
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = match args.command {
        Command::Serve { .. } => LogLevel::Info,
        Command::Pods { .. } => LogLevel::Off,
    };
    let _log_guard = setup_logging(args.log_level.unwrap_or(default_level))?;

    match args.command {
        Command::Pods {
            base_url,
            username,
            password,
            timeout,
            output,
            save,
        } => {
            let overrides = Overrides {
                base_url,
                username,
                password,
            };
            list_pods(&overrides, Duration::from_secs(timeout), output, save).await
        }
        Command::Serve { addr } => {
            let listener = tokio::net::TcpListener::bind(addr)
                .await
                .with_context(|| format!("Failed to bind {}", addr))?;
            msgsrv::serve(listener).await
        }
    }
}

async fn list_pods(overrides: &Overrides, timeout: Duration, output: Output, save: bool) -> Result<()> {
    let mut settings = Settings::load();
    let cfg = settings.resolve(overrides)?;
    let client = KubeClient::new(&cfg)?;

    tracing::info!("Listing pods from {}", client.endpoint_url());

    let ctx = Context::with_timeout(timeout);
    match ctx.deadline() {
        Some(deadline) => tracing::debug!(
            "Request deadline in {:?} (user {:?})",
            deadline.saturating_duration_since(tokio::time::Instant::now()),
            cfg.username
        ),
        None => tracing::debug!("No request deadline (user {:?})", cfg.username),
    }
    let canceller = ctx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupted, cancelling request");
            canceller.cancel();
        }
    });

    let pods = match client.list_pods(&ctx).await {
        Ok(pods) => pods,
        Err(err) => {
            tracing::error!("Listing pods failed: {}", err);
            let hint = format_kube_error(&err);
            return Err(anyhow::Error::new(err).context(hint));
        }
    };

    if save {
        settings.remember(&cfg)?;
    }

    match output {
        Output::Json => println!("{}", serde_json::to_string_pretty(&pods)?),
        Output::Table => print_table(&pods),
    }

    Ok(())
}

fn print_table(pods: &[Pod]) {
    let width = pods
        .iter()
        .map(|p| p.name().len())
        .max()
        .unwrap_or(0)
        .max("NAME".len());

    println!("{:<width$}  {:<12}  {}", "NAME", "NAMESPACE", "STATUS");
    for pod in pods {
        println!("{:<width$}  {:<12}  {}", pod.name(), pod.namespace(), pod.phase());
    }
}
