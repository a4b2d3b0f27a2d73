use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use hwbot_core::config::{self, Settings};
use hwbot_core::orchestrator;

#[derive(Parser)]
#[command(
    name = "hwbot",
    about = "Poll homework review status and report every change to a Telegram chat",
    version,
    after_help = "Required environment (a .env file in the working directory is also read):\n  \
                  PRACTICUM_TOKEN    Practicum API OAuth token\n  \
                  TELEGRAM_TOKEN     Telegram bot token\n  \
                  TELEGRAM_CHAT_ID   Chat that receives the notifications"
)]
struct Cli {
    /// Homework statuses endpoint
    #[arg(long, env = "HWBOT_ENDPOINT", default_value = config::DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Bot API host
    #[arg(long, env = "HWBOT_TELEGRAM_API_URL", default_value = config::DEFAULT_TELEGRAM_API_URL)]
    telegram_api_url: String,

    /// Seconds between polls
    #[arg(long, env = "HWBOT_POLL_INTERVAL", default_value_t = config::DEFAULT_POLL_INTERVAL_SECS)]
    poll_interval: u64,

    /// Initial cursor, seconds since epoch (default: now)
    #[arg(long, env = "HWBOT_FROM_DATE")]
    from_date: Option<i64>,
}

/// Secrets are environment-only so they never show up in the process list.
fn secret(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

impl Cli {
    fn into_settings(self) -> Settings {
        Settings {
            practicum_token: secret(config::PRACTICUM_TOKEN_ENV),
            telegram_token: secret(config::TELEGRAM_TOKEN_ENV),
            telegram_chat_id: secret(config::TELEGRAM_CHAT_ID_ENV),
            endpoint: self.endpoint,
            telegram_api_url: self.telegram_api_url,
            poll_interval: Duration::from_secs(self.poll_interval),
            from_date: self.from_date,
        }
    }
}

fn main() {
    // Variables already in the environment win over the file.
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_target(false)
        .with_writer(std::io::stdout)
        .init();

    if let Err(e) = run(cli.into_settings()) {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run(settings: Settings) -> anyhow::Result<()> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start tokio runtime")?;

    rt.block_on(async {
        tokio::select! {
            result = orchestrator::start(settings) => result.context("bot stopped"),
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("interrupted, shutting down");
                Ok(())
            }
        }
    })
}
