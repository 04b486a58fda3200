use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use docket_gateway::api::{self, ApiState};
use docket_gateway::db::{self, CaseRepo};
use docket_gateway::{
    AttachmentStore, Config, IntakeEngine, MessageCatalog, ProcessingClient, RagClient,
    SessionStore, TelegramChannel,
};

/// Docket - Telegram case-intake gateway for legal case processing
#[derive(Parser)]
#[command(name = "docket", version, about)]
struct Cli {
    /// Port to listen on (overrides config)
    #[arg(long, env = "DOCKET_PORT")]
    port: Option<u16>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Register the webhook URL with Telegram
    SetWebhook {
        /// Publicly reachable webhook URL
        url: String,
    },
    /// Remove the registered webhook
    DeleteWebhook,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,docket_gateway=info",
        1 => "info,docket_gateway=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load()?;

    if let Some(cmd) = cli.command {
        let channel = TelegramChannel::new(config.require_token()?.to_string());
        return match cmd {
            Command::SetWebhook { url } => {
                channel
                    .set_webhook(&url, config.telegram.webhook_secret.as_deref())
                    .await?;
                Ok(())
            }
            Command::DeleteWebhook => {
                channel.delete_webhook().await?;
                Ok(())
            }
        };
    }

    let port = cli.port.unwrap_or(config.server.port);
    tracing::info!(port, data_dir = %config.data_dir.display(), "starting docket gateway");

    std::fs::create_dir_all(&config.data_dir)?;
    let db = db::init(config.db_path())?;
    let sessions = SessionStore::from_config(&config.session)?;
    let attachments = AttachmentStore::new(config.attachment_dir())?;

    let telegram = TelegramChannel::new(config.require_token()?.to_string());
    telegram.get_me().await?;
    tracing::info!("Telegram bot token validated");

    let processor =
        ProcessingClient::new(config.processing.base_url.clone(), config.processing.timeout)?;
    let indexer = RagClient::new(config.rag.base_url.clone(), config.rag.timeout)?;

    let engine = IntakeEngine::new(
        sessions,
        Arc::new(telegram),
        Arc::new(processor),
        Arc::new(indexer),
        CaseRepo::new(db.clone()),
        attachments,
        MessageCatalog::default(),
        config.reset_delay,
    );

    let state = Arc::new(ApiState {
        engine: Arc::new(engine),
        webhook_secret: config.telegram.webhook_secret.clone(),
        db,
    });

    api::serve(state, port).await?;
    Ok(())
}
