//! muffled - notification suppression daemon
//!
//! Sits in front of a chat webhook and suppresses duplicate notifications:
//! each sent alert is snoozed for a default period, and recipients can mute
//! or snooze it further from buttons inside the message itself.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use muffle_callback::CallbackServer;
use muffle_core::{SuppressionEngine, SuppressionStore};
use muffle_notify::{Dispatcher, NotifyConfig, WebhookChannel};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "muffled")]
#[command(about = "Duplicate-notification suppression in front of a chat webhook")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the callback server handling mute/snooze button presses
    Serve {
        /// Directory holding the suppression database
        #[arg(long, default_value = "./muffle-data")]
        data_dir: PathBuf,

        /// Address to bind the callback endpoint to
        #[arg(long, default_value = "0.0.0.0:8080")]
        bind: SocketAddr,
    },

    /// Send one notification through the suppression engine
    Send {
        /// Directory holding the suppression database
        #[arg(long, default_value = "./muffle-data")]
        data_dir: PathBuf,

        /// Webhook URL to deliver to
        #[arg(long, env = "MUFFLE_WEBHOOK_URL")]
        webhook_url: String,

        /// Alert key; parsed as JSON when possible, else used as a plain string
        #[arg(long)]
        key: String,

        /// Message text
        #[arg(long)]
        text: String,

        /// Snooze recorded after a successful send, in seconds
        #[arg(long, default_value_t = 86_400)]
        snooze_secs: u64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("muffled=info".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { data_dir, bind } => {
            let store = SuppressionStore::open(&data_dir)?;
            let engine = Arc::new(SuppressionEngine::new(store));

            info!(addr = %bind, data_dir = %data_dir.display(), "starting callback server");
            CallbackServer::new(engine).serve(bind).await?;
        }

        Commands::Send {
            data_dir,
            webhook_url,
            key,
            text,
            snooze_secs,
        } => {
            let store = SuppressionStore::open(&data_dir)?;
            let engine = Arc::new(SuppressionEngine::new(store));

            let config = NotifyConfig::new(&webhook_url)?
                .with_default_snooze(Duration::from_secs(snooze_secs));
            let channel = Arc::new(WebhookChannel::new(webhook_url));
            let dispatcher = Dispatcher::new(engine, channel, config);

            let key_value = serde_json::from_str::<serde_json::Value>(&key)
                .unwrap_or_else(|_| serde_json::Value::String(key));

            if dispatcher.maybe_notify(&key_value, &text).await? {
                println!("sent");
            } else {
                println!("suppressed");
            }
        }
    }

    Ok(())
}
