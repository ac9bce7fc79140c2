// DisasterAI command-line entry point

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

use disasterai_core::models::{ChatRequest, ConversationContext};
use disasterai_core::{AppConfig, ChatService};

#[derive(Parser, Debug)]
#[command(name = "disasterai", version, about = "Disaster guidance assistant")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Send one chat message and print the JSON response
    Chat {
        /// Message text; multiple words are joined with spaces
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,
        /// Session id; a fresh one is generated when omitted
        #[arg(long)]
        session: Option<String>,
    },
    /// Assess a described scene and print the assessment and report
    Assess {
        description: String,
        /// Extra context about the person's situation
        #[arg(long, default_value = "")]
        context: String,
        #[arg(long)]
        session: Option<String>,
    },
}

fn new_session_id() -> String {
    Uuid::new_v4().to_string()
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,disasterai_core=debug".into());
    let registry = tracing_subscriber::registry().with(filter);

    // Logs go to stderr so stdout stays machine-readable
    if std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json")) {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = AppConfig::from_env().context("Failed to load configuration")?;
    tracing::info!(backend = ?config.backend, "Configuration loaded");

    let gateway = config.build_gateway().context("Failed to build model gateway")?;
    let service = ChatService::new(
        gateway,
        Arc::new(config.session_store()),
        config.attachment_policy(),
    );

    match cli.command {
        Command::Chat { message, session } => {
            let session = session.unwrap_or_else(new_session_id);
            let request = ChatRequest::text(message.join(" "))
                .with_context(ConversationContext::for_session(session));
            let response = service.handle(request).await.context("Chat request rejected")?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Command::Assess {
            description,
            context,
            session,
        } => {
            let session = session.unwrap_or_else(new_session_id);
            let scene = service.assess_scene(&description, &context, &session);
            println!("{}", serde_json::to_string_pretty(&scene.assessment)?);
            println!();
            println!("{}", scene.report);
        }
    }

    Ok(())
}
