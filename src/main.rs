// src/main.rs

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use stranger_chat::api::create_router;
use stranger_chat::chat::{ChatService, OsRandom};
use stranger_chat::config::{self, ChatConfig, LogFormat};
use stranger_chat::llm::OpenAiCompatClient;
use stranger_chat::locale::{Catalog, LanguageCode, LanguageResolver};
use stranger_chat::pipeline::ReplyPipeline;
use stranger_chat::state::AppState;

#[derive(Parser)]
#[command(name = "stranger-chat", version)]
#[command(about = "Chat relay that makes an upstream model reply like a human stranger")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP service (default)
    Serve {
        /// Bind host, overrides HOST
        #[arg(long)]
        host: Option<String>,

        /// Bind port, overrides PORT
        #[arg(long)]
        port: Option<u16>,
    },

    /// Run one candidate through the reply pipeline and print the result
    Clean {
        text: String,

        /// Previous assistant turn, for duplicate detection
        #[arg(long)]
        prior: Option<String>,

        /// Language whose fallback is used if the candidate is rejected
        #[arg(long, default_value = "EN")]
        lang: String,

        /// Seed for the fallback pick
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Show which language a request would be answered in
    Resolve {
        #[arg(long)]
        lang: Option<String>,

        #[arg(long)]
        referer: Option<String>,

        #[arg(long)]
        accept_language: Option<String>,
    },
}

fn init_logging(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt().with_env_filter(filter).with_writer(std::io::stderr);
    match format {
        LogFormat::Compact => builder.compact().init(),
        LogFormat::Pretty => builder.init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let env_file = config::load_env_file();
    init_logging(LogFormat::from_env());
    if !env_file {
        debug!(".env file not found, using environment variables and defaults");
    }

    let cli = Cli::parse();
    let config = ChatConfig::from_env();

    match cli.command.unwrap_or(Command::Serve { host: None, port: None }) {
        Command::Serve { host, port } => serve(config, host, port).await,
        Command::Clean { text, prior, lang, seed } => clean(&config, &text, prior.as_deref(), &lang, seed),
        Command::Resolve { lang, referer, accept_language } => {
            let (code, source) = LanguageResolver::default().resolve_with_source(
                lang.as_deref(),
                referer.as_deref(),
                accept_language.as_deref(),
            );
            println!("{code} ({source:?})");
            Ok(())
        }
    }
}

async fn serve(mut config: ChatConfig, host: Option<String>, port: Option<u16>) -> Result<()> {
    if let Some(host) = host {
        config.host = host;
    }
    if let Some(port) = port {
        config.port = port;
    }
    config.validate()?;

    if config.api_key.is_empty() {
        warn!("UPSTREAM_API_KEY is not set; upstream calls will fail and replies will be fallbacks");
    }

    let client = OpenAiCompatClient::new(&config)?;
    let config = Arc::new(config);
    let chat = ChatService::new(config.clone(), Arc::new(client), Arc::new(OsRandom))?;
    let app = create_router(AppState::new(chat));

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    info!(
        address = %listener.local_addr()?,
        model = %config.model,
        "stranger-chat {} listening",
        env!("CARGO_PKG_VERSION")
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await?;

    Ok(())
}

fn clean(config: &ChatConfig, text: &str, prior: Option<&str>, lang: &str, seed: Option<u64>) -> Result<()> {
    let pipeline = ReplyPipeline::new(config.sanitize_policy()?);
    let catalog = Catalog::builtin();
    let code = LanguageCode::normalize(lang).unwrap_or_default();

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let fallback = catalog.entry(code).pick_fallback(&mut rng);

    let result = pipeline.produce(&[text], prior, fallback);
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
