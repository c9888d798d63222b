//! voicegen: text-to-speech generation proxy.

use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use voicegen::{api, Config};

#[derive(Parser, Debug)]
#[command(name = "voicegen", about = "Text-to-speech generation proxy")]
struct Args {
    /// Path to config.yaml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen port (overrides config and PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Enable verbose (debug) logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // RUST_LOG wins; otherwise keep hyper/reqwest internals quiet
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if args.verbose {
            EnvFilter::new("debug,hyper=info,reqwest=info")
        } else {
            EnvFilter::new("info,hyper=warn,reqwest=warn,tower_http=warn")
        }
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("voicegen starting");

    let mut config = Config::load(args.config.as_deref());
    if let Some(port) = args.port {
        config.server.port = port;
    }
    info!(
        "TTS endpoint: {}, upload endpoint: {}, max text length: {}",
        config.tts.endpoint, config.upload.endpoint, config.limits.max_text_len
    );

    api::serve(&config).await?;

    Ok(())
}
