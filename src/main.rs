use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use feedwire::api::HttpBackend;
use feedwire::core::config;
use feedwire::core::page::Page;
use feedwire::core::reconciler::Reconciler;
use feedwire::dom::{Document, NodeSpec};
use feedwire::host::RecordingHost;
use feedwire::script::{self, Step};
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use std::fs::File;

#[derive(Parser)]
#[command(name = "feedwire", about = "Replays feed page gestures against a live server")]
struct Args {
    /// Page fixture: JSON array of elements under <body>
    #[arg(short, long)]
    page: PathBuf,

    /// Gesture script: JSON array of steps
    #[arg(short, long)]
    script: PathBuf,

    /// Server root (overrides config file and FEEDWIRE_BASE_URL)
    #[arg(short, long)]
    base_url: Option<String>,

    /// Config file (defaults to ~/.feedwire/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the final page markup
    #[arg(long)]
    dump: bool,

    /// Log level written to feedwire.log
    #[arg(long, default_value = "debug")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Initialize file logger - writes to feedwire.log in current directory
    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .build();
    let level = args.log_level.parse().unwrap_or(LevelFilter::Debug);

    if let Ok(log_file) = File::create("feedwire.log") {
        let _ = WriteLogger::init(level, log_config, log_file);
    }

    let file_config = match &args.config {
        Some(path) => config::load_config_from(path)?,
        None => config::load_config()?,
    };
    let resolved = config::resolve(&file_config, args.base_url.as_deref());
    log::info!("Feedwire starting against {}", resolved.base_url);

    let specs: Vec<NodeSpec> = serde_json::from_str(&fs::read_to_string(&args.page)?)?;
    let steps: Vec<Step> = serde_json::from_str(&fs::read_to_string(&args.script)?)?;

    let backend = Arc::new(HttpBackend::new(&resolved.base_url, resolved.request_timeout)?);
    let host = Arc::new(RecordingHost::new());
    let reconciler = Reconciler::from_config(
        Page::new(Document::from_specs(&specs)),
        backend,
        host.clone(),
        &resolved,
    );

    let outcomes = script::run(&reconciler, &host, &steps).await?;

    for outcome in &outcomes {
        match &outcome.action {
            Some(action) => println!("{:<40} -> {:?}", outcome.step, action),
            None => println!("{:<40} -> (ignored)", outcome.step),
        }
    }
    for alert in host.alerts() {
        println!("alert: {alert}");
    }
    if host.reloads() > 0 {
        println!("reloads: {}", host.reloads());
    }
    if args.dump {
        let page = reconciler.page();
        println!("{}", page.read(|doc| doc.outer_html(doc.root())));
    }

    Ok(())
}
