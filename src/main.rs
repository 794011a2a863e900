//! Processor Adapter - inspection entry point
//!
//! Loads a file, preprocesses it with the configured processor and prints
//! the derived files (or the fatal diagnostics) as JSON.

use anyhow::{anyhow, Result};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use processor_adapter::preprocess;
use processor_adapter::types::{AdapterSettings, VirtualFile};

fn main() -> Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let settings = AdapterSettings::from_env();

    // Initialize tracing on stderr so stdout stays JSON
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "processor_adapter=info".into()),
    );
    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    if settings.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry().with(filter).with(fmt_layer).init();
    }

    let config = settings.build_config()?;

    let path = std::env::args()
        .nth(1)
        .ok_or_else(|| anyhow!("usage: processor-adapter <file>"))?;

    info!(path = %path, processor = config.processor.name(), "Preprocessing file");

    let file = VirtualFile::load(&path)?;
    let outcome = preprocess(&file, &config);

    let json = if settings.pretty_json {
        serde_json::to_string_pretty(&outcome)?
    } else {
        serde_json::to_string(&outcome)?
    };
    println!("{}", json);

    if !outcome.is_ok() {
        std::process::exit(1);
    }

    Ok(())
}
