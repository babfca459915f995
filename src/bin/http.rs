#[cfg(feature = "http_api")]
#[derive(clap::Parser)]
#[command(name = "http")]
#[command(about = "Serve the class calendar over HTTP")]
struct Cli {
    /// TOML config file (falls back to CLASS_CALENDAR_CONFIG)
    config: Option<std::path::PathBuf>,
}

#[cfg(feature = "http_api")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use clap::Parser;
    use std::net::SocketAddr;

    use class_calendar::http_api::{self, AppState};
    use class_calendar::{CalendarConfig, SaveQueue, ScheduleStore, logging};

    let cli = Cli::parse();
    logging::init("info");

    let config = CalendarConfig::load(cli.config.as_deref())?;
    let addr: SocketAddr = config.http_addr.parse()?;

    let catalog = config.catalog()?;
    let bridge = config.bridge()?;
    let loader = bridge.clone();
    let stored = tokio::task::spawn_blocking(move || loader.load()).await?;
    let store = ScheduleStore::with_assignments(catalog, stored);

    if config.secret().is_none() {
        tracing::warn!("no password configured, every request may edit the calendar");
    }
    let state = AppState::new(store, SaveQueue::spawn(bridge), config.secret());
    http_api::serve(addr, state).await?;
    Ok(())
}

#[cfg(not(feature = "http_api"))]
fn main() {
    eprintln!("Rebuild with the `http_api` feature to enable the HTTP server.");
}
