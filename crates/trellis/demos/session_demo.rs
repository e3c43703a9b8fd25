//! Session logging walkthrough.
//!
//! Admits one visitor through the gate, bumps the counter, then shows the
//! session log page by page.
//!
//! ```text
//! cargo run -p trellis --example session_demo -- [settings.toml] [ip-address]
//! RUST_LOG=trellis=debug cargo run -p trellis --example session_demo
//! ```

use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use trellis::model::PageRequest;
use trellis::net::IpApiClient;
use trellis::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("trellis=info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let settings = match args.next() {
        Some(path) => AppSettings::load_or_default(path)?,
        None => AppSettings::default(),
    };
    let address = args.next().unwrap_or_else(|| "23.81.0.59".to_string());

    let relay = Relay::new();
    let store = SqliteLogStore::open(&settings.log.database_path)?;
    let _manager = LogDataManager::attach(store, &relay);

    let session = Arc::new(SessionService::new());
    session.ensure_session(&address, "session-demo/0.1");

    let gate = SessionGate::from_settings(relay.clone(), IpApiClient::new()?, &settings);
    match gate.admit(&session).await {
        Ok(outcome) if outcome.is_denied() => {
            println!(
                "{} denied, redirecting to {}",
                outcome.session.ip_address,
                outcome.redirect.unwrap_or_default()
            );
        }
        Ok(outcome) => println!("{} admitted", outcome.session.ip_address),
        Err(err) => eprintln!("gate failed: {err}"),
    }

    let counter = Counter::new(relay.clone(), Arc::clone(&session));
    let badge = CounterBadge::attach(&relay, Arc::clone(&session));
    for _ in 0..3 {
        counter.increment()?;
    }
    println!("{}", badge.text());

    let view = SessionLogView::open(&relay, Arc::clone(&session))?;
    println!("{}", view.title());
    view.with_grid(|grid| {
        for page in 1..=grid.total_pages() {
            grid.get_page(PageRequest::Number(page as i64));
            println!("-- page {page}/{} --", grid.total_pages());
            for row in grid.visible_page() {
                let cells: Vec<String> = grid
                    .visible_columns()
                    .iter()
                    .map(|column| grid.display_value(row, column.name))
                    .collect();
                println!("{}", cells.join(" | "));
            }
        }
    });
    view.close();

    Ok(())
}
