//! Queue a handful of WoW requests and send them as one batch.
//!
//! ```bash
//! BATTLENET_API_KEY=... RUST_LOG=battlenet_api=debug cargo run --example send_batch
//! ```

use battlenet_api::{ClientBuilder, Completion, Params};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut client = ClientBuilder::from_env()?
        .max_connections(3)
        .throttle_per_second(10)
        .build()?;

    client.add_request("wow", "item", Params::new().with("itemId", 19019))?;
    client.add_request("wow", "achievement", Params::new().with("id", 2144))?;
    client.add_request("wow", "item/set", Params::new().with("setId", 1060))?;
    client.add_request("wow", "realm/status", Params::new())?;
    client.add_request(
        "wow",
        "character",
        Params::new()
            .with("realm", "Aerie Peak")
            .with("characterName", "Fanatiks")
            .with("fields", "items,stats"),
    )?;

    let report = client
        .send(|c: &Completion| {
            let outcome = match (&c.metadata.error, c.metadata.status) {
                (Some(err), _) => format!("error: {}", err),
                (None, Some(status)) => format!("{} ({} bytes)", status, c.body.len()),
                (None, None) => "no response".to_string(),
            };
            println!(
                "#{} {} in {:?}: {}",
                c.index(),
                c.metadata.url,
                c.metadata.total_time,
                outcome
            );
        })
        .await?;

    println!(
        "{}/{} succeeded, {} throttle pause(s), {:?} total",
        report.succeeded, report.total, report.throttle_pauses, report.elapsed
    );
    Ok(())
}
