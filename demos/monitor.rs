//! Example: Connect to a panel and print state changes, zone changes, and
//! every decoded event.

use ness_lan_bridge::{ClientConfig, NessClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = ClientConfig::builder()
        .host("192.168.1.50")
        .port(23)
        .build();

    let mut client = NessClient::connect(config).await?;

    client
        .on_state_change(|state| println!("Arming state: {:?}", state))
        .await;
    client
        .on_zone_change(|zone, triggered| {
            println!("Zone {} {}", zone, if triggered { "unsealed" } else { "sealed" })
        })
        .await;

    let mut events = client.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            println!("Event: {:?}", event);
        }
    });

    println!("Monitoring panel (Ctrl+C to stop)...");
    tokio::signal::ctrl_c().await?;

    client.disconnect().await;
    Ok(())
}
