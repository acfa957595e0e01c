//! Example: Arm the panel in away mode, wait out the exit delay, then
//! disarm.

use ness_lan_bridge::{ClientConfig, NessClient};
use tokio::time::{sleep, Duration};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = ClientConfig::builder().host("192.168.1.50").build();
    let mut client = NessClient::connect(config).await?;

    client
        .on_state_change(|state| println!("Arming state now {:?}", state))
        .await;

    println!("Arming (away)...");
    client.arm_away(Some("1234")).await?;

    // Long enough for a typical exit delay to run out
    sleep(Duration::from_secs(90)).await;
    println!("State after exit delay: {:?}", client.arming_state().await);

    println!("Disarming...");
    client.disarm("1234").await?;

    sleep(Duration::from_secs(5)).await;
    println!("Final state: {:?}", client.arming_state().await);

    client.disconnect().await;
    Ok(())
}
