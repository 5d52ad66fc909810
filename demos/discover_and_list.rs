//! Discover Hue bridges and list the lights of one you are already paired with.
//!
//! This example demonstrates:
//! - Discovery of bridges through the public discovery service
//! - Listing lights with a stored username
//!
//! Run with: cargo run --example discover_and_list -- [USERNAME]

use hue_bridge_rs::{Bridge, BridgeConfig, list_bridges};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Asking the discovery service for bridges...");

    let bridges = list_bridges().await?;
    if bridges.is_empty() {
        println!("No bridges found.");
        return Ok(());
    }

    println!("Found {} bridge(s):", bridges.len());
    for bridge in &bridges {
        println!("  - ID: {}, IP: {}", bridge.id, bridge.ip);
    }

    let Some(username) = std::env::args().nth(1) else {
        println!("\nPass a username to list the lights of the first bridge.");
        return Ok(());
    };

    let first = bridges[0].clone();
    let bridge = Bridge::new(first.id, Some(username), BridgeConfig::default())?.with_address(first.ip);

    println!("\nLights on {}:", bridge.id());
    for light in bridge.get_lights().await? {
        match light {
            Ok(light) => println!(
                "  {:>3}  {:<24} {:>3}  bri {:5.1}%  hue {:5.1}°",
                light.number(),
                light.name(),
                if light.is_on() { "on" } else { "off" },
                light.brightness(),
                light.hue().degrees()
            ),
            Err(e) => eprintln!("  ✗ {}", e),
        }
    }

    Ok(())
}
