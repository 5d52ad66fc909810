//! CLI application for controlling Hue lights.
//!
//! This example demonstrates a command-line interface over the bridge client:
//! discovery, pairing and per-light state changes.
//!
//! Run with: cargo run --example hue_cli -- --help

use clap::{Parser, Subcommand};
use hue_bridge_rs::{Bridge, BridgeConfig, discover_bridges};

#[derive(Parser)]
#[command(name = "hue-cli")]
#[command(about = "Control Hue lights from the command line", long_about = None)]
struct Cli {
    /// Bridge id as reported by discovery (not required for discover)
    #[arg(short, long, global = true)]
    bridge: Option<String>,

    /// Username from an earlier pairing
    #[arg(short, long, global = true, env = "HUE_USERNAME")]
    username: Option<String>,

    /// Application name shown in the bridge whitelist
    #[arg(long, global = true, default_value = "hue-cli")]
    app: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List bridges on the network
    Discover,

    /// Pair with the bridge and print the username
    Pair,

    /// List lights
    Lights,

    /// Change the state of a light
    Set {
        /// Light number
        light: u32,

        /// Turn the light on or off
        #[arg(long)]
        on: Option<bool>,

        /// Brightness in percent (0-100)
        #[arg(long)]
        brightness: Option<f64>,

        /// Saturation in percent (0-100)
        #[arg(long)]
        saturation: Option<f64>,

        /// Hue in degrees
        #[arg(long, allow_hyphen_values = true)]
        hue: Option<f64>,

        /// Effect ("none" or "colorloop")
        #[arg(long)]
        effect: Option<String>,

        /// Transition time in tenths of a second
        #[arg(long)]
        transition: Option<u16>,
    },

    /// Rename a light
    Rename {
        /// Light number
        light: u32,
        /// New name
        name: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Commands::Discover = cli.command {
        let bridges = discover_bridges().await?;
        if bridges.is_empty() {
            println!("No bridges found.");
        }
        for (id, ip) in bridges {
            println!("  ID: {:18}  IP: {}", id, ip);
        }
        return Ok(());
    }

    let id = cli
        .bridge
        .ok_or("A bridge id is required for this command. Use --bridge <ID>")?;
    let config = BridgeConfig {
        application_name: cli.app,
        ..BridgeConfig::default()
    };
    let bridge = Bridge::new(id, cli.username, config)?;

    match cli.command {
        Commands::Discover => unreachable!(),

        Commands::Pair => {
            let username = bridge
                .register_with(
                    || println!("Press the link button on the bridge..."),
                    &Default::default(),
                )
                .await?;
            println!("Paired. Username: {}", username);
        }

        Commands::Lights => {
            for light in bridge.get_lights().await? {
                let light = light?;
                println!(
                    "  {:>3}  {:<24} {:>3}  bri {:5.1}%  sat {:5.1}%  hue {:5.1}°  {}",
                    light.number(),
                    light.name(),
                    if light.is_on() { "on" } else { "off" },
                    light.brightness(),
                    light.saturation(),
                    light.hue().degrees(),
                    light.effect()
                );
            }
        }

        Commands::Set {
            light,
            on,
            brightness,
            saturation,
            hue,
            effect,
            transition,
        } => {
            let mut light = bridge.get_light(light).await?;
            light.set_auto_update_state(false);
            light.set_transition_time(transition);

            if let Some(on) = on {
                light.set_on(on).await?;
            }
            if let Some(brightness) = brightness {
                light.set_brightness(brightness).await?;
            }
            if let Some(saturation) = saturation {
                light.set_saturation(saturation).await?;
            }
            if let Some(hue) = hue {
                light.set_hue(hue).await?;
            }
            if let Some(effect) = effect {
                light.set_effect(&effect).await?;
            }

            light.flush().await?;
            println!("Updated light {} ({})", light.number(), light.name());
        }

        Commands::Rename { light, name } => {
            let mut light = bridge.get_light(light).await?;
            light.set_name(&name).await?;
            println!("Renamed light {} to {}", light.number(), name);
        }
    }

    Ok(())
}
