//! deCONZ switch bridge.
//!
//! Starts an in-memory deCONZ gateway from a JSON device fixture, bridges its
//! power plugs and sirens, then replays gateway push events so newly learned
//! devices flow through discovery.
//!
//! Usage:
//!   cargo run -- --devices demos/devices.json --events demos/events.json
//!   cargo run -- --devices demos/devices.json --toggle

use clap::Parser;
use deconz_switch_bridge::config::{self, Config};
use deconz_switch_bridge::dispatcher::Dispatcher;
use deconz_switch_bridge::error::Result;
use deconz_switch_bridge::gateway::{Gateway, GatewayEvent, LightDescriptor, MemoryTransport};
use deconz_switch_bridge::session::IntegrationSession;
use deconz_switch_bridge::switch::{self, AddEntities, SwitchEntity, TurnOptions};
use futures_util::future::join_all;
use log::{error, info, warn};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;

#[derive(Parser)]
#[command(name = "deconz-switch-bridge")]
#[command(about = "Bridge deCONZ power plugs and sirens into switch entities")]
struct Cli {
    /// JSON object mapping light ids to light descriptors
    #[arg(long)]
    devices: Option<PathBuf>,

    /// JSON list of gateway push events replayed after setup
    #[arg(long)]
    events: Option<PathBuf>,

    /// Override the bridge id
    #[arg(long)]
    bridge_id: Option<String>,

    /// Do not echo acknowledged commands back as state pushes
    #[arg(long)]
    no_echo: bool,

    /// Turn every bridged switch on, then off again
    #[arg(long)]
    toggle: bool,
}

type Bridged = Arc<Mutex<Vec<Arc<dyn SwitchEntity>>>>;

fn init_logger() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();
}

#[tokio::main]
async fn main() {
    config::load_dotenv();
    init_logger();
    let cli = Cli::parse();
    info!("Starting deCONZ switch bridge");

    if let Err(e) = run(cli).await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::from_env();
    if cli.devices.is_some() {
        config.bridge.devices_file = cli.devices;
    }
    if cli.events.is_some() {
        config.bridge.events_file = cli.events;
    }
    if let Some(bridge_id) = cli.bridge_id {
        config.gateway.bridge_id = bridge_id;
    }
    if cli.no_echo {
        config.bridge.echo_commands = false;
    }
    config.validate()?;

    info!("Configuration loaded:");
    info!("  Gateway: {}:{}", config.gateway.host, config.gateway.port);
    info!("  Bridge id: {}", config.gateway.bridge_id);
    info!(
        "  API key: {}",
        if config.gateway.api_key.is_some() { "set" } else { "unset" }
    );
    info!("  Echo commands: {}", config.bridge.echo_commands);

    let transport = Arc::new(MemoryTransport::new());
    transport.set_echo(config.bridge.echo_commands);
    let gateway = Arc::new(Gateway::new(
        config.gateway.bridge_id.clone(),
        transport,
        Arc::new(Dispatcher::new()),
    ));

    if let Some(path) = &config.bridge.devices_file {
        let devices: BTreeMap<String, LightDescriptor> =
            serde_json::from_str(&fs::read_to_string(path)?)?;
        gateway.load_lights(devices);
    }

    let session = IntegrationSession::new(format!("deconz-{}", config.gateway.bridge_id));
    let bridged: Bridged = Arc::new(Mutex::new(Vec::new()));
    switch::setup_entry(&gateway, &session, host_sink(bridged.clone()))?;

    if let Some(path) = &config.bridge.events_file {
        let events: Vec<GatewayEvent> = serde_json::from_str(&fs::read_to_string(path)?)?;
        info!("[Gateway] replaying {} event(s)", events.len());
        for event in events {
            if let Err(e) = gateway.apply_event(event) {
                warn!("[Gateway] event dropped: {}", e);
            }
        }
    }

    if cli.toggle {
        let switches = bridged.lock().clone();
        toggle_all(&switches, true).await;
        toggle_all(&switches, false).await;
    }

    info!("deCONZ switch bridge is running");
    info!("  - {} switch(es) bridged", bridged.lock().len());
    info!("  - Press Ctrl+C to exit");

    signal::ctrl_c().await?;

    info!("Shutting down...");
    let released = session.unload();
    info!("Released {} session resource(s)", released);
    Ok(())
}

/// Host side of the bridge: log and keep every entity handed over.
fn host_sink(bridged: Bridged) -> AddEntities {
    Arc::new(move |entities: Vec<Arc<dyn SwitchEntity>>| {
        for entity in &entities {
            info!(
                "[Host] + {} {:?} ({}) on={} available={}",
                entity.category(),
                entity.name(),
                entity.unique_id(),
                entity.is_on(),
                entity.available()
            );
        }
        bridged.lock().extend(entities);
    })
}

async fn toggle_all(switches: &[Arc<dyn SwitchEntity>], on: bool) {
    let results = join_all(switches.iter().map(|switch| async move {
        if on {
            switch.turn_on(TurnOptions::default()).await
        } else {
            switch.turn_off(TurnOptions::default()).await
        }
    }))
    .await;

    for (switch, result) in switches.iter().zip(results) {
        match result {
            Ok(()) => info!("[Host] {} -> on={}", switch.name(), switch.is_on()),
            Err(e) => warn!("[Host] {} failed: {}", switch.name(), e),
        }
    }
}
