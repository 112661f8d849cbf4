mod dbus;
mod listener;
mod power;
mod reactions;
mod shutdown;
mod sysfs;
mod utils;

use tracing::info;

use listener::Listener;
use shutdown::ShutdownHandler;
use utils::{Config, VersionInfo, init_tracing};

// The static screen shown while the listener runs
const SCREEN: [&str; 2] = ["Broadcast Receiver", "Plug or unplug charger to test"];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    init_tracing(&config.log_level)?;

    let version = VersionInfo::get();
    info!(
        "Starting {} v{} ({})",
        version.name, version.version, version.repository
    );
    for line in SCREEN {
        info!("{}", line);
    }

    let mut shutdown = ShutdownHandler::new()?;
    let listener = Listener::start(&config).await?;

    let signal = shutdown.wait_for_shutdown_signal().await;
    info!("{}, shutting down", signal.description());
    listener.stop();

    Ok(())
}
