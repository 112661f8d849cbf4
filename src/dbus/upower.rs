// UPower power source - follows the OnBattery property on the system bus

use futures::StreamExt;
use tracing::{debug, error, info};
use zbus::{Connection, proxy};

use crate::power::{PowerEvent, PowerSender, Transition};

#[proxy(
    interface = "org.freedesktop.UPower",
    default_service = "org.freedesktop.UPower",
    default_path = "/org/freedesktop/UPower"
)]
trait UPower {
    /// True while the machine runs on battery
    #[zbus(property)]
    fn on_battery(&self) -> zbus::Result<bool>;
}

pub struct UPowerSource {
    proxy: UPowerProxy<'static>,
    transition: Transition,
}

impl UPowerSource {
    /// Connect to the system bus and read the current power state.
    ///
    /// Fails when the system bus or the UPower service is unavailable, which
    /// lets the caller fall back to another source.
    pub async fn connect() -> zbus::Result<Self> {
        let connection = Connection::system().await?;
        debug!("Connected to system D-Bus");
        Self::with_connection(&connection).await
    }

    pub async fn with_connection(connection: &Connection) -> zbus::Result<Self> {
        let proxy = UPowerProxy::new(connection).await?;
        let on_battery = proxy.on_battery().await?;
        let initial = PowerEvent::from_on_battery(on_battery);
        info!("UPower reports power {}", initial);

        Ok(Self {
            proxy,
            transition: Transition::with_baseline(initial),
        })
    }

    /// Publish one event per OnBattery transition until the property stream ends
    pub async fn run(mut self, sender: PowerSender) -> zbus::Result<()> {
        let mut changes = self.proxy.receive_on_battery_changed().await;
        info!("Subscribed to UPower OnBattery changes");

        while let Some(change) = changes.next().await {
            match change.get().await {
                Ok(on_battery) => {
                    let observed = PowerEvent::from_on_battery(on_battery);
                    match self.transition.observe(observed) {
                        Some(event) => {
                            debug!("UPower transition to {}", event);
                            sender.publish(event);
                        }
                        None => debug!("Ignoring repeated OnBattery={}", on_battery),
                    }
                }
                Err(e) => error!("Failed to read OnBattery change: {}", e),
            }
        }

        debug!("UPower property stream ended");
        Ok(())
    }
}
