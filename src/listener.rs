// Listener - owns the single power-bus registration for the lifetime of the program

use std::future::Future;

use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::dbus::UPowerSource;
use crate::power::{PowerBus, PowerSender, Reaction, Registration};
use crate::reactions::Announcer;
use crate::sysfs::SysfsSource;
use crate::utils::{Config, SourceKind};

/// Power source picked at startup
pub enum PowerSource {
    UPower(UPowerSource),
    Sysfs(SysfsSource),
}

impl PowerSource {
    pub async fn from_config(config: &Config) -> Result<Self, Box<dyn std::error::Error>> {
        match config.source {
            SourceKind::UPower => Ok(PowerSource::UPower(UPowerSource::connect().await?)),
            SourceKind::Sysfs => Ok(PowerSource::Sysfs(SysfsSource::from_config(config))),
            SourceKind::Auto => match UPowerSource::connect().await {
                Ok(source) => Ok(PowerSource::UPower(source)),
                Err(e) => {
                    warn!("UPower unavailable ({}), falling back to sysfs polling", e);
                    Ok(PowerSource::Sysfs(SysfsSource::from_config(config)))
                }
            },
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PowerSource::UPower(_) => "UPower",
            PowerSource::Sysfs(_) => "sysfs",
        }
    }

    pub async fn run(self, sender: PowerSender) {
        match self {
            PowerSource::UPower(source) => {
                if let Err(e) = source.run(sender).await {
                    warn!("UPower source stopped: {}", e);
                }
            }
            PowerSource::Sysfs(source) => source.run(sender).await,
        }
    }
}

pub struct Listener {
    bus: PowerBus,
    registration: Registration,
    source: JoinHandle<()>,
}

impl Listener {
    /// Resolve the configured source and register the announcer reaction
    pub async fn start(config: &Config) -> Result<Self, Box<dyn std::error::Error>> {
        let source = PowerSource::from_config(config).await?;
        info!("Using {} power source", source.name());

        let announcer = Announcer::from_config(&config.notification).await;
        Ok(Self::spawn(announcer, move |sender| source.run(sender)))
    }

    /// Register `reaction` once, then start the source feeding the bus.
    ///
    /// The registration exists before the source task starts, so no event the
    /// source publishes can be missed.
    pub fn spawn<R, F, Fut>(reaction: R, source: F) -> Self
    where
        R: Reaction,
        F: FnOnce(PowerSender) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let bus = PowerBus::default();
        let registration = bus.register(reaction);
        let source = tokio::spawn(source(bus.sender()));
        info!("Listening for power connected/disconnected events");

        Self {
            bus,
            registration,
            source,
        }
    }

    #[cfg(test)]
    pub fn sender(&self) -> PowerSender {
        self.bus.sender()
    }

    /// Deregister the reaction and stop the source
    pub fn stop(self) {
        let Self {
            bus,
            registration,
            source,
        } = self;

        registration.unregister();
        source.abort();
        drop(bus);
        info!("Stopped listening for power events");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::power::PowerEvent;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn source_events_reach_the_reaction_once_each() {
        let (tx, mut reactions) = mpsc::unbounded_channel();
        let listener = Listener::spawn(
            move |event: PowerEvent| {
                let _ = tx.send(event.label());
            },
            |sender| async move {
                sender.publish(PowerEvent::Connected);
                sender.publish(PowerEvent::Disconnected);
            },
        );

        assert_eq!(reactions.recv().await, Some("connected"));
        assert_eq!(reactions.recv().await, Some("disconnected"));

        listener.stop();
        assert_eq!(reactions.recv().await, None);
    }

    #[tokio::test]
    async fn stopped_listener_ignores_later_events() {
        let (tx, mut reactions) = mpsc::unbounded_channel();
        let listener = Listener::spawn(
            move |event: PowerEvent| {
                let _ = tx.send(event.label());
            },
            |_sender| std::future::pending::<()>(),
        );

        let sender = listener.sender();
        listener.stop();

        sender.publish(PowerEvent::Connected);
        sender.publish(PowerEvent::Disconnected);
        assert_eq!(reactions.recv().await, None);
    }

    #[tokio::test]
    async fn sysfs_source_is_used_when_configured() {
        let config = Config {
            source: SourceKind::Sysfs,
            ..Config::default()
        };
        let source = PowerSource::from_config(&config).await.unwrap();
        assert_eq!(source.name(), "sysfs");
    }
}
