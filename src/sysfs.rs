// sysfs power source - polls /sys/class/power_supply for hosts without UPower

use std::io;
use std::path::{Path, PathBuf};

use tokio::time::{self, Duration, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::power::{PowerEvent, PowerSender, Transition};
use crate::utils::Config;

pub struct SysfsSource {
    root: PathBuf,
    interval: Duration,
    transition: Transition,
    failing: bool,
}

impl SysfsSource {
    pub fn new(root: impl Into<PathBuf>, interval: Duration) -> Self {
        Self {
            root: root.into(),
            interval,
            transition: Transition::new(),
            failing: false,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.power_supply_path,
            Duration::from_millis(config.poll_interval_ms),
        )
    }

    pub async fn run(mut self, sender: PowerSender) {
        info!(
            "Polling {} every {:?} for power changes",
            self.root.display(),
            self.interval
        );
        let mut interval = time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            interval.tick().await;
            if let Some(event) = self.poll().await {
                debug!("sysfs transition to {}", event);
                sender.publish(event);
            }
        }
    }

    /// One polling step. A read failure is warned about once, then logged at
    /// debug level until a read succeeds again.
    async fn poll(&mut self) -> Option<PowerEvent> {
        match self.poll_once().await {
            Ok(event) => {
                if self.failing {
                    info!("Reading {} again", self.root.display());
                    self.failing = false;
                }
                event
            }
            Err(e) if self.failing => {
                debug!("Still failing to read {}: {}", self.root.display(), e);
                None
            }
            Err(e) => {
                warn!("Failed to read {}: {}", self.root.display(), e);
                self.failing = true;
                None
            }
        }
    }

    /// Read the supplies once; returns an event only on a transition
    pub async fn poll_once(&mut self) -> io::Result<Option<PowerEvent>> {
        match read_external_online(&self.root).await? {
            Some(online) => Ok(self.transition.observe(PowerEvent::from_online(online))),
            None => {
                debug!("No external power supply under {}", self.root.display());
                Ok(None)
            }
        }
    }
}

/// Whether any non-battery supply is online, or None if there are none to ask
async fn read_external_online(root: &Path) -> io::Result<Option<bool>> {
    let mut entries = tokio::fs::read_dir(root).await?;
    let mut seen = false;

    while let Some(entry) = entries.next_entry().await? {
        let supply = entry.path();
        if read_attribute(&supply, "type").await.as_deref() == Some("Battery") {
            continue;
        }
        match read_attribute(&supply, "online").await.as_deref() {
            Some("1") => return Ok(Some(true)),
            Some(_) => seen = true,
            None => debug!("Skipping {} without online attribute", supply.display()),
        }
    }

    Ok(seen.then_some(false))
}

async fn read_attribute(supply: &Path, name: &str) -> Option<String> {
    tokio::fs::read_to_string(supply.join(name))
        .await
        .ok()
        .map(|value| value.trim().to_string())
}
