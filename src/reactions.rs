// Reactions - what happens when the power state changes

use tracing::{info, warn};

use crate::dbus::Notifier;
use crate::power::{PowerEvent, Reaction};
use crate::utils::config::NotificationConfig;

/// Logs every power event and optionally shows it as a desktop notification
pub struct Announcer {
    notifier: Option<Notifier>,
    connected_body: String,
    disconnected_body: String,
}

impl Announcer {
    pub fn new(notifier: Option<Notifier>, config: &NotificationConfig) -> Self {
        Self {
            notifier,
            connected_body: config.connected_body.clone(),
            disconnected_body: config.disconnected_body.clone(),
        }
    }

    /// Build from config, degrading to log-only when notifications are off or unreachable
    pub async fn from_config(config: &NotificationConfig) -> Self {
        let notifier = if config.enabled {
            match Notifier::connect(config).await {
                Ok(notifier) => Some(notifier),
                Err(e) => {
                    warn!("Desktop notifications unavailable: {}", e);
                    None
                }
            }
        } else {
            None
        };
        Self::new(notifier, config)
    }

    pub fn body(&self, event: PowerEvent) -> &str {
        match event {
            PowerEvent::Connected => &self.connected_body,
            PowerEvent::Disconnected => &self.disconnected_body,
        }
    }
}

impl Reaction for Announcer {
    async fn react(&mut self, event: PowerEvent) {
        info!(event = event.label(), "{}", event.title());

        if let Some(notifier) = &self.notifier {
            if let Err(e) = notifier.notify(event.title(), self.body(event)).await {
                warn!("Failed to show {} notification: {}", event, e);
            }
        }
    }
}
