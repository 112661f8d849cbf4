use std::collections::HashMap;

use tracing::{debug, warn};
use zbus::zvariant::Value;
use zbus::{Connection, Proxy};

use crate::utils::config::{NotificationConfig, Urgency};

const APP_NAME: &str = "plugwatch";

/// Desktop notification ("toast") sender bound to one D-Bus connection
pub struct Notifier {
    proxy: Proxy<'static>,
    urgency: Urgency,
    timeout_ms: i32,
}

impl Notifier {
    /// Connect to the notification service, preferring the session bus
    pub async fn connect(config: &NotificationConfig) -> zbus::Result<Self> {
        let connection = match Connection::session().await {
            Ok(conn) => {
                debug!("Connected to session D-Bus for notifications");
                conn
            }
            Err(e) => {
                warn!("Failed to connect to session D-Bus: {}", e);
                debug!("Attempting to connect to system D-Bus as fallback");
                Connection::system().await?
            }
        };

        let proxy = Proxy::new(
            &connection,
            "org.freedesktop.Notifications",
            "/org/freedesktop/Notifications",
            "org.freedesktop.Notifications",
        )
        .await?;

        Ok(Self {
            proxy,
            urgency: config.urgency,
            timeout_ms: i32::try_from(config.timeout_ms).unwrap_or(i32::MAX),
        })
    }

    /// Show a notification and return the id the server assigned to it
    pub async fn notify(&self, summary: &str, body: &str) -> zbus::Result<u32> {
        let mut hints = HashMap::new();
        hints.insert("urgency", Value::U8(self.urgency.level()));
        hints.insert("category", Value::from("device"));

        let reply = self
            .proxy
            .call_method(
                "Notify",
                &(
                    APP_NAME,
                    0u32,
                    self.urgency.icon(),
                    summary,
                    body,
                    Vec::<String>::new(),
                    hints,
                    self.timeout(),
                ),
            )
            .await?;

        let id: u32 = reply.body().deserialize()?;
        debug!("Desktop notification sent (ID: {}): {}", id, summary);
        Ok(id)
    }

    // Critical notifications stay until dismissed
    fn timeout(&self) -> i32 {
        match self.urgency {
            Urgency::Critical => 0,
            _ => self.timeout_ms,
        }
    }
}
