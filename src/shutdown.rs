// Shutdown - the signals that end the listener's lifetime

use futures::future::select_all;
use tokio::signal::unix::{Signal, SignalKind, signal};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownSignal {
    Interrupt,
    Terminate,
    /// Controlling terminal went away
    Hangup,
}

impl ShutdownSignal {
    pub const ALL: [ShutdownSignal; 3] = [
        ShutdownSignal::Interrupt,
        ShutdownSignal::Terminate,
        ShutdownSignal::Hangup,
    ];

    fn kind(self) -> SignalKind {
        match self {
            ShutdownSignal::Interrupt => SignalKind::interrupt(),
            ShutdownSignal::Terminate => SignalKind::terminate(),
            ShutdownSignal::Hangup => SignalKind::hangup(),
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ShutdownSignal::Interrupt => "SIGINT (Ctrl+C) received",
            ShutdownSignal::Terminate => "SIGTERM received (likely from systemctl)",
            ShutdownSignal::Hangup => "SIGHUP received (terminal closed)",
        }
    }
}

/// Listens for every [`ShutdownSignal`] at once
pub struct ShutdownHandler {
    streams: Vec<(ShutdownSignal, Signal)>,
}

impl ShutdownHandler {
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let mut streams = Vec::with_capacity(ShutdownSignal::ALL.len());
        for shutdown in ShutdownSignal::ALL {
            streams.push((shutdown, signal(shutdown.kind())?));
        }
        Ok(Self { streams })
    }

    /// Resolves with whichever signal arrives first
    pub async fn wait_for_shutdown_signal(&mut self) -> ShutdownSignal {
        let waits = self.streams.iter_mut().map(|(shutdown, stream)| {
            let shutdown = *shutdown;
            Box::pin(async move {
                stream.recv().await;
                shutdown
            })
        });
        let (shutdown, _, _) = select_all(waits).await;
        shutdown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptions_name_the_signal() {
        assert!(ShutdownSignal::Interrupt.description().starts_with("SIGINT"));
        assert!(ShutdownSignal::Terminate.description().starts_with("SIGTERM"));
        assert!(ShutdownSignal::Hangup.description().starts_with("SIGHUP"));
    }

    #[test]
    fn each_shutdown_signal_maps_to_its_own_kind() {
        let kinds: Vec<i32> = ShutdownSignal::ALL
            .iter()
            .map(|shutdown| shutdown.kind().as_raw_value())
            .collect();
        assert_eq!(kinds.len(), 3);
        assert!(kinds.iter().all(|kind| kinds.iter().filter(|k| *k == kind).count() == 1));
    }

    #[tokio::test]
    async fn handler_listens_for_every_signal() {
        let handler = ShutdownHandler::new().unwrap();
        let listened: Vec<ShutdownSignal> = handler.streams.iter().map(|(s, _)| *s).collect();
        assert_eq!(listened, ShutdownSignal::ALL);
    }
}
