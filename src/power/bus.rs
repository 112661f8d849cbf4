// In-process power bus - fans power events out to registered reactions

use std::future::Future;

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::PowerEvent;

const DEFAULT_CAPACITY: usize = 16;

/// Side-effect-only handler run once per delivered event
pub trait Reaction: Send + 'static {
    fn react(&mut self, event: PowerEvent) -> impl Future<Output = ()> + Send;
}

impl<F> Reaction for F
where
    F: FnMut(PowerEvent) + Send + 'static,
{
    fn react(&mut self, event: PowerEvent) -> impl Future<Output = ()> + Send {
        self(event);
        std::future::ready(())
    }
}

/// Cloneable publishing handle given to power sources
#[derive(Debug, Clone)]
pub struct PowerSender {
    sender: broadcast::Sender<PowerEvent>,
}

impl PowerSender {
    /// Returns how many registrations the event was handed to
    pub fn publish(&self, event: PowerEvent) -> usize {
        // An error only means nobody is registered right now
        self.sender.send(event).unwrap_or(0)
    }
}

pub struct PowerBus {
    sender: PowerSender,
}

impl PowerBus {
    /// A capacity of zero is treated as one
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender: PowerSender { sender },
        }
    }

    pub fn sender(&self) -> PowerSender {
        self.sender.clone()
    }

    /// Start delivering events to `reaction` until the returned handle is released.
    ///
    /// Must be called from within a tokio runtime. Events published after this
    /// returns are queued for the reaction even if its task has not run yet.
    pub fn register<R: Reaction>(&self, reaction: R) -> Registration {
        let receiver = self.sender.sender.subscribe();
        let (released, released_rx) = watch::channel(false);
        let task = tokio::spawn(deliver(receiver, released_rx, reaction));
        debug!("Registered power reaction");
        Registration {
            released,
            task: Some(task),
        }
    }
}

impl Default for PowerBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

async fn deliver<R: Reaction>(
    mut receiver: broadcast::Receiver<PowerEvent>,
    mut released: watch::Receiver<bool>,
    mut reaction: R,
) {
    loop {
        let received = tokio::select! {
            biased;
            _ = released.changed() => break,
            received = receiver.recv() => received,
        };
        // The release may land while this task is running on another worker
        if *released.borrow() {
            break;
        }

        match received {
            Ok(event) => reaction.react(event).await,
            Err(broadcast::error::RecvError::Closed) => {
                debug!("Power bus closed, stopping delivery");
                break;
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!("Power reaction lagged, skipped {} events", skipped);
            }
        }
    }
}

/// Scoped subscription to the power bus.
///
/// Releasing it, explicitly through [`Registration::unregister`] or by dropping
/// it, stops delivery: no reaction runs for events published afterwards.
pub struct Registration {
    released: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl Registration {
    pub fn unregister(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(task) = self.task.take() {
            self.released.send_replace(true);
            task.abort();
            debug!("Unregistered power reaction");
        }
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.release();
    }
}
