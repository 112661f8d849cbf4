// Power module - power-state events and the in-process bus that delivers them

mod bus;

pub use bus::{PowerBus, PowerSender, Reaction, Registration};

/// Power-state notification produced by a source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerEvent {
    Connected,
    Disconnected,
}

impl PowerEvent {
    /// UPower reports `OnBattery`, which is true while unplugged
    pub fn from_on_battery(on_battery: bool) -> Self {
        if on_battery {
            PowerEvent::Disconnected
        } else {
            PowerEvent::Connected
        }
    }

    /// sysfs reports `online`, which is true while a charger is attached
    pub fn from_online(online: bool) -> Self {
        if online {
            PowerEvent::Connected
        } else {
            PowerEvent::Disconnected
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PowerEvent::Connected => "connected",
            PowerEvent::Disconnected => "disconnected",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            PowerEvent::Connected => "Power connected",
            PowerEvent::Disconnected => "Power disconnected",
        }
    }
}

impl std::fmt::Display for PowerEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Turns a stream of raw observations into transitions.
///
/// The first observation only sets the baseline; afterwards an event is
/// returned whenever the observed state differs from the previous one.
#[derive(Debug, Default)]
pub struct Transition {
    last: Option<PowerEvent>,
}

impl Transition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a known state so the next differing observation is reported
    pub fn with_baseline(state: PowerEvent) -> Self {
        Self { last: Some(state) }
    }

    pub fn observe(&mut self, state: PowerEvent) -> Option<PowerEvent> {
        match self.last.replace(state) {
            Some(previous) if previous != state => Some(state),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn on_battery_maps_to_disconnected() {
        assert_eq!(PowerEvent::from_on_battery(true), PowerEvent::Disconnected);
        assert_eq!(PowerEvent::from_on_battery(false), PowerEvent::Connected);
    }

    #[test]
    fn online_maps_to_connected() {
        assert_eq!(PowerEvent::from_online(true), PowerEvent::Connected);
        assert_eq!(PowerEvent::from_online(false), PowerEvent::Disconnected);
    }

    #[test]
    fn labels_are_lowercase() {
        assert_eq!(PowerEvent::Connected.label(), "connected");
        assert_eq!(PowerEvent::Disconnected.to_string(), "disconnected");
    }

    #[test]
    fn first_observation_is_baseline_only() {
        let mut transition = Transition::new();
        assert_eq!(transition.observe(PowerEvent::Connected), None);
        assert_eq!(
            transition.observe(PowerEvent::Disconnected),
            Some(PowerEvent::Disconnected)
        );
    }

    #[test]
    fn repeated_state_is_suppressed() {
        let mut transition = Transition::with_baseline(PowerEvent::Connected);
        assert_eq!(transition.observe(PowerEvent::Connected), None);
        assert_eq!(
            transition.observe(PowerEvent::Disconnected),
            Some(PowerEvent::Disconnected)
        );
        assert_eq!(transition.observe(PowerEvent::Disconnected), None);
        assert_eq!(
            transition.observe(PowerEvent::Connected),
            Some(PowerEvent::Connected)
        );
    }
}
