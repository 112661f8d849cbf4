// Main dbus module - exports public API

mod notifications;
mod upower;

// Re-export public types and functions
pub use notifications::Notifier;
pub use upower::UPowerSource;
