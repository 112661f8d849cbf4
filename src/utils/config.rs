use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Where power events come from
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    UPower,
    Sysfs,
    /// UPower when reachable, sysfs otherwise
    #[default]
    Auto,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    #[default]
    Normal,
    Critical,
}

impl Urgency {
    /// Value of the freedesktop `urgency` hint
    pub fn level(&self) -> u8 {
        match self {
            Urgency::Low => 0,
            Urgency::Normal => 1,
            Urgency::Critical => 2,
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Urgency::Low | Urgency::Normal => "battery",
            Urgency::Critical => "dialog-warning",
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct NotificationConfig {
    pub enabled: bool,
    pub urgency: Urgency,
    pub timeout_ms: u32,
    pub connected_body: String,
    pub disconnected_body: String,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            urgency: Urgency::Normal,
            timeout_ms: 5000,
            connected_body: "Charger plugged in".to_string(),
            disconnected_body: "Running on battery".to_string(),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Config {
    pub log_level: String,
    pub source: SourceKind,
    pub poll_interval_ms: u64,
    pub power_supply_path: String,
    pub notification: NotificationConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            source: SourceKind::Auto,
            poll_interval_ms: 2000,
            power_supply_path: "/sys/class/power_supply".to_string(),
            notification: NotificationConfig::default(),
        }
    }
}

impl Config {
    /// Load the config file, or the defaults when there is none
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = Self::get_config_path()?;
        if !Path::new(&config_path).exists() {
            return Ok(Self::default());
        }
        Self::load_from_file(&config_path)
    }

    pub fn get_config_path() -> Result<String, Box<dyn std::error::Error>> {
        #[cfg(debug_assertions)]
        {
            // In debug mode, look for config.toml in the current directory
            Ok("config.toml".to_string())
        }

        #[cfg(not(debug_assertions))]
        {
            let home = std::env::var("HOME").map_err(|_| "HOME environment variable not set")?;
            Ok(format!("{}/.config/plugwatch/config.toml", home))
        }
    }

    pub fn load_from_file(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config: Config = toml::from_str(contents)?;
        config
            .validate()
            .map_err(|e| format!("Configuration error: {}", e))?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.poll_interval_ms == 0 {
            return Err("poll_interval_ms must be greater than zero".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_file_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.source, SourceKind::Auto);
        assert_eq!(config.poll_interval_ms, 2000);
        assert_eq!(config.power_supply_path, "/sys/class/power_supply");
        assert!(!config.notification.enabled);
    }

    #[test]
    fn parses_full_file() {
        let config = Config::parse(
            r#"
            log_level = "debug"
            source = "upower"
            poll_interval_ms = 500
            power_supply_path = "/tmp/supplies"

            [notification]
            enabled = true
            urgency = "critical"
            timeout_ms = 1000
            connected_body = "plugged"
            disconnected_body = "unplugged"
            "#,
        )
        .unwrap();

        assert_eq!(config.log_level, "debug");
        assert_eq!(config.source, SourceKind::UPower);
        assert_eq!(config.poll_interval_ms, 500);
        assert_eq!(config.power_supply_path, "/tmp/supplies");
        assert!(config.notification.enabled);
        assert_eq!(config.notification.urgency, Urgency::Critical);
        assert_eq!(config.notification.timeout_ms, 1000);
        assert_eq!(config.notification.connected_body, "plugged");
        assert_eq!(config.notification.disconnected_body, "unplugged");
    }

    #[test]
    fn partial_notification_table_keeps_other_defaults() {
        let config = Config::parse("[notification]\nenabled = true\n").unwrap();
        assert!(config.notification.enabled);
        assert_eq!(config.notification.urgency, Urgency::Normal);
        assert_eq!(config.notification.connected_body, "Charger plugged in");
    }

    #[test]
    fn zero_poll_interval_is_rejected() {
        let err = Config::parse("poll_interval_ms = 0").unwrap_err();
        assert!(err.to_string().contains("poll_interval_ms"));
    }

    #[test]
    fn unknown_source_is_rejected() {
        assert!(Config::parse("source = \"acpi\"").is_err());
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "source = \"sysfs\"").unwrap();

        let config = Config::load_from_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.source, SourceKind::Sysfs);
    }

    #[test]
    fn urgency_levels_follow_freedesktop_hints() {
        assert_eq!(Urgency::Low.level(), 0);
        assert_eq!(Urgency::Normal.level(), 1);
        assert_eq!(Urgency::Critical.level(), 2);
        assert_eq!(Urgency::Critical.icon(), "dialog-warning");
    }
}
