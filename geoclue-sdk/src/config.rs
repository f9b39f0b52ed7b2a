//! Settings for a [`crate::GeoclueSystem`]

use std::path::PathBuf;
use std::time::Duration;

use geoclue_api::{AccuracyLevel, BusKind, ClientConfig, Requirements, ResourceFlags};
use geoclue_providers::DEFAULT_PROVIDERS_PATH;

use crate::error::{Result, SdkError};

/// Where to find providers and what to ask the service for
#[derive(Debug, Clone, PartialEq)]
pub struct LocationConfig {
    /// Directory holding `.provider` descriptor files
    pub providers_path: PathBuf,

    /// Accuracy requested at initialization
    pub accuracy: AccuracyLevel,

    /// Resources providers may use
    pub resources: ResourceFlags,

    /// Bound on every remote call
    pub call_timeout: Duration,

    /// Bus the service lives on
    pub bus: BusKind,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            providers_path: PathBuf::from(DEFAULT_PROVIDERS_PATH),
            accuracy: AccuracyLevel::Country,
            resources: ResourceFlags::NETWORK,
            call_timeout: Duration::from_secs(10),
            bus: BusKind::Session,
        }
    }
}

impl LocationConfig {
    /// Street-level accuracy from any resource, GPS included
    pub fn precise() -> Self {
        Self {
            accuracy: AccuracyLevel::Detailed,
            resources: ResourceFlags::ALL,
            ..Default::default()
        }
    }

    /// Country-level accuracy from the network only
    pub fn coarse() -> Self {
        Self::default()
    }

    pub fn with_providers_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.providers_path = path.into();
        self
    }

    pub fn with_accuracy(mut self, accuracy: AccuracyLevel) -> Self {
        self.accuracy = accuracy;
        self
    }

    pub fn with_resources(mut self, resources: ResourceFlags) -> Self {
        self.resources = resources;
        self
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    pub fn with_bus(mut self, bus: BusKind) -> Self {
        self.bus = bus;
        self
    }

    /// Defaults overridden by `GEOCLUE_PROVIDERS_PATH`, `GEOCLUE_BUS` and
    /// `GEOCLUE_CALL_TIMEOUT_MS`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(path) = lookup("GEOCLUE_PROVIDERS_PATH") {
            config.providers_path = PathBuf::from(path);
        }

        if let Some(bus) = lookup("GEOCLUE_BUS") {
            config.bus = bus
                .parse()
                .map_err(|_| SdkError::InvalidConfig(format!("GEOCLUE_BUS='{}'", bus)))?;
        }

        if let Some(ms) = lookup("GEOCLUE_CALL_TIMEOUT_MS") {
            let millis: u64 = ms.trim().parse().map_err(|_| {
                SdkError::InvalidConfig(format!("GEOCLUE_CALL_TIMEOUT_MS='{}'", ms))
            })?;
            config.call_timeout = Duration::from_millis(millis);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.call_timeout.is_zero() {
            return Err(SdkError::InvalidConfig(
                "call timeout must be greater than zero".to_string(),
            ));
        }
        if self.resources.is_empty() {
            return Err(SdkError::InvalidConfig(
                "at least one resource must be allowed".to_string(),
            ));
        }
        Ok(())
    }

    /// Requirements handed to the service at initialization
    pub fn requirements(&self) -> Requirements {
        Requirements::new(self.accuracy, self.resources)
    }

    pub(crate) fn client_config(&self) -> ClientConfig {
        ClientConfig {
            bus: self.bus,
            call_timeout: self.call_timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = LocationConfig::default();
        assert_eq!(config.providers_path, PathBuf::from("/usr/share/geoclue-providers"));
        assert_eq!(config.accuracy, AccuracyLevel::Country);
        assert_eq!(config.resources, ResourceFlags::NETWORK);
        assert_eq!(config.bus, BusKind::Session);
    }

    #[test]
    fn test_presets_and_setters() {
        let config = LocationConfig::precise()
            .with_providers_path("/tmp/providers")
            .with_call_timeout(Duration::from_millis(250));
        assert_eq!(config.accuracy, AccuracyLevel::Detailed);
        assert_eq!(config.resources, ResourceFlags::ALL);
        assert_eq!(config.providers_path, PathBuf::from("/tmp/providers"));
        assert_eq!(config.call_timeout, Duration::from_millis(250));
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config = LocationConfig::from_lookup(lookup_from(&[
            ("GEOCLUE_PROVIDERS_PATH", "/opt/providers"),
            ("GEOCLUE_BUS", "system"),
            ("GEOCLUE_CALL_TIMEOUT_MS", "1500"),
        ]))
        .unwrap();

        assert_eq!(config.providers_path, PathBuf::from("/opt/providers"));
        assert_eq!(config.bus, BusKind::System);
        assert_eq!(config.call_timeout, Duration::from_millis(1500));
    }

    #[test]
    fn test_from_lookup_rejects_bad_values() {
        let err = LocationConfig::from_lookup(lookup_from(&[("GEOCLUE_BUS", "satellite")]))
            .unwrap_err();
        assert!(matches!(err, SdkError::InvalidConfig(_)));

        let err = LocationConfig::from_lookup(lookup_from(&[("GEOCLUE_CALL_TIMEOUT_MS", "0")]))
            .unwrap_err();
        assert!(matches!(err, SdkError::InvalidConfig(_)));
    }

    #[test]
    fn test_requirements_from_config() {
        let req = LocationConfig::default().requirements();
        assert_eq!(req.accuracy, AccuracyLevel::Country);
        assert_eq!(req.min_time, 0);
        assert!(req.require_updates);
    }
}
