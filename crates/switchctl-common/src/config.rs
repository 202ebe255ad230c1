//! Session configuration.

use std::time::Duration;

use crate::error::{SwitchError, SwitchResult};

/// Default values for SNMP sessions.
pub mod defaults {
    use std::time::Duration;

    /// Community string used when none is configured.
    pub const COMMUNITY: &str = "public";

    /// Standard SNMP agent port.
    pub const PORT: u16 = 161;

    /// Per-request timeout.
    pub const TIMEOUT: Duration = Duration::from_secs(5);

    /// GETBULK max-repetitions used while walking.
    pub const MAX_REPETITIONS: u32 = 10;
}

/// How the driver brings a VLAN into existence when assigning access ports
/// to a VLAN the device does not report yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VlanCreation {
    /// Create the static VLAN row with `createAndGo` before writing its
    /// PortLists.
    #[default]
    Explicit,
    /// Write the PortLists directly and rely on the agent creating the
    /// static row on first write. Only some agents do this.
    ImplicitOnWrite,
}

impl VlanCreation {
    pub fn as_str(&self) -> &'static str {
        match self {
            VlanCreation::Explicit => "explicit",
            VlanCreation::ImplicitOnWrite => "implicit-on-write",
        }
    }
}

/// Settings for one SNMPv2c session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Read/write community string.
    pub community: String,
    /// Agent UDP port, used when the target carries none.
    pub port: u16,
    /// Per-request timeout.
    pub timeout: Duration,
    /// GETBULK max-repetitions.
    pub max_repetitions: u32,
    /// VLAN creation capability of the agent.
    pub vlan_creation: VlanCreation,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            community: defaults::COMMUNITY.to_string(),
            port: defaults::PORT,
            timeout: defaults::TIMEOUT,
            max_repetitions: defaults::MAX_REPETITIONS,
            vlan_creation: VlanCreation::default(),
        }
    }
}

impl SessionConfig {
    pub fn with_community(mut self, community: impl Into<String>) -> Self {
        self.community = community.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_repetitions(mut self, max_repetitions: u32) -> Self {
        self.max_repetitions = max_repetitions;
        self
    }

    pub fn with_vlan_creation(mut self, vlan_creation: VlanCreation) -> Self {
        self.vlan_creation = vlan_creation;
        self
    }

    /// Checks the configuration for values the transport cannot use.
    pub fn validate(&self) -> SwitchResult<()> {
        if self.community.is_empty() {
            return Err(SwitchError::config("community", "must not be empty"));
        }
        if self.port == 0 {
            return Err(SwitchError::config("port", "must not be 0"));
        }
        if self.timeout.is_zero() {
            return Err(SwitchError::config("timeout", "must be greater than zero"));
        }
        if self.max_repetitions == 0 {
            return Err(SwitchError::config("max_repetitions", "must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::assert_ok;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.community, "public");
        assert_eq!(config.port, 161);
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.vlan_creation, VlanCreation::Explicit);
        assert_ok!(config.validate());
    }

    #[test]
    fn test_builder() {
        let config = SessionConfig::default()
            .with_community("private")
            .with_port(11161)
            .with_timeout(Duration::from_millis(500))
            .with_max_repetitions(25)
            .with_vlan_creation(VlanCreation::ImplicitOnWrite);

        assert_eq!(config.community, "private");
        assert_eq!(config.port, 11161);
        assert_eq!(config.max_repetitions, 25);
        assert_eq!(config.vlan_creation.as_str(), "implicit-on-write");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(SessionConfig::default().with_community("").validate().is_err());
        assert!(SessionConfig::default().with_port(0).validate().is_err());
        assert!(SessionConfig::default()
            .with_timeout(Duration::ZERO)
            .validate()
            .is_err());
        assert!(SessionConfig::default()
            .with_max_repetitions(0)
            .validate()
            .is_err());
    }
}
