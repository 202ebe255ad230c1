//! Switch controller trait and input validation.
//!
//! Every switch driver implements [`SwitchControl`]. Callers (the CLI,
//! automation scripts) obtain a controller bound to one device and invoke
//! read-only inventory queries and read-modify-write mutations on it.

use async_trait::async_trait;
use std::collections::BTreeMap;

use crate::error::{SwitchError, SwitchResult};
use crate::types::{Interface, Neighbor, Vlan};

/// Lowest assignable 802.1Q VLAN ID.
pub const MIN_VLAN_ID: u16 = 1;

/// Highest assignable 802.1Q VLAN ID.
pub const MAX_VLAN_ID: u16 = 4094;

/// Operations a switch driver exposes.
///
/// Implementations hold one session to one device. Methods take `&mut self`
/// so two operations can never be in flight on the same controller.
///
/// Mutations are not transactional: each touched VLAN costs separate
/// writes, and a failure part way leaves the device partially updated.
#[async_trait]
pub trait SwitchControl: Send {
    /// Returns the driver name, used for logging.
    fn driver_name(&self) -> &str;

    /// Enumerates the device's interfaces.
    async fn interfaces(&mut self) -> SwitchResult<Vec<Interface>>;

    /// Enumerates the device's static VLANs, ordered by VLAN ID.
    async fn vlans(&mut self) -> SwitchResult<Vec<Vlan>>;

    /// Enumerates LLDP neighbors keyed by local port.
    async fn neighbors(&mut self) -> SwitchResult<BTreeMap<u32, Neighbor>>;

    /// Creates a VLAN.
    async fn create_vlan(&mut self, vlan: u16) -> SwitchResult<()>;

    /// Deletes a VLAN.
    async fn delete_vlan(&mut self, vlan: u16) -> SwitchResult<()>;

    /// Makes `ports` untagged (access) members of `vlan`.
    async fn set_port_access(&mut self, ports: &[u32], vlan: u16) -> SwitchResult<()>;

    /// Makes `ports` tagged (trunk) members of each VLAN in `vlans`.
    async fn set_port_trunk(&mut self, ports: &[u32], vlans: &[u16]) -> SwitchResult<()>;

    /// Removes `ports` from every VLAN.
    async fn clear_ports(&mut self, ports: &[u32]) -> SwitchResult<()>;
}

/// Rejects VLAN IDs outside 1..=4094.
pub fn validate_vlan_id(vlan: u16) -> SwitchResult<u16> {
    if (MIN_VLAN_ID..=MAX_VLAN_ID).contains(&vlan) {
        Ok(vlan)
    } else {
        Err(SwitchError::InvalidVlan {
            vlan: u32::from(vlan),
        })
    }
}

/// Rejects port 0; bridge ports are numbered from 1.
pub fn validate_ports(ports: &[u32]) -> SwitchResult<()> {
    match ports.iter().find(|&&p| p == 0) {
        Some(&port) => Err(SwitchError::InvalidPort { port }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    #[test]
    fn test_validate_vlan_id() {
        assert_eq!(validate_vlan_id(1).unwrap(), 1);
        assert_eq!(validate_vlan_id(4094).unwrap(), 4094);
        assert_err!(validate_vlan_id(0));
        assert_err!(validate_vlan_id(4095));
    }

    #[test]
    fn test_validate_ports() {
        assert_ok!(validate_ports(&[1, 2, 48]));
        assert_ok!(validate_ports(&[]));
        match validate_ports(&[3, 0]) {
            Err(SwitchError::InvalidPort { port }) => assert_eq!(port, 0),
            other => panic!("Expected InvalidPort, got {:?}", other),
        }
    }
}
