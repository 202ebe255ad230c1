//! Record types produced by switch inventory queries.

use serde::Serialize;
use std::fmt;

use crate::portlist::PortList;

/// IANA ifType code (IF-MIB `ifType`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct IfType(pub u32);

impl IfType {
    /// ethernetCsmacd
    pub const ETHERNET: IfType = IfType(6);
    /// softwareLoopback
    pub const LOOPBACK: IfType = IfType(24);
    /// propVirtual
    pub const VIRTUAL: IfType = IfType(53);
    /// l2vlan
    pub const L2_VLAN: IfType = IfType(135);
    /// ieee8023adLag
    pub const LAG: IfType = IfType(161);

    /// Short human name for the interface kinds switches commonly report.
    pub fn describe(&self) -> Option<&'static str> {
        match *self {
            IfType::ETHERNET => Some("ethernet"),
            IfType::LOOPBACK => Some("loopback"),
            IfType::VIRTUAL => Some("virtual"),
            IfType::L2_VLAN => Some("vlan"),
            IfType::LAG => Some("LAG"),
            _ => None,
        }
    }
}

/// IF-MIB `ifAdminStatus`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminStatus {
    Up,
    Down,
    Testing,
    /// Unreported or out-of-range code.
    Other(i64),
}

impl Default for AdminStatus {
    fn default() -> Self {
        AdminStatus::Other(0)
    }
}

impl From<i64> for AdminStatus {
    fn from(code: i64) -> Self {
        match code {
            1 => AdminStatus::Up,
            2 => AdminStatus::Down,
            3 => AdminStatus::Testing,
            other => AdminStatus::Other(other),
        }
    }
}

impl AdminStatus {
    /// Returns the MIB code.
    pub fn code(&self) -> i64 {
        match self {
            AdminStatus::Up => 1,
            AdminStatus::Down => 2,
            AdminStatus::Testing => 3,
            AdminStatus::Other(code) => *code,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AdminStatus::Up => "up",
            AdminStatus::Down => "down",
            AdminStatus::Testing => "testing",
            AdminStatus::Other(_) => "unknown",
        }
    }
}

/// IF-MIB `ifOperStatus`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OperStatus {
    Up,
    Down,
    Testing,
    Unknown,
    Dormant,
    NotPresent,
    LowerLayerDown,
    /// Unreported or out-of-range code.
    Other(i64),
}

impl Default for OperStatus {
    fn default() -> Self {
        OperStatus::Other(0)
    }
}

impl From<i64> for OperStatus {
    fn from(code: i64) -> Self {
        match code {
            1 => OperStatus::Up,
            2 => OperStatus::Down,
            3 => OperStatus::Testing,
            4 => OperStatus::Unknown,
            5 => OperStatus::Dormant,
            6 => OperStatus::NotPresent,
            7 => OperStatus::LowerLayerDown,
            other => OperStatus::Other(other),
        }
    }
}

impl OperStatus {
    /// Returns the MIB code.
    pub fn code(&self) -> i64 {
        match self {
            OperStatus::Up => 1,
            OperStatus::Down => 2,
            OperStatus::Testing => 3,
            OperStatus::Unknown => 4,
            OperStatus::Dormant => 5,
            OperStatus::NotPresent => 6,
            OperStatus::LowerLayerDown => 7,
            OperStatus::Other(code) => *code,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OperStatus::Up => "up",
            OperStatus::Down => "down",
            OperStatus::Testing => "testing",
            OperStatus::Unknown => "unknown",
            OperStatus::Dormant => "dormant",
            OperStatus::NotPresent => "not-present",
            OperStatus::LowerLayerDown => "lower-down",
            OperStatus::Other(_) => "unreported",
        }
    }
}

/// One switch port or logical interface.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Interface {
    /// Device-wide ifIndex.
    pub index: u32,
    /// dot1dBasePort number used to address PortLists; 0 if the interface
    /// is not a bridge port.
    pub bridge_index: u32,
    /// `ifDescr`, followed by `ifAlias` when the device reports one.
    pub label: String,
    /// IANA ifType.
    pub kind: IfType,
    pub admin_status: AdminStatus,
    pub oper_status: OperStatus,
}

impl Interface {
    /// Creates an interface record with only its ifIndex known.
    pub fn new(index: u32) -> Self {
        Self {
            index,
            ..Default::default()
        }
    }

    /// Returns true if the interface is a member of the bridge.
    pub fn is_bridge_port(&self) -> bool {
        self.bridge_index != 0
    }
}

/// One 802.1Q VLAN.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Vlan {
    /// VLAN ID.
    pub index: u16,
    pub name: String,
    /// Ports that forward frames for this VLAN, tagged or untagged.
    pub egress_ports: PortList,
    /// Ports that transmit this VLAN's frames untagged.
    pub access_ports: PortList,
}

impl Vlan {
    /// Creates a VLAN with empty membership.
    pub fn new(index: u16) -> Self {
        Self {
            index,
            name: String::new(),
            egress_ports: PortList::default(),
            access_ports: PortList::default(),
        }
    }
}

/// A directly attached device discovered through the LLDP remote table.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Neighbor {
    /// Local port the neighbor was seen on.
    pub local_if_index: u32,
    /// Remote chassis ID, normally a MAC address.
    #[serde(serialize_with = "serialize_mac")]
    pub remote_mac: Vec<u8>,
    pub remote_name: String,
    pub remote_port_name: String,
    pub remote_description: String,
}

impl Neighbor {
    /// Creates a neighbor seeded from its chassis ID row.
    pub fn new(local_if_index: u32, remote_mac: Vec<u8>) -> Self {
        Self {
            local_if_index,
            remote_mac,
            ..Default::default()
        }
    }

    /// Returns the chassis ID as contiguous lowercase hex (`001122aabbcc`).
    pub fn mac_hex(&self) -> String {
        MacHex(&self.remote_mac).to_string()
    }
}

struct MacHex<'a>(&'a [u8]);

impl fmt::Display for MacHex<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.0 {
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

fn serialize_mac<S: serde::Serializer>(mac: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&MacHex(mac))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AdminStatus::from(1), AdminStatus::Up);
        assert_eq!(AdminStatus::from(9), AdminStatus::Other(9));
        assert_eq!(AdminStatus::Testing.code(), 3);
        assert_eq!(OperStatus::from(7), OperStatus::LowerLayerDown);
        assert_eq!(OperStatus::from(6).as_str(), "not-present");
        assert_eq!(OperStatus::Dormant.code(), 5);
    }

    #[test]
    fn test_if_type_describe() {
        assert_eq!(IfType(6).describe(), Some("ethernet"));
        assert_eq!(IfType(161).describe(), Some("LAG"));
        assert_eq!(IfType(1).describe(), None);
    }

    #[test]
    fn test_interface_new() {
        let ifx = Interface::new(5);
        assert_eq!(ifx.index, 5);
        assert!(!ifx.is_bridge_port());
        assert_eq!(ifx.admin_status, AdminStatus::Other(0));
    }

    #[test]
    fn test_neighbor_mac_hex() {
        let n = Neighbor::new(3, vec![0x00, 0x1b, 0x21, 0xaa, 0xbb, 0x0c]);
        assert_eq!(n.mac_hex(), "001b21aabb0c");
    }

    #[test]
    fn test_neighbor_serialize() {
        let n = Neighbor::new(3, vec![0xde, 0xad]);
        let json = serde_json::to_value(&n).unwrap();
        assert_eq!(json["remote_mac"], "dead");
        assert_eq!(json["local_if_index"], 3);
    }
}
