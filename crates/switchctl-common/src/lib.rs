//! Common infrastructure for SNMP switch controllers.
//!
//! This crate provides the pieces every switch driver in the workspace
//! shares:
//!
//! - [`session`]: the SNMP session seam ([`SnmpSession`]) and its owned value model
//! - [`transport`]: the SNMPv2c/UDP backend implementing [`SnmpSession`]
//! - [`portlist`]: the RFC 2674 `PortList` bitmap codec
//! - [`types`]: interface, VLAN and LLDP neighbor records
//! - [`SwitchControl`]: the operations a switch driver exposes
//! - [`error`]: error types for switch operations
//!
//! # Architecture
//!
//! A driver owns exactly one session to one device. Inventory queries walk
//! the device's MIB tables and correlate them into records; mutations fetch
//! the current inventory, edit port bitmaps and write them back. Nothing is
//! cached between calls, every query re-walks the device.
//!
//! # Example
//!
//! ```ignore
//! use switchctl_common::{PortList, SessionConfig, UdpSession};
//!
//! let mut session = UdpSession::connect("10.47.1.5", &SessionConfig::default()).await?;
//! let rows = session.walk("1.3.6.1.2.1.17.7.1.4.3.1.2").await?;
//! for row in rows {
//!     if let Some(bytes) = row.value.as_bytes() {
//!         let ports = PortList::from(bytes);
//!         println!("{}: {:?}", row.oid, ports.ports().collect::<Vec<_>>());
//!     }
//! }
//! ```

pub mod config;
pub mod control;
pub mod error;
pub mod portlist;
pub mod session;
pub mod transport;
pub mod types;

// Re-export commonly used items at crate root
pub use config::{defaults, SessionConfig, VlanCreation};
pub use control::{validate_ports, validate_vlan_id, SwitchControl, MAX_VLAN_ID, MIN_VLAN_ID};
pub use error::{DeviceStatus, SwitchError, SwitchResult};
pub use portlist::PortList;
pub use session::{
    normalize_oid, oid_in_subtree, parse_oid, SetResponse, SnmpSession, SnmpValue, ValueKind, VarBind,
};
pub use transport::UdpSession;
pub use types::{AdminStatus, IfType, Interface, Neighbor, OperStatus, Vlan};
