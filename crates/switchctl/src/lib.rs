//! switchctl - VLAN/port control and LLDP neighbor discovery over SNMP
//!
//! Drives switches through the standard Q-BRIDGE-MIB (RFC 2674), BRIDGE-MIB,
//! IF-MIB and LLDP-MIB tables. [`SnmpSwitch`] implements
//! [`switchctl_common::SwitchControl`] over any [`switchctl_common::SnmpSession`].

pub mod cli;
mod interfaces;
mod neighbors;
pub mod oids;
pub mod render;
mod switch;
mod vlans;
pub mod walk;

pub use interfaces::build_interfaces;
pub use neighbors::build_neighbors;
pub use switch::SnmpSwitch;
pub use vlans::build_vlans;
