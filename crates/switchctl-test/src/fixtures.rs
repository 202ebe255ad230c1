//! Test fixtures for switch MIB layouts
//!
//! [`SwitchFixture`] builds a [`MockAgent`] populated the way a Q-BRIDGE
//! switch reports itself: IF-MIB interfaces, the bridge port map, static and
//! current VLAN rows and LLDP remote entries.

use switchctl_common::{PortList, SnmpValue};

use crate::agent::{mib, MockAgent};

/// IANA ifType ethernetCsmacd
pub const ETHERNET: i64 = 6;
/// IANA ifType softwareLoopback
pub const LOOPBACK: i64 = 24;
/// IANA ifType ieee8023adLag
pub const LAG: i64 = 161;

/// Builder for a mock switch.
#[derive(Debug, Clone)]
pub struct SwitchFixture {
    agent: MockAgent,
    port_count: usize,
    interfaces: u32,
}

impl Default for SwitchFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl SwitchFixture {
    /// Starts from an agent that reports nothing.
    pub fn new() -> Self {
        Self {
            agent: MockAgent::new(),
            port_count: 0,
            interfaces: 0,
        }
    }

    /// Sets `dot1dBaseNumPorts`, which sizes every PortList. Call before
    /// adding VLANs.
    pub fn with_bridge_ports(mut self, port_count: usize) -> Self {
        self.port_count = port_count;
        self.agent.insert(mib::DOT1D_BASE_NUM_PORTS, port_count as i64);
        self
    }

    /// Adds an ifTable row, administratively and operationally up.
    pub fn with_interface(self, if_index: u32, descr: &str, if_type: i64) -> Self {
        self.with_interface_status(if_index, descr, if_type, 1, 1)
    }

    /// Adds an ifTable row with explicit status codes.
    pub fn with_interface_status(
        mut self,
        if_index: u32,
        descr: &str,
        if_type: i64,
        admin: i64,
        oper: i64,
    ) -> Self {
        let cell = |column: u32| format!("{}.{}.{}", mib::IF_ENTRY, column, if_index);
        self.agent.insert(&cell(1), i64::from(if_index));
        self.agent.insert(&cell(2), descr);
        self.agent.insert(&cell(3), if_type);
        self.agent.insert(&cell(7), admin);
        self.agent.insert(&cell(8), oper);
        self.interfaces += 1;
        self.agent.insert(mib::IF_NUMBER, i64::from(self.interfaces));
        self
    }

    /// Sets the ifXTable alias of an interface.
    pub fn with_alias(mut self, if_index: u32, alias: &str) -> Self {
        self.agent
            .insert(&format!("{}.{}", mib::IF_ALIAS, if_index), alias);
        self
    }

    /// Maps a bridge port to an ifIndex.
    pub fn with_bridge_port(mut self, base_port: u32, if_index: u32) -> Self {
        self.agent.insert(
            &format!("{}.{}", mib::DOT1D_BASE_PORT_IF_INDEX, base_port),
            i64::from(if_index),
        );
        self
    }

    /// Adds an active static VLAN with the given 1-based member ports.
    pub fn with_vlan(mut self, vid: u16, name: &str, egress: &[u32], untagged: &[u32]) -> Self {
        let cell = |column: u32| format!("{}.{}.{}", mib::DOT1Q_VLAN_STATIC_ENTRY, column, vid);
        let egress = self.port_list(egress);
        let untagged = self.port_list(untagged);
        self.agent.insert(&cell(1), name);
        self.agent.insert(&cell(2), egress);
        self.agent.insert(&cell(4), untagged);
        self.agent.insert(&cell(5), 1i64);
        self.agent.insert(
            &format!("{}.3.0.{}", mib::DOT1Q_VLAN_CURRENT_ENTRY, vid),
            SnmpValue::Gauge32(u32::from(vid)),
        );
        self.agent.refresh_vlan_count();
        self
    }

    /// Adds a VLAN that is active but has no static row.
    pub fn with_dynamic_vlan(mut self, vid: u16) -> Self {
        self.agent.insert(
            &format!("{}.3.0.{}", mib::DOT1Q_VLAN_CURRENT_ENTRY, vid),
            SnmpValue::Gauge32(u32::from(vid)),
        );
        self
    }

    /// Adds a full LLDP remote entry seen on `local_port`.
    pub fn with_neighbor(
        mut self,
        local_port: u32,
        mac: &[u8],
        name: &str,
        port_name: &str,
        description: &str,
    ) -> Self {
        self.agent.insert(&lldp_cell(7, local_port), mac.to_vec());
        self.agent.insert(&lldp_cell(8, local_port), port_name);
        self.agent.insert(&lldp_cell(9, local_port), name);
        self.agent.insert(&lldp_cell(10, local_port), description);
        self
    }

    /// Adds a single LLDP remote table cell.
    pub fn with_lldp_cell(mut self, column: u32, local_port: u32, value: impl Into<SnmpValue>) -> Self {
        self.agent.insert(&lldp_cell(column, local_port), value);
        self
    }

    /// Stores an arbitrary object.
    pub fn with_object(mut self, oid: &str, value: impl Into<SnmpValue>) -> Self {
        self.agent.insert(oid, value);
        self
    }

    /// Lets the agent create VLAN rows on first PortList write.
    pub fn with_auto_create_rows(mut self) -> Self {
        self.agent = self.agent.with_auto_create_rows();
        self
    }

    pub fn build(self) -> MockAgent {
        self.agent
    }

    fn port_list(&self, ports: &[u32]) -> Vec<u8> {
        let mut list = PortList::zeroed(self.port_count);
        for &port in ports {
            list.set(port as usize - 1);
        }
        list.into_bytes()
    }
}

/// `lldpRemEntry.<column>.<timeMark 0>.<localPort>.<remIndex 1>`
pub fn lldp_cell(column: u32, local_port: u32) -> String {
    format!("{}.{}.0.{}.1", mib::LLDP_REM_ENTRY, column, local_port)
}

/// A 12-port lab switch.
///
/// - ifIndex 1 `mgmt0` and 2 `lo` are not bridge ports
/// - ifIndex 101..=112 `ge-0/0/0`..`ge-0/0/11` are bridge ports 1..=12
/// - ifIndex 200 `ae0` is a LAG, administratively down, not a bridge port
/// - VLAN 1 `default`: ports 1-10 untagged
/// - VLAN 101 `sales`: port 11 untagged, port 12 tagged
/// - VLAN 2003 `control`: port 12 tagged
/// - LLDP neighbors on ports 11 and 12
pub fn lab_switch() -> SwitchFixture {
    let mut fixture = SwitchFixture::new()
        .with_bridge_ports(12)
        .with_interface(1, "mgmt0", ETHERNET)
        .with_interface(2, "lo", LOOPBACK);

    for port in 1..=12u32 {
        let if_index = 100 + port;
        fixture = fixture
            .with_interface(if_index, &format!("ge-0/0/{}", port - 1), ETHERNET)
            .with_bridge_port(port, if_index);
    }

    let access: Vec<u32> = (1..=10).collect();
    fixture
        .with_interface_status(200, "ae0", LAG, 2, 2)
        .with_alias(111, "uplink")
        .with_vlan(1, "default", &access, &access)
        .with_vlan(101, "sales", &[11, 12], &[11])
        .with_vlan(2003, "control", &[12], &[])
        .with_neighbor(
            11,
            &[0x00, 0x1b, 0x21, 0x0a, 0x0b, 0x0c],
            "node-a",
            "eth0",
            "Debian GNU/Linux 12",
        )
        .with_neighbor(
            12,
            &[0x3c, 0xfd, 0xfe, 0x01, 0x02, 0x03],
            "storage01",
            "ens1f0",
            "FreeBSD 14.1",
        )
}
