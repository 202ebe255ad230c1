//! In-memory SNMP agent
//!
//! [`MockAgent`] stores a MIB view in OID order and serves `get`, `walk` and
//! `set` through [`SnmpSession`], so drivers can be exercised without a
//! device. Writes to the Q-BRIDGE static VLAN table follow RFC 2674 row
//! semantics closely enough to catch missing row creation, wrong PortList
//! lengths and double creation.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::ops::Bound;
use std::time::Duration;
use tracing::debug;

use switchctl_common::{
    parse_oid, SetResponse, SnmpSession, SnmpValue, SwitchError, SwitchResult, VarBind,
};

/// OIDs the agent and fixtures populate.
pub mod mib {
    pub const IF_NUMBER: &str = "1.3.6.1.2.1.2.1.0";
    pub const IF_ENTRY: &str = "1.3.6.1.2.1.2.2.1";
    pub const IF_ALIAS: &str = "1.3.6.1.2.1.31.1.1.1.18";
    pub const DOT1D_BASE_NUM_PORTS: &str = "1.3.6.1.2.1.17.1.2.0";
    pub const DOT1D_BASE_PORT_IF_INDEX: &str = "1.3.6.1.2.1.17.1.4.1.2";
    pub const DOT1Q_NUM_VLANS: &str = "1.3.6.1.2.1.17.7.1.1.4.0";
    pub const DOT1Q_VLAN_CURRENT_ENTRY: &str = "1.3.6.1.2.1.17.7.1.4.2.1";
    pub const DOT1Q_VLAN_STATIC_ENTRY: &str = "1.3.6.1.2.1.17.7.1.4.3.1";
    pub const LLDP_REM_ENTRY: &str = "1.0.8802.1.1.2.1.4.1.1";
}

// dot1qVlanStaticEntry columns
const STATIC_NAME: u64 = 1;
const STATIC_EGRESS: u64 = 2;
const STATIC_UNTAGGED: u64 = 4;
const STATIC_ROW_STATUS: u64 = 5;

// dot1qVlanCurrentEntry dot1qVlanFdbId
const CURRENT_FDB_ID: u64 = 3;

// RFC 3416 error-status codes the agent answers with
const WRONG_TYPE: u32 = 7;
const WRONG_LENGTH: u32 = 8;
const WRONG_VALUE: u32 = 10;
const NO_CREATION: u32 = 11;
const INCONSISTENT_VALUE: u32 = 12;
const NOT_WRITABLE: u32 = 17;

/// A failure injected for every request touching an OID prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// The request fails in transit.
    Transport,
    /// The request times out.
    Timeout,
    /// The agent answers with this error-status.
    Status(u32),
}

/// In-memory SNMP agent.
#[derive(Debug, Clone, Default)]
pub struct MockAgent {
    /// MIB view, ordered like an agent's lexicographic OID order
    objects: BTreeMap<Vec<u64>, SnmpValue>,

    /// Injected faults by OID prefix
    faults: Vec<(Vec<u64>, Fault)>,

    /// Create static VLAN rows on first PortList write
    auto_create_rows: bool,

    /// Every binding that reached the agent in a set request
    sets: Vec<VarBind>,

    /// Base OID of every walk
    walks: Vec<String>,
}

fn arcs(oid: &str) -> Vec<u64> {
    parse_oid(oid).unwrap_or_else(|e| panic!("invalid fixture OID {}: {}", oid, e))
}

fn dotted(arcs: &[u64]) -> String {
    arcs.iter()
        .map(|a| a.to_string())
        .collect::<Vec<_>>()
        .join(".")
}

impl MockAgent {
    /// Creates an agent with an empty MIB view.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the agent create static VLAN rows when a PortList is written
    /// to a row that does not exist, as some switches do.
    pub fn with_auto_create_rows(mut self) -> Self {
        self.auto_create_rows = true;
        self
    }

    /// Stores an object.
    pub fn insert(&mut self, oid: &str, value: impl Into<SnmpValue>) {
        self.objects.insert(arcs(oid), value.into());
    }

    /// Gets a stored object.
    pub fn value(&self, oid: &str) -> Option<&SnmpValue> {
        self.objects.get(&arcs(oid))
    }

    /// Fails every request addressing `prefix` or an OID below it. A walk
    /// fails if its base OID is at or below `prefix`.
    pub fn inject(&mut self, prefix: &str, fault: Fault) {
        self.faults.push((arcs(prefix), fault));
    }

    pub fn clear_faults(&mut self) {
        self.faults.clear();
    }

    /// Bindings received by set requests, in order.
    pub fn set_log(&self) -> &[VarBind] {
        &self.sets
    }

    /// Base OIDs of the walks served, in order.
    pub fn walk_log(&self) -> &[String] {
        &self.walks
    }

    /// VLAN IDs with a static row.
    pub fn static_vlans(&self) -> Vec<u16> {
        let name = static_cell(STATIC_NAME, 0);
        self.objects
            .keys()
            .filter(|k| k.len() == name.len() && k.starts_with(&name[..name.len() - 1]))
            .filter_map(|k| k.last().and_then(|&v| u16::try_from(v).ok()))
            .collect()
    }

    fn fault_for(&self, oid: &[u64]) -> Option<Fault> {
        self.faults
            .iter()
            .find(|(prefix, _)| oid.starts_with(prefix))
            .map(|(_, fault)| *fault)
    }

    fn fail(fault: Fault, operation: &str, oid: &str) -> SwitchError {
        match fault {
            Fault::Transport => SwitchError::transport(operation, oid, "injected transport failure"),
            Fault::Timeout => SwitchError::Timeout {
                oid: oid.to_string(),
                timeout: Duration::from_secs(5),
            },
            Fault::Status(code) => SwitchError::device(oid, code),
        }
    }

    /// Applies one binding to the staged view, returning an error-status
    /// on rejection.
    fn stage(&self, staged: &mut BTreeMap<Vec<u64>, SnmpValue>, binding: &VarBind) -> Result<(), u32> {
        let oid = parse_oid(&binding.oid).map_err(|_| NOT_WRITABLE)?;
        let table = arcs(mib::DOT1Q_VLAN_STATIC_ENTRY);
        if !oid.starts_with(&table) || oid.len() != table.len() + 2 {
            return Err(NOT_WRITABLE);
        }
        let column = oid[table.len()];
        let vid = oid[table.len() + 1];
        let exists = staged.contains_key(&static_cell(STATIC_NAME, vid));

        match (column, &binding.value) {
            (STATIC_ROW_STATUS, SnmpValue::Integer(status)) => match *status {
                // active
                1 if exists => Ok(()),
                // createAndGo
                4 if !exists => {
                    create_row(staged, vid);
                    Ok(())
                }
                1 | 4 => Err(INCONSISTENT_VALUE),
                // destroy
                6 => {
                    destroy_row(staged, vid);
                    Ok(())
                }
                _ => Err(WRONG_VALUE),
            },
            (STATIC_EGRESS | STATIC_UNTAGGED, SnmpValue::OctetString(bytes)) => {
                if !exists {
                    if !self.auto_create_rows {
                        return Err(NO_CREATION);
                    }
                    create_row(staged, vid);
                }
                if bytes.len() != port_list_len(staged) {
                    return Err(WRONG_LENGTH);
                }
                staged.insert(oid, binding.value.clone());
                Ok(())
            }
            (STATIC_NAME, SnmpValue::OctetString(_)) if exists => {
                staged.insert(oid, binding.value.clone());
                Ok(())
            }
            (STATIC_NAME, SnmpValue::OctetString(_)) => Err(NO_CREATION),
            (STATIC_NAME | STATIC_EGRESS | STATIC_UNTAGGED | STATIC_ROW_STATUS, _) => Err(WRONG_TYPE),
            _ => Err(NOT_WRITABLE),
        }
    }
}

fn static_cell(column: u64, vid: u64) -> Vec<u64> {
    let mut oid = arcs(mib::DOT1Q_VLAN_STATIC_ENTRY);
    oid.push(column);
    oid.push(vid);
    oid
}

fn current_cell(vid: u64) -> Vec<u64> {
    let mut oid = arcs(mib::DOT1Q_VLAN_CURRENT_ENTRY);
    oid.extend([CURRENT_FDB_ID, 0, vid]);
    oid
}

/// Bytes in every PortList, from `dot1dBaseNumPorts`.
fn port_list_len(objects: &BTreeMap<Vec<u64>, SnmpValue>) -> usize {
    objects
        .get(&arcs(mib::DOT1D_BASE_NUM_PORTS))
        .and_then(SnmpValue::as_u32)
        .map(|ports| (ports as usize).div_ceil(8))
        .unwrap_or(0)
}

fn create_row(objects: &mut BTreeMap<Vec<u64>, SnmpValue>, vid: u64) {
    let len = port_list_len(objects);
    objects.insert(
        static_cell(STATIC_NAME, vid),
        SnmpValue::from(format!("VLAN{:04}", vid).as_str()),
    );
    objects.insert(static_cell(STATIC_EGRESS, vid), SnmpValue::OctetString(vec![0; len]));
    objects.insert(static_cell(STATIC_UNTAGGED, vid), SnmpValue::OctetString(vec![0; len]));
    objects.insert(static_cell(STATIC_ROW_STATUS, vid), SnmpValue::Integer(1));
    objects.insert(current_cell(vid), SnmpValue::Gauge32(vid as u32));
    refresh_vlan_count(objects);
    debug!(vlan = vid, "Mock agent created static VLAN row");
}

fn destroy_row(objects: &mut BTreeMap<Vec<u64>, SnmpValue>, vid: u64) {
    let static_table = arcs(mib::DOT1Q_VLAN_STATIC_ENTRY);
    let current_table = arcs(mib::DOT1Q_VLAN_CURRENT_ENTRY);
    objects.retain(|k, _| {
        let in_static = k.starts_with(&static_table) && k.len() == static_table.len() + 2;
        let in_current = k.starts_with(&current_table) && k.len() == current_table.len() + 3;
        !((in_static || in_current) && k.last() == Some(&vid))
    });
    refresh_vlan_count(objects);
    debug!(vlan = vid, "Mock agent destroyed static VLAN row");
}

/// Keeps `dot1qNumVlans` equal to the number of static rows.
pub(crate) fn refresh_vlan_count(objects: &mut BTreeMap<Vec<u64>, SnmpValue>) {
    let name = static_cell(STATIC_NAME, 0);
    let count = objects
        .keys()
        .filter(|k| k.len() == name.len() && k.starts_with(&name[..name.len() - 1]))
        .count();
    objects.insert(arcs(mib::DOT1Q_NUM_VLANS), SnmpValue::Gauge32(count as u32));
}

impl MockAgent {
    /// Recomputes `dot1qNumVlans` after fixture edits.
    pub(crate) fn refresh_vlan_count(&mut self) {
        refresh_vlan_count(&mut self.objects);
    }
}

#[async_trait]
impl SnmpSession for MockAgent {
    async fn get(&mut self, oid: &str) -> SwitchResult<Option<SnmpValue>> {
        let name = parse_oid(oid)?;
        if let Some(fault) = self.fault_for(&name) {
            return Err(Self::fail(fault, "get", oid));
        }
        Ok(self.objects.get(&name).cloned())
    }

    async fn walk(&mut self, base: &str) -> SwitchResult<Vec<VarBind>> {
        let base_arcs = parse_oid(base)?;
        self.walks.push(dotted(&base_arcs));
        if let Some(fault) = self.fault_for(&base_arcs) {
            return Err(Self::fail(fault, "walk", base));
        }

        Ok(self
            .objects
            .range((Bound::Excluded(base_arcs.clone()), Bound::Unbounded))
            .take_while(|(k, _)| k.starts_with(&base_arcs))
            .map(|(k, v)| VarBind {
                oid: dotted(k),
                value: v.clone(),
            })
            .collect())
    }

    async fn set(&mut self, bindings: &[VarBind]) -> SwitchResult<SetResponse> {
        for binding in bindings {
            let name = parse_oid(&binding.oid)?;
            match self.fault_for(&name) {
                Some(Fault::Status(code)) => {
                    self.sets.extend_from_slice(bindings);
                    return Ok(SetResponse {
                        error_status: code,
                        error_index: 1,
                    });
                }
                Some(fault) => return Err(Self::fail(fault, "set", &binding.oid)),
                None => {}
            }
        }
        self.sets.extend_from_slice(bindings);

        let mut staged = self.objects.clone();
        for (i, binding) in bindings.iter().enumerate() {
            if let Err(code) = self.stage(&mut staged, binding) {
                debug!(oid = %binding.oid, status = code, "Mock agent rejected set");
                return Ok(SetResponse {
                    error_status: code,
                    error_index: i as u32 + 1,
                });
            }
        }
        self.objects = staged;
        Ok(SetResponse::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn agent_with_ports(ports: i64) -> MockAgent {
        let mut agent = MockAgent::new();
        agent.insert(mib::DOT1D_BASE_NUM_PORTS, ports);
        agent
    }

    fn row_status(vid: u16, status: i64) -> VarBind {
        VarBind::new(format!("{}.5.{}", mib::DOT1Q_VLAN_STATIC_ENTRY, vid), status)
    }

    #[tokio::test]
    async fn test_walk_is_ordered_and_strictly_below_base() {
        let mut agent = MockAgent::new();
        agent.insert("1.3.6.1.2.1.2.2.1.1.10", 10i64);
        agent.insert("1.3.6.1.2.1.2.2.1.1.2", 2i64);
        agent.insert("1.3.6.1.2.1.2.2.1.10.2", 99i64);
        agent.insert("1.3.6.1.2.1.2.2.1.1", 0i64);

        let rows = agent.walk("1.3.6.1.2.1.2.2.1.1").await.unwrap();
        let oids: Vec<_> = rows.iter().map(|r| r.oid.as_str()).collect();
        assert_eq!(oids, vec!["1.3.6.1.2.1.2.2.1.1.2", "1.3.6.1.2.1.2.2.1.1.10"]);
        assert_eq!(agent.walk_log(), &["1.3.6.1.2.1.2.2.1.1".to_string()]);
    }

    #[tokio::test]
    async fn test_create_and_destroy_row() {
        let mut agent = agent_with_ports(12);

        let response = agent.set(&[row_status(101, 4)]).await.unwrap();
        assert!(response.is_ok());
        assert_eq!(agent.static_vlans(), vec![101]);
        assert_eq!(agent.value(mib::DOT1Q_NUM_VLANS), Some(&SnmpValue::Gauge32(1)));
        assert_eq!(
            agent.value(&format!("{}.2.101", mib::DOT1Q_VLAN_STATIC_ENTRY)),
            Some(&SnmpValue::OctetString(vec![0, 0]))
        );

        let again = agent.set(&[row_status(101, 4)]).await.unwrap();
        assert_eq!(again.error_status, INCONSISTENT_VALUE);

        assert!(agent.set(&[row_status(101, 6)]).await.unwrap().is_ok());
        assert!(agent.static_vlans().is_empty());
        assert_eq!(agent.value(mib::DOT1Q_NUM_VLANS), Some(&SnmpValue::Gauge32(0)));
        assert_eq!(agent.set_log().len(), 3);
    }

    #[tokio::test]
    async fn test_port_list_write_rules() {
        let mut agent = agent_with_ports(12);
        let egress = format!("{}.2.101", mib::DOT1Q_VLAN_STATIC_ENTRY);

        let missing = agent.set(&[VarBind::new(&egress, vec![0x80, 0x00])]).await.unwrap();
        assert_eq!(missing.error_status, NO_CREATION);

        agent.set(&[row_status(101, 4)]).await.unwrap();
        let short = agent.set(&[VarBind::new(&egress, vec![0x80])]).await.unwrap();
        assert_eq!(short.error_status, WRONG_LENGTH);

        let wrong = agent.set(&[VarBind::new(&egress, 1i64)]).await.unwrap();
        assert_eq!(wrong.error_status, WRONG_TYPE);

        assert!(agent
            .set(&[VarBind::new(&egress, vec![0x80, 0x00])])
            .await
            .unwrap()
            .is_ok());
        assert_eq!(agent.value(&egress), Some(&SnmpValue::OctetString(vec![0x80, 0x00])));

        let readonly = agent.set(&[VarBind::new(mib::IF_NUMBER, 3i64)]).await.unwrap();
        assert_eq!(readonly.error_status, NOT_WRITABLE);
    }

    #[tokio::test]
    async fn test_auto_create_rows() {
        let mut agent = agent_with_ports(8).with_auto_create_rows();
        let untagged = format!("{}.4.47", mib::DOT1Q_VLAN_STATIC_ENTRY);
        assert!(agent.set(&[VarBind::new(&untagged, vec![0x40])]).await.unwrap().is_ok());
        assert_eq!(agent.static_vlans(), vec![47]);
    }

    #[tokio::test]
    async fn test_rejected_set_changes_nothing() {
        let mut agent = agent_with_ports(8);
        let bindings = [row_status(10, 4), VarBind::new(mib::IF_NUMBER, 1i64)];
        let response = agent.set(&bindings).await.unwrap();
        assert_eq!(response.error_index, 2);
        assert!(agent.static_vlans().is_empty());
    }

    #[tokio::test]
    async fn test_injected_faults() {
        let mut agent = agent_with_ports(8);
        agent.inject(mib::LLDP_REM_ENTRY, Fault::Timeout);
        agent.inject(mib::DOT1Q_VLAN_STATIC_ENTRY, Fault::Status(16));

        let walk = agent.walk(&format!("{}.9", mib::LLDP_REM_ENTRY)).await;
        assert!(matches!(walk, Err(SwitchError::Timeout { .. })));

        let set = agent.set(&[row_status(5, 4)]).await.unwrap();
        assert_eq!(set.error_status, 16);

        agent.clear_faults();
        assert!(agent.set(&[row_status(5, 4)]).await.unwrap().is_ok());
    }
}
