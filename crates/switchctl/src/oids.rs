//! OID addressing for the IF-MIB, BRIDGE-MIB, Q-BRIDGE-MIB and LLDP-MIB
//! objects the driver reads and writes.
//!
//! Table columns are addressed as `<entry>.<column>` and cells as
//! `<entry>.<column>.<row index>`. The reverse direction, recovering the
//! row index from a returned cell OID, is what lets independently walked
//! columns be joined on their row key.

use switchctl_common::{normalize_oid, SwitchError, SwitchResult};

/// IF-MIB `ifNumber.0`
pub const IF_NUMBER: &str = "1.3.6.1.2.1.2.1.0";

/// IF-MIB `ifEntry`
pub const IF_ENTRY: &str = "1.3.6.1.2.1.2.2.1";

/// IF-MIB `ifAlias` (ifXTable)
pub const IF_ALIAS: &str = "1.3.6.1.2.1.31.1.1.1.18";

/// BRIDGE-MIB `dot1dBaseNumPorts.0`
pub const DOT1D_BASE_NUM_PORTS: &str = "1.3.6.1.2.1.17.1.2.0";

/// BRIDGE-MIB `dot1dBasePortIfIndex`
pub const DOT1D_BASE_PORT_IF_INDEX: &str = "1.3.6.1.2.1.17.1.4.1.2";

/// Q-BRIDGE-MIB `dot1qNumVlans.0`
pub const DOT1Q_NUM_VLANS: &str = "1.3.6.1.2.1.17.7.1.1.4.0";

/// Q-BRIDGE-MIB `dot1qVlanCurrentEntry`
pub const DOT1Q_VLAN_CURRENT_ENTRY: &str = "1.3.6.1.2.1.17.7.1.4.2.1";

/// Q-BRIDGE-MIB `dot1qVlanStaticEntry`
pub const DOT1Q_VLAN_STATIC_ENTRY: &str = "1.3.6.1.2.1.17.7.1.4.3.1";

/// LLDP-MIB `lldpRemEntry`
pub const LLDP_REM_ENTRY: &str = "1.0.8802.1.1.2.1.4.1.1";

/// Column numbers within the tables above.
pub mod columns {
    /// `ifIndex`
    pub const IF_INDEX: u32 = 1;
    /// `ifDescr`
    pub const IF_DESCR: u32 = 2;
    /// `ifType`
    pub const IF_TYPE: u32 = 3;
    /// `ifAdminStatus`
    pub const IF_ADMIN_STATUS: u32 = 7;
    /// `ifOperStatus`
    pub const IF_OPER_STATUS: u32 = 8;

    /// `dot1qVlanFdbId`, the column walked to enumerate current VLANs
    pub const VLAN_CURRENT_FDB_ID: u32 = 3;

    /// `dot1qVlanStaticName`
    pub const VLAN_STATIC_NAME: u32 = 1;
    /// `dot1qVlanStaticEgressPorts`
    pub const VLAN_STATIC_EGRESS_PORTS: u32 = 2;
    /// `dot1qVlanStaticUntaggedPorts`
    pub const VLAN_STATIC_UNTAGGED_PORTS: u32 = 4;
    /// `dot1qVlanStaticRowStatus`
    pub const VLAN_STATIC_ROW_STATUS: u32 = 5;

    /// `lldpRemPortId`, normally the neighbor's MAC address
    pub const LLDP_REM_PORT_ID: u32 = 7;
    /// `lldpRemPortDesc`
    pub const LLDP_REM_PORT_DESC: u32 = 8;
    /// `lldpRemSysName`
    pub const LLDP_REM_SYS_NAME: u32 = 9;
    /// `lldpRemSysDesc`
    pub const LLDP_REM_SYS_DESC: u32 = 10;
}

/// SNMPv2-TC `RowStatus` values.
pub mod row_status {
    pub const CREATE_AND_GO: i64 = 4;
    pub const DESTROY: i64 = 6;
}

/// Column `x` of the interfaces table.
pub fn if_column(x: u32) -> String {
    format!("{}.{}", IF_ENTRY, x)
}

/// Column `x` of the current VLAN table.
pub fn vlan_current_column(x: u32) -> String {
    format!("{}.{}", DOT1Q_VLAN_CURRENT_ENTRY, x)
}

/// Column `x` of the static VLAN table.
pub fn vlan_static_column(x: u32) -> String {
    format!("{}.{}", DOT1Q_VLAN_STATIC_ENTRY, x)
}

/// Column `x` of the LLDP remote systems table.
pub fn lldp_rem_column(x: u32) -> String {
    format!("{}.{}", LLDP_REM_ENTRY, x)
}

/// Egress PortList cell of `vlan`.
pub fn vlan_egress(vlan: u16) -> String {
    format!("{}.{}", vlan_static_column(columns::VLAN_STATIC_EGRESS_PORTS), vlan)
}

/// Untagged (access) PortList cell of `vlan`.
pub fn vlan_access(vlan: u16) -> String {
    format!("{}.{}", vlan_static_column(columns::VLAN_STATIC_UNTAGGED_PORTS), vlan)
}

/// RowStatus cell of `vlan`.
pub fn vlan_row_status(vlan: u16) -> String {
    format!("{}.{}", vlan_static_column(columns::VLAN_STATIC_ROW_STATUS), vlan)
}

/// Returns the numeric arcs of the row index that follows `prefix` in `oid`.
pub fn index_arcs(oid: &str, prefix: &str) -> SwitchResult<Vec<u32>> {
    let oid_n = normalize_oid(oid);
    let prefix = normalize_oid(prefix);
    let suffix = oid_n
        .strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('.'))
        .filter(|rest| !rest.is_empty())
        .ok_or_else(|| SwitchError::row_key(oid, format!("not a row of {}", prefix)))?;

    suffix
        .split('.')
        .map(|arc| {
            arc.parse::<u32>()
                .map_err(|_| SwitchError::row_key(oid, format!("non-numeric index '{}'", arc)))
        })
        .collect()
}

/// Extracts a single-component row key, e.g. the bridge port number from a
/// `dot1dBasePortIfIndex` cell or the VLAN ID from a static VLAN cell.
pub fn row_key(oid: &str, prefix: &str) -> SwitchResult<u32> {
    match index_arcs(oid, prefix)?.as_slice() {
        [key] => Ok(*key),
        arcs => Err(SwitchError::row_key(
            oid,
            format!("expected one index component, found {}", arcs.len()),
        )),
    }
}

/// Extracts the VLAN ID from a static VLAN table cell.
pub fn vlan_key(oid: &str, prefix: &str) -> SwitchResult<u16> {
    let key = row_key(oid, prefix)?;
    u16::try_from(key).map_err(|_| SwitchError::row_key(oid, format!("VLAN ID {} out of range", key)))
}

/// Extracts the VLAN ID from a current VLAN table cell, indexed by
/// `(dot1qVlanTimeMark, dot1qVlanIndex)`.
pub fn current_vlan_key(oid: &str, prefix: &str) -> SwitchResult<u16> {
    let arcs = index_arcs(oid, prefix)?;
    let key = *arcs
        .last()
        .ok_or_else(|| SwitchError::row_key(oid, "missing VLAN index"))?;
    u16::try_from(key).map_err(|_| SwitchError::row_key(oid, format!("VLAN ID {} out of range", key)))
}

/// Extracts the local port number from an LLDP remote table cell, indexed
/// by `(lldpRemTimeMark, lldpRemLocalPortNum, lldpRemIndex)`: the
/// next-to-last index component.
pub fn lldp_local_port(oid: &str, prefix: &str) -> SwitchResult<u32> {
    match index_arcs(oid, prefix)?.as_slice() {
        [.., local_port, _] => Ok(*local_port),
        _ => Err(SwitchError::row_key(oid, "LLDP row index too short")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::assert_err;

    #[test]
    fn test_column_oids() {
        assert_eq!(if_column(columns::IF_DESCR), "1.3.6.1.2.1.2.2.1.2");
        assert_eq!(vlan_current_column(3), "1.3.6.1.2.1.17.7.1.4.2.1.3");
        assert_eq!(vlan_static_column(1), "1.3.6.1.2.1.17.7.1.4.3.1.1");
        assert_eq!(lldp_rem_column(9), "1.0.8802.1.1.2.1.4.1.1.9");
    }

    #[test]
    fn test_vlan_cell_oids() {
        assert_eq!(vlan_egress(101), "1.3.6.1.2.1.17.7.1.4.3.1.2.101");
        assert_eq!(vlan_access(101), "1.3.6.1.2.1.17.7.1.4.3.1.4.101");
        assert_eq!(vlan_row_status(101), "1.3.6.1.2.1.17.7.1.4.3.1.5.101");
    }

    #[test]
    fn test_row_key() {
        assert_eq!(
            row_key("1.3.6.1.2.1.17.1.4.1.2.12", DOT1D_BASE_PORT_IF_INDEX).unwrap(),
            12
        );
        assert_eq!(
            row_key(".1.3.6.1.2.1.17.1.4.1.2.3", DOT1D_BASE_PORT_IF_INDEX).unwrap(),
            3
        );
    }

    #[test]
    fn test_row_key_errors() {
        let bad = "1.3.6.1.2.1.17.1.4.1.2.x";
        assert!(matches!(
            row_key(bad, DOT1D_BASE_PORT_IF_INDEX),
            Err(SwitchError::RowKey { .. })
        ));
        // column itself, no row index
        assert_err!(row_key(DOT1D_BASE_PORT_IF_INDEX, DOT1D_BASE_PORT_IF_INDEX));
        // sibling column sharing a textual prefix
        assert_err!(row_key("1.3.6.1.2.1.2.2.1.10.5", &if_column(1)));
        // two-component index
        assert_err!(row_key("1.3.6.1.2.1.17.1.4.1.2.1.2", DOT1D_BASE_PORT_IF_INDEX));
    }

    #[test]
    fn test_vlan_keys() {
        let name = vlan_static_column(columns::VLAN_STATIC_NAME);
        assert_eq!(vlan_key(&format!("{}.101", name), &name).unwrap(), 101);
        assert_err!(vlan_key(&format!("{}.70000", name), &name));

        let current = vlan_current_column(columns::VLAN_CURRENT_FDB_ID);
        assert_eq!(
            current_vlan_key(&format!("{}.0.101", current), &current).unwrap(),
            101
        );
    }

    #[test]
    fn test_lldp_local_port() {
        let col = lldp_rem_column(columns::LLDP_REM_PORT_ID);
        assert_eq!(lldp_local_port(&format!("{}.0.3.1", col), &col).unwrap(), 3);
        assert_eq!(lldp_local_port(&format!("{}.1200.17.4", col), &col).unwrap(), 17);
        assert_err!(lldp_local_port(&format!("{}.3", col), &col));
    }
}
