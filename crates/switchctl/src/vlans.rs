//! VLAN inventory.
//!
//! VLANs are enumerated from the static VLAN table, whose row key is the
//! VLAN ID. Name, egress and untagged columns are joined on that key. The
//! current VLAN table is consulted only to report VLANs that are active
//! without a static row; they are not returned.

use std::collections::BTreeMap;
use tracing::{debug, instrument};

use switchctl_common::{PortList, SnmpSession, SwitchError, SwitchResult, ValueKind, Vlan};

use crate::oids::{self, columns};
use crate::walk::{read_scalar, walk_column, Presence};

/// Builds the VLAN inventory, ordered by VLAN ID.
///
/// Fails with [`SwitchError::MissingScalar`] if the device does not report
/// `dot1qNumVlans`, i.e. does not implement the Q-BRIDGE-MIB.
#[instrument(skip(session))]
pub async fn build_vlans<S>(session: &mut S) -> SwitchResult<Vec<Vlan>>
where
    S: SnmpSession + ?Sized,
{
    let count = read_scalar(session, oids::DOT1Q_NUM_VLANS)
        .await?
        .ok_or_else(|| SwitchError::MissingScalar {
            oid: oids::DOT1Q_NUM_VLANS.to_string(),
        })?;

    let mut vlans: BTreeMap<u16, Vlan> = BTreeMap::new();

    let name_column = oids::vlan_static_column(columns::VLAN_STATIC_NAME);
    walk_column(session, &name_column, ValueKind::OctetString, Presence::Required, |_, row| {
        let vid = oids::vlan_key(&row.oid, &name_column)?;
        let vlan = vlans.entry(vid).or_insert_with(|| Vlan::new(vid));
        vlan.name = row.value.to_text().unwrap_or_default();
        Ok(())
    })
    .await?;

    for (number, untagged) in [
        (columns::VLAN_STATIC_EGRESS_PORTS, false),
        (columns::VLAN_STATIC_UNTAGGED_PORTS, true),
    ] {
        let column = oids::vlan_static_column(number);
        walk_column(session, &column, ValueKind::OctetString, Presence::Required, |_, row| {
            let vid = oids::vlan_key(&row.oid, &column)?;
            let Some(vlan) = vlans.get_mut(&vid) else {
                debug!(vlan = vid, oid = %row.oid, "PortList for VLAN without a name row, skipped");
                return Ok(());
            };
            let ports = PortList::from(row.value.as_bytes().unwrap_or_default());
            if untagged {
                vlan.access_ports = ports;
            } else {
                vlan.egress_ports = ports;
            }
            Ok(())
        })
        .await?;
    }

    let current_column = oids::vlan_current_column(columns::VLAN_CURRENT_FDB_ID);
    walk_column(session, &current_column, ValueKind::Gauge32, Presence::Optional, |_, row| {
        let vid = oids::current_vlan_key(&row.oid, &current_column)?;
        if !vlans.contains_key(&vid) {
            debug!(vlan = vid, "VLAN is active but has no static row, skipped");
        }
        Ok(())
    })
    .await?;

    if vlans.len() != count as usize {
        debug!(reported = count, walked = vlans.len(), "dot1qNumVlans disagrees with static table");
    }

    debug!(vlans = vlans.len(), "Built VLAN inventory");
    Ok(vlans.into_values().collect())
}
