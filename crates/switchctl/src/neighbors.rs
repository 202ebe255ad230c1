//! LLDP neighbor discovery.
//!
//! The remote port ID column seeds one neighbor per local port. The name,
//! port description and system description columns are then joined on the
//! local port number; rows for ports the seed walk never reported are
//! dropped.

use std::collections::BTreeMap;
use tracing::{debug, instrument};

use switchctl_common::{Neighbor, SnmpSession, SwitchResult, ValueKind};

use crate::oids::{self, columns};
use crate::walk::{walk_column, Presence};

type Field = fn(&mut Neighbor, String);

const FIELDS: [(u32, &str, Field); 3] = [
    (columns::LLDP_REM_SYS_NAME, "remote_name", |n, v| n.remote_name = v),
    (columns::LLDP_REM_PORT_DESC, "remote_port_name", |n, v| n.remote_port_name = v),
    (columns::LLDP_REM_SYS_DESC, "remote_description", |n, v| n.remote_description = v),
];

/// Builds the neighbor map keyed by local port.
#[instrument(skip(session))]
pub async fn build_neighbors<S>(session: &mut S) -> SwitchResult<BTreeMap<u32, Neighbor>>
where
    S: SnmpSession + ?Sized,
{
    let mut neighbors: BTreeMap<u32, Neighbor> = BTreeMap::new();

    let id_column = oids::lldp_rem_column(columns::LLDP_REM_PORT_ID);
    walk_column(session, &id_column, ValueKind::OctetString, Presence::Required, |_, row| {
        let port = oids::lldp_local_port(&row.oid, &id_column)?;
        let mac = row.value.as_bytes().unwrap_or_default().to_vec();
        neighbors.insert(port, Neighbor::new(port, mac));
        Ok(())
    })
    .await?;

    if neighbors.is_empty() {
        debug!("No LLDP neighbors");
        return Ok(neighbors);
    }

    for (number, field, apply) in FIELDS {
        let column = oids::lldp_rem_column(number);
        walk_column(session, &column, ValueKind::OctetString, Presence::Optional, |_, row| {
            let port = oids::lldp_local_port(&row.oid, &column)?;
            match neighbors.get_mut(&port) {
                Some(neighbor) => apply(neighbor, row.value.to_text().unwrap_or_default()),
                None => debug!(port, field, "LLDP row without a port ID row, skipped"),
            }
            Ok(())
        })
        .await?;
    }

    debug!(neighbors = neighbors.len(), "Built neighbor map");
    Ok(neighbors)
}
