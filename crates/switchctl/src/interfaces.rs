//! Interface inventory.
//!
//! Joins the IF-MIB interfaces table, the ifXTable alias column and the
//! BRIDGE-MIB base-port map into [`Interface`] records. Every table is keyed
//! by ifIndex (the base-port map carries it as its value), so rows are
//! matched by key rather than by walk position.

use std::collections::HashMap;
use tracing::{debug, instrument};

use switchctl_common::{
    AdminStatus, IfType, Interface, OperStatus, SnmpSession, SnmpValue, SwitchResult, ValueKind,
};

use crate::oids::{self, columns};
use crate::walk::{read_scalar, walk_column, Presence};

/// A descriptive column copied into each interface record.
struct Column {
    base: String,
    kind: ValueKind,
    presence: Presence,
    apply: fn(&mut Interface, &SnmpValue),
}

fn descriptive_columns() -> [Column; 5] {
    [
        Column {
            base: oids::if_column(columns::IF_DESCR),
            kind: ValueKind::OctetString,
            presence: Presence::Required,
            apply: |ifx, v| ifx.label = v.to_text().unwrap_or_default(),
        },
        Column {
            base: oids::IF_ALIAS.to_string(),
            kind: ValueKind::OctetString,
            presence: Presence::Optional,
            apply: |ifx, v| {
                let alias = v.to_text().unwrap_or_default();
                if !alias.is_empty() {
                    ifx.label.push(' ');
                    ifx.label.push_str(&alias);
                }
            },
        },
        Column {
            base: oids::if_column(columns::IF_TYPE),
            kind: ValueKind::Integer,
            presence: Presence::Required,
            apply: |ifx, v| ifx.kind = IfType(v.as_u32().unwrap_or_default()),
        },
        Column {
            base: oids::if_column(columns::IF_ADMIN_STATUS),
            kind: ValueKind::Integer,
            presence: Presence::Required,
            apply: |ifx, v| ifx.admin_status = AdminStatus::from(v.as_i64().unwrap_or_default()),
        },
        Column {
            base: oids::if_column(columns::IF_OPER_STATUS),
            kind: ValueKind::Integer,
            presence: Presence::Required,
            apply: |ifx, v| ifx.oper_status = OperStatus::from(v.as_i64().unwrap_or_default()),
        },
    ]
}

/// Builds the interface inventory, in the agent's ifIndex order.
///
/// Returns an empty list when the device reports no interfaces. Interfaces
/// that are not bridge ports keep `bridge_index == 0`.
#[instrument(skip(session))]
pub async fn build_interfaces<S>(session: &mut S) -> SwitchResult<Vec<Interface>>
where
    S: SnmpSession + ?Sized,
{
    let count = read_scalar(session, oids::IF_NUMBER).await?.unwrap_or(0);
    if count == 0 {
        debug!("Device reports no interfaces");
        return Ok(Vec::new());
    }

    // ifNumber is untrusted and only gates the empty case
    let mut interfaces: Vec<Interface> = Vec::new();
    let mut slots: HashMap<u32, usize> = HashMap::new();

    let index_column = oids::if_column(columns::IF_INDEX);
    walk_column(session, &index_column, ValueKind::Integer, Presence::Required, |_, row| {
        let index = oids::row_key(&row.oid, &index_column)?;
        slots.insert(index, interfaces.len());
        interfaces.push(Interface::new(index));
        Ok(())
    })
    .await?;

    if interfaces.len() != count as usize {
        debug!(reported = count, walked = interfaces.len(), "ifNumber disagrees with ifTable");
    }

    walk_column(
        session,
        oids::DOT1D_BASE_PORT_IF_INDEX,
        ValueKind::Integer,
        Presence::Optional,
        |_, row| {
            let base_port = oids::row_key(&row.oid, oids::DOT1D_BASE_PORT_IF_INDEX)?;
            let if_index = row.value.as_u32().unwrap_or_default();
            match slots.get(&if_index) {
                Some(&slot) => interfaces[slot].bridge_index = base_port,
                None => debug!(base_port, if_index, "Base port maps to unknown ifIndex, skipped"),
            }
            Ok(())
        },
    )
    .await?;

    for column in descriptive_columns() {
        walk_column(session, &column.base, column.kind, column.presence, |_, row| {
            let if_index = oids::row_key(&row.oid, &column.base)?;
            match slots.get(&if_index) {
                Some(&slot) => (column.apply)(&mut interfaces[slot], &row.value),
                None => debug!(oid = %row.oid, "Row for unknown ifIndex, skipped"),
            }
            Ok(())
        })
        .await?;
    }

    debug!(interfaces = interfaces.len(), "Built interface inventory");
    Ok(interfaces)
}
