//! Table walk engine.
//!
//! A walk fetches a whole subtree and hands each row whose value has the
//! expected SNMP type to a callback, in agent order. Rows of any other type
//! are skipped. The first callback error aborts the walk.

use tracing::{debug, trace, warn};

use switchctl_common::{SnmpSession, SwitchError, SwitchResult, ValueKind, VarBind};

/// Whether a column must be readable for an inventory query to succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// Failures abort the query.
    Required,
    /// Failures are logged and the column is treated as partially or
    /// entirely absent.
    Optional,
}

/// Outcome of walking one column.
#[derive(Debug)]
pub enum ColumnWalk {
    /// The column yielded this many matching rows.
    Present(usize),
    /// The subtree was empty.
    Absent,
    /// An optional column failed part way; rows seen before the failure
    /// were applied.
    Failed(SwitchError),
}

impl ColumnWalk {
    /// Number of rows applied from the column.
    pub fn rows(&self) -> usize {
        match self {
            ColumnWalk::Present(n) => *n,
            _ => 0,
        }
    }
}

/// Walks `base` and invokes `on_row(position, row)` for each row of type
/// `kind`. `position` is the row's index in the whole walk response,
/// skipped rows included. Returns the number of rows passed to the callback.
pub async fn walk_typed<S, F>(
    session: &mut S,
    base: &str,
    kind: ValueKind,
    mut on_row: F,
) -> SwitchResult<usize>
where
    S: SnmpSession + ?Sized,
    F: FnMut(usize, &VarBind) -> SwitchResult<()>,
{
    let rows = session.walk(base).await?;
    let mut matched = 0;

    for (position, row) in rows.iter().enumerate() {
        if row.value.kind() != kind {
            trace!(oid = %row.oid, expected = %kind, actual = %row.value.kind(), "Skipping row");
            continue;
        }
        on_row(position, row)?;
        matched += 1;
    }

    debug!(base = %base, returned = rows.len(), matched, "Walked column");
    Ok(matched)
}

/// Walks one column under the given presence policy.
///
/// Errors from a [`Presence::Required`] column are returned; errors from a
/// [`Presence::Optional`] column are logged and reported as
/// [`ColumnWalk::Failed`].
pub async fn walk_column<S, F>(
    session: &mut S,
    base: &str,
    kind: ValueKind,
    presence: Presence,
    on_row: F,
) -> SwitchResult<ColumnWalk>
where
    S: SnmpSession + ?Sized,
    F: FnMut(usize, &VarBind) -> SwitchResult<()>,
{
    match walk_typed(session, base, kind, on_row).await {
        Ok(0) => Ok(ColumnWalk::Absent),
        Ok(n) => Ok(ColumnWalk::Present(n)),
        Err(e) if presence == Presence::Optional => {
            warn!(base = %base, error = %e, "Optional column unavailable, continuing without it");
            Ok(ColumnWalk::Failed(e))
        }
        Err(e) => Err(e),
    }
}

/// Reads a numeric scalar. Returns `None` if the agent does not have it.
pub async fn read_scalar<S>(session: &mut S, oid: &str) -> SwitchResult<Option<u32>>
where
    S: SnmpSession + ?Sized,
{
    let Some(value) = session.get(oid).await? else {
        return Ok(None);
    };

    match value.kind() {
        ValueKind::Integer | ValueKind::Gauge32 | ValueKind::Counter32 => value
            .as_u32()
            .map(Some)
            .ok_or_else(|| SwitchError::unexpected_type(oid, "unsigned 32-bit number", "negative INTEGER")),
        other => Err(SwitchError::unexpected_type(oid, "INTEGER or Gauge32", other.as_str())),
    }
}
