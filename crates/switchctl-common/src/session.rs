//! The SNMP session seam.
//!
//! Drivers talk to a device exclusively through [`SnmpSession`]. The trait
//! is deliberately small: a scalar `get`, an ordered subtree `walk` and a
//! `set` that reports the device's error-status. Values cross the seam as
//! owned [`SnmpValue`]s and OIDs as dotted-decimal strings, so tests can
//! substitute an in-memory agent for the UDP backend.

use async_trait::async_trait;
use std::fmt;

use crate::error::{SwitchError, SwitchResult};

/// The SNMP type of a value, used to filter walk results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Integer,
    OctetString,
    ObjectIdentifier,
    IpAddress,
    Counter32,
    Gauge32,
    TimeTicks,
    Counter64,
    Opaque,
    Null,
}

impl ValueKind {
    /// Returns the SMI name of the type.
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::Integer => "INTEGER",
            ValueKind::OctetString => "OCTET STRING",
            ValueKind::ObjectIdentifier => "OBJECT IDENTIFIER",
            ValueKind::IpAddress => "IpAddress",
            ValueKind::Counter32 => "Counter32",
            ValueKind::Gauge32 => "Gauge32",
            ValueKind::TimeTicks => "TimeTicks",
            ValueKind::Counter64 => "Counter64",
            ValueKind::Opaque => "Opaque",
            ValueKind::Null => "NULL",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An owned SNMP value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnmpValue {
    Integer(i64),
    OctetString(Vec<u8>),
    ObjectIdentifier(String),
    IpAddress([u8; 4]),
    Counter32(u32),
    /// Gauge32 / Unsigned32
    Gauge32(u32),
    TimeTicks(u32),
    Counter64(u64),
    Opaque(Vec<u8>),
    Null,
}

impl SnmpValue {
    /// Returns the type of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            SnmpValue::Integer(_) => ValueKind::Integer,
            SnmpValue::OctetString(_) => ValueKind::OctetString,
            SnmpValue::ObjectIdentifier(_) => ValueKind::ObjectIdentifier,
            SnmpValue::IpAddress(_) => ValueKind::IpAddress,
            SnmpValue::Counter32(_) => ValueKind::Counter32,
            SnmpValue::Gauge32(_) => ValueKind::Gauge32,
            SnmpValue::TimeTicks(_) => ValueKind::TimeTicks,
            SnmpValue::Counter64(_) => ValueKind::Counter64,
            SnmpValue::Opaque(_) => ValueKind::Opaque,
            SnmpValue::Null => ValueKind::Null,
        }
    }

    /// Returns the value as a signed integer if it is numeric.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            SnmpValue::Integer(v) => Some(*v),
            SnmpValue::Counter32(v) | SnmpValue::Gauge32(v) | SnmpValue::TimeTicks(v) => {
                Some(i64::from(*v))
            }
            SnmpValue::Counter64(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    /// Returns the value as an unsigned 32-bit number if it is numeric and fits.
    pub fn as_u32(&self) -> Option<u32> {
        self.as_i64().and_then(|v| u32::try_from(v).ok())
    }

    /// Returns the raw bytes of an OCTET STRING or Opaque value.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            SnmpValue::OctetString(b) | SnmpValue::Opaque(b) => Some(b),
            _ => None,
        }
    }

    /// Returns an OCTET STRING as text, replacing invalid UTF-8.
    pub fn to_text(&self) -> Option<String> {
        self.as_bytes()
            .map(|b| String::from_utf8_lossy(b).into_owned())
    }
}

impl From<i64> for SnmpValue {
    fn from(v: i64) -> Self {
        SnmpValue::Integer(v)
    }
}

impl From<Vec<u8>> for SnmpValue {
    fn from(v: Vec<u8>) -> Self {
        SnmpValue::OctetString(v)
    }
}

impl From<&str> for SnmpValue {
    fn from(v: &str) -> Self {
        SnmpValue::OctetString(v.as_bytes().to_vec())
    }
}

/// One (OID, value) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarBind {
    /// Dotted-decimal OID without a leading dot.
    pub oid: String,
    /// The value bound to the OID.
    pub value: SnmpValue,
}

impl VarBind {
    /// Creates a new binding, normalizing the OID.
    pub fn new(oid: impl AsRef<str>, value: impl Into<SnmpValue>) -> Self {
        Self {
            oid: normalize_oid(oid.as_ref()).to_string(),
            value: value.into(),
        }
    }
}

/// The status part of a response to a set request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SetResponse {
    /// RFC 3416 error-status (0 = noError).
    pub error_status: u32,
    /// 1-based index of the offending binding, 0 if none.
    pub error_index: u32,
}

impl SetResponse {
    /// Returns true if the device accepted the request.
    pub fn is_ok(&self) -> bool {
        self.error_status == 0
    }

    /// Converts a non-zero error-status into a [`SwitchError::Device`].
    pub fn into_result(self, oid: &str) -> SwitchResult<()> {
        if self.is_ok() {
            Ok(())
        } else {
            Err(SwitchError::device(oid, self.error_status))
        }
    }
}

/// A request/response session with one SNMP agent.
///
/// Sessions are not designed for concurrent use: every method takes
/// `&mut self`, and the owner issues requests strictly one at a time.
#[async_trait]
pub trait SnmpSession: Send {
    /// Fetches a single object. Returns `None` when the agent reports
    /// noSuchObject / noSuchInstance.
    async fn get(&mut self, oid: &str) -> SwitchResult<Option<SnmpValue>>;

    /// Retrieves every object below `base`, in the order the agent returns
    /// them. An absent subtree yields an empty vector.
    async fn walk(&mut self, base: &str) -> SwitchResult<Vec<VarBind>>;

    /// Writes all bindings in a single request.
    ///
    /// A device-side rejection is not an `Err`: it is reported through the
    /// returned [`SetResponse`] so callers can tell it apart from transport
    /// failures.
    async fn set(&mut self, bindings: &[VarBind]) -> SwitchResult<SetResponse>;
}

/// Strips the leading dot some tools print in front of OIDs.
pub fn normalize_oid(oid: &str) -> &str {
    oid.strip_prefix('.').unwrap_or(oid)
}

/// Returns true if `oid` lies strictly below `base` in the OID tree.
pub fn oid_in_subtree(oid: &str, base: &str) -> bool {
    let oid = normalize_oid(oid);
    let base = normalize_oid(base);
    oid.len() > base.len() + 1
        && oid.starts_with(base)
        && oid.as_bytes()[base.len()] == b'.'
}

/// Parses a dotted-decimal OID into its arcs.
pub fn parse_oid(oid: &str) -> SwitchResult<Vec<u64>> {
    normalize_oid(oid)
        .split('.')
        .map(|arc| {
            arc.parse::<u64>()
                .map_err(|_| SwitchError::row_key(oid, format!("non-numeric arc '{}'", arc)))
        })
        .collect()
}
